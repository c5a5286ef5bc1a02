use crate::core::window::DEFAULT_WINDOW_DAYS;
use crate::core::ConfigProvider;
use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{
    validate_column_list, validate_email, validate_non_empty_string, validate_number_range,
    validate_positive_number, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
/// A century; anything longer is a typo.
pub const MAX_WINDOW_DAYS: i64 = 36_500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub source: SourceConfig,
    pub filter: FilterConfig,
    pub destination: DestinationConfig,
    pub mail: Option<MailConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub url: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub date_field: String,
    pub columns: Vec<String>,
    pub window_days: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    pub name: String,
    /// Defaults to the mail recipient when unset.
    pub share_with: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
}

impl SyncConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SyncError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SyncError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SyncError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("source.url", &self.source.url)?;
        if let Some(timeout) = self.source.timeout_seconds {
            validate_positive_number("source.timeout_seconds", timeout as i64, 1)?;
        }

        validate_non_empty_string("filter.date_field", &self.filter.date_field)?;
        validate_column_list("filter.columns", &self.filter.columns)?;
        if !self.filter.columns.contains(&self.filter.date_field) {
            return Err(SyncError::InvalidConfigValueError {
                field: "filter.columns".to_string(),
                value: self.filter.columns.join(", "),
                reason: format!("Must include the date field '{}'", self.filter.date_field),
            });
        }
        validate_number_range("filter.window_days", self.window_days(), 1, MAX_WINDOW_DAYS)?;

        validate_non_empty_string("destination.name", &self.destination.name)?;
        if let Some(identity) = &self.destination.share_with {
            validate_email("destination.share_with", identity)?;
        }

        if let Some(mail) = &self.mail {
            if let Some(host) = &mail.smtp_host {
                validate_non_empty_string("mail.smtp_host", host)?;
            }
        }

        Ok(())
    }

    pub fn window_days(&self) -> i64 {
        self.filter.window_days.unwrap_or(DEFAULT_WINDOW_DAYS)
    }

    pub fn timeout_seconds(&self) -> Option<u64> {
        self.source.timeout_seconds
    }

    pub fn smtp_host(&self) -> &str {
        self.mail
            .as_ref()
            .and_then(|m| m.smtp_host.as_deref())
            .unwrap_or(DEFAULT_SMTP_HOST)
    }

    pub fn smtp_port(&self) -> Option<u16> {
        self.mail.as_ref().and_then(|m| m.smtp_port)
    }
}

impl ConfigProvider for SyncConfig {
    fn source_url(&self) -> &str {
        &self.source.url
    }

    fn date_field(&self) -> &str {
        &self.filter.date_field
    }

    fn columns(&self) -> &[String] {
        &self.filter.columns
    }

    fn window_days(&self) -> i64 {
        self.window_days()
    }

    fn destination_name(&self) -> &str {
        &self.destination.name
    }

    fn share_with(&self) -> Option<&str> {
        self.destination.share_with.as_deref()
    }
}

impl Validate for SyncConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
