use crate::utils::error::{Result, SyncError};
use serde::Deserialize;

pub const SERVICE_KEY_VAR: &str = "GCP_KEYS";
pub const SENDER_VAR: &str = "SENDER_EMAIL";
pub const RECIPIENT_VAR: &str = "RECEIVER_EMAIL";
pub const MAIL_PASSWORD_VAR: &str = "EMAIL_PASSWORD";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The fields of a Google service-account key file the token exchange needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Clone)]
pub struct MailCredentials {
    pub sender: String,
    pub recipient: String,
    pub password: String,
}

impl std::fmt::Debug for MailCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailCredentials")
            .field("sender", &self.sender)
            .field("recipient", &self.recipient)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Secrets for one run, read once at startup.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub service_account: ServiceAccountKey,
    /// RECEIVER_EMAIL on its own. New spreadsheets are shared with it even when mail is off.
    pub recipient: Option<String>,
    /// `None` when any of the three mail variables is missing; notification is then skipped.
    pub mail: Option<MailCredentials>,
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let raw_key = read(SERVICE_KEY_VAR).ok_or_else(|| SyncError::CredentialError {
            message: format!("{} is not set", SERVICE_KEY_VAR),
        })?;
        let service_account: ServiceAccountKey =
            serde_json::from_str(&raw_key).map_err(|e| SyncError::CredentialError {
                message: format!("{} is not a service-account key: {}", SERVICE_KEY_VAR, e),
            })?;

        let recipient = read(RECIPIENT_VAR);
        let mail = match (read(SENDER_VAR), recipient.clone(), read(MAIL_PASSWORD_VAR)) {
            (Some(sender), Some(recipient), Some(password)) => Some(MailCredentials {
                sender,
                recipient,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            service_account,
            recipient,
            mail,
        })
    }

    pub fn recipient(&self) -> Option<&str> {
        self.recipient.as_deref()
    }
}
