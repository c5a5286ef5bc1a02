use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Credential error: {message}")]
    CredentialError { message: String },

    #[error("Authentication failed: {message}")]
    AuthError { message: String },

    #[error("Source fetch failed: {message}")]
    FetchError { message: String },

    #[error("Destination {operation} failed: {message}")]
    DestinationError { operation: String, message: String },

    #[error("Mail delivery failed: {message}")]
    MailError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Authentication,
    Fetch,
    Destination,
    Notification,
    Internal,
}

impl SyncError {
    pub fn fetch(err: impl std::fmt::Display) -> Self {
        SyncError::FetchError {
            message: err.to_string(),
        }
    }

    pub fn destination(operation: &str, err: impl std::fmt::Display) -> Self {
        SyncError::DestinationError {
            operation: operation.to_string(),
            message: err.to_string(),
        }
    }

    pub fn auth(err: impl std::fmt::Display) -> Self {
        SyncError::AuthError {
            message: err.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SyncError::ConfigError { .. }
            | SyncError::InvalidConfigValueError { .. }
            | SyncError::CredentialError { .. } => ErrorCategory::Configuration,
            SyncError::AuthError { .. } => ErrorCategory::Authentication,
            SyncError::FetchError { .. } | SyncError::CsvError(_) => ErrorCategory::Fetch,
            SyncError::DestinationError { .. } => ErrorCategory::Destination,
            SyncError::MailError { .. } => ErrorCategory::Notification,
            SyncError::HttpError(_) | SyncError::IoError(_) => ErrorCategory::Internal,
        }
    }

    /// Process exit status for a run aborted by this error. Always non-zero.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Internal | ErrorCategory::Notification => 1,
            ErrorCategory::Configuration => 2,
            ErrorCategory::Authentication => 3,
            ErrorCategory::Fetch => 4,
            ErrorCategory::Destination => 5,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the config file and the GCP_KEYS / mail environment variables"
            }
            ErrorCategory::Authentication => {
                "Verify the service account key is current and has Sheets and Drive scopes"
            }
            ErrorCategory::Fetch => "Check that the source URL is reachable and serves CSV",
            ErrorCategory::Destination => {
                "Check the service account's Drive quota and the spreadsheet's sharing settings"
            }
            ErrorCategory::Notification => "Check the SMTP relay and the sender's app password",
            ErrorCategory::Internal => "Re-run with --verbose for more detail",
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
