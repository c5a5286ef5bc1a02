#[cfg(feature = "cli")]
pub mod cli;
pub mod credentials;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};
pub use credentials::{Credentials, MailCredentials, ServiceAccountKey};
pub use toml_config::SyncConfig;
