pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{Credentials, SyncConfig};

pub use adapters::{GoogleSheetsStore, HttpCsvSource, SmtpMailer};
pub use core::engine::{RunReport, SyncEngine};
pub use utils::error::{Result, SyncError};
