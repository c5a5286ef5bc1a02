pub mod auth;
pub mod sheets;

pub use sheets::{GoogleEndpoints, GoogleSheetsStore};
