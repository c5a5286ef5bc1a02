// Adapters layer: concrete implementations of the domain ports (feed, spreadsheet, mail).

pub mod csv_feed;
pub mod google;
pub mod smtp;

pub use csv_feed::HttpCsvSource;
pub use google::GoogleSheetsStore;
pub use smtp::SmtpMailer;
