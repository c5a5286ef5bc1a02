pub mod cleanup;
pub mod dates;
pub mod engine;
pub mod normalize;
pub mod notify;
pub mod sync;
pub mod window;

pub use crate::domain::model::{RawRecord, ResultSet, RunSummary};
pub use crate::domain::ports::{ConfigProvider, FeedSource, MailTransport, SheetStore};
pub use crate::utils::error::Result;
