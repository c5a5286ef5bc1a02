use crate::core::window::WindowFilter;
use crate::domain::model::{MailMessage, SheetHandle};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait ConfigProvider: Send + Sync {
    fn source_url(&self) -> &str;
    fn date_field(&self) -> &str;
    fn columns(&self) -> &[String];
    fn window_days(&self) -> i64;
    fn destination_name(&self) -> &str;
    fn share_with(&self) -> Option<&str>;
}

pub trait FeedSource: Send + Sync {
    /// Streams every feed row through `filter` in one forward pass and hands it back.
    fn drain_into(
        &self,
        filter: WindowFilter,
    ) -> impl std::future::Future<Output = Result<WindowFilter>> + Send;
}

/// Spreadsheet service operations. "Sheet" means the spreadsheet file; its first tab is
/// what `clear` and `append_rows` act on.
#[async_trait]
pub trait SheetStore: Send + Sync {
    async fn find_by_name(&self, name: &str) -> Result<Option<SheetHandle>>;
    async fn create(&self, name: &str) -> Result<SheetHandle>;
    async fn grant_access(&self, sheet: &SheetHandle, identity: &str) -> Result<()>;
    async fn clear(&self, sheet: &SheetHandle) -> Result<()>;
    async fn append_rows(&self, sheet: &SheetHandle, rows: &[Vec<String>]) -> Result<()>;
    fn locator(&self, sheet: &SheetHandle) -> String;

    async fn list_all(&self) -> Result<Vec<SheetHandle>>;
    async fn delete(&self, sheet: &SheetHandle) -> Result<()>;
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<()>;
}
