use crate::domain::model::SheetHandle;
use crate::domain::ports::SheetStore;
use crate::utils::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub found: usize,
    pub deleted: Vec<SheetHandle>,
    pub failed: Vec<(SheetHandle, String)>,
}

/// Deletes every spreadsheet the service account can see. A failed delete is recorded
/// and the purge moves on; only a failed listing aborts.
pub async fn purge_spreadsheets<S: SheetStore + ?Sized>(store: &S) -> Result<PurgeReport> {
    let sheets = store.list_all().await?;
    let mut report = PurgeReport {
        found: sheets.len(),
        ..Default::default()
    };

    if sheets.is_empty() {
        tracing::info!("🧹 Drive is already empty");
        return Ok(report);
    }

    tracing::info!("🧹 Found {} spreadsheets, deleting", sheets.len());
    for sheet in sheets {
        tracing::info!("Deleting: {} (ID: {})", sheet.name, sheet.id);
        match store.delete(&sheet).await {
            Ok(()) => report.deleted.push(sheet),
            Err(e) => {
                tracing::warn!("⚠️ Could not delete {}: {}", sheet.name, e);
                report.failed.push((sheet, e.to_string()));
            }
        }
    }

    Ok(report)
}
