#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use transit_sync::core::{MailTransport, SheetStore};
use transit_sync::domain::model::{MailMessage, SheetHandle};
use transit_sync::{Result, SyncConfig, SyncError};

pub fn config_for(source_url: &str) -> SyncConfig {
    let toml_content = format!(
        r#"
[source]
url = "{}"

[filter]
date_field = "Date Received"
columns = ["Docket Number", "Date Received", "Carrier", "Subject"]
window_days = 30

[destination]
name = "Recent Transit Filings"
"#,
        source_url
    );
    SyncConfig::from_toml_str(&toml_content).unwrap()
}

/// Spreadsheets kept in memory, keyed by name.
#[derive(Default)]
pub struct MemoryStore {
    pub sheets: Mutex<HashMap<String, Vec<Vec<String>>>>,
    pub grants: Mutex<Vec<String>>,
    pub fail_create: bool,
    pub fail_grant: bool,
}

impl MemoryStore {
    pub fn content(&self, name: &str) -> Option<Vec<Vec<String>>> {
        self.sheets.lock().unwrap().get(name).cloned()
    }

    fn handle(name: &str) -> SheetHandle {
        SheetHandle {
            id: format!("sheet-{}", name.len()),
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl SheetStore for MemoryStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<SheetHandle>> {
        Ok(self
            .sheets
            .lock()
            .unwrap()
            .contains_key(name)
            .then(|| Self::handle(name)))
    }

    async fn create(&self, name: &str) -> Result<SheetHandle> {
        if self.fail_create {
            return Err(SyncError::destination("create", "HTTP 403: storage quota exceeded"));
        }
        self.sheets.lock().unwrap().insert(name.to_string(), Vec::new());
        Ok(Self::handle(name))
    }

    async fn grant_access(&self, _sheet: &SheetHandle, identity: &str) -> Result<()> {
        if self.fail_grant {
            return Err(SyncError::destination("grant_access", "HTTP 400: invalid sharing request"));
        }
        self.grants.lock().unwrap().push(identity.to_string());
        Ok(())
    }

    async fn clear(&self, sheet: &SheetHandle) -> Result<()> {
        if let Some(rows) = self.sheets.lock().unwrap().get_mut(&sheet.name) {
            rows.clear();
        }
        Ok(())
    }

    async fn append_rows(&self, sheet: &SheetHandle, rows: &[Vec<String>]) -> Result<()> {
        self.sheets
            .lock()
            .unwrap()
            .entry(sheet.name.clone())
            .or_default()
            .extend(rows.iter().cloned());
        Ok(())
    }

    fn locator(&self, sheet: &SheetHandle) -> String {
        format!("https://docs.google.com/spreadsheets/d/{}", sheet.id)
    }

    async fn list_all(&self) -> Result<Vec<SheetHandle>> {
        Ok(self
            .sheets
            .lock()
            .unwrap()
            .keys()
            .map(|name| Self::handle(name))
            .collect())
    }

    async fn delete(&self, sheet: &SheetHandle) -> Result<()> {
        self.sheets.lock().unwrap().remove(&sheet.name);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<MailMessage>>,
    pub fail: bool,
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn send(&self, message: &MailMessage) -> Result<()> {
        if self.fail {
            return Err(SyncError::MailError {
                message: "connection refused".to_string(),
            });
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

// Engines take ownership of their ports; these let a test keep inspecting the doubles.

#[async_trait]
impl<'a> MailTransport for &'a RecordingMailer {
    async fn send(&self, message: &MailMessage) -> Result<()> {
        (**self).send(message).await
    }
}

#[async_trait]
impl<'a> SheetStore for &'a MemoryStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<SheetHandle>> {
        (**self).find_by_name(name).await
    }

    async fn create(&self, name: &str) -> Result<SheetHandle> {
        (**self).create(name).await
    }

    async fn grant_access(&self, sheet: &SheetHandle, identity: &str) -> Result<()> {
        (**self).grant_access(sheet, identity).await
    }

    async fn clear(&self, sheet: &SheetHandle) -> Result<()> {
        (**self).clear(sheet).await
    }

    async fn append_rows(&self, sheet: &SheetHandle, rows: &[Vec<String>]) -> Result<()> {
        (**self).append_rows(sheet, rows).await
    }

    fn locator(&self, sheet: &SheetHandle) -> String {
        (**self).locator(sheet)
    }

    async fn list_all(&self) -> Result<Vec<SheetHandle>> {
        (**self).list_all().await
    }

    async fn delete(&self, sheet: &SheetHandle) -> Result<()> {
        (**self).delete(sheet).await
    }
}
