use crate::domain::model::{AccessGrant, DestinationRef, ResultSet, SheetHandle, SyncReport};
use crate::domain::ports::SheetStore;
use crate::utils::error::Result;

/// Replaces the named spreadsheet's content with `header` followed by `rows`.
///
/// The spreadsheet is created when missing and then shared with `share_with`; a failed
/// share is reported in [`SyncReport::access`] rather than returned as an error. Every
/// other store failure aborts the sync.
pub async fn sync_destination<S: SheetStore + ?Sized>(
    store: &S,
    name: &str,
    share_with: Option<&str>,
    header: &[String],
    rows: &ResultSet,
) -> Result<SyncReport> {
    let (sheet, created) = match store.find_by_name(name).await? {
        Some(existing) => {
            tracing::info!("📄 Reusing spreadsheet '{}' ({})", existing.name, existing.id);
            (existing, false)
        }
        None => {
            let sheet = store.create(name).await?;
            tracing::info!("🆕 Created spreadsheet '{}' ({})", sheet.name, sheet.id);
            (sheet, true)
        }
    };

    let access = if created {
        share_new_sheet(store, &sheet, share_with).await
    } else {
        AccessGrant::NotRequested
    };

    store.clear(&sheet).await?;

    let mut values = Vec::with_capacity(rows.len() + 1);
    values.push(header.to_vec());
    values.extend(rows.rows.iter().cloned());
    store.append_rows(&sheet, &values).await?;

    tracing::info!("✍️ Wrote header + {} rows to '{}'", rows.len(), sheet.name);

    Ok(SyncReport {
        destination: DestinationRef {
            url: store.locator(&sheet),
            id: sheet.id,
        },
        created,
        access,
        rows_written: rows.len(),
    })
}

async fn share_new_sheet<S: SheetStore + ?Sized>(
    store: &S,
    sheet: &SheetHandle,
    share_with: Option<&str>,
) -> AccessGrant {
    let Some(identity) = share_with else {
        return AccessGrant::NotRequested;
    };

    match store.grant_access(sheet, identity).await {
        Ok(()) => AccessGrant::Granted {
            identity: identity.to_string(),
        },
        Err(e) => AccessGrant::Failed {
            identity: identity.to_string(),
            reason: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::SyncError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        sheets: Mutex<HashMap<String, Vec<Vec<String>>>>,
        grants: Mutex<Vec<(String, String)>>,
        calls: Mutex<Vec<String>>,
        fail_grant: bool,
        fail_append: bool,
    }

    impl MemoryStore {
        fn record(&self, call: &str) {
            self.calls.lock().unwrap().push(call.to_string());
        }

        fn content(&self, name: &str) -> Vec<Vec<String>> {
            self.sheets.lock().unwrap().get(name).cloned().unwrap_or_default()
        }
    }

    fn handle(name: &str) -> SheetHandle {
        SheetHandle {
            id: format!("id-{}", name),
            name: name.to_string(),
        }
    }

    #[async_trait]
    impl SheetStore for MemoryStore {
        async fn find_by_name(&self, name: &str) -> Result<Option<SheetHandle>> {
            self.record("find");
            Ok(self
                .sheets
                .lock()
                .unwrap()
                .contains_key(name)
                .then(|| handle(name)))
        }

        async fn create(&self, name: &str) -> Result<SheetHandle> {
            self.record("create");
            self.sheets.lock().unwrap().insert(name.to_string(), Vec::new());
            Ok(handle(name))
        }

        async fn grant_access(&self, sheet: &SheetHandle, identity: &str) -> Result<()> {
            self.record("grant");
            if self.fail_grant {
                return Err(SyncError::destination("grant_access", "403 Forbidden"));
            }
            self.grants
                .lock()
                .unwrap()
                .push((sheet.id.clone(), identity.to_string()));
            Ok(())
        }

        async fn clear(&self, sheet: &SheetHandle) -> Result<()> {
            self.record("clear");
            if let Some(content) = self.sheets.lock().unwrap().get_mut(&sheet.name) {
                content.clear();
            }
            Ok(())
        }

        async fn append_rows(&self, sheet: &SheetHandle, rows: &[Vec<String>]) -> Result<()> {
            self.record("append");
            if self.fail_append {
                return Err(SyncError::destination("append_rows", "quota exceeded"));
            }
            self.sheets
                .lock()
                .unwrap()
                .entry(sheet.name.clone())
                .or_default()
                .extend(rows.iter().cloned());
            Ok(())
        }

        fn locator(&self, sheet: &SheetHandle) -> String {
            format!("https://sheets.test/d/{}", sheet.id)
        }

        async fn list_all(&self) -> Result<Vec<SheetHandle>> {
            Ok(self.sheets.lock().unwrap().keys().map(|n| handle(n)).collect())
        }

        async fn delete(&self, sheet: &SheetHandle) -> Result<()> {
            self.sheets.lock().unwrap().remove(&sheet.name);
            Ok(())
        }
    }

    fn header() -> Vec<String> {
        vec!["Docket".to_string(), "Date".to_string()]
    }

    fn result_set(rows: &[(&str, &str)]) -> ResultSet {
        ResultSet {
            rows: rows
                .iter()
                .map(|(a, b)| vec![a.to_string(), b.to_string()])
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_creates_and_shares_missing_sheet() {
        let store = MemoryStore::default();
        let rows = result_set(&[("D-20", "06/20/2024"), ("D-14", "06/14/2024")]);

        let report = sync_destination(&store, "Filings", Some("ops@example.org"), &header(), &rows)
            .await
            .unwrap();

        assert!(report.created);
        assert_eq!(
            report.access,
            AccessGrant::Granted {
                identity: "ops@example.org".to_string()
            }
        );
        assert_eq!(report.rows_written, 2);
        assert_eq!(report.destination.id, "id-Filings");
        assert!(report.destination.url.contains(&report.destination.id));

        let content = store.content("Filings");
        assert_eq!(content.len(), 3);
        assert_eq!(content[0], header());
        assert_eq!(content[1][0], "D-20");
        assert_eq!(
            *store.calls.lock().unwrap(),
            vec!["find", "create", "grant", "clear", "append"]
        );
    }

    #[tokio::test]
    async fn test_existing_sheet_is_fully_replaced() {
        let store = MemoryStore::default();
        store.sheets.lock().unwrap().insert(
            "Filings".to_string(),
            vec![vec!["stale".to_string()], vec!["rows".to_string()]],
        );
        let rows = result_set(&[("D-1", "06/30/2024")]);

        let report = sync_destination(&store, "Filings", Some("ops@example.org"), &header(), &rows)
            .await
            .unwrap();

        assert!(!report.created);
        assert_eq!(report.access, AccessGrant::NotRequested);
        assert!(store.grants.lock().unwrap().is_empty());
        assert_eq!(
            store.content("Filings"),
            vec![header(), vec!["D-1".to_string(), "06/30/2024".to_string()]]
        );
    }

    #[tokio::test]
    async fn test_repeated_sync_is_idempotent() {
        let store = MemoryStore::default();
        let rows = result_set(&[("D-2", "06/29/2024"), ("D-1", "06/28/2024")]);

        sync_destination(&store, "Filings", None, &header(), &rows)
            .await
            .unwrap();
        let first = store.content("Filings");
        sync_destination(&store, "Filings", None, &header(), &rows)
            .await
            .unwrap();

        assert_eq!(store.content("Filings"), first);
    }

    #[tokio::test]
    async fn test_grant_failure_is_not_fatal() {
        let store = MemoryStore {
            fail_grant: true,
            ..Default::default()
        };

        let report = sync_destination(
            &store,
            "Filings",
            Some("ops@example.org"),
            &header(),
            &ResultSet::default(),
        )
        .await
        .unwrap();

        assert!(matches!(report.access, AccessGrant::Failed { .. }));
        assert_eq!(store.content("Filings"), vec![header()]);
    }

    #[tokio::test]
    async fn test_write_failure_propagates() {
        let store = MemoryStore {
            fail_append: true,
            ..Default::default()
        };

        let err = sync_destination(&store, "Filings", None, &header(), &ResultSet::default())
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::DestinationError { .. }));
    }
}
