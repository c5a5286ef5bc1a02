use crate::adapters::csv_feed::USER_AGENT;
use crate::adapters::google::auth::fetch_access_token;
use crate::config::ServiceAccountKey;
use crate::core::SheetStore;
use crate::domain::model::SheetHandle;
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use url::Url;

const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";
const DRIVE_PAGE_SIZE: &str = "1000";

#[derive(Debug, Clone)]
pub struct GoogleEndpoints {
    pub sheets: String,
    pub drive: String,
    pub docs: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            sheets: "https://sheets.googleapis.com/v4".to_string(),
            drive: "https://www.googleapis.com/drive/v3".to_string(),
            docs: "https://docs.google.com/spreadsheets/d".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Spreadsheet {
    spreadsheet_id: String,
    #[serde(default)]
    sheets: Vec<Sheet>,
}

#[derive(Debug, Deserialize)]
struct Sheet {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
    #[serde(default)]
    index: u32,
}

/// Sheets v4 + Drive v3 over REST with a service-account bearer token.
#[derive(Debug, Clone)]
pub struct GoogleSheetsStore {
    client: Client,
    token: String,
    endpoints: GoogleEndpoints,
}

impl GoogleSheetsStore {
    pub async fn authorize(key: &ServiceAccountKey) -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        let token = fetch_access_token(&client, key).await?;
        Ok(Self::with_token(client, token, GoogleEndpoints::default()))
    }

    pub fn with_token(client: Client, token: String, endpoints: GoogleEndpoints) -> Self {
        Self {
            client,
            token,
            endpoints,
        }
    }

    async fn execute(&self, operation: &str, request: RequestBuilder) -> Result<Response> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| SyncError::destination(operation, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(SyncError::destination(
            operation,
            format!("HTTP {}: {}", status, body.trim()),
        ))
    }

    async fn execute_json<T: for<'de> Deserialize<'de>>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<T> {
        self.execute(operation, request)
            .await?
            .json()
            .await
            .map_err(|e| SyncError::destination(operation, e))
    }

    async fn search(&self, operation: &str, query: &str) -> Result<Vec<SheetHandle>> {
        let mut handles = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = vec![
                ("q", query.to_string()),
                ("fields", "nextPageToken,files(id,name)".to_string()),
                ("pageSize", DRIVE_PAGE_SIZE.to_string()),
            ];
            if let Some(token) = &page_token {
                params.push(("pageToken", token.clone()));
            }

            let request = self
                .client
                .get(format!("{}/files", self.endpoints.drive))
                .query(&params);
            let page: FileList = self.execute_json(operation, request).await?;

            handles.extend(page.files.into_iter().map(|f| SheetHandle {
                id: f.id,
                name: f.name,
            }));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(handles)
    }

    /// Quoted title of the spreadsheet's first tab, usable as an A1 range.
    async fn first_tab(&self, operation: &str, sheet: &SheetHandle) -> Result<String> {
        let request = self
            .client
            .get(format!("{}/spreadsheets/{}", self.endpoints.sheets, sheet.id))
            .query(&[("fields", "spreadsheetId,sheets.properties(title,index)")]);
        let spreadsheet: Spreadsheet = self.execute_json(operation, request).await?;

        let first = spreadsheet
            .sheets
            .into_iter()
            .min_by_key(|s| s.properties.index)
            .ok_or_else(|| {
                SyncError::destination(
                    operation,
                    format!("spreadsheet {} has no tabs", spreadsheet.spreadsheet_id),
                )
            })?;

        Ok(format!("'{}'", first.properties.title.replace('\'', "''")))
    }

    fn values_url(&self, operation: &str, sheet: &SheetHandle, range_action: &str) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}/spreadsheets/{}/values",
            self.endpoints.sheets, sheet.id
        ))
        .map_err(|e| SyncError::destination(operation, e))?;
        url.path_segments_mut()
            .map_err(|()| SyncError::destination(operation, "sheets endpoint cannot be a base"))?
            .push(range_action);
        Ok(url)
    }
}

/// Drive query literal for `name`.
pub fn drive_name_query(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
    format!(
        "name = '{}' and mimeType = '{}' and trashed = false",
        escaped, SPREADSHEET_MIME
    )
}

#[async_trait]
impl SheetStore for GoogleSheetsStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<SheetHandle>> {
        let mut matches = self.search("find_by_name", &drive_name_query(name)).await?;
        if matches.len() > 1 {
            tracing::warn!(
                "⚠️ {} spreadsheets are named '{}', using {}",
                matches.len(),
                name,
                matches[0].id
            );
        }
        Ok(if matches.is_empty() {
            None
        } else {
            Some(matches.swap_remove(0))
        })
    }

    async fn create(&self, name: &str) -> Result<SheetHandle> {
        let request = self
            .client
            .post(format!("{}/spreadsheets", self.endpoints.sheets))
            .json(&json!({ "properties": { "title": name } }));
        let created: Spreadsheet = self.execute_json("create", request).await?;

        Ok(SheetHandle {
            id: created.spreadsheet_id,
            name: name.to_string(),
        })
    }

    async fn grant_access(&self, sheet: &SheetHandle, identity: &str) -> Result<()> {
        let request = self
            .client
            .post(format!("{}/files/{}/permissions", self.endpoints.drive, sheet.id))
            .json(&json!({
                "type": "user",
                "role": "writer",
                "emailAddress": identity,
            }));
        self.execute("grant_access", request).await?;
        Ok(())
    }

    async fn clear(&self, sheet: &SheetHandle) -> Result<()> {
        let tab = self.first_tab("clear", sheet).await?;
        let url = self.values_url("clear", sheet, &format!("{}:clear", tab))?;
        let request = self.client.post(url).json(&json!({}));
        self.execute("clear", request).await?;
        Ok(())
    }

    async fn append_rows(&self, sheet: &SheetHandle, rows: &[Vec<String>]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let tab = self.first_tab("append_rows", sheet).await?;
        let url = self.values_url("append_rows", sheet, &format!("{}!A1:append", tab))?;
        // fills the cleared cells in place so the grid size stays fixed across runs
        let request = self
            .client
            .post(url)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "OVERWRITE"),
            ])
            .json(&json!({ "majorDimension": "ROWS", "values": rows }));
        self.execute("append_rows", request).await?;
        Ok(())
    }

    fn locator(&self, sheet: &SheetHandle) -> String {
        format!("{}/{}", self.endpoints.docs, sheet.id)
    }

    async fn list_all(&self) -> Result<Vec<SheetHandle>> {
        let query = format!("mimeType = '{}' and trashed = false", SPREADSHEET_MIME);
        self.search("list_all", &query).await
    }

    async fn delete(&self, sheet: &SheetHandle) -> Result<()> {
        let request = self
            .client
            .delete(format!("{}/files/{}", self.endpoints.drive, sheet.id));
        self.execute("delete", request).await?;
        Ok(())
    }
}
