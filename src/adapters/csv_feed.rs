use crate::core::window::WindowFilter;
use crate::core::{FeedSource, RawRecord};
use crate::utils::error::{Result, SyncError};
use futures::TryStreamExt;
use reqwest::Client;
use std::io::Read;
use std::time::Duration;
use tokio_util::io::{StreamReader, SyncIoBridge};

pub const USER_AGENT: &str = concat!("transit-sync/", env!("CARGO_PKG_VERSION"));

/// Reads a header-first CSV one record at a time into `filter`.
///
/// Rows shorter than the header are allowed (missing cells read as absent). A row that
/// is not valid UTF-8 is counted as malformed and skipped; any I/O error ends the scan.
pub fn scan_csv<R: Read>(reader: R, filter: &mut WindowFilter) -> Result<()> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    tracing::debug!("Feed columns: {:?}", headers);

    let mut record = csv::StringRecord::new();
    loop {
        match csv_reader.read_record(&mut record) {
            Ok(true) => {
                filter.push(&RawRecord::from_csv(&headers, &record));
            }
            Ok(false) => break,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Utf8 { .. }) => {
                tracing::trace!("Skipping undecodable row: {}", e);
                filter.skip_malformed();
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

/// CSV feed served over HTTP, consumed as a stream.
#[derive(Debug, Clone)]
pub struct HttpCsvSource {
    client: Client,
    url: String,
}

impl HttpCsvSource {
    pub fn new(url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            url: url.to_string(),
        })
    }
}

impl FeedSource for HttpCsvSource {
    async fn drain_into(&self, filter: WindowFilter) -> Result<WindowFilter> {
        tracing::debug!("Requesting feed: {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(SyncError::fetch)?;

        let status = response.status();
        tracing::debug!("Feed response status: {}", status);
        if !status.is_success() {
            return Err(SyncError::FetchError {
                message: format!("{} returned HTTP {}", self.url, status),
            });
        }

        let body = Box::pin(response.bytes_stream().map_err(std::io::Error::other));
        let bridge = SyncIoBridge::new(StreamReader::new(body));

        // csv is a blocking reader; the bridge pulls the body chunk by chunk
        let task = tokio::task::spawn_blocking(move || {
            let mut filter = filter;
            scan_csv(bridge, &mut filter).map(|()| filter)
        });

        task.await
            .map_err(|e| SyncError::fetch(format!("feed reader task failed: {}", e)))?
    }
}
