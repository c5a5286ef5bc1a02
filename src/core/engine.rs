use crate::core::notify::Notifier;
use crate::core::sync::sync_destination;
use crate::core::window::{FilterStats, WindowFilter};
use crate::core::{ConfigProvider, FeedSource, MailTransport, SheetStore};
use crate::domain::model::{
    AccessGrant, NotifyOutcome, ResultSet, RunSummary, SyncReport, Window,
};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use chrono::NaiveDateTime;

#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: RunSummary,
    pub stats: FilterStats,
    pub sync: SyncReport,
    pub notification: NotifyOutcome,
}

/// Runs fetch+filter, sync and notify strictly in that order. A failure in the first
/// two phases aborts the run; notification can only be reported, never fail it.
pub struct SyncEngine<C: ConfigProvider, F: FeedSource, S: SheetStore, M: MailTransport> {
    config: C,
    source: F,
    store: S,
    notifier: Option<Notifier<M>>,
    share_with: Option<String>,
    monitor: SystemMonitor,
}

impl<C, F, S, M> SyncEngine<C, F, S, M>
where
    C: ConfigProvider,
    F: FeedSource,
    S: SheetStore,
    M: MailTransport,
{
    pub fn new(config: C, source: F, store: S) -> Self {
        let share_with = config.share_with().map(str::to_string);
        Self {
            config,
            source,
            store,
            notifier: None,
            share_with,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn with_notifier(mut self, notifier: Notifier<M>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Identity granted write access to a newly created spreadsheet, unless the config
    /// already names one.
    pub fn with_default_share(mut self, identity: Option<&str>) -> Self {
        if self.share_with.is_none() {
            self.share_with = identity.map(str::to_string);
        }
        self
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor = SystemMonitor::new(enabled);
        self
    }

    /// Fetch and filter only.
    pub async fn extract(&self, now: NaiveDateTime) -> Result<(ResultSet, FilterStats)> {
        let extracted = fetch_window(&self.config, &self.source, now).await?;
        self.monitor.log_stats("Fetch & filter");
        Ok(extracted)
    }

    pub async fn run(&self, now: NaiveDateTime) -> Result<RunReport> {
        let (rows, stats) = self.extract(now).await?;
        let window = Window::ending_at(now, self.config.window_days())?;

        tracing::info!("📤 Syncing {} rows to '{}'", rows.len(), self.config.destination_name());
        let sync = sync_destination(
            &self.store,
            self.config.destination_name(),
            self.share_with.as_deref(),
            self.config.columns(),
            &rows,
        )
        .await?;
        match &sync.access {
            AccessGrant::Granted { identity } => {
                tracing::info!("🔑 Shared spreadsheet with {}", identity)
            }
            AccessGrant::Failed { identity, reason } => {
                tracing::warn!("⚠️ Could not share spreadsheet with {}: {}", identity, reason)
            }
            AccessGrant::NotRequested => {}
        }
        self.monitor.log_stats("Sync");

        let summary = RunSummary {
            window_start: window.first_full_day(),
            window_end: window.now.date(),
            record_count: sync.rows_written,
            destination: sync.destination.clone(),
        };

        let notification = match &self.notifier {
            Some(notifier) => notifier.notify(&summary).await,
            None => NotifyOutcome::Skipped {
                reason: "mail credentials not configured".to_string(),
            },
        };
        match &notification {
            NotifyOutcome::Sent { recipient } => tracing::info!("📧 Summary sent to {}", recipient),
            NotifyOutcome::Skipped { reason } => {
                tracing::info!("📭 Notification skipped: {}", reason)
            }
            NotifyOutcome::Failed { reason } => {
                tracing::warn!("⚠️ Notification failed: {}", reason)
            }
        }
        self.monitor.log_final_stats();

        Ok(RunReport {
            summary,
            stats,
            sync,
            notification,
        })
    }
}

/// Streams the feed through a fresh window filter ending at `now`.
pub async fn fetch_window<C, F>(
    config: &C,
    source: &F,
    now: NaiveDateTime,
) -> Result<(ResultSet, FilterStats)>
where
    C: ConfigProvider,
    F: FeedSource,
{
    let filter = WindowFilter::new(
        now,
        config.window_days(),
        config.date_field(),
        config.columns(),
    )?;
    let window = filter.window();

    tracing::info!(
        "📥 Fetching {} (window {} to {})",
        config.source_url(),
        window.first_full_day(),
        window.now.date()
    );
    let filter = source.drain_into(filter).await?;
    let (rows, stats) = filter.finish();

    tracing::info!(
        "🔎 Scanned {} rows: kept {}, outside window {}, missing date {}, unparsable {}, future {}, malformed {}",
        stats.scanned,
        stats.kept,
        stats.outside_window,
        stats.missing_date,
        stats.unparsable_date,
        stats.future_date,
        stats.malformed_rows
    );

    Ok((rows, stats))
}
