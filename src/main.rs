use chrono::{Local, NaiveDateTime};
use clap::Parser;
use std::time::Duration;
use transit_sync::config::Command;
use transit_sync::core::cleanup::purge_spreadsheets;
use transit_sync::core::engine::fetch_window;
use transit_sync::core::notify::Notifier;
use transit_sync::utils::monitor::SystemMonitor;
use transit_sync::utils::logger::{self, LogFormat};
use transit_sync::utils::validation::Validate;
use transit_sync::{
    CliConfig, Credentials, GoogleSheetsStore, HttpCsvSource, SmtpMailer, SyncConfig, SyncEngine,
    SyncError,
};

const PREVIEW_ROWS: usize = 5;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    logger::init_logger(format, cli.verbose);

    tracing::info!("🚀 Starting transit-sync");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let now = cli.as_of.unwrap_or_else(|| Local::now().naive_local());

    let result = match cli.command() {
        Command::Run => run(&cli, now).await,
        Command::Cleanup => cleanup().await,
    };

    if let Err(e) = result {
        tracing::error!("❌ {} (Category: {:?})", e, e.category());
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: &CliConfig, now: NaiveDateTime) -> Result<(), SyncError> {
    tracing::info!("📁 Loading configuration from: {}", cli.config);
    let config = SyncConfig::from_file(&cli.config)?;
    config.validate()?;
    tracing::info!("✅ Configuration loaded and validated successfully");

    let source = HttpCsvSource::new(
        &config.source.url,
        config.timeout_seconds().map(Duration::from_secs),
    )?;

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written or sent");
        let monitor = SystemMonitor::new(cli.monitor);
        let (rows, _) = fetch_window(&config, &source, now).await?;
        monitor.log_final_stats();
        for row in rows.rows.iter().take(PREVIEW_ROWS) {
            tracing::info!("  {}", row.join(" | "));
        }
        println!("🔍 {} rows would be synced to '{}'", rows.len(), config.destination.name);
        return Ok(());
    }

    let credentials = Credentials::from_env()?;
    let store = GoogleSheetsStore::authorize(&credentials.service_account).await?;

    let notifier = match &credentials.mail {
        Some(mail) => {
            let mailer = SmtpMailer::new(config.smtp_host(), config.smtp_port(), mail)?;
            Some(Notifier::new(mailer, &mail.sender, &mail.recipient))
        }
        None => {
            tracing::info!("📭 Mail credentials not set, the summary email will be skipped");
            None
        }
    };

    let mut engine = SyncEngine::new(config, source, store)
        .with_default_share(credentials.recipient())
        .with_monitoring(cli.monitor);
    if let Some(notifier) = notifier {
        engine = engine.with_notifier(notifier);
    }

    let report = engine.run(now).await?;

    tracing::info!("✅ Sync completed successfully!");
    println!(
        "✅ {} records ({} to {}) synced to {}",
        report.summary.record_count,
        report.summary.window_start,
        report.summary.window_end,
        report.summary.destination.url
    );
    Ok(())
}

async fn cleanup() -> Result<(), SyncError> {
    let credentials = Credentials::from_env()?;
    let store = GoogleSheetsStore::authorize(&credentials.service_account).await?;

    let report = purge_spreadsheets(&store).await?;

    println!(
        "🧹 Cleanup complete: {} found, {} deleted, {} failed",
        report.found,
        report.deleted.len(),
        report.failed.len()
    );
    Ok(())
}
