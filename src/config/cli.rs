use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "transit-sync")]
#[command(about = "Mirror the last days of a transit dataset into a spreadsheet and mail a summary")]
pub struct CliConfig {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "sync-config.toml")]
    pub config: String,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit JSON log lines")]
    pub json_logs: bool,

    #[arg(long, help = "Log process CPU and memory after each phase")]
    pub monitor: bool,

    /// Fetch and filter only; no spreadsheet or mail side effects
    #[arg(long)]
    pub dry_run: bool,

    /// Run as if it were this moment (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)
    #[arg(long, value_parser = parse_as_of)]
    pub as_of: Option<NaiveDateTime>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Fetch, filter, sync and notify (default)
    Run,
    /// Delete every spreadsheet visible to the service account
    Cleanup,
}

impl CliConfig {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Run)
    }
}

fn parse_as_of(value: &str) -> Result<NaiveDateTime, String> {
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(ts);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| format!("expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS, got '{}'", value))
}
