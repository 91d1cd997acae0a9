mod bot;
mod collector;
mod feeds;
mod refresher;
mod server;
mod settings;

use crate::bot::telegram::{Alerter, TelegramClient};
use crate::collector::Collector;
use crate::feeds::{FeedCatalog, MirrorStore};
use crate::refresher::{PeriodicRefresher, today_utc};
use crate::server::AppState;
use crate::settings::AppSettings;
use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use livescore_api::client::ScoresApi;
use livescore_api::livescore::DATE_FORMAT;
use livescore_api::{FsSnapshotStore, SnapshotStore, classify};
use log::{LevelFilter, error, info};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "goal2gol", version, about = "Football schedule collector, scores API and Telegram bot")]
#[command(after_help = "Environment:
  GOAL2GOL_DATA_DIR       Data directory (default ./data)
  GOAL2GOL_LISTEN         API listen address (default 0.0.0.0:8000)
  GOAL2GOL_MERGE_POLICY   keep-latest (default) or keep-first
  GOAL2GOL_SEASON         Standings season (default 2025-2026)
  GOAL2GOL_FEEDS_JSON     Feed catalog override
  GOAL2GOL_LOG            Log level when neither --log-level nor RUST_LOG is set
  TELEGRAM_BOT_TOKEN      Bot token for `bot` and collector alerts
  TELEGRAM_CHAT_ID        Chat that receives collector alerts")]
struct Cli {
    /// Log level (error, warn, info, debug, trace). Overrides RUST_LOG and GOAL2GOL_LOG.
    #[arg(long, global = true, value_parser = parse_level)]
    log_level: Option<LevelFilter>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mirror feeds and store today's merged schedule.
    Collect {
        /// Collect for this UTC date instead of today (YYYYMMDD). One-shot only.
        #[arg(long, value_parser = parse_date, conflicts_with = "every")]
        date: Option<NaiveDate>,

        /// Stay resident and collect again every SECS seconds.
        #[arg(long, value_name = "SECS")]
        every: Option<u64>,
    },
    /// Serve the scores API.
    Serve {
        #[arg(long)]
        listen: Option<SocketAddr>,
    },
    /// Answer Telegram commands from the latest snapshot.
    Bot,
    /// Print a summary of the latest snapshot.
    Show,
}

fn parse_level(raw: &str) -> Result<LevelFilter, String> {
    raw.parse().map_err(|_| format!("unknown log level {raw:?}"))
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| format!("expected YYYYMMDD: {e}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = AppSettings::load()?;

    init_logging(cli.log_level, settings.log_level);
    better_panic::install();

    let store: Arc<dyn SnapshotStore> = Arc::new(FsSnapshotStore::new(settings.schedules_dir()));

    match cli.command {
        Command::Collect { date, every } => collect(&settings, store, date, every).await,
        Command::Serve { listen } => {
            let state = AppState {
                store,
                mirror: MirrorStore::new(&settings.data_dir),
            };
            server::serve(listen.unwrap_or(settings.listen_addr), state).await
        }
        Command::Bot => {
            let Some(token) = settings.telegram.token() else {
                error!("Telegram bot token not configured. Exiting.");
                return Ok(());
            };
            bot::run(TelegramClient::new(token), store).await;
            Ok(())
        }
        Command::Show => {
            show(store.as_ref());
            Ok(())
        }
    }
}

fn init_logging(flag: Option<LevelFilter>, configured: Option<LevelFilter>) {
    let directive = log_directive(flag, std::env::var(EnvFilter::DEFAULT_ENV).ok(), configured);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// `--log-level`, then `RUST_LOG`, then `GOAL2GOL_LOG`, then info.
fn log_directive(flag: Option<LevelFilter>, rust_log: Option<String>, configured: Option<LevelFilter>) -> String {
    let level = |level: LevelFilter| level.as_str().to_ascii_lowercase();
    flag.map(level)
        .or_else(|| rust_log.filter(|raw| !raw.trim().is_empty()))
        .or_else(|| configured.map(level))
        .unwrap_or_else(|| "info".to_owned())
}

async fn collect(
    settings: &AppSettings,
    store: Arc<dyn SnapshotStore>,
    date: Option<NaiveDate>,
    every: Option<u64>,
) -> anyhow::Result<()> {
    let catalog = FeedCatalog::load(settings.feeds_path.as_deref())?;
    info!(
        "collecting with {} merge policy and {} mirrored feeds",
        settings.merge_policy,
        catalog.len()
    );

    let api = ScoresApi::new()
        .with_livescore_base(&settings.livescore_base_url)
        .with_sportsdb_base(&settings.sportsdb_base_url);
    let alerter = match (settings.telegram.token(), settings.telegram.chat_id.as_deref()) {
        (Some(token), Some(chat_id)) => Some(Alerter::new(TelegramClient::new(token), chat_id)),
        _ => None,
    };
    let collector = Collector::new(
        api,
        store,
        MirrorStore::new(&settings.data_dir),
        catalog,
        settings.merge_policy,
        settings.season.clone(),
    )
    .with_alerter(alerter);

    let first = collector.run(date.unwrap_or_else(today_utc)).await;

    match every.filter(|secs| *secs > 0) {
        None => first.map(|_| ()).context("collection failed"),
        Some(secs) => {
            info!("staying resident, collecting every {secs}s");
            PeriodicRefresher::new(collector, Duration::from_secs(secs)).run().await;
            Ok(())
        }
    }
}

fn show(store: &dyn SnapshotStore) {
    let Some(snapshot) = store.latest() else {
        println!("no snapshot available");
        return;
    };
    let classification = classify(&snapshot.schedule);
    println!(
        "snapshot {}: {} stages, {} events ({} live, {} upcoming)",
        snapshot.key,
        snapshot.schedule.stages.len(),
        classification.all.len(),
        classification.live.len(),
        classification.upcoming.len()
    );
    for view in &classification.live {
        println!("  [{}] {}", view.league_name, bot::replies::fmt_row(view));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_flag_beats_rust_log_which_beats_the_setting() {
        let rust_log = || Some("goal2gol=trace".to_owned());
        assert_eq!(
            log_directive(Some(LevelFilter::Warn), rust_log(), Some(LevelFilter::Debug)),
            "warn"
        );
        assert_eq!(log_directive(None, rust_log(), Some(LevelFilter::Debug)), "goal2gol=trace");
        assert_eq!(log_directive(None, Some(" ".into()), Some(LevelFilter::Debug)), "debug");
        assert_eq!(log_directive(None, None, None), "info");
    }

    #[test]
    fn collect_date_is_one_shot() {
        let cli = Cli::try_parse_from(["goal2gol", "collect", "--date", "20250115"]).unwrap();
        assert!(matches!(cli.command, Command::Collect { date: Some(_), every: None }));

        let err = Cli::try_parse_from(["goal2gol", "collect", "--date", "20250115", "--every", "60"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
