//! tickwatch - single security price monitor.
//!
//! Polls a quote endpoint on an interval, alerts once per threshold
//! crossing, and appends every sample to a CSV journal.

mod config;
mod monitor;
mod state;

use clap::Parser;
use config::AppConfig;
use monitor::{CycleOutcome, Monitor};
use state::create_state;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tickwatch_alerts::{AlertSink, TelegramSink, TerminalSink};
use tickwatch_feeds::YahooChartSource;
use tickwatch_journal::DataJournal;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Price monitor CLI
#[derive(Parser, Debug)]
#[command(name = "tickwatch")]
#[command(about = "Single-security threshold monitor with a CSV journal", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.json")]
    config: String,

    /// Mode: run, check, latest
    #[arg(short, long, default_value = "run")]
    mode: String,

    /// Security symbol to watch (overrides the config file)
    #[arg(short, long)]
    symbol: Option<String>,

    /// Low alert threshold (overrides the config file)
    #[arg(long)]
    low: Option<f64>,

    /// High alert threshold (overrides the config file)
    #[arg(long)]
    high: Option<f64>,

    /// Poll interval in seconds (overrides the config file)
    #[arg(short, long)]
    interval: Option<u64>,

    /// Backoff after a failed fetch in seconds (overrides the config file)
    #[arg(long)]
    backoff: Option<u64>,

    /// Journal file path (overrides the config file)
    #[arg(short, long)]
    journal: Option<String>,

    /// Log level: trace, debug, info, warn, error (overrides the config file)
    #[arg(short, long)]
    log_level: Option<String>,
}

fn init_logging(level: &str) {
    let level = match level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Run mode parsed from the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunMode {
    Run,
    Check,
    Latest,
}

fn parse_mode(mode: &str) -> RunMode {
    match mode.to_lowercase().as_str() {
        "check" => RunMode::Check,
        "latest" => RunMode::Latest,
        _ => RunMode::Run,
    }
}

fn apply_overrides(config: &mut AppConfig, args: &Args) {
    if let Some(symbol) = &args.symbol {
        config.monitor.symbol = symbol.as_str().into();
    }
    if let Some(low) = args.low {
        config.monitor.low_threshold = low;
    }
    if let Some(high) = args.high {
        config.monitor.high_threshold = high;
    }
    if let Some(interval) = args.interval {
        config.monitor.poll_interval_secs = interval;
    }
    if let Some(backoff) = args.backoff {
        config.monitor.backoff_secs = backoff;
    }
    if let Some(journal) = &args.journal {
        config.journal_path = journal.clone();
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let mut config = match AppConfig::load_or_default(&args.config) {
        Ok(config) => config,
        Err(e) => {
            init_logging("info");
            error!("Failed to load config {}: {}", args.config, e);
            return ExitCode::FAILURE;
        }
    };
    apply_overrides(&mut config, &args);

    init_logging(&config.log_level);

    let mode = parse_mode(&args.mode);

    info!("🚀 tickwatch starting...");
    info!("  Mode: {:?}", mode);
    info!("  Symbol: {}", config.monitor.symbol);
    info!(
        "  Watch band: {} - {}",
        config.monitor.low_threshold, config.monitor.high_threshold
    );
    info!("  Poll interval: {}s", config.monitor.poll_interval_secs);
    info!("  Backoff: {}s", config.monitor.backoff_secs);
    info!("  Journal: {}", config.journal_path);

    let journal = DataJournal::new(&config.journal_path);

    // The read-back mode needs no source or sink
    if mode == RunMode::Latest {
        return run_latest(&journal);
    }

    let source = match YahooChartSource::new() {
        Ok(source) => Arc::new(source),
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let sink: Arc<dyn AlertSink> = match TelegramSink::from_env() {
        Some(sink) => {
            info!("  Alerts: Telegram");
            Arc::new(sink)
        }
        None => {
            info!("  Alerts: terminal (TELEGRAM_BOT_TOKEN/TELEGRAM_CHAT_ID not set)");
            Arc::new(TerminalSink)
        }
    };

    let monitor = match Monitor::new(config.monitor.clone(), source, journal, sink) {
        Ok(monitor) => monitor,
        Err(e) => {
            error!("Invalid thresholds: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if mode == RunMode::Check {
        return run_check(monitor).await;
    }

    run_forever(monitor).await
}

async fn run_forever(monitor: Monitor) -> ExitCode {
    let state = create_state();
    state.start();

    let loop_state = state.clone();
    let loop_handle = tokio::spawn(async move {
        monitor.run(loop_state).await;
    });

    // Handle shutdown
    info!("Press Ctrl+C to stop...");

    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for Ctrl+C");

    warn!("Shutdown signal received");
    state.stop();

    // Wait for the loop to notice the stop flag
    let _ = tokio::time::timeout(Duration::from_secs(2), loop_handle).await;

    // Final stats
    let summary = state.stats.summary();
    info!("📈 Final Stats:");
    info!("  Total uptime: {} seconds", summary.uptime_secs);
    info!("  Cycles completed: {}", summary.cycles_completed);
    info!("  Failed fetches: {}", summary.fetch_failures);
    info!("  Alerts fired: {}", summary.alerts_fired);
    info!("  Records written: {}", summary.records_written);
    info!("  Duplicates skipped: {}", summary.duplicates_skipped);

    info!("👋 tickwatch stopped");
    ExitCode::SUCCESS
}

async fn run_check(mut monitor: Monitor) -> ExitCode {
    match monitor.run_cycle().await {
        Ok(CycleOutcome::Checked { alerted, journaled }) => {
            info!(
                "✅ Check complete ({}{})",
                if journaled { "journaled" } else { "duplicate, skipped" },
                if alerted { ", alert fired" } else { "" }
            );
            ExitCode::SUCCESS
        }
        Ok(CycleOutcome::Unavailable) => {
            error!("Price data unavailable");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Journal write failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_latest(journal: &DataJournal) -> ExitCode {
    match journal.latest() {
        Ok(Some(record)) => {
            info!("Latest record:");
            info!("  Time: {} {}", record.date, record.time);
            info!(
                "  Open: {:.2} High: {:.2} Low: {:.2} Close: {:.2}",
                record.open, record.high, record.low, record.close
            );
            info!("  Volume: {}", record.volume);
            info!(
                "  Change: {:.2} ({:.2}%)",
                record.price_change, record.change_percentage
            );
            ExitCode::SUCCESS
        }
        Ok(None) => {
            warn!("Journal {} has no records yet", journal.path().display());
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Failed to read journal: {}", e);
            ExitCode::FAILURE
        }
    }
}
