//! CandleSignalMonitor - Main Entry Point
//!
//! Polls Binance candles, evaluates the multi-timeframe rules and sends
//! Telegram alerts on every position transition.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use candle_signal_monitor::common::channels::create_shutdown_channel;
use candle_signal_monitor::config::load_config;
use candle_signal_monitor::{
    AlertSink, BinanceClient, InMemoryStateStore, Monitor, SqliteStateStore, StateStore,
    TelegramAlerts,
};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Named rule profile (sol, classic)
    #[arg(short, long, env = "MONITOR_PROFILE")]
    profile: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,

    /// Print price, RSI per timeframe and the stored position, then exit
    #[arg(long, conflicts_with = "once")]
    status: bool,
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn init_logging(level: Level, json: bool) -> Result<()> {
    // RUST_LOG wins over the configured level when present
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let config = load_config(Some(&args.config), args.profile.as_deref())
        .context("failed to load configuration")?;

    let level = parse_level(args.log_level.as_deref().unwrap_or(&config.settings.log_level));
    init_logging(level, args.log_json)?;

    info!("Starting CandleSignalMonitor");
    info!(
        config_file = %args.config,
        profile = config.profile.as_deref().unwrap_or("default"),
        symbol = %config.symbol,
        "Configuration loaded"
    );

    let timeout = Duration::from_secs(config.settings.request_timeout_seconds);
    let exchange = Arc::new(BinanceClient::new(&config.exchange, timeout)?);
    match exchange.check_health().await {
        Ok(true) => info!("Exchange reachable"),
        Ok(false) | Err(_) => warn!("Exchange ping failed, continuing"),
    }

    let store: Arc<dyn StateStore> = match &config.database {
        Some(db) => Arc::new(
            SqliteStateStore::connect(&db.url, db.max_connections)
                .await
                .context("failed to open state database")?,
        ),
        None => {
            warn!("No database configured, position will not survive restarts");
            Arc::new(InMemoryStateStore::new())
        }
    };

    let alerts: Arc<dyn AlertSink> = Arc::new(TelegramAlerts::new(&config.telegram, timeout)?);

    let can_sign = exchange.can_sign();
    let mut monitor = Monitor::new(Arc::new(config), exchange.clone(), store, alerts)?;
    if can_sign {
        monitor = monitor.with_balance_source(exchange);
    }

    if args.status {
        let snapshot = monitor.status().await?;
        print!("{}", snapshot);
        return Ok(());
    }

    if args.once {
        let outcome = monitor.run_cycle().await?;
        info!(?outcome, "Single cycle finished");
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = create_shutdown_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal, cleaning up...");
            shutdown_tx.send(true).ok();
        }
    });

    monitor.run(shutdown_rx).await?;

    Ok(())
}
