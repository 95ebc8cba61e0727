mod alerting;
mod clock;
mod credentials;
mod events;
mod finnhub;
mod market;
mod notify;
mod scenario;
mod session;
mod telegram;
mod types;
mod watch;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::alerting::threshold_alerter::ThresholdAlerter;
use crate::clock::system_clock::SystemClock;
use crate::credentials::{EnvSource, ProcessEnv};
use crate::scenario::notifiers::NotifierKind;
use crate::scenario::scenario::Scenario;
use crate::scenario::sessions::SessionMode;
use crate::types::symbol::Symbol;
use crate::types::trading_hours::TradingHours;
use crate::watch::commit_policy::CommitPolicy;
use crate::watch::watch_loop::WatchLoop;

#[derive(Debug, Clone, Parser)]
#[command(about = "Watches one symbol and alerts on whole-step price moves")]
struct Args {
    #[arg(long, env = "SYMBOL", default_value = "ASTS")]
    pub symbol: String,

    /// Price move in USD that triggers an alert
    #[arg(long, env = "THRESHOLD_USD", default_value_t = 1.0)]
    pub threshold_usd: f64,

    #[arg(long, env = "POLL_SECONDS", default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_seconds: u64,

    #[arg(long, env = "MIN_ALERT_GAP_SECONDS", default_value_t = 20)]
    pub min_alert_gap_seconds: u32,

    #[arg(long, env = "SESSION_MODE", value_enum, default_value = "market")]
    pub session: SessionMode,

    #[arg(long, env = "NOTIFIER", value_enum, default_value = "telegram")]
    pub notifier: NotifierKind,

    #[arg(long, env = "COMMIT_POLICY", value_enum, default_value = "always")]
    pub commit_policy: CommitPolicy,

    #[arg(long, env = "MARKET_TIMEZONE", default_value = "America/New_York")]
    pub market_timezone: String,

    #[arg(long, env = "MARKET_OPEN", default_value = "09:30")]
    pub market_open: String,

    #[arg(long, env = "MARKET_CLOSE", default_value = "16:00")]
    pub market_close: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pricewatch=info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let watch_loop = build_watch_loop(&args, &ProcessEnv).context("invalid configuration")?;

    tokio::select! {
        _ = watch_loop.run() => {}
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for shutdown signal")?;
            info!("shutdown requested");
        }
    }

    Ok(())
}

fn build_watch_loop(args: &Args, env: &dyn EnvSource) -> Result<WatchLoop> {
    let symbol = Symbol::parse(&args.symbol)?;
    let alerter = ThresholdAlerter::new(
        symbol.clone(),
        args.threshold_usd,
        Duration::from_secs(u64::from(args.min_alert_gap_seconds)),
    )?;
    let trading_hours =
        TradingHours::parse(&args.market_timezone, &args.market_open, &args.market_close)?;

    let price_source = Scenario::price_source(env)?;
    let notifier = Scenario::notifier(args.notifier, env)?;

    let mut watch_loop = WatchLoop::new(symbol, alerter, price_source, notifier)
        .with_clock(Box::new(SystemClock))
        .with_poll_interval(Duration::from_secs(args.poll_seconds))
        .with_commit_policy(args.commit_policy);

    if let Some(session_gate) = Scenario::session_gate(args.session, trading_hours) {
        watch_loop = watch_loop.with_session_gate(session_gate);
    }

    Ok(watch_loop)
}
