//! PropBot - CS2 DFS Projection & Line Movement Engine
//! Turns match schedules, player form, and platform lines into
//! projections, value flags, and movement alerts for the dashboard.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use propbot_backend::providers::sample::{
    SampleLineSource, SampleMatchSource, SampleStatsProvider,
};
use propbot_backend::{Aggregator, Config};

#[derive(Parser, Debug)]
#[command(name = "propbot", about = "CS2 DFS projection & line movement engine")]
struct Args {
    /// Run a single refresh cycle, print the aggregate stats, and exit
    #[arg(long)]
    once: bool,

    /// Override REFRESH_INTERVAL_SECS from the environment
    #[arg(long)]
    interval_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let config = Config::from_env()?;
    let interval_secs = args.interval_secs.unwrap_or(config.refresh_interval_secs);

    info!("🚀 PropBot starting");
    info!(
        "📋 Tracking {:?} across {} platforms, refresh every {}s",
        config.stat_types,
        config.platforms.len(),
        interval_secs
    );

    // Sample providers stand in for the scraper-backed implementations
    let aggregator = Arc::new(Aggregator::new(
        config,
        Arc::new(SampleStatsProvider::new()),
        Arc::new(SampleLineSource::new()),
        Arc::new(SampleMatchSource::new()),
    ));

    if args.once {
        let stats = aggregator.run_refresh().await;
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    // The refresh loop is the single scheduler: one cycle in flight at a
    // time, reads stay consistent in between
    let mut ticker = interval(Duration::from_secs(interval_secs));
    loop {
        ticker.tick().await;
        aggregator.run_refresh().await;

        let summary = aggregator.tracker_summary();
        info!(
            "📈 Tracker: {} players, {} series, {} movements ({} significant)",
            summary.tracked_players,
            summary.tracked_keys,
            summary.total_movements,
            summary.total_significant
        );

        for record in aggregator.significant_movements().iter().take(10) {
            info!(
                "  ⚠️ {} {} {:+.1} → {:.1}",
                record.key,
                record.direction.as_str(),
                record.movement,
                record.current_line
            );
        }
    }
}

/// Initialize tracing with env-filter overrides
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "propbot_backend=info,propbot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
