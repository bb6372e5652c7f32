use anyhow::{Context, Result};
use clap::Parser;
use price_alert::{
    init_logging, InMemoryStore, LogNotifier, MonitorConfig, Orchestrator, PriceCollector,
    ReplayCollector, SyntheticCollector,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

/// Monitor electricity prices and alert on drops, spikes and predicted moves
#[derive(Debug, Parser)]
#[command(name = "price_monitor", version, about)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "PRICEWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Replay samples from a CSV file instead of the synthetic feed
    #[arg(short, long)]
    replay: Option<PathBuf>,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,

    /// Seconds between cycles, overriding the configuration
    #[arg(short, long)]
    interval: Option<u64>,

    /// Stop after this many cycles
    #[arg(long)]
    cycles: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        MonitorConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(secs) = cli.interval {
        config.collection_interval_secs = secs;
    }
    config.validate().context("invalid configuration")?;

    init_logging(&config.log_level);

    let replay = match &cli.replay {
        Some(path) => Some(Arc::new(
            ReplayCollector::from_csv(path)
                .with_context(|| format!("failed to load replay file {}", path.display()))?,
        )),
        None => None,
    };
    let collector: Arc<dyn PriceCollector> = match &replay {
        Some(replay) => replay.clone() as Arc<dyn PriceCollector>,
        None => {
            let feed = &config.synthetic;
            Arc::new(match feed.seed {
                Some(seed) => SyntheticCollector::seeded(feed.base_price, feed.volatility, seed),
                None => SyntheticCollector::new(feed.base_price, feed.volatility),
            })
        }
    };

    let orchestrator = Arc::new(Orchestrator::new(
        &config,
        collector,
        Arc::new(InMemoryStore::with_retention(config.retention())),
        Arc::new(LogNotifier),
    )?);
    info!(?orchestrator, "price monitor started");

    if cli.once {
        print_report(&orchestrator).await?;
        return Ok(());
    }

    // Replay runs back to back; live feeds wait for the configured interval
    let period = if replay.is_some() {
        Duration::from_millis(1)
    } else {
        config.collection_interval()
    };
    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut completed = 0usize;
    loop {
        tokio::select! {
            _ = timer.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }

        print_report(&orchestrator).await?;
        completed += 1;

        let remaining = match &replay {
            Some(replay) => Some(replay.remaining().await),
            None => None,
        };
        if should_stop(completed, cli.cycles, remaining) {
            break;
        }
    }

    info!(cycles = completed, "price monitor stopped");
    Ok(())
}

/// A failed cycle during replay is reported and skipped; replay ends once
/// every sample has been consumed
fn should_stop(completed: usize, limit: Option<usize>, replay_remaining: Option<usize>) -> bool {
    limit.is_some_and(|limit| completed >= limit) || replay_remaining == Some(0)
}

/// Run one cycle and print its report
async fn print_report(orchestrator: &Orchestrator) -> Result<()> {
    let report = orchestrator.run_cycle().await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
