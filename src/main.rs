//! Rollout-window scheduler CLI.
//!
//! ```text
//! rollout-window check    --policy windows.toml [--at 2024-01-06T03:00:00Z] [--pending 5]
//! rollout-window validate --policy windows.json
//! rollout-window watch    [--config scheduler.toml]
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use rollout_window::config::loader::{load_config, load_policy};
use rollout_window::config::validation::build_schedule;
use rollout_window::config::SchedulerConfig;
use rollout_window::lifecycle::{Services, Shutdown};
use rollout_window::observability::{logging, metrics};
use rollout_window::{delay_for, Delay, RolloutManager, Schedule};

#[derive(Parser)]
#[command(name = "rollout-window")]
#[command(about = "Time-windowed publish rate scheduler", long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is unset.
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the active rate and publish delay at an instant
    Check {
        #[arg(short, long)]
        policy: PathBuf,
        /// RFC 3339 timestamp; defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
        /// Operations waiting to be published
        #[arg(long, default_value_t = 1)]
        pending: u64,
    },
    /// Report every problem in a policy file
    Validate {
        #[arg(short, long)]
        policy: PathBuf,
    },
    /// Load a policy, follow file changes and log every rate change
    Watch {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let settings = match &cli.command {
        Commands::Watch { config: Some(path) } => load_config(path)?,
        _ => SchedulerConfig::default(),
    };
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| settings.observability.log_level.clone());
    logging::init_logging(&level);

    match cli.command {
        Commands::Check {
            policy,
            at,
            pending,
        } => check(&policy, at.unwrap_or_else(Utc::now), pending)?,
        Commands::Validate { policy } => validate(&policy)?,
        Commands::Watch { .. } => watch(settings).await?,
    }

    Ok(())
}

fn check(path: &Path, at: DateTime<Utc>, pending: u64) -> Result<(), Box<dyn std::error::Error>> {
    let manager = RolloutManager::new();
    manager.update(load_policy(path)?)?;

    let schedule = manager.schedule();
    let rate = schedule.active(at);
    println!("at:      {}", at.to_rfc3339());
    println!("rate:    {}", rate);
    match delay_for(&rate, pending) {
        Delay::Wait(d) => println!("delay:   {:?}", d),
        Delay::Blocked => println!("delay:   blocked"),
    }
    match schedule.valid_until(at) {
        Some(until) => println!("until:   {}", until.to_rfc3339()),
        None => println!("until:   never changes"),
    }
    Ok(())
}

fn validate(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let policy = load_policy(path)?;
    match build_schedule(&policy) {
        Ok(schedule) => {
            println!("{}: {} window(s), OK", path.display(), schedule.windows().len());
            Ok(())
        }
        Err(errors) => {
            for err in &errors {
                eprintln!("{}: {}", path.display(), err);
            }
            std::process::exit(1);
        }
    }
}

async fn watch(settings: SchedulerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let services = Services::start(&settings)?;
    let manager = services.manager.clone();
    let mut subscription = manager.subscribe();

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();
    let mut shutdown_rx = shutdown.subscribe();

    let mut schedule = manager.schedule();
    log_rate(&schedule);

    loop {
        tokio::select! {
            changed = subscription.changed() => {
                match changed {
                    Some(next) => {
                        schedule = next;
                        log_rate(&schedule);
                    }
                    None => break,
                }
            }
            _ = tokio::time::sleep(until_next_change(&schedule)) => {
                log_rate(&schedule);
            }
            _ = shutdown_rx.recv() => {
                tracing::info!("Watch loop received shutdown signal, exiting loop");
                break;
            }
        }
    }

    manager.unsubscribe(subscription);
    drop(services);
    tracing::info!("Shutdown complete");
    Ok(())
}

fn log_rate(schedule: &Schedule) {
    let now = Utc::now();
    let rate = schedule.active(now);
    metrics::record_active_rate(&rate);
    tracing::info!(
        rate = %rate,
        until = ?schedule.valid_until(now).map(|t| t.to_rfc3339()),
        "Active publish rate"
    );
}

/// Time until the schedule's rate next changes, capped so an idle loop still
/// wakes up periodically.
fn until_next_change(schedule: &Schedule) -> Duration {
    const MAX_SLEEP: Duration = Duration::from_secs(60 * 60);
    let now = Utc::now();
    schedule
        .valid_until(now)
        .and_then(|until| (until - now).to_std().ok())
        .map(|d| d.min(MAX_SLEEP))
        .unwrap_or(MAX_SLEEP)
}
