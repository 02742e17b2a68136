//! Startup orchestration.
//!
//! # Responsibilities
//! - Create the process-wide `RolloutManager`
//! - Apply the policy file once before anything reads the schedule
//! - Start the metrics endpoint and the policy watcher
//!
//! # Design Decisions
//! - An unreadable or invalid policy at startup is not fatal: the manager
//!   serves the unlimited default and the watcher picks up a fix
//! - A watcher or metrics endpoint that cannot start is fatal

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::config::watcher::{PolicyWatcher, WatchError, WatchGuard};
use crate::config::SchedulerConfig;
use crate::manager::RolloutManager;
use crate::observability::metrics;

/// Running scheduler services.
pub struct Services {
    pub manager: Arc<RolloutManager>,
    /// Present while the policy file is being watched.
    pub watch_guard: Option<WatchGuard>,
}

/// Error type for startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Watch(#[from] WatchError),

    #[error("metrics endpoint: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("invalid metrics address {0:?}")]
    MetricsAddress(String),
}

impl Services {
    /// Bring up the manager, metrics and the policy watcher.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(config: &SchedulerConfig) -> Result<Self, StartupError> {
        if config.observability.metrics_enabled {
            let address = &config.observability.metrics_address;
            let addr: SocketAddr = address
                .parse()
                .map_err(|_| StartupError::MetricsAddress(address.clone()))?;
            metrics::init_metrics(addr)?;
        }

        let manager = Arc::new(RolloutManager::new());
        let watcher = PolicyWatcher::new(
            Path::new(&config.policy.path),
            manager.clone(),
            Duration::from_secs(config.watch.poll_interval_secs),
        );

        if let Ok(outcome) = watcher.reload() {
            tracing::info!(path = %config.policy.path, ?outcome, "Initial rollout policy loaded");
        }

        let watch_guard = if config.watch.enabled {
            Some(watcher.run()?)
        } else {
            tracing::info!("Policy watching disabled");
            None
        };

        Ok(Self {
            manager,
            watch_guard,
        })
    }
}
