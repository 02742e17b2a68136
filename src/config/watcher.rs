//! Policy file watcher for hot reload.
//!
//! The watcher is the caller-owned half of hot reload: it turns file system
//! events into `RolloutManager::update` calls. The manager itself never
//! touches the file system.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, PollWatcher, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;

use crate::config::loader::{load_policy, ConfigError};
use crate::manager::{RolloutManager, UpdateOutcome};

/// Error type for starting a watcher.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("watch error: {0}")]
    Notify(#[from] notify::Error),

    #[error("policy path {0:?} has no parent directory")]
    NoParent(PathBuf),
}

/// Keeps the underlying watcher alive. Dropping it stops watching.
pub struct WatchGuard {
    _watcher: Box<dyn Watcher + Send>,
}

/// Watches a policy file and feeds every change into a [`RolloutManager`].
pub struct PolicyWatcher {
    path: PathBuf,
    manager: Arc<RolloutManager>,
    poll_interval: Duration,
}

impl PolicyWatcher {
    pub fn new(path: &Path, manager: Arc<RolloutManager>, poll_interval: Duration) -> Self {
        Self {
            path: path.to_path_buf(),
            manager,
            poll_interval,
        }
    }

    /// Load the policy file once and apply it.
    pub fn reload(&self) -> Result<UpdateOutcome, ConfigError> {
        reload(&self.path, &self.manager)
    }

    /// Start watching with the platform's native event source.
    pub fn run(self) -> Result<WatchGuard, WatchError> {
        let config = Config::default().with_poll_interval(self.poll_interval);
        let handler = self.event_handler();
        let watcher = RecommendedWatcher::new(handler, config)?;
        self.start(Box::new(watcher))
    }

    /// Start watching by polling file contents. Works on file systems that
    /// do not deliver change events.
    pub fn run_polling(self) -> Result<WatchGuard, WatchError> {
        let config = Config::default()
            .with_poll_interval(self.poll_interval)
            .with_compare_contents(true);
        let handler = self.event_handler();
        let watcher = PollWatcher::new(handler, config)?;
        self.start(Box::new(watcher))
    }

    fn start(self, mut watcher: Box<dyn Watcher + Send>) -> Result<WatchGuard, WatchError> {
        // Editors often replace the file, so watch the directory and filter.
        let dir = self
            .path
            .parent()
            .map(|p| if p.as_os_str().is_empty() { Path::new(".") } else { p })
            .ok_or_else(|| WatchError::NoParent(self.path.clone()))?;
        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Policy watcher started");
        Ok(WatchGuard { _watcher: watcher })
    }

    fn event_handler(&self) -> impl Fn(notify::Result<Event>) + Send + 'static {
        let path = self.path.clone();
        let manager = self.manager.clone();

        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let relevant = (event.kind.is_modify() || event.kind.is_create())
                    && event.paths.iter().any(|p| p.file_name() == path.file_name());
                if relevant {
                    tracing::info!(path = ?path, "Policy file change detected, reloading");
                    // Failures are logged by the manager; the old schedule stays.
                    let _ = reload(&path, &manager);
                }
            }
            Err(e) => tracing::error!("Watch error: {:?}", e),
        }
    }
}

fn reload(path: &Path, manager: &RolloutManager) -> Result<UpdateOutcome, ConfigError> {
    match load_policy(path) {
        Ok(policy) => manager.update(policy),
        Err(err) => {
            tracing::warn!(
                path = ?path,
                error = %err,
                "Failed to read policy file; keeping current schedule"
            );
            Err(err)
        }
    }
}
