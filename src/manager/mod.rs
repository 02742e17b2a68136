//! Hot-reloadable holder of the active rollout schedule.
//!
//! # States
//! ```text
//! Uninitialized ──first valid policy──▶ Active ──valid change──▶ Active
//!       │                                  │
//!       └── invalid policy: stay, warn ◀───┘
//! ```
//!
//! # Data Flow
//! ```text
//! policy source (file watcher, site config callback)
//!     → update(policy)          (write lock)
//!         → compare with last applied raw policy; unchanged → return
//!         → build_schedule      (validation.rs)
//!         → atomic swap of Arc<Schedule>
//!         → publish to subscribers
//! publishing workers
//!     → active_rate(now)        (lock-free snapshot read)
//! ```
//!
//! # Design Decisions
//! - One instance per process, passed by `Arc` to whoever needs it
//! - Readers never take the write lock; they load an immutable snapshot
//! - An invalid policy never replaces a valid one
//! - Before the first valid policy the schedule is empty, i.e. unlimited

pub mod subscription;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::config::loader::{decode_policy, ConfigError, PolicyFormat};
use crate::config::schema::WindowConfig;
use crate::config::validation::build_schedule;
use crate::observability::metrics;
use crate::window::{delay_for, Delay, RateSpec, Schedule};

pub use subscription::{SubscriberId, Subscription};

/// Result of a successful [`RolloutManager::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The policy differed from the applied one and is now active.
    Applied { windows: usize },
    /// The policy was identical to the applied one; nothing was rebuilt.
    Unchanged,
}

/// State only touched by writers.
#[derive(Default)]
struct WriterState {
    /// Last applied raw policy. `None` until the first valid policy.
    raw: Option<Vec<WindowConfig>>,
    subscribers: HashMap<SubscriberId, watch::Sender<Arc<Schedule>>>,
    next_subscriber: u64,
}

impl WriterState {
    /// Forget subscribers whose `Subscription` was dropped without
    /// `unsubscribe`.
    fn prune_closed(&mut self) {
        self.subscribers.retain(|id, tx| {
            if tx.is_closed() {
                tracing::debug!(subscriber = id.0, "Dropping closed schedule subscriber");
                return false;
            }
            true
        });
    }

    fn publish(&mut self, schedule: &Arc<Schedule>) {
        self.prune_closed();
        for tx in self.subscribers.values() {
            tx.send_replace(schedule.clone());
        }
        metrics::record_subscribers(self.subscribers.len());
    }
}

/// Process-wide authority on the current rollout schedule.
pub struct RolloutManager {
    schedule: ArcSwap<Schedule>,
    writer: Mutex<WriterState>,
}

impl RolloutManager {
    /// Create an uninitialized manager serving the unlimited default.
    pub fn new() -> Self {
        Self {
            schedule: ArcSwap::from_pointee(Schedule::default()),
            writer: Mutex::new(WriterState::default()),
        }
    }

    /// Create a manager and apply an initial policy.
    pub fn with_policy(policy: Vec<WindowConfig>) -> Result<Self, ConfigError> {
        let manager = Self::new();
        manager.update(policy)?;
        Ok(manager)
    }

    /// The current schedule snapshot.
    pub fn schedule(&self) -> Arc<Schedule> {
        self.schedule.load_full()
    }

    /// The rate in effect at `now`.
    pub fn active_rate(&self, now: DateTime<Utc>) -> RateSpec {
        self.schedule.load().active(now)
    }

    /// The rate in effect right now.
    pub fn current_rate(&self) -> RateSpec {
        self.active_rate(Utc::now())
    }

    /// Delay before the next publish operation at `now`.
    pub fn delay_at(&self, now: DateTime<Utc>, pending: u64) -> Delay {
        delay_for(&self.active_rate(now), pending)
    }

    /// True once a valid policy has been applied.
    pub fn is_initialized(&self) -> bool {
        self.lock().raw.is_some()
    }

    /// Apply a newly delivered policy.
    ///
    /// A policy structurally equal to the applied one is ignored. An invalid
    /// policy is logged and returned as an error; the previous schedule stays
    /// active.
    pub fn update(&self, policy: Vec<WindowConfig>) -> Result<UpdateOutcome, ConfigError> {
        let mut state = self.lock();

        if state.raw.as_ref() == Some(&policy) {
            tracing::debug!("Rollout policy unchanged, skipping rebuild");
            metrics::record_policy_update("unchanged");
            return Ok(UpdateOutcome::Unchanged);
        }

        let schedule = match build_schedule(&policy) {
            Ok(schedule) => Arc::new(schedule),
            Err(errors) => {
                let err = ConfigError::Policy(errors);
                report_rejected(&state, &err);
                return Err(err);
            }
        };

        let windows = schedule.windows().len();
        self.schedule.store(schedule.clone());
        state.raw = Some(policy);
        state.publish(&schedule);

        tracing::info!(windows, subscribers = state.subscribers.len(), "Rollout policy applied");
        metrics::record_policy_update("applied");
        metrics::record_windows(windows);

        Ok(UpdateOutcome::Applied { windows })
    }

    /// Decode an opaque policy blob and apply it.
    ///
    /// Decode failures are handled like invalid policies.
    pub fn update_from_str(
        &self,
        blob: &str,
        format: PolicyFormat,
    ) -> Result<UpdateOutcome, ConfigError> {
        match decode_policy(blob, format) {
            Ok(policy) => self.update(policy),
            Err(err) => {
                report_rejected(&self.lock(), &err);
                Err(err)
            }
        }
    }

    /// Register for schedule notifications.
    pub fn subscribe(&self) -> Subscription {
        let mut state = self.lock();
        state.prune_closed();
        let id = SubscriberId(state.next_subscriber);
        state.next_subscriber += 1;

        let (tx, rx) = watch::channel(self.schedule.load_full());
        state.subscribers.insert(id, tx);
        metrics::record_subscribers(state.subscribers.len());

        tracing::debug!(subscriber = id.0, "Schedule subscriber registered");
        Subscription::new(id, rx)
    }

    /// Stop notifications for `subscription`. Returns false if it was
    /// already gone.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut state = self.lock();
        let removed = state.subscribers.remove(&subscription.id()).is_some();
        state.prune_closed();
        metrics::record_subscribers(state.subscribers.len());
        removed
    }

    /// Subscribers whose `Subscription` is still alive.
    pub fn subscriber_count(&self) -> usize {
        self.lock()
            .subscribers
            .values()
            .filter(|tx| !tx.is_closed())
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, WriterState> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RolloutManager {
    fn default() -> Self {
        Self::new()
    }
}

fn report_rejected(state: &WriterState, err: &ConfigError) {
    metrics::record_policy_update("rejected");
    if state.raw.is_none() {
        tracing::error!(
            initial = true,
            error = %err,
            "Invalid initial rollout policy; no previous configuration, publishing is unthrottled"
        );
    } else {
        tracing::warn!(
            initial = false,
            error = %err,
            "Invalid rollout policy update; keeping last good configuration"
        );
    }
}
