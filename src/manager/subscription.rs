//! Schedule change notifications.
//!
//! Each subscriber owns a single-slot queue (a `watch` channel). Publishing
//! overwrites the slot, so a subscriber that falls behind skips straight to
//! the newest schedule: the drop policy is drop-oldest with depth one. The
//! writer never waits on a subscriber.

use std::sync::Arc;

use tokio::sync::watch;

use crate::window::Schedule;

/// Identifier handed out by [`RolloutManager::subscribe`](super::RolloutManager::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub(crate) u64);

/// Receiving end of schedule notifications.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    rx: watch::Receiver<Arc<Schedule>>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriberId, rx: watch::Receiver<Arc<Schedule>>) -> Self {
        Self { id, rx }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next applied schedule.
    ///
    /// Returns `None` once the manager has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<Schedule>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// True if a schedule was published since the last one this subscriber saw.
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// The most recent schedule, marking it as seen.
    pub fn latest(&mut self) -> Arc<Schedule> {
        self.rx.borrow_and_update().clone()
    }
}
