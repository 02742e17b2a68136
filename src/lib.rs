//! Rollout-window scheduler.
//!
//! Answers, at any instant, "what is the current publish rate, and how long
//! must the publishing loop wait before its next operation?" from a
//! hot-reloadable policy of time-windowed rate limits.

pub mod config;
pub mod lifecycle;
pub mod manager;
pub mod observability;
pub mod window;

pub use config::{ConfigError, SchedulerConfig, WindowConfig};
pub use lifecycle::Shutdown;
pub use manager::{RolloutManager, Subscription, UpdateOutcome};
pub use window::{delay_for, Delay, RateSpec, Schedule, Window};
