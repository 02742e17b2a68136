//! Rollout window model.
//!
//! # Data Flow
//! ```text
//! "10/hour"                 → rate.rs     (RateSpec)
//! days + start/end + rate   → rule.rs     (Window, matching)
//! ordered windows           → schedule.rs (Schedule, last-match-wins)
//! Schedule::active(now)     → delay.rs    (Delay for the publishing loop)
//! ```
//!
//! # Design Decisions
//! - Every type here is an immutable value; no locking, no I/O
//! - Fail-open: an empty schedule means unlimited

pub mod delay;
pub mod error;
pub mod rate;
pub mod rule;
pub mod schedule;

pub use delay::{delay_for, Delay};
pub use error::{ParseError, WindowError};
pub use rate::{RateSpec, RateUnit};
pub use rule::{parse_time_of_day, parse_weekday, WeekdaySet, Window};
pub use schedule::Schedule;
