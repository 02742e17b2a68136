//! Errors raised while building rollout windows.

use thiserror::Error;

/// A malformed field in a rollout window definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid rate {input:?}: {reason}")]
    Rate { input: String, reason: &'static str },

    #[error("invalid weekday {0:?}")]
    Weekday(String),

    #[error("invalid time of day {0:?}: expected HH:MM")]
    TimeOfDay(String),
}

/// A [`ParseError`] tied to the position of the window that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("window {index}: {source}")]
pub struct WindowError {
    pub index: usize,
    #[source]
    pub source: ParseError,
}
