//! Configuration validation.
//!
//! # Responsibilities
//! - Turn raw `WindowConfig` entries into a `Schedule`
//! - Validate scheduler settings (intervals > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: input → Result<output, Vec<error>>
//! - Runs before a policy is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{SchedulerConfig, WindowConfig};
use crate::window::{
    parse_time_of_day, parse_weekday, ParseError, RateSpec, Schedule, WeekdaySet, Window,
    WindowError,
};

/// Build a schedule from raw policy entries, preserving their order.
pub fn build_schedule(policy: &[WindowConfig]) -> Result<Schedule, Vec<WindowError>> {
    let mut windows = Vec::with_capacity(policy.len());
    let mut errors = Vec::new();

    for (index, raw) in policy.iter().enumerate() {
        match build_window(raw) {
            Ok(window) => windows.push(window),
            Err(parse_errors) => errors.extend(
                parse_errors
                    .into_iter()
                    .map(|source| WindowError { index, source }),
            ),
        }
    }

    if errors.is_empty() {
        Ok(Schedule::new(windows))
    } else {
        Err(errors)
    }
}

fn build_window(raw: &WindowConfig) -> Result<Window, Vec<ParseError>> {
    let mut errors = Vec::new();

    let rate = raw
        .rate
        .parse::<RateSpec>()
        .map_err(|e| errors.push(e))
        .ok();

    let mut days = WeekdaySet::new();
    for name in &raw.days {
        match parse_weekday(name) {
            Ok(day) => days.insert(day),
            Err(e) => errors.push(e),
        }
    }

    let start = parse_optional_time(raw.start.as_deref(), &mut errors);
    let end = parse_optional_time(raw.end.as_deref(), &mut errors);

    match rate {
        Some(rate) if errors.is_empty() => Ok(Window {
            days,
            start,
            end,
            rate,
        }),
        _ => Err(errors),
    }
}

fn parse_optional_time(
    input: Option<&str>,
    errors: &mut Vec<ParseError>,
) -> Option<chrono::NaiveTime> {
    input.and_then(|s| parse_time_of_day(s).map_err(|e| errors.push(e)).ok())
}

/// A semantic problem in the scheduler settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate scheduler settings, collecting every problem found.
pub fn validate_config(config: &SchedulerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.policy.path.trim().is_empty() {
        errors.push(ValidationError {
            field: "policy.path",
            message: "must not be empty".to_string(),
        });
    }

    if config.watch.enabled && config.watch.poll_interval_secs == 0 {
        errors.push(ValidationError {
            field: "watch.poll_interval_secs",
            message: "must be greater than 0".to_string(),
        });
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError {
            field: "observability.log_level",
            message: format!("unknown level {:?}", config.observability.log_level),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError {
            field: "observability.metrics_address",
            message: format!("{:?} is not a socket address", config.observability.metrics_address),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
