//! Publish rates.
//!
//! # Grammar
//! ```text
//! unlimited          no throttling
//! blocked | 0        no publishing at all
//! <N>/<unit>         N operations per unit (second, minute, hour, day)
//! ```
//!
//! # Design Decisions
//! - A zero quota is the same thing as `blocked`, so `Limited` never holds 0
//! - Units tolerate plurals and short forms (`5/hours`, `5/hr`, `5/h`)
//! - `Display` is canonical and parses back to an equal value
//! - Policy files keep rates as strings; they are parsed during validation
//!   so every bad window is reported at once

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

use crate::window::error::ParseError;

/// Time unit a bounded quota is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateUnit {
    Second,
    Minute,
    Hour,
    Day,
}

impl RateUnit {
    /// Length of one unit.
    pub fn duration(self) -> Duration {
        match self {
            RateUnit::Second => Duration::from_secs(1),
            RateUnit::Minute => Duration::from_secs(60),
            RateUnit::Hour => Duration::from_secs(60 * 60),
            RateUnit::Day => Duration::from_secs(24 * 60 * 60),
        }
    }

    fn name(self) -> &'static str {
        match self {
            RateUnit::Second => "second",
            RateUnit::Minute => "minute",
            RateUnit::Hour => "hour",
            RateUnit::Day => "day",
        }
    }

    fn from_word(word: &str) -> Option<Self> {
        let word = word.strip_suffix('s').filter(|w| w.len() > 1).unwrap_or(word);
        match word {
            "s" | "sec" | "second" => Some(RateUnit::Second),
            "m" | "min" | "minute" => Some(RateUnit::Minute),
            "h" | "hr" | "hour" => Some(RateUnit::Hour),
            "d" | "day" => Some(RateUnit::Day),
            _ => None,
        }
    }
}

/// A parsed throttling rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateSpec {
    /// No throttling.
    Unlimited,
    /// Zero throughput.
    Blocked,
    /// `count` operations per `unit`.
    Limited { count: NonZeroU32, unit: RateUnit },
}

impl RateSpec {
    /// Build a bounded rate. A zero count collapses to [`RateSpec::Blocked`].
    pub fn limited(count: u32, unit: RateUnit) -> Self {
        match NonZeroU32::new(count) {
            Some(count) => RateSpec::Limited { count, unit },
            None => RateSpec::Blocked,
        }
    }

    /// Operations allowed per interval, if bounded.
    pub fn count(&self) -> Option<u32> {
        match self {
            RateSpec::Limited { count, .. } => Some(count.get()),
            _ => None,
        }
    }

    /// The quota interval, if bounded.
    pub fn interval(&self) -> Option<Duration> {
        match self {
            RateSpec::Limited { unit, .. } => Some(unit.duration()),
            _ => None,
        }
    }
}

impl FromStr for RateSpec {
    type Err = ParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalized = input.trim().to_ascii_lowercase();
        let invalid = |reason: &'static str| ParseError::Rate {
            input: input.to_string(),
            reason,
        };

        match normalized.as_str() {
            "" => return Err(invalid("empty rate")),
            "unlimited" => return Ok(RateSpec::Unlimited),
            "blocked" | "0" => return Ok(RateSpec::Blocked),
            _ => {}
        }

        let (count, unit) = normalized
            .split_once('/')
            .ok_or_else(|| invalid("expected <count>/<unit>, \"unlimited\" or \"blocked\""))?;

        let count = count.trim();
        if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("count must be a non-negative integer"));
        }
        let count: u32 = count.parse().map_err(|_| invalid("count is too large"))?;
        let unit = RateUnit::from_word(unit.trim()).ok_or_else(|| invalid("unknown unit"))?;

        Ok(RateSpec::limited(count, unit))
    }
}

impl fmt::Display for RateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateSpec::Unlimited => f.write_str("unlimited"),
            RateSpec::Blocked => f.write_str("blocked"),
            RateSpec::Limited { count, unit } => write!(f, "{}/{}", count, unit.name()),
        }
    }
}
