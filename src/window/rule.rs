//! A single rollout window and its time matching.
//!
//! # Matching
//! ```text
//! day check:  days empty, or weekday(now) in days
//! time check: start only      t >= start
//!             end only        t <  end
//!             start < end     start <= t < end
//!             start > end     t >= start || t < end    (wraps past midnight)
//!             start == end    whole day
//! matches = day check && time check
//! ```
//!
//! # Design Decisions
//! - All evaluation happens in UTC
//! - Ranges are half-open so adjacent windows never both claim a minute
//! - The day check looks at the weekday of `now` itself, so the early-morning
//!   tail of an overnight window is attributed to the following day

use std::fmt;

use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};

use crate::window::error::ParseError;
use crate::window::rate::RateSpec;

const ALL_DAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// A set of weekdays stored as a bitmask. Empty means "every day".
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_monday();
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        ALL_DAYS.into_iter().filter(|day| self.contains(*day))
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = WeekdaySet::new();
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl fmt::Debug for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Parse a weekday name such as `"monday"`, `"Mon"` or `"SUNDAY"`.
pub fn parse_weekday(input: &str) -> Result<Weekday, ParseError> {
    input
        .trim()
        .parse::<Weekday>()
        .map_err(|_| ParseError::Weekday(input.to_string()))
}

/// Parse a 24-hour `HH:MM` time of day.
pub fn parse_time_of_day(input: &str) -> Result<NaiveTime, ParseError> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M")
        .map_err(|_| ParseError::TimeOfDay(input.to_string()))
}

/// One policy rule: when it applies and at which rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub days: WeekdaySet,
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
    pub rate: RateSpec,
}

impl Window {
    /// A window active at all times.
    pub fn always(rate: RateSpec) -> Self {
        Self {
            days: WeekdaySet::new(),
            start: None,
            end: None,
            rate,
        }
    }

    /// Restrict the window to the given days.
    pub fn on_days(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        self.days = days.into_iter().collect();
        self
    }

    /// Restrict the window to a time-of-day range.
    pub fn between(mut self, start: Option<NaiveTime>, end: Option<NaiveTime>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Returns true if this window applies at `now`.
    pub fn matches(&self, now: DateTime<Utc>) -> bool {
        self.matches_day(now.weekday()) && self.matches_time(now.time())
    }

    fn matches_day(&self, day: Weekday) -> bool {
        self.days.is_empty() || self.days.contains(day)
    }

    fn matches_time(&self, t: NaiveTime) -> bool {
        match (self.start, self.end) {
            (None, None) => true,
            (Some(start), None) => t >= start,
            (None, Some(end)) => t < end,
            (Some(start), Some(end)) if start == end => true,
            (Some(start), Some(end)) if start < end => start <= t && t < end,
            (Some(start), Some(end)) => t >= start || t < end,
        }
    }
}
