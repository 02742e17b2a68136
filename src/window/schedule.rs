//! Schedule resolution.
//!
//! # Precedence
//! Windows are evaluated in declaration order and the **last** matching
//! window wins. Operators declare a broad default first and layer narrower
//! overrides after it. With no match the rate is `unlimited`.
//!
//! # Design Decisions
//! - Immutable after construction (shared via `Arc`, read without locks)
//! - The schedule repeats weekly, so every rate change is visible within
//!   the next seven days

use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, Utc};

use crate::window::rate::RateSpec;
use crate::window::rule::Window;

/// Ordered rollout windows plus the implicit unlimited default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    windows: Vec<Window>,
}

impl Schedule {
    pub fn new(windows: Vec<Window>) -> Self {
        Self { windows }
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Index of the window in effect at `now`, if any.
    pub fn active_index(&self, now: DateTime<Utc>) -> Option<usize> {
        self.windows.iter().rposition(|window| window.matches(now))
    }

    /// The rate in effect at `now`.
    pub fn active(&self, now: DateTime<Utc>) -> RateSpec {
        self.active_index(now)
            .map(|index| self.windows[index].rate)
            .unwrap_or(RateSpec::Unlimited)
    }

    /// The next instant after `now` at which the active rate changes.
    ///
    /// Returns `None` when the rate never changes.
    pub fn valid_until(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let current = self.active(now);
        self.boundaries_after(now)
            .into_iter()
            .find(|instant| self.active(*instant) != current)
    }

    /// Every instant within the next week at which some window may start or
    /// stop matching, in ascending order.
    fn boundaries_after(&self, now: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        if self.windows.is_empty() {
            return Vec::new();
        }

        let mut times = vec![NaiveTime::default()];
        for window in &self.windows {
            times.extend(window.start);
            times.extend(window.end);
        }
        times.sort();
        times.dedup();

        let today = now.date_naive();
        let mut instants: Vec<DateTime<Utc>> = (0..=7)
            .filter_map(|offset| today.checked_add_signed(ChronoDuration::days(offset)))
            .flat_map(|date| times.iter().map(move |time| date.and_time(*time).and_utc()))
            .filter(|instant| *instant > now)
            .collect();
        instants.sort();
        instants
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::rate::RateUnit;
    use chrono::{TimeZone, Weekday};

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    /// 2024-01-01 was a Monday.
    fn at(day_offset: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1 + day_offset, h, m, 0).unwrap()
    }

    #[test]
    fn test_empty_schedule_is_unlimited() {
        let schedule = Schedule::default();
        for offset in 0..7 {
            assert_eq!(schedule.active(at(offset, 3, 0)), RateSpec::Unlimited);
        }
        assert_eq!(schedule.valid_until(at(0, 0, 0)), None);
    }

    #[test]
    fn test_last_match_wins() {
        let schedule = Schedule::new(vec![
            Window::always(RateSpec::Unlimited).on_days([Weekday::Mon]),
            Window::always(RateSpec::limited(10, RateUnit::Hour))
                .on_days([Weekday::Mon])
                .between(Some(hm(9, 0)), Some(hm(17, 0))),
        ]);

        assert_eq!(schedule.active(at(0, 10, 0)), RateSpec::limited(10, RateUnit::Hour));
        assert_eq!(schedule.active(at(0, 18, 0)), RateSpec::Unlimited);
        assert_eq!(schedule.active_index(at(0, 10, 0)), Some(1));
        // Tuesday: nothing matches
        assert_eq!(schedule.active_index(at(1, 10, 0)), None);
    }

    #[test]
    fn test_earlier_window_is_shadowed_not_merged() {
        let schedule = Schedule::new(vec![
            Window::always(RateSpec::Blocked).between(Some(hm(9, 0)), Some(hm(17, 0))),
            Window::always(RateSpec::limited(1, RateUnit::Minute)),
        ]);
        assert_eq!(schedule.active(at(0, 12, 0)), RateSpec::limited(1, RateUnit::Minute));
    }

    #[test]
    fn test_valid_until_next_change() {
        let schedule = Schedule::new(vec![
            Window::always(RateSpec::limited(10, RateUnit::Hour)),
            Window::always(RateSpec::Blocked).between(Some(hm(22, 0)), Some(hm(6, 0))),
        ]);

        assert_eq!(schedule.valid_until(at(0, 12, 0)), Some(at(0, 22, 0)));
        assert_eq!(schedule.valid_until(at(0, 23, 0)), Some(at(1, 6, 0)));
        // Exactly on a boundary: the rate changes at the next one.
        assert_eq!(schedule.valid_until(at(0, 22, 0)), Some(at(1, 6, 0)));
    }

    #[test]
    fn test_valid_until_skips_boundaries_without_rate_change() {
        // Midnight is a candidate boundary, but the weekend rate holds across it.
        let schedule = Schedule::new(vec![
            Window::always(RateSpec::Unlimited),
            Window::always(RateSpec::limited(5, RateUnit::Hour))
                .on_days([Weekday::Sat, Weekday::Sun]),
        ]);
        // Saturday 03:00 -> Monday 00:00
        assert_eq!(schedule.valid_until(at(5, 3, 0)), Some(at(7, 0, 0)));
    }

    #[test]
    fn test_valid_until_constant_rate() {
        let schedule = Schedule::new(vec![Window::always(RateSpec::Blocked)]);
        assert_eq!(schedule.valid_until(at(3, 8, 0)), None);
    }
}
