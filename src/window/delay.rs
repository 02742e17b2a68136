//! Rate to delay conversion for the publishing loop.

use std::time::Duration;

use crate::window::rate::RateSpec;

/// What the publishing loop should do before its next operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delay {
    /// Wait this long, then proceed. Zero means proceed immediately.
    Wait(Duration),
    /// Publishing is not permitted right now. Stop and retry later.
    Blocked,
}

impl Delay {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Delay::Blocked)
    }

    /// The wait, if publishing is permitted.
    pub fn duration(&self) -> Option<Duration> {
        match self {
            Delay::Wait(d) => Some(*d),
            Delay::Blocked => None,
        }
    }
}

/// Spacing required between successive operations under `rate`.
///
/// A bounded quota of `count` per `interval` spaces operations
/// `interval / count` apart; callers apply it between each of the `pending`
/// operations rather than batching them. Callers must re-read the active
/// rate before every decision so a window boundary is picked up.
pub fn delay_for(rate: &RateSpec, pending: u64) -> Delay {
    match rate {
        RateSpec::Unlimited => Delay::Wait(Duration::ZERO),
        RateSpec::Blocked => Delay::Blocked,
        RateSpec::Limited { .. } if pending == 0 => Delay::Wait(Duration::ZERO),
        RateSpec::Limited { count, unit } => Delay::Wait(unit.duration() / count.get()),
    }
}
