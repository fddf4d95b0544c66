//! Timestamp type for on-chain event times.
//!
//! The controller contract reports seconds since the Unix epoch; viewers
//! expect milliseconds. The conversion happens in exactly one place
//! ([`Timestamp::as_millis`]) so no call site multiplies by hand.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Unix timestamp in seconds since epoch (UTC), as emitted by the
/// contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Milliseconds since epoch. Saturates instead of wrapping for
    /// timestamps beyond `u64::MAX / 1000`.
    pub fn as_millis(&self) -> u64 {
        self.0.saturating_mul(1000)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_is_seconds_times_thousand() {
        assert_eq!(Timestamp::new(1_700_000_000).as_millis(), 1_700_000_000_000);
        assert_eq!(Timestamp::EPOCH.as_millis(), 0);
    }

    #[test]
    fn millis_saturates_near_max() {
        assert_eq!(Timestamp::new(u64::MAX).as_millis(), u64::MAX);
    }
}
