//! Simulation time model.
//!
//! # Design
//!
//! Simulated time is a monotonically non-decreasing integer `SimTime`.  The
//! unit is whatever the profile costs and the arrival rate are expressed in
//! (the reference configurations use seconds).
//!
//! The clock does not advance by a fixed step: each iteration of the event
//! loop jumps straight to the earliest pending arrival or service completion
//! over all lanes.  Several iterations may run at the same `SimTime` when
//! more than one event per lane falls on the same instant.

use std::fmt;

/// An absolute simulation time.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    /// Time units elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn since(self, earlier: SimTime) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: u64) -> SimTime {
        SimTime(self.0 + rhs)
    }
}

impl std::ops::Sub for SimTime {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: SimTime) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}", self.0)
    }
}
