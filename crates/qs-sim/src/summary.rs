//! Aggregate counters over all lanes.

use std::fmt;

use qs_core::SimTime;
use qs_lane::Lane;

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct RunSummary {
    pub now:      SimTime,
    pub arrivals: u64,
    /// Customers waiting or in service, broken lanes included.
    pub queued:   u64,
    pub done:     u64,
    pub caught:   u64,
    pub missed:   u64,
}

impl RunSummary {
    pub fn from_lanes(now: SimTime, lanes: &[Lane]) -> Self {
        lanes.iter().fold(RunSummary { now, ..Self::default() }, |mut s, lane| {
            let c = lane.counters();
            s.arrivals += c.arrived as u64;
            s.queued += lane.waiting().len() as u64;
            s.done += c.completed as u64;
            s.caught += c.detected as u64;
            s.missed += c.missed as u64;
            s
        })
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Arrivals {}; Queued {}, done {}, caught {}, missed {}",
            self.arrivals, self.queued, self.done, self.caught, self.missed
        )
    }
}
