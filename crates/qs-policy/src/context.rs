//! Read-only lane state handed to every policy decision.

use qs_core::{CountInService, LaneId, QsResult, SimTime};
use qs_lane::Lane;

/// A read-only snapshot of all lanes at the moment of a dispatch.
///
/// Built by the simulator for each decision; the borrow guarantees nothing
/// mutates the lanes while a policy looks at them.
#[derive(Copy, Clone)]
pub struct LaneTable<'a> {
    /// Every lane, indexed by `LaneId`.
    pub lanes: &'a [Lane],

    /// Current simulated time.
    pub now: SimTime,

    /// How the customer in service counts toward queue lengths.
    pub mode: CountInService,
}

impl<'a> LaneTable<'a> {
    #[inline]
    pub fn new(lanes: &'a [Lane], now: SimTime, mode: CountInService) -> Self {
        Self { lanes, now, mode }
    }

    #[inline]
    pub fn lane(&self, id: LaneId) -> &'a Lane {
        &self.lanes[id.index()]
    }

    /// Queue length of `id` under the table's counting mode.
    pub fn queue_length(&self, id: LaneId) -> QsResult<f64> {
        self.lane(id).queue_length(self.mode, self.now)
    }
}
