//! Arrival records and the pre-generated per-lane schedule.

use qs_core::{LaneId, QsError, QsResult, SimTime};

/// One future customer: when it shows up and whether it is a threat.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArrivalRecord {
    pub time:   SimTime,
    pub threat: bool,
}

impl ArrivalRecord {
    pub fn new(time: u64, threat: bool) -> Self {
        Self { time: SimTime(time), threat }
    }
}

/// A pre-generated, chronologically ordered list of arrivals for one lane,
/// consumed front to back.
#[derive(Clone, Debug, Default)]
pub struct ArrivalSchedule {
    records: Vec<ArrivalRecord>,
    cursor:  usize,
}

impl ArrivalSchedule {
    /// Wrap `records`, which must already be in non-decreasing time order.
    pub fn new(records: Vec<ArrivalRecord>) -> Self {
        debug_assert!(records.windows(2).all(|w| w[0].time <= w[1].time));
        Self { records, cursor: 0 }
    }

    /// Total length, consumed or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn has_next(&self) -> bool {
        self.cursor < self.records.len()
    }

    /// Take the next record.
    ///
    /// Reading past the end is an input-exhaustion error: it means the
    /// configured customer count and the schedule disagree.
    pub fn next_arrival(&mut self, lane: LaneId) -> QsResult<ArrivalRecord> {
        let rec = self
            .records
            .get(self.cursor)
            .copied()
            .ok_or(QsError::ScheduleExhausted { lane, len: self.records.len() })?;
        self.cursor += 1;
        Ok(rec)
    }

    /// The full record list, including already consumed entries.
    pub fn records(&self) -> &[ArrivalRecord] {
        &self.records
    }
}

impl From<Vec<ArrivalRecord>> for ArrivalSchedule {
    fn from(records: Vec<ArrivalRecord>) -> Self {
        Self::new(records)
    }
}
