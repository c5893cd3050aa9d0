//! Plain data row types written to the CSV files.

use serde::Serialize;

use qs_core::PolicyKind;
use qs_lane::Lane;
use qs_sim::RunSummary;

/// End-of-run statistics for one lane (one row of `lane_stats-NNN.csv`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaneStatsRow {
    pub run:            u32,
    /// 1-based.
    pub lane:           u32,
    pub broken:         bool,
    pub generated:      u32,
    pub arrived:        u32,
    pub completed:      u32,
    pub detected:       u32,
    pub missed:         u32,
    /// Completed customers that came from another lane.
    pub transferred:    u32,
    /// Still waiting or in service.
    pub queued:         usize,
    /// Mean time from arrival to start of screening over completed
    /// customers; 0 when none completed.
    pub mean_wait:      f64,
    /// Completions per profile slot, space separated (`"12 3 0"`).
    pub profile_counts: String,
}

impl LaneStatsRow {
    pub fn from_lane(run: u32, lane: &Lane) -> Self {
        let c = lane.counters();
        let (transferred, wait_sum) = lane.completed().iter().fold((0, 0u64), |(n, w), cust| {
            let waited = cust.service.map_or(0, |s| s.start.since(cust.arrival));
            (n + u32::from(cust.transferred), w + waited)
        });
        let mean_wait = if lane.completed().is_empty() {
            0.0
        } else {
            wait_sum as f64 / lane.completed().len() as f64
        };
        let profile_counts = c
            .by_profile
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            run,
            lane: lane.id().number(),
            broken: lane.is_broken(),
            generated: c.generated,
            arrived: c.arrived,
            completed: c.completed,
            detected: c.detected,
            missed: c.missed,
            transferred,
            queued: lane.waiting().len(),
            mean_wait,
            profile_counts,
        }
    }
}

/// Aggregate outcome of one run (one row of `runs.csv`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRow {
    pub run:      u32,
    pub seed:     u64,
    pub policy:   String,
    pub end_time: u64,
    pub arrivals: u64,
    pub queued:   u64,
    pub done:     u64,
    pub caught:   u64,
    pub missed:   u64,
    /// `caught / (caught + missed)`; empty when no threat was screened.
    pub detection_rate: Option<f64>,
}

impl RunRow {
    pub fn new(run: u32, seed: u64, policy: PolicyKind, summary: &RunSummary) -> Self {
        let threats = summary.caught + summary.missed;
        Self {
            run,
            seed,
            policy: policy.to_string(),
            end_time: summary.now.0,
            arrivals: summary.arrivals,
            queued: summary.queued,
            done: summary.done,
            caught: summary.caught,
            missed: summary.missed,
            detection_rate: (threats > 0).then(|| summary.caught as f64 / threats as f64),
        }
    }
}
