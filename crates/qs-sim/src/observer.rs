//! Progress-display hooks.

use qs_core::SimTime;
use qs_lane::Lane;

use crate::RunSummary;

/// Callbacks invoked by [`Simulator::simulate`][crate::Simulator::simulate]
/// after every tick.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: summary printer
///
/// ```rust,ignore
/// struct Ticker;
///
/// impl SimObserver for Ticker {
///     fn on_summary(&mut self, now: SimTime, summary: &RunSummary) {
///         println!("{now}, {summary}");
///     }
/// }
/// ```
pub trait SimObserver {
    /// A lane changed this tick, or is broken (broken lanes are always
    /// reported).  `lane.describe()` gives the one-line status.
    fn on_lane(&mut self, _lane: &Lane) {}

    /// Aggregate counters at the end of a tick.
    fn on_summary(&mut self, _now: SimTime, _summary: &RunSummary) {}

    /// Return `true` to receive [`on_policy_report`][Self::on_policy_report]
    /// after every tick.  Building the report costs a pass over all lanes.
    fn wants_policy_report(&self) -> bool {
        false
    }

    /// The active policy's multi-line diagnostic report.
    fn on_policy_report(&mut self, _report: &str) {}

    /// Called once when `simulate` returns normally.
    fn on_sim_end(&mut self, _now: SimTime, _summary: &RunSummary) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
