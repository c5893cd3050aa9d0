//! The closed set of profile-selection policies.

use std::fmt::Write as _;

use qs_core::{LaneId, PolicyKind, QsResult};
use qs_lane::Lane;

use crate::{Fixed, Greedy, Groups, LaneTable};

/// The active profile-selection policy of a run.
#[derive(Clone, Debug)]
pub enum Policy {
    /// P0: per-lane greedy threshold.
    Greedy(Greedy),
    /// P1: fixed per-lane profile.
    Fixed(Fixed),
    /// P2: grouped bracket, shortest queues run the slower profile.
    Grouped(Groups),
    /// P3: P2 with a self-correcting ticket box per group.
    Tickets(Groups),
}

impl Policy {
    /// Build the policy `kind` for `lanes`.
    ///
    /// P1 solves its assignment and P2/P3 form their groups here, once.
    pub fn new(kind: PolicyKind, lanes: &[Lane], d_acceptable: f64) -> Self {
        match kind {
            PolicyKind::P0 => Policy::Greedy(Greedy::new(d_acceptable)),
            PolicyKind::P1 => Policy::Fixed(Fixed::new(lanes, d_acceptable)),
            PolicyKind::P2 => Policy::Grouped(Groups::new(lanes, d_acceptable, false)),
            PolicyKind::P3 => Policy::Tickets(Groups::new(lanes, d_acceptable, true)),
        }
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            Policy::Greedy(_)  => PolicyKind::P0,
            Policy::Fixed(_)   => PolicyKind::P1,
            Policy::Grouped(_) => PolicyKind::P2,
            Policy::Tickets(_) => PolicyKind::P3,
        }
    }

    /// Pick the profile slot `lane` uses for the customer it is about to
    /// screen.
    pub fn choose_profile(&mut self, lane: LaneId, table: &LaneTable<'_>) -> QsResult<usize> {
        match self {
            Policy::Greedy(p)  => Ok(p.choose(table.lane(lane))),
            Policy::Fixed(p)   => Ok(p.choose(lane.index())),
            Policy::Grouped(g) | Policy::Tickets(g) => g.choose(lane, table),
        }
    }

    /// The lane groups of P2/P3.
    pub fn groups(&self) -> Option<&Groups> {
        match self {
            Policy::Grouped(g) | Policy::Tickets(g) => Some(g),
            _ => None,
        }
    }

    /// Human-readable performance summary.  Diagnostic only.
    pub fn report(&self, table: &LaneTable<'_>) -> QsResult<String> {
        let mut out = format!("Profile assignment policy {}", self.kind());
        match self {
            Policy::Greedy(_) => {}
            Policy::Fixed(p) => {
                out.push_str(". Fixed profiles {");
                for (j, slot) in p.assignment().iter().enumerate() {
                    let _ = write!(out, " {}:P{}", j + 1, slot + 1);
                }
                out.push_str(" }");
            }
            Policy::Grouped(g) | Policy::Tickets(g) => out.push_str(&g.report(table)?),
        }
        Ok(out)
    }
}
