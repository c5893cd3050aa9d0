//! Lane groups for P2 and P3.
//!
//! Lanes with the same ordered profile list (the same `ProfileSetId`) form
//! a group.  Each group is steered independently toward the target
//! detection rate using the two profiles that bracket it: a fraction of the
//! group's working lanes (those with the shortest queues) runs the slower,
//! more thorough bracket and the rest run the faster one.
//!
//! Ranking is deterministic: a lane's rank is the number of working group
//! lanes with a strictly shorter queue, plus those with an equal queue and a
//! lower lane index.

use std::fmt::Write as _;

use tracing::{debug, info};

use qs_core::{LaneId, ProfileSet, ProfileSetId, QsResult};
use qs_lane::Lane;

use crate::LaneTable;

/// Size of one P3 ticket batch.
pub const TICKETS_PER_BATCH: u32 = 100;

// ── Target ────────────────────────────────────────────────────────────────────

/// What a group aims for, fixed at construction.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Target {
    /// Every profile is above the target rate: always the first.
    Lowest,
    /// Every profile is at or below the target rate: always the last.
    Highest,
    /// Mix slot `fast` and slot `fast + 1`, sending `frac_slow` of the
    /// working lanes to the slower one.
    Bracket { fast: usize, frac_slow: f64 },
}

impl Target {
    /// Locate the bracket around `d_acceptable` in `set`.
    pub fn for_set(set: &ProfileSet, d_acceptable: f64) -> Self {
        let profiles = set.profiles();
        let Some(fast) = profiles.iter().rposition(|p| p.d <= d_acceptable) else {
            return Target::Lowest;
        };
        if fast + 1 >= profiles.len() {
            return Target::Highest;
        }
        let (d1, d2) = (profiles[fast].d, profiles[fast + 1].d);
        Target::Bracket { fast, frac_slow: (d_acceptable - d1) / (d2 - d1) }
    }

    /// Slot labelled `F` in reports, if any.
    fn fast_slot(&self, len: usize) -> Option<usize> {
        match *self {
            Target::Lowest => None,
            Target::Highest => Some(len.saturating_sub(1)),
            Target::Bracket { fast, .. } => Some(fast),
        }
    }
}

// ── TicketBox ─────────────────────────────────────────────────────────────────

/// P3's batch allocator of fast/slow screenings.
///
/// Refilled with [`TICKETS_PER_BATCH`] tickets, `round(frac_slow * 100)` of
/// them slow, whenever both counts reach zero.
#[derive(Clone, Debug, Default)]
pub struct TicketBox {
    fast:  u32,
    slow:  u32,
    batch: String,
}

impl TicketBox {
    /// Remaining `(fast, slow)` tickets.
    #[inline]
    pub fn remaining(&self) -> (u32, u32) {
        (self.fast, self.slow)
    }

    fn refill_if_empty(&mut self, frac_slow: f64) {
        if self.fast > 0 || self.slow > 0 {
            return;
        }
        let slow = (frac_slow * TICKETS_PER_BATCH as f64).round() as u32;
        self.slow = slow.min(TICKETS_PER_BATCH);
        self.fast = TICKETS_PER_BATCH - self.slow;
    }

    /// Fraction of the remaining tickets that are slow.
    fn live_fraction(&self) -> f64 {
        self.slow as f64 / (self.fast + self.slow) as f64
    }

    fn take(&mut self, slow: bool) {
        if slow {
            self.slow -= 1;
            self.batch.push('S');
        } else {
            self.fast -= 1;
            self.batch.push('F');
        }
        if self.batch.len() as u32 == TICKETS_PER_BATCH {
            debug!(batch = %self.batch, "ticket batch used up");
            self.batch.clear();
        }
    }
}

// ── Group ─────────────────────────────────────────────────────────────────────

/// All lanes sharing one profile list.
#[derive(Clone, Debug)]
pub struct Group {
    set:     ProfileSet,
    lanes:   Vec<LaneId>,
    target:  Target,
    tickets: Option<TicketBox>,
}

impl Group {
    #[inline]
    pub fn set_id(&self) -> ProfileSetId {
        self.set.id()
    }

    #[inline]
    pub fn lanes(&self) -> &[LaneId] {
        &self.lanes
    }

    #[inline]
    pub fn target(&self) -> Target {
        self.target
    }

    #[inline]
    pub fn tickets(&self) -> Option<&TicketBox> {
        self.tickets.as_ref()
    }

    /// Is `lane` among the `round(frac * working)` shortest working queues
    /// of the group?
    fn has_short_queue(&self, lane: LaneId, table: &LaneTable<'_>, frac: f64) -> QsResult<bool> {
        let mine = table.queue_length(lane)?;
        let mut working = 0usize;
        let mut rank = 0usize;
        for &other in &self.lanes {
            if table.lane(other).is_broken() {
                continue;
            }
            working += 1;
            if other == lane {
                continue;
            }
            let len = table.queue_length(other)?;
            if len < mine || (len == mine && other < lane) {
                rank += 1;
            }
        }
        let slow_count = (working as f64 * frac).round() as usize;
        Ok(rank < slow_count)
    }

    fn choose(&mut self, lane: LaneId, table: &LaneTable<'_>) -> QsResult<usize> {
        let (fast, frac_slow) = match self.target {
            Target::Lowest => return Ok(0),
            Target::Highest => return Ok(self.set.len().saturating_sub(1)),
            Target::Bracket { fast, frac_slow } => (fast, frac_slow),
        };
        let slow = if self.tickets.is_none() {
            self.has_short_queue(lane, table, frac_slow)?
        } else {
            let live = self.tickets.as_mut().map(|t| {
                t.refill_if_empty(frac_slow);
                t.live_fraction()
            });
            let slow = match live {
                Some(f) if f <= 0.0 => false,
                Some(f) if f >= 1.0 => true,
                Some(f) => self.has_short_queue(lane, table, f)?,
                None => false,
            };
            if let Some(t) = self.tickets.as_mut() {
                t.take(slow);
            }
            slow
        };
        Ok(fast + usize::from(slow))
    }

    /// Screened counts per slot, actual average rate and queue statistics.
    fn report(&self, table: &LaneTable<'_>) -> QsResult<String> {
        let profiles = self.set.profiles();
        let mut done = vec![0u64; profiles.len()];
        let (mut sw, mut sw2, mut working) = (0.0, 0.0, 0usize);

        for &id in &self.lanes {
            let lane = table.lane(id);
            for (slot, &k) in lane.counters().by_profile.iter().enumerate() {
                if let Some(d) = done.get_mut(slot) {
                    *d += k as u64;
                }
            }
            if !lane.is_broken() {
                let w = table.queue_length(id)?;
                sw += w;
                sw2 += w * w;
                working += 1;
            }
        }
        if working > 0 {
            sw /= working as f64;
            sw2 = (sw2 / working as f64 - sw * sw).max(0.0).sqrt();
        }

        let fast = self.target.fast_slot(profiles.len());
        let slow = fast.map_or(0, |f| f + 1);
        let mut out = String::from("Screened {");
        for (slot, &k) in done.iter().enumerate() {
            let label = if Some(slot) == fast {
                "F".to_string()
            } else if slot == slow {
                "S".to_string()
            } else if k == 0 {
                continue;
            } else {
                slot.to_string()
            };
            let _ = write!(out, " {label}:{k}");
        }
        out.push_str("}.");

        let total: u64 = done.iter().sum();
        if total > 0 {
            let mass: f64 = done.iter().zip(profiles).map(|(&k, p)| k as f64 * p.d).sum();
            let _ = write!(out, "Avg actual rate {:.3}", mass / total as f64);
        } else {
            out.push_str("Avg actual rate -");
        }
        let _ = write!(out, "\nAvg queue length = {sw:.3} +- {sw2:.3}");
        if let Some(t) = &self.tickets {
            let (f, s) = t.remaining();
            let _ = write!(out, "\nTickets left {{ F:{f} S:{s} }}");
        }
        Ok(out)
    }
}

// ── Groups ────────────────────────────────────────────────────────────────────

/// The partition of all lanes into groups, plus a lane → group index.
#[derive(Clone, Debug)]
pub struct Groups {
    groups:       Vec<Group>,
    lane_group:   Vec<usize>,
    d_acceptable: f64,
}

impl Groups {
    /// Partition `lanes` by profile-set id, in first-seen lane order.
    ///
    /// With `tickets`, every group gets a [`TicketBox`] (P3).
    pub fn new(lanes: &[Lane], d_acceptable: f64, tickets: bool) -> Self {
        let mut groups: Vec<Group> = Vec::new();
        let mut lane_group = Vec::with_capacity(lanes.len());

        for lane in lanes {
            let set = lane.profiles();
            let g = match groups.iter().position(|g| g.set_id() == set.id()) {
                Some(g) => g,
                None => {
                    groups.push(Group {
                        set:     set.clone(),
                        lanes:   Vec::new(),
                        target:  Target::for_set(set, d_acceptable),
                        tickets: tickets.then(TicketBox::default),
                    });
                    groups.len() - 1
                }
            };
            groups[g].lanes.push(lane.id());
            lane_group.push(g);
        }

        info!(groups = groups.len(), "found groups of identically equipped lanes");
        for (i, g) in groups.iter().enumerate() {
            let n = g.lanes.len();
            match g.target {
                Target::Bracket { fast, frac_slow } => {
                    let slow_lanes = (n as f64 * frac_slow).round() as usize;
                    let profiles = g.set.profiles();
                    let expected = (profiles[fast].d * (n - slow_lanes) as f64
                        + profiles[fast + 1].d * slow_lanes as f64)
                        / n as f64;
                    info!(
                        group = i + 1,
                        lanes = n,
                        fast = fast + 1,
                        slow = fast + 2,
                        frac_slow,
                        slow_lanes,
                        d_expected = expected,
                        "group brackets the target rate"
                    );
                }
                other => info!(group = i + 1, lanes = n, pinned = ?other, "group pinned to one profile"),
            }
        }

        Self { groups, lane_group, d_acceptable }
    }

    #[inline]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// The group `lane` belongs to.
    pub fn group_of(&self, lane: LaneId) -> Option<&Group> {
        self.lane_group.get(lane.index()).map(|&g| &self.groups[g])
    }

    pub fn choose(&mut self, lane: LaneId, table: &LaneTable<'_>) -> QsResult<usize> {
        match self.lane_group.get(lane.index()) {
            Some(&g) => self.groups[g].choose(lane, table),
            None => Ok(0),
        }
    }

    pub fn report(&self, table: &LaneTable<'_>) -> QsResult<String> {
        let mut out = format!(". Target rate {:.3}", self.d_acceptable);
        for (i, g) in self.groups.iter().enumerate() {
            let _ = write!(out, "\nGroup {} ({} lanes); {}", i + 1, g.lanes.len(), g.report(table)?);
        }
        Ok(out)
    }
}
