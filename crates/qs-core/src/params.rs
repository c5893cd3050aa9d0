//! The parameter bundle consumed by the simulator.
//!
//! Typically loaded from a JSON file by the application crate (with the
//! `serde` feature) and passed to `qs_sim::SimBuilder`.  Missing fields take
//! the defaults below.
//!
//! | Field              | Default | Meaning                                        |
//! |--------------------|---------|------------------------------------------------|
//! | `lanes`            | 4       | number of lanes                                |
//! | `lambda`           | 0.1     | per-lane arrival rate (Poisson)                |
//! | `n_gen_max`        | 0       | arrivals generated per lane; 0 = unlimited     |
//! | `frac_bad`         | 0.1     | fraction of arrivals that are threats          |
//! | `d_acceptable`     | 0.0     | target detection rate                          |
//! | `policy`           | `P0`    | profile-selection policy                       |
//! | `count_in_service` | `NO`    | how the in-service customer counts in queues   |
//! | `profiles`         | —       | global profile list (required, non-empty)      |
//! | `lane_profiles`    | all     | per-lane 0-based subsets of `profiles`         |

use std::collections::HashMap;
use std::fmt;

use crate::{LaneId, Profile, ProfileId, ProfileSet, ProfileSetId, QsError, QsResult};

// ── Enumerations ──────────────────────────────────────────────────────────────

/// The available profile-selection policies.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PolicyKind {
    /// Greedy running-average threshold, per lane.
    #[default]
    P0,
    /// Static assignment computed once at construction.
    P1,
    /// Grouped fractional target, driven by queue lengths.
    P2,
    /// P2 with a self-correcting ticket box.
    P3,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PolicyKind::P0 => "P0",
            PolicyKind::P1 => "P1",
            PolicyKind::P2 => "P2",
            PolicyKind::P3 => "P3",
        };
        f.write_str(s)
    }
}

/// How the customer currently in service counts toward a lane's queue
/// length, for the policies that rank lanes by queue length.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum CountInService {
    /// Counts as a full customer.
    Yes,
    /// Does not count.
    #[default]
    No,
    /// Counts as the fraction of its maximum service time not yet elapsed.
    Partially,
}

// ── SimParams ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimParams {
    pub lanes:            usize,
    pub lambda:           f64,
    pub n_gen_max:        u32,
    pub frac_bad:         f64,
    pub d_acceptable:     f64,
    pub policy:           PolicyKind,
    pub count_in_service: CountInService,
    pub profiles:         Vec<Profile>,
    /// `lane_profiles[j]` lists the profiles (0-based indices into
    /// `profiles`) lane `j` supports.  A `None` entry, or a lane beyond the
    /// end of this list, supports every profile.
    pub lane_profiles:    Vec<Option<Vec<usize>>>,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            lanes:            4,
            lambda:           0.1,
            n_gen_max:        0,
            frac_bad:         0.1,
            d_acceptable:     0.0,
            policy:           PolicyKind::P0,
            count_in_service: CountInService::No,
            profiles:         Vec::new(),
            lane_profiles:    Vec::new(),
        }
    }
}

impl SimParams {
    /// Per-lane generation cap; `None` means arrivals never stop.
    #[inline]
    pub fn generation_cap(&self) -> Option<u32> {
        (self.n_gen_max > 0).then_some(self.n_gen_max)
    }

    /// The explicit profile subset of `lane`, if one is configured.
    pub fn lane_subset(&self, lane: LaneId) -> Option<&[usize]> {
        self.lane_profiles
            .get(lane.index())
            .and_then(|p| p.as_deref())
    }

    /// Validate the whole bundle.
    ///
    /// Checks, in order: lane count, scalar rates, each profile's own bounds,
    /// global cost/detection ordering, then every lane's subset.
    pub fn validate(&self) -> QsResult<()> {
        if self.lanes == 0 {
            return Err(QsError::Config("at least one lane is required".into()));
        }
        if self.lanes > u32::MAX as usize {
            return Err(QsError::Config(format!("too many lanes ({})", self.lanes)));
        }
        if !(self.lambda.is_finite() && self.lambda > 0.0) {
            return Err(QsError::Config(format!(
                "arrival rate lambda must be positive, got {}", self.lambda
            )));
        }
        if !(0.0..=1.0).contains(&self.frac_bad) {
            return Err(QsError::Config(format!(
                "threat fraction frac_bad must be in [0, 1], got {}", self.frac_bad
            )));
        }
        if !(0.0..=1.0).contains(&self.d_acceptable) {
            return Err(QsError::Config(format!(
                "target detection rate d_acceptable must be in [0, 1], got {}", self.d_acceptable
            )));
        }
        if self.lane_profiles.len() > self.lanes {
            return Err(QsError::Config(format!(
                "profile subsets given for {} lanes, but only {} lanes exist",
                self.lane_profiles.len(),
                self.lanes
            )));
        }

        if self.profiles.is_empty() {
            return Err(QsError::EmptyProfiles);
        }
        if self.profiles.len() > u16::MAX as usize {
            return Err(QsError::Config(format!("too many profiles ({})", self.profiles.len())));
        }
        for (i, p) in self.profiles.iter().enumerate() {
            p.check().map_err(|reason| QsError::InvalidProfile {
                index:   i + 1,
                profile: p.to_string(),
                reason,
            })?;
        }
        check_order(&self.profiles, |i| i + 1)?;

        for j in 0..self.lanes {
            let lane = LaneId(j as u32);
            let Some(subset) = self.lane_subset(lane) else { continue };
            if subset.is_empty() {
                return Err(QsError::Config(format!("{lane} has an empty profile subset")));
            }
            for (slot, &value) in subset.iter().enumerate() {
                if value >= self.profiles.len() {
                    return Err(QsError::InvalidLaneProfile {
                        lane,
                        slot,
                        value,
                        max: self.profiles.len() - 1,
                    });
                }
            }
            let picked: Vec<Profile> = subset.iter().map(|&v| self.profiles[v]).collect();
            check_order(&picked, |i| subset[i] + 1)?;
        }
        Ok(())
    }

    /// Validate, then resolve one [`ProfileSet`] per lane.
    ///
    /// Lanes whose ordered profile lists are equal share a `ProfileSetId`
    /// (ids are assigned in first-seen lane order).
    pub fn profile_sets(&self) -> QsResult<Vec<ProfileSet>> {
        self.validate()?;

        let all: Vec<usize> = (0..self.profiles.len()).collect();
        let mut seen: HashMap<Vec<usize>, ProfileSet> = HashMap::new();
        let mut sets = Vec::with_capacity(self.lanes);

        for j in 0..self.lanes {
            let subset = self.lane_subset(LaneId(j as u32)).unwrap_or(&all);
            let next_id = ProfileSetId::try_from(seen.len()).map_err(|_| {
                QsError::Config(format!("too many distinct lane profile lists ({})", seen.len()))
            })?;
            let set = match seen.get(subset) {
                Some(s) => s.clone(),
                None => {
                    let members: Vec<ProfileId> =
                        subset.iter().map(|&v| ProfileId(v as u16)).collect();
                    let set = ProfileSet::new(next_id, &self.profiles, &members).ok_or_else(|| {
                        QsError::Config(format!("lane {} refers to an unknown profile", j + 1))
                    })?;
                    seen.insert(subset.to_vec(), set.clone());
                    set
                }
            };
            sets.push(set);
        }
        Ok(sets)
    }
}

/// Profiles must be strictly increasing in both average cost and `d`.
/// `number` maps a list position to the 1-based profile number to report.
fn check_order(profiles: &[Profile], number: impl Fn(usize) -> usize) -> QsResult<()> {
    for i in 1..profiles.len() {
        let (prev, cur) = (&profiles[i - 1], &profiles[i]);
        if cur.average_cost() <= prev.average_cost() {
            return Err(QsError::ProfileOrder {
                index:   number(i),
                profile: cur.to_string(),
                what:    "cost",
            });
        }
        if cur.d <= prev.d {
            return Err(QsError::ProfileOrder {
                index:   number(i),
                profile: cur.to_string(),
                what:    "detection rate",
            });
        }
    }
    Ok(())
}
