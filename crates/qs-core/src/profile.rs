//! Screener profiles: service-time distribution plus detection probability.
//!
//! Each lane supports one or several profiles and switches between them as
//! the active policy dictates.  Profiles are listed in order of increasing
//! average cost *and* increasing detection rate, so a profile's index in a
//! lane's list doubles as its speed/thoroughness rank.

use std::fmt;
use std::sync::Arc;

use crate::{ProfileId, ProfileSetId, SimRng};

// ── Shape ─────────────────────────────────────────────────────────────────────

/// The shape of a profile's service-time distribution.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Shape {
    #[default]
    Uniform,
    Triangular,
}

// ── Profile ───────────────────────────────────────────────────────────────────

/// An immutable description of one service mode.
///
/// `mode` is only meaningful for [`Shape::Triangular`]; uniform profiles
/// ignore it.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Profile {
    #[cfg_attr(feature = "serde", serde(default))]
    pub shape: Shape,
    pub low:   u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub mode:  u64,
    pub high:  u64,
    /// Detection probability, in `[0, 1]`.
    pub d:     f64,
}

impl Profile {
    pub fn uniform(low: u64, high: u64, d: f64) -> Self {
        Self { shape: Shape::Uniform, low, mode: 0, high, d }
    }

    pub fn triangular(low: u64, mode: u64, high: u64, d: f64) -> Self {
        Self { shape: Shape::Triangular, low, mode, high, d }
    }

    /// Mean of the service-time distribution.
    pub fn average_cost(&self) -> f64 {
        match self.shape {
            Shape::Uniform    => (self.low + self.high) as f64 / 2.0,
            Shape::Triangular => (self.low + self.mode + self.high) as f64 / 3.0,
        }
    }

    /// Sample a service duration in `[low, high]`.
    ///
    /// Triangular samples use the inverse CDF with `a = (mode-low)/(high-low)`.
    pub fn service_time(&self, rng: &mut SimRng) -> f64 {
        let (low, mode, high) = (self.low as f64, self.mode as f64, self.high as f64);
        let x = rng.unit();
        match self.shape {
            Shape::Uniform => low + (high - low) * x,
            Shape::Triangular => {
                // Degenerate distribution: a point mass.
                if self.high == self.low {
                    return low;
                }
                let a = (mode - low) / (high - low);
                if x < a {
                    low + (x / a).sqrt() * (mode - low)
                } else {
                    high - ((1.0 - x) / (1.0 - a)).sqrt() * (high - mode)
                }
            }
        }
    }

    /// Bernoulli trial with probability `d`.
    #[inline]
    pub fn detects(&self, rng: &mut SimRng) -> bool {
        rng.gen_bool(self.d)
    }

    /// Check the profile's own bounds.  Returns the violated bound, if any.
    pub fn check(&self) -> Result<(), String> {
        if self.low > self.high {
            return Err(format!("illegal cost bounds (low {} > high {})", self.low, self.high));
        }
        if self.shape == Shape::Triangular && !(self.low <= self.mode && self.mode <= self.high) {
            return Err(format!(
                "illegal mode {} (expected {} <= mode <= {})",
                self.mode, self.low, self.high
            ));
        }
        if !(0.0..=1.0).contains(&self.d) {
            return Err(format!("illegal detection rate {} (expected 0 <= d <= 1)", self.d));
        }
        Ok(())
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shape {
            Shape::Uniform => write!(f, "(Cost {}:{}, d={})", self.low, self.high, self.d),
            Shape::Triangular => {
                write!(f, "(Cost {}:{}:{}, d={})", self.low, self.mode, self.high, self.d)
            }
        }
    }
}

// ── ProfileSet ────────────────────────────────────────────────────────────────

/// The ordered list of profiles available to one lane.
///
/// Lanes configured with the same list share one `Arc` and one
/// [`ProfileSetId`]; cloning is cheap.
#[derive(Clone, Debug)]
pub struct ProfileSet {
    id:       ProfileSetId,
    members:  Arc<[ProfileId]>,
    profiles: Arc<[Profile]>,
}

impl ProfileSet {
    /// Resolve `members` against the global `pool`.
    ///
    /// Returns `None` if any member is out of range.
    pub fn new(id: ProfileSetId, pool: &[Profile], members: &[ProfileId]) -> Option<Self> {
        let profiles: Vec<Profile> = members
            .iter()
            .map(|m| pool.get(m.index()).copied())
            .collect::<Option<_>>()?;
        Some(Self {
            id,
            members:  members.into(),
            profiles: profiles.into(),
        })
    }

    /// A set containing every profile of `pool`, in pool order.
    pub fn all(id: ProfileSetId, pool: &[Profile]) -> Self {
        let members: Vec<ProfileId> = (0..pool.len()).map(|i| ProfileId(i as u16)).collect();
        Self {
            id,
            members:  members.into(),
            profiles: pool.into(),
        }
    }

    #[inline]
    pub fn id(&self) -> ProfileSetId {
        self.id
    }

    #[inline]
    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    #[inline]
    pub fn get(&self, slot: usize) -> Option<&Profile> {
        self.profiles.get(slot)
    }

    /// Global pool id of the profile at `slot`.
    #[inline]
    pub fn member(&self, slot: usize) -> Option<ProfileId> {
        self.members.get(slot).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
