//! Deterministic simulation RNG wrapper.
//!
//! # Determinism strategy
//!
//! One `SimRng` is owned by each simulator and threaded by `&mut` through
//! every stochastic step: arrival generation, service-time sampling and
//! detection trials.  Since the event loop is single-threaded and processes
//! lanes in a fixed order, the same seed always reproduces the same run.
//!
//! Independent runs of a batch derive their seeds with [`SimRng::for_run`]:
//!
//!   seed = base_seed XOR (run * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive run numbers uniformly across the seed space, so
//! runs can execute in any order (or in parallel) without sharing state.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// The run's shared pseudo-random source.
///
/// Used only in single-threaded contexts.  If you need parallel randomness,
/// give each run its own `SimRng` via [`SimRng::for_run`].
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Seed deterministically from a batch's base seed and a run number.
    pub fn for_run(base_seed: u64, run: u32) -> Self {
        SimRng::new(Self::run_seed(base_seed, run))
    }

    /// The seed [`SimRng::for_run`] uses, exposed for run summaries.
    #[inline]
    pub fn run_seed(base_seed: u64, run: u32) -> u64 {
        base_seed ^ (run as u64).wrapping_mul(MIXING_CONSTANT)
    }

    /// Uniform `f64` in `[0, 1)`.
    #[inline]
    pub fn unit(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }

    /// `true` with probability `p` (clamped to [0, 1]).  Every Bernoulli
    /// draw of a run (threat flags, detection trials) goes through here.
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }
}
