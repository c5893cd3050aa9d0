//! `qs-sim` — the event loop of the qsim screening-lane simulator.
//!
//! # Tick loop
//!
//! ```text
//! loop:
//!   apply queued lane toggles from SimControl
//!   ① Arrivals     — every lane folds in a customer arriving now.
//!   ② Completions  — every lane finishes a screening ending now.
//!   ③ Dispatch     — every idle working lane borrows from a broken
//!                    neighbour if allowed, asks the policy for a profile
//!                    and starts screening its head.
//!   ④ Log          — record (now, customers queued over all lanes).
//!   jump to the earliest next arrival/completion over all lanes;
//!   stop when there is none, at the stop time, or on request.
//! ```
//!
//! Several ticks may share one time when more than one event per lane is
//! due at that instant; the queue log keeps only the last value per time.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use qs_core::{SimParams, SimRng};
//! use qs_sim::{NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(params, SimRng::new(0)).build()?;
//! let end = sim.simulate(None, &mut NoopObserver)?;
//! println!("{}", sim.summary());
//! ```

pub mod builder;
pub mod control;
pub mod error;
pub mod observer;
pub mod sim;
pub mod summary;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use control::{LaneCommand, SimControl};
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use sim::Simulator;
pub use summary::RunSummary;
