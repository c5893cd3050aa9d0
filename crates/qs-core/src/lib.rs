//! `qs-core` — foundational types for the `qsim` screening-lane simulator.
//!
//! This crate is a dependency of every other `qs-*` crate.  It intentionally
//! has no `qs-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `LaneId`, `ProfileId`, `ProfileSetId`                 |
//! | [`time`]        | `SimTime`                                             |
//! | [`rng`]         | `SimRng` (the run's shared random source)             |
//! | [`profile`]     | `Profile`, `Shape`, `ProfileSet`                      |
//! | [`params`]      | `SimParams`, `PolicyKind`, `CountInService`           |
//! | [`error`]       | `QsError`, `QsResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Required to load `SimParams` from a JSON file.             |

pub mod error;
pub mod ids;
pub mod params;
pub mod profile;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{QsError, QsResult};
pub use ids::{LaneId, ProfileId, ProfileSetId};
pub use params::{CountInService, PolicyKind, SimParams};
pub use profile::{Profile, ProfileSet, Shape};
pub use rng::SimRng;
pub use time::SimTime;
