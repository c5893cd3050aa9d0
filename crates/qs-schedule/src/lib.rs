//! `qs-schedule` — customer arrivals: records, schedules, generation, files.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`arrival`]   | `ArrivalRecord`, `ArrivalSchedule` (per-lane cursor)      |
//! | [`generator`] | `ArrivalGenerator` — exponential inter-arrival sampling   |
//! | [`loader`]    | `load_schedules_file`, `load_schedules_reader`            |
//! | [`writer`]    | `write_schedules_file`, `write_schedules`                 |
//! | [`error`]     | `ScheduleError`, `ScheduleResult<T>`                      |
//!
//! # File format
//!
//! One line per arrival, tab separated, `#` starts a comment line:
//!
//! ```text
//! # t  lane  threat
//! 3    1     0
//! 7    2     1
//! ```
//!
//! Lanes are numbered from 1.  Times must not decrease within one lane.

pub mod arrival;
pub mod error;
pub mod generator;
pub mod loader;
pub mod writer;


pub use arrival::{ArrivalRecord, ArrivalSchedule};
pub use error::{ScheduleError, ScheduleResult};
pub use generator::ArrivalGenerator;
pub use loader::{load_schedules_file, load_schedules_reader};
pub use writer::{write_schedules, write_schedules_file};
