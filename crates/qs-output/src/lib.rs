//! `qs-output` — run output writers for the qsim lane simulator.
//!
//! | Writer                      | File                  | Contents                              |
//! |-----------------------------|-----------------------|---------------------------------------|
//! | [`write_queue_log_file`]    | `queue-NNN.dat`       | `time count` lines + caught/missed    |
//! | [`write_lane_stats_file`]   | `lane_stats-NNN.csv`  | one [`LaneStatsRow`] per lane         |
//! | [`RunsWriter`]              | `runs.csv`            | one [`RunRow`] per run                |
//!
//! # Usage
//!
//! ```rust,ignore
//! use qs_output::{write_queue_log_file, LaneStatsRow, RunRow, RunsWriter};
//!
//! let mut runs = RunsWriter::new(out_dir)?;
//! sim.simulate(None, &mut NoopObserver)?;
//! write_queue_log_file(&out_dir.join("queue-000.dat"), sim.queue_log(), sim.lanes())?;
//! runs.write_run(&RunRow::new(0, seed, params.policy, &sim.summary()))?;
//! runs.finish()?;
//! ```

pub mod csv;
pub mod error;
pub mod queue_log;
pub mod row;


pub use crate::csv::{write_lane_stats, write_lane_stats_file, RunsWriter};
pub use error::{OutputError, OutputResult};
pub use queue_log::{write_queue_log, write_queue_log_file};
pub use row::{LaneStatsRow, RunRow};
