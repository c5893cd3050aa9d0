//! Framework error type.
//!
//! Three families of failure share this enum:
//!
//! - **Configuration errors** are raised once, while the parameter bundle is
//!   validated, before any simulation starts.  They name the offending
//!   profile / lane / bound so the operator can fix the input.
//! - **Consistency violations** mean the event loop itself is broken (the
//!   clock skipped a due event, a fractional queue length left `[0, 1]`).
//!   They abort the run; they carry the simulated time and the lane.
//! - **Input exhaustion** means a pre-generated arrival schedule was read
//!   past its end.
//!
//! None of these are retried: each one is a defect in code or input.

use thiserror::Error;

use crate::{LaneId, SimTime};

#[derive(Debug, Error)]
pub enum QsError {
    #[error("no screening profile is defined in the parameter set")]
    EmptyProfiles,

    #[error("profile {index} {profile}: {reason}")]
    InvalidProfile {
        /// 1-based position in the global profile list.
        index:   usize,
        profile: String,
        reason:  String,
    },

    #[error("profile {index} {profile} has the same or lower {what} than the previous profile; profiles must be listed in increasing order of {what}")]
    ProfileOrder {
        index:   usize,
        profile: String,
        what:    &'static str,
    },

    #[error("{lane}: profile slot {slot} refers to profile index {value}, expected range is [0:{max}]")]
    InvalidLaneProfile {
        lane:  LaneId,
        slot:  usize,
        value: usize,
        max:   usize,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{time}: {lane} missed the {event} due at t={due}")]
    MissedEvent {
        time:  SimTime,
        lane:  LaneId,
        event: &'static str,
        due:   u64,
    },

    #[error("{time}: {lane} reports an in-service elapsed fraction of {fraction}, outside [0, 1]")]
    ElapsedOutOfRange {
        time:     SimTime,
        lane:     LaneId,
        fraction: f64,
    },

    #[error("{time}: policy chose profile slot {slot} for {lane}, which only has {available} profiles")]
    InvalidProfileChoice {
        time:      SimTime,
        lane:      LaneId,
        slot:      usize,
        available: usize,
    },

    #[error("{lane}: arrival schedule of length {len} read beyond its end")]
    ScheduleExhausted { lane: LaneId, len: usize },
}

/// Shorthand result type for all `qs-*` crates.
pub type QsResult<T> = Result<T, QsError>;
