use qs_core::QsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Core(#[from] QsError),

    #[error("{got} arrival schedules supplied for {expected} lanes")]
    ScheduleCountMismatch { expected: usize, got: usize },

    #[error("run-to-exhaustion requested, but arrivals are generated without a limit (set n_gen_max or a stop time)")]
    Unbounded,
}

pub type SimResult<T> = Result<T, SimError>;
