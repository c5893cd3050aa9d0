use qs_core::QsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("schedule parse error at line {line}: {msg}")]
    Parse { line: u64, msg: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Core(#[from] QsError),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
