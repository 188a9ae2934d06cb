// Engine error kinds, contained at the tick boundary
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Division hazard: zero denominator while computing '{0}'")]
    DivisionHazard(&'static str),

    #[error("Snapshot invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Scheduler misuse: {0}")]
    SchedulerMisuse(&'static str),

    #[error("Invalid sampling range for '{name}': [{low}, {high})")]
    InvalidRange {
        name: &'static str,
        low: String,
        high: String,
    },

    #[error("Sample source failed: {0}")]
    Sampling(String),

    #[error("No async runtime available: {0}")]
    Runtime(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
