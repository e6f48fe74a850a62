use thiserror::Error;

use crate::script::ScriptExecutionError;

/// Service layer errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    ScriptError(#[from] ScriptExecutionError),

    #[error(transparent)]
    CoreError(#[from] timetable_core::error::CoreError),

    /// Every format in the fallback chain yielded zero courses.
    #[error("No sessions recognized in {0} input")]
    NoSessionsRecognized(&'static str),

    #[error("Sink rejected sessions: {0}")]
    SinkError(String),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
