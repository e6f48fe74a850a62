use thiserror::Error;

/// Application-level errors (command-line layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] timetable_service::error::ServiceError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid section table: {0}")]
    SectionTableError(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
