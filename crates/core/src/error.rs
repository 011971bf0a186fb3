// Central Error Type for the Library

use thiserror::Error;

/// Failure value delivered through an executor's `on_failure` slot.
///
/// Both execution modes surface the same taxonomy: a task returning an error,
/// a task panicking, or the host platform failing around the background
/// context itself.
#[derive(Error, Debug, Clone)]
pub enum OffloadError {
    #[error("Task error: {0}")]
    Task(#[from] crate::domain::TaskError),

    #[error("Task panicked: {0}")]
    Panic(String),

    #[error("Platform error: {0}")]
    Platform(#[from] crate::port::PlatformError),
}

/// Result type alias using OffloadError
pub type Result<T> = std::result::Result<T, OffloadError>;
