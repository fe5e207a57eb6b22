use thiserror::Error;

/// Task registry errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("task already registered: {0}")]
    DuplicateTask(String),
}

/// Failures of the queue backend itself.
///
/// An unknown job id is not an error; status lookups report it as `None`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("queue rejected job: {0}")]
    Rejected(String),

    #[error("queue backend unavailable: {0}")]
    Unavailable(String),

    #[error("queue state lock poisoned")]
    Poisoned,
}

/// Infrastructure failures surfaced by the workflow entry points.
///
/// Lookup and validation failures never end up here; they are outcomes.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),
}
