//! Error types for scheduler state.

use thiserror::Error;

use crate::types::TaskId;

/// Result type alias for state operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur while building or mutating scheduler state.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("invalid instance requirement: {0}")]
    InvalidRequirement(String),

    #[error("invalid task id: {0:?}")]
    InvalidTaskId(String),

    #[error("daemon already registered for task {0}")]
    DuplicateTask(TaskId),
}
