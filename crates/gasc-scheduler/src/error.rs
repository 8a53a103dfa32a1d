//! Scheduler error types.

use thiserror::Error;

/// Errors that can occur while setting up or running the scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("config error: {0}")]
    Config(#[from] gasc_core::ConfigError),

    #[error("state error: {0}")]
    State(#[from] gasc_state::StateError),

    #[error("failed to write host list {path}: {source}")]
    HostsFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start tool: {0}")]
    ToolSpawn(#[source] std::io::Error),

    #[error("tool worker is gone")]
    WorkerGone,
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
