//! Domain types for scheduler state.

use serde::{Deserialize, Serialize};

use gasc_core::TaskState;

use crate::error::{StateError, StateResult};

/// Numeric task identifier, assigned from a monotonic counter.
pub type TaskId = u64;

/// Parse the task id carried by a status event.
pub fn parse_task_id(raw: &str) -> StateResult<TaskId> {
    raw.trim()
        .parse()
        .map_err(|_| StateError::InvalidTaskId(raw.to_string()))
}

// ── Requirement ───────────────────────────────────────────────────

/// Resources every daemon instance needs. Fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstanceRequirement {
    cpus: f64,
    memory_mb: i64,
}

impl InstanceRequirement {
    pub fn new(cpus: f64, memory_mb: i64) -> StateResult<Self> {
        if !(cpus.is_finite() && cpus > 0.0) {
            return Err(StateError::InvalidRequirement(format!(
                "cpus must be positive, got {cpus}"
            )));
        }
        if memory_mb <= 0 {
            return Err(StateError::InvalidRequirement(format!(
                "memory must be positive, got {memory_mb} mb"
            )));
        }
        Ok(Self { cpus, memory_mb })
    }

    pub fn cpus(&self) -> f64 {
        self.cpus
    }

    pub fn memory_mb(&self) -> i64 {
        self.memory_mb
    }
}

// ── Daemon ────────────────────────────────────────────────────────

/// Lifecycle state of a daemon task.
///
/// `Staging → Starting → Running → Finished`, with `Failed`, `Killed` and
/// `Lost` as terminal failures. Nothing leaves a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DaemonState {
    Staging,
    Starting,
    Running,
    Finished,
    Failed,
    Killed,
    Lost,
}

impl DaemonState {
    /// Failed, killed or lost: the slot goes back to the launch quota.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            DaemonState::Failed | DaemonState::Killed | DaemonState::Lost
        )
    }

    pub fn is_terminal(&self) -> bool {
        *self == DaemonState::Finished || self.is_failure()
    }

    /// Launched but not yet running.
    pub fn is_staged(&self) -> bool {
        matches!(self, DaemonState::Staging | DaemonState::Starting)
    }

    /// Running, or finished after running. These daemons go in the host list.
    pub fn has_started(&self) -> bool {
        matches!(self, DaemonState::Running | DaemonState::Finished)
    }
}

impl From<TaskState> for DaemonState {
    fn from(state: TaskState) -> Self {
        match state {
            TaskState::Staging => DaemonState::Staging,
            TaskState::Starting => DaemonState::Starting,
            TaskState::Running => DaemonState::Running,
            TaskState::Finished => DaemonState::Finished,
            TaskState::Failed => DaemonState::Failed,
            TaskState::Killed => DaemonState::Killed,
            TaskState::Lost => DaemonState::Lost,
        }
    }
}

/// One launched daemon. Born in `Staging` when its launch is decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonRecord {
    pub task_id: TaskId,
    pub host: String,
    pub port: u16,
    pub state: DaemonState,
}

impl DaemonRecord {
    pub fn staging(task_id: TaskId, host: &str, port: u16) -> Self {
        Self {
            task_id,
            host: host.to_string(),
            port,
            state: DaemonState::Staging,
        }
    }

    /// `host:port`, as written to the host list.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requirement_rejects_non_positive() {
        assert!(InstanceRequirement::new(0.0, 128).is_err());
        assert!(InstanceRequirement::new(-1.0, 128).is_err());
        assert!(InstanceRequirement::new(f64::NAN, 128).is_err());
        assert!(InstanceRequirement::new(1.0, 0).is_err());
        let req = InstanceRequirement::new(0.5, 64).unwrap();
        assert_eq!(req.cpus(), 0.5);
        assert_eq!(req.memory_mb(), 64);
    }

    #[test]
    fn failure_states() {
        for state in [DaemonState::Failed, DaemonState::Killed, DaemonState::Lost] {
            assert!(state.is_failure(), "{state:?}");
            assert!(state.is_terminal(), "{state:?}");
        }
        assert!(!DaemonState::Finished.is_failure());
        assert!(DaemonState::Finished.is_terminal());
        assert!(!DaemonState::Running.is_terminal());
    }

    #[test]
    fn task_id_parsing() {
        assert_eq!(parse_task_id("42").unwrap(), 42);
        assert_eq!(parse_task_id(" 7 ").unwrap(), 7);
        assert!(matches!(
            parse_task_id("daemon-1"),
            Err(StateError::InvalidTaskId(_))
        ));
        assert!(parse_task_id("-1").is_err());
    }

    #[test]
    fn endpoint_formats_host_and_port() {
        let record = DaemonRecord::staging(3, "node-a", 8003);
        assert_eq!(record.endpoint(), "node-a:8003");
        assert_eq!(record.state, DaemonState::Staging);
    }
}
