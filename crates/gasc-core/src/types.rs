//! Wire types exchanged with the cluster manager.
//!
//! Events flow in as [`SchedulerEvent`]s and the scheduler answers with
//! [`DriverCall`]s. Both are serialized as internally tagged JSON so a
//! cluster-manager adapter can speak to gasc one object per line.

use serde::{Deserialize, Serialize};

/// Identifier of an offer, as assigned by the cluster manager.
pub type OfferId = String;

/// Opaque identifier of a node (an agent, or "slave" in older vocabularies).
pub type SlaveId = String;

/// Identifier of an executor on a node.
pub type ExecutorId = String;

/// Name of the cpu resource inside an offer.
pub const CPUS: &str = "cpus";

/// Name of the memory resource inside an offer, in megabytes.
pub const MEM: &str = "mem";

// ── Resources ─────────────────────────────────────────────────────

/// Kind of a named resource.
///
/// Only scalars are interpreted; ranges and sets are carried through so
/// offers parse, but their contents are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    #[default]
    Scalar,
    Ranges,
    Set,
    #[serde(other)]
    Other,
}

/// A named resource from an offer or a task launch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    #[serde(default)]
    pub kind: ResourceKind,
    /// Present for scalar resources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl Resource {
    /// Build a scalar resource.
    pub fn scalar(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            kind: ResourceKind::Scalar,
            value: Some(value),
        }
    }

    /// The scalar value, if this is a scalar resource carrying one.
    pub fn scalar_value(&self) -> Option<f64> {
        match self.kind {
            ResourceKind::Scalar => self.value,
            _ => None,
        }
    }
}

// ── Offers ────────────────────────────────────────────────────────

/// A time-bounded grant of resources on one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub slave_id: SlaveId,
    /// Human-readable address of the node.
    pub hostname: String,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

// ── Tasks ─────────────────────────────────────────────────────────

/// A task launch descriptor handed to the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub task_id: String,
    pub name: String,
    pub slave_id: SlaveId,
    /// Shell command run on the node.
    pub command: String,
    pub resources: Vec<Resource>,
}

/// Task state as reported by the cluster manager.
///
/// Accepts both `RUNNING` and `TASK_RUNNING` spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    #[serde(alias = "TASK_STAGING")]
    Staging,
    #[serde(alias = "TASK_STARTING")]
    Starting,
    #[serde(alias = "TASK_RUNNING")]
    Running,
    #[serde(alias = "TASK_FINISHED")]
    Finished,
    #[serde(alias = "TASK_FAILED")]
    Failed,
    #[serde(alias = "TASK_KILLED")]
    Killed,
    #[serde(alias = "TASK_LOST")]
    Lost,
}

impl TaskState {
    pub fn label(&self) -> &'static str {
        match self {
            TaskState::Staging => "TASK_STAGING",
            TaskState::Starting => "TASK_STARTING",
            TaskState::Running => "TASK_RUNNING",
            TaskState::Finished => "TASK_FINISHED",
            TaskState::Failed => "TASK_FAILED",
            TaskState::Killed => "TASK_KILLED",
            TaskState::Lost => "TASK_LOST",
        }
    }
}

/// A status update for one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub task_id: String,
    pub state: TaskState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TaskStatus {
    pub fn new(task_id: impl Into<String>, state: TaskState) -> Self {
        Self {
            task_id: task_id.into(),
            state,
            message: None,
        }
    }
}

// ── Framework ─────────────────────────────────────────────────────

/// Identity the framework registers with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkInfo {
    pub user: String,
    pub name: String,
    /// Address of the cluster-manager master.
    pub master: String,
}

// ── Events and calls ──────────────────────────────────────────────

/// One callback from the cluster manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchedulerEvent {
    Registered {
        framework_id: String,
        master: String,
    },
    Reregistered {
        master: String,
    },
    Disconnected,
    ResourceOffers {
        offers: Vec<Offer>,
    },
    OfferRescinded {
        offer_id: OfferId,
    },
    StatusUpdate(TaskStatus),
    FrameworkMessage {
        executor_id: ExecutorId,
        slave_id: SlaveId,
        #[serde(default)]
        data: String,
    },
    SlaveLost {
        slave_id: SlaveId,
    },
    ExecutorLost {
        executor_id: ExecutorId,
        slave_id: SlaveId,
        #[serde(default)]
        status: i32,
    },
    Error {
        message: String,
    },
}

/// One call from the scheduler into the cluster-manager connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum DriverCall {
    Start { framework: FrameworkInfo },
    LaunchTasks { offer_id: OfferId, tasks: Vec<TaskInfo> },
    DeclineOffer { offer_id: OfferId },
    Stop,
    Abort,
}
