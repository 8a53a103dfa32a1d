//! Launch plan — the scheduler-wide counters.
//!
//! With `staged` the number of daemons launched but not yet running, the
//! plan keeps
//!
//! ```text
//! remaining_to_launch + staged + running_count + finished_count == target
//! ```
//!
//! `running_count` counts daemons currently running, so it never exceeds
//! the target even when failed daemons are relaunched.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::TaskId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchPlan {
    target: u32,
    remaining_to_launch: u32,
    running_count: u32,
    finished_count: u32,
    next_task_id: TaskId,
}

impl LaunchPlan {
    pub fn new(target: u32) -> Self {
        Self {
            target,
            remaining_to_launch: target,
            running_count: 0,
            finished_count: 0,
            next_task_id: 0,
        }
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn remaining_to_launch(&self) -> u32 {
        self.remaining_to_launch
    }

    pub fn running_count(&self) -> u32 {
        self.running_count
    }

    pub fn finished_count(&self) -> u32 {
        self.finished_count
    }

    /// The id the next allocation will receive.
    pub fn next_task_id(&self) -> TaskId {
        self.next_task_id
    }

    /// Take one slot from the quota and assign it a fresh task id.
    ///
    /// Returns `None` once the quota is exhausted.
    pub fn allocate(&mut self) -> Option<TaskId> {
        if self.remaining_to_launch == 0 {
            return None;
        }
        let task_id = self.next_task_id;
        self.next_task_id += 1;
        self.remaining_to_launch -= 1;
        Some(task_id)
    }

    /// Return a failed daemon's slot to the quota.
    pub fn requeue(&mut self) {
        if self.remaining_to_launch >= self.target {
            warn!(quota = self.target, "requeue with full quota, counters out of balance");
            return;
        }
        self.remaining_to_launch += 1;
    }

    /// A daemon entered `Running`. Returns the new running count.
    pub fn record_running(&mut self) -> u32 {
        if self.running_count >= self.target {
            warn!(quota = self.target, "running count already at target, counters out of balance");
        } else {
            self.running_count += 1;
        }
        self.running_count
    }

    /// A daemon left `Running`.
    pub fn record_left_running(&mut self) {
        self.running_count = self.running_count.saturating_sub(1);
    }

    /// A daemon entered `Finished`. Returns the new finished count.
    pub fn record_finished(&mut self) -> u32 {
        if self.finished_count >= self.target {
            warn!(quota = self.target, "finished count already at target, counters out of balance");
        } else {
            self.finished_count += 1;
        }
        self.finished_count
    }

    pub fn all_running(&self) -> bool {
        self.running_count == self.target
    }

    pub fn all_finished(&self) -> bool {
        self.finished_count == self.target
    }
}
