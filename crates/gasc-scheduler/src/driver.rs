//! The cluster-manager connection as seen by the scheduler.

use gasc_core::{DriverCall, OfferId, TaskInfo};

/// State of the driver after the scheduler has acted on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverStatus {
    Running,
    Stopped,
    Aborted,
}

/// Calls the scheduler makes into the cluster manager.
///
/// Implementations only forward; they must not call back into the
/// scheduler.
pub trait SchedulerDriver: Send {
    fn launch_tasks(&mut self, offer_id: &OfferId, tasks: Vec<TaskInfo>);

    fn decline_offer(&mut self, offer_id: &OfferId);

    /// Stop normally; the framework unregisters.
    fn stop(&mut self);

    /// Stop after an unrecoverable failure.
    fn abort(&mut self);

    fn status(&self) -> DriverStatus;
}

/// Driver that records every call. Used for dry runs and tests.
#[derive(Debug)]
pub struct RecordingDriver {
    calls: Vec<DriverCall>,
    status: DriverStatus,
}

impl Default for RecordingDriver {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            status: DriverStatus::Running,
        }
    }
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[DriverCall] {
        &self.calls
    }

    /// Every task launched so far, across all offers.
    pub fn launched_tasks(&self) -> Vec<&TaskInfo> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DriverCall::LaunchTasks { tasks, .. } => Some(tasks),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn declined_offers(&self) -> Vec<&OfferId> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DriverCall::DeclineOffer { offer_id } => Some(offer_id),
                _ => None,
            })
            .collect()
    }
}

impl SchedulerDriver for RecordingDriver {
    fn launch_tasks(&mut self, offer_id: &OfferId, tasks: Vec<TaskInfo>) {
        self.calls.push(DriverCall::LaunchTasks {
            offer_id: offer_id.clone(),
            tasks,
        });
    }

    fn decline_offer(&mut self, offer_id: &OfferId) {
        self.calls.push(DriverCall::DeclineOffer {
            offer_id: offer_id.clone(),
        });
    }

    fn stop(&mut self) {
        self.calls.push(DriverCall::Stop);
        if self.status == DriverStatus::Running {
            self.status = DriverStatus::Stopped;
        }
    }

    fn abort(&mut self) {
        self.calls.push(DriverCall::Abort);
        self.status = DriverStatus::Aborted;
    }

    fn status(&self) -> DriverStatus {
        self.status
    }
}
