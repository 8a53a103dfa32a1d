//! One-shot triggers fired by the scheduler's counters.

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::driver::SchedulerDriver;
use crate::error::{SchedulerError, SchedulerResult};
use crate::outcome::RunOutcome;
use crate::tool::ToolRequest;

/// Hands the host list to the tool worker, at most once per run.
#[derive(Debug)]
pub struct ReadinessTrigger {
    tool_tx: mpsc::UnboundedSender<ToolRequest>,
    fired: bool,
}

impl ReadinessTrigger {
    pub fn new(tool_tx: mpsc::UnboundedSender<ToolRequest>) -> Self {
        Self {
            tool_tx,
            fired: false,
        }
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Send the host list to the worker. Returns `false` if already fired.
    pub fn fire(&mut self, hosts: Vec<String>) -> SchedulerResult<bool> {
        if self.fired {
            debug!("readiness already fired, ignoring");
            return Ok(false);
        }
        self.fired = true;
        info!(daemons = hosts.len(), "all daemons running, handing off to tool");
        self.tool_tx
            .send(ToolRequest { hosts })
            .map_err(|_| SchedulerError::WorkerGone)?;
        Ok(true)
    }
}

/// Records the first outcome and stops the driver.
#[derive(Debug, Default)]
pub struct CompletionTrigger {
    outcome: Option<RunOutcome>,
}

impl CompletionTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcome(&self) -> Option<&RunOutcome> {
        self.outcome.as_ref()
    }

    /// Returns `false` if the run already has an outcome.
    pub fn fire(&mut self, driver: &mut dyn SchedulerDriver, outcome: RunOutcome) -> bool {
        if self.outcome.is_some() {
            debug!(%outcome, "run already ending, ignoring");
            return false;
        }
        info!(%outcome, "run ending");
        if outcome.is_abort() {
            driver.abort();
        } else {
            driver.stop();
        }
        self.outcome = Some(outcome);
        true
    }
}
