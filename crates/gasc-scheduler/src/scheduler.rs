//! GascScheduler — the offer and status handling actor.
//!
//! Owns the launch plan and the daemon registry. Status updates move
//! daemons through their lifecycle:
//!
//! - any of `Failed`, `Killed`, `Lost` drops the daemon and returns its
//!   slot to the launch quota, so a later offer relaunches it
//! - `Running` counts towards readiness; when every daemon runs the host
//!   list goes to the tool worker, once
//! - `Finished` counts towards completion; when every daemon finished the
//!   driver is stopped
//!
//! Losing a node or an executor aborts the run.

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use gasc_core::{ExecutorId, GascConfig, Offer, OfferId, SlaveId, TaskStatus};
use gasc_placement::{OfferDecision, OfferEvaluator, evaluator_from_config};
use gasc_state::{DaemonRegistry, DaemonState, LaunchPlan, parse_task_id};

use crate::callbacks::Scheduler;
use crate::driver::SchedulerDriver;
use crate::error::SchedulerResult;
use crate::outcome::RunOutcome;
use crate::tool::{ToolReport, ToolRequest};
use crate::trigger::{CompletionTrigger, ReadinessTrigger};

pub struct GascScheduler {
    evaluator: OfferEvaluator,
    plan: LaunchPlan,
    registry: DaemonRegistry,
    readiness: ReadinessTrigger,
    completion: CompletionTrigger,
    /// End the run when the tool exits.
    stop_on_tool_exit: bool,
    /// Let a started tool finish after the event stream closes.
    wait_on_eof: bool,
    events_closed: bool,
    tool_reported: bool,
}

impl GascScheduler {
    pub fn new(
        evaluator: OfferEvaluator,
        instances: u32,
        tool_tx: mpsc::UnboundedSender<ToolRequest>,
        stop_on_tool_exit: bool,
    ) -> Self {
        Self {
            evaluator,
            plan: LaunchPlan::new(instances),
            registry: DaemonRegistry::new(),
            readiness: ReadinessTrigger::new(tool_tx),
            completion: CompletionTrigger::new(),
            stop_on_tool_exit,
            wait_on_eof: false,
            events_closed: false,
            tool_reported: false,
        }
    }

    pub fn with_wait_on_eof(mut self, wait_on_eof: bool) -> Self {
        self.wait_on_eof = wait_on_eof;
        self
    }

    pub fn from_config(
        config: &GascConfig,
        tool_tx: mpsc::UnboundedSender<ToolRequest>,
    ) -> SchedulerResult<Self> {
        config.validate()?;
        let evaluator = evaluator_from_config(config)?;
        Ok(Self::new(
            evaluator,
            config.instance.count,
            tool_tx,
            config.tool.stop_on_exit,
        )
        .with_wait_on_eof(config.tool.wait_on_eof))
    }

    pub fn plan(&self) -> &LaunchPlan {
        &self.plan
    }

    pub fn registry(&self) -> &DaemonRegistry {
        &self.registry
    }

    pub fn readiness_fired(&self) -> bool {
        self.readiness.has_fired()
    }

    /// The tool was handed off and has not reported back yet.
    pub fn tool_running(&self) -> bool {
        self.readiness.has_fired() && !self.tool_reported
    }

    /// Set once the run is ending; the run loop exits when it is.
    pub fn outcome(&self) -> Option<&RunOutcome> {
        self.completion.outcome()
    }

    fn handle_offer(&mut self, driver: &mut dyn SchedulerDriver, offer: &Offer) {
        if self.completion.outcome().is_some() {
            debug!(offer_id = %offer.id, "run ending, declining offer");
            driver.decline_offer(&offer.id);
            return;
        }
        match self
            .evaluator
            .evaluate(offer, &mut self.plan, &mut self.registry)
        {
            OfferDecision::Launch { tasks, residue } => {
                debug!(
                    offer_id = %offer.id,
                    tasks = tasks.len(),
                    residual_cpus = residue.cpus,
                    residual_mem = residue.mem,
                    remaining = self.plan.remaining_to_launch(),
                    "accepting offer"
                );
                driver.launch_tasks(&offer.id, tasks);
            }
            OfferDecision::Decline(_) => driver.decline_offer(&offer.id),
        }
    }

    fn fire_readiness(&mut self, driver: &mut dyn SchedulerDriver) {
        let hosts = self.registry.host_list();
        if let Err(e) = self.readiness.fire(hosts) {
            error!(error = %e, "cannot hand off to tool");
            self.completion.fire(
                driver,
                RunOutcome::ToolFailed {
                    reason: e.to_string(),
                },
            );
        }
    }

    fn abort(&mut self, driver: &mut dyn SchedulerDriver, reason: String) {
        error!(%reason, "aborting run: gasc can't recover");
        self.completion.fire(driver, RunOutcome::Aborted { reason });
    }
}

impl Scheduler for GascScheduler {
    fn registered(&mut self, _driver: &mut dyn SchedulerDriver, framework_id: &str, master: &str) {
        info!(%framework_id, %master, "gasc registered");
    }

    fn reregistered(&mut self, _driver: &mut dyn SchedulerDriver, master: &str) {
        warn!(%master, "gasc reregistered");
    }

    fn disconnected(&mut self, _driver: &mut dyn SchedulerDriver) {
        warn!("gasc disconnected");
    }

    fn resource_offers(&mut self, driver: &mut dyn SchedulerDriver, offers: &[Offer]) {
        for offer in offers {
            self.handle_offer(driver, offer);
        }
    }

    fn offer_rescinded(&mut self, _driver: &mut dyn SchedulerDriver, offer_id: &OfferId) {
        // Offers are accepted or declined immediately; nothing is held.
        debug!(%offer_id, "offer rescinded");
    }

    fn status_update(&mut self, driver: &mut dyn SchedulerDriver, status: &TaskStatus) {
        let task_id = match parse_task_id(&status.task_id) {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, state = status.state.label(), "ignoring status update");
                return;
            }
        };
        debug!(task_id, state = status.state.label(), "task status");

        let Some(record) = self.registry.get_mut(task_id) else {
            debug!(task_id, "status update for unknown task, ignoring");
            return;
        };

        let previous = record.state;
        let next = DaemonState::from(status.state);
        if previous.is_terminal() {
            debug!(task_id, ?previous, ?next, "daemon already terminal, ignoring");
            return;
        }
        if previous == next {
            debug!(task_id, state = ?next, "duplicate status, ignoring");
            return;
        }
        record.state = next;
        debug!(task_id, from = ?previous, to = ?next, "daemon transitioned");

        if previous == DaemonState::Running {
            self.plan.record_left_running();
        }

        match next {
            DaemonState::Failed | DaemonState::Killed | DaemonState::Lost => {
                self.registry.remove(task_id);
                self.plan.requeue();
                warn!(
                    task_id,
                    state = ?next,
                    remaining = self.plan.remaining_to_launch(),
                    "daemon failed, slot returned for relaunch"
                );
            }
            DaemonState::Running => {
                let running = self.plan.record_running();
                debug!(task_id, running, target = self.plan.target(), "daemon running");
                if self.plan.all_running() && !self.readiness.has_fired() {
                    self.fire_readiness(driver);
                }
            }
            DaemonState::Finished => {
                let finished = self.plan.record_finished();
                debug!(task_id, finished, target = self.plan.target(), "daemon finished");
                if self.plan.all_finished() {
                    self.completion.fire(driver, RunOutcome::Completed);
                }
            }
            DaemonState::Staging | DaemonState::Starting => {}
        }
    }

    fn framework_message(
        &mut self,
        _driver: &mut dyn SchedulerDriver,
        executor_id: &ExecutorId,
        slave_id: &SlaveId,
        data: &str,
    ) {
        debug!(%executor_id, %slave_id, bytes = data.len(), "ignoring framework message");
    }

    fn slave_lost(&mut self, driver: &mut dyn SchedulerDriver, slave_id: &SlaveId) {
        self.abort(driver, format!("lost slave {slave_id}"));
    }

    fn executor_lost(
        &mut self,
        driver: &mut dyn SchedulerDriver,
        executor_id: &ExecutorId,
        slave_id: &SlaveId,
        status: i32,
    ) {
        self.abort(
            driver,
            format!("lost executor {executor_id} on slave {slave_id} (status {status})"),
        );
    }

    fn error(&mut self, _driver: &mut dyn SchedulerDriver, message: &str) {
        error!(%message, "detected framework error");
    }

    fn tool_finished(&mut self, driver: &mut dyn SchedulerDriver, report: ToolReport) {
        self.tool_reported = true;
        match report {
            ToolReport::Exited { code } => {
                if code == Some(0) {
                    info!("tool finished successfully");
                } else {
                    warn!(?code, "tool exited with failure");
                }
                if self.stop_on_tool_exit {
                    self.completion.fire(driver, RunOutcome::ToolExited { code });
                }
            }
            ToolReport::Failed { reason } => {
                self.completion.fire(driver, RunOutcome::ToolFailed { reason });
            }
        }
        // Nothing else can arrive once the stream is gone.
        if self.events_closed {
            self.completion.fire(driver, RunOutcome::Disconnected);
        }
    }

    fn connection_closed(&mut self, driver: &mut dyn SchedulerDriver) {
        self.events_closed = true;
        if self.wait_on_eof && self.tool_running() {
            info!("driver event stream closed, waiting for tool to exit");
            return;
        }
        warn!("driver event stream closed");
        self.completion.fire(driver, RunOutcome::Disconnected);
    }
}
