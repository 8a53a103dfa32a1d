//! The run loop — serializes driver events and tool reports onto the
//! scheduler.

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use gasc_core::{GascConfig, SchedulerEvent};

use crate::callbacks::{Scheduler, dispatch};
use crate::driver::SchedulerDriver;
use crate::error::{SchedulerError, SchedulerResult};
use crate::outcome::RunOutcome;
use crate::scheduler::GascScheduler;
use crate::tool::{ToolReport, ToolRunner};

/// Feed events and tool reports to the scheduler, one at a time, until
/// the run has an outcome.
pub async fn drive(
    scheduler: &mut GascScheduler,
    driver: &mut dyn SchedulerDriver,
    events: &mut mpsc::Receiver<SchedulerEvent>,
    reports: &mut mpsc::UnboundedReceiver<ToolReport>,
) -> RunOutcome {
    let mut events_open = true;
    loop {
        if let Some(outcome) = scheduler.outcome() {
            return outcome.clone();
        }
        tokio::select! {
            event = events.recv(), if events_open => match event {
                Some(event) => dispatch(scheduler, driver, event),
                None => {
                    events_open = false;
                    scheduler.connection_closed(driver);
                }
            },
            Some(report) = reports.recv() => scheduler.tool_finished(driver, report),
            else => {
                // Stream closed and the worker went away without reporting.
                scheduler.tool_finished(
                    driver,
                    ToolReport::Failed {
                        reason: SchedulerError::WorkerGone.to_string(),
                    },
                );
            }
        }
    }
}

/// Run a whole framework: build the scheduler from `config`, start the tool
/// worker, and drive events until the run ends.
///
/// The tool worker is shut down before returning; a tool that is still
/// running is killed on a best-effort basis.
pub async fn run_framework(
    config: &GascConfig,
    driver: &mut dyn SchedulerDriver,
    mut events: mpsc::Receiver<SchedulerEvent>,
) -> SchedulerResult<RunOutcome> {
    let (tool_tx, tool_rx) = mpsc::unbounded_channel();
    let (report_tx, mut report_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut scheduler = GascScheduler::from_config(config, tool_tx)?;
    let worker = ToolRunner::from_config(&config.tool);
    let worker_handle = tokio::spawn(worker.run(tool_rx, report_tx, shutdown_rx));

    info!(
        instances = config.instance.count,
        cpus = config.instance.cpus,
        memory_mb = config.instance.memory_mb,
        "scheduler started"
    );

    let outcome = drive(&mut scheduler, driver, &mut events, &mut report_rx).await;

    let _ = shutdown_tx.send(true);
    drop(scheduler);
    if let Err(e) = worker_handle.await {
        debug!(error = %e, "tool worker ended abnormally");
    }

    info!(%outcome, "scheduler stopped");
    Ok(outcome)
}
