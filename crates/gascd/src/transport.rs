//! JSON-lines driver transport.
//!
//! One [`SchedulerEvent`] per input line, one [`DriverCall`] per output
//! line. An adapter speaking the cluster manager's own protocol sits on the
//! other side of the pipe.

use std::io::{self, BufRead, Write};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use gasc_core::{DriverCall, FrameworkInfo, OfferId, SchedulerEvent, TaskInfo};
use gasc_scheduler::{DriverStatus, SchedulerDriver};

/// Buffered events between the reader task and the run loop.
const EVENT_BUFFER: usize = 64;

/// Calls are written synchronously from the run loop, one flushed line per
/// call.
pub struct JsonLinesDriver<W: Write + Send> {
    out: W,
    status: DriverStatus,
}

impl<W: Write + Send> JsonLinesDriver<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            status: DriverStatus::Running,
        }
    }

    /// Announce the framework before any event is handled.
    pub fn start(&mut self, framework: &FrameworkInfo) -> io::Result<()> {
        self.write_call(&DriverCall::Start {
            framework: framework.clone(),
        })
    }

    fn write_call(&mut self, call: &DriverCall) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, call)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }

    fn send(&mut self, call: DriverCall) {
        if let Err(e) = self.write_call(&call) {
            error!(error = %e, ?call, "failed to write driver call");
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> SchedulerDriver for JsonLinesDriver<W> {
    fn launch_tasks(&mut self, offer_id: &OfferId, tasks: Vec<TaskInfo>) {
        self.send(DriverCall::LaunchTasks {
            offer_id: offer_id.clone(),
            tasks,
        });
    }

    fn decline_offer(&mut self, offer_id: &OfferId) {
        self.send(DriverCall::DeclineOffer {
            offer_id: offer_id.clone(),
        });
    }

    fn stop(&mut self) {
        self.send(DriverCall::Stop);
        if self.status == DriverStatus::Running {
            self.status = DriverStatus::Stopped;
        }
    }

    fn abort(&mut self) {
        self.send(DriverCall::Abort);
        self.status = DriverStatus::Aborted;
    }

    fn status(&self) -> DriverStatus {
        self.status
    }
}

/// Parse one input line. Blank and malformed lines yield `None`.
pub fn parse_event_line(line: &str) -> Option<SchedulerEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str(line) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(error = %e, %line, "skipping malformed event");
            None
        }
    }
}

/// Read events from `reader` on a background task. The channel closes at
/// end of input.
pub fn spawn_event_reader<R>(reader: R) -> mpsc::Receiver<SchedulerEvent>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let Some(event) = parse_event_line(&line) else {
                        continue;
                    };
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    debug!("event stream ended");
                    break;
                }
                Err(e) => {
                    error!(error = %e, "failed to read events");
                    break;
                }
            }
        }
    });
    rx
}

/// Read events from stdin on a dedicated OS thread.
///
/// A blocking stdin read cannot be cancelled. The thread is detached so the
/// process can exit while the adapter still holds the pipe open.
pub fn spawn_stdin_reader() -> io::Result<mpsc::Receiver<SchedulerEvent>> {
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    std::thread::Builder::new()
        .name("gasc-events".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        let Some(event) = parse_event_line(&line) else {
                            continue;
                        };
                        if tx.blocking_send(event).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "failed to read events");
                        return;
                    }
                }
            }
            debug!("event stream ended");
        })?;
    Ok(rx)
}
