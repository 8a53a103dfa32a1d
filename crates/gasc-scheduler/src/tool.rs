//! Tool worker — writes the host list and runs the external tool.
//!
//! Runs on its own task so the scheduler keeps processing status updates
//! while the tool is running. The host list is written completely before
//! the tool starts and is not touched again.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use gasc_core::config::ToolConfig;

use crate::error::{SchedulerError, SchedulerResult};

/// Sent by the readiness trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRequest {
    /// `host:port` per daemon, in task id order.
    pub hosts: Vec<String>,
}

/// Sent back to the run loop when the tool is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolReport {
    Exited { code: Option<i32> },
    Failed { reason: String },
}

/// Write one `host:port` per line.
pub async fn write_hosts_file(path: &Path, hosts: &[String]) -> SchedulerResult<()> {
    let mut content = String::new();
    for host in hosts {
        content.push_str(host);
        content.push('\n');
    }
    tokio::fs::write(path, content)
        .await
        .map_err(|source| SchedulerError::HostsFile {
            path: path.display().to_string(),
            source,
        })
}

#[derive(Debug, Clone)]
pub struct ToolRunner {
    command: String,
    hosts_file: PathBuf,
}

impl ToolRunner {
    pub fn new(command: &str, hosts_file: impl Into<PathBuf>) -> Self {
        Self {
            command: command.to_string(),
            hosts_file: hosts_file.into(),
        }
    }

    pub fn from_config(config: &ToolConfig) -> Self {
        Self::new(&config.command, &config.hosts_file)
    }

    pub fn hosts_file(&self) -> &Path {
        &self.hosts_file
    }

    /// Serve tool requests until shutdown or until the scheduler goes away.
    pub async fn run(
        self,
        mut requests: mpsc::UnboundedReceiver<ToolRequest>,
        reports: mpsc::UnboundedSender<ToolReport>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        debug!(command = %self.command, "tool worker starting");
        loop {
            tokio::select! {
                request = requests.recv() => {
                    let Some(request) = request else { break };
                    // `None` means the run ended while the tool was running.
                    let Some(report) = self.execute(request, &mut shutdown).await else {
                        break;
                    };
                    if reports.send(report).is_err() {
                        break;
                    }
                }
                _ = shutdown.changed() => break,
            }
        }
        debug!("tool worker stopped");
    }

    async fn execute(
        &self,
        request: ToolRequest,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Option<ToolReport> {
        if let Err(e) = write_hosts_file(&self.hosts_file, &request.hosts).await {
            error!(error = %e, "cannot hand off to tool");
            return Some(ToolReport::Failed {
                reason: e.to_string(),
            });
        }
        info!(path = %self.hosts_file.display(), hosts = request.hosts.len(), "host file written");

        let spawned = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                let e = SchedulerError::ToolSpawn(e);
                error!(command = %self.command, error = %e, "cannot hand off to tool");
                return Some(ToolReport::Failed {
                    reason: e.to_string(),
                });
            }
        };
        info!(command = %self.command, pid = ?child.id(), "tool started");

        tokio::select! {
            status = child.wait() => match status {
                Ok(status) => {
                    info!(code = ?status.code(), "tool exited");
                    Some(ToolReport::Exited { code: status.code() })
                }
                Err(e) => {
                    error!(error = %e, "failed waiting for tool");
                    Some(ToolReport::Failed { reason: e.to_string() })
                }
            },
            _ = shutdown.changed() => {
                warn!("run ending while tool is running, killing it");
                if let Err(e) = child.start_kill() {
                    warn!(error = %e, "failed to kill tool");
                }
                None
            }
        }
    }
}
