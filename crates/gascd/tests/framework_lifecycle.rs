//! End-to-end runs of the scheduler against a recording driver.
//!
//! Events are fed step by step through the same channel the JSON-lines
//! transport uses; the tool is a small shell command.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use gasc_core::{CPUS, GascConfig, MEM, Offer, Resource, SchedulerEvent, TaskState, TaskStatus};
use gasc_scheduler::{DriverStatus, RecordingDriver, RunOutcome, SchedulerDriver, run_framework};

const TIMEOUT: Duration = Duration::from_secs(10);

struct Run {
    events: mpsc::Sender<SchedulerEvent>,
    handle: JoinHandle<(RunOutcome, RecordingDriver)>,
}

impl Run {
    fn start(config: GascConfig) -> Self {
        let (events, rx) = mpsc::channel(64);
        let handle = tokio::spawn(async move {
            let mut driver = RecordingDriver::new();
            let outcome = run_framework(&config, &mut driver, rx).await.unwrap();
            (outcome, driver)
        });
        Self { events, handle }
    }

    async fn send(&self, event: SchedulerEvent) {
        self.events.send(event).await.unwrap();
    }

    async fn offer(&self, id: &str, host: &str, cpus: f64, mem: f64) {
        self.send(SchedulerEvent::ResourceOffers {
            offers: vec![Offer {
                id: id.to_string(),
                slave_id: format!("slave-{host}"),
                hostname: host.to_string(),
                resources: vec![Resource::scalar(CPUS, cpus), Resource::scalar(MEM, mem)],
            }],
        })
        .await;
    }

    async fn status(&self, task_id: &str, state: TaskState) {
        self.send(SchedulerEvent::StatusUpdate(TaskStatus::new(task_id, state)))
            .await;
    }

    async fn finish(self) -> (RunOutcome, RecordingDriver) {
        let Run { events, handle } = self;
        let result = tokio::time::timeout(TIMEOUT, handle)
            .await
            .expect("run did not end in time")
            .unwrap();
        drop(events);
        result
    }
}

fn config(dir: &Path, instances: u32, tool: &str, stop_on_exit: bool) -> GascConfig {
    let mut config = GascConfig::default();
    config.instance.count = instances;
    config.instance.cpus = 1.0;
    config.instance.memory_mb = 128;
    config.tool.command = tool.to_string();
    config.tool.hosts_file = hosts_path(dir).display().to_string();
    config.tool.stop_on_exit = stop_on_exit;
    config
}

fn hosts_path(dir: &Path) -> PathBuf {
    dir.join("hosts.txt")
}

async fn wait_for_file(path: &Path) {
    tokio::time::timeout(TIMEOUT, async {
        while !path.exists() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("file never appeared");
}

#[tokio::test]
async fn run_completes_when_every_daemon_finishes() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("invocations");
    let tool = format!("echo ran >> {}", marker.display());
    let run = Run::start(config(dir.path(), 3, &tool, false));

    run.offer("o1", "node-a", 2.0, 256.0).await;
    run.offer("o2", "node-b", 0.5, 256.0).await;
    run.offer("o3", "node-b", 4.0, 1024.0).await;
    for id in ["0", "1", "2"] {
        run.status(id, TaskState::Running).await;
    }
    run.status("2", TaskState::Running).await;
    wait_for_file(&marker).await;

    for id in ["0", "1", "2"] {
        run.status(id, TaskState::Finished).await;
    }
    let (outcome, driver) = run.finish().await;

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(driver.status(), DriverStatus::Stopped);
    assert_eq!(driver.launched_tasks().len(), 3);
    assert_eq!(driver.declined_offers(), vec!["o2"]);
    assert_eq!(
        std::fs::read_to_string(hosts_path(dir.path())).unwrap(),
        "node-a:8000\nnode-a:8001\nnode-b:8002\n"
    );
    assert_eq!(std::fs::read_to_string(&marker).unwrap(), "ran\n");
}

#[tokio::test]
async fn failed_daemon_is_relaunched_before_handoff() {
    let dir = tempfile::tempdir().unwrap();
    let seen = dir.path().join("seen.txt");
    let tool = format!("cp {} {}", hosts_path(dir.path()).display(), seen.display());
    let run = Run::start(config(dir.path(), 2, &tool, true));

    run.offer("o1", "node-a", 2.0, 256.0).await;
    run.status("1", TaskState::Failed).await;
    run.status("0", TaskState::Running).await;
    run.offer("o2", "node-b", 1.0, 128.0).await;
    run.status("2", TaskState::Running).await;

    let (outcome, driver) = run.finish().await;

    assert_eq!(outcome, RunOutcome::ToolExited { code: Some(0) });
    assert_eq!(outcome.exit_code(), 0);
    let ids: Vec<&str> = driver
        .launched_tasks()
        .iter()
        .map(|t| t.task_id.as_str())
        .collect();
    assert_eq!(ids, vec!["0", "1", "2"]);
    assert_eq!(
        std::fs::read_to_string(&seen).unwrap(),
        "node-a:8000\nnode-b:8002\n"
    );
}

#[tokio::test]
async fn failing_tool_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let run = Run::start(config(dir.path(), 1, "exit 4", true));

    run.offer("o1", "node-a", 1.0, 128.0).await;
    run.status("0", TaskState::Running).await;

    let (outcome, _driver) = run.finish().await;
    assert_eq!(outcome, RunOutcome::ToolExited { code: Some(4) });
    assert_eq!(outcome.exit_code(), 1);
}

#[tokio::test]
async fn node_loss_aborts_while_tool_runs() {
    let dir = tempfile::tempdir().unwrap();
    let run = Run::start(config(dir.path(), 1, "sleep 30", true));

    run.offer("o1", "node-a", 1.0, 128.0).await;
    run.status("0", TaskState::Running).await;
    wait_for_file(&hosts_path(dir.path())).await;
    run.send(SchedulerEvent::SlaveLost {
        slave_id: "slave-node-a".to_string(),
    })
    .await;

    let (outcome, driver) = run.finish().await;
    assert!(outcome.is_abort());
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(driver.status(), DriverStatus::Aborted);
}

#[tokio::test]
async fn framework_errors_do_not_end_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let run = Run::start(config(dir.path(), 1, "true", true));

    run.send(SchedulerEvent::Registered {
        framework_id: "fw-1".to_string(),
        master: "m:5050".to_string(),
    })
    .await;
    run.send(SchedulerEvent::Error {
        message: "master failover".to_string(),
    })
    .await;
    run.send(SchedulerEvent::Disconnected).await;
    run.send(SchedulerEvent::OfferRescinded {
        offer_id: "o9".to_string(),
    })
    .await;
    run.status("0", TaskState::Running).await;

    // Only closing the stream ends it.
    let Run { events, handle } = run;
    drop(events);
    let (outcome, driver) = tokio::time::timeout(TIMEOUT, handle)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(outcome, RunOutcome::Disconnected);
    assert!(driver.launched_tasks().is_empty());
}
