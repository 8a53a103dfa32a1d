//! gasc-scheduler — the scheduler actor and its event loop.
//!
//! Consumes offers and task status events from a cluster-manager driver,
//! launches daemons until the target count is reached, and once every
//! daemon is running hands the host list to an external tool.
//!
//! # Architecture
//!
//! ```text
//! driver events ──► run loop (tokio::select!) ──► GascScheduler
//!                        ▲                          ├── OfferEvaluator (gasc-placement)
//!                        │                          ├── LaunchPlan + DaemonRegistry (gasc-state)
//!                        │                          ├── ReadinessTrigger ──► ToolRunner task
//!                        └──── ToolReport ◄──────────────────────────────────┘
//!                                                   └── CompletionTrigger ──► driver stop/abort
//! ```
//!
//! Callbacks are delivered one at a time by the run loop, so the scheduler
//! mutates its state without locks. The tool runs on its own task and
//! never blocks status handling.

pub mod callbacks;
pub mod driver;
pub mod error;
pub mod outcome;
pub mod runner;
pub mod scheduler;
pub mod tool;
pub mod trigger;

pub use callbacks::{Scheduler, dispatch};
pub use driver::{DriverStatus, RecordingDriver, SchedulerDriver};
pub use error::{SchedulerError, SchedulerResult};
pub use outcome::RunOutcome;
pub use runner::{drive, run_framework};
pub use scheduler::GascScheduler;
pub use tool::{ToolReport, ToolRequest, ToolRunner};
