//! gasc-state — in-memory state owned by the scheduler actor.
//!
//! # Architecture
//!
//! ```text
//! LaunchPlan      remaining / running / finished counters + task id counter
//! DaemonRegistry  task id → DaemonRecord, ordered by task id
//! ```
//!
//! Nothing here is shared: the scheduler owns both values and mutates them
//! from its serialized event loop, so no locking is involved. State is not
//! persisted; a restarted scheduler starts from an empty plan.

pub mod error;
pub mod plan;
pub mod registry;
pub mod types;

pub use error::{StateError, StateResult};
pub use plan::LaunchPlan;
pub use registry::DaemonRegistry;
pub use types::*;
