//! gasc-core — types shared by every gasc crate.
//!
//! - **`types`** — the cluster-manager wire vocabulary: offers, resources,
//!   task launch descriptors, status events, scheduler events and the
//!   calls the scheduler makes back into the driver.
//! - **`config`** — `gasc.toml` parsing and validation.

pub mod config;
pub mod error;
pub mod types;

pub use config::GascConfig;
pub use error::{ConfigError, ConfigResult};
pub use types::*;
