//! gasc offer evaluation.
//!
//! Decides, one offer at a time, how many daemons to launch on the offered
//! node. Offers are evaluated independently and in delivery order; nothing
//! is retained between offers.
//!
//! # Components
//!
//! - **`resources`** — cpu/memory totals read from an offer
//! - **`evaluator`** — greedy packing against the launch quota
//! - **`convert`** — evaluator construction from `gasc.toml`

pub mod convert;
pub mod evaluator;
pub mod resources;

pub use convert::{evaluator_from_config, requirement_from_config};
pub use evaluator::{DaemonTemplate, DeclineReason, OfferDecision, OfferEvaluator};
pub use resources::OfferResources;
