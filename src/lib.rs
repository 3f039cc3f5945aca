//! Conjecture Library
//!
//! Collatz sequence runner that remembers every number it has seen in a
//! durable JSON cache and uses it to skip work on later invocations.

pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod frequency;
pub mod interrupt;
pub mod logging;
pub mod planner;
pub mod seen_store;
pub mod sequence;

// Re-export main types for convenience
pub use config::{CountingConfig, SessionConfig};
pub use driver::{RunDriver, RunEvent, RunSummary, SessionReport};
pub use error::ConjectureError;
pub use frequency::{FrequencyCounter, FrequencyEntry, FrequencyPolicy, FrequencyReport};
pub use interrupt::CancelToken;
pub use planner::{RunMode, RunPlan};
pub use seen_store::{SeenSet, SeenStore};
pub use sequence::{StopSet, Trajectory, generate, step};
