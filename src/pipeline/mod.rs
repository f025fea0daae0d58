//! Batch orchestration

pub mod orchestrator;

pub use orchestrator::{run, BatchResult};
