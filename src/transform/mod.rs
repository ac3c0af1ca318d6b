//! Content transformation.
//!
//! # Responsibilities
//! - Closed set of transformation modes and their attributes (`mode.rs`)
//! - In-process rewriting for local modes (`local.rs`)
//! - Cache-around three-stage pipeline (`orchestrator.rs`)

pub mod local;
pub mod mode;
pub mod orchestrator;
pub mod types;

pub use mode::{EngineMode, FilterLogic, TransformationMode, VisualMode};
pub use orchestrator::TransformOrchestrator;
pub use types::{PipelineStage, TransformOutcome, TransformationResult};
