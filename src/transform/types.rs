//! Transformation result types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::transform::mode::TransformationMode;

/// Stage of the remote pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Extract,
    Transform,
    Reconstruct,
}

impl PipelineStage {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStage::Extract => "extract",
            PipelineStage::Transform => "transform",
            PipelineStage::Reconstruct => "reconstruct",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a transformation did or did not happen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformOutcome {
    /// Mode was off; nothing ran.
    Passthrough,
    CacheHit,
    /// Pipeline ran to completion.
    Transformed,
    /// A pipeline stage failed; the source content is returned unchanged.
    Failed { stage: PipelineStage, reason: String },
}

/// Output of one `transform` call. Never persisted as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationResult {
    pub content: String,
    pub mode: TransformationMode,
    pub content_type: String,
    pub cache_hit: bool,
    pub elapsed_ms: f64,
    pub outcome: TransformOutcome,
}

impl TransformationResult {
    pub fn passthrough(source: &str, mode: TransformationMode) -> Self {
        Self {
            content: source.to_string(),
            mode,
            content_type: "text/html".to_string(),
            cache_hit: false,
            elapsed_ms: 0.0,
            outcome: TransformOutcome::Passthrough,
        }
    }

    pub fn cache_hit(content: String, mode: TransformationMode) -> Self {
        Self {
            content,
            mode,
            content_type: mode.response_content_type().to_string(),
            cache_hit: true,
            elapsed_ms: 0.0,
            outcome: TransformOutcome::CacheHit,
        }
    }

    pub fn transformed(content: String, mode: TransformationMode, elapsed_ms: f64) -> Self {
        Self {
            content,
            mode,
            content_type: mode.response_content_type().to_string(),
            cache_hit: false,
            elapsed_ms,
            outcome: TransformOutcome::Transformed,
        }
    }

    pub fn failed(
        source: &str,
        mode: TransformationMode,
        stage: PipelineStage,
        reason: String,
        elapsed_ms: f64,
    ) -> Self {
        Self {
            content: source.to_string(),
            mode,
            content_type: "text/html".to_string(),
            cache_hit: false,
            elapsed_ms,
            outcome: TransformOutcome::Failed { stage, reason },
        }
    }

    /// Whether `content` is the product of a transformation.
    pub fn is_transformed(&self) -> bool {
        matches!(
            self.outcome,
            TransformOutcome::CacheHit | TransformOutcome::Transformed
        )
    }
}
