//! Collaborator wire types and error definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::transform::mode::{EngineMode, FilterLogic, VisualMode};

/// Opaque fragment id → text it stands for.
pub type FragmentMap = BTreeMap<String, String>;

/// Output of the structural extraction collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    /// Markup structure with text replaced by fragment ids.
    pub structure: serde_json::Value,
    pub fragments: FragmentMap,
}

/// Request body for the text transformation collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformRequest {
    pub fragments: FragmentMap,
    pub engine: EngineMode,
    pub criteria: Vec<String>,
    pub logic: FilterLogic,
    pub visual: VisualMode,
}

/// Response body of the text transformation collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformResponse {
    #[serde(default)]
    pub fragments: FragmentMap,
    pub success: bool,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub transformed: usize,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Request body for the reconstruction collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconstructRequest {
    pub structure: serde_json::Value,
    pub fragments: FragmentMap,
}

/// Errors from a remote collaborator call.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// No response within the configured deadline.
    #[error("{service} timed out after {secs} seconds")]
    Timeout { service: &'static str, secs: u64 },

    /// Connection or protocol failure.
    #[error("{service} request failed: {reason}")]
    Transport { service: &'static str, reason: String },

    /// Non-success HTTP status.
    #[error("{service} returned status {status}")]
    Status { service: &'static str, status: u16 },

    /// Response body did not match the expected shape.
    #[error("{service} response could not be decoded: {reason}")]
    Decode { service: &'static str, reason: String },

    /// The collaborator answered but reported failure.
    #[error("{service} rejected the request: {reason}")]
    Rejected { service: &'static str, reason: String },
}

pub type CollaboratorResult<T> = Result<T, CollaboratorError>;
