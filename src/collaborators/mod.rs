//! Remote pipeline collaborators.
//!
//! # Data Flow
//! ```text
//! source HTML
//!     → StructureExtractor (structure + fragment map)
//!     → TextTransformer (transformed fragment map)
//!     → Reconstructor (final content)
//! ```
//!
//! # Design Decisions
//! - One trait per collaborator so tests and alternative backends can stand in
//! - Every HTTP call has its own timeout and is attempted exactly once
//! - Wire formats belong to the collaborators; only the shapes used here are modelled

pub mod client;
pub mod types;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::CollaboratorConfig;
use crate::transform::mode::TransformationMode;

pub use client::HttpCollaborators;
pub use types::{
    CollaboratorError, CollaboratorResult, Extraction, FragmentMap, ReconstructRequest,
    TransformRequest, TransformResponse,
};

/// Splits markup into structure and text fragments.
#[async_trait]
pub trait StructureExtractor: Send + Sync {
    async fn extract(&self, content: &str) -> CollaboratorResult<Extraction>;
}

/// Rewrites text fragments for a transformation mode.
#[async_trait]
pub trait TextTransformer: Send + Sync {
    async fn transform(
        &self,
        mode: TransformationMode,
        request: TransformRequest,
    ) -> CollaboratorResult<TransformResponse>;
}

/// Rebuilds content from structure and (transformed) fragments.
#[async_trait]
pub trait Reconstructor: Send + Sync {
    async fn reconstruct(&self, request: ReconstructRequest) -> CollaboratorResult<String>;
}

/// The three pipeline collaborators, shared across requests.
#[derive(Clone)]
pub struct Collaborators {
    pub extractor: Arc<dyn StructureExtractor>,
    pub transformer: Arc<dyn TextTransformer>,
    pub reconstructor: Arc<dyn Reconstructor>,
}

impl Collaborators {
    /// Build HTTP-backed collaborators from configuration.
    pub fn http(config: &CollaboratorConfig) -> CollaboratorResult<Self> {
        let remote = Arc::new(HttpCollaborators::new(config.clone())?);
        Ok(Self::from_shared(remote))
    }

    /// Use one value for all three roles.
    pub fn from_shared<T>(shared: Arc<T>) -> Self
    where
        T: StructureExtractor + TextTransformer + Reconstructor + 'static,
    {
        Self {
            extractor: shared.clone(),
            transformer: shared.clone(),
            reconstructor: shared,
        }
    }
}
