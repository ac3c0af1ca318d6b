//! Service-level errors.

use thiserror::Error;

use crate::cache::{CacheError, StoreError};
use crate::collaborators::CollaboratorError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("invalid header name '{0}'")]
    InvalidHeader(String),

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("collaborator client setup failed: {0}")]
    Collaborator(#[from] CollaboratorError),

    #[error("content store setup failed: {0}")]
    Store(#[from] StoreError),
}
