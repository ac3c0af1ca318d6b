//! Page caching subsystem.
//!
//! # Data Flow
//! ```text
//! URL
//!     → key.rs (domain + sanitized path → cache key)
//!     → manager.rs (memo table → page entry → opaque id)
//!     → store.rs (artifact get/put by namespace, id, data key, data-file id)
//! ```
//!
//! # Design Decisions
//! - Query strings and fragments are not part of the key
//! - At most one page entry per cache key; creation is idempotent
//! - Entries are never deleted here

pub mod entry;
pub mod key;
pub mod manager;
pub mod store;

use thiserror::Error;

pub use entry::PageCacheEntry;
pub use key::{url_to_cache_key, PageLocation};
pub use manager::{data_key_for_command, CacheManager};
pub use store::{ArtifactAddress, ContentStore, HttpContentStore, MemoryContentStore, StoreError};

/// Errors from the caching layer.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// No page id could be obtained, so nothing can be cached for this URL.
    #[error("could not create page entry for {cache_key}: {source}")]
    PageEntry {
        cache_key: String,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("page entry could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
}
