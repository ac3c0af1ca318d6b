//! Per-URL page cache entry.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::cache::key::PageLocation;

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// The record under which every transformation of one page is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageCacheEntry {
    /// URL that first created the entry.
    pub url: String,
    pub cache_key: String,
    /// Id assigned by the content store. Empty until the store has answered.
    pub opaque_id: String,
    pub domain: String,
    pub path: String,
    /// Seconds since epoch.
    pub created_at: u64,
    pub last_accessed: u64,
    pub access_count: u64,
}

impl PageCacheEntry {
    pub fn new(url: &str, location: &PageLocation) -> Self {
        let now = now_secs();
        Self {
            url: url.to_string(),
            cache_key: location.cache_key(),
            opaque_id: String::new(),
            domain: location.domain.clone(),
            path: location.path.clone(),
            created_at: now,
            last_accessed: now,
            access_count: 1,
        }
    }

    /// Access bookkeeping; the only mutation after creation.
    pub fn touch(&mut self) {
        self.last_accessed = now_secs();
        self.access_count += 1;
    }
}
