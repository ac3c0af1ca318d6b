//! Page entry memoization and transformation get/put.

use dashmap::DashMap;
use std::sync::Arc;

use crate::cache::entry::PageCacheEntry;
use crate::cache::key::PageLocation;
use crate::cache::store::{ArtifactAddress, ContentStore, NOT_FOUND_SENTINEL};
use crate::cache::CacheError;
use crate::stats::StatsAggregator;
use crate::transform::mode::TransformationMode;

/// Artifact id the page record is stored under.
pub const PAGE_ENTRY_ARTIFACT: &str = "page-entry";
/// Data-file id of a transformation result.
pub const RESULT_FILE_ID: &str = "result";
/// Data-file id of the untouched source content.
pub const ORIGINAL_FILE_ID: &str = "original";
/// Command the original source is filed under.
pub const ORIGINAL_COMMAND: &str = "url-to-html";

/// Map a logical command name to its storage data key.
pub fn data_key_for_command(command: &str) -> String {
    if let Some(mode) = TransformationMode::from_command(command) {
        return mode.cache_data_key().to_string();
    }
    match command {
        "url-to-html" => "transformations/html".to_string(),
        "html-structure" => "analysis/structure".to_string(),
        "html-fragments" => "analysis/fragments".to_string(),
        other => format!("transformations/{}", other.replace('-', "_")),
    }
}

/// Owns the cache key → page entry memo table and talks to the content store.
pub struct CacheManager {
    store: Arc<dyn ContentStore>,
    namespace: String,
    entries: DashMap<String, PageCacheEntry>,
    stats: Arc<StatsAggregator>,
}

impl CacheManager {
    pub fn new(
        store: Arc<dyn ContentStore>,
        namespace: impl Into<String>,
        stats: Arc<StatsAggregator>,
    ) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            entries: DashMap::new(),
            stats,
        }
    }

    /// Fetch the memoized entry for `url`, creating it in the store if needed.
    ///
    /// Failure here is fatal for the caller: without an id nothing about the
    /// page can be cached.
    pub async fn get_or_create_page_entry(&self, url: &str) -> Result<PageCacheEntry, CacheError> {
        let location = PageLocation::parse(url)?;
        let cache_key = location.cache_key();

        if let Some(mut entry) = self.entries.get_mut(&cache_key) {
            entry.touch();
            return Ok(entry.clone());
        }

        let mut entry = PageCacheEntry::new(url, &location);
        let record = serde_json::to_string(&entry)?;
        let opaque_id = self
            .store
            .store_keyed(&self.namespace, &cache_key, PAGE_ENTRY_ARTIFACT, &record)
            .await
            .map_err(|source| CacheError::PageEntry {
                cache_key: cache_key.clone(),
                source,
            })?;
        entry.opaque_id = opaque_id;

        // Another task may have created the entry while the store call was in flight.
        let stored = match self.entries.entry(cache_key.clone()) {
            dashmap::mapref::entry::Entry::Occupied(mut existing) => {
                existing.get_mut().touch();
                existing.get().clone()
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                self.stats.record_page_cached();
                tracing::debug!(
                    cache_key = %cache_key,
                    opaque_id = %entry.opaque_id,
                    "Page entry created"
                );
                slot.insert(entry).clone()
            }
        };
        Ok(stored)
    }

    /// Memoized entry for `url`, without contacting the store.
    pub fn cached_page_entry(&self, url: &str) -> Option<PageCacheEntry> {
        let cache_key = PageLocation::parse(url).ok()?.cache_key();
        self.entries.get(&cache_key).map(|r| r.value().clone())
    }

    pub async fn get_cached_transformation(
        &self,
        url: &str,
        command: &str,
    ) -> Result<Option<String>, CacheError> {
        self.get_artifact(url, command, RESULT_FILE_ID).await
    }

    pub async fn store_transformation(
        &self,
        url: &str,
        command: &str,
        payload: &str,
    ) -> Result<(), CacheError> {
        self.put_artifact(url, command, RESULT_FILE_ID, payload).await
    }

    pub async fn get_original(&self, url: &str) -> Result<Option<String>, CacheError> {
        self.get_artifact(url, ORIGINAL_COMMAND, ORIGINAL_FILE_ID).await
    }

    pub async fn store_original(&self, url: &str, payload: &str) -> Result<(), CacheError> {
        self.put_artifact(url, ORIGINAL_COMMAND, ORIGINAL_FILE_ID, payload)
            .await
    }

    async fn address(
        &self,
        url: &str,
        command: &str,
        data_file_id: &str,
    ) -> Result<ArtifactAddress, CacheError> {
        let entry = self.get_or_create_page_entry(url).await?;
        Ok(ArtifactAddress {
            namespace: self.namespace.clone(),
            id: entry.opaque_id,
            data_key: data_key_for_command(command),
            data_file_id: data_file_id.to_string(),
        })
    }

    async fn get_artifact(
        &self,
        url: &str,
        command: &str,
        data_file_id: &str,
    ) -> Result<Option<String>, CacheError> {
        let address = self.address(url, command, data_file_id).await?;
        let payload = self.store.retrieve(&address).await?;
        Ok(payload.filter(|p| p != NOT_FOUND_SENTINEL))
    }

    async fn put_artifact(
        &self,
        url: &str,
        command: &str,
        data_file_id: &str,
        payload: &str,
    ) -> Result<(), CacheError> {
        let address = self.address(url, command, data_file_id).await?;
        self.store.store(&address, payload).await?;
        tracing::debug!(
            id = %address.id,
            data_key = %address.data_key,
            bytes = payload.len(),
            "Artifact stored"
        );
        Ok(())
    }
}
