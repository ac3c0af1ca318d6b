//! Content-addressable store backends.
//!
//! # Responsibilities
//! - Keyed, idempotent creation of page records (returns the store's opaque id)
//! - Store/retrieve string artifacts by (namespace, id, data key, data-file id)
//!
//! # Design Decisions
//! - The store owns its wire format; only these three operations are modelled
//! - A miss is `Ok(None)` or the `NOT_FOUND` sentinel, never an error

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::config::StoreConfig;

/// Payload some stores return instead of a 404.
pub const NOT_FOUND_SENTINEL: &str = "NOT_FOUND";

/// Errors from the content store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("content store timed out after {0} seconds")]
    Timeout(u64),

    #[error("content store request failed: {0}")]
    Transport(String),

    #[error("content store returned status {0}")]
    Status(u16),

    #[error("content store response could not be decoded: {0}")]
    Decode(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Full address of one stored artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactAddress {
    pub namespace: String,
    pub id: String,
    pub data_key: String,
    pub data_file_id: String,
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store `payload` under `key`, or return the id already held for `key`.
    async fn store_keyed(
        &self,
        namespace: &str,
        key: &str,
        artifact_id: &str,
        payload: &str,
    ) -> StoreResult<String>;

    async fn store(&self, address: &ArtifactAddress, payload: &str) -> StoreResult<()>;

    async fn retrieve(&self, address: &ArtifactAddress) -> StoreResult<Option<String>>;
}

/// In-process store. Ids are random UUIDs.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    keys: DashMap<(String, String), String>,
    artifacts: DashMap<ArtifactAddress, String>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored artifacts (excluding keyed records).
    pub fn artifact_count(&self) -> usize {
        self.artifacts.len()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn store_keyed(
        &self,
        namespace: &str,
        key: &str,
        artifact_id: &str,
        payload: &str,
    ) -> StoreResult<String> {
        let entry = self
            .keys
            .entry((namespace.to_string(), key.to_string()))
            .or_insert_with(|| Uuid::new_v4().to_string());
        let id = entry.value().clone();
        drop(entry);

        let address = ArtifactAddress {
            namespace: namespace.to_string(),
            id: id.clone(),
            data_key: key.to_string(),
            data_file_id: artifact_id.to_string(),
        };
        self.artifacts
            .entry(address)
            .or_insert_with(|| payload.to_string());
        Ok(id)
    }

    async fn store(&self, address: &ArtifactAddress, payload: &str) -> StoreResult<()> {
        self.artifacts.insert(address.clone(), payload.to_string());
        Ok(())
    }

    async fn retrieve(&self, address: &ArtifactAddress) -> StoreResult<Option<String>> {
        Ok(self.artifacts.get(address).map(|r| r.value().clone()))
    }
}

#[derive(Serialize)]
struct KeyedStoreRequest<'a> {
    namespace: &'a str,
    key: &'a str,
    artifact_id: &'a str,
    payload: &'a str,
}

#[derive(Deserialize)]
struct KeyedStoreResponse {
    id: String,
}

#[derive(Serialize)]
struct ArtifactRequest<'a> {
    #[serde(flatten)]
    address: &'a ArtifactAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<&'a str>,
}

/// Remote store over HTTP.
#[derive(Clone)]
pub struct HttpContentStore {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl HttpContentStore {
    pub fn new(config: &StoreConfig) -> StoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> StoreError {
        if e.is_timeout() {
            StoreError::Timeout(self.timeout_secs)
        } else {
            StoreError::Transport(e.to_string())
        }
    }

    async fn post<T: Serialize>(&self, path: &str, body: &T) -> StoreResult<reqwest::Response> {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn store_keyed(
        &self,
        namespace: &str,
        key: &str,
        artifact_id: &str,
        payload: &str,
    ) -> StoreResult<String> {
        let request = KeyedStoreRequest {
            namespace,
            key,
            artifact_id,
            payload,
        };
        let response = self.post("/keyed", &request).await?;
        if !response.status().is_success() {
            return Err(StoreError::Status(response.status().as_u16()));
        }
        let body: KeyedStoreResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(body.id)
    }

    async fn store(&self, address: &ArtifactAddress, payload: &str) -> StoreResult<()> {
        let request = ArtifactRequest {
            address,
            payload: Some(payload),
        };
        let response = self.post("/store", &request).await?;
        if !response.status().is_success() {
            return Err(StoreError::Status(response.status().as_u16()));
        }
        Ok(())
    }

    async fn retrieve(&self, address: &ArtifactAddress) -> StoreResult<Option<String>> {
        let request = ArtifactRequest {
            address,
            payload: None,
        };
        let response = self.post("/retrieve", &request).await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(StoreError::Status(response.status().as_u16()));
        }
        response
            .text()
            .await
            .map(Some)
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}
