//! The callback service: everything the interceptor talks to.
//!
//! # Responsibilities
//! - Build the store, collaborators, cache and orchestrator from configuration
//! - Expose request/response processing and finalization
//! - Convert any response-side failure into the fixed 500 result
//! - Stats snapshot and reset

use std::sync::Arc;

use crate::cache::{CacheManager, ContentStore, HttpContentStore, MemoryContentStore};
use crate::collaborators::Collaborators;
use crate::commands::CommandResolver;
use crate::config::{ServiceConfig, StoreBackend};
use crate::error::ServiceError;
use crate::processing::{
    Modifications, ProcessingResult, RequestFields, RequestProcessor, ResponseFields,
    ResponseFinalizer, ResponseProcessor,
};
use crate::stats::{StatsAggregator, StatsSnapshot};
use crate::transform::TransformOrchestrator;

pub struct CallbackService {
    stats: Arc<StatsAggregator>,
    requests: RequestProcessor,
    responses: ResponseProcessor,
    finalizer: ResponseFinalizer,
}

impl CallbackService {
    /// Build the service with the configured store backend and HTTP collaborators.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let store: Arc<dyn ContentStore> = match config.store.backend {
            StoreBackend::Http => Arc::new(HttpContentStore::new(&config.store)?),
            StoreBackend::Memory => Arc::new(MemoryContentStore::new()),
        };
        let collaborators = Collaborators::http(&config.collaborators)?;
        tracing::info!(
            store = ?config.store.backend,
            extraction = %config.collaborators.extraction_url,
            transformation = %config.collaborators.transformation_url,
            reconstruction = %config.collaborators.reconstruction_url,
            "Callback service configured"
        );
        Ok(Self::with_parts(config, store, collaborators))
    }

    /// Build the service around an explicit store and collaborators.
    pub fn with_parts(
        config: &ServiceConfig,
        store: Arc<dyn ContentStore>,
        collaborators: Collaborators,
    ) -> Self {
        let stats = Arc::new(StatsAggregator::new());
        let cache = Arc::new(CacheManager::new(
            store,
            config.store.namespace.clone(),
            stats.clone(),
        ));
        let orchestrator = Arc::new(TransformOrchestrator::new(
            cache,
            collaborators,
            stats.clone(),
            config.transform.dedupe_inflight,
        ));

        Self {
            requests: RequestProcessor::new(config.requests.clone(), config.headers.clone()),
            responses: ResponseProcessor::new(
                orchestrator,
                stats.clone(),
                CommandResolver::new(config.commands.cookie_prefix.clone()),
                config.transform.mode_cookie.clone(),
                config.headers.clone(),
                config.cors.clone(),
            ),
            finalizer: ResponseFinalizer::new(config.cors.clone()),
            stats,
        }
    }

    pub fn process_request(&self, fields: &RequestFields) -> Modifications {
        self.requests.process(fields, &self.stats)
    }

    pub async fn process_response(
        &self,
        fields: &ResponseFields,
    ) -> Result<Modifications, ServiceError> {
        self.responses.process(fields).await
    }

    pub fn finalize(
        &self,
        fields: &ResponseFields,
        mods: &Modifications,
    ) -> Result<ProcessingResult, ServiceError> {
        self.finalizer.finalize(fields, mods)
    }

    /// Process and finalize one response. Never fails.
    pub async fn handle_response(&self, fields: &ResponseFields) -> ProcessingResult {
        match self.process_response(fields).await {
            Ok(mods) => self.finalizer.finalize_or_error(fields, &mods),
            Err(e) => {
                tracing::error!(url = %fields.request.url(), error = %e, "Response processing failed");
                ProcessingResult::error(e.to_string())
            }
        }
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn reset_stats(&self) -> StatsSnapshot {
        self.stats.reset()
    }
}
