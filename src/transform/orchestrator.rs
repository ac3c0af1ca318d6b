//! Cache-around transformation pipeline.
//!
//! # Data Flow
//! ```text
//! transform(source, url, mode)
//!     → Off?            passthrough
//!     → cache lookup    hit → cached artifact
//!     → single-flight   wait for a concurrent miss on the same key, re-check
//!     → extract → transform (remote or local) → reconstruct
//!     → persist result + original
//! ```
//!
//! # Design Decisions
//! - Stage failures become `TransformOutcome::Failed` and are never cached
//! - Only a page-entry failure escapes as `CacheError`
//! - A store error during lookup counts as a miss

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::cache::{url_to_cache_key, CacheError, CacheManager};
use crate::collaborators::{
    CollaboratorError, Collaborators, FragmentMap, ReconstructRequest, TransformRequest,
};
use crate::observability::metrics;
use crate::stats::StatsAggregator;
use crate::transform::local;
use crate::transform::mode::TransformationMode;
use crate::transform::types::{PipelineStage, TransformationResult};

struct StageFailure {
    stage: PipelineStage,
    error: CollaboratorError,
}

impl StageFailure {
    fn at(stage: PipelineStage) -> impl FnOnce(CollaboratorError) -> Self {
        move |error| Self { stage, error }
    }
}

/// Runs transformations for the active mode, reusing cached artifacts.
pub struct TransformOrchestrator {
    cache: Arc<CacheManager>,
    collaborators: Collaborators,
    stats: Arc<StatsAggregator>,
    dedupe_inflight: bool,
    inflight: DashMap<String, Arc<Mutex<()>>>,
}

impl TransformOrchestrator {
    pub fn new(
        cache: Arc<CacheManager>,
        collaborators: Collaborators,
        stats: Arc<StatsAggregator>,
        dedupe_inflight: bool,
    ) -> Self {
        Self {
            cache,
            collaborators,
            stats,
            dedupe_inflight,
            inflight: DashMap::new(),
        }
    }

    pub fn cache(&self) -> &Arc<CacheManager> {
        &self.cache
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    /// Transform `source` fetched from `url` according to `mode`.
    pub async fn transform(
        &self,
        source: &str,
        url: &str,
        mode: TransformationMode,
    ) -> Result<TransformationResult, CacheError> {
        if !mode.is_active() {
            return Ok(TransformationResult::passthrough(source, mode));
        }

        let started = Instant::now();
        if let Some(hit) = self.lookup(url, mode, started).await? {
            return Ok(hit);
        }

        if !self.dedupe_inflight {
            return Ok(self.run_and_persist(source, url, mode, started).await);
        }

        let flight_key = format!("{}#{}", url_to_cache_key(url)?, mode);
        let lock = self
            .inflight
            .entry(flight_key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let result = {
            let _guard = lock.lock().await;
            // A concurrent miss may have filled the cache while we waited.
            match self.lookup(url, mode, started).await? {
                Some(hit) => hit,
                None => self.run_and_persist(source, url, mode, started).await,
            }
        };

        drop(lock);
        self.inflight
            .remove_if(&flight_key, |_, lock| Arc::strong_count(lock) == 1);
        Ok(result)
    }

    async fn lookup(
        &self,
        url: &str,
        mode: TransformationMode,
        started: Instant,
    ) -> Result<Option<TransformationResult>, CacheError> {
        let cached = match self
            .cache
            .get_cached_transformation(url, mode.command_name())
            .await
        {
            Ok(cached) => cached,
            Err(CacheError::Store(e)) => {
                tracing::warn!(url = %url, mode = %mode, error = %e, "Cache lookup failed, treating as miss");
                None
            }
            Err(e) => return Err(e),
        };

        Ok(cached.map(|content| {
            let elapsed = started.elapsed();
            self.stats.record_cache_hit(elapsed);
            tracing::debug!(url = %url, mode = %mode, "Transformation cache hit");
            TransformationResult::cache_hit(content, mode)
        }))
    }

    async fn run_and_persist(
        &self,
        source: &str,
        url: &str,
        mode: TransformationMode,
        started: Instant,
    ) -> TransformationResult {
        let outcome = self.run_pipeline(source, mode).await;
        let elapsed = started.elapsed();
        self.stats.record_cache_miss(elapsed);

        match outcome {
            Ok(content) => {
                self.persist(url, mode, source, &content).await;
                tracing::info!(
                    url = %url,
                    mode = %mode,
                    elapsed_ms = elapsed_ms(elapsed),
                    "Transformation complete"
                );
                TransformationResult::transformed(content, mode, elapsed_ms(elapsed))
            }
            Err(failure) => {
                metrics::record_pipeline_failure(failure.stage.as_str());
                tracing::warn!(
                    url = %url,
                    mode = %mode,
                    stage = %failure.stage,
                    error = %failure.error,
                    elapsed_ms = elapsed_ms(elapsed),
                    "Transformation failed, returning source content"
                );
                TransformationResult::failed(
                    source,
                    mode,
                    failure.stage,
                    failure.error.to_string(),
                    elapsed_ms(elapsed),
                )
            }
        }
    }

    async fn run_pipeline(
        &self,
        source: &str,
        mode: TransformationMode,
    ) -> Result<String, StageFailure> {
        let extraction = self
            .collaborators
            .extractor
            .extract(source)
            .await
            .map_err(StageFailure::at(PipelineStage::Extract))?;

        let fragments = self
            .transform_fragments(mode, extraction.fragments)
            .await
            .map_err(StageFailure::at(PipelineStage::Transform))?;

        self.collaborators
            .reconstructor
            .reconstruct(ReconstructRequest {
                structure: extraction.structure,
                fragments,
            })
            .await
            .map_err(StageFailure::at(PipelineStage::Reconstruct))
    }

    async fn transform_fragments(
        &self,
        mode: TransformationMode,
        fragments: FragmentMap,
    ) -> Result<FragmentMap, CollaboratorError> {
        if let Some(local) = local::transform_fragments(mode, &fragments) {
            return Ok(local);
        }

        let request = TransformRequest {
            fragments,
            engine: mode.engine_mode(),
            criteria: mode.criterion_filters(),
            logic: mode.filter_logic(),
            visual: mode.visual_mode(),
        };
        let response = self.collaborators.transformer.transform(mode, request).await?;
        if !response.success {
            return Err(CollaboratorError::Rejected {
                service: "transformation",
                reason: response
                    .error_message
                    .unwrap_or_else(|| "unsuccessful response".to_string()),
            });
        }
        Ok(response.fragments)
    }

    async fn persist(&self, url: &str, mode: TransformationMode, source: &str, content: &str) {
        if let Err(e) = self
            .cache
            .store_transformation(url, mode.command_name(), content)
            .await
        {
            tracing::warn!(url = %url, mode = %mode, error = %e, "Failed to cache transformation");
        }
        if let Err(e) = self.cache.store_original(url, source).await {
            tracing::warn!(url = %url, error = %e, "Failed to cache original content");
        }
    }
}

fn elapsed_ms(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}
