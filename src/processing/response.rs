//! Response-side decisions.
//!
//! # Data Flow
//! ```text
//! ResponseFields
//!     → CommandResolver (query params + prefixed cookies)
//!     → show?            override and stop
//!     → standard + CORS headers
//!     → mode cookie      → TransformOrchestrator (HTML only)
//!     → replace → debug banner → inject panel
//!     → removals
//! ```

use std::sync::Arc;

use crate::cache::{url_to_cache_key, CacheManager};
use crate::collaborators::Collaborators;
use crate::commands::{
    cookie_value, CommandKind, CommandResolver, DebugCommand, InjectPanel, Replacement,
    ShowTarget,
};
use crate::config::{CorsConfig, HeaderRulesConfig};
use crate::error::ServiceError;
use crate::processing::headers::cors_headers;
use crate::processing::html;
use crate::processing::types::{Modifications, ResponseFields};
use crate::stats::StatsAggregator;
use crate::transform::{TransformOrchestrator, TransformOutcome, TransformationMode};

pub const SHOW_HEADER: &str = "x-debug-show";
pub const SHOW_SKIPPED_HEADER: &str = "x-debug-show-skipped";

pub struct ResponseProcessor {
    orchestrator: Arc<TransformOrchestrator>,
    stats: Arc<StatsAggregator>,
    resolver: CommandResolver,
    mode_cookie: String,
    header_rules: HeaderRulesConfig,
    cors: CorsConfig,
}

impl ResponseProcessor {
    pub fn new(
        orchestrator: Arc<TransformOrchestrator>,
        stats: Arc<StatsAggregator>,
        resolver: CommandResolver,
        mode_cookie: impl Into<String>,
        header_rules: HeaderRulesConfig,
        cors: CorsConfig,
    ) -> Self {
        Self {
            orchestrator,
            stats,
            resolver,
            mode_cookie: mode_cookie.into(),
            header_rules,
            cors,
        }
    }

    fn cache(&self) -> &CacheManager {
        self.orchestrator.cache()
    }

    fn collaborators(&self) -> &Collaborators {
        self.orchestrator.collaborators()
    }

    /// Transformation mode selected by the request cookies.
    pub fn mode_for(&self, response: &ResponseFields) -> TransformationMode {
        TransformationMode::parse(
            cookie_value(response.request.cookie_header(), &self.mode_cookie).as_deref(),
        )
    }

    pub async fn process(&self, response: &ResponseFields) -> Result<Modifications, ServiceError> {
        self.stats.record_response(response.body().len());

        let url = response.request.url();
        let commands = self
            .resolver
            .resolve(&response.request.debug_params, response.request.cookie_header());
        let mut mods = Modifications::default();

        for command in &commands {
            if let CommandKind::Show(target) = &command.kind {
                if let Some(overridden) = self.show(target, command, response, &url, &mut mods).await? {
                    return Ok(overridden);
                }
            }
        }

        for (name, value) in &self.header_rules.standard {
            mods.add_header(name, value.clone());
        }
        if self.cors.enabled {
            for (name, value) in cors_headers(&self.cors) {
                mods.add_header(name, value);
            }
        }

        let mode = self.mode_for(response);
        let mut outcome_note = "untransformed".to_string();
        if mode.is_active() && response.is_html() && !response.body().is_empty() {
            let result = self.orchestrator.transform(response.body(), &url, mode).await?;
            mods.add_header("x-transform-mode", mode.as_str());
            match &result.outcome {
                TransformOutcome::Failed { stage, .. } => {
                    mods.add_header("x-transform-error", stage.as_str());
                    outcome_note = format!("failed at {stage}");
                }
                _ => {
                    let cache = if result.cache_hit { "hit" } else { "miss" };
                    mods.add_header("x-transform-cache", cache);
                    mods.add_header("x-transform-time-ms", format!("{:.1}", result.elapsed_ms));
                    if result.content_type != "text/html" {
                        mods.add_header("content-type", result.content_type.clone());
                    }
                    mods.cached_response = result.cache_hit;
                    outcome_note = format!("cache {cache}");
                }
            }
            if result.is_transformed() {
                mods.modified_body = Some(result.content);
            }
        }

        let mut edits: Vec<&DebugCommand> = commands.iter().collect();
        edits.sort_by_key(|command| body_edit_rank(&command.kind));
        for command in edits {
            match &command.kind {
                CommandKind::Replace(Some(replacement)) if response.is_textual() => {
                    self.apply_replace(replacement, response, &mut mods);
                }
                CommandKind::DebugMode(true) if response.is_html() => {
                    self.apply_debug(response, &url, mode, &outcome_note, &mut mods);
                }
                CommandKind::Inject(Some(panel)) if response.is_html() => {
                    self.apply_inject(*panel, response, &url, mode, &mut mods);
                }
                _ => {}
            }
        }

        for name in &self.header_rules.remove {
            mods.remove_header(name);
        }

        if mods.modified_body.is_some() {
            self.stats.record_content_modification();
        }
        Ok(mods)
    }

    /// Returns the override modifications when `target` resolves.
    async fn show(
        &self,
        target: &ShowTarget,
        command: &DebugCommand,
        response: &ResponseFields,
        url: &str,
        pending: &mut Modifications,
    ) -> Result<Option<Modifications>, ServiceError> {
        if *target == ShowTarget::Unknown {
            tracing::debug!(value = %command.value, "Unknown show target");
            pending.add_header(SHOW_SKIPPED_HEADER, "unknown target");
            return Ok(None);
        }
        if target.is_remote() && !response.is_html() {
            pending.add_header(SHOW_SKIPPED_HEADER, "non-html content");
            return Ok(None);
        }

        let mut mods = Modifications::default();
        mods.add_header(SHOW_HEADER, command.value.trim().to_ascii_lowercase());

        match target {
            ShowTarget::Stats => {
                let snapshot = self.stats.snapshot();
                let body = serde_json::to_string_pretty(&snapshot)?;
                mods.include_stats = true;
                mods.stats = Some(snapshot);
                mods.override_with(200, "application/json", body);
            }
            ShowTarget::Cache => {
                let body = serde_json::json!({
                    "url": url,
                    "cache_key": url_to_cache_key(url)?,
                    "entry": self.cache().cached_page_entry(url),
                });
                mods.override_with(200, "application/json", serde_json::to_string_pretty(&body)?);
            }
            ShowTarget::Original => match self.cache().get_original(url).await? {
                Some(original) => mods.override_with(200, "text/html", original),
                None => mods.override_with(404, "text/plain", "original not cached".to_string()),
            },
            ShowTarget::Structure | ShowTarget::Fragments => {
                match self.collaborators().extractor.extract(response.body()).await {
                    Ok(extraction) => {
                        let body = if *target == ShowTarget::Structure {
                            serde_json::to_string_pretty(&extraction.structure)?
                        } else {
                            serde_json::to_string_pretty(&extraction.fragments)?
                        };
                        mods.override_with(200, "application/json", body);
                    }
                    Err(e) => {
                        tracing::warn!(url = %url, error = %e, "Extraction for show failed");
                        mods.override_with(502, "text/plain", e.to_string());
                    }
                }
            }
            ShowTarget::Preview(mode) => {
                let result = self.orchestrator.transform(response.body(), url, *mode).await?;
                mods.add_header("x-transform-mode", mode.as_str());
                mods.add_header("x-transform-cache", if result.cache_hit { "hit" } else { "miss" });
                mods.override_with(200, &result.content_type, result.content);
            }
            ShowTarget::Unknown => return Ok(None),
        }

        tracing::debug!(url = %url, target = %command.value, "Response overridden by show");
        Ok(Some(mods))
    }

    fn current_body(response: &ResponseFields, mods: &Modifications) -> String {
        mods.modified_body
            .clone()
            .unwrap_or_else(|| response.body().to_string())
    }

    fn apply_replace(&self, replacement: &Replacement, response: &ResponseFields, mods: &mut Modifications) {
        let body = Self::current_body(response, mods);
        let replaced = replacement.apply(&body);
        if replaced != body {
            mods.modified_body = Some(replaced);
            mods.add_header("x-debug-replace", "applied");
        }
    }

    fn apply_debug(
        &self,
        response: &ResponseFields,
        url: &str,
        mode: TransformationMode,
        outcome: &str,
        mods: &mut Modifications,
    ) {
        let cache_key = url_to_cache_key(url).unwrap_or_default();
        let body = Self::current_body(response, mods);
        mods.modified_body = Some(html::insert_after_body_open(
            &body,
            &html::debug_banner(mode.as_str(), &cache_key, outcome),
        ));
        mods.debug_mode = true;
        mods.add_header("x-debug-mode", "on");
        mods.add_header("x-debug-transform-mode", mode.as_str());
        mods.add_header("x-debug-cache-key", cache_key);
    }

    fn apply_inject(
        &self,
        panel: InjectPanel,
        response: &ResponseFields,
        url: &str,
        mode: TransformationMode,
        mods: &mut Modifications,
    ) {
        let snippet = match panel {
            InjectPanel::Stats => {
                let snapshot = self.stats.snapshot();
                let snippet = html::stats_panel(&snapshot);
                mods.include_stats = true;
                mods.stats = Some(snapshot);
                snippet
            }
            InjectPanel::Info => html::info_panel(
                url,
                &url_to_cache_key(url).unwrap_or_default(),
                mode.as_str(),
                response.content_type().unwrap_or_default(),
            ),
        };
        let body = Self::current_body(response, mods);
        mods.modified_body = Some(html::insert_before_body_close(&body, &snippet));
    }
}

/// Body edits run replace, then banner, then panel, so a replacement never
/// rewrites injected markup.
fn body_edit_rank(kind: &CommandKind) -> u8 {
    match kind {
        CommandKind::Replace(_) => 0,
        CommandKind::DebugMode(_) => 1,
        CommandKind::Inject(_) => 2,
        CommandKind::Show(_) => 3,
    }
}
