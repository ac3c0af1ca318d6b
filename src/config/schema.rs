//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the callback
//! service. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root configuration for the callback service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout for a whole callback request.
    pub timeouts: TimeoutConfig,

    /// Remote extraction / transformation / reconstruction services.
    pub collaborators: CollaboratorConfig,

    /// Content-addressable cache store.
    pub store: StoreConfig,

    /// Transformation behaviour.
    pub transform: TransformConfig,

    /// Debug command sourcing.
    pub commands: CommandConfig,

    /// CORS headers applied to every processed response.
    pub cors: CorsConfig,

    /// Static header rules.
    pub headers: HeaderRulesConfig,

    /// Request blocking rules.
    pub requests: RequestRulesConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8090").
    pub bind_address: String,

    /// Largest accepted callback body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8090".to_string(),
            max_body_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Timeout configuration for the callback surface.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time allowed for one callback in seconds. Must cover the longest
    /// collaborator chain of a response callback.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 300 }
    }
}

/// Remote pipeline collaborators.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CollaboratorConfig {
    /// Structural extraction endpoint.
    pub extraction_url: String,

    /// Base URL of the text transformation service; the mode path is appended.
    pub transformation_url: String,

    /// Reconstruction endpoint.
    pub reconstruction_url: String,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for CollaboratorConfig {
    fn default() -> Self {
        Self {
            extraction_url: "http://127.0.0.1:8101/extract".to_string(),
            transformation_url: "http://127.0.0.1:8102".to_string(),
            reconstruction_url: "http://127.0.0.1:8101/reconstruct".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Which content store implementation backs the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Remote content-addressable store over HTTP.
    Http,
    /// In-process map; contents are lost on restart.
    Memory,
}

/// Content store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    /// Base URL of the store (http backend only).
    pub url: String,

    /// Namespace all artifacts are written under.
    pub namespace: String,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Http,
            url: "http://127.0.0.1:8103".to_string(),
            namespace: "intercept".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Transformation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Cookie holding the transformation mode tag.
    pub mode_cookie: String,

    /// Collapse concurrent cache misses for the same page and mode into one pipeline run.
    pub dedupe_inflight: bool,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            mode_cookie: "__transform_mode".to_string(),
            dedupe_inflight: true,
        }
    }
}

/// Debug command configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Cookies starting with this prefix carry debug parameters.
    pub cookie_prefix: String,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            cookie_prefix: "__dbg_".to_string(),
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    pub enabled: bool,

    /// Allowed origin; "*" reflects the request Origin when credentials are allowed.
    pub allow_origin: String,

    pub allow_methods: Vec<String>,

    pub allow_headers: Vec<String>,

    pub allow_credentials: bool,

    /// Preflight cache lifetime in seconds.
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            allow_origin: "*".to_string(),
            allow_methods: ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
            allow_headers: vec!["*".to_string()],
            allow_credentials: false,
            max_age_secs: 86_400,
        }
    }
}

/// Static header rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HeaderRulesConfig {
    /// Headers added to every processed response.
    pub standard: BTreeMap<String, String>,

    /// Headers added to every forwarded request.
    pub request: BTreeMap<String, String>,

    /// Headers stripped from every processed response.
    pub remove: Vec<String>,
}

impl Default for HeaderRulesConfig {
    fn default() -> Self {
        let mut standard = BTreeMap::new();
        standard.insert("x-intercepted-by".to_string(), "intercept-callback".to_string());
        Self {
            standard,
            request: BTreeMap::new(),
            remove: vec!["x-powered-by".to_string()],
        }
    }
}

/// Request blocking rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RequestRulesConfig {
    /// Hosts (and their subdomains) whose requests are blocked.
    pub blocked_hosts: Vec<String>,

    pub block_status: u16,

    pub block_message: String,
}

impl Default for RequestRulesConfig {
    fn default() -> Self {
        Self {
            blocked_hosts: Vec::new(),
            block_status: 403,
            block_message: "Blocked by intercept policy".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Stats endpoint protection.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AdminConfig {
    /// Bearer token required by the stats endpoints. Unset leaves them open.
    pub api_key: Option<String>,
}
