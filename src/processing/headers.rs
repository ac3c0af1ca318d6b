//! Header sources and final header assembly.
//!
//! # Design Decisions
//! - All emitted names are lower-case; collisions are resolved case-insensitively
//! - Assembly order: upstream → content headers → queued additions → removals

use axum::http::HeaderName;
use std::collections::{BTreeMap, HashMap};

use crate::config::CorsConfig;
use crate::error::ServiceError;

/// CORS response headers for `config`.
pub fn cors_headers(config: &CorsConfig) -> Vec<(String, String)> {
    let mut headers = vec![
        (
            "access-control-allow-origin".to_string(),
            config.allow_origin.clone(),
        ),
        (
            "access-control-allow-methods".to_string(),
            config.allow_methods.join(", "),
        ),
        (
            "access-control-allow-headers".to_string(),
            config.allow_headers.join(", "),
        ),
        (
            "access-control-max-age".to_string(),
            config.max_age_secs.to_string(),
        ),
    ];
    if config.allow_credentials {
        headers.push((
            "access-control-allow-credentials".to_string(),
            "true".to_string(),
        ));
    }
    headers
}

fn header_name(name: &str) -> Result<String, ServiceError> {
    HeaderName::from_bytes(name.as_bytes())
        .map(|h| h.as_str().to_string())
        .map_err(|_| ServiceError::InvalidHeader(name.to_string()))
}

/// Build the final header map for a response body.
///
/// `content-length` is always recomputed from `body`.
pub fn assemble_headers(
    upstream: &HashMap<String, String>,
    content_type: &str,
    body: &str,
    additions: &BTreeMap<String, String>,
    removals: &[String],
) -> Result<BTreeMap<String, String>, ServiceError> {
    let mut headers: BTreeMap<String, String> = upstream
        .iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
        .collect();

    headers.insert("content-type".to_string(), content_type.to_string());
    headers.insert("content-length".to_string(), body.len().to_string());

    for (name, value) in additions {
        headers.insert(header_name(name)?, value.clone());
    }

    for name in removals {
        headers.remove(&name.to_ascii_lowercase());
    }
    Ok(headers)
}
