//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate collaborator URLs parse
//! - Validate value ranges (timeouts > 0 and covering the collaborator chain, status codes valid)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::{ServiceConfig, StoreBackend};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a loaded configuration for semantic errors.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::new("listener.max_body_bytes", "must be greater than 0"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    } else if config.timeouts.request_secs < longest_chain_secs(config) {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            format!(
                "{}s does not cover the longest collaborator chain ({}s)",
                config.timeouts.request_secs,
                longest_chain_secs(config)
            ),
        ));
    }

    let collaborators = &config.collaborators;
    for (field, value) in [
        ("collaborators.extraction_url", &collaborators.extraction_url),
        ("collaborators.transformation_url", &collaborators.transformation_url),
        ("collaborators.reconstruction_url", &collaborators.reconstruction_url),
    ] {
        check_url(&mut errors, field, value);
    }
    if collaborators.timeout_secs == 0 {
        errors.push(ValidationError::new("collaborators.timeout_secs", "must be greater than 0"));
    }

    if config.store.backend == StoreBackend::Http {
        check_url(&mut errors, "store.url", &config.store.url);
        if config.store.timeout_secs == 0 {
            errors.push(ValidationError::new("store.timeout_secs", "must be greater than 0"));
        }
    }
    if config.store.namespace.trim().is_empty() {
        errors.push(ValidationError::new("store.namespace", "must not be empty"));
    }

    if config.transform.mode_cookie.trim().is_empty() {
        errors.push(ValidationError::new("transform.mode_cookie", "must not be empty"));
    }
    if config.commands.cookie_prefix.is_empty() {
        errors.push(ValidationError::new("commands.cookie_prefix", "must not be empty"));
    }

    if !(100..=599).contains(&config.requests.block_status) {
        errors.push(ValidationError::new(
            "requests.block_status",
            format!("{} is not an HTTP status code", config.requests.block_status),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if matches!(&config.admin.api_key, Some(key) if key.trim().is_empty()) {
        errors.push(ValidationError::new("admin.api_key", "must not be blank when set"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Worst case for one response callback: three pipeline stages plus page
/// entry, lookup and two persists against the store.
pub fn longest_chain_secs(config: &ServiceConfig) -> u64 {
    let store = match config.store.backend {
        StoreBackend::Http => config.store.timeout_secs,
        StoreBackend::Memory => 0,
    };
    3 * config.collaborators.timeout_secs + 4 * store
}

fn check_url(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if let Err(e) = url::Url::parse(value) {
        errors.push(ValidationError::new(field, format!("invalid URL '{}': {}", value, e)));
    }
}
