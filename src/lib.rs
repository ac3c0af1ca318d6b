//! Intercept Callback Service Library
//!
//! Decision core behind an intercepting proxy: per intercepted request and
//! response it decides the modifications the interceptor applies, and caches
//! expensive content transformations.

pub mod admin;
pub mod cache;
pub mod collaborators;
pub mod commands;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod processing;
pub mod service;
pub mod stats;
pub mod transform;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use http::HttpServer;
pub use service::CallbackService;
