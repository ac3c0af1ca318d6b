//! HTTP callback surface.
//!
//! # Data Flow
//! ```text
//! interceptor
//!     → server.rs (Axum setup, request ID, timeout, body limit)
//!     → handlers.rs (/v1/request, /v1/response, /health)
//!     → admin (/v1/stats, /v1/stats/reset)
//!     → CallbackService
//! ```

pub mod handlers;
pub mod server;

pub use server::{AppState, HttpServer};
