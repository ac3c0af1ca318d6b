//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with callback and stats handlers
//! - Wire up middleware (timeout, body limit, request ID, tracing)
//! - Bind server to listener and shut down gracefully

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::config::ServiceConfig;
use crate::http::handlers::{health, process_request, process_response};
use crate::lifecycle::shutdown_signal;
use crate::service::CallbackService;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CallbackService>,
    pub admin_key: Option<Arc<str>>,
    /// Deadline for answering a response callback. The pipeline itself is never cut short.
    pub response_deadline: Duration,
}

/// HTTP server for the callback service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &ServiceConfig, service: Arc<CallbackService>) -> Self {
        let state = AppState {
            service,
            admin_key: config.admin.api_key.as_deref().map(Arc::from),
            response_deadline: Duration::from_secs(config.timeouts.request_secs),
        };
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// `/v1/response` sits outside the timeout layer; its handler enforces
    /// `response_deadline` itself and always answers with a `ProcessingResult`.
    #[allow(deprecated)]
    pub fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        let timed = Router::new()
            .route("/health", get(health))
            .route("/v1/request", post(process_request))
            .with_state(state.clone())
            .merge(setup_admin_router(state.clone()))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        Router::new()
            .route("/v1/response", post(process_response))
            .with_state(state)
            .merge(timed)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes)),
            )
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
