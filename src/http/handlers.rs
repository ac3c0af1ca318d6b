//! Interceptor callback handlers.

use axum::{extract::State, Json};

use crate::http::server::AppState;
use crate::processing::{Modifications, ProcessingResult, RequestFields, ResponseFields};

pub async fn health() -> &'static str {
    "ok"
}

pub async fn process_request(
    State(state): State<AppState>,
    Json(fields): Json<RequestFields>,
) -> Json<Modifications> {
    tracing::debug!(host = %fields.host, path = %fields.path, method = %fields.method, "Request callback");
    Json(state.service.process_request(&fields))
}

/// Always answers 200; processing failures are reported inside the result.
///
/// Processing runs on its own task so a missed deadline or a dropped
/// connection never interrupts a pipeline stage.
pub async fn process_response(
    State(state): State<AppState>,
    Json(fields): Json<ResponseFields>,
) -> Json<ProcessingResult> {
    let url = fields.request.url();
    tracing::debug!(
        url = %url,
        status = ?fields.status_code,
        content_type = ?fields.content_type(),
        "Response callback"
    );

    let service = state.service.clone();
    let task = tokio::spawn(async move { service.handle_response(&fields).await });

    let result = match tokio::time::timeout(state.response_deadline, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            tracing::error!(url = %url, error = %e, "Response processing task aborted");
            ProcessingResult::error(format!("response processing aborted: {e}"))
        }
        Err(_) => {
            tracing::warn!(
                url = %url,
                deadline_secs = state.response_deadline.as_secs(),
                "Response callback deadline passed, processing continues in background"
            );
            ProcessingResult::error(format!(
                "response processing exceeded {}s",
                state.response_deadline.as_secs()
            ))
        }
    };
    Json(result)
}
