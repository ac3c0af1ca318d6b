use axum::{extract::State, Json};

use crate::http::server::AppState;
use crate::stats::StatsSnapshot;

pub async fn get_stats(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.service.stats())
}

/// Zero the counters; responds with the values held before the reset.
pub async fn reset_stats(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.service.reset_stats())
}
