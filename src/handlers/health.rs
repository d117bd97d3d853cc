//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
    model_source: Option<&'static str>,
    api_version: &'static str,
    timestamp: String,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_loaded = state.service.is_loaded();

    Json(HealthResponse {
        status: if model_loaded { "healthy" } else { "unhealthy" },
        model_loaded,
        model_source: state.service.source().map(|s| s.as_str()),
        api_version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
