//! Service status handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct StatusResponse {
    message: &'static str,
    status: &'static str,
    model_loaded: bool,
    version: &'static str,
    timestamp: String,
}

pub async fn index(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "Vehicle Type Classification API",
        status: "active",
        model_loaded: state.service.is_loaded(),
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
