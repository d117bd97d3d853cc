//! Prediction handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::service::{PredictError, PredictionResult};
use crate::AppState;

/// POST /predict
///
/// The body is taken as raw JSON so that field-level validation (and its
/// error messages) stays with the prediction service.
pub async fn predict(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<PredictionResult>> {
    if !state.service.is_loaded() {
        return Err(PredictError::ModelUnavailable.into());
    }

    let Json(payload) = body.map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;
    tracing::debug!("Received prediction request: {}", payload);

    let result = state.service.predict_value(payload)?;

    tracing::info!(
        "Predicted {} (confidence {:?})",
        result.prediction,
        result.confidence
    );

    Ok(Json(result))
}
