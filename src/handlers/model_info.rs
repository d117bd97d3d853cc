//! Model information handler

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::service::ModelInfo;
use crate::AppState;

pub async fn info(State(state): State<AppState>) -> AppResult<Json<ModelInfo>> {
    Ok(Json(state.service.model_info()?))
}
