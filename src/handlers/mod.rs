//! HTTP handlers

pub mod status;
pub mod health;
pub mod predict;
pub mod model_info;


use axum::http::Uri;

use crate::error::AppError;

/// Unknown routes get the same JSON error body as every other failure
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}
