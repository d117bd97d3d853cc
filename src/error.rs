//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::service::PredictError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Validation errors
    MissingField(String),
    InvalidInput(String),

    // Model errors
    ModelUnavailable,
    PredictionFailed(String),

    // Routing
    NotFound(String),

    // Generic errors
    InternalError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingField(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ModelUnavailable
            | AppError::PredictionFailed(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            AppError::MissingField(field) => format!("Missing field: {}", field),
            AppError::InvalidInput(msg) => format!("Invalid input data: {}", msg),
            AppError::ModelUnavailable => "Model not loaded".to_string(),
            AppError::PredictionFailed(msg) => format!("Prediction failed: {}", msg),
            AppError::NotFound(msg) => msg.clone(),
            AppError::InternalError(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AppError::ModelUnavailable => tracing::error!("Error: Model not loaded"),
            AppError::PredictionFailed(msg) => tracing::error!("Prediction failed: {}", msg),
            AppError::InternalError(msg) => tracing::error!("Internal error: {}", msg),
            AppError::MissingField(_) | AppError::InvalidInput(_) => {
                tracing::debug!("Rejected request: {}", self.message())
            }
            AppError::NotFound(_) => {}
        }

        let body = Json(json!({
            "error": self.message(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        match err {
            PredictError::ModelUnavailable => AppError::ModelUnavailable,
            PredictError::MissingField(field) => AppError::MissingField(field),
            PredictError::InvalidInput(msg) => AppError::InvalidInput(msg),
            PredictError::Prediction(msg) => AppError::PredictionFailed(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::MissingField("seats".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidInput("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::ModelUnavailable.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError::PredictionFailed("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_messages() {
        assert_eq!(AppError::MissingField("seats".into()).message(), "Missing field: seats");
        assert_eq!(AppError::ModelUnavailable.message(), "Model not loaded");
        assert_eq!(
            AppError::from(PredictError::Prediction("boom".into())).message(),
            "Prediction failed: boom"
        );
    }
}
