use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::recommendation::PredictionError;
use crate::session::pipeline::PipelineError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Prediction unavailable: {0}")]
    PredictionUnavailable(String),

    #[error("Prediction error: {0}")]
    Prediction(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PredictionError> for AppError {
    fn from(e: PredictionError) -> Self {
        match e {
            PredictionError::EmptyInput => AppError::Validation(e.to_string()),
            other => AppError::Prediction(other.to_string()),
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::EmptySession => AppError::PredictionUnavailable(e.to_string()),
            PipelineError::Prediction(inner) => inner.into(),
            other => AppError::Prediction(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::PredictionUnavailable(msg) => (
                StatusCode::CONFLICT,
                "PREDICTION_UNAVAILABLE",
                msg.clone(),
            ),
            AppError::Prediction(msg) => {
                tracing::error!("Prediction error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PREDICTION_ERROR",
                    "The role model could not score this input".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
