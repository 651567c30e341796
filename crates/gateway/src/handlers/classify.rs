//! Classification handler

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::validation::validate_message;
use crate::AppState;
use profanity_classifier::ClassificationResult;
use profanity_common::errors::{AppError, Result};

/// Classification request
#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub message: Option<String>,
}

/// Classify a message as profane or clean
pub async fn classify(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ClassifyRequest>, JsonRejection>,
) -> Result<Json<ClassificationResult>> {
    let Json(request) = payload.map_err(map_rejection)?;
    let message = validate_message(request.message.as_deref(), &state.config.validation)?;

    let timeout = state.config.request_timeout();
    let result = tokio::time::timeout(timeout, state.classifier.classify(message))
        .await
        .map_err(|_| AppError::Timeout {
            timeout_ms: timeout.as_millis() as u64,
        })??;

    Ok(Json(result))
}

fn map_rejection(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => AppError::UnsupportedMediaType,
        other if other.status() == StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge {
            message: other.body_text(),
        },
        other => AppError::InvalidFormat {
            message: other.body_text(),
        },
    }
}
