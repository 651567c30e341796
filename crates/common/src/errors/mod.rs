//! Error types for Profanity Sieve services
//!
//! Provides a single error enum with:
//! - Distinct variants for validation, index, and internal failures
//! - HTTP status code mapping
//! - Machine-readable error codes
//! - A flat `{ "error": ..., "code": ... }` response body

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    MissingField,
    MessageTooShort,
    MessageTooLong,
    InvalidFormat,
    UnsupportedMediaType,
    PayloadTooLarge,

    // Rate limiting
    RateLimited,

    // External service errors
    IndexError,
    EmptyIndex,
    EmbeddingError,
    Timeout,

    // Internal errors
    NoScores,
    InternalError,
    ConfigurationError,
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Required field missing: {field}")]
    MissingField { field: String },

    #[error("Message too short: {words} words, at least {min} required")]
    MessageTooShort { words: usize, min: usize },

    #[error("Message too long: {message}")]
    MessageTooLong { message: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Unsupported media type: expected application/json")]
    UnsupportedMediaType,

    #[error("Payload too large: {message}")]
    PayloadTooLarge { message: String },

    // Rate limiting
    #[error("Rate limit exceeded: {limit} requests per second")]
    RateLimited { limit: u32 },

    // Similarity index errors
    #[error("Similarity index error: {message}")]
    IndexError { message: String },

    #[error("Similarity index returned no entry for query")]
    EmptyIndex,

    #[error("Embedding service error: {message}")]
    EmbeddingError { message: String },

    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    // Internal errors
    #[error("No similarity scores were collected")]
    NoScores,

    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::MissingField { .. } => ErrorCode::MissingField,
            AppError::MessageTooShort { .. } => ErrorCode::MessageTooShort,
            AppError::MessageTooLong { .. } => ErrorCode::MessageTooLong,
            AppError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            AppError::UnsupportedMediaType => ErrorCode::UnsupportedMediaType,
            AppError::PayloadTooLarge { .. } => ErrorCode::PayloadTooLarge,
            AppError::RateLimited { .. } => ErrorCode::RateLimited,
            AppError::IndexError { .. } => ErrorCode::IndexError,
            AppError::HttpClient(_) => ErrorCode::IndexError,
            AppError::EmptyIndex => ErrorCode::EmptyIndex,
            AppError::EmbeddingError { .. } => ErrorCode::EmbeddingError,
            AppError::Timeout { .. } => ErrorCode::Timeout,
            AppError::NoScores => ErrorCode::NoScores,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::MissingField { .. } |
            AppError::MessageTooShort { .. } |
            AppError::InvalidFormat { .. } => StatusCode::BAD_REQUEST,

            // 413 Payload Too Large
            AppError::MessageTooLong { .. } |
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,

            // 415 Unsupported Media Type
            AppError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,

            // 429 Too Many Requests
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,

            // 500 Internal Server Error
            AppError::NoScores |
            AppError::Internal { .. } |
            AppError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,

            // 502 Bad Gateway
            AppError::IndexError { .. } |
            AppError::EmbeddingError { .. } |
            AppError::HttpClient(_) => StatusCode::BAD_GATEWAY,

            // 503 Service Unavailable
            AppError::EmptyIndex => StatusCode::SERVICE_UNAVAILABLE,

            // 504 Gateway Timeout
            AppError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Error body returned by the API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: ErrorCode,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        // Log based on severity
        if self.is_server_error() {
            tracing::error!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let body = ErrorResponse {
            error: message,
            code,
        };

        (status, Json(body)).into_response()
    }
}

impl From<::config::ConfigError> for AppError {
    fn from(err: ::config::ConfigError) -> Self {
        AppError::Configuration {
            message: err.to_string(),
        }
    }
}
