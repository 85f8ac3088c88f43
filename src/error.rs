//! Error types for form body parsing

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use thiserror::Error;

/// Message carried by every poisoning violation.
pub const FORBIDDEN_PROPERTY_MESSAGE: &str = "Object contains forbidden prototype property";

/// A field name was rejected by an `error` poisoning policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", FORBIDDEN_PROPERTY_MESSAGE)]
pub struct PoisoningViolation {
    /// The offending field name
    pub field: String,
}

/// Errors reported by a field decoder
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecoderError {
    /// The decoder could not be constructed from the headers and options
    #[error("{0}")]
    Setup(String),

    /// The decoder failed while consuming the body stream
    #[error("{0}")]
    Stream(String),
}

/// Errors that settle a parse operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// Decoder construction failed; the body was never read
    #[error("{0}")]
    DecoderSetup(String),

    /// Decoder failed mid-stream
    #[error("{0}")]
    DecoderStream(String),

    /// A forbidden field name was seen under an `error` policy
    #[error(transparent)]
    Poisoning(#[from] PoisoningViolation),
}

impl From<DecoderError> for FormError {
    fn from(e: DecoderError) -> Self {
        match e {
            DecoderError::Setup(msg) => FormError::DecoderSetup(msg),
            DecoderError::Stream(msg) => FormError::DecoderStream(msg),
        }
    }
}

impl FormError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FormError::Poisoning(_) => StatusCode::BAD_REQUEST,
            FormError::DecoderSetup(_) | FormError::DecoderStream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FormError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "statusCode": status.as_u16(),
            "error": status.canonical_reason().unwrap_or("Error"),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

/// Errors raised while building configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Unknown poisoning action string
    #[error("Invalid poisoning action: {0} (expected ignore, error or remove)")]
    InvalidPoisoningAction(String),

    /// Caller options could not be deserialized
    #[error("Invalid plugin options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}
