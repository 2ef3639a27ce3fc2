use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::validation::FieldErrors;

/// Generic message used when the quote API gives no usable explanation.
pub const GENERIC_SUBMIT_FAILURE: &str = "Failed to submit quote request";

/// Why a quote submission attempt failed.
///
/// None of these are retried; the attempt is final and the caller decides
/// whether to reset and try again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The request never produced an HTTP response (DNS, connect, timeout).
    Network(String),
    /// The quote API answered with a non-2xx status.
    Status(u16),
    /// The quote API answered 2xx but `success` was falsy.
    Rejected(String),
    /// The quote API answered 2xx with a body that is not the expected JSON.
    InvalidResponse(String),
    /// `submit` was called while the attempt was not idle.
    NotIdle,
}

impl SubmitError {
    /// Message suitable for the failure report.
    pub fn message(&self) -> &str {
        match self {
            SubmitError::Rejected(msg) => msg.as_str(),
            SubmitError::NotIdle => "A submission is already in progress or completed",
            SubmitError::Network(_) | SubmitError::Status(_) | SubmitError::InvalidResponse(_) => {
                GENERIC_SUBMIT_FAILURE
            }
        }
    }
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Network(e) => write!(f, "Quote API request failed: {}", e),
            SubmitError::Status(status) => write!(f, "HTTP error! status: {}", status),
            SubmitError::Rejected(msg) => write!(f, "Quote API rejected submission: {}", msg),
            SubmitError::InvalidResponse(e) => {
                write!(f, "Failed to parse quote API response: {}", e)
            }
            SubmitError::NotIdle => write!(f, "Submission attempt is not idle"),
        }
    }
}

impl std::error::Error for SubmitError {}

impl From<reqwest::Error> for SubmitError {
    fn from(err: reqwest::Error) -> Self {
        SubmitError::Network(err.to_string())
    }
}

/// Application-specific error types.
#[derive(Debug, Clone)]
pub enum AppError {
    /// One or more form fields failed validation.
    Validation(FieldErrors),
    /// The lead could not be delivered to the quote API.
    SubmitFailed {
        /// The underlying failure.
        source: SubmitError,
        /// User-facing notification text.
        notice: String,
    },
    /// Another submission for the same lead is still in flight.
    Conflict(String),
    /// Bad request error (invalid input).
    BadRequest(String),
    /// Request body exceeds the intake size limit.
    PayloadTooLarge(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(errors) => write!(f, "Validation failed: {}", errors),
            AppError::SubmitFailed { source, .. } => write!(f, "Submission failed: {}", source),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
        }
    }
}

impl IntoResponse for AppError {
    /// Maps each error variant to an HTTP status code and JSON body.
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(errors) => {
                tracing::debug!("Quote form rejected: {}", errors);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    json!({
                        "success": false,
                        "message": "Please correct the highlighted fields",
                        "errors": errors,
                    }),
                )
            }
            AppError::SubmitFailed { source, notice } => {
                tracing::error!("Quote submission error: {}", source);
                (
                    StatusCode::BAD_GATEWAY,
                    json!({ "success": false, "message": notice }),
                )
            }
            AppError::Conflict(msg) => {
                tracing::warn!("Conflict: {}", msg);
                (
                    StatusCode::CONFLICT,
                    json!({ "success": false, "message": msg }),
                )
            }
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "message": msg }),
            ),
            AppError::PayloadTooLarge(msg) => {
                tracing::warn!("Oversized quote request: {}", msg);
                (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    json!({ "success": false, "message": msg }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::Validation(errors)
    }
}
