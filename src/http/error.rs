//! Error-to-response mapping.
//!
//! Every failure leaves the service as `{"error": "<message>"}`. Server-side
//! causes are logged and replaced with a fixed message before they reach the
//! client.

use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::http::form::ExtractError;
use crate::imaging::ImagingError;

/// Message for extraction and internal failures.
pub const UNKNOWN_ERROR: &str = "some unknown error occured";
/// Message for transform failures.
pub const PROCESSING_ERROR: &str = "error processing image";

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad form input; the message is shown to the caller as-is.
    #[error("{0}")]
    Validation(String),

    #[error("error retrieving image file: {0}")]
    Extraction(#[from] ExtractError),

    #[error("error processing image: {0}")]
    Processing(#[from] ImagingError),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("Cannot {method} {path}")]
    NotFound { method: Method, path: String },

    #[error("Method Not Allowed")]
    MethodNotAllowed,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Extraction(_) | ApiError::Processing(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The message placed in the response body.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Validation(msg) => msg.clone(),
            ApiError::NotFound { .. } | ApiError::MethodNotAllowed => self.to_string(),
            ApiError::Processing(_) => PROCESSING_ERROR.to_string(),
            ApiError::Extraction(_) | ApiError::Internal(_) => UNKNOWN_ERROR.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = Json(json!({ "error": self.public_message() }));
        (status, body).into_response()
    }
}
