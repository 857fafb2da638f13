//! API error types and responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use passport_core::PassportError;

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Internal error: {0}")]
    Internal(String),

    /// Contract failure, reported with its own code
    #[error(transparent)]
    Passport(#[from] PassportError),
}

/// API error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Passport(err) => match err {
                PassportError::NotFound(_) => StatusCode::NOT_FOUND,
                PassportError::AlreadyExists(_) => StatusCode::CONFLICT,
                PassportError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                PassportError::Malformed(_) => StatusCode::BAD_REQUEST,
                PassportError::Store(_) | PassportError::Serialization(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Internal(_) => "INTERNAL_ERROR",
            ApiError::Passport(err) => err.code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = match &self {
            ApiError::Passport(PassportError::NotFound(id))
            | ApiError::Passport(PassportError::AlreadyExists(id)) => {
                Some(serde_json::json!({ "dpp_id": id }))
            }
            _ => None,
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
