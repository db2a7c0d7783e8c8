// HTTP API Error Types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::database::DatabaseError;

/// Every way a handler can fail. Client errors carry the exact text sent back;
/// everything else collapses to a generic 500 once logged.
#[derive(Debug, Error)]
pub enum ApiError {
    // 401 Unauthorized
    #[error("Unauthenticated")]
    Unauthenticated,

    // 400 Bad Request: missing path id or required body field
    #[error("{0}")]
    Required(&'static str),

    // 403 Forbidden: store not owned by the caller
    #[error("Unauthorized")]
    Unauthorized,

    // 500 Internal Server Error
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl ApiError {
    pub const INTERNAL_MESSAGE: &'static str = "Internal error";

    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Required(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::FORBIDDEN,
            ApiError::InvalidBody(_) | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.status_code() == StatusCode::INTERNAL_SERVER_ERROR
    }

    /// Get client-safe error message
    pub fn message(&self) -> String {
        if self.is_internal() {
            Self::INTERNAL_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }

    pub fn invalid_body(message: impl Into<String>) -> Self {
        ApiError::InvalidBody(message.into())
    }
}

// Plain-text body, no envelope
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), self.message()).into_response()
    }
}
