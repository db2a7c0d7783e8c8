use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use crate::error::ApiError;

/// Final step of every handler: raw JSON on success, plain text on failure.
///
/// Internal failures are logged here with the handler tag (e.g.
/// `[PRODUCTS_PATCH]`) before being flattened to "Internal error".
pub fn respond<T: Serialize>(tag: &str, result: Result<T, ApiError>) -> Response {
    match result {
        Ok(data) => Json(data).into_response(),
        Err(err) => {
            if err.is_internal() {
                tracing::error!("[{}] {}", tag, err);
            } else {
                tracing::debug!("[{}] rejected: {}", tag, err);
            }
            err.into_response()
        }
    }
}

/// Response for a handler that panicked, used with `CatchPanicLayer`.
pub fn internal_error_on_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("[PANIC] {}", detail);
    (StatusCode::INTERNAL_SERVER_ERROR, ApiError::INTERNAL_MESSAGE).into_response()
}
