use std::convert::Infallible;

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

use crate::state::AppState;

/// Caller identity resolved from the request, if any.
///
/// Extraction never rejects: handlers decide when a missing identity is an
/// error so that the 401 check runs at its fixed place in the gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller(pub Option<String>);

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Caller(state.identity.identify(&parts.headers)))
    }
}
