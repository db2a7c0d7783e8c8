//! Store endpoints: scoped to the caller rather than to a parent store.

use axum::{
    body::Bytes,
    extract::{Path, State},
    response::Response,
};
use serde_json::Value;

use super::gate::{parse_body, require_fields, require_identity, require_param, BodyReader, STORE_ID_REQUIRED};
use crate::database::models::{BatchPayload, Store, StoreInput};
use crate::error::ApiError;
use crate::middleware::{respond, Caller};
use crate::schema::STORE;
use crate::state::AppState;

fn parse_store(body: &Value) -> Result<StoreInput, ApiError> {
    Ok(StoreInput { name: BodyReader(body).text("name")? })
}

/// GET /api/stores - the caller's stores
pub async fn list(State(state): State<AppState>, Caller(caller): Caller) -> Response {
    let result: Result<Vec<Store>, ApiError> = async {
        let user_id = require_identity(caller)?;
        Ok(state.db.list_stores(&user_id).await?)
    }
    .await;
    respond("STORES_GET", result)
}

/// POST /api/stores
pub async fn create(State(state): State<AppState>, Caller(caller): Caller, body: Bytes) -> Response {
    let result: Result<Store, ApiError> = async {
        let user_id = require_identity(caller)?;
        let body = parse_body(&body)?;
        require_fields(&STORE, &body)?;
        let input = parse_store(&body)?;
        Ok(state.db.create_store(&user_id, input).await?)
    }
    .await;
    respond("STORES_POST", result)
}

/// PATCH /api/stores/:store_id - rename; only the owner's row can match
pub async fn update(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(store_id): Path<String>,
    body: Bytes,
) -> Response {
    let result: Result<BatchPayload, ApiError> = async {
        let user_id = require_identity(caller)?;
        let store_id = require_param(&store_id, STORE_ID_REQUIRED)?;
        let body = parse_body(&body)?;
        require_fields(&STORE, &body)?;
        let input = parse_store(&body)?;
        Ok(state.db.update_store(store_id, &user_id, input).await?)
    }
    .await;
    respond("STORE_PATCH", result)
}

/// DELETE /api/stores/:store_id
pub async fn delete(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(store_id): Path<String>,
) -> Response {
    let result: Result<BatchPayload, ApiError> = async {
        let user_id = require_identity(caller)?;
        let store_id = require_param(&store_id, STORE_ID_REQUIRED)?;
        Ok(state.db.delete_store(store_id, &user_id).await?)
    }
    .await;
    respond("STORE_DELETE", result)
}
