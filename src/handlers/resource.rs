//! Generic CRUD handlers shared by every store-scoped resource.
//!
//! Each resource describes itself through [`StoreResource`]; the handlers
//! below supply the gate ordering, error flattening and JSON responses.

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use super::gate::{
    parse_body, require_fields, require_identity, require_param, require_store_owner, STORE_ID_REQUIRED,
};
use crate::database::{models::BatchPayload, Database, DbResult};
use crate::error::ApiError;
use crate::middleware::{respond, Caller};
use crate::schema::Resource;
use crate::state::AppState;

/// Query type for resources without listing filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoFilter {}

#[async_trait]
pub trait StoreResource: Send + Sync + 'static {
    const RESOURCE: Resource;

    /// Typed write payload built from a validated body.
    type Input: Send + 'static;
    type Filter: DeserializeOwned + Default + Send + Sync + 'static;
    /// Shape returned by reads (relations expanded).
    type Item: Serialize + Send;
    type Created: Serialize + Send;
    type Updated: Serialize + Send;

    fn parse(body: &Value) -> Result<Self::Input, ApiError>;

    async fn list(db: &dyn Database, store_id: &str, filter: &Self::Filter) -> DbResult<Vec<Self::Item>>;
    async fn find(db: &dyn Database, id: &str) -> DbResult<Option<Self::Item>>;
    async fn create(db: &dyn Database, store_id: &str, input: Self::Input) -> DbResult<Self::Created>;
    async fn update(db: &dyn Database, store_id: &str, id: &str, input: Self::Input) -> DbResult<Self::Updated>;
    async fn delete(db: &dyn Database, id: &str) -> DbResult<BatchPayload>;
}

fn tag<R: StoreResource>(verb: &str) -> String {
    format!("{}_{}", R::RESOURCE.tag(), verb)
}

/// GET /api/:store_id/{resource}
pub async fn list<R: StoreResource>(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    Query(filter): Query<R::Filter>,
) -> Response {
    let result: Result<Vec<R::Item>, ApiError> = async {
        let store_id = require_param(&store_id, STORE_ID_REQUIRED)?;
        Ok(R::list(state.db.as_ref(), store_id, &filter).await?)
    }
    .await;
    respond(&tag::<R>("GET"), result)
}

/// GET /api/:store_id/{resource}/:id - unauthenticated; `null` when absent
pub async fn show<R: StoreResource>(
    State(state): State<AppState>,
    Path((_store_id, id)): Path<(String, String)>,
) -> Response {
    let result: Result<Option<R::Item>, ApiError> = async {
        let id = require_param(&id, R::RESOURCE.id_required())?;
        Ok(R::find(state.db.as_ref(), id).await?)
    }
    .await;
    respond(&tag::<R>("GET"), result)
}

/// POST /api/:store_id/{resource}
pub async fn create<R: StoreResource>(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(store_id): Path<String>,
    body: Bytes,
) -> Response {
    let result: Result<R::Created, ApiError> = async {
        let user_id = require_identity(caller)?;
        let store_id = require_param(&store_id, STORE_ID_REQUIRED)?;

        let body = parse_body(&body)?;
        require_fields(R::RESOURCE.schema(), &body)?;

        require_store_owner(state.db.as_ref(), store_id, &user_id).await?;
        let input = R::parse(&body)?;
        Ok(R::create(state.db.as_ref(), store_id, input).await?)
    }
    .await;
    respond(&tag::<R>("POST"), result)
}

/// PATCH /api/:store_id/{resource}/:id - full-record replace
pub async fn update<R: StoreResource>(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path((store_id, id)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    let result: Result<R::Updated, ApiError> = async {
        let user_id = require_identity(caller)?;
        let store_id = require_param(&store_id, STORE_ID_REQUIRED)?;
        let id = require_param(&id, R::RESOURCE.id_required())?;

        let body = parse_body(&body)?;
        require_fields(R::RESOURCE.schema(), &body)?;

        require_store_owner(state.db.as_ref(), store_id, &user_id).await?;
        let input = R::parse(&body)?;
        Ok(R::update(state.db.as_ref(), store_id, id, input).await?)
    }
    .await;
    respond(&tag::<R>("PATCH"), result)
}

/// DELETE /api/:store_id/{resource}/:id - `{ "count": 0 }` when already gone
pub async fn delete<R: StoreResource>(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path((store_id, id)): Path<(String, String)>,
) -> Response {
    let result: Result<BatchPayload, ApiError> = async {
        let user_id = require_identity(caller)?;
        let store_id = require_param(&store_id, STORE_ID_REQUIRED)?;
        let id = require_param(&id, R::RESOURCE.id_required())?;

        require_store_owner(state.db.as_ref(), store_id, &user_id).await?;
        Ok(R::delete(state.db.as_ref(), id).await?)
    }
    .await;
    respond(&tag::<R>("DELETE"), result)
}

/// Collection and item routes for one resource.
pub fn routes<R: StoreResource>() -> Router<AppState> {
    let segment = R::RESOURCE.segment();
    Router::new()
        .route(
            &format!("/api/:store_id/{segment}"),
            get(list::<R>).post(create::<R>),
        )
        .route(
            &format!("/api/:store_id/{segment}/:id"),
            get(show::<R>).patch(update::<R>).delete(delete::<R>),
        )
}
