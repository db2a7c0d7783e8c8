use async_trait::async_trait;
use serde_json::Value;

use super::gate::BodyReader;
use super::resource::{NoFilter, StoreResource};
use crate::database::models::{BatchPayload, Billboard, BillboardInput};
use crate::database::{Database, DbResult};
use crate::error::ApiError;
use crate::schema::Resource;

pub struct Billboards;

#[async_trait]
impl StoreResource for Billboards {
    const RESOURCE: Resource = Resource::Billboards;

    type Input = BillboardInput;
    type Filter = NoFilter;
    type Item = Billboard;
    type Created = Billboard;
    type Updated = BatchPayload;

    fn parse(body: &Value) -> Result<BillboardInput, ApiError> {
        let body = BodyReader(body);
        Ok(BillboardInput {
            label: body.text("label")?,
            image_url: body.text("imageUrl")?,
        })
    }

    async fn list(db: &dyn Database, store_id: &str, _filter: &NoFilter) -> DbResult<Vec<Billboard>> {
        db.list_billboards(store_id).await
    }

    async fn find(db: &dyn Database, id: &str) -> DbResult<Option<Billboard>> {
        db.find_billboard(id).await
    }

    async fn create(db: &dyn Database, store_id: &str, input: BillboardInput) -> DbResult<Billboard> {
        db.create_billboard(store_id, input).await
    }

    async fn update(db: &dyn Database, _store_id: &str, id: &str, input: BillboardInput) -> DbResult<BatchPayload> {
        db.update_billboard(id, input).await
    }

    async fn delete(db: &dyn Database, id: &str) -> DbResult<BatchPayload> {
        db.delete_billboard(id).await
    }
}
