use async_trait::async_trait;
use serde_json::Value;

use super::gate::BodyReader;
use super::resource::{NoFilter, StoreResource};
use crate::database::models::{BatchPayload, Category, CategoryDetail, CategoryInput};
use crate::database::{Database, DbResult};
use crate::error::ApiError;
use crate::schema::Resource;

pub struct Categories;

#[async_trait]
impl StoreResource for Categories {
    const RESOURCE: Resource = Resource::Categories;

    type Input = CategoryInput;
    type Filter = NoFilter;
    type Item = CategoryDetail;
    type Created = Category;
    type Updated = BatchPayload;

    fn parse(body: &Value) -> Result<CategoryInput, ApiError> {
        let body = BodyReader(body);
        Ok(CategoryInput {
            name: body.text("name")?,
            billboard_id: body.text("billboardId")?,
        })
    }

    async fn list(db: &dyn Database, store_id: &str, _filter: &NoFilter) -> DbResult<Vec<CategoryDetail>> {
        db.list_categories(store_id).await
    }

    async fn find(db: &dyn Database, id: &str) -> DbResult<Option<CategoryDetail>> {
        db.find_category(id).await
    }

    async fn create(db: &dyn Database, store_id: &str, input: CategoryInput) -> DbResult<Category> {
        db.create_category(store_id, input).await
    }

    async fn update(db: &dyn Database, _store_id: &str, id: &str, input: CategoryInput) -> DbResult<BatchPayload> {
        db.update_category(id, input).await
    }

    async fn delete(db: &dyn Database, id: &str) -> DbResult<BatchPayload> {
        db.delete_category(id).await
    }
}
