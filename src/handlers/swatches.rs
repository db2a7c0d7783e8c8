//! Sizes and colors: two resources with the same `{ name, value }` shape.

use async_trait::async_trait;
use serde_json::Value;

use super::gate::BodyReader;
use super::resource::{NoFilter, StoreResource};
use crate::database::models::{BatchPayload, Color, Size, SwatchInput};
use crate::database::{Database, DbResult};
use crate::error::ApiError;
use crate::schema::Resource;

fn parse_swatch(body: &Value) -> Result<SwatchInput, ApiError> {
    let body = BodyReader(body);
    Ok(SwatchInput {
        name: body.text("name")?,
        value: body.text("value")?,
    })
}

pub struct Sizes;

#[async_trait]
impl StoreResource for Sizes {
    const RESOURCE: Resource = Resource::Sizes;

    type Input = SwatchInput;
    type Filter = NoFilter;
    type Item = Size;
    type Created = Size;
    type Updated = BatchPayload;

    fn parse(body: &Value) -> Result<SwatchInput, ApiError> {
        parse_swatch(body)
    }

    async fn list(db: &dyn Database, store_id: &str, _filter: &NoFilter) -> DbResult<Vec<Size>> {
        db.list_sizes(store_id).await
    }

    async fn find(db: &dyn Database, id: &str) -> DbResult<Option<Size>> {
        db.find_size(id).await
    }

    async fn create(db: &dyn Database, store_id: &str, input: SwatchInput) -> DbResult<Size> {
        db.create_size(store_id, input).await
    }

    async fn update(db: &dyn Database, _store_id: &str, id: &str, input: SwatchInput) -> DbResult<BatchPayload> {
        db.update_size(id, input).await
    }

    async fn delete(db: &dyn Database, id: &str) -> DbResult<BatchPayload> {
        db.delete_size(id).await
    }
}

pub struct Colors;

#[async_trait]
impl StoreResource for Colors {
    const RESOURCE: Resource = Resource::Colors;

    type Input = SwatchInput;
    type Filter = NoFilter;
    type Item = Color;
    type Created = Color;
    type Updated = BatchPayload;

    fn parse(body: &Value) -> Result<SwatchInput, ApiError> {
        parse_swatch(body)
    }

    async fn list(db: &dyn Database, store_id: &str, _filter: &NoFilter) -> DbResult<Vec<Color>> {
        db.list_colors(store_id).await
    }

    async fn find(db: &dyn Database, id: &str) -> DbResult<Option<Color>> {
        db.find_color(id).await
    }

    async fn create(db: &dyn Database, store_id: &str, input: SwatchInput) -> DbResult<Color> {
        db.create_color(store_id, input).await
    }

    async fn update(db: &dyn Database, _store_id: &str, id: &str, input: SwatchInput) -> DbResult<BatchPayload> {
        db.update_color(id, input).await
    }

    async fn delete(db: &dyn Database, id: &str) -> DbResult<BatchPayload> {
        db.delete_color(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn swatch_body_parses_name_and_value() {
        let input = Colors::parse(&json!({ "name": "Black", "value": "#000000" })).unwrap();
        assert_eq!(input, SwatchInput { name: "Black".into(), value: "#000000".into() });
    }
}
