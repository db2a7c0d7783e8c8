use async_trait::async_trait;
use serde_json::Value;

use super::gate::BodyReader;
use super::resource::StoreResource;
use crate::database::models::{BatchPayload, Product, ProductDetail, ProductFilter, ProductInput};
use crate::database::{Database, DbResult};
use crate::error::ApiError;
use crate::schema::Resource;

pub struct Products;

#[async_trait]
impl StoreResource for Products {
    const RESOURCE: Resource = Resource::Products;

    type Input = ProductInput;
    type Filter = ProductFilter;
    type Item = ProductDetail;
    type Created = Product;
    /// Product updates return the record rather than a count.
    type Updated = Product;

    fn parse(body: &Value) -> Result<ProductInput, ApiError> {
        let body = BodyReader(body);
        Ok(ProductInput {
            name: body.text("name")?,
            price: body.decimal("price")?,
            category_id: body.text("categoryId")?,
            size_id: body.text("sizeId")?,
            color_id: body.text("colorId")?,
            images: body.image_urls("images")?,
            is_featured: body.flag("isFeatured")?,
            is_archived: body.flag("isArchived")?,
        })
    }

    async fn list(db: &dyn Database, store_id: &str, filter: &ProductFilter) -> DbResult<Vec<ProductDetail>> {
        db.list_products(store_id, filter).await
    }

    async fn find(db: &dyn Database, id: &str) -> DbResult<Option<ProductDetail>> {
        db.find_product(id).await
    }

    async fn create(db: &dyn Database, store_id: &str, input: ProductInput) -> DbResult<Product> {
        db.create_product(store_id, input).await
    }

    async fn update(db: &dyn Database, store_id: &str, id: &str, input: ProductInput) -> DbResult<Product> {
        db.update_product(store_id, id, input).await
    }

    async fn delete(db: &dyn Database, id: &str) -> DbResult<BatchPayload> {
        db.delete_product(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    #[test]
    fn parse_keeps_image_order_and_optional_flags() {
        let input = Products::parse(&json!({
            "name": "Tee", "price": "12.50", "categoryId": "c1", "sizeId": "s1", "colorId": "k1",
            "images": [{ "url": "b.png" }, { "url": "a.png" }], "isArchived": true
        }))
        .unwrap();
        assert_eq!(input.price, Decimal::new(1250, 2));
        assert_eq!(input.images, vec!["b.png", "a.png"]);
        assert_eq!(input.is_featured, None);
        assert_eq!(input.is_archived, Some(true));
    }

    #[test]
    fn unparsable_price_is_internal() {
        let err = Products::parse(&json!({
            "name": "Tee", "price": "cheap", "categoryId": "c1", "sizeId": "s1", "colorId": "k1",
            "images": [{ "url": "a.png" }]
        }))
        .unwrap_err();
        assert!(err.is_internal());
    }
}
