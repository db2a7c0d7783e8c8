use async_trait::async_trait;

use super::manager::DbResult;
use super::models::{
    BatchPayload, Billboard, BillboardInput, CategoryDetail, CategoryInput, Category, Color,
    Product, ProductDetail, ProductFilter, ProductInput, Size, Store, StoreInput, SwatchInput,
};

/// Persistence collaborator consumed by the request handlers.
///
/// Every method is a single call from the handler's point of view; any
/// multi-statement work (product image replacement) must be atomic inside the
/// implementation. Lookups by id return `None` rather than an error when the
/// row does not exist, and the `delete_*` / `update_*` batch methods report the
/// number of affected rows instead of failing on a missing id.
#[async_trait]
pub trait Database: Send + Sync {
    async fn health_check(&self) -> DbResult<()>;

    // Stores
    async fn create_store(&self, user_id: &str, input: StoreInput) -> DbResult<Store>;
    async fn list_stores(&self, user_id: &str) -> DbResult<Vec<Store>>;
    /// The ownership lookup: a store matching both id and owning user.
    async fn find_store_for_user(&self, store_id: &str, user_id: &str) -> DbResult<Option<Store>>;
    async fn update_store(&self, store_id: &str, user_id: &str, input: StoreInput) -> DbResult<BatchPayload>;
    async fn delete_store(&self, store_id: &str, user_id: &str) -> DbResult<BatchPayload>;

    // Billboards
    async fn create_billboard(&self, store_id: &str, input: BillboardInput) -> DbResult<Billboard>;
    async fn list_billboards(&self, store_id: &str) -> DbResult<Vec<Billboard>>;
    async fn find_billboard(&self, id: &str) -> DbResult<Option<Billboard>>;
    async fn update_billboard(&self, id: &str, input: BillboardInput) -> DbResult<BatchPayload>;
    async fn delete_billboard(&self, id: &str) -> DbResult<BatchPayload>;

    // Categories
    async fn create_category(&self, store_id: &str, input: CategoryInput) -> DbResult<Category>;
    async fn list_categories(&self, store_id: &str) -> DbResult<Vec<CategoryDetail>>;
    async fn find_category(&self, id: &str) -> DbResult<Option<CategoryDetail>>;
    async fn update_category(&self, id: &str, input: CategoryInput) -> DbResult<BatchPayload>;
    async fn delete_category(&self, id: &str) -> DbResult<BatchPayload>;

    // Sizes
    async fn create_size(&self, store_id: &str, input: SwatchInput) -> DbResult<Size>;
    async fn list_sizes(&self, store_id: &str) -> DbResult<Vec<Size>>;
    async fn find_size(&self, id: &str) -> DbResult<Option<Size>>;
    async fn update_size(&self, id: &str, input: SwatchInput) -> DbResult<BatchPayload>;
    async fn delete_size(&self, id: &str) -> DbResult<BatchPayload>;

    // Colors
    async fn create_color(&self, store_id: &str, input: SwatchInput) -> DbResult<Color>;
    async fn list_colors(&self, store_id: &str) -> DbResult<Vec<Color>>;
    async fn find_color(&self, id: &str) -> DbResult<Option<Color>>;
    async fn update_color(&self, id: &str, input: SwatchInput) -> DbResult<BatchPayload>;
    async fn delete_color(&self, id: &str) -> DbResult<BatchPayload>;

    // Products
    async fn create_product(&self, store_id: &str, input: ProductInput) -> DbResult<Product>;
    async fn list_products(&self, store_id: &str, filter: &ProductFilter) -> DbResult<Vec<ProductDetail>>;
    async fn find_product(&self, id: &str) -> DbResult<Option<ProductDetail>>;
    /// Replaces the product's fields and its whole image collection in one unit.
    /// Fails with `NotFound` when the product does not exist.
    async fn update_product(&self, store_id: &str, id: &str, input: ProductInput) -> DbResult<Product>;
    async fn delete_product(&self, id: &str) -> DbResult<BatchPayload>;
}
