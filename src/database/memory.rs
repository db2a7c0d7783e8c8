use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::manager::{DatabaseError, DbResult};
use super::models::{
    BatchPayload, Billboard, BillboardInput, Category, CategoryDetail, CategoryInput, Color, Image,
    Product, ProductDetail, ProductFilter, ProductInput, Size, Store, StoreInput, SwatchInput,
};
use super::repository::Database;

#[derive(Debug, Default)]
struct Tables {
    stores: Vec<Store>,
    billboards: Vec<Billboard>,
    categories: Vec<Category>,
    sizes: Vec<Size>,
    colors: Vec<Color>,
    products: Vec<Product>,
    images: Vec<Image>,
}

impl Tables {
    fn require_store(&self, store_id: &str) -> DbResult<()> {
        if self.stores.iter().any(|s| s.id == store_id) {
            Ok(())
        } else {
            Err(DatabaseError::Constraint(format!("store {store_id} does not exist")))
        }
    }

    fn require_billboard(&self, billboard_id: &str) -> DbResult<()> {
        if self.billboards.iter().any(|b| b.id == billboard_id) {
            Ok(())
        } else {
            Err(DatabaseError::Constraint(format!("billboard {billboard_id} does not exist")))
        }
    }

    fn require_product_refs(&self, input: &ProductInput) -> DbResult<()> {
        if !self.categories.iter().any(|c| c.id == input.category_id) {
            return Err(DatabaseError::Constraint(format!("category {} does not exist", input.category_id)));
        }
        if !self.sizes.iter().any(|s| s.id == input.size_id) {
            return Err(DatabaseError::Constraint(format!("size {} does not exist", input.size_id)));
        }
        if !self.colors.iter().any(|c| c.id == input.color_id) {
            return Err(DatabaseError::Constraint(format!("color {} does not exist", input.color_id)));
        }
        Ok(())
    }

    fn category_detail(&self, category: &Category) -> CategoryDetail {
        CategoryDetail {
            billboard: self
                .billboards
                .iter()
                .find(|b| b.id == category.billboard_id)
                .cloned(),
            category: category.clone(),
        }
    }

    fn product_detail(&self, product: &Product) -> ProductDetail {
        ProductDetail {
            images: self
                .images
                .iter()
                .filter(|i| i.product_id == product.id)
                .cloned()
                .collect(),
            category: self.categories.iter().find(|c| c.id == product.category_id).cloned(),
            size: self.sizes.iter().find(|s| s.id == product.size_id).cloned(),
            color: self.colors.iter().find(|c| c.id == product.color_id).cloned(),
            product: product.clone(),
        }
    }

    fn push_images(&mut self, product_id: &str, urls: &[String]) {
        let now = Utc::now();
        self.images.extend(urls.iter().map(|url| Image {
            id: new_id(),
            product_id: product_id.to_string(),
            url: url.clone(),
            created_at: now,
            updated_at: now,
        }));
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Newest-first listing of rows belonging to a store.
fn newest_first<'a, T: 'a>(rows: impl DoubleEndedIterator<Item = &'a T>) -> impl Iterator<Item = &'a T> {
    rows.rev()
}

/// In-process persistence used when no `DATABASE_URL` is configured, and by tests.
///
/// Each trait call holds the table lock for its whole duration, which gives
/// every call (including the product image replacement) all-or-nothing
/// semantics. Foreign keys behave like the Postgres schema: referenced rows
/// cannot be deleted and images cascade with their product.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    tables: RwLock<Tables>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn health_check(&self) -> DbResult<()> {
        Ok(())
    }

    async fn create_store(&self, user_id: &str, input: StoreInput) -> DbResult<Store> {
        let now = Utc::now();
        let store = Store {
            id: new_id(),
            user_id: user_id.to_string(),
            name: input.name,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.stores.push(store.clone());
        Ok(store)
    }

    async fn list_stores(&self, user_id: &str) -> DbResult<Vec<Store>> {
        let tables = self.tables.read().await;
        Ok(tables.stores.iter().filter(|s| s.user_id == user_id).cloned().collect())
    }

    async fn find_store_for_user(&self, store_id: &str, user_id: &str) -> DbResult<Option<Store>> {
        let tables = self.tables.read().await;
        Ok(tables
            .stores
            .iter()
            .find(|s| s.id == store_id && s.user_id == user_id)
            .cloned())
    }

    async fn update_store(&self, store_id: &str, user_id: &str, input: StoreInput) -> DbResult<BatchPayload> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let mut count = 0;
        for store in tables
            .stores
            .iter_mut()
            .filter(|s| s.id == store_id && s.user_id == user_id)
        {
            store.name = input.name.clone();
            store.updated_at = now;
            count += 1;
        }
        Ok(BatchPayload::new(count))
    }

    async fn delete_store(&self, store_id: &str, user_id: &str) -> DbResult<BatchPayload> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .stores
            .iter()
            .any(|s| s.id == store_id && s.user_id == user_id);
        if !owned {
            return Ok(BatchPayload::new(0));
        }
        let referenced = tables.billboards.iter().any(|r| r.store_id == store_id)
            || tables.categories.iter().any(|r| r.store_id == store_id)
            || tables.sizes.iter().any(|r| r.store_id == store_id)
            || tables.colors.iter().any(|r| r.store_id == store_id)
            || tables.products.iter().any(|r| r.store_id == store_id);
        if referenced {
            return Err(DatabaseError::Constraint(format!("store {store_id} still owns records")));
        }
        let before = tables.stores.len();
        tables.stores.retain(|s| !(s.id == store_id && s.user_id == user_id));
        Ok(BatchPayload::new((before - tables.stores.len()) as u64))
    }

    async fn create_billboard(&self, store_id: &str, input: BillboardInput) -> DbResult<Billboard> {
        let mut tables = self.tables.write().await;
        tables.require_store(store_id)?;
        let now = Utc::now();
        let billboard = Billboard {
            id: new_id(),
            store_id: store_id.to_string(),
            label: input.label,
            image_url: input.image_url,
            created_at: now,
            updated_at: now,
        };
        tables.billboards.push(billboard.clone());
        Ok(billboard)
    }

    async fn list_billboards(&self, store_id: &str) -> DbResult<Vec<Billboard>> {
        let tables = self.tables.read().await;
        Ok(newest_first(tables.billboards.iter())
            .filter(|b| b.store_id == store_id)
            .cloned()
            .collect())
    }

    async fn find_billboard(&self, id: &str) -> DbResult<Option<Billboard>> {
        let tables = self.tables.read().await;
        Ok(tables.billboards.iter().find(|b| b.id == id).cloned())
    }

    async fn update_billboard(&self, id: &str, input: BillboardInput) -> DbResult<BatchPayload> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let mut count = 0;
        for billboard in tables.billboards.iter_mut().filter(|b| b.id == id) {
            billboard.label = input.label.clone();
            billboard.image_url = input.image_url.clone();
            billboard.updated_at = now;
            count += 1;
        }
        Ok(BatchPayload::new(count))
    }

    async fn delete_billboard(&self, id: &str) -> DbResult<BatchPayload> {
        let mut tables = self.tables.write().await;
        if tables.categories.iter().any(|c| c.billboard_id == id) {
            return Err(DatabaseError::Constraint(format!("billboard {id} is used by a category")));
        }
        let before = tables.billboards.len();
        tables.billboards.retain(|b| b.id != id);
        Ok(BatchPayload::new((before - tables.billboards.len()) as u64))
    }

    async fn create_category(&self, store_id: &str, input: CategoryInput) -> DbResult<Category> {
        let mut tables = self.tables.write().await;
        tables.require_store(store_id)?;
        tables.require_billboard(&input.billboard_id)?;
        let now = Utc::now();
        let category = Category {
            id: new_id(),
            store_id: store_id.to_string(),
            billboard_id: input.billboard_id,
            name: input.name,
            created_at: now,
            updated_at: now,
        };
        tables.categories.push(category.clone());
        Ok(category)
    }

    async fn list_categories(&self, store_id: &str) -> DbResult<Vec<CategoryDetail>> {
        let tables = self.tables.read().await;
        Ok(newest_first(tables.categories.iter())
            .filter(|c| c.store_id == store_id)
            .map(|c| tables.category_detail(c))
            .collect())
    }

    async fn find_category(&self, id: &str) -> DbResult<Option<CategoryDetail>> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| tables.category_detail(c)))
    }

    async fn update_category(&self, id: &str, input: CategoryInput) -> DbResult<BatchPayload> {
        let mut tables = self.tables.write().await;
        if tables.categories.iter().any(|c| c.id == id) {
            tables.require_billboard(&input.billboard_id)?;
        }
        let now = Utc::now();
        let mut count = 0;
        for category in tables.categories.iter_mut().filter(|c| c.id == id) {
            category.name = input.name.clone();
            category.billboard_id = input.billboard_id.clone();
            category.updated_at = now;
            count += 1;
        }
        Ok(BatchPayload::new(count))
    }

    async fn delete_category(&self, id: &str) -> DbResult<BatchPayload> {
        let mut tables = self.tables.write().await;
        if tables.products.iter().any(|p| p.category_id == id) {
            return Err(DatabaseError::Constraint(format!("category {id} is used by a product")));
        }
        let before = tables.categories.len();
        tables.categories.retain(|c| c.id != id);
        Ok(BatchPayload::new((before - tables.categories.len()) as u64))
    }

    async fn create_size(&self, store_id: &str, input: SwatchInput) -> DbResult<Size> {
        let mut tables = self.tables.write().await;
        tables.require_store(store_id)?;
        let now = Utc::now();
        let size = Size {
            id: new_id(),
            store_id: store_id.to_string(),
            name: input.name,
            value: input.value,
            created_at: now,
            updated_at: now,
        };
        tables.sizes.push(size.clone());
        Ok(size)
    }

    async fn list_sizes(&self, store_id: &str) -> DbResult<Vec<Size>> {
        let tables = self.tables.read().await;
        Ok(newest_first(tables.sizes.iter())
            .filter(|s| s.store_id == store_id)
            .cloned()
            .collect())
    }

    async fn find_size(&self, id: &str) -> DbResult<Option<Size>> {
        let tables = self.tables.read().await;
        Ok(tables.sizes.iter().find(|s| s.id == id).cloned())
    }

    async fn update_size(&self, id: &str, input: SwatchInput) -> DbResult<BatchPayload> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let mut count = 0;
        for size in tables.sizes.iter_mut().filter(|s| s.id == id) {
            size.name = input.name.clone();
            size.value = input.value.clone();
            size.updated_at = now;
            count += 1;
        }
        Ok(BatchPayload::new(count))
    }

    async fn delete_size(&self, id: &str) -> DbResult<BatchPayload> {
        let mut tables = self.tables.write().await;
        if tables.products.iter().any(|p| p.size_id == id) {
            return Err(DatabaseError::Constraint(format!("size {id} is used by a product")));
        }
        let before = tables.sizes.len();
        tables.sizes.retain(|s| s.id != id);
        Ok(BatchPayload::new((before - tables.sizes.len()) as u64))
    }

    async fn create_color(&self, store_id: &str, input: SwatchInput) -> DbResult<Color> {
        let mut tables = self.tables.write().await;
        tables.require_store(store_id)?;
        let now = Utc::now();
        let color = Color {
            id: new_id(),
            store_id: store_id.to_string(),
            name: input.name,
            value: input.value,
            created_at: now,
            updated_at: now,
        };
        tables.colors.push(color.clone());
        Ok(color)
    }

    async fn list_colors(&self, store_id: &str) -> DbResult<Vec<Color>> {
        let tables = self.tables.read().await;
        Ok(newest_first(tables.colors.iter())
            .filter(|c| c.store_id == store_id)
            .cloned()
            .collect())
    }

    async fn find_color(&self, id: &str) -> DbResult<Option<Color>> {
        let tables = self.tables.read().await;
        Ok(tables.colors.iter().find(|c| c.id == id).cloned())
    }

    async fn update_color(&self, id: &str, input: SwatchInput) -> DbResult<BatchPayload> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let mut count = 0;
        for color in tables.colors.iter_mut().filter(|c| c.id == id) {
            color.name = input.name.clone();
            color.value = input.value.clone();
            color.updated_at = now;
            count += 1;
        }
        Ok(BatchPayload::new(count))
    }

    async fn delete_color(&self, id: &str) -> DbResult<BatchPayload> {
        let mut tables = self.tables.write().await;
        if tables.products.iter().any(|p| p.color_id == id) {
            return Err(DatabaseError::Constraint(format!("color {id} is used by a product")));
        }
        let before = tables.colors.len();
        tables.colors.retain(|c| c.id != id);
        Ok(BatchPayload::new((before - tables.colors.len()) as u64))
    }

    async fn create_product(&self, store_id: &str, input: ProductInput) -> DbResult<Product> {
        let mut tables = self.tables.write().await;
        tables.require_store(store_id)?;
        tables.require_product_refs(&input)?;
        let now = Utc::now();
        let product = Product {
            id: new_id(),
            store_id: store_id.to_string(),
            category_id: input.category_id,
            size_id: input.size_id,
            color_id: input.color_id,
            name: input.name,
            price: input.price,
            is_featured: input.is_featured.unwrap_or(false),
            is_archived: input.is_archived.unwrap_or(false),
            created_at: now,
            updated_at: now,
        };
        tables.push_images(&product.id, &input.images);
        tables.products.push(product.clone());
        Ok(product)
    }

    async fn list_products(&self, store_id: &str, filter: &ProductFilter) -> DbResult<Vec<ProductDetail>> {
        let tables = self.tables.read().await;
        Ok(newest_first(tables.products.iter())
            .filter(|p| p.store_id == store_id && filter.matches(p))
            .map(|p| tables.product_detail(p))
            .collect())
    }

    async fn find_product(&self, id: &str) -> DbResult<Option<ProductDetail>> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .iter()
            .find(|p| p.id == id)
            .map(|p| tables.product_detail(p)))
    }

    async fn update_product(&self, store_id: &str, id: &str, input: ProductInput) -> DbResult<Product> {
        let mut tables = self.tables.write().await;
        if !tables.products.iter().any(|p| p.id == id) {
            return Err(DatabaseError::NotFound(format!("product {id}")));
        }
        // Validate everything before touching any row so a failure leaves no partial write
        tables.require_store(store_id)?;
        tables.require_product_refs(&input)?;

        let now = Utc::now();
        let product = {
            let Some(product) = tables.products.iter_mut().find(|p| p.id == id) else {
                return Err(DatabaseError::NotFound(format!("product {id}")));
            };
            product.store_id = store_id.to_string();
            product.name = input.name;
            product.price = input.price;
            product.category_id = input.category_id;
            product.size_id = input.size_id;
            product.color_id = input.color_id;
            if let Some(featured) = input.is_featured {
                product.is_featured = featured;
            }
            if let Some(archived) = input.is_archived {
                product.is_archived = archived;
            }
            product.updated_at = now;
            product.clone()
        };

        tables.images.retain(|i| i.product_id != id);
        tables.push_images(id, &input.images);
        Ok(product)
    }

    async fn delete_product(&self, id: &str) -> DbResult<BatchPayload> {
        let mut tables = self.tables.write().await;
        let before = tables.products.len();
        tables.products.retain(|p| p.id != id);
        let count = (before - tables.products.len()) as u64;
        tables.images.retain(|i| i.product_id != id);
        Ok(BatchPayload::new(count))
    }
}
