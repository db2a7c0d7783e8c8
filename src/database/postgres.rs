use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::manager::{DatabaseError, DatabaseManager, DbResult};
use super::models::{
    BatchPayload, Billboard, BillboardInput, Category, CategoryDetail, CategoryInput, Color, Image,
    Product, ProductDetail, ProductFilter, ProductInput, Size, Store, StoreInput, SwatchInput,
};
use super::repository::Database;

const STORE_COLUMNS: &str = r#""id", "user_id", "name", "created_at", "updated_at""#;
const BILLBOARD_COLUMNS: &str =
    r#""id", "store_id", "label", "image_url", "created_at", "updated_at""#;
const CATEGORY_COLUMNS: &str =
    r#""id", "store_id", "billboard_id", "name", "created_at", "updated_at""#;
const SWATCH_COLUMNS: &str = r#""id", "store_id", "name", "value", "created_at", "updated_at""#;
const PRODUCT_COLUMNS: &str = r#""id", "store_id", "category_id", "size_id", "color_id", "name", "price", "is_featured", "is_archived", "created_at", "updated_at""#;
const IMAGE_COLUMNS: &str = r#""id", "product_id", "url", "created_at", "updated_at""#;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Postgres-backed persistence via sqlx.
#[derive(Clone)]
pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn insert_images(
        tx: &mut Transaction<'_, Postgres>,
        product_id: &str,
        urls: &[String],
    ) -> DbResult<()> {
        for (position, url) in urls.iter().enumerate() {
            sqlx::query(
                r#"INSERT INTO "images" ("id", "product_id", "position", "url") VALUES ($1, $2, $3, $4)"#,
            )
            .bind(new_id())
            .bind(product_id)
            .bind(position as i32)
            .bind(url)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    async fn attach_billboards(&self, categories: Vec<Category>) -> DbResult<Vec<CategoryDetail>> {
        let ids: Vec<String> = categories.iter().map(|c| c.billboard_id.clone()).collect();
        let sql = format!(r#"SELECT {BILLBOARD_COLUMNS} FROM "billboards" WHERE "id" = ANY($1)"#);
        let billboards: HashMap<String, Billboard> = sqlx::query_as::<_, Billboard>(&sql)
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|b| (b.id.clone(), b))
            .collect();

        Ok(categories
            .into_iter()
            .map(|category| CategoryDetail {
                billboard: billboards.get(&category.billboard_id).cloned(),
                category,
            })
            .collect())
    }

    async fn attach_relations(&self, products: Vec<Product>) -> DbResult<Vec<ProductDetail>> {
        if products.is_empty() {
            return Ok(vec![]);
        }
        let product_ids: Vec<String> = products.iter().map(|p| p.id.clone()).collect();
        let category_ids: Vec<String> = products.iter().map(|p| p.category_id.clone()).collect();
        let size_ids: Vec<String> = products.iter().map(|p| p.size_id.clone()).collect();
        let color_ids: Vec<String> = products.iter().map(|p| p.color_id.clone()).collect();

        let sql = format!(
            r#"SELECT {IMAGE_COLUMNS} FROM "images" WHERE "product_id" = ANY($1) ORDER BY "product_id", "position""#
        );
        let mut images: HashMap<String, Vec<Image>> = HashMap::new();
        for image in sqlx::query_as::<_, Image>(&sql)
            .bind(&product_ids)
            .fetch_all(&self.pool)
            .await?
        {
            images.entry(image.product_id.clone()).or_default().push(image);
        }

        let sql = format!(r#"SELECT {CATEGORY_COLUMNS} FROM "categories" WHERE "id" = ANY($1)"#);
        let categories: HashMap<String, Category> = sqlx::query_as::<_, Category>(&sql)
            .bind(&category_ids)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        let sql = format!(r#"SELECT {SWATCH_COLUMNS} FROM "sizes" WHERE "id" = ANY($1)"#);
        let sizes: HashMap<String, Size> = sqlx::query_as::<_, Size>(&sql)
            .bind(&size_ids)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();

        let sql = format!(r#"SELECT {SWATCH_COLUMNS} FROM "colors" WHERE "id" = ANY($1)"#);
        let colors: HashMap<String, Color> = sqlx::query_as::<_, Color>(&sql)
            .bind(&color_ids)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        Ok(products
            .into_iter()
            .map(|product| ProductDetail {
                images: images.remove(&product.id).unwrap_or_default(),
                category: categories.get(&product.category_id).cloned(),
                size: sizes.get(&product.size_id).cloned(),
                color: colors.get(&product.color_id).cloned(),
                product,
            })
            .collect())
    }

    async fn list_swatches<T>(&self, table: &str, store_id: &str) -> DbResult<Vec<T>>
    where
        T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        let sql = format!(
            r#"SELECT {SWATCH_COLUMNS} FROM "{table}" WHERE "store_id" = $1 ORDER BY "created_at" DESC"#
        );
        Ok(sqlx::query_as::<_, T>(&sql).bind(store_id).fetch_all(&self.pool).await?)
    }

    async fn find_swatch<T>(&self, table: &str, id: &str) -> DbResult<Option<T>>
    where
        T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        let sql = format!(r#"SELECT {SWATCH_COLUMNS} FROM "{table}" WHERE "id" = $1"#);
        Ok(sqlx::query_as::<_, T>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn create_swatch<T>(&self, table: &str, store_id: &str, input: SwatchInput) -> DbResult<T>
    where
        T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        let sql = format!(
            r#"INSERT INTO "{table}" ("id", "store_id", "name", "value") VALUES ($1, $2, $3, $4) RETURNING {SWATCH_COLUMNS}"#
        );
        Ok(sqlx::query_as::<_, T>(&sql)
            .bind(new_id())
            .bind(store_id)
            .bind(&input.name)
            .bind(&input.value)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_swatch(&self, table: &str, id: &str, input: SwatchInput) -> DbResult<BatchPayload> {
        let sql = format!(
            r#"UPDATE "{table}" SET "name" = $1, "value" = $2, "updated_at" = now() WHERE "id" = $3"#
        );
        let result = sqlx::query(&sql)
            .bind(&input.name)
            .bind(&input.value)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(BatchPayload::new(result.rows_affected()))
    }

    async fn delete_by_id(&self, table: &str, id: &str) -> DbResult<BatchPayload> {
        let sql = format!(r#"DELETE FROM "{table}" WHERE "id" = $1"#);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(BatchPayload::new(result.rows_affected()))
    }
}

#[async_trait]
impl Database for PgDatabase {
    async fn health_check(&self) -> DbResult<()> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn create_store(&self, user_id: &str, input: StoreInput) -> DbResult<Store> {
        let sql = format!(
            r#"INSERT INTO "stores" ("id", "user_id", "name") VALUES ($1, $2, $3) RETURNING {STORE_COLUMNS}"#
        );
        Ok(sqlx::query_as::<_, Store>(&sql)
            .bind(new_id())
            .bind(user_id)
            .bind(&input.name)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn list_stores(&self, user_id: &str) -> DbResult<Vec<Store>> {
        let sql = format!(
            r#"SELECT {STORE_COLUMNS} FROM "stores" WHERE "user_id" = $1 ORDER BY "created_at" ASC"#
        );
        Ok(sqlx::query_as::<_, Store>(&sql).bind(user_id).fetch_all(&self.pool).await?)
    }

    async fn find_store_for_user(&self, store_id: &str, user_id: &str) -> DbResult<Option<Store>> {
        let sql = format!(
            r#"SELECT {STORE_COLUMNS} FROM "stores" WHERE "id" = $1 AND "user_id" = $2 LIMIT 1"#
        );
        Ok(sqlx::query_as::<_, Store>(&sql)
            .bind(store_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_store(&self, store_id: &str, user_id: &str, input: StoreInput) -> DbResult<BatchPayload> {
        let result = sqlx::query(
            r#"UPDATE "stores" SET "name" = $1, "updated_at" = now() WHERE "id" = $2 AND "user_id" = $3"#,
        )
        .bind(&input.name)
        .bind(store_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(BatchPayload::new(result.rows_affected()))
    }

    async fn delete_store(&self, store_id: &str, user_id: &str) -> DbResult<BatchPayload> {
        let result = sqlx::query(r#"DELETE FROM "stores" WHERE "id" = $1 AND "user_id" = $2"#)
            .bind(store_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(BatchPayload::new(result.rows_affected()))
    }

    async fn create_billboard(&self, store_id: &str, input: BillboardInput) -> DbResult<Billboard> {
        let sql = format!(
            r#"INSERT INTO "billboards" ("id", "store_id", "label", "image_url") VALUES ($1, $2, $3, $4) RETURNING {BILLBOARD_COLUMNS}"#
        );
        Ok(sqlx::query_as::<_, Billboard>(&sql)
            .bind(new_id())
            .bind(store_id)
            .bind(&input.label)
            .bind(&input.image_url)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn list_billboards(&self, store_id: &str) -> DbResult<Vec<Billboard>> {
        let sql = format!(
            r#"SELECT {BILLBOARD_COLUMNS} FROM "billboards" WHERE "store_id" = $1 ORDER BY "created_at" DESC"#
        );
        Ok(sqlx::query_as::<_, Billboard>(&sql).bind(store_id).fetch_all(&self.pool).await?)
    }

    async fn find_billboard(&self, id: &str) -> DbResult<Option<Billboard>> {
        let sql = format!(r#"SELECT {BILLBOARD_COLUMNS} FROM "billboards" WHERE "id" = $1"#);
        Ok(sqlx::query_as::<_, Billboard>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn update_billboard(&self, id: &str, input: BillboardInput) -> DbResult<BatchPayload> {
        let result = sqlx::query(
            r#"UPDATE "billboards" SET "label" = $1, "image_url" = $2, "updated_at" = now() WHERE "id" = $3"#,
        )
        .bind(&input.label)
        .bind(&input.image_url)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(BatchPayload::new(result.rows_affected()))
    }

    async fn delete_billboard(&self, id: &str) -> DbResult<BatchPayload> {
        self.delete_by_id("billboards", id).await
    }

    async fn create_category(&self, store_id: &str, input: CategoryInput) -> DbResult<Category> {
        let sql = format!(
            r#"INSERT INTO "categories" ("id", "store_id", "billboard_id", "name") VALUES ($1, $2, $3, $4) RETURNING {CATEGORY_COLUMNS}"#
        );
        Ok(sqlx::query_as::<_, Category>(&sql)
            .bind(new_id())
            .bind(store_id)
            .bind(&input.billboard_id)
            .bind(&input.name)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn list_categories(&self, store_id: &str) -> DbResult<Vec<CategoryDetail>> {
        let sql = format!(
            r#"SELECT {CATEGORY_COLUMNS} FROM "categories" WHERE "store_id" = $1 ORDER BY "created_at" DESC"#
        );
        let categories = sqlx::query_as::<_, Category>(&sql)
            .bind(store_id)
            .fetch_all(&self.pool)
            .await?;
        self.attach_billboards(categories).await
    }

    async fn find_category(&self, id: &str) -> DbResult<Option<CategoryDetail>> {
        let sql = format!(r#"SELECT {CATEGORY_COLUMNS} FROM "categories" WHERE "id" = $1"#);
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match category {
            Some(category) => Ok(self.attach_billboards(vec![category]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn update_category(&self, id: &str, input: CategoryInput) -> DbResult<BatchPayload> {
        let result = sqlx::query(
            r#"UPDATE "categories" SET "name" = $1, "billboard_id" = $2, "updated_at" = now() WHERE "id" = $3"#,
        )
        .bind(&input.name)
        .bind(&input.billboard_id)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(BatchPayload::new(result.rows_affected()))
    }

    async fn delete_category(&self, id: &str) -> DbResult<BatchPayload> {
        self.delete_by_id("categories", id).await
    }

    async fn create_size(&self, store_id: &str, input: SwatchInput) -> DbResult<Size> {
        self.create_swatch("sizes", store_id, input).await
    }

    async fn list_sizes(&self, store_id: &str) -> DbResult<Vec<Size>> {
        self.list_swatches("sizes", store_id).await
    }

    async fn find_size(&self, id: &str) -> DbResult<Option<Size>> {
        self.find_swatch("sizes", id).await
    }

    async fn update_size(&self, id: &str, input: SwatchInput) -> DbResult<BatchPayload> {
        self.update_swatch("sizes", id, input).await
    }

    async fn delete_size(&self, id: &str) -> DbResult<BatchPayload> {
        self.delete_by_id("sizes", id).await
    }

    async fn create_color(&self, store_id: &str, input: SwatchInput) -> DbResult<Color> {
        self.create_swatch("colors", store_id, input).await
    }

    async fn list_colors(&self, store_id: &str) -> DbResult<Vec<Color>> {
        self.list_swatches("colors", store_id).await
    }

    async fn find_color(&self, id: &str) -> DbResult<Option<Color>> {
        self.find_swatch("colors", id).await
    }

    async fn update_color(&self, id: &str, input: SwatchInput) -> DbResult<BatchPayload> {
        self.update_swatch("colors", id, input).await
    }

    async fn delete_color(&self, id: &str) -> DbResult<BatchPayload> {
        self.delete_by_id("colors", id).await
    }

    async fn create_product(&self, store_id: &str, input: ProductInput) -> DbResult<Product> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"INSERT INTO "products" ("id", "store_id", "category_id", "size_id", "color_id", "name", "price", "is_featured", "is_archived")
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {PRODUCT_COLUMNS}"#
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(new_id())
            .bind(store_id)
            .bind(&input.category_id)
            .bind(&input.size_id)
            .bind(&input.color_id)
            .bind(&input.name)
            .bind(input.price)
            .bind(input.is_featured.unwrap_or(false))
            .bind(input.is_archived.unwrap_or(false))
            .fetch_one(&mut *tx)
            .await?;

        Self::insert_images(&mut tx, &product.id, &input.images).await?;
        tx.commit().await?;
        Ok(product)
    }

    async fn list_products(&self, store_id: &str, filter: &ProductFilter) -> DbResult<Vec<ProductDetail>> {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());
        let sql = format!(
            r#"SELECT {PRODUCT_COLUMNS} FROM "products"
               WHERE "store_id" = $1
                 AND "is_archived" = false
                 AND ($2::text IS NULL OR "category_id" = $2)
                 AND ($3::text IS NULL OR "color_id" = $3)
                 AND ($4::text IS NULL OR "size_id" = $4)
                 AND ($5 = false OR "is_featured" = true)
               ORDER BY "created_at" DESC"#
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(store_id)
            .bind(non_empty(&filter.category_id))
            .bind(non_empty(&filter.color_id))
            .bind(non_empty(&filter.size_id))
            .bind(filter.featured_only())
            .fetch_all(&self.pool)
            .await?;
        self.attach_relations(products).await
    }

    async fn find_product(&self, id: &str) -> DbResult<Option<ProductDetail>> {
        let sql = format!(r#"SELECT {PRODUCT_COLUMNS} FROM "products" WHERE "id" = $1"#);
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match product {
            Some(product) => Ok(self.attach_relations(vec![product]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn update_product(&self, store_id: &str, id: &str, input: ProductInput) -> DbResult<Product> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"UPDATE "products" SET
                 "name" = $1, "price" = $2, "category_id" = $3, "color_id" = $4, "size_id" = $5,
                 "is_featured" = COALESCE($6, "is_featured"),
                 "is_archived" = COALESCE($7, "is_archived"),
                 "store_id" = $8, "updated_at" = now()
               WHERE "id" = $9
               RETURNING {PRODUCT_COLUMNS}"#
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(&input.name)
            .bind(input.price)
            .bind(&input.category_id)
            .bind(&input.color_id)
            .bind(&input.size_id)
            .bind(input.is_featured)
            .bind(input.is_archived)
            .bind(store_id)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("product {id}")))?;

        sqlx::query(r#"DELETE FROM "images" WHERE "product_id" = $1"#)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        Self::insert_images(&mut tx, id, &input.images).await?;

        tx.commit().await?;
        Ok(product)
    }

    async fn delete_product(&self, id: &str) -> DbResult<BatchPayload> {
        self.delete_by_id("products", id).await
    }
}
