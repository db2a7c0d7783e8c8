#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use storefront_admin_api::{
    app,
    auth::JwtIdentity,
    config::config,
    database::{
        models::{
            Billboard, BillboardInput, Category, CategoryInput, Color, Product, ProductInput, Size, Store,
            StoreInput, SwatchInput,
        },
        Database, MemoryDatabase,
    },
    AppState,
};

pub const SECRET: &str = "integration-test-secret";

/// Router over a fresh in-memory store, driven without a socket.
pub struct TestApp {
    pub router: Router,
    pub db: Arc<MemoryDatabase>,
    pub identity: JwtIdentity,
}

pub struct Response {
    pub status: StatusCode,
    pub text: String,
}

impl Response {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text).unwrap_or_else(|e| panic!("not JSON ({e}): {}", self.text))
    }
}

impl TestApp {
    pub fn new() -> Self {
        let db = Arc::new(MemoryDatabase::new());
        let identity = JwtIdentity::new(SECRET, 1);
        let state = AppState::new(db.clone(), Arc::new(identity.clone()));

        Self {
            router: app(state, config()),
            db,
            identity,
        }
    }

    pub fn token(&self, user_id: &str) -> String {
        self.identity.issue(user_id).expect("token")
    }

    pub async fn send(&self, method: Method, path: &str, user: Option<&str>, body: Option<&str>) -> Result<Response> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token(user)));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;

        Ok(Response {
            status,
            text: String::from_utf8(bytes.to_vec())?,
        })
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        self.send(Method::GET, path, None, None).await
    }

    pub async fn post(&self, path: &str, user: Option<&str>, body: &Value) -> Result<Response> {
        self.send(Method::POST, path, user, Some(&body.to_string())).await
    }

    pub async fn patch(&self, path: &str, user: Option<&str>, body: &Value) -> Result<Response> {
        self.send(Method::PATCH, path, user, Some(&body.to_string())).await
    }

    pub async fn delete(&self, path: &str, user: Option<&str>) -> Result<Response> {
        self.send(Method::DELETE, path, user, None).await
    }

    pub async fn store(&self, user: &str, name: &str) -> Store {
        self.db
            .create_store(user, StoreInput { name: name.to_string() })
            .await
            .expect("create store")
    }

    pub async fn billboard(&self, store_id: &str, label: &str) -> Billboard {
        self.db
            .create_billboard(
                store_id,
                BillboardInput {
                    label: label.to_string(),
                    image_url: format!("https://img.example.com/{label}.png"),
                },
            )
            .await
            .expect("create billboard")
    }

    pub async fn category(&self, store_id: &str, billboard_id: &str, name: &str) -> Category {
        self.db
            .create_category(
                store_id,
                CategoryInput {
                    name: name.to_string(),
                    billboard_id: billboard_id.to_string(),
                },
            )
            .await
            .expect("create category")
    }

    pub async fn size(&self, store_id: &str, name: &str, value: &str) -> Size {
        self.db
            .create_size(store_id, SwatchInput { name: name.to_string(), value: value.to_string() })
            .await
            .expect("create size")
    }

    pub async fn color(&self, store_id: &str, name: &str, value: &str) -> Color {
        self.db
            .create_color(store_id, SwatchInput { name: name.to_string(), value: value.to_string() })
            .await
            .expect("create color")
    }

    /// A store with one billboard, category, size and color, ready for products.
    pub async fn catalog(&self, user: &str) -> Catalog {
        let store = self.store(user, "Shop").await;
        let billboard = self.billboard(&store.id, "Summer").await;
        let category = self.category(&store.id, &billboard.id, "Shirts").await;
        let size = self.size(&store.id, "Large", "L").await;
        let color = self.color(&store.id, "Black", "#000000").await;
        Catalog { store, billboard, category, size, color }
    }

    pub async fn product(&self, catalog: &Catalog, name: &str, images: &[&str]) -> Product {
        self.db
            .create_product(
                &catalog.store.id,
                ProductInput {
                    name: name.to_string(),
                    price: "19.99".parse().expect("decimal"),
                    category_id: catalog.category.id.clone(),
                    size_id: catalog.size.id.clone(),
                    color_id: catalog.color.id.clone(),
                    images: images.iter().map(|s| s.to_string()).collect(),
                    is_featured: None,
                    is_archived: None,
                },
            )
            .await
            .expect("create product")
    }
}

pub struct Catalog {
    pub store: Store,
    pub billboard: Billboard,
    pub category: Category,
    pub size: Size,
    pub color: Color,
}
