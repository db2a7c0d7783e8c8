use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{Category, Color, Size};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub store_id: String,
    pub category_id: String,
    pub size_id: String,
    pub color_id: String,
    pub name: String,
    pub price: Decimal,
    pub is_featured: bool,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: String,
    pub product_id: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product with images, category, size and color expanded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub images: Vec<Image>,
    pub category: Option<Category>,
    pub size: Option<Size>,
    pub color: Option<Color>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    pub name: String,
    pub price: Decimal,
    pub category_id: String,
    pub size_id: String,
    pub color_id: String,
    /// Ordered image urls; replaces the whole collection on update.
    pub images: Vec<String>,
    /// `None` means "default on create, unchanged on update".
    pub is_featured: Option<bool>,
    pub is_archived: Option<bool>,
}

/// Listing filters accepted by `GET /api/:store_id/products`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub category_id: Option<String>,
    pub color_id: Option<String>,
    pub size_id: Option<String>,
    pub is_featured: Option<String>,
}

impl ProductFilter {
    /// Only the literal `true` narrows the listing; any other value is ignored.
    pub fn featured_only(&self) -> bool {
        self.is_featured.as_deref() == Some("true")
    }

    pub fn matches(&self, product: &Product) -> bool {
        if product.is_archived {
            return false;
        }
        if let Some(id) = self.category_id.as_deref().filter(|s| !s.is_empty()) {
            if product.category_id != id {
                return false;
            }
        }
        if let Some(id) = self.color_id.as_deref().filter(|s| !s.is_empty()) {
            if product.color_id != id {
                return false;
            }
        }
        if let Some(id) = self.size_id.as_deref().filter(|s| !s.is_empty()) {
            if product.size_id != id {
                return false;
            }
        }
        !self.featured_only() || product.is_featured
    }
}
