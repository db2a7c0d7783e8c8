//! Declarative field constraints shared by the server presence gate and the
//! client form validator.
//!
//! Each entity declares its writable fields once, in the order the server
//! checks them. The server only asks "is this value present?" (see
//! [`is_present`]); the client form applies the stricter per-kind rules in
//! [`crate::client::form`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a field is entered and validated on the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text, min length 1.
    Text,
    /// Id of another record picked from a list; validated like text.
    Reference,
    /// Numeric value; strings are coerced.
    Number,
    /// Optional boolean flag, never required.
    Flag,
    /// Ordered list of `{ "url": "..." }` objects.
    ImageList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    /// JSON key in the request body.
    pub key: &'static str,
    /// Human label used in forms.
    pub label: &'static str,
    pub kind: FieldKind,
    /// Server message when the field is missing; `None` for optional fields.
    pub required: Option<&'static str>,
}

impl FieldRule {
    const fn required(key: &'static str, label: &'static str, kind: FieldKind, message: &'static str) -> Self {
        Self { key, label, kind, required: Some(message) }
    }

    const fn optional(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { key, label, kind, required: None }
    }

    pub fn is_required(&self) -> bool {
        self.required.is_some()
    }
}

/// Field table for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySchema {
    pub fields: &'static [FieldRule],
}

impl EntitySchema {
    pub fn field(&self, key: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// First required field missing from `body`, in declared order.
    pub fn first_missing(&self, body: &Value) -> Option<&FieldRule> {
        self.fields
            .iter()
            .filter(|f| f.is_required())
            .find(|f| !is_present(f.kind, body.get(f.key)))
    }

    /// Empty form values: "" for text, 0 for numbers, false for flags, [] for images.
    pub fn empty_values(&self) -> Value {
        let mut map = serde_json::Map::new();
        for field in self.fields {
            let empty = match field.kind {
                FieldKind::Text | FieldKind::Reference => Value::String(String::new()),
                FieldKind::Number => Value::from(0),
                FieldKind::Flag => Value::Bool(false),
                FieldKind::ImageList => Value::Array(vec![]),
            };
            map.insert(field.key.to_string(), empty);
        }
        Value::Object(map)
    }
}

/// Truthiness test used by the server: absent, `null`, `false`, `0`, `NaN`
/// and `""` are missing; an image list must also be non-empty.
pub fn is_present(kind: FieldKind, value: Option<&Value>) -> bool {
    let Some(value) = value else {
        return false;
    };
    let truthy = match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    };
    match (kind, value) {
        (FieldKind::ImageList, Value::Array(items)) => !items.is_empty(),
        (FieldKind::ImageList, Value::String(s)) => !s.is_empty(),
        // Anything without a length counts as no images at all
        (FieldKind::ImageList, _) => false,
        _ => truthy,
    }
}

pub static STORE: EntitySchema = EntitySchema {
    fields: &[FieldRule::required("name", "Name", FieldKind::Text, "Name is required")],
};

pub static BILLBOARD: EntitySchema = EntitySchema {
    fields: &[
        FieldRule::required("label", "Label", FieldKind::Text, "Label is required"),
        FieldRule::required("imageUrl", "Background Image", FieldKind::Text, "Image URL is required"),
    ],
};

pub static CATEGORY: EntitySchema = EntitySchema {
    fields: &[
        FieldRule::required("name", "Name", FieldKind::Text, "Name is required"),
        FieldRule::required("billboardId", "Billboard", FieldKind::Reference, "Billboard ID is required"),
    ],
};

pub static SIZE: EntitySchema = EntitySchema {
    fields: &[
        FieldRule::required("name", "Name", FieldKind::Text, "Name is required"),
        FieldRule::required("value", "Value", FieldKind::Text, "Value Url is required"),
    ],
};

pub static COLOR: EntitySchema = EntitySchema {
    fields: &[
        FieldRule::required("name", "Name", FieldKind::Text, "Name is required"),
        FieldRule::required("value", "Value", FieldKind::Text, "Value is required"),
    ],
};

pub static PRODUCT: EntitySchema = EntitySchema {
    fields: &[
        FieldRule::required("name", "Name", FieldKind::Text, "Name is required"),
        FieldRule::required("categoryId", "Category", FieldKind::Reference, "Category Id is required"),
        FieldRule::required("price", "Price", FieldKind::Number, "Price is required"),
        FieldRule::required("colorId", "Color", FieldKind::Reference, "Color Id is required"),
        FieldRule::required("sizeId", "Size", FieldKind::Reference, "Size Id is required"),
        FieldRule::required("images", "Images", FieldKind::ImageList, "Images are required"),
        FieldRule::optional("isFeatured", "Featured", FieldKind::Flag),
        FieldRule::optional("isArchived", "Archived", FieldKind::Flag),
    ],
};

/// The store-scoped resources and the store itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Stores,
    Billboards,
    Categories,
    Sizes,
    Colors,
    Products,
}

impl Resource {
    pub const ALL: [Resource; 6] = [
        Resource::Stores,
        Resource::Billboards,
        Resource::Categories,
        Resource::Sizes,
        Resource::Colors,
        Resource::Products,
    ];

    /// URL segment, e.g. `billboards`.
    pub fn segment(&self) -> &'static str {
        match self {
            Resource::Stores => "stores",
            Resource::Billboards => "billboards",
            Resource::Categories => "categories",
            Resource::Sizes => "sizes",
            Resource::Colors => "colors",
            Resource::Products => "products",
        }
    }

    /// Capitalized singular, e.g. `Billboard`.
    pub fn singular(&self) -> &'static str {
        match self {
            Resource::Stores => "Store",
            Resource::Billboards => "Billboard",
            Resource::Categories => "Category",
            Resource::Sizes => "Size",
            Resource::Colors => "Color",
            Resource::Products => "Product",
        }
    }

    pub fn schema(&self) -> &'static EntitySchema {
        match self {
            Resource::Stores => &STORE,
            Resource::Billboards => &BILLBOARD,
            Resource::Categories => &CATEGORY,
            Resource::Sizes => &SIZE,
            Resource::Colors => &COLOR,
            Resource::Products => &PRODUCT,
        }
    }

    /// Message for a missing item id in the path.
    pub fn id_required(&self) -> &'static str {
        match self {
            Resource::Stores => "Store Id is required",
            Resource::Billboards => "Billboard Id is required",
            Resource::Categories => "Category Id is required",
            Resource::Sizes => "Size Id is required",
            Resource::Colors => "Color Id is required",
            Resource::Products => "Product Id is required",
        }
    }

    /// Upper-case prefix for log tags, e.g. `BILLBOARDS` in `[BILLBOARDS_PATCH]`.
    pub fn tag(&self) -> &'static str {
        match self {
            Resource::Stores => "STORES",
            Resource::Billboards => "BILLBOARDS",
            Resource::Categories => "CATEGORIES",
            Resource::Sizes => "SIZES",
            Resource::Colors => "COLORS",
            Resource::Products => "PRODUCTS",
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.segment())
    }
}

impl std::str::FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|r| r.segment() == s || r.singular().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown resource '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn presence_follows_truthiness() {
        assert!(!is_present(FieldKind::Text, None));
        assert!(!is_present(FieldKind::Text, Some(&json!(null))));
        assert!(!is_present(FieldKind::Text, Some(&json!(""))));
        assert!(!is_present(FieldKind::Number, Some(&json!(0))));
        assert!(!is_present(FieldKind::Flag, Some(&json!(false))));
        assert!(is_present(FieldKind::Number, Some(&json!("0"))));
        assert!(is_present(FieldKind::Number, Some(&json!(12.5))));
        assert!(is_present(FieldKind::Text, Some(&json!("x"))));
    }

    #[test]
    fn image_list_must_be_non_empty() {
        assert!(!is_present(FieldKind::ImageList, Some(&json!([]))));
        assert!(is_present(FieldKind::ImageList, Some(&json!([{ "url": "a" }]))));
        assert!(!is_present(FieldKind::ImageList, Some(&json!({}))));
        assert!(!is_present(FieldKind::ImageList, Some(&json!({ "url": "a" }))));
        assert!(!is_present(FieldKind::ImageList, Some(&json!(5))));
        assert!(!is_present(FieldKind::ImageList, Some(&json!(true))));
    }

    #[test]
    fn first_missing_uses_declared_order() {
        let body = json!({ "name": "Tee", "price": 10 });
        assert_eq!(PRODUCT.first_missing(&body).unwrap().required, Some("Category Id is required"));

        let body = json!({ "name": "Large" });
        assert_eq!(SIZE.first_missing(&body).unwrap().required, Some("Value Url is required"));

        let body = json!({ "name": "Large", "value": "L" });
        assert!(SIZE.first_missing(&body).is_none());
    }

    #[test]
    fn flags_are_never_required() {
        let body = json!({
            "name": "Tee", "categoryId": "c", "price": "9.99", "colorId": "k",
            "sizeId": "s", "images": [{ "url": "a" }]
        });
        assert!(PRODUCT.first_missing(&body).is_none());
    }

    #[test]
    fn empty_values_cover_every_field() {
        let empty = PRODUCT.empty_values();
        assert_eq!(empty["name"], json!(""));
        assert_eq!(empty["price"], json!(0));
        assert_eq!(empty["isFeatured"], json!(false));
        assert_eq!(empty["images"], json!([]));
    }

    #[test]
    fn resources_parse_from_segment_or_singular() {
        assert_eq!("billboards".parse::<Resource>().unwrap(), Resource::Billboards);
        assert_eq!("Color".parse::<Resource>().unwrap(), Resource::Colors);
        assert!("widgets".parse::<Resource>().is_err());
    }
}
