//! The fixed checks every mutating handler runs before touching storage:
//! identity, path ids, required body fields, then store ownership.

use std::str::FromStr;

use axum::body::Bytes;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::database::{models::Store, Database};
use crate::error::ApiError;
use crate::schema::EntitySchema;

pub const STORE_ID_REQUIRED: &str = "Store Id is required";

/// Step 1: a request without a recognized identity stops here.
pub fn require_identity(caller: Option<String>) -> Result<String, ApiError> {
    caller.filter(|id| !id.is_empty()).ok_or(ApiError::Unauthenticated)
}

/// Path identifiers must be non-empty.
pub fn require_param<'a>(value: &'a str, message: &'static str) -> Result<&'a str, ApiError> {
    if value.trim().is_empty() {
        Err(ApiError::Required(message))
    } else {
        Ok(value)
    }
}

/// Decode the JSON body. A malformed body is an internal error, not a 400.
pub fn parse_body(bytes: &Bytes) -> Result<Value, ApiError> {
    serde_json::from_slice(bytes).map_err(|e| ApiError::invalid_body(e.to_string()))
}

/// Required fields, checked in declared order; the first missing one wins.
pub fn require_fields(schema: &EntitySchema, body: &Value) -> Result<(), ApiError> {
    match schema.first_missing(body).and_then(|f| f.required) {
        Some(message) => Err(ApiError::Required(message)),
        None => Ok(()),
    }
}

/// Step 4: the store must exist and belong to the caller.
pub async fn require_store_owner(
    db: &dyn Database,
    store_id: &str,
    user_id: &str,
) -> Result<Store, ApiError> {
    db.find_store_for_user(store_id, user_id)
        .await?
        .ok_or(ApiError::Unauthorized)
}

/// Typed reads from a body that already passed [`require_fields`].
/// A present value of the wrong type is an internal error.
pub struct BodyReader<'a>(pub &'a Value);

impl<'a> BodyReader<'a> {
    pub fn text(&self, key: &str) -> Result<String, ApiError> {
        match self.0.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            other => Err(ApiError::invalid_body(format!("{key}: expected string, got {other:?}"))),
        }
    }

    pub fn decimal(&self, key: &str) -> Result<Decimal, ApiError> {
        let parsed = match self.0.get(key) {
            Some(Value::Number(n)) => {
                let s = n.to_string();
                Decimal::from_str(&s).or_else(|_| Decimal::from_scientific(&s)).ok()
            }
            Some(Value::String(s)) => Decimal::from_str(s.trim()).ok(),
            _ => None,
        };
        parsed.ok_or_else(|| ApiError::invalid_body(format!("{key}: expected a decimal number")))
    }

    /// Optional flag: absent or null means "not provided".
    pub fn flag(&self, key: &str) -> Result<Option<bool>, ApiError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(ApiError::invalid_body(format!("{key}: expected boolean, got {other}"))),
        }
    }

    /// Ordered `[{ "url": "..." }]` list.
    pub fn image_urls(&self, key: &str) -> Result<Vec<String>, ApiError> {
        let Some(Value::Array(items)) = self.0.get(key) else {
            return Err(ApiError::invalid_body(format!("{key}: expected an array")));
        };
        items
            .iter()
            .map(|item| {
                item.get("url")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| ApiError::invalid_body(format!("{key}: each entry needs a url")))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BILLBOARD, PRODUCT};
    use serde_json::json;

    #[test]
    fn identity_is_required() {
        assert!(matches!(require_identity(None), Err(ApiError::Unauthenticated)));
        assert!(matches!(require_identity(Some(String::new())), Err(ApiError::Unauthenticated)));
        assert_eq!(require_identity(Some("u".to_string())).unwrap(), "u");
    }

    #[test]
    fn empty_params_are_rejected() {
        let err = require_param("", STORE_ID_REQUIRED).unwrap_err();
        assert_eq!(err.message(), "Store Id is required");
        assert_eq!(require_param("store1", STORE_ID_REQUIRED).unwrap(), "store1");
    }

    #[test]
    fn malformed_body_is_internal() {
        let err = parse_body(&Bytes::from_static(b"{not json")).unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn missing_field_names_the_field() {
        let err = require_fields(&BILLBOARD, &json!({ "label": "Sale" })).unwrap_err();
        assert_eq!(err.message(), "Image URL is required");
        assert!(require_fields(&BILLBOARD, &json!({ "label": "Sale", "imageUrl": "u" })).is_ok());

        let err = require_fields(&PRODUCT, &json!({})).unwrap_err();
        assert_eq!(err.message(), "Name is required");
    }

    #[test]
    fn reader_parses_typed_values() {
        let body = json!({
            "price": 19.99, "text": "x", "flag": true,
            "images": [{ "url": "a" }, { "url": "b" }], "priceStr": "5.50"
        });
        let reader = BodyReader(&body);
        assert_eq!(reader.decimal("price").unwrap(), Decimal::new(1999, 2));
        assert_eq!(reader.decimal("priceStr").unwrap(), Decimal::new(550, 2));
        assert_eq!(reader.text("text").unwrap(), "x");
        assert_eq!(reader.flag("flag").unwrap(), Some(true));
        assert_eq!(reader.flag("missing").unwrap(), None);
        assert_eq!(reader.image_urls("images").unwrap(), vec!["a", "b"]);
        assert!(reader.text("price").is_err());
    }
}
