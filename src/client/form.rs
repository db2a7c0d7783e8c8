//! Entity form controller: the create/edit/delete workflow behind each admin form.
//!
//! The controller validates values against the shared field table, picks the
//! request from its mode, and reports what the UI should do next as plain data
//! ([`Notification`] and [`Navigation`]). It never inspects the server's error
//! text; every failure collapses to a fixed message.

use serde_json::{Map, Number, Value};

use super::ApiClient;
use crate::schema::{FieldKind, FieldRule, Resource};

pub const GENERIC_FAILURE: &str = "Something went wrong";

const MIN_LENGTH: &str = "String must contain at least 1 character(s)";
const NOT_A_NUMBER: &str = "Expected number, received nan";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Re-fetch data for the current route.
    Refresh,
    Push(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome {
    /// Client-side validation failed; nothing was sent.
    Invalid(Vec<FieldIssue>),
    Completed {
        notification: Notification,
        navigation: Vec<Navigation>,
        record: Value,
    },
    Failed {
        notification: Notification,
        /// Underlying error, for logs only.
        error: String,
    },
    /// Delete without an open confirmation, or outside edit mode.
    Ignored,
}

/// Message shown when a delete is refused, usually because other records
/// still reference the one being deleted.
pub fn delete_failure_message(resource: Resource) -> &'static str {
    match resource {
        Resource::Stores => "Make sure you removed all products and categories first.",
        Resource::Billboards => "Make sure you removed all categories using this billboard first.",
        Resource::Categories => "Make sure you removed all products using this category first.",
        Resource::Sizes => "Make sure you removed all products using this size first.",
        Resource::Colors => "Make sure you removed all products using this color first.",
        Resource::Products => GENERIC_FAILURE,
    }
}

#[derive(Debug, Clone)]
pub struct FormController {
    resource: Resource,
    store_id: String,
    initial: Option<Value>,
    loading: bool,
    confirming_delete: bool,
}

impl FormController {
    /// Form for a store-scoped resource. `initial` is the existing record in
    /// edit mode, `None` in create mode.
    pub fn new(resource: Resource, store_id: impl Into<String>, initial: Option<Value>) -> Self {
        Self {
            resource,
            store_id: store_id.into(),
            initial: initial.filter(|v| !v.is_null()),
            loading: false,
            confirming_delete: false,
        }
    }

    /// Store settings (edit) or the new-store form (create).
    pub fn for_store(initial: Option<Value>) -> Self {
        let store_id = initial
            .as_ref()
            .and_then(|v| v.get("id"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Self::new(Resource::Stores, store_id, initial)
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn is_edit(&self) -> bool {
        self.record_id().is_some()
    }

    /// Controls are disabled while this is set.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_confirming_delete(&self) -> bool {
        self.confirming_delete
    }

    fn record_id(&self) -> Option<String> {
        self.initial
            .as_ref()
            .and_then(|v| v.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn noun(&self) -> String {
        self.resource.singular().to_lowercase()
    }

    pub fn title(&self) -> String {
        match (self.resource, self.is_edit()) {
            (Resource::Stores, true) => "Settings".to_string(),
            (_, true) => format!("Edit {}", self.noun()),
            (_, false) => format!("Create {}", self.noun()),
        }
    }

    pub fn description(&self) -> String {
        match (self.resource, self.is_edit()) {
            (Resource::Stores, true) => "Manage store preferences".to_string(),
            (Resource::Stores, false) => "Add a new store to manage products and categories".to_string(),
            (_, true) => format!("Edit a {}", self.noun()),
            (_, false) => format!("Add a new {}", self.noun()),
        }
    }

    pub fn toast_message(&self) -> String {
        let verb = if self.is_edit() { "updated" } else { "created" };
        format!("{} {}", self.resource.singular(), verb)
    }

    pub fn action(&self) -> &'static str {
        if self.is_edit() {
            "Update"
        } else {
            "Create"
        }
    }

    pub fn collection_path(&self) -> String {
        match self.resource {
            Resource::Stores => "/api/stores".to_string(),
            r => format!("/api/{}/{}", self.store_id, r.segment()),
        }
    }

    pub fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.collection_path(), id)
    }

    /// Values the form starts with: the record's fields in edit mode,
    /// empty values otherwise.
    pub fn default_values(&self) -> Value {
        let schema = self.resource.schema();
        let Some(initial) = &self.initial else {
            return schema.empty_values();
        };

        let mut values = Map::new();
        for field in schema.fields {
            let current = initial.get(field.key).unwrap_or(&Value::Null);
            let seeded = match field.kind {
                FieldKind::Text | FieldKind::Reference => {
                    Value::String(current.as_str().unwrap_or_default().to_string())
                }
                FieldKind::Number => coerce_number(current).map(Value::Number).unwrap_or_else(|| Value::from(0)),
                FieldKind::Flag => Value::Bool(current.as_bool().unwrap_or(false)),
                FieldKind::ImageList => Value::Array(
                    current
                        .as_array()
                        .map(|items| {
                            items
                                .iter()
                                .filter_map(|i| i.get("url").cloned())
                                .map(|url| serde_json::json!({ "url": url }))
                                .collect()
                        })
                        .unwrap_or_default(),
                ),
            };
            values.insert(field.key.to_string(), seeded);
        }
        Value::Object(values)
    }

    /// Client-side validation. Returns the cleaned field set that is sent to
    /// the server, or every field issue found.
    pub fn validate(&self, values: &Value) -> Result<Value, Vec<FieldIssue>> {
        let mut cleaned = Map::new();
        let mut issues = Vec::new();

        for field in self.resource.schema().fields {
            match check_field(field, values.get(field.key)) {
                Ok(v) => {
                    cleaned.insert(field.key.to_string(), v);
                }
                Err(message) => issues.push(FieldIssue { field: field.key, message }),
            }
        }

        if issues.is_empty() {
            Ok(Value::Object(cleaned))
        } else {
            Err(issues)
        }
    }

    /// Create or update, depending on the mode.
    pub async fn submit(&mut self, client: &ApiClient, values: &Value) -> FormOutcome {
        let data = match self.validate(values) {
            Ok(data) => data,
            Err(issues) => return FormOutcome::Invalid(issues),
        };

        self.loading = true;
        let result = match self.record_id() {
            Some(id) => client.patch(&self.item_path(&id), &data).await,
            None => client.post(&self.collection_path(), &data).await,
        };
        self.loading = false;

        match result {
            Ok(record) => FormOutcome::Completed {
                notification: Notification::Success(self.toast_message()),
                navigation: self.after_save(&record),
                record,
            },
            Err(e) => {
                tracing::warn!("{} form submit failed: {}", self.resource.singular(), e);
                FormOutcome::Failed {
                    notification: Notification::Error(GENERIC_FAILURE.to_string()),
                    error: e.to_string(),
                }
            }
        }
    }

    fn after_save(&self, record: &Value) -> Vec<Navigation> {
        match (self.resource, self.is_edit()) {
            (Resource::Stores, true) => vec![Navigation::Refresh],
            (Resource::Stores, false) => {
                let id = record.get("id").and_then(Value::as_str).unwrap_or_default();
                vec![Navigation::Push(format!("/{id}"))]
            }
            (r, _) => vec![
                Navigation::Refresh,
                Navigation::Push(format!("/{}/{}", self.store_id, r.segment())),
            ],
        }
    }

    /// Open the confirmation step. Only possible in edit mode and when idle.
    pub fn request_delete(&mut self) -> bool {
        if self.is_edit() && !self.loading {
            self.confirming_delete = true;
        }
        self.confirming_delete
    }

    pub fn cancel_delete(&mut self) {
        self.confirming_delete = false;
    }

    /// Delete the record after [`request_delete`](Self::request_delete).
    pub async fn confirm_delete(&mut self, client: &ApiClient) -> FormOutcome {
        let Some(id) = self.record_id().filter(|_| self.confirming_delete) else {
            return FormOutcome::Ignored;
        };

        self.loading = true;
        let result = client.delete(&self.item_path(&id)).await;
        self.loading = false;
        self.confirming_delete = false;

        match result {
            Ok(record) => {
                let home = match self.resource {
                    Resource::Stores => "/".to_string(),
                    _ => format!("/{}", self.store_id),
                };
                FormOutcome::Completed {
                    notification: Notification::Success(format!("{} deleted", self.resource.singular())),
                    navigation: vec![Navigation::Refresh, Navigation::Push(home)],
                    record,
                }
            }
            Err(e) => {
                tracing::warn!("{} delete failed: {}", self.resource.singular(), e);
                FormOutcome::Failed {
                    notification: Notification::Error(delete_failure_message(self.resource).to_string()),
                    error: e.to_string(),
                }
            }
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Strings and booleans coerce to numbers; anything unparsable is NaN.
fn coerce_number(value: &Value) -> Option<Number> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) if s.trim().is_empty() => 0.0,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => return None,
    };
    Number::from_f64(n)
}

fn check_text(value: Option<&Value>) -> Result<String, String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(MIN_LENGTH.to_string()),
        None | Some(Value::Null) => Err("Required".to_string()),
        Some(other) => Err(format!("Expected string, received {}", type_name(other))),
    }
}

fn check_field(rule: &FieldRule, value: Option<&Value>) -> Result<Value, String> {
    match rule.kind {
        FieldKind::Text | FieldKind::Reference => check_text(value).map(Value::String),
        FieldKind::Number => value
            .and_then(coerce_number)
            .map(Value::Number)
            .ok_or_else(|| NOT_A_NUMBER.to_string()),
        FieldKind::Flag => match value {
            None | Some(Value::Null) => Ok(Value::Bool(false)),
            Some(Value::Bool(b)) => Ok(Value::Bool(*b)),
            Some(other) => Err(format!("Expected boolean, received {}", type_name(other))),
        },
        FieldKind::ImageList => {
            let items = match value {
                Some(Value::Array(items)) => items,
                None | Some(Value::Null) => return Err("Required".to_string()),
                Some(other) => return Err(format!("Expected array, received {}", type_name(other))),
            };
            items
                .iter()
                .map(|item| check_text(item.get("url")).map(|url| serde_json::json!({ "url": url })))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn billboard() -> Value {
        json!({ "id": "b1", "storeId": "s1", "label": "Sale", "imageUrl": "https://x/y.png" })
    }

    #[test]
    fn copy_follows_mode() {
        let create = FormController::new(Resource::Billboards, "s1", None);
        assert_eq!(create.title(), "Create billboard");
        assert_eq!(create.description(), "Add a new billboard");
        assert_eq!(create.toast_message(), "Billboard created");
        assert_eq!(create.action(), "Create");

        let edit = FormController::new(Resource::Billboards, "s1", Some(billboard()));
        assert_eq!(edit.title(), "Edit billboard");
        assert_eq!(edit.description(), "Edit a billboard");
        assert_eq!(edit.toast_message(), "Billboard updated");
        assert_eq!(edit.action(), "Update");
    }

    #[test]
    fn null_initial_means_create() {
        let form = FormController::new(Resource::Sizes, "s1", Some(Value::Null));
        assert!(!form.is_edit());
    }

    #[test]
    fn paths_are_store_scoped() {
        let form = FormController::new(Resource::Colors, "s1", None);
        assert_eq!(form.collection_path(), "/api/s1/colors");
        assert_eq!(form.item_path("c9"), "/api/s1/colors/c9");

        let store = FormController::for_store(Some(json!({ "id": "s1", "name": "Shop" })));
        assert_eq!(store.item_path("s1"), "/api/stores/s1");
        assert_eq!(store.title(), "Settings");
    }

    #[test]
    fn defaults_seed_from_record() {
        let form = FormController::new(Resource::Billboards, "s1", Some(billboard()));
        assert_eq!(form.default_values(), json!({ "label": "Sale", "imageUrl": "https://x/y.png" }));

        let product = json!({
            "id": "p1", "name": "Tee", "price": "12.50", "categoryId": "c", "sizeId": "z", "colorId": "k",
            "isFeatured": true, "isArchived": false,
            "images": [{ "id": "i1", "productId": "p1", "url": "a.png" }]
        });
        let form = FormController::new(Resource::Products, "s1", Some(product));
        let values = form.default_values();
        assert_eq!(values["price"], json!(12.5));
        assert_eq!(values["images"], json!([{ "url": "a.png" }]));
        assert_eq!(values["isFeatured"], json!(true));
    }

    #[test]
    fn validation_reports_every_field() {
        let form = FormController::new(Resource::Products, "s1", None);
        let issues = form
            .validate(&json!({ "name": "", "price": "abc", "categoryId": "c", "sizeId": "z", "colorId": "k", "images": [] }))
            .unwrap_err();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0], FieldIssue { field: "name", message: MIN_LENGTH.to_string() });
        assert_eq!(issues[1], FieldIssue { field: "price", message: NOT_A_NUMBER.to_string() });
    }

    #[test]
    fn validation_coerces_and_defaults() {
        let form = FormController::new(Resource::Products, "s1", None);
        let cleaned = form
            .validate(&json!({
                "name": "Tee", "price": "19.99", "categoryId": "c", "sizeId": "z", "colorId": "k",
                "images": [{ "url": "a.png" }], "extra": "dropped"
            }))
            .unwrap();
        assert_eq!(cleaned["price"], json!(19.99));
        assert_eq!(cleaned["isFeatured"], json!(false));
        assert_eq!(cleaned["isArchived"], json!(false));
        assert!(cleaned.get("extra").is_none());
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        // Nothing listens here; the controller must not send a request at all.
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();

        let mut create = FormController::new(Resource::Billboards, "s1", None);
        assert!(!create.request_delete());
        assert_eq!(create.confirm_delete(&client).await, FormOutcome::Ignored);

        let mut edit = FormController::new(Resource::Billboards, "s1", Some(billboard()));
        assert_eq!(edit.confirm_delete(&client).await, FormOutcome::Ignored);
        assert!(edit.request_delete());
        edit.cancel_delete();
        assert!(!edit.is_confirming_delete());
    }

    #[tokio::test]
    async fn invalid_values_send_nothing() {
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let mut form = FormController::new(Resource::Sizes, "s1", None);
        let outcome = form.submit(&client, &json!({ "name": "Large" })).await;
        assert!(matches!(outcome, FormOutcome::Invalid(issues) if issues[0].field == "value"));
        assert!(!form.is_loading());
    }

    #[test]
    fn delete_failure_copy_names_the_dependents() {
        assert_eq!(
            delete_failure_message(Resource::Billboards),
            "Make sure you removed all categories using this billboard first."
        );
        assert_eq!(delete_failure_message(Resource::Products), GENERIC_FAILURE);
    }
}
