use std::io::Read;

use clap::{Args, Subcommand};
use serde_json::{json, Value};

use crate::cli::config::{load_environment_config, save_environment_config};
use crate::cli::utils::{output_record, output_success, output_table, resolve_store};
use crate::cli::OutputFormat;
use crate::client::{ApiClient, FormController, FormOutcome, Navigation, Notification};
use crate::schema::Resource;

#[derive(Args, Clone, Debug, Default)]
pub struct StoreArg {
    #[arg(long, help = "Store id (defaults to the current store)")]
    pub store: Option<String>,
}

#[derive(Subcommand)]
pub enum DataCommands {
    #[command(about = "Remember a store for later commands")]
    Use {
        #[arg(help = "Store id")]
        store_id: String,
    },

    #[command(about = "List records")]
    List {
        #[arg(help = "Resource: stores, billboards, categories, sizes, colors or products")]
        resource: Resource,
        #[command(flatten)]
        store: StoreArg,
        #[arg(long, help = "Products only: filter by category id")]
        category_id: Option<String>,
        #[arg(long, help = "Products only: filter by color id")]
        color_id: Option<String>,
        #[arg(long, help = "Products only: filter by size id")]
        size_id: Option<String>,
        #[arg(long, help = "Products only: featured products only")]
        featured: bool,
    },

    #[command(about = "Show one record")]
    Get {
        resource: Resource,
        id: String,
        #[command(flatten)]
        store: StoreArg,
    },

    #[command(about = "Create a record from JSON on stdin")]
    Create {
        resource: Resource,
        #[command(flatten)]
        store: StoreArg,
    },

    #[command(about = "Update a record from JSON on stdin (missing fields keep their values)")]
    Update {
        resource: Resource,
        id: String,
        #[command(flatten)]
        store: StoreArg,
    },

    #[command(about = "Delete a record")]
    Delete {
        resource: Resource,
        id: String,
        #[command(flatten)]
        store: StoreArg,
    },
}

pub async fn handle(cmd: DataCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut env = load_environment_config()?;

    if let DataCommands::Use { store_id } = &cmd {
        env.current_store = Some(store_id.clone());
        save_environment_config(&env)?;
        return output_success(output_format, &format!("Using store {}", store_id), Some(json!({ "store": store_id })));
    }

    let client = env.client()?;
    let current = env.current_store.clone();

    match cmd {
        DataCommands::Use { .. } => Ok(()),
        DataCommands::List { resource, store, category_id, color_id, size_id, featured } => {
            let path = match resource {
                Resource::Stores => "/api/stores".to_string(),
                r => {
                    let store_id = resolve_store(store.store, current)?;
                    let mut path = format!("/api/{}/{}", store_id, r.segment());
                    if r == Resource::Products {
                        path.push_str(&product_query(category_id, color_id, size_id, featured));
                    }
                    path
                }
            };
            let listing = client.get(&path).await?;
            output_table(output_format, resource, listing)
        }
        DataCommands::Get { resource, id, store } => {
            let store_id = store_scope(resource, store.store, current)?;
            let record = fetch_record(&client, resource, &store_id, &id).await?;
            output_record(output_format, resource, &record)
        }
        DataCommands::Create { resource, store } => {
            let store_id = store_scope(resource, store.store, current)?;
            let values = read_stdin_json()?;

            let mut form = controller(resource, &store_id, None);
            let outcome = form.submit(&client, &values).await;
            report(output_format, outcome)
        }
        DataCommands::Update { resource, id, store } => {
            let store_id = store_scope(resource, store.store, current)?;
            let existing = fetch_record(&client, resource, &store_id, &id).await?;
            if existing.is_null() {
                return Err(anyhow::anyhow!("{} '{}' not found", resource.singular(), id));
            }

            let mut form = controller(resource, &store_id, Some(existing));
            let mut values = form.default_values();
            if let (Some(target), Value::Object(patch)) = (values.as_object_mut(), read_stdin_json()?) {
                target.extend(patch);
            }

            let outcome = form.submit(&client, &values).await;
            report(output_format, outcome)
        }
        DataCommands::Delete { resource, id, store } => {
            let store_id = store_scope(resource, store.store, current)?;
            let mut form = controller(resource, &store_id, Some(json!({ "id": id })));
            form.request_delete();
            let outcome = form.confirm_delete(&client).await;
            report(output_format, outcome)
        }
    }
}

fn store_scope(resource: Resource, provided: Option<String>, current: Option<String>) -> anyhow::Result<String> {
    match resource {
        Resource::Stores => Ok(String::new()),
        _ => resolve_store(provided, current),
    }
}

fn controller(resource: Resource, store_id: &str, initial: Option<Value>) -> FormController {
    match resource {
        Resource::Stores => FormController::for_store(initial),
        r => FormController::new(r, store_id, initial),
    }
}

/// Stores have no single-record endpoint; pick the record out of the listing.
async fn fetch_record(client: &ApiClient, resource: Resource, store_id: &str, id: &str) -> anyhow::Result<Value> {
    match resource {
        Resource::Stores => {
            let stores = client.get("/api/stores").await?;
            Ok(stores
                .as_array()
                .and_then(|items| items.iter().find(|s| s.get("id").and_then(Value::as_str) == Some(id)))
                .cloned()
                .unwrap_or(Value::Null))
        }
        r => Ok(client.get(&format!("/api/{}/{}/{}", store_id, r.segment(), id)).await?),
    }
}

fn product_query(
    category_id: Option<String>,
    color_id: Option<String>,
    size_id: Option<String>,
    featured: bool,
) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    if let Some(v) = category_id {
        query.append_pair("categoryId", &v);
    }
    if let Some(v) = color_id {
        query.append_pair("colorId", &v);
    }
    if let Some(v) = size_id {
        query.append_pair("sizeId", &v);
    }
    if featured {
        query.append_pair("isFeatured", "true");
    }

    let encoded = query.finish();
    if encoded.is_empty() {
        encoded
    } else {
        format!("?{}", encoded)
    }
}

fn read_stdin_json() -> anyhow::Result<Value> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    serde_json::from_str(&input).map_err(|e| anyhow::anyhow!("stdin is not valid JSON: {}", e))
}

fn report(output_format: OutputFormat, outcome: FormOutcome) -> anyhow::Result<()> {
    match outcome {
        FormOutcome::Completed { notification, navigation, record } => {
            let message = match notification {
                Notification::Success(m) | Notification::Error(m) => m,
            };
            let next: Vec<String> = navigation
                .into_iter()
                .filter_map(|n| match n {
                    Navigation::Push(path) => Some(path),
                    Navigation::Refresh => None,
                })
                .collect();

            output_success(output_format, &message, Some(json!({ "record": record, "next": next })))?;
            if output_format == OutputFormat::Text {
                println!("{}", serde_json::to_string_pretty(&record)?);
            }
            Ok(())
        }
        FormOutcome::Invalid(issues) => {
            let detail: Vec<String> = issues.iter().map(|i| format!("{}: {}", i.field, i.message)).collect();
            Err(anyhow::anyhow!("Invalid input - {}", detail.join("; ")))
        }
        FormOutcome::Failed { notification, error } => {
            let message = match notification {
                Notification::Success(m) | Notification::Error(m) => m,
            };
            Err(anyhow::anyhow!("{} ({})", message, error))
        }
        FormOutcome::Ignored => Err(anyhow::anyhow!("Nothing to do")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_query_only_includes_given_filters() {
        assert_eq!(product_query(None, None, None, false), "");
        assert_eq!(
            product_query(Some("c1".into()), None, None, true),
            "?categoryId=c1&isFeatured=true"
        );
    }

    #[test]
    fn stores_need_no_scope() {
        assert_eq!(store_scope(Resource::Stores, None, None).unwrap(), "");
        assert!(store_scope(Resource::Sizes, None, None).is_err());
    }
}
