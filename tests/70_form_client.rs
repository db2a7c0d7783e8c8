mod common;

use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::{json, Value};

use common::TestApp;
use storefront_admin_api::client::{ApiClient, FormController, FormOutcome, Navigation, Notification};
use storefront_admin_api::schema::Resource;

fn completed(outcome: FormOutcome) -> (Notification, Vec<Navigation>, Value) {
    match outcome {
        FormOutcome::Completed { notification, navigation, record } => (notification, navigation, record),
        other => panic!("expected success, got {other:?}"),
    }
}

fn failed(outcome: FormOutcome) -> Notification {
    match outcome {
        FormOutcome::Failed { notification, .. } => notification,
        other => panic!("expected failure, got {other:?}"),
    }
}

/// Serve the in-memory app on a free port and return its base URL.
async fn serve(app: &TestApp) -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    let router = app.router.clone();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let base_url = format!("http://127.0.0.1:{}", port);
    let probe = ApiClient::new(&base_url)?;
    for _ in 0..50 {
        if probe.health().await.is_ok() {
            return Ok(base_url);
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    anyhow::bail!("server did not become ready on {}", base_url)
}

#[tokio::test]
async fn create_update_delete_billboard() -> Result<()> {
    let app = TestApp::new();
    let store = app.store("user-1", "Shop").await;
    let client = ApiClient::new(&serve(&app).await?)?.with_token(app.token("user-1"));

    let mut create = FormController::new(Resource::Billboards, &store.id, None);
    let outcome = create
        .submit(&client, &json!({ "label": "Sale", "imageUrl": "https://x/y.png" }))
        .await;
    let (notification, navigation, record) = completed(outcome);
    assert_eq!(notification, Notification::Success("Billboard created".to_string()));
    assert_eq!(
        navigation,
        vec![Navigation::Refresh, Navigation::Push(format!("/{}/billboards", store.id))]
    );
    assert!(!create.is_loading());

    let mut edit = FormController::new(Resource::Billboards, &store.id, Some(record.clone()));
    let mut values = edit.default_values();
    values["label"] = json!("Clearance");
    let outcome = edit.submit(&client, &values).await;
    assert!(
        matches!(&outcome, FormOutcome::Completed { record, .. } if record == &json!({ "count": 1 })),
        "{outcome:?}"
    );

    assert!(edit.request_delete());
    let outcome = edit.confirm_delete(&client).await;
    let (notification, navigation, _) = completed(outcome);
    assert_eq!(notification, Notification::Success("Billboard deleted".to_string()));
    assert_eq!(navigation, vec![Navigation::Refresh, Navigation::Push(format!("/{}", store.id))]);
    Ok(())
}

#[tokio::test]
async fn server_errors_collapse_to_generic_copy() -> Result<()> {
    let app = TestApp::new();
    let store = app.store("owner", "Shop").await;
    // Signed in as somebody who does not own the store.
    let client = ApiClient::new(&serve(&app).await?)?.with_token(app.token("stranger"));

    let mut form = FormController::new(Resource::Sizes, &store.id, None);
    let outcome = form.submit(&client, &json!({ "name": "Large", "value": "L" })).await;
    let notification = failed(outcome);
    assert_eq!(notification, Notification::Error("Something went wrong".to_string()));
    Ok(())
}

#[tokio::test]
async fn delete_failure_names_dependents() -> Result<()> {
    let app = TestApp::new();
    let store = app.store("user-1", "Shop").await;
    let billboard = app.billboard(&store.id, "Summer").await;
    app.category(&store.id, &billboard.id, "Shirts").await;
    let client = ApiClient::new(&serve(&app).await?)?.with_token(app.token("user-1"));

    let mut form = FormController::new(Resource::Billboards, &store.id, Some(serde_json::to_value(&billboard)?));
    form.request_delete();
    let outcome = form.confirm_delete(&client).await;
    let notification = failed(outcome);
    assert_eq!(
        notification,
        Notification::Error("Make sure you removed all categories using this billboard first.".to_string())
    );
    assert!(!form.is_confirming_delete());
    Ok(())
}

#[tokio::test]
async fn new_store_navigates_to_itself() -> Result<()> {
    let app = TestApp::new();
    let client = ApiClient::new(&serve(&app).await?)?.with_token(app.token("user-1"));

    let mut form = FormController::for_store(None);
    assert_eq!(form.title(), "Create store");
    let outcome = form.submit(&client, &json!({ "name": "Fresh" })).await;
    let (_, navigation, record) = completed(outcome);
    let id = record["id"].as_str().unwrap_or_default();
    assert_eq!(navigation, vec![Navigation::Push(format!("/{id}"))]);
    Ok(())
}
