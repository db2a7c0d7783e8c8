mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn owner_creates_billboard() -> Result<()> {
    let app = TestApp::new();
    let store = app.store("user-1", "Shop").await;

    let res = app
        .post(
            &format!("/api/{}/billboards", store.id),
            Some("user-1"),
            &json!({ "label": "Sale", "imageUrl": "https://x/y.png" }),
        )
        .await?;

    assert_eq!(res.status, StatusCode::OK, "{}", res.text);
    let body = res.json();
    assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert_eq!(body["label"], "Sale");
    assert_eq!(body["imageUrl"], "https://x/y.png");
    assert_eq!(body["storeId"], store.id.as_str());
    Ok(())
}

#[tokio::test]
async fn required_fields_are_checked_in_order() -> Result<()> {
    let app = TestApp::new();
    let store = app.store("user-1", "Shop").await;
    let path = format!("/api/{}/billboards", store.id);

    let res = app.post(&path, Some("user-1"), &json!({})).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.text, "Label is required");

    let res = app.post(&path, Some("user-1"), &json!({ "label": "Sale", "imageUrl": "" })).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.text, "Image URL is required");
    Ok(())
}

#[tokio::test]
async fn list_and_show() -> Result<()> {
    let app = TestApp::new();
    let store = app.store("user-1", "Shop").await;
    let first = app.billboard(&store.id, "First").await;
    app.billboard(&store.id, "Second").await;

    let res = app.get(&format!("/api/{}/billboards", store.id)).await?;
    let labels: Vec<_> = res.json().as_array().cloned().unwrap_or_default()
        .into_iter()
        .map(|b| b["label"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(labels, vec!["Second", "First"]);

    let res = app.get(&format!("/api/{}/billboards/{}", store.id, first.id)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["label"], "First");
    Ok(())
}

#[tokio::test]
async fn patch_replaces_and_reports_count() -> Result<()> {
    let app = TestApp::new();
    let store = app.store("user-1", "Shop").await;
    let billboard = app.billboard(&store.id, "Old").await;
    let item = format!("/api/{}/billboards/{}", store.id, billboard.id);

    let res = app
        .patch(&item, Some("user-1"), &json!({ "label": "New", "imageUrl": "https://x/new.png" }))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json(), json!({ "count": 1 }));

    let res = app.get(&item).await?;
    assert_eq!(res.json()["label"], "New");
    assert_eq!(res.json()["imageUrl"], "https://x/new.png");
    Ok(())
}

#[tokio::test]
async fn delete_is_idempotent() -> Result<()> {
    let app = TestApp::new();
    let store = app.store("user-1", "Shop").await;
    let billboard = app.billboard(&store.id, "Sale").await;
    let item = format!("/api/{}/billboards/{}", store.id, billboard.id);

    let res = app.delete(&item, Some("user-1")).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json(), json!({ "count": 1 }));

    let res = app.delete(&item, Some("user-1")).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json(), json!({ "count": 0 }));

    let res = app.get(&item).await?;
    assert_eq!(res.text, "null");
    Ok(())
}

#[tokio::test]
async fn billboard_in_use_cannot_be_deleted() -> Result<()> {
    let app = TestApp::new();
    let store = app.store("user-1", "Shop").await;
    let billboard = app.billboard(&store.id, "Sale").await;
    app.category(&store.id, &billboard.id, "Shirts").await;

    let res = app
        .delete(&format!("/api/{}/billboards/{}", store.id, billboard.id), Some("user-1"))
        .await?;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.text, "Internal error");
    Ok(())
}

#[tokio::test]
async fn malformed_body_is_an_internal_error() -> Result<()> {
    let app = TestApp::new();
    let store = app.store("user-1", "Shop").await;

    let res = app
        .send(Method::POST, &format!("/api/{}/billboards", store.id), Some("user-1"), Some("{not json"))
        .await?;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.text, "Internal error");
    Ok(())
}

#[tokio::test]
async fn categories_expand_their_billboard() -> Result<()> {
    let app = TestApp::new();
    let store = app.store("user-1", "Shop").await;
    let billboard = app.billboard(&store.id, "Summer").await;

    let res = app
        .post(
            &format!("/api/{}/categories", store.id),
            Some("user-1"),
            &json!({ "name": "Shirts" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.text, "Billboard ID is required");

    let res = app
        .post(
            &format!("/api/{}/categories", store.id),
            Some("user-1"),
            &json!({ "name": "Shirts", "billboardId": billboard.id }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    let id = res.json()["id"].as_str().unwrap_or_default().to_string();

    let res = app.get(&format!("/api/{}/categories/{}", store.id, id)).await?;
    assert_eq!(res.json()["billboard"]["label"], "Summer");
    Ok(())
}
