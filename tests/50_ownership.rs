mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn deleting_through_a_foreign_store_is_forbidden() -> Result<()> {
    let app = TestApp::new();
    let mine = app.catalog("user-1").await;
    let theirs = app.catalog("user-2").await;
    let product = app.product(&theirs, "Tee", &["a.png"]).await;

    // user-1 owns its own store but not store2.
    let res = app
        .delete(&format!("/api/{}/products/{}", theirs.store.id, product.id), Some("user-1"))
        .await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.text, "Unauthorized");

    let res = app.get(&format!("/api/{}/products/{}", theirs.store.id, product.id)).await?;
    assert_eq!(res.json()["name"], "Tee");

    // The caller's own store is fine.
    let own = app.product(&mine, "Mine", &["m.png"]).await;
    let res = app
        .delete(&format!("/api/{}/products/{}", mine.store.id, own.id), Some("user-1"))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn every_mutating_verb_checks_ownership() -> Result<()> {
    let app = TestApp::new();
    let store = app.store("owner", "Shop").await;
    let color = app.color(&store.id, "Black", "#000000").await;
    let body = json!({ "name": "White", "value": "#ffffff" });

    let collection = format!("/api/{}/colors", store.id);
    let item = format!("{}/{}", collection, color.id);

    assert_eq!(app.post(&collection, Some("stranger"), &body).await?.status, StatusCode::FORBIDDEN);
    assert_eq!(app.patch(&item, Some("stranger"), &body).await?.status, StatusCode::FORBIDDEN);
    assert_eq!(app.delete(&item, Some("stranger")).await?.status, StatusCode::FORBIDDEN);

    let res = app.get(&item).await?;
    assert_eq!(res.json()["name"], "Black");
    Ok(())
}

#[tokio::test]
async fn unknown_store_is_forbidden() -> Result<()> {
    let app = TestApp::new();

    let res = app
        .post("/api/nowhere/sizes", Some("user-1"), &json!({ "name": "Large", "value": "L" }))
        .await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn reads_skip_the_ownership_check() -> Result<()> {
    let app = TestApp::new();
    let store = app.store("owner", "Shop").await;
    let billboard = app.billboard(&store.id, "Sale").await;

    let res = app.get(&format!("/api/{}/billboards/{}", store.id, billboard.id)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["label"], "Sale");
    Ok(())
}

#[tokio::test]
async fn wrongly_typed_fields_from_a_stranger_are_forbidden() -> Result<()> {
    let app = TestApp::new();
    let theirs = app.catalog("owner").await;
    let product = app.product(&theirs, "Tee", &["a.png"]).await;

    let body = json!({
        "name": "Tee",
        "price": "cheap",
        "categoryId": theirs.category.id,
        "sizeId": theirs.size.id,
        "colorId": theirs.color.id,
        "images": [{ "url": "a.png" }],
    });
    let res = app
        .patch(&format!("/api/{}/products/{}", theirs.store.id, product.id), Some("stranger"), &body)
        .await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.text, "Unauthorized");

    let res = app
        .post(&format!("/api/{}/sizes", theirs.store.id), Some("stranger"), &json!({ "name": "L", "value": 5 }))
        .await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    // The owner gets past the gate and trips over the price instead.
    let res = app
        .patch(&format!("/api/{}/products/{}", theirs.store.id, product.id), Some("owner"), &body)
        .await?;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.text, "Internal error");
    Ok(())
}
