//! JSON API integration tests.
//!
//! These tests require a `PostgreSQL` database at `STORE_TEST_DATABASE_URL`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use reqwest::{Client, StatusCode, multipart};
use serde_json::{Value, json};
use uuid::Uuid;

use awesome_store_core::{Role, RoleSet};
use awesome_store_integration_tests::TestContext;

const TOKEN_HEADER: &str = "x-auth-token";

async fn admin_token(ctx: &TestContext) -> String {
    let admin = ctx
        .create_user(&RoleSet::from_iter([Role::Customer, Role::Admin]))
        .await;
    ctx.api_token(&admin).await
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STORE_TEST_DATABASE_URL)"]
async fn test_public_products_need_no_token() {
    let ctx = TestContext::new().await;
    let product = ctx.create_product("9.99", 2).await;

    let resp = Client::new()
        .get(ctx.url("/api/public/products"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let products: Vec<Value> = resp.json().await.unwrap();
    assert!(products.iter().any(|p| p["name"] == product.name.as_str()));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STORE_TEST_DATABASE_URL)"]
async fn test_bad_credentials_get_no_token() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user(&RoleSet::customer()).await;

    let resp = Client::new()
        .post(ctx.url("/api/auth"))
        .json(&json!({ "email": user.email, "password": "wrong-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.text().await.unwrap(), "Invalid Email or Password");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STORE_TEST_DATABASE_URL)"]
async fn test_customer_token_cannot_write_catalog() {
    let ctx = TestContext::new().await;
    let customer = ctx.create_user(&RoleSet::customer()).await;
    let token = ctx.api_token(&customer).await;
    let product = ctx.create_product("9.99", 2).await;
    let client = Client::new();

    // Reads are allowed for any valid token
    let resp = client
        .get(ctx.url("/api/products"))
        .header(TOKEN_HEADER, &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .post(ctx.url("/api/categories"))
        .header(TOKEN_HEADER, &token)
        .json(&json!({ "name": "Sneaky" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = client
        .delete(ctx.url(&format!("/api/products/{}", product.id)))
        .header(TOKEN_HEADER, &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(ctx.stock_of(product.id).await, 2);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STORE_TEST_DATABASE_URL)"]
async fn test_token_of_deleted_user_is_rejected() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user(&RoleSet::customer()).await;
    let token = ctx.api_token(&user).await;

    sqlx::query("DELETE FROM store.users WHERE id = $1")
        .bind(user.id)
        .execute(&ctx.pool)
        .await
        .unwrap();

    let resp = Client::new()
        .get(ctx.url("/api/categories"))
        .header(TOKEN_HEADER, &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STORE_TEST_DATABASE_URL)"]
async fn test_admin_category_lifecycle() {
    let ctx = TestContext::new().await;
    let token = admin_token(&ctx).await;
    let client = Client::new();
    let name = format!("Lighting {}", Uuid::new_v4().simple());

    let resp = client
        .post(ctx.url("/api/categories"))
        .header(TOKEN_HEADER, &token)
        .json(&json!({ "name": name, "description": "Lamps and bulbs" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let created: Value = resp.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["name"], name.as_str());

    let resp = client
        .put(ctx.url(&format!("/api/categories/{id}")))
        .header(TOKEN_HEADER, &token)
        .json(&json!({ "name": name, "description": "Only lamps" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["description"], "Only lamps");

    let resp = client
        .delete(ctx.url(&format!("/api/categories/{id}")))
        .header(TOKEN_HEADER, &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(ctx.url(&format!("/api/categories/{id}")))
        .header(TOKEN_HEADER, &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.text().await.unwrap(), "Category not found");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STORE_TEST_DATABASE_URL)"]
async fn test_admin_creates_product_with_image() {
    let ctx = TestContext::new().await;
    let token = admin_token(&ctx).await;
    let name = format!("Uploaded Lamp {}", Uuid::new_v4().simple());
    let department = format!("Lighting-{}", Uuid::new_v4().simple());

    let image = multipart::Part::bytes(b"\x89PNG\r\n\x1a\nfake".to_vec())
        .file_name("my lamp.png")
        .mime_str("image/png")
        .unwrap();
    let form = multipart::Form::new()
        .text("name", name.clone())
        .text("price", "15.50")
        .text("color", "brass")
        .text("department", department.clone())
        .text("description", "A lamp")
        .text("quantity", "7")
        .part("image", image);

    let resp = Client::new()
        .post(ctx.url("/api/products"))
        .header(TOKEN_HEADER, &token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["name"], name.as_str());
    assert_eq!(created["quantity"], 7);

    let stored = created["image"].as_str().unwrap();
    assert!(stored.ends_with("my-lamp.png"));
    assert!(ctx.upload_dir.join(stored).exists());

    // The department filter picks up the new department right away
    let body = Client::new()
        .get(ctx.url(&format!("/?dept={department}")))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains(&name));
}
