//! Session cart integration tests.
//!
//! These tests require a `PostgreSQL` database at `STORE_TEST_DATABASE_URL`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use reqwest::{StatusCode, header};

use awesome_store_integration_tests::{TestContext, location};

#[tokio::test]
#[ignore = "Requires PostgreSQL (STORE_TEST_DATABASE_URL)"]
async fn test_add_to_cart_caps_quantity_at_stock() {
    let ctx = TestContext::new().await;
    let product = ctx.create_product("12.00", 3).await;
    let client = TestContext::client();

    let resp = ctx.add_to_cart(&client, product.id, 50).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/cart");

    let body = client.get(ctx.url("/cart")).send().await.unwrap().text().await.unwrap();
    assert!(body.contains("Added to cart (Qty: 3)"));
    assert!(body.contains(&product.name));
    assert!(body.contains("$36.00"));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STORE_TEST_DATABASE_URL)"]
async fn test_add_out_of_stock_product_is_refused() {
    let ctx = TestContext::new().await;
    let product = ctx.create_product("12.00", 0).await;
    let client = TestContext::client();

    let resp = ctx.add_to_cart(&client, product.id, 1).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/product/{}", product.id));

    let body = client.get(ctx.url("/cart")).send().await.unwrap().text().await.unwrap();
    assert!(!body.contains(&product.name));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STORE_TEST_DATABASE_URL)"]
async fn test_unknown_products_vanish_from_cart() {
    let ctx = TestContext::new().await;
    let product = ctx.create_product("5.00", 10).await;
    let doomed = ctx.create_product("7.00", 10).await;
    let client = TestContext::client();

    ctx.add_to_cart(&client, product.id, 1).await;
    ctx.add_to_cart(&client, doomed.id, 1).await;

    sqlx::query("DELETE FROM store.products WHERE id = $1")
        .bind(doomed.id)
        .execute(&ctx.pool)
        .await
        .unwrap();

    let body = client.get(ctx.url("/cart")).send().await.unwrap().text().await.unwrap();
    assert!(body.contains(&product.name));
    assert!(!body.contains(&doomed.name));
    assert!(body.contains("$5.00"));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STORE_TEST_DATABASE_URL)"]
async fn test_legacy_cart_cookie_is_imported_once() {
    let ctx = TestContext::new().await;
    let product = ctx.create_product("8.00", 10).await;
    let client = TestContext::client();

    let legacy = format!(r#"j:[{{"id":"{}","qty":2}},"999999999","not-an-id"]"#, product.id);
    let resp = client
        .get(ctx.url("/cart"))
        .header(
            header::COOKIE,
            format!("cart={}", urlencoding::encode(&legacy)),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let expired = resp
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with("cart=;") && v.contains("Max-Age=0"));
    assert!(expired, "legacy cookie should be expired");

    let body = resp.text().await.unwrap();
    assert!(body.contains(&product.name));
    assert!(body.contains("$16.00"));

    // Now lives in the session
    let body = client.get(ctx.url("/cart")).send().await.unwrap().text().await.unwrap();
    assert!(body.contains("$16.00"));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STORE_TEST_DATABASE_URL)"]
async fn test_update_and_remove_cart_lines() {
    let ctx = TestContext::new().await;
    let product = ctx.create_product("2.50", 4).await;
    let client = TestContext::client();

    ctx.add_to_cart(&client, product.id, 1).await;

    let resp = client
        .post(ctx.url(&format!("/cart/update/{}", product.id)))
        .form(&[("qty", "9")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&resp), "/cart");
    let body = client.get(ctx.url("/cart")).send().await.unwrap().text().await.unwrap();
    assert!(body.contains("$10.00"));

    let resp = client
        .post(ctx.url(&format!("/cart/remove/{}", product.id)))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&resp), "/cart");
    let body = client.get(ctx.url("/cart")).send().await.unwrap().text().await.unwrap();
    assert!(body.contains("Your cart is empty."));
}
