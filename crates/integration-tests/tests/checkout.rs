//! Checkout integration tests.
//!
//! These tests require a `PostgreSQL` database at `STORE_TEST_DATABASE_URL`.
//!
//! Run with: cargo test -p awesome-store-integration-tests -- --ignored

#![allow(clippy::expect_used, clippy::unwrap_used)]

use reqwest::StatusCode;
use rust_decimal::Decimal;

use awesome_store_core::{OrderStatus, RoleSet};
use awesome_store_integration_tests::{TestContext, location};
use awesome_store_storefront::db::OrderRepository;

#[tokio::test]
#[ignore = "Requires PostgreSQL (STORE_TEST_DATABASE_URL)"]
async fn test_checkout_total_comes_from_server_prices() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user(&RoleSet::customer()).await;
    let lamp = ctx.create_product("19.99", 10).await;
    let mug = ctx.create_product("4.50", 10).await;

    let client = TestContext::client();
    ctx.login(&client, &user).await;
    ctx.add_to_cart(&client, lamp.id, 2).await;
    ctx.add_to_cart(&client, mug.id, 3).await;

    // A forged total field is not part of the form and must not matter
    let resp = client
        .post(ctx.url("/checkout"))
        .form(&[
            ("customer_name", "Test Customer"),
            ("customer_email", user.email.as_str()),
            ("total", "0.01"),
        ])
        .send()
        .await
        .expect("Checkout failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Order placed successfully!"));
    assert!(body.contains("$53.48"));

    let orders = OrderRepository::new(&ctx.pool)
        .list_for_user(user.id)
        .await
        .unwrap();
    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(order.order.total.amount(), Decimal::new(5348, 2));
    assert_eq!(order.order.status, OrderStatus::Pending);
    assert_eq!(order.item_count(), 5);

    assert_eq!(ctx.stock_of(lamp.id).await, 8);
    assert_eq!(ctx.stock_of(mug.id).await, 7);

    // Cart is emptied after a successful order
    let resp = client.get(ctx.url("/checkout")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/cart");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STORE_TEST_DATABASE_URL)"]
async fn test_checkout_requires_login() {
    let ctx = TestContext::new().await;
    let product = ctx.create_product("3.00", 5).await;

    let client = TestContext::client();
    ctx.add_to_cart(&client, product.id, 1).await;

    let resp = client
        .post(ctx.url("/checkout"))
        .form(&[("customer_name", "Anonymous"), ("customer_email", "anon@example.com")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
    assert_eq!(ctx.stock_of(product.id).await, 5);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STORE_TEST_DATABASE_URL)"]
async fn test_checkout_rejects_bad_contact_details() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user(&RoleSet::customer()).await;
    let product = ctx.create_product("3.00", 5).await;

    let client = TestContext::client();
    ctx.login(&client, &user).await;
    ctx.add_to_cart(&client, product.id, 1).await;

    let resp = client
        .post(ctx.url("/checkout"))
        .form(&[("customer_name", "Al"), ("customer_email", user.email.as_str())])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/checkout");

    let page = client.get(ctx.url("/checkout")).send().await.unwrap();
    let body = page.text().await.unwrap();
    assert!(body.contains("Please provide a valid full name (min 3 characters)."));
    assert_eq!(ctx.stock_of(product.id).await, 5);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STORE_TEST_DATABASE_URL)"]
async fn test_checkout_fails_when_stock_ran_out() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user(&RoleSet::customer()).await;
    let product = ctx.create_product("10.00", 3).await;

    let client = TestContext::client();
    ctx.login(&client, &user).await;
    ctx.add_to_cart(&client, product.id, 3).await;

    // Stock drops after the item went into the cart
    sqlx::query("UPDATE store.products SET quantity = 1 WHERE id = $1")
        .bind(product.id)
        .execute(&ctx.pool)
        .await
        .unwrap();

    let resp = client
        .post(ctx.url("/checkout"))
        .form(&[("customer_name", "Test Customer"), ("customer_email", user.email.as_str())])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/cart");

    assert_eq!(ctx.stock_of(product.id).await, 1);
    let orders = OrderRepository::new(&ctx.pool)
        .list_for_user(user.id)
        .await
        .unwrap();
    assert!(orders.is_empty());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STORE_TEST_DATABASE_URL)"]
async fn test_concurrent_checkouts_cannot_oversell() {
    let ctx = TestContext::new().await;
    let product = ctx.create_product("25.00", 1).await;

    let mut buyers = Vec::new();
    for _ in 0..4 {
        let user = ctx.create_user(&RoleSet::customer()).await;
        let client = TestContext::client();
        ctx.login(&client, &user).await;
        ctx.add_to_cart(&client, product.id, 1).await;
        buyers.push((user, client));
    }

    let attempts: Vec<_> = buyers
        .iter()
        .map(|(user, client)| {
            tokio::spawn(
                client
                    .post(ctx.url("/checkout"))
                    .form(&[
                        ("customer_name", "Racing Customer"),
                        ("customer_email", user.email.as_str()),
                    ])
                    .send(),
            )
        })
        .collect();

    let mut placed = 0;
    for attempt in attempts {
        let resp = attempt.await.unwrap().unwrap();
        if resp.status() == StatusCode::OK {
            placed += 1;
        }
    }

    assert_eq!(placed, 1);
    assert_eq!(ctx.stock_of(product.id).await, 0);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STORE_TEST_DATABASE_URL)"]
async fn test_redirect_flash_shows_on_next_page() {
    let ctx = TestContext::new().await;
    let client = TestContext::client();

    let resp = client.get(ctx.url("/checkout")).send().await.unwrap();
    assert_eq!(location(&resp), "/cart");
    let body = client.get(ctx.url("/cart")).send().await.unwrap().text().await.unwrap();
    assert!(body.contains(r#"alert-danger" role="alert">Your cart is empty."#));

    let resp = client.get(ctx.url("/product/not-a-number")).send().await.unwrap();
    assert_eq!(location(&resp), "/");
    let body = client.get(ctx.url("/")).send().await.unwrap().text().await.unwrap();
    assert!(body.contains("Invalid product id"));

    // Shown once
    let body = client.get(ctx.url("/")).send().await.unwrap().text().await.unwrap();
    assert!(!body.contains("Invalid product id"));
}
