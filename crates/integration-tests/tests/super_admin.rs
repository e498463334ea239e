//! Admin dashboard and order status integration tests.
//!
//! These tests require a `PostgreSQL` database at `STORE_TEST_DATABASE_URL`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use reqwest::{Client, StatusCode};

use awesome_store_core::{OrderId, OrderStatus, Role, RoleSet};
use awesome_store_integration_tests::{TestContext, location};
use awesome_store_storefront::db::OrderRepository;

/// Place a one-line order as a fresh customer and return its ID.
async fn place_order(ctx: &TestContext) -> OrderId {
    let customer = ctx.create_user(&RoleSet::customer()).await;
    let product = ctx.create_product("12.00", 5).await;

    let client = TestContext::client();
    ctx.login(&client, &customer).await;
    ctx.add_to_cart(&client, product.id, 1).await;
    let resp = client
        .post(ctx.url("/checkout"))
        .form(&[("customer_name", "Status Customer"), ("customer_email", customer.email.as_str())])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let orders = OrderRepository::new(&ctx.pool)
        .list_for_user(customer.id)
        .await
        .unwrap();
    orders[0].order.id
}

async fn admin_client(ctx: &TestContext) -> Client {
    let admin = ctx
        .create_user(&RoleSet::from_iter([Role::Customer, Role::Admin]))
        .await;
    let client = TestContext::client();
    ctx.login(&client, &admin).await;
    client
}

async fn set_status(ctx: &TestContext, client: &Client, id: &str, status: &str) -> reqwest::Response {
    client
        .post(ctx.url(&format!("/super-admin/orders/{id}/status")))
        .form(&[("status", status)])
        .send()
        .await
        .unwrap()
}

async fn status_of(ctx: &TestContext, id: OrderId) -> OrderStatus {
    OrderRepository::new(&ctx.pool)
        .get(id)
        .await
        .unwrap()
        .expect("Order disappeared")
        .status
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STORE_TEST_DATABASE_URL)"]
async fn test_dashboard_renders_for_admin() {
    let ctx = TestContext::new().await;
    place_order(&ctx).await;
    let client = admin_client(&ctx).await;

    let resp = client.get(ctx.url("/super-admin")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Dashboard"));
    assert!(body.contains("Customers"));
    assert!(body.contains("Orders"));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STORE_TEST_DATABASE_URL)"]
async fn test_order_status_follows_allowed_edges() {
    let ctx = TestContext::new().await;
    let order_id = place_order(&ctx).await;
    let client = admin_client(&ctx).await;
    let id = order_id.to_string();

    // Pending cannot skip straight to shipped
    let resp = set_status(&ctx, &client, &id, "shipped").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(status_of(&ctx, order_id).await, OrderStatus::Pending);

    let resp = set_status(&ctx, &client, &id, "paid").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/super-admin/orders");
    assert_eq!(status_of(&ctx, order_id).await, OrderStatus::Paid);

    let resp = client.get(ctx.url("/super-admin/orders")).send().await.unwrap();
    let body = resp.text().await.unwrap();
    assert!(body.contains(&format!("Order #{id} is now paid")));

    // Paid to paid is not an edge
    let resp = set_status(&ctx, &client, &id, "paid").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = set_status(&ctx, &client, &id, "refunded").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = set_status(&ctx, &client, &id, "shipped").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(status_of(&ctx, order_id).await, OrderStatus::Shipped);

    // Shipped is terminal
    let resp = set_status(&ctx, &client, &id, "cancelled").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STORE_TEST_DATABASE_URL)"]
async fn test_status_change_on_missing_order_is_404() {
    let ctx = TestContext::new().await;
    let client = admin_client(&ctx).await;

    let resp = set_status(&ctx, &client, "999999999", "paid").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STORE_TEST_DATABASE_URL)"]
async fn test_customer_cannot_change_status() {
    let ctx = TestContext::new().await;
    let order_id = place_order(&ctx).await;
    let customer = ctx.create_user(&RoleSet::customer()).await;
    let client = TestContext::client();
    ctx.login(&client, &customer).await;

    let resp = set_status(&ctx, &client, &order_id.to_string(), "paid").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(status_of(&ctx, order_id).await, OrderStatus::Pending);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STORE_TEST_DATABASE_URL)"]
async fn test_stale_status_update_is_rejected() {
    let ctx = TestContext::new().await;
    let order_id = place_order(&ctx).await;
    let orders = OrderRepository::new(&ctx.pool);

    // Two admins both saw the order as pending
    assert!(orders
        .set_status(order_id, OrderStatus::Pending, OrderStatus::Paid)
        .await
        .unwrap());
    assert!(!orders
        .set_status(order_id, OrderStatus::Pending, OrderStatus::Cancelled)
        .await
        .unwrap());

    assert_eq!(status_of(&ctx, order_id).await, OrderStatus::Paid);
}
