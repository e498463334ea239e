//! Wiping users keeps the order history.
//!
//! Kept in its own test binary: deleting every user would pull the rug out
//! from under tests running alongside it.
//!
//! Run with: cargo test -p awesome-store-integration-tests -- --ignored

#![allow(clippy::expect_used, clippy::unwrap_used)]

use reqwest::StatusCode;

use awesome_store_core::{OrderStatus, RoleSet};
use awesome_store_integration_tests::TestContext;
use awesome_store_storefront::db::{OrderRepository, UserRepository};

#[tokio::test]
#[ignore = "Requires PostgreSQL (STORE_TEST_DATABASE_URL)"]
async fn test_orders_survive_deleting_all_users() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user(&RoleSet::customer()).await;
    let product = ctx.create_product("7.25", 3).await;

    let client = TestContext::client();
    ctx.login(&client, &user).await;
    ctx.add_to_cart(&client, product.id, 2).await;
    let resp = client
        .post(ctx.url("/checkout"))
        .form(&[("customer_name", "Reset Customer"), ("customer_email", user.email.as_str())])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let orders = OrderRepository::new(&ctx.pool);
    let placed = orders.list_for_user(user.id).await.unwrap();
    assert_eq!(placed.len(), 1);
    let order_id = placed[0].order.id;
    let before = orders.count_all().await.unwrap();

    let deleted = UserRepository::new(&ctx.pool).delete_all().await.unwrap();
    assert!(deleted >= 1);

    assert_eq!(orders.count_all().await.unwrap(), before);
    let kept = orders.get(order_id).await.unwrap().expect("order was deleted");
    assert_eq!(kept.user_id, None);
    assert_eq!(kept.customer_name, "Reset Customer");
    assert_eq!(kept.customer_email.as_str(), user.email);
    assert_eq!(kept.status, OrderStatus::Pending);
}
