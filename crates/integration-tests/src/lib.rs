//! End-to-end test harness for Awesome Store.
//!
//! Each [`TestContext`] migrates the test database, builds the real
//! application router and serves it on a random local port. Tests drive it
//! over HTTP with a cookie-storing `reqwest` client.
//!
//! # Running Tests
//!
//! ```bash
//! export STORE_TEST_DATABASE_URL=postgres://localhost/awesome_store_test
//! cargo test -p awesome-store-integration-tests -- --ignored
//! ```
//!
//! Tests share one database, so every fixture uses unique emails and names.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::net::SocketAddr;
use std::path::PathBuf;

use reqwest::{Client, StatusCode, header};
use rust_decimal::Decimal;
use secrecy::SecretString;
use sqlx::PgPool;
use tower_sessions_sqlx_store::PostgresStore;
use uuid::Uuid;

use awesome_store_core::{ProductId, RoleSet, UserId};
use awesome_store_storefront::db::{MIGRATOR, ProductRepository, create_pool};
use awesome_store_storefront::models::{Product, ProductInput};
use awesome_store_storefront::services::auth::AuthService;
use awesome_store_storefront::{AppState, StoreConfig, app};

/// JWT secret used by every test server.
pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Password given to every fixture user.
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// A user created directly in the database.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: UserId,
    pub email: String,
    pub password: String,
}

/// A running storefront on a random port.
pub struct TestContext {
    pub base_url: String,
    pub pool: PgPool,
    pub upload_dir: PathBuf,
}

impl TestContext {
    /// Migrate the test database and start a server.
    ///
    /// # Panics
    ///
    /// Panics if `STORE_TEST_DATABASE_URL` is unset or the database is
    /// unreachable.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("STORE_TEST_DATABASE_URL")
            .map(SecretString::from)
            .expect("STORE_TEST_DATABASE_URL must be set");
        let pool = create_pool(&database_url)
            .await
            .expect("Failed to connect to test database");

        MIGRATOR.run(&pool).await.expect("Failed to run migrations");
        PostgresStore::new(pool.clone())
            .migrate()
            .await
            .expect("Failed to migrate session store");

        let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let storefront_dir = manifest_dir.join("../storefront");
        let upload_dir = std::env::temp_dir().join(format!("awesome-store-{}", Uuid::new_v4()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local address");
        let base_url = format!("http://{addr}");

        let config = StoreConfig {
            database_url,
            host: addr.ip(),
            port: addr.port(),
            base_url: base_url.clone(),
            jwt_secret: SecretString::from(TEST_JWT_SECRET.to_owned()),
            static_dir: storefront_dir.join("static"),
            upload_dir: upload_dir.clone(),
            admin_spa_dir: storefront_dir.join("admin/build"),
            sentry_dsn: None,
            sentry_environment: None,
        };
        let router = app(AppState::new(config, pool.clone()));

        tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("Test server failed");
        });

        Self {
            base_url,
            pool,
            upload_dir,
        }
    }

    /// Absolute URL for a path on the test server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// A fresh browser-like client: own cookie jar, redirects not followed.
    #[must_use]
    pub fn client() -> Client {
        Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client")
    }

    /// Create a user with the given roles and [`TEST_PASSWORD`].
    pub async fn create_user(&self, roles: &RoleSet) -> TestUser {
        let email = unique_email();
        let user = AuthService::new(&self.pool)
            .create_user("Test User", &email, TEST_PASSWORD, roles)
            .await
            .expect("Failed to create test user");

        TestUser {
            id: user.id,
            email,
            password: TEST_PASSWORD.to_owned(),
        }
    }

    /// Insert a product with a unique name.
    pub async fn create_product(&self, price: &str, quantity: i32) -> Product {
        let input = ProductInput::new(
            &format!("Test Product {}", Uuid::new_v4()),
            price.parse::<Decimal>().expect("Bad test price"),
            "blue",
            "Testing",
            "Created by an integration test",
            None,
            quantity,
        )
        .expect("Invalid test product");

        ProductRepository::new(&self.pool)
            .create(&input)
            .await
            .expect("Failed to create test product")
    }

    /// Current stock of a product.
    pub async fn stock_of(&self, id: ProductId) -> i32 {
        ProductRepository::new(&self.pool)
            .get(id)
            .await
            .expect("Failed to load product")
            .expect("Product disappeared")
            .quantity
    }

    /// Log `client` in through the HTML form.
    pub async fn login(&self, client: &Client, user: &TestUser) {
        let resp = client
            .post(self.url("/login"))
            .form(&[("email", user.email.as_str()), ("password", user.password.as_str())])
            .send()
            .await
            .expect("Login request failed");

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/");
    }

    /// Exchange credentials for an API token.
    pub async fn api_token(&self, user: &TestUser) -> String {
        let resp = Client::new()
            .post(self.url("/api/auth"))
            .json(&serde_json::json!({ "email": user.email, "password": user.password }))
            .send()
            .await
            .expect("Token request failed");

        assert_eq!(resp.status(), StatusCode::OK);
        resp.text().await.expect("Failed to read token")
    }

    /// Add a product to the session cart.
    pub async fn add_to_cart(&self, client: &Client, id: ProductId, qty: u32) -> reqwest::Response {
        client
            .post(self.url(&format!("/add-cart/{id}")))
            .form(&[("qty", qty.to_string())])
            .send()
            .await
            .expect("Add to cart failed")
    }
}

/// A unique, valid email address.
#[must_use]
pub fn unique_email() -> String {
    format!("test-{}@example.com", Uuid::new_v4().simple())
}

/// `Location` header of a redirect, or an empty string.
#[must_use]
pub fn location(resp: &reqwest::Response) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}
