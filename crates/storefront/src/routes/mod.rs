//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Catalog page 1 (?dept=&min=&max=)
//! GET  /{page}                 - Catalog page N (non-numeric: 404)
//! GET  /product/{id}           - Product detail
//! GET  /categories             - Category listing
//! GET  /contact-us             - Contact page
//! GET  /health                 - Liveness
//! GET  /health/ready           - Readiness (database ping)
//!
//! # Cart (session)
//! GET  /cart                   - Priced cart
//! POST /add-cart/{id}          - Add (form: qty)
//! POST /cart/update/{id}       - Set quantity (form: qty)
//! POST /cart/remove/{id}       - Remove line
//!
//! # Checkout
//! GET  /checkout               - Summary and contact form
//! POST /checkout               - Place order (login required)
//!
//! # Auth
//! GET  /login     POST /login     - Session login (rate limited)
//! GET  /register  POST /register  - Registration (rate limited)
//! GET  /logout    POST /logout    - Destroy session
//!
//! # Account (login required)
//! GET  /my-account             - Order history
//!
//! # Admin (ViewDashboard / ManageOrders)
//! GET  /super-admin                       - Counts
//! GET  /super-admin/orders                - All orders
//! POST /super-admin/orders/{id}/status    - Change status (form: status)
//!
//! # JSON API
//! /api/...                     - See [`api`]
//!
//! # Static
//! /static/*                    - Assets and uploaded images
//! /admin, /admin/*             - Admin SPA build, falling back to index.html
//! ```

pub mod account;
pub mod api;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod shop;
pub mod super_admin;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::middleware::{
    auth_rate_limiter, create_session_layer, legacy_cart_middleware, request_id::request_id_of,
    request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Create the auth routes router.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            post(auth::login)
                .layer(auth_rate_limiter())
                .get(auth::login_page),
        )
        .route(
            "/register",
            post(auth::register)
                .layer(auth_rate_limiter())
                .get(auth::register_page),
        )
        .route("/logout", get(auth::logout).post(auth::logout))
}

/// Create the cart and checkout routes router.
fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show))
        .route("/add-cart/{id}", post(cart::add))
        .route("/cart/update/{id}", post(cart::update))
        .route("/cart/remove/{id}", post(cart::remove))
        .route("/checkout", get(checkout::show).post(checkout::place))
}

/// Create the admin page routes router (mounted at `/super-admin`).
fn super_admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(super_admin::dashboard))
        .route("/orders", get(super_admin::orders))
        .route("/orders/{id}/status", post(super_admin::update_status))
}

/// Create all HTML and API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(shop::home))
        .route("/product/{id}", get(shop::product))
        .route("/categories", get(shop::categories))
        .route("/contact-us", get(shop::contact))
        .route("/my-account", get(account::index))
        .merge(auth_routes())
        .merge(cart_routes())
        .nest("/super-admin", super_admin_routes())
        .nest("/api", api::routes())
        // Static routes above take priority over this catch-all
        .route("/{page}", get(shop::page))
}

/// Build the complete application with its middleware stack.
///
/// Serve it with `into_make_service_with_connect_info::<SocketAddr>()` so the
/// rate limiter can fall back to the peer address.
pub fn app(state: AppState) -> Router {
    let config = state.config();
    let session_layer = create_session_layer(state.pool(), config);

    let admin_spa = ServeDir::new(&config.admin_spa_dir)
        .fallback(ServeFile::new(config.admin_spa_dir.join("index.html")));

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .nest_service("/admin", admin_spa)
        .layer(from_fn(legacy_cart_middleware))
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = request_id_of(request).unwrap_or_default(),
            )
        }))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
