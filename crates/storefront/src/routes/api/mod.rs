//! JSON API.
//!
//! `GET /api/public/products` is open; `POST /api/auth` exchanges
//! credentials for a token; everything else needs a valid `x-auth-token`
//! (see [`ApiUser`](crate::middleware::ApiUser)). Writes additionally need
//! [`Capability::ManageCatalog`](awesome_store_core::Capability::ManageCatalog).

pub mod auth;
pub mod categories;
pub mod products;
pub mod public;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::services::uploads::MAX_IMAGE_BYTES;
use crate::state::AppState;

/// Room for the text fields and multipart framing around an image.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the API router (mounted at `/api`).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth", post(auth::token).layer(auth_rate_limiter()))
        .route("/public/products", get(public::products))
        .route(
            "/categories",
            get(categories::index).post(categories::create),
        )
        .route(
            "/categories/{id}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::delete),
        )
        .route(
            "/products",
            get(products::index).post(products::create).layer(DefaultBodyLimit::max(
                MAX_IMAGE_BYTES + MULTIPART_OVERHEAD_BYTES,
            )),
        )
        .route(
            "/products/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}
