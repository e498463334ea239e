//! Unauthenticated API endpoints.

use axum::{Json, extract::State};

use crate::db::ProductRepository;
use crate::error::Result;
use crate::models::Product;
use crate::state::AppState;

/// All products.
pub async fn products(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(ProductRepository::new(state.pool()).list_all().await?))
}
