//! Category API.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use awesome_store_core::{Capability, CategoryId};

use crate::db::{CategoryRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::ApiUser;
use crate::models::{Category, CategoryInput};
use crate::state::AppState;

fn not_found() -> AppError {
    AppError::NotFound("Category not found".to_owned())
}

fn parse_id(raw: &str) -> Result<CategoryId> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid Id".to_owned()))
}

fn map_repo(error: RepositoryError) -> AppError {
    match error {
        RepositoryError::NotFound => not_found(),
        RepositoryError::Conflict(msg) => AppError::Conflict(msg),
        other => other.into(),
    }
}

/// List categories.
pub async fn index(State(state): State<AppState>, _user: ApiUser) -> Result<Json<Vec<Category>>> {
    Ok(Json(CategoryRepository::new(state.pool()).list().await?))
}

/// Fetch one category.
pub async fn show(
    State(state): State<AppState>,
    _user: ApiUser,
    Path(id): Path<String>,
) -> Result<Json<Category>> {
    let id = parse_id(&id)?;
    CategoryRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// Create a category.
#[instrument(skip(state, user, input))]
pub async fn create(
    State(state): State<AppState>,
    user: ApiUser,
    Json(input): Json<CategoryInput>,
) -> Result<Json<Category>> {
    user.require(Capability::ManageCatalog)?;
    let input = input.normalized()?;

    let category = CategoryRepository::new(state.pool())
        .create(&input)
        .await
        .map_err(map_repo)?;

    tracing::info!(category_id = %category.id, slug = %category.slug, "Category created");
    Ok(Json(category))
}

/// Replace a category.
#[instrument(skip(state, user, input))]
pub async fn update(
    State(state): State<AppState>,
    user: ApiUser,
    Path(id): Path<String>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<Category>> {
    user.require(Capability::ManageCatalog)?;
    let id = parse_id(&id)?;
    let input = input.normalized()?;

    let category = CategoryRepository::new(state.pool())
        .update(id, &input)
        .await
        .map_err(map_repo)?;

    Ok(Json(category))
}

/// Delete a category.
#[instrument(skip(state, user))]
pub async fn delete(
    State(state): State<AppState>,
    user: ApiUser,
    Path(id): Path<String>,
) -> Result<&'static str> {
    user.require(Capability::ManageCatalog)?;
    let id = parse_id(&id)?;

    CategoryRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(map_repo)?;

    tracing::info!(category_id = %id, "Category deleted");
    Ok("deleted")
}
