//! Product API.
//!
//! Reads need any valid token; writes need `ManageCatalog`. Every write
//! drops the cached department list.

use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
};
use rust_decimal::Decimal;
use tracing::instrument;

use awesome_store_core::{Capability, ProductId};

use crate::db::{ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::ApiUser;
use crate::models::{Product, ProductInput, ProductUpdate};
use crate::services::uploads;
use crate::state::AppState;

fn not_found() -> AppError {
    AppError::NotFound("Product not found".to_owned())
}

fn parse_id(raw: &str) -> Result<ProductId> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid Id".to_owned()))
}

fn map_repo(error: RepositoryError) -> AppError {
    match error {
        RepositoryError::NotFound => not_found(),
        other => other.into(),
    }
}

fn multipart_error(error: &MultipartError) -> AppError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Image is larger than 2 MiB".to_owned())
    } else {
        AppError::BadRequest(error.body_text())
    }
}

/// Text fields of the create form, as submitted.
#[derive(Debug, Default)]
struct ProductForm {
    name: String,
    price: String,
    color: String,
    department: String,
    description: String,
    quantity: String,
    image: Option<String>,
}

impl ProductForm {
    fn set(&mut self, field: &str, value: String) {
        match field {
            "name" => self.name = value,
            "price" => self.price = value,
            "color" => self.color = value,
            "department" => self.department = value,
            "description" => self.description = value,
            "quantity" => self.quantity = value,
            // External image reference when no file is uploaded
            "image" => self.image = Some(value),
            other => tracing::debug!(field = other, "Ignoring unknown product field"),
        }
    }

    fn into_input(self) -> Result<ProductInput> {
        let price: Decimal = self
            .price
            .trim()
            .parse()
            .map_err(|_| AppError::BadRequest("Invalid price".to_owned()))?;
        let quantity = match self.quantity.trim() {
            "" => 0,
            raw => raw
                .parse::<i32>()
                .map_err(|_| AppError::BadRequest("Invalid quantity".to_owned()))?,
        };

        Ok(ProductInput::new(
            &self.name,
            price,
            &self.color,
            &self.department,
            &self.description,
            self.image,
            quantity,
        )?)
    }
}

/// List products.
pub async fn index(State(state): State<AppState>, _user: ApiUser) -> Result<Json<Vec<Product>>> {
    Ok(Json(ProductRepository::new(state.pool()).list_all().await?))
}

/// Fetch one product.
pub async fn show(
    State(state): State<AppState>,
    _user: ApiUser,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let id = parse_id(&id)?;
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// Create a product from a multipart form with an optional `image` file.
///
/// Non-image files are ignored.
#[instrument(skip(state, user, multipart))]
pub async fn create(
    State(state): State<AppState>,
    user: ApiUser,
    mut multipart: Multipart,
) -> Result<Json<Product>> {
    user.require(Capability::ManageCatalog)?;

    let mut form = ProductForm::default();
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e))?
    {
        let name = field.name().unwrap_or_default().to_owned();

        if let Some(file_name) = field.file_name().map(str::to_owned) {
            if name != "image" || !uploads::is_image(field.content_type()) {
                tracing::debug!(field = %name, file = %file_name, "Ignoring non-image upload");
                continue;
            }
            let bytes = field.bytes().await.map_err(|e| multipart_error(&e))?;
            if !bytes.is_empty() {
                upload = Some((file_name, bytes.to_vec()));
            }
            continue;
        }

        let value = field.text().await.map_err(|e| multipart_error(&e))?;
        form.set(&name, value);
    }

    // Validate before touching the disk
    let mut input = form.into_input()?;
    if let Some((file_name, bytes)) = upload {
        let stored = uploads::save_image(&state.config().upload_dir, &file_name, &bytes).await?;
        input.image = Some(stored);
    }

    let product = ProductRepository::new(state.pool()).create(&input).await?;
    state.catalog().invalidate().await;

    tracing::info!(product_id = %product.id, "Product created");
    Ok(Json(product))
}

/// Replace a product's editable fields from a JSON body.
#[instrument(skip(state, user, update))]
pub async fn update(
    State(state): State<AppState>,
    user: ApiUser,
    Path(id): Path<String>,
    Json(update): Json<ProductUpdate>,
) -> Result<Json<Product>> {
    user.require(Capability::ManageCatalog)?;
    let id = parse_id(&id)?;

    let products = ProductRepository::new(state.pool());
    let current = products.get(id).await?.ok_or_else(not_found)?;
    let input = update.into_input(&current)?;

    let product = products.update(id, &input).await.map_err(map_repo)?;
    state.catalog().invalidate().await;

    Ok(Json(product))
}

/// Delete a product. Past orders keep their name and price snapshot.
#[instrument(skip(state, user))]
pub async fn delete(
    State(state): State<AppState>,
    user: ApiUser,
    Path(id): Path<String>,
) -> Result<&'static str> {
    user.require(Capability::ManageCatalog)?;
    let id = parse_id(&id)?;

    let deleted = ProductRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(map_repo)?;
    state.catalog().invalidate().await;

    tracing::info!(product_id = %deleted.id, "Product deleted");
    Ok("deleted")
}
