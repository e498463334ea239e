//! Product repository.
//!
//! Pool-bound queries live on [`ProductRepository`]. The two checkout steps
//! that must share a transaction take a `&mut PgConnection` instead.

use sqlx::{PgConnection, PgPool};

use awesome_store_core::{Price, ProductId, ProductSnapshot};

use super::RepositoryError;
use crate::models::{Product, ProductFilter, ProductInput};

const PRODUCT_COLUMNS: &str = "id, name, price, color, department, description, image, quantity, created_at, updated_at";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All products, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let products =
            sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM store.products ORDER BY id"))
                .fetch_all(self.pool)
                .await?;
        Ok(products)
    }

    /// One page of products matching the filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_page(
        &self,
        filter: &ProductFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM store.products
            WHERE ($1::text IS NULL OR department = $1)
              AND ($2::numeric IS NULL OR price >= $2)
              AND ($3::numeric IS NULL OR price <= $3)
            ORDER BY id
            LIMIT $4 OFFSET $5
            "
        ))
        .bind(filter.department.as_deref())
        .bind(filter.min_price)
        .bind(filter.max_price)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// Number of products matching the filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, filter: &ProductFilter) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*)
            FROM store.products
            WHERE ($1::text IS NULL OR department = $1)
              AND ($2::numeric IS NULL OR price >= $2)
              AND ($3::numeric IS NULL OR price <= $3)
            ",
        )
        .bind(filter.department.as_deref())
        .bind(filter.min_price)
        .bind(filter.max_price)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// Total number of products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_all(&self) -> Result<i64, RepositoryError> {
        self.count(&ProductFilter::default()).await
    }

    /// Distinct non-empty departments, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn departments(&self) -> Result<Vec<String>, RepositoryError> {
        let departments = sqlx::query_scalar(
            r"
            SELECT DISTINCT department
            FROM store.products
            WHERE department <> ''
            ORDER BY department
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(departments)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM store.products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(product)
    }

    /// Get every product whose ID is in `ids`. Unknown IDs are skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let products = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM store.products WHERE id = ANY($1) ORDER BY id"
        ))
        .bind(ids)
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as(&format!(
            r"
            INSERT INTO store.products (name, price, color, department, description, image, quantity)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&input.name)
        .bind(input.price)
        .bind(&input.color)
        .bind(&input.department)
        .bind(&input.description)
        .bind(input.image.as_deref())
        .bind(input.quantity)
        .fetch_one(self.pool)
        .await?;
        Ok(product)
    }

    /// Replace every editable field of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this ID.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let product: Option<Product> = sqlx::query_as(&format!(
            r"
            UPDATE store.products
            SET name = $2, price = $3, color = $4, department = $5,
                description = $6, image = $7, quantity = $8, updated_at = now()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&input.name)
        .bind(input.price)
        .bind(&input.color)
        .bind(&input.department)
        .bind(&input.description)
        .bind(input.image.as_deref())
        .bind(input.quantity)
        .fetch_optional(self.pool)
        .await?;

        product.ok_or(RepositoryError::NotFound)
    }

    /// Delete a product, returning it.
    ///
    /// Order lines keep their snapshot and lose the product reference.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this ID.
    pub async fn delete(&self, id: ProductId) -> Result<Product, RepositoryError> {
        let product: Option<Product> = sqlx::query_as(&format!(
            "DELETE FROM store.products WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        product.ok_or(RepositoryError::NotFound)
    }

    // =========================================================================
    // Checkout (transaction-bound)
    // =========================================================================

    /// Lock the given products for the rest of the transaction.
    ///
    /// Rows are locked in ID order so concurrent checkouts cannot deadlock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lock_for_checkout(
        conn: &mut PgConnection,
        ids: &[ProductId],
    ) -> Result<Vec<ProductSnapshot>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<(ProductId, String, Price, i32)> = sqlx::query_as(
            r"
            SELECT id, name, price, quantity
            FROM store.products
            WHERE id = ANY($1)
            ORDER BY id
            FOR UPDATE
            ",
        )
        .bind(ids)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, price, stock)| ProductSnapshot {
                id,
                name,
                price,
                stock,
            })
            .collect())
    }

    /// Take `quantity` units out of stock.
    ///
    /// Returns `false` (and changes nothing) when fewer units are on hand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn decrement_stock(
        conn: &mut PgConnection,
        id: ProductId,
        quantity: i32,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE store.products
            SET quantity = quantity - $2, updated_at = now()
            WHERE id = $1 AND quantity >= $2
            ",
        )
        .bind(id)
        .bind(quantity)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

