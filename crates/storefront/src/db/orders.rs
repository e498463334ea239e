//! Order repository.

use std::collections::HashMap;

use sqlx::{PgConnection, PgPool};

use awesome_store_core::{Email, OrderId, OrderStatus, Price, PricedLine, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderItem, OrderWithItems};

const ORDER_COLUMNS: &str =
    "id, user_id, customer_name, customer_email, total, status, created_at, updated_at";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's orders with their lines, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let orders: Vec<Order> = sqlx::query_as(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM store.orders
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        self.attach_items(orders).await
    }

    /// Every order with its lines, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(&self) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let orders: Vec<Order> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM store.orders ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        self.attach_items(orders).await
    }

    async fn attach_items(
        &self,
        orders: Vec<Order>,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<OrderId> = orders.iter().map(|o| o.id).collect();
        let items: Vec<OrderItem> = sqlx::query_as(
            r"
            SELECT order_id, product_id, name, unit_price, quantity
            FROM store.order_items
            WHERE order_id = ANY($1)
            ORDER BY order_id, id
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for item in items {
            by_order.entry(item.order_id).or_default().push(item);
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let items = by_order.remove(&order.id).unwrap_or_default();
                OrderWithItems { order, items }
            })
            .collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM store.orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(order)
    }

    /// Move an order from `from` to `to`.
    ///
    /// Returns `false` if the order was no longer in `from` status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE store.orders
            SET status = $3, updated_at = now()
            WHERE id = $1 AND status = $2
            ",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_all(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM store.orders")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // Checkout (transaction-bound)
    // =========================================================================

    /// Insert a pending order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn insert(
        conn: &mut PgConnection,
        user_id: UserId,
        customer_name: &str,
        customer_email: &Email,
        total: Price,
    ) -> Result<Order, RepositoryError> {
        let order = sqlx::query_as(&format!(
            r"
            INSERT INTO store.orders (user_id, customer_name, customer_email, total, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(customer_name)
        .bind(customer_email)
        .bind(total)
        .bind(OrderStatus::Pending)
        .fetch_one(&mut *conn)
        .await?;
        Ok(order)
    }

    /// Insert one order line from a priced cart line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn insert_item(
        conn: &mut PgConnection,
        order_id: OrderId,
        line: &PricedLine,
    ) -> Result<(), RepositoryError> {
        let quantity = i32::try_from(line.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!("quantity out of range: {}", line.quantity))
        })?;

        sqlx::query(
            r"
            INSERT INTO store.order_items (order_id, product_id, name, unit_price, quantity)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(order_id)
        .bind(line.product_id)
        .bind(&line.name)
        .bind(line.unit_price)
        .bind(quantity)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}
