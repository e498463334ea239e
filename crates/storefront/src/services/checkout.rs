//! Checkout: turn a session cart into a persisted order.
//!
//! Everything between reading stock and decrementing it happens in one
//! transaction with the product rows locked, so an order never exists
//! without its stock having been taken, and two checkouts cannot sell the
//! same unit twice.

use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use awesome_store_core::{Cart, Email, OrderId, Price, StockShortage, UserId, price_cart};

use crate::db::{OrderRepository, ProductRepository, RepositoryError};

/// Minimum length of the contact name, after trimming.
pub const MIN_CUSTOMER_NAME_LENGTH: usize = 3;

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Please provide a valid full name (min 3 characters).")]
    InvalidName,

    #[error("Please provide a valid email address.")]
    InvalidEmail,

    #[error("Your session has expired or the cart is empty.")]
    EmptyCart,

    #[error("Items in your cart are no longer available.")]
    NothingAvailable,

    #[error(transparent)]
    InsufficientStock(#[from] StockShortage),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl CheckoutError {
    /// Whether the customer can fix this by editing the cart or form.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        !matches!(self, Self::Repository(_))
    }
}

impl From<sqlx::Error> for CheckoutError {
    fn from(error: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(error))
    }
}

/// Validated contact details for an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDetails {
    pub name: String,
    pub email: Email,
}

impl ContactDetails {
    /// Validate the checkout form.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidName` or `CheckoutError::InvalidEmail`.
    pub fn parse(name: &str, email: &str) -> Result<Self, CheckoutError> {
        let name = name.trim();
        if name.chars().count() < MIN_CUSTOMER_NAME_LENGTH {
            return Err(CheckoutError::InvalidName);
        }
        let email = Email::parse(email).map_err(|_| CheckoutError::InvalidEmail)?;

        Ok(Self {
            name: name.to_owned(),
            email,
        })
    }
}

/// The result of a successful checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub total: Price,
}

/// Place an order for everything in `cart`.
///
/// Lines whose product has disappeared are skipped. Prices come from the
/// locked product rows, never from the cart.
///
/// # Errors
///
/// - `EmptyCart` if the cart has no lines
/// - `NothingAvailable` if none of the carted products exist any more
/// - `InsufficientStock` if any line asks for more than is on hand
/// - `Repository` on database failure
///
/// On error the transaction is rolled back and nothing is written.
#[instrument(skip(pool, cart, contact), fields(user_id = %user_id, lines = cart.lines().len()))]
pub async fn place_order(
    pool: &PgPool,
    user_id: UserId,
    contact: &ContactDetails,
    cart: &Cart,
) -> Result<PlacedOrder, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let mut tx = pool.begin().await?;

    let snapshots = ProductRepository::lock_for_checkout(&mut tx, &cart.product_ids()).await?;
    let priced = price_cart(cart, &snapshots);
    if priced.is_empty() {
        return Err(CheckoutError::NothingAvailable);
    }
    priced.check_stock()?;

    let order = OrderRepository::insert(
        &mut tx,
        user_id,
        &contact.name,
        &contact.email,
        priced.total,
    )
    .await?;

    for line in &priced.lines {
        OrderRepository::insert_item(&mut tx, order.id, line).await?;

        let quantity = i32::try_from(line.quantity).unwrap_or(i32::MAX);
        let taken = ProductRepository::decrement_stock(&mut tx, line.product_id, quantity).await?;
        if !taken {
            return Err(CheckoutError::InsufficientStock(StockShortage {
                product_id: line.product_id,
                name: line.name.clone(),
                available: line.stock.max(0),
            }));
        }
    }

    tx.commit().await?;

    tracing::info!(order_id = %order.id, total = %order.total, "Order placed");

    Ok(PlacedOrder {
        order_id: order.id,
        total: order.total,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_name_is_trimmed_and_checked() {
        assert!(matches!(
            ContactDetails::parse("  Al ", "al@example.com"),
            Err(CheckoutError::InvalidName)
        ));
        let contact = ContactDetails::parse("  Ada Lovelace ", "ada@example.com").unwrap();
        assert_eq!(contact.name, "Ada Lovelace");
    }

    #[test]
    fn test_contact_email_is_normalized() {
        let contact = ContactDetails::parse("Ada", " Ada@Example.COM ").unwrap();
        assert_eq!(contact.email.as_str(), "ada@example.com");
    }

    #[test]
    fn test_contact_email_rejects_bad_shapes() {
        for bad in ["", "ada", "ada@", "@example.com", "ada@example", "a da@example.com", "a@b@c.com"] {
            assert!(
                matches!(ContactDetails::parse("Ada", bad), Err(CheckoutError::InvalidEmail)),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_shortage_message() {
        let err = CheckoutError::from(StockShortage {
            product_id: awesome_store_core::ProductId::new(1),
            name: "Mug".to_owned(),
            available: 2,
        });
        assert_eq!(err.to_string(), "Not enough stock for \"Mug\". Available: 2");
        assert!(err.is_user_facing());
    }
}
