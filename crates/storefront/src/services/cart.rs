//! Session-backed cart storage and pricing.

use std::collections::HashSet;

use sqlx::PgPool;
use tower_sessions::Session;

use awesome_store_core::{Cart, PricedCart, ProductId, price_cart};

use crate::db::ProductRepository;
use crate::error::AppError;
use crate::models::{Product, session_keys};

/// Load the cart from the session (empty if none).
///
/// # Errors
///
/// Returns `AppError::Session` if the session store fails.
pub async fn load(session: &Session) -> Result<Cart, AppError> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

/// Store the cart in the session.
///
/// # Errors
///
/// Returns `AppError::Session` if the session store fails.
pub async fn save(session: &Session, cart: &Cart) -> Result<(), AppError> {
    session.insert(session_keys::CART, cart).await?;
    Ok(())
}

/// Remove the cart from the session.
///
/// # Errors
///
/// Returns `AppError::Session` if the session store fails.
pub async fn clear(session: &Session) -> Result<(), AppError> {
    session.remove::<Cart>(session_keys::CART).await?;
    Ok(())
}

/// A cart priced against current product rows.
#[derive(Debug, Clone)]
pub struct CartView {
    pub cart: Cart,
    pub priced: PricedCart,
    pub products: Vec<Product>,
}

impl CartView {
    /// The product row behind a priced line.
    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}

/// Load the session cart, drop products that no longer exist, and price it.
///
/// The cleaned cart is written back when anything was dropped.
///
/// # Errors
///
/// Returns `AppError` if the session store or database fails.
pub async fn load_priced(pool: &PgPool, session: &Session) -> Result<CartView, AppError> {
    let mut cart = load(session).await?;
    let products = ProductRepository::new(pool)
        .get_many(&cart.product_ids())
        .await?;

    let known: HashSet<ProductId> = products.iter().map(|p| p.id).collect();
    if cart.retain_known(&known) {
        tracing::debug!("Dropped unknown products from cart");
        save(session, &cart).await?;
    }

    let snapshots: Vec<_> = products.iter().map(Product::snapshot).collect();
    let priced = price_cart(&cart, &snapshots);

    Ok(CartView {
        cart,
        priced,
        products,
    })
}
