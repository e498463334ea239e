//! Shopping cart rules.
//!
//! The cart is a list of `{product_id, quantity}` lines. It never carries
//! prices: [`price_cart`] joins it against server-side product data every
//! time a total is needed, so a stale or tampered cart cannot change what a
//! customer pays.
//!
//! Invariants held by [`Cart`]:
//! - every line has `quantity >= 1`
//! - a product appears at most once

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Price, ProductId};

/// One line of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A customer's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

/// Interpret a user-supplied quantity: missing, unparsable or below one means 1.
#[must_use]
pub fn requested_quantity(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|qty| *qty >= 1)
        .map_or(1, |qty| u32::try_from(qty).unwrap_or(u32::MAX))
}

/// Stock on hand as an unsigned count; negative values mean none.
fn available_units(stock: i32) -> u32 {
    u32::try_from(stock).unwrap_or(0)
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Rebuild a cart from the JSON array the old cookie-based cart stored.
    ///
    /// Accepts both entry shapes that were ever written:
    /// - a bare id (`"12"` or `12`), meaning quantity 1
    /// - an object `{"id": "12", "qty": 3}`
    ///
    /// Entries without a usable id are dropped, quantities below one become
    /// one, and repeated ids are merged.
    #[must_use]
    pub fn from_legacy_value(value: &Value) -> Self {
        let mut cart = Self::new();
        let Value::Array(entries) = value else {
            return cart;
        };

        for entry in entries {
            let (id, qty) = match entry {
                Value::Object(map) => (
                    map.get("id").and_then(legacy_id),
                    map.get("qty").map_or(1, legacy_quantity),
                ),
                other => (legacy_id(other), 1),
            };

            if let Some(product_id) = id {
                cart.merge_line(product_id, qty);
            }
        }

        cart
    }

    fn merge_line(&mut self, product_id: ProductId, quantity: u32) {
        match self.line_mut(product_id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.lines.push(CartLine {
                product_id,
                quantity,
            }),
        }
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |sum, line| sum.saturating_add(line.quantity))
    }

    /// Product ids referenced by the cart.
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.lines.iter().map(|line| line.product_id).collect()
    }

    /// Quantity of a product currently in the cart (0 if absent).
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.lines
            .iter()
            .find(|line| line.product_id == product_id)
            .map_or(0, |line| line.quantity)
    }

    /// Add units of a product, capped at the stock on hand.
    ///
    /// Returns the resulting line quantity, or `None` (cart unchanged) when
    /// the product is out of stock.
    pub fn add(&mut self, product_id: ProductId, requested: u32, stock: i32) -> Option<u32> {
        let available = available_units(stock);
        if available == 0 {
            return None;
        }

        let requested = requested.max(1);
        let quantity = self
            .quantity_of(product_id)
            .saturating_add(requested)
            .min(available);

        match self.line_mut(product_id) {
            Some(line) => line.quantity = quantity,
            None => self.lines.push(CartLine {
                product_id,
                quantity,
            }),
        }
        Some(quantity)
    }

    /// Set the quantity of an existing line, capped at the stock on hand.
    ///
    /// A product that has gone out of stock is removed. Products not in the
    /// cart are ignored. Returns the new quantity if the line still exists.
    pub fn set_quantity(&mut self, product_id: ProductId, requested: u32, stock: i32) -> Option<u32> {
        let available = available_units(stock);
        if available == 0 {
            self.remove(product_id);
            return None;
        }

        let line = self.line_mut(product_id)?;
        line.quantity = requested.max(1).min(available);
        Some(line.quantity)
    }

    /// Remove a product from the cart. Returns whether a line was removed.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id != product_id);
        self.lines.len() != before
    }

    /// Drop lines whose product no longer exists. Returns whether anything changed.
    pub fn retain_known(&mut self, known: &HashSet<ProductId>) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| known.contains(&line.product_id));
        self.lines.len() != before
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

fn legacy_id(value: &Value) -> Option<ProductId> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map(ProductId::new),
        _ => None,
    }
}

fn legacy_quantity(value: &Value) -> u32 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                // Fractional quantities truncate, like the JavaScript Number() they came from
                #[allow(clippy::cast_possible_truncation)]
                n.as_f64().map(|f| f as i64)
            })
            .filter(|qty| *qty >= 1)
            .map_or(1, |qty| u32::try_from(qty).unwrap_or(u32::MAX)),
        Value::String(s) => requested_quantity(Some(s)),
        _ => 1,
    }
}

/// Server-side view of a product, as needed to price a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub stock: i32,
}

/// A priced cart line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub quantity: u32,
    pub line_total: Price,
    pub stock: i32,
}

impl PricedLine {
    /// Whether the requested quantity exceeds the stock on hand.
    #[must_use]
    pub fn exceeds_stock(&self) -> bool {
        self.quantity > available_units(self.stock)
    }
}

/// A cart with every line priced from server data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PricedCart {
    pub lines: Vec<PricedLine>,
    pub total: Price,
}

/// A line asked for more units than are in stock.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Not enough stock for \"{name}\". Available: {available}")]
pub struct StockShortage {
    pub product_id: ProductId,
    pub name: String,
    pub available: i32,
}

impl PricedCart {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all priced lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |sum, line| sum.saturating_add(line.quantity))
    }

    /// Fail on the first line that asks for more than the stock on hand.
    ///
    /// # Errors
    ///
    /// Returns the [`StockShortage`] for the first offending line.
    pub fn check_stock(&self) -> Result<(), StockShortage> {
        match self.lines.iter().find(|line| line.exceeds_stock()) {
            Some(line) => Err(StockShortage {
                product_id: line.product_id,
                name: line.name.clone(),
                available: line.stock.max(0),
            }),
            None => Ok(()),
        }
    }
}

/// Price a cart against server-side product data.
///
/// Lines whose product is missing from `products` are skipped; the total is
/// the exact sum of `unit_price × quantity` over the remaining lines.
#[must_use]
pub fn price_cart(cart: &Cart, products: &[ProductSnapshot]) -> PricedCart {
    let lines: Vec<PricedLine> = cart
        .lines()
        .iter()
        .filter_map(|line| {
            let product = products.iter().find(|p| p.id == line.product_id)?;
            Some(PricedLine {
                product_id: product.id,
                name: product.name.clone(),
                unit_price: product.price,
                quantity: line.quantity,
                line_total: product.price * line.quantity,
                stock: product.stock,
            })
        })
        .collect();

    let total = lines.iter().map(|line| line.line_total).sum();
    PricedCart { lines, total }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn pid(n: i32) -> ProductId {
        ProductId::new(n)
    }

    fn snapshot(id: i32, name: &str, cents: i64, stock: i32) -> ProductSnapshot {
        ProductSnapshot {
            id: pid(id),
            name: name.to_owned(),
            price: Price::from_cents(cents).unwrap(),
            stock,
        }
    }

    #[test]
    fn test_requested_quantity() {
        assert_eq!(requested_quantity(None), 1);
        assert_eq!(requested_quantity(Some("")), 1);
        assert_eq!(requested_quantity(Some("abc")), 1);
        assert_eq!(requested_quantity(Some("0")), 1);
        assert_eq!(requested_quantity(Some("-4")), 1);
        assert_eq!(requested_quantity(Some(" 3 ")), 3);
    }

    #[test]
    fn test_legacy_bare_ids_become_single_units() {
        let cart = Cart::from_legacy_value(&json!(["1", 2]));
        assert_eq!(
            cart.lines(),
            &[
                CartLine {
                    product_id: pid(1),
                    quantity: 1
                },
                CartLine {
                    product_id: pid(2),
                    quantity: 1
                },
            ]
        );
    }

    #[test]
    fn test_legacy_mixed_entries_are_normalized() {
        let cart = Cart::from_legacy_value(&json!([
            {"id": "3", "qty": 2},
            "3",
            {"id": "4", "qty": 0},
            {"id": "5", "qty": "7"},
            {"qty": 9},
            {"id": ""},
            null,
            "not-an-id",
            {"id": "6", "qty": 2.9}
        ]));

        assert_eq!(cart.quantity_of(pid(3)), 3);
        assert_eq!(cart.quantity_of(pid(4)), 1);
        assert_eq!(cart.quantity_of(pid(5)), 7);
        assert_eq!(cart.quantity_of(pid(6)), 2);
        assert_eq!(cart.lines().len(), 4);
    }

    #[test]
    fn test_legacy_non_array_is_empty() {
        assert!(Cart::from_legacy_value(&json!({"id": "1"})).is_empty());
        assert!(Cart::from_legacy_value(&json!("1")).is_empty());
    }

    #[test]
    fn test_add_caps_at_stock() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(pid(1), 2, 5), Some(2));
        assert_eq!(cart.add(pid(1), 10, 5), Some(5));
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_add_out_of_stock_leaves_cart_unchanged() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(pid(1), 1, 0), None);
        assert_eq!(cart.add(pid(1), 1, -3), None);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_clamps_and_removes() {
        let mut cart = Cart::new();
        cart.add(pid(1), 1, 10);
        assert_eq!(cart.set_quantity(pid(1), 50, 4), Some(4));
        assert_eq!(cart.set_quantity(pid(1), 0, 4), Some(1));
        assert_eq!(cart.set_quantity(pid(1), 2, 0), None);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_ignores_missing_lines() {
        let mut cart = Cart::new();
        assert_eq!(cart.set_quantity(pid(9), 2, 5), None);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_retain_known_drops_unknown_products() {
        let mut cart = Cart::from_legacy_value(&json!(["1", "2", "3"]));
        let known: HashSet<_> = [pid(1), pid(3)].into_iter().collect();
        assert!(cart.retain_known(&known));
        assert_eq!(cart.product_ids(), vec![pid(1), pid(3)]);
        assert!(!cart.retain_known(&known));
    }

    #[test]
    fn test_price_cart_uses_server_prices() {
        let mut cart = Cart::new();
        cart.add(pid(1), 3, 10);
        cart.add(pid(2), 2, 10);
        cart.add(pid(99), 1, 10);

        let priced = price_cart(
            &cart,
            &[snapshot(1, "Mug", 1_050, 10), snapshot(2, "Tee", 1_999, 10)],
        );

        // Unknown product 99 is dropped, not an error
        assert_eq!(priced.lines.len(), 2);
        assert_eq!(priced.lines[0].line_total, Price::from_cents(3_150).unwrap());
        assert_eq!(priced.total, Price::from_cents(3_150 + 3_998).unwrap());
        assert_eq!(priced.item_count(), 5);
    }

    #[test]
    fn test_check_stock_reports_first_shortage() {
        let mut cart = Cart::new();
        cart.add(pid(1), 2, 10);
        cart.add(pid(2), 4, 10);

        // Stock dropped after the items were carted
        let priced = price_cart(
            &cart,
            &[snapshot(1, "Mug", 100, 5), snapshot(2, "Tee", 100, 3)],
        );

        let shortage = priced.check_stock().unwrap_err();
        assert_eq!(shortage.product_id, pid(2));
        assert_eq!(shortage.available, 3);
        assert_eq!(
            shortage.to_string(),
            "Not enough stock for \"Tee\". Available: 3"
        );
    }

    #[test]
    fn test_check_stock_passes_within_limits() {
        let mut cart = Cart::new();
        cart.add(pid(1), 5, 5);
        let priced = price_cart(&cart, &[snapshot(1, "Mug", 100, 5)]);
        assert!(priced.check_stock().is_ok());
    }
}
