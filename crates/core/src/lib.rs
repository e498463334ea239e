//! Awesome Store Core - Shared domain types and rules.
//!
//! This crate provides the types used across all Awesome Store components:
//! - `storefront` - Public-facing shop, JSON API and admin pages
//! - `cli` - Command-line tools for migrations, users and seed data
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no database
//! access, no HTTP. Everything here can be unit tested without a server.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, roles and statuses
//! - [`cart`] - Cart normalization, quantity clamping and pricing
//! - [`pagination`] - Page arithmetic for catalog listings

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod pagination;
pub mod types;

pub use cart::{
    Cart, CartLine, PricedCart, PricedLine, ProductSnapshot, StockShortage, price_cart,
    requested_quantity,
};
pub use pagination::Pagination;
pub use types::*;
