//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Password registration and login
//! - `token` - Signed API tokens for the JSON API
//! - `cart` - Session-backed cart storage and pricing
//! - `checkout` - Transactional order placement
//! - `catalog` - Cached catalog lookups (departments)
//! - `uploads` - Product image storage

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod token;
pub mod uploads;
