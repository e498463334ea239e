//! Awesome Store storefront library.
//!
//! The server binary, the CLI and the integration tests all build on this
//! crate: [`routes::app`] assembles the full router from an [`AppState`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use config::StoreConfig;
pub use routes::app;
pub use state::AppState;
