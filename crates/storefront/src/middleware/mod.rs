//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. Request ID (reuse or generate `x-request-id`)
//! 3. `TraceLayer` (request span carrying the request ID)
//! 4. Security headers
//! 5. Session layer (tower-sessions with `PostgreSQL` store)
//! 6. Legacy cart cookie import
//!
//! Rate limiting is applied per route on the credential endpoints.

pub mod api_auth;
pub mod auth;
pub mod flash;
pub mod legacy_cart;
pub mod page;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use api_auth::ApiUser;
pub use auth::{
    ManageOrders, RequireCapability, RequireUser, ViewDashboard, clear_current_user,
    set_current_user,
};
pub use flash::{flash_redirect, set_flash, take_flash};
pub use legacy_cart::legacy_cart_middleware;
pub use page::PageContext;
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
