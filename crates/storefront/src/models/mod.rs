//! Domain models for the storefront.
//!
//! Row types map one-to-one onto tables in the `store` schema; input types
//! carry validated data on its way into a repository.

pub mod category;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use category::{Category, CategoryInput};
pub use order::{Order, OrderItem, OrderWithItems};
pub use product::{InvalidInput, Product, ProductFilter, ProductInput, ProductUpdate};
pub use session::{CurrentUser, Flash, FlashKind, keys as session_keys};
pub use user::User;
