//! User model.

use chrono::{DateTime, Utc};

use awesome_store_core::{Email, RoleSet, UserId};

/// A registered store user.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub roles: RoleSet,
    pub created_at: DateTime<Utc>,
}
