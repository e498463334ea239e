//! Session-related types.
//!
//! Everything the server keeps between requests for a browser lives in the
//! tower-sessions record: the logged-in user, a one-shot flash message and the
//! cart.

use serde::{Deserialize, Serialize};

use awesome_store_core::{Capability, Email, RoleSet, UserId};

use super::User;

/// Session-stored user identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// User's email address.
    pub email: Email,
    /// Roles at login time.
    pub roles: RoleSet,
}

impl CurrentUser {
    /// Whether the nav should offer the admin dashboard link.
    #[must_use]
    pub fn can_view_dashboard(&self) -> bool {
        self.roles.allows(Capability::ViewDashboard)
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            roles: user.roles.clone(),
        }
    }
}

/// Style of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Danger,
}

impl FlashKind {
    /// CSS class suffix used by the layout.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Danger => "danger",
        }
    }
}

/// A user-facing notice shown once on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Danger,
            message: message.into(),
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the pending flash message.
    pub const FLASH: &str = "flash";

    /// Key for the shopping cart.
    pub const CART: &str = "cart";
}
