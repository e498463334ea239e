//! Roles and the authorization policy.
//!
//! Every permission check in the store goes through [`RoleSet::allows`].
//! Handlers ask for a [`Capability`]; they never compare role strings.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A role tag on a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Default role given at registration.
    Customer,
    /// Store staff: catalog, orders, dashboard.
    Admin,
    /// Everything an admin can do, plus user management.
    SuperAdmin,
}

impl Role {
    /// Canonical string form as stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
            Self::SuperAdmin => "superadmin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            "superadmin" | "super_admin" | "super-admin" => Ok(Self::SuperAdmin),
            other => Err(format!("invalid role: {other}")),
        }
    }
}

/// An action class guarded by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Place orders and view own account.
    Shop,
    /// Read the token-protected catalog API.
    ViewCatalogApi,
    /// Create, update and delete products and categories.
    ManageCatalog,
    /// Open the admin dashboard.
    ViewDashboard,
    /// List orders and change their status.
    ManageOrders,
    /// Create or reset user accounts.
    ManageUsers,
}

/// The set of roles held by an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    /// The roles every new registration receives.
    #[must_use]
    pub fn customer() -> Self {
        Self::from_iter([Role::Customer])
    }

    /// Build a role set from stored strings, skipping unknown tags.
    pub fn from_strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        values
            .into_iter()
            .filter_map(|value| value.as_ref().parse().ok())
            .collect()
    }

    /// Canonical string forms, for storage and token claims.
    #[must_use]
    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(|role| role.as_str().to_owned()).collect()
    }

    /// Whether the set contains the exact role.
    #[must_use]
    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    /// Super admins only.
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.contains(Role::SuperAdmin)
    }

    /// Admins, including super admins.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.contains(Role::Admin) || self.is_super_admin()
    }

    /// Whether the holder of these roles may exercise `capability`.
    ///
    /// Callers are already authenticated; anonymous requests never reach this.
    #[must_use]
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::Shop | Capability::ViewCatalogApi => true,
            Capability::ManageCatalog | Capability::ViewDashboard | Capability::ManageOrders => {
                self.is_admin()
            }
            Capability::ManageUsers => self.is_super_admin(),
        }
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<T: IntoIterator<Item = Role>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing_accepts_aliases() {
        assert_eq!("superadmin".parse::<Role>(), Ok(Role::SuperAdmin));
        assert_eq!("super_admin".parse::<Role>(), Ok(Role::SuperAdmin));
        assert_eq!(" Admin ".parse::<Role>(), Ok(Role::Admin));
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_unknown_role_strings_are_ignored() {
        let roles = RoleSet::from_strings(["customer", "wizard"]);
        assert_eq!(roles, RoleSet::customer());
    }

    #[test]
    fn test_super_admin_is_admin() {
        let roles = RoleSet::from_iter([Role::SuperAdmin]);
        assert!(roles.is_admin());
        assert!(roles.is_super_admin());
    }

    #[test]
    fn test_customer_policy() {
        let roles = RoleSet::customer();
        assert!(roles.allows(Capability::Shop));
        assert!(roles.allows(Capability::ViewCatalogApi));
        assert!(!roles.allows(Capability::ManageCatalog));
        assert!(!roles.allows(Capability::ViewDashboard));
        assert!(!roles.allows(Capability::ManageOrders));
        assert!(!roles.allows(Capability::ManageUsers));
    }

    #[test]
    fn test_admin_policy() {
        let roles = RoleSet::from_iter([Role::Customer, Role::Admin]);
        assert!(roles.allows(Capability::ManageCatalog));
        assert!(roles.allows(Capability::ManageOrders));
        assert!(!roles.allows(Capability::ManageUsers));
    }

    #[test]
    fn test_super_admin_policy() {
        let roles = RoleSet::from_iter([Role::SuperAdmin]);
        assert!(roles.allows(Capability::ManageCatalog));
        assert!(roles.allows(Capability::ManageUsers));
    }

    #[test]
    fn test_to_strings_is_canonical() {
        let roles = RoleSet::from_strings(["super-admin", "customer"]);
        assert_eq!(roles.to_strings(), vec!["customer", "superadmin"]);
    }
}
