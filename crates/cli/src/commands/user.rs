//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a staff account
//! store-cli user create -e admin@example.com -n "Admin Name" -p 'long-password' -r admin
//!
//! # Wipe every user and insert admin@admin.com (customer, admin)
//! store-cli user reset --password 'long-password'
//! ```

use awesome_store_core::{Role, RoleSet};
use awesome_store_storefront::db::{RepositoryError, UserRepository};
use awesome_store_storefront::services::auth::{AuthError, AuthService};
use rand::{Rng, distr::Alphanumeric};
use thiserror::Error;

use super::{ConnectError, connect};

/// Email of the account `user reset` recreates.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@admin.com";

/// Display name of the account `user reset` recreates.
pub const DEFAULT_ADMIN_NAME: &str = "Store Admin";

const GENERATED_PASSWORD_LENGTH: usize = 20;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: customer, admin, superadmin")]
    InvalidRole(String),

    /// Validation or conflict while creating the user.
    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Build the role set for a new account. Every account is a customer.
fn parse_roles(roles: &[String]) -> Result<RoleSet, UserError> {
    let extra = roles
        .iter()
        .map(|raw| {
            raw.parse::<Role>()
                .map_err(|_| UserError::InvalidRole(raw.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(std::iter::once(Role::Customer).chain(extra).collect())
}

fn generate_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LENGTH)
        .map(char::from)
        .collect()
}

/// Create a user with the given roles.
pub async fn create(
    email: &str,
    name: &str,
    password: &str,
    roles: &[String],
) -> Result<(), UserError> {
    let roles = parse_roles(roles)?;
    let pool = connect().await?;

    tracing::info!("Creating user: {} ({})", email, roles.to_strings().join(", "));
    let user = AuthService::new(&pool)
        .create_user(name, email, password, &roles)
        .await?;

    tracing::info!("User created successfully! ID: {}, Email: {}", user.id, user.email);
    Ok(())
}

/// Delete every user and insert the default admin. Past orders are kept.
pub async fn reset(password: Option<String>) -> Result<(), UserError> {
    let generated = password.is_none();
    let password = password.unwrap_or_else(generate_password);
    let roles = RoleSet::from_iter([Role::Customer, Role::Admin]);

    let pool = connect().await?;

    let removed = UserRepository::new(&pool).delete_all().await?;
    tracing::info!(removed, "Users deleted");

    let user = AuthService::new(&pool)
        .create_user(DEFAULT_ADMIN_NAME, DEFAULT_ADMIN_EMAIL, &password, &roles)
        .await?;

    tracing::info!("Default admin recreated: {} (ID {})", user.email, user.id);
    if generated {
        tracing::warn!("Generated password: {}", password);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roles_always_includes_customer() {
        let roles = parse_roles(&[]).unwrap();
        assert!(roles.contains(Role::Customer));
        assert!(!roles.is_admin());
    }

    #[test]
    fn test_parse_roles_accepts_aliases() {
        let roles = parse_roles(&["admin".to_owned(), "super_admin".to_owned()]).unwrap();
        assert!(roles.contains(Role::Admin));
        assert!(roles.contains(Role::SuperAdmin));
    }

    #[test]
    fn test_parse_roles_rejects_unknown() {
        assert!(matches!(
            parse_roles(&["root".to_owned()]),
            Err(UserError::InvalidRole(r)) if r == "root"
        ));
    }

    #[test]
    fn test_generated_password_is_long_enough() {
        let password = generate_password();
        assert_eq!(password.len(), GENERATED_PASSWORD_LENGTH);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
