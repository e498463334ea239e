//! Token authentication for the JSON API.

use axum::{extract::FromRequestParts, http::request::Parts};

use awesome_store_core::Capability;

use crate::db::UserRepository;
use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

/// Header API clients send their token in.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

const NO_TOKEN_MESSAGE: &str = "Access denied. No token provided.";
const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token.";

/// A user authenticated by API token.
///
/// The token only proves identity. The user row, roles included, is loaded
/// fresh on every request, and capability checks go through [`Self::require`].
#[derive(Debug, Clone)]
pub struct ApiUser(pub User);

impl ApiUser {
    /// Check that the user may exercise `capability`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` if the roles do not allow it.
    pub fn require(self, capability: Capability) -> Result<User, AppError> {
        if self.0.roles.allows(capability) {
            Ok(self.0)
        } else {
            tracing::warn!(user_id = %self.0.id, ?capability, "API capability denied");
            Err(AppError::Forbidden)
        }
    }
}

impl FromRequestParts<AppState> for ApiUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTH_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized(NO_TOKEN_MESSAGE.to_owned()))?;

        let invalid = || AppError::Unauthorized(INVALID_TOKEN_MESSAGE.to_owned());

        let claims = state.tokens().verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Rejected API token");
            invalid()
        })?;
        let user_id = claims.user_id().map_err(|_| invalid())?;

        let user = UserRepository::new(state.pool())
            .get_by_id(user_id)
            .await?
            .ok_or_else(invalid)?;

        Ok(Self(user))
    }
}
