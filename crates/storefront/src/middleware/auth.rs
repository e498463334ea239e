//! Session authentication extractors.
//!
//! HTML routes identify the browser through the session. Admin routes
//! additionally go through [`RequireCapability`], which re-reads the user's
//! roles from the database and evaluates them with [`RoleSet::allows`].
//!
//! [`RoleSet::allows`]: awesome_store_core::RoleSet::allows

use std::marker::PhantomData;

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use awesome_store_core::Capability;

use crate::db::UserRepository;
use crate::error::AppError;
use crate::models::{CurrentUser, Flash, session_keys};
use crate::state::AppState;

use super::flash::set_flash;

/// Flash shown when a login is required.
pub const LOGIN_REQUIRED_MESSAGE: &str = "Please login first.";

/// Body of the 403 page for admin routes.
pub const ADMINS_ONLY_MESSAGE: &str = "Access denied. Admins only.";

/// Extractor that requires a logged-in user.
///
/// If nobody is logged in, sets a flash and redirects to `/login`.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireUser(pub CurrentUser);

/// Error returned when authentication or a capability is missing.
pub enum AuthRejection {
    /// Redirect to login page.
    RedirectToLogin,
    /// Logged in but not allowed.
    Forbidden,
    /// Session store or database failure.
    Internal(AppError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Forbidden => (StatusCode::FORBIDDEN, ADMINS_ONLY_MESSAGE).into_response(),
            Self::Internal(err) => err.into_response(),
        }
    }
}

impl From<tower_sessions::session::Error> for AuthRejection {
    fn from(error: tower_sessions::session::Error) -> Self {
        Self::Internal(AppError::Session(error))
    }
}

fn session_of(parts: &Parts) -> Result<Session, AuthRejection> {
    parts
        .extensions
        .get::<Session>()
        .cloned()
        .ok_or_else(|| AuthRejection::Internal(AppError::Internal("session layer missing".into())))
}

async fn login_required(session: &Session) -> AuthRejection {
    if let Err(e) = set_flash(session, Flash::danger(LOGIN_REQUIRED_MESSAGE)).await {
        tracing::warn!(error = %e, "Failed to set login flash");
    }
    AuthRejection::RedirectToLogin
}

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = session_of(parts)?;

        match session
            .get::<CurrentUser>(session_keys::CURRENT_USER)
            .await?
        {
            Some(user) => Ok(Self(user)),
            None => Err(login_required(&session).await),
        }
    }
}

/// A capability checked at the type level by [`RequireCapability`].
pub trait RequiredCapability {
    const CAPABILITY: Capability;
}

/// Marker for [`Capability::ViewDashboard`].
pub struct ViewDashboard;

impl RequiredCapability for ViewDashboard {
    const CAPABILITY: Capability = Capability::ViewDashboard;
}

/// Marker for [`Capability::ManageOrders`].
pub struct ManageOrders;

impl RequiredCapability for ManageOrders {
    const CAPABILITY: Capability = Capability::ManageOrders;
}

/// Extractor that requires a logged-in user holding capability `C`.
///
/// Roles are re-read from the database, so a demotion takes effect on the
/// next request rather than at the next login. The refreshed identity is
/// written back to the session.
pub struct RequireCapability<C>(pub CurrentUser, PhantomData<C>);

impl<C> RequireCapability<C> {
    /// The authorized user.
    #[must_use]
    pub fn user(&self) -> &CurrentUser {
        &self.0
    }
}

impl<C> FromRequestParts<AppState> for RequireCapability<C>
where
    C: RequiredCapability + Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = session_of(parts)?;

        let Some(cached) = session
            .get::<CurrentUser>(session_keys::CURRENT_USER)
            .await?
        else {
            return Err(login_required(&session).await);
        };

        let Some(user) = UserRepository::new(state.pool())
            .get_by_id(cached.id)
            .await
            .map_err(|e| AuthRejection::Internal(e.into()))?
        else {
            tracing::info!(user_id = %cached.id, "Session user no longer exists");
            clear_current_user(&session).await?;
            return Err(login_required(&session).await);
        };

        let current = CurrentUser::from(&user);
        if !current.roles.allows(C::CAPABILITY) {
            tracing::warn!(user_id = %current.id, capability = ?C::CAPABILITY, "Capability denied");
            return Err(AuthRejection::Forbidden);
        }

        if current.roles != cached.roles {
            set_current_user(&session, &current).await?;
        }

        Ok(Self(current, PhantomData))
    }
}

/// Helper to set the current user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}
