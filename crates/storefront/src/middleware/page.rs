//! Per-page layout context.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{CurrentUser, Flash, session_keys};
use crate::services::cart;

use super::flash::take_flash;

/// What the base layout needs on every rendered page: the navbar user,
/// the pending flash message and the cart badge.
///
/// Extracting this consumes the flash, so only handlers that render HTML
/// should ask for it.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub user: Option<CurrentUser>,
    pub flash: Option<Flash>,
    pub cart_count: u32,
}

impl PageContext {
    /// Build the context from a session, consuming its flash.
    ///
    /// Handlers that may redirect instead of rendering take the [`Session`]
    /// and call this only once they know they will render, so the flash
    /// survives the redirect.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session store fails.
    pub async fn load(session: &Session) -> Result<Self, AppError> {
        let user = session
            .get::<CurrentUser>(session_keys::CURRENT_USER)
            .await?;
        let flash = take_flash(session).await?;
        let cart_count = cart::load(session).await?.item_count();

        Ok(Self {
            user,
            flash,
            cart_count,
        })
    }

    /// Whether the navbar shows the dashboard link.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(CurrentUser::can_view_dashboard)
    }
}

impl<S> FromRequestParts<S> for PageContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>().cloned() else {
            tracing::warn!("Session not found in request extensions - layer may be misconfigured");
            return Ok(Self::default());
        };

        Self::load(&session).await
    }
}
