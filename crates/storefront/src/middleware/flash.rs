//! One-shot flash messages stored in the session.
//!
//! A handler sets a flash and redirects; the next page that renders through
//! [`PageContext`](super::PageContext) takes it out of the session.

use axum::response::Redirect;
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{Flash, session_keys};

/// Store a flash message for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_flash(session: &Session, flash: Flash) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::FLASH, flash).await
}

/// Remove and return the pending flash message.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn take_flash(session: &Session) -> Result<Option<Flash>, tower_sessions::session::Error> {
    session.remove::<Flash>(session_keys::FLASH).await
}

/// Set a flash message and redirect.
///
/// # Errors
///
/// Returns `AppError::Session` if the session cannot be modified.
pub async fn flash_redirect(session: &Session, flash: Flash, to: &str) -> Result<Redirect, AppError> {
    set_flash(session, flash).await?;
    Ok(Redirect::to(to))
}
