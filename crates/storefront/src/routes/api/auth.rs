//! API token issuance.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Credentials posted to `/api/auth`.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Exchange email and password for a signed token (plain-text body).
#[instrument(skip(state, credentials))]
pub async fn token(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<String> {
    let user = AuthService::new(state.pool())
        .login(&credentials.email, &credentials.password)
        .await
        .map_err(|e| match e {
            AuthError::InvalidCredentials => {
                AppError::BadRequest("Invalid Email or Password".to_owned())
            }
            other => other.into(),
        })?;

    let token = state
        .tokens()
        .issue(&user)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(user_id = %user.id, "Issued API token");
    Ok(token)
}
