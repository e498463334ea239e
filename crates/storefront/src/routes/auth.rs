//! Authentication route handlers.
//!
//! Handles login, registration and logout with email and password. The
//! session id is cycled on login and the whole session is dropped on logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{PageContext, flash_redirect, set_current_user};
use crate::models::{CurrentUser, Flash};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Registration form data.
///
/// Any `roles` field a client adds is simply not deserialized.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub ctx: PageContext,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(ctx: PageContext) -> LoginTemplate {
    LoginTemplate { ctx }
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Redirect> {
    let user = match AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            tracing::info!("Login failed");
            return flash_redirect(&session, Flash::danger("Invalid email or password"), "/login")
                .await;
        }
        Err(e) => return Err(e.into()),
    };

    // New session id on privilege change
    session.cycle_id().await?;
    set_current_user(&session, &CurrentUser::from(&user)).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, "User logged in");

    flash_redirect(&session, Flash::success("Logged in Successfully"), "/").await
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(ctx: PageContext) -> RegisterTemplate {
    RegisterTemplate { ctx }
}

/// Handle registration form submission.
///
/// New accounts always get the `customer` role only.
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect> {
    match AuthService::new(state.pool())
        .register(&form.name, &form.email, &form.password)
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "User registered");
            flash_redirect(
                &session,
                Flash::success("Registered Successfully. Please login."),
                "/login",
            )
            .await
        }
        Err(
            e @ (AuthError::UserAlreadyExists
            | AuthError::InvalidEmail(_)
            | AuthError::WeakPassword(_)
            | AuthError::MissingName),
        ) => {
            let message = AppError::Auth(e).client_message();
            flash_redirect(&session, Flash::danger(message), "/register").await
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Destroy the session and go to the login page.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Response> {
    session.flush().await?;
    clear_sentry_user();
    Ok(Redirect::to("/login").into_response())
}
