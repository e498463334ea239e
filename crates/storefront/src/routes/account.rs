//! Account route handlers.
//!
//! These routes require a logged-in user.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::db::OrderRepository;
use crate::error::Result;
use crate::middleware::{PageContext, RequireUser};
use crate::models::{CurrentUser, OrderWithItems};
use crate::state::AppState;

/// Account page template.
#[derive(Template, WebTemplate)]
#[template(path = "account.html")]
pub struct AccountTemplate {
    pub ctx: PageContext,
    pub user: CurrentUser,
    pub orders: Vec<OrderWithItems>,
}

/// Display the user's order history, newest first.
#[instrument(skip(state, user, ctx), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ctx: PageContext,
) -> Result<AccountTemplate> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(AccountTemplate { ctx, user, orders })
}
