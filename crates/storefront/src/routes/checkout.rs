//! Checkout route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use awesome_store_core::OrderId;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{PageContext, RequireUser, flash_redirect};
use crate::models::Flash;
use crate::services::cart;
use crate::services::checkout::{self, ContactDetails};
use crate::state::AppState;

use super::cart::{CartLineView, line_views};

/// Contact form submitted with the order.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: String,
}

/// Checkout summary template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub ctx: PageContext,
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub customer_name: String,
    pub customer_email: String,
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "confirmation.html")]
pub struct ConfirmationTemplate {
    pub ctx: PageContext,
    pub order_id: OrderId,
    pub total: String,
}

/// Display the checkout summary.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Response> {
    let view = cart::load_priced(state.pool(), &session).await?;
    if view.priced.is_empty() {
        return Ok(
            flash_redirect(&session, Flash::danger("Your cart is empty."), "/cart")
                .await?
                .into_response(),
        );
    }

    let ctx = PageContext::load(&session).await?;
    let (lines, total) = line_views(&view);
    let (customer_name, customer_email) = ctx
        .user
        .as_ref()
        .map(|u| (u.name.clone(), u.email.to_string()))
        .unwrap_or_default();

    Ok(CheckoutTemplate {
        ctx,
        lines,
        total,
        customer_name,
        customer_email,
    }
    .into_response())
}

/// Place the order.
///
/// Failures the customer can fix come back as a flash message: contact
/// problems on the checkout page, cart problems on the cart page.
#[instrument(skip(state, session, user, form), fields(user_id = %user.id))]
pub async fn place(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let contact = match ContactDetails::parse(&form.customer_name, &form.customer_email) {
        Ok(contact) => contact,
        Err(e) => {
            return Ok(flash_redirect(&session, Flash::danger(e.to_string()), "/checkout")
                .await?
                .into_response());
        }
    };

    let cart = cart::load(&session).await?;
    let placed = match checkout::place_order(state.pool(), user.id, &contact, &cart).await {
        Ok(placed) => placed,
        Err(e) if !e.is_user_facing() => return Err(AppError::Checkout(e)),
        Err(e) => {
            tracing::info!(error = %e, "Checkout rejected");
            return Ok(flash_redirect(&session, Flash::danger(e.to_string()), "/cart")
                .await?
                .into_response());
        }
    };

    cart::clear(&session).await?;
    let order_id = placed.order_id.to_string();
    add_breadcrumb("checkout", "Order placed", Some(&[("order_id", order_id.as_str())]));

    let mut ctx = PageContext::load(&session).await?;
    ctx.flash = Some(Flash::success("Order placed successfully!"));

    Ok(ConfirmationTemplate {
        ctx,
        order_id: placed.order_id,
        total: placed.total.display(),
    }
    .into_response())
}
