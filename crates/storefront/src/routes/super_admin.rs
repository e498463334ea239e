//! Admin dashboard and order management.
//!
//! Every handler takes a [`RequireCapability`] extractor, which re-reads
//! roles from the database before the handler runs.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::Redirect,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use awesome_store_core::{OrderId, OrderStatus};

use crate::db::{OrderRepository, ProductRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::{ManageOrders, PageContext, RequireCapability, ViewDashboard, set_flash};
use crate::models::{Flash, OrderWithItems};
use crate::state::AppState;

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "super_admin/dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: PageContext,
    pub product_count: i64,
    pub customer_count: i64,
    pub order_count: i64,
}

/// Order list template.
#[derive(Template, WebTemplate)]
#[template(path = "super_admin/orders.html")]
pub struct OrdersTemplate {
    pub ctx: PageContext,
    pub orders: Vec<OrderWithItems>,
}

/// Status change form.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Display the dashboard counts.
#[instrument(skip_all)]
pub async fn dashboard(
    State(state): State<AppState>,
    _admin: RequireCapability<ViewDashboard>,
    ctx: PageContext,
) -> Result<DashboardTemplate> {
    let products = ProductRepository::new(state.pool());
    let users = UserRepository::new(state.pool());
    let orders = OrderRepository::new(state.pool());
    let (product_count, customer_count, order_count) = tokio::try_join!(
        products.count_all(),
        users.count_customers(),
        orders.count_all(),
    )?;

    Ok(DashboardTemplate {
        ctx,
        product_count,
        customer_count,
        order_count,
    })
}

/// List all orders, newest first.
#[instrument(skip_all)]
pub async fn orders(
    State(state): State<AppState>,
    _admin: RequireCapability<ManageOrders>,
    ctx: PageContext,
) -> Result<OrdersTemplate> {
    let orders = OrderRepository::new(state.pool()).list_all().await?;
    Ok(OrdersTemplate { ctx, orders })
}

/// Move an order to a new status.
///
/// Only the edges allowed by [`OrderStatus::can_transition_to`] are accepted;
/// anything else is a 400.
#[instrument(skip(state, session, admin, form), fields(admin_id = %admin.user().id))]
pub async fn update_status(
    State(state): State<AppState>,
    session: Session,
    admin: RequireCapability<ManageOrders>,
    Path(id): Path<OrderId>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect> {
    let next: OrderStatus = form.status.parse().map_err(AppError::BadRequest)?;

    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    if !order.status.can_transition_to(next) {
        return Err(AppError::BadRequest(format!(
            "Cannot change order status from {} to {next}",
            order.status
        )));
    }

    if !orders.set_status(id, order.status, next).await? {
        return Err(AppError::Conflict(
            "Order status changed concurrently, reload and try again".to_owned(),
        ));
    }

    tracing::info!(order_id = %id, from = %order.status, to = %next, "Order status changed");
    set_flash(&session, Flash::success(format!("Order #{id} is now {next}"))).await?;
    Ok(Redirect::to("/super-admin/orders"))
}
