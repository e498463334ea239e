//! Cart route handlers.
//!
//! The cart lives in the session. Quantities are clamped to stock on every
//! change; prices are looked up fresh on every render.

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

use awesome_store_core::{PricedLine, ProductId, requested_quantity};

use crate::db::ProductRepository;
use crate::error::{Result, add_breadcrumb};
use crate::middleware::{PageContext, flash_redirect};
use crate::models::Flash;
use crate::services::cart::{self, CartView};
use crate::state::AppState;

/// Quantity form used by add and update.
#[derive(Debug, Default, Deserialize)]
pub struct QuantityForm {
    pub qty: Option<String>,
}

/// One cart line as the templates show it.
#[derive(Clone)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub name: String,
    pub image_url: Option<String>,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
    pub stock: i32,
    pub exceeds_stock: bool,
}

impl CartLineView {
    fn new(view: &CartView, line: &PricedLine) -> Self {
        Self {
            product_id: line.product_id,
            name: line.name.clone(),
            image_url: view.product(line.product_id).and_then(|p| p.image_url()),
            unit_price: line.unit_price.display(),
            quantity: line.quantity,
            line_total: line.line_total.display(),
            stock: line.stock,
            exceeds_stock: line.exceeds_stock(),
        }
    }
}

/// Build template lines and the formatted total from a priced cart.
pub(crate) fn line_views(view: &CartView) -> (Vec<CartLineView>, String) {
    let lines = view
        .priced
        .lines
        .iter()
        .map(|line| CartLineView::new(view, line))
        .collect();
    (lines, view.priced.total.display())
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartTemplate {
    pub ctx: PageContext,
    pub lines: Vec<CartLineView>,
    pub total: String,
}

/// Display the cart.
#[instrument(skip(state, session, ctx))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    ctx: PageContext,
) -> Result<CartTemplate> {
    let view = cart::load_priced(state.pool(), &session).await?;
    let (lines, total) = line_views(&view);

    let mut ctx = ctx;
    ctx.cart_count = view.cart.item_count();

    Ok(CartTemplate { ctx, lines, total })
}

/// Add a product to the cart.
#[instrument(skip(state, session, form))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<QuantityForm>,
) -> Result<Redirect> {
    let requested = requested_quantity(form.qty.as_deref());

    let product = match id.parse::<ProductId>() {
        Ok(id) => ProductRepository::new(state.pool()).get(id).await?,
        Err(_) => None,
    };
    let Some(product) = product else {
        return flash_redirect(&session, Flash::danger("Product not found"), "/").await;
    };

    let mut cart = cart::load(&session).await?;
    let Some(quantity) = cart.add(product.id, requested, product.quantity) else {
        let back = format!("/product/{}", product.id);
        return flash_redirect(&session, Flash::danger("Out of stock"), &back).await;
    };
    cart::save(&session, &cart).await?;

    let product_id = product.id.to_string();
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product_id.as_str())]));
    tracing::info!(product_id = %product.id, quantity, "Added to cart");

    flash_redirect(
        &session,
        Flash::success(format!("Added to cart (Qty: {quantity})")),
        "/cart",
    )
    .await
}

/// Set the quantity of a cart line.
///
/// Lines not in the cart and unknown products are ignored. A product that
/// has sold out is removed from the cart.
#[instrument(skip(state, session, form))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<QuantityForm>,
) -> Result<Redirect> {
    let Ok(id) = id.parse::<ProductId>() else {
        return Ok(Redirect::to("/cart"));
    };
    let Some(product) = ProductRepository::new(state.pool()).get(id).await? else {
        return Ok(Redirect::to("/cart"));
    };

    let mut cart = cart::load(&session).await?;
    let requested = requested_quantity(form.qty.as_deref());
    let quantity = cart.set_quantity(product.id, requested, product.quantity);
    cart::save(&session, &cart).await?;

    tracing::debug!(product_id = %product.id, ?quantity, "Updated cart line");
    Ok(Redirect::to("/cart"))
}

/// Remove a line from the cart.
#[instrument(skip(session))]
pub async fn remove(session: Session, Path(id): Path<String>) -> Result<Redirect> {
    if let Ok(id) = id.parse::<ProductId>() {
        let mut cart = cart::load(&session).await?;
        if cart.remove(id) {
            cart::save(&session, &cart).await?;
        }
    }
    Ok(Redirect::to("/cart"))
}
