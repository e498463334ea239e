//! Catalog pages: home listing, product detail, categories, contact.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use awesome_store_core::{Pagination, ProductId};

use crate::db::{CategoryRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::{PageContext, flash_redirect};
use crate::models::{Category, Flash, Product, ProductFilter};
use crate::state::AppState;

// =============================================================================
// Query Types
// =============================================================================

/// Home page filters, kept as raw strings so bad numbers are ignored
/// rather than rejected.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub dept: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
}

impl CatalogQuery {
    fn filter(&self) -> ProductFilter {
        ProductFilter::from_query(self.dept.as_deref(), self.min.as_deref(), self.max.as_deref())
    }
}

// =============================================================================
// Templates
// =============================================================================

/// A department in the filter sidebar.
#[derive(Clone)]
pub struct DepartmentOption {
    pub name: String,
    pub selected: bool,
}

/// A numbered pagination link.
#[derive(Clone, Copy)]
pub struct PageLink {
    pub number: u32,
    pub current: bool,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub ctx: PageContext,
    pub products: Vec<Product>,
    pub departments: Vec<DepartmentOption>,
    pub dept: String,
    pub min: String,
    pub max: String,
    pub pagination: Pagination,
    pub pages: Vec<PageLink>,
    /// Filter query string appended to pagination links, with leading `?`.
    pub qs: String,
}

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "product.html")]
pub struct ProductTemplate {
    pub ctx: PageContext,
    pub product: Product,
    /// Units of this product already in the cart.
    pub in_cart: u32,
}

/// Category listing template.
#[derive(Template, WebTemplate)]
#[template(path = "categories.html")]
pub struct CategoriesTemplate {
    pub ctx: PageContext,
    pub categories: Vec<Category>,
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub ctx: PageContext,
}

// =============================================================================
// Handlers
// =============================================================================

/// Parse the `/{page}` segment. Non-numeric is not a page at all.
fn parse_page(raw: &str) -> Option<u32> {
    let page: i64 = raw.parse().ok()?;
    Some(u32::try_from(page.max(1)).unwrap_or(u32::MAX))
}

/// Catalog page number from the path; anything non-numeric is a 404.
#[derive(Debug, Clone, Copy)]
pub struct PageNumber(pub u32);

impl<S> FromRequestParts<S> for PageNumber
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound("Page not found".to_owned()))?;
        parse_page(&raw)
            .map(Self)
            .ok_or_else(|| AppError::NotFound("Page not found".to_owned()))
    }
}

/// Display the first page of the catalog.
#[instrument(skip(state, ctx))]
pub async fn home(
    State(state): State<AppState>,
    ctx: PageContext,
    Query(query): Query<CatalogQuery>,
) -> Result<HomeTemplate> {
    render_catalog(&state, ctx, 1, &query).await
}

/// Display catalog page N.
#[instrument(skip(state, ctx))]
pub async fn page(
    State(state): State<AppState>,
    PageNumber(page): PageNumber,
    ctx: PageContext,
    Query(query): Query<CatalogQuery>,
) -> Result<HomeTemplate> {
    render_catalog(&state, ctx, page, &query).await
}

async fn render_catalog(
    state: &AppState,
    ctx: PageContext,
    page: u32,
    query: &CatalogQuery,
) -> Result<HomeTemplate> {
    let filter = query.filter();
    let products = ProductRepository::new(state.pool());

    let total = products.count(&filter).await?;
    let pagination = Pagination::new(
        page,
        Pagination::CATALOG_PAGE_SIZE,
        u64::try_from(total).unwrap_or(0),
    );
    let items = products
        .list_page(&filter, pagination.limit(), pagination.offset())
        .await?;
    let departments = state.catalog().departments(state.pool()).await?;

    tracing::debug!(page, total, shown = items.len(), "Rendered catalog page");

    let dept = filter.department.clone().unwrap_or_default();
    let qs = filter.query_string();

    Ok(HomeTemplate {
        ctx,
        products: items,
        departments: departments
            .iter()
            .map(|name| DepartmentOption {
                selected: *name == dept,
                name: name.clone(),
            })
            .collect(),
        dept,
        min: filter.min_price.map(|m| m.normalize().to_string()).unwrap_or_default(),
        max: filter.max_price.map(|m| m.normalize().to_string()).unwrap_or_default(),
        pages: (1..=pagination.total_pages())
            .map(|number| PageLink {
                number,
                current: number == pagination.page,
            })
            .collect(),
        pagination,
        qs: if qs.is_empty() { qs } else { format!("?{qs}") },
    })
}

/// Display a product.
///
/// Unknown or malformed IDs flash a message and go back to the catalog.
#[instrument(skip(state, session))]
pub async fn product(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Response> {
    let Ok(id) = id.parse::<ProductId>() else {
        return Ok(flash_redirect(&session, Flash::danger("Invalid product id"), "/")
            .await?
            .into_response());
    };

    let Some(product) = ProductRepository::new(state.pool()).get(id).await? else {
        return Ok(flash_redirect(&session, Flash::danger("Product not found"), "/")
            .await?
            .into_response());
    };

    let ctx = PageContext::load(&session).await?;
    let in_cart = crate::services::cart::load(&session)
        .await?
        .quantity_of(product.id);

    Ok(ProductTemplate {
        ctx,
        product,
        in_cart,
    }
    .into_response())
}

/// List all categories.
#[instrument(skip(state, ctx))]
pub async fn categories(
    State(state): State<AppState>,
    ctx: PageContext,
) -> Result<CategoriesTemplate> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    Ok(CategoriesTemplate { ctx, categories })
}

/// Static contact page.
pub async fn contact(ctx: PageContext) -> ContactTemplate {
    ContactTemplate { ctx }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page() {
        assert_eq!(parse_page("3"), Some(3));
        assert_eq!(parse_page("0"), Some(1));
        assert_eq!(parse_page("-4"), Some(1));
        assert_eq!(parse_page("abc"), None);
        assert_eq!(parse_page("2.5"), None);
    }
}
