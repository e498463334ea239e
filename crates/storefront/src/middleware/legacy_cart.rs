//! Import of the old client-side `cart` cookie.
//!
//! Older clients kept the cart in a cookie holding URL-encoded JSON,
//! optionally prefixed with `j:`. The first request that still carries one
//! has it merged into an empty session cart, and the response expires it.

use axum::{
    extract::Request,
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};
use tower_sessions::{Session, cookie::Cookie};

use awesome_store_core::Cart;

use crate::services::cart;

/// Name of the legacy cookie.
pub const LEGACY_CART_COOKIE: &str = "cart";

/// Parse a raw legacy cookie value into a normalized cart.
///
/// Anything unreadable yields an empty cart.
#[must_use]
pub fn parse_legacy_cookie(raw: &str) -> Cart {
    let decoded = urlencoding::decode(raw).map_or_else(|_| raw.to_owned(), |d| d.into_owned());
    let json = decoded.strip_prefix("j:").unwrap_or(&decoded);

    serde_json::from_str::<serde_json::Value>(json)
        .map(|value| Cart::from_legacy_value(&value))
        .unwrap_or_default()
}

fn find_legacy_cookie(request: &Request) -> Option<String> {
    request
        .headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == LEGACY_CART_COOKIE)
        .map(|c| c.value().to_owned())
}

/// Middleware that imports and expires the legacy cart cookie.
///
/// Must run inside the session layer.
pub async fn legacy_cart_middleware(request: Request, next: Next) -> Response {
    let Some(raw) = find_legacy_cookie(&request) else {
        return next.run(request).await;
    };

    if let Some(session) = request.extensions().get::<Session>().cloned() {
        import(&session, &raw).await;
    }

    let mut response = next.run(request).await;
    response.headers_mut().append(
        header::SET_COOKIE,
        HeaderValue::from_static("cart=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax"),
    );
    response
}

async fn import(session: &Session, raw: &str) {
    let legacy = parse_legacy_cookie(raw);
    if legacy.is_empty() {
        return;
    }

    let result = async {
        if cart::load(session).await?.is_empty() {
            cart::save(session, &legacy).await?;
            tracing::info!(lines = legacy.lines().len(), "Imported legacy cart cookie");
        }
        Ok::<_, crate::error::AppError>(())
    }
    .await;

    if let Err(e) = result {
        tracing::warn!(error = %e, "Failed to import legacy cart cookie");
    }
}

#[cfg(test)]
mod tests {
    use awesome_store_core::ProductId;

    use super::*;

    #[test]
    fn test_parses_express_json_cookie() {
        let cart = parse_legacy_cookie("j%3A%5B%7B%22id%22%3A%223%22%2C%22qty%22%3A2%7D%2C%225%22%5D");
        assert_eq!(cart.quantity_of(ProductId::new(3)), 2);
        assert_eq!(cart.quantity_of(ProductId::new(5)), 1);
    }

    #[test]
    fn test_parses_plain_json_cookie() {
        let cart = parse_legacy_cookie(r#"["7","7"]"#);
        assert_eq!(cart.quantity_of(ProductId::new(7)), 2);
    }

    #[test]
    fn test_garbage_is_empty() {
        assert!(parse_legacy_cookie("not json").is_empty());
        assert!(parse_legacy_cookie("j%3A%7B%7D").is_empty());
    }
}
