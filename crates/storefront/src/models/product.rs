//! Product model and catalog inputs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use awesome_store_core::{Price, ProductId, ProductSnapshot};

/// URL prefix uploaded product images are served under.
pub const UPLOAD_URL_PREFIX: &str = "/static/uploads";

/// A catalog product.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub color: String,
    pub department: String,
    pub description: String,
    /// Uploaded file name or absolute URL.
    pub image: Option<String>,
    /// Units on hand.
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.quantity > 0
    }

    /// Where the browser should load the product image from.
    #[must_use]
    pub fn image_url(&self) -> Option<String> {
        let image = self.image.as_deref()?.trim();
        if image.is_empty() {
            return None;
        }
        if image.starts_with("http://") || image.starts_with("https://") || image.starts_with('/')
        {
            return Some(image.to_owned());
        }
        Some(format!("{UPLOAD_URL_PREFIX}/{image}"))
    }

    /// The fields cart pricing needs.
    #[must_use]
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            id: self.id,
            name: self.name.clone(),
            price: self.price,
            stock: self.quantity,
        }
    }
}

/// Home page filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Exact department match.
    pub department: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

impl ProductFilter {
    /// Build filters from raw query values; blank or unparsable values are ignored.
    #[must_use]
    pub fn from_query(dept: Option<&str>, min: Option<&str>, max: Option<&str>) -> Self {
        let parse = |raw: Option<&str>| raw.and_then(|s| s.trim().parse::<Decimal>().ok());
        Self {
            department: dept
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_owned),
            min_price: parse(min),
            max_price: parse(max),
        }
    }

    /// Query string that reproduces these filters, for pagination links.
    #[must_use]
    pub fn query_string(&self) -> String {
        let mut pairs = Vec::new();
        if let Some(dept) = &self.department {
            pairs.push(format!("dept={}", urlencoding::encode(dept)));
        }
        if let Some(min) = self.min_price {
            pairs.push(format!("min={}", min.normalize()));
        }
        if let Some(max) = self.max_price {
            pairs.push(format!("max={}", max.normalize()));
        }
        pairs.join("&")
    }
}

/// Validation failure for catalog input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct InvalidInput(pub String);

/// Validated data for creating a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub price: Price,
    pub color: String,
    pub department: String,
    pub description: String,
    pub image: Option<String>,
    pub quantity: i32,
}

impl ProductInput {
    /// Validate raw product fields.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the name is blank, the price is negative,
    /// or the quantity is negative.
    pub fn new(
        name: &str,
        price: Decimal,
        color: &str,
        department: &str,
        description: &str,
        image: Option<String>,
        quantity: i32,
    ) -> Result<Self, InvalidInput> {
        let name = name.trim();
        if name.is_empty() {
            return Err(InvalidInput("Product name is required".to_owned()));
        }
        let price = Price::new(price).map_err(|e| InvalidInput(format!("Invalid price: {e}")))?;
        if quantity < 0 {
            return Err(InvalidInput("Quantity cannot be negative".to_owned()));
        }

        Ok(Self {
            name: name.to_owned(),
            price,
            color: color.trim().to_owned(),
            department: department.trim().to_owned(),
            description: description.trim().to_owned(),
            image: image.filter(|i| !i.trim().is_empty()),
            quantity,
        })
    }
}

/// JSON body accepted by `PUT /api/products/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductUpdate {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    /// Kept unchanged when absent.
    #[serde(default)]
    pub quantity: Option<i32>,
}

impl ProductUpdate {
    /// Validate against the product being replaced.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` under the same rules as [`ProductInput::new`].
    pub fn into_input(self, current: &Product) -> Result<ProductInput, InvalidInput> {
        ProductInput::new(
            &self.name,
            self.price,
            &self.color,
            &self.department,
            &self.description,
            self.image.or_else(|| current.image.clone()),
            self.quantity.unwrap_or(current.quantity),
        )
    }
}
