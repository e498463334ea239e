//! Seed the catalog with demo products.
//!
//! Names, colors and departments are drawn from small fixed vocabularies so
//! the department filter on the home page has something to group by.

use awesome_store_storefront::db::{ProductRepository, RepositoryError};
use awesome_store_storefront::models::{InvalidInput, ProductInput};
use rand::{Rng, seq::IndexedRandom};
use rust_decimal::Decimal;
use thiserror::Error;

use super::{ConnectError, connect};

const DEPARTMENTS: &[&str] = &["Books", "Clothing", "Electronics", "Garden", "Home", "Toys"];
const ADJECTIVES: &[&str] = &["Handcrafted", "Ergonomic", "Rustic", "Sleek", "Practical", "Small"];
const MATERIALS: &[&str] = &["Wooden", "Steel", "Cotton", "Granite", "Plastic", "Rubber"];
const NOUNS: &[&str] = &["Chair", "Lamp", "Shirt", "Keyboard", "Mug", "Backpack", "Table"];
const COLORS: &[&str] = &["black", "white", "red", "olive", "navy", "teal", "silver"];

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Generated an invalid product: {0}")]
    Invalid(#[from] InvalidInput),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

fn pick<R: Rng + ?Sized>(rng: &mut R, from: &[&'static str]) -> &'static str {
    from.choose(rng).copied().unwrap_or_default()
}

/// Build one random product.
fn demo_product<R: Rng + ?Sized>(rng: &mut R) -> Result<ProductInput, InvalidInput> {
    let name = format!(
        "{} {} {}",
        pick(rng, ADJECTIVES),
        pick(rng, MATERIALS),
        pick(rng, NOUNS)
    );
    let department = pick(rng, DEPARTMENTS);
    let price = Decimal::new(rng.random_range(199..=49_999), 2);
    let quantity = rng.random_range(0..=50);

    ProductInput::new(
        &name,
        price,
        pick(rng, COLORS),
        department,
        &format!("A {} from our {} range.", name.to_lowercase(), department),
        None,
        quantity,
    )
}

/// Insert `count` demo products.
pub async fn products(count: u32) -> Result<(), SeedError> {
    let pool = connect().await?;
    let repo = ProductRepository::new(&pool);

    // ThreadRng is not Send; generate everything before awaiting
    let inputs = {
        let mut rng = rand::rng();
        (0..count)
            .map(|_| demo_product(&mut rng))
            .collect::<Result<Vec<_>, _>>()?
    };

    for input in &inputs {
        repo.create(input).await?;
    }

    tracing::info!(count, "Demo products inserted");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_products_are_valid() {
        let mut rng = rand::rng();
        for _ in 0..50 {
            let product = demo_product(&mut rng).unwrap();
            assert!(DEPARTMENTS.contains(&product.department.as_str()));
            assert!(product.quantity >= 0);
            assert!(product.price.amount() >= Decimal::new(199, 2));
            assert!(product.image.is_none());
        }
    }
}
