//! Category model.

use serde::{Deserialize, Serialize};

use awesome_store_core::CategoryId;

use super::product::InvalidInput;

/// A product category.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub slug: String,
}

/// JSON body for creating or replacing a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub slug: Option<String>,
}

impl CategoryInput {
    /// Trim fields and fill in the slug from the name when none was given.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the name or resulting slug is empty.
    pub fn normalized(self) -> Result<Self, InvalidInput> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(InvalidInput("Category name is required".to_owned()));
        }

        let slug = slugify(self.slug.as_deref().unwrap_or(&name));
        if slug.is_empty() {
            return Err(InvalidInput("Category slug is empty".to_owned()));
        }

        Ok(Self {
            name,
            description: self.description.trim().to_owned(),
            slug: Some(slug),
        })
    }

    /// Slug after [`Self::normalized`].
    #[must_use]
    pub fn slug(&self) -> &str {
        self.slug.as_deref().unwrap_or_default()
    }
}

/// Lower-case ASCII alphanumerics joined by single hyphens.
#[must_use]
pub fn slugify(s: &str) -> String {
    s.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Home & Garden"), "home-garden");
        assert_eq!(slugify("  Men's  Shoes "), "men-s-shoes");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slug_defaults_to_name() {
        let input = CategoryInput {
            name: " Outdoor Gear ".to_owned(),
            description: String::new(),
            slug: None,
        }
        .normalized()
        .unwrap();
        assert_eq!(input.name, "Outdoor Gear");
        assert_eq!(input.slug(), "outdoor-gear");
    }

    #[test]
    fn test_blank_name_rejected() {
        let input = CategoryInput {
            name: "   ".to_owned(),
            description: String::new(),
            slug: Some("x".to_owned()),
        };
        assert!(input.normalized().is_err());
    }
}
