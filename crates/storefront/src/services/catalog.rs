//! Cached catalog lookups.
//!
//! The department sidebar on every home page is a `SELECT DISTINCT` over the
//! whole catalog, so it is cached with `moka` (5-minute TTL) and invalidated
//! whenever a product is written.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, instrument};

use crate::db::{ProductRepository, RepositoryError};

/// Cache key for catalog lookups.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CatalogKey {
    Departments,
}

/// Shared cache of catalog lookups.
#[derive(Clone)]
pub struct CatalogCache {
    cache: Cache<CatalogKey, Arc<Vec<String>>>,
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogCache {
    #[must_use]
    pub fn new() -> Self {
        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();
        Self { cache }
    }

    /// Distinct departments, from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the cache is cold and the query fails.
    #[instrument(skip_all)]
    pub async fn departments(&self, pool: &PgPool) -> Result<Arc<Vec<String>>, RepositoryError> {
        if let Some(departments) = self.cache.get(&CatalogKey::Departments).await {
            debug!("Cache hit for departments");
            return Ok(departments);
        }

        let departments = Arc::new(ProductRepository::new(pool).departments().await?);

        self.cache
            .insert(CatalogKey::Departments, Arc::clone(&departments))
            .await;

        Ok(departments)
    }

    /// Drop cached lookups after a catalog write.
    pub async fn invalidate(&self) {
        self.cache.invalidate(&CatalogKey::Departments).await;
    }
}
