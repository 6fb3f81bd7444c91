use std::sync::Arc;

use chrono::{DateTime, Utc};
use furnish_core::catalog::Catalog;
use furnish_core::errors::FetchError;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::http::CatalogSource;

#[derive(Clone, Debug)]
pub struct CatalogSnapshot {
    pub catalog: Arc<Catalog>,
    pub fetched_at: DateTime<Utc>,
}

/// Holds the last catalog collection that loaded successfully.
///
/// Readers share the snapshot; only [`CatalogCache::reload`] (or the first
/// [`CatalogCache::snapshot`]) goes back to the network.
pub struct CatalogCache {
    source: Arc<dyn CatalogSource>,
    current: RwLock<Option<CatalogSnapshot>>,
    refresh: Mutex<()>,
}

impl CatalogCache {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self { source, current: RwLock::new(None), refresh: Mutex::new(()) }
    }

    pub fn source(&self) -> Arc<dyn CatalogSource> {
        Arc::clone(&self.source)
    }

    pub async fn cached(&self) -> Option<CatalogSnapshot> {
        self.current.read().await.clone()
    }

    pub async fn snapshot(&self) -> Result<CatalogSnapshot, FetchError> {
        if let Some(snapshot) = self.cached().await {
            return Ok(snapshot);
        }

        let _refresh = self.refresh.lock().await;
        // A concurrent caller may have filled the cache while we waited.
        if let Some(snapshot) = self.cached().await {
            return Ok(snapshot);
        }
        self.fetch_and_store().await
    }

    /// Refetches the collection. A failed reload keeps the previous snapshot.
    pub async fn reload(&self) -> Result<CatalogSnapshot, FetchError> {
        let _refresh = self.refresh.lock().await;
        self.fetch_and_store().await
    }

    async fn fetch_and_store(&self) -> Result<CatalogSnapshot, FetchError> {
        match self.source.fetch_all().await {
            Ok(products) => {
                let snapshot = CatalogSnapshot {
                    catalog: Arc::new(Catalog::new(products)),
                    fetched_at: Utc::now(),
                };
                *self.current.write().await = Some(snapshot.clone());
                info!(
                    event_name = "catalog.cache.refreshed",
                    product_count = snapshot.catalog.len(),
                    fetched_at = %snapshot.fetched_at.to_rfc3339(),
                    "catalog snapshot refreshed"
                );
                Ok(snapshot)
            }
            Err(error) => {
                warn!(
                    event_name = "catalog.cache.refresh_failed",
                    error = %error,
                    "catalog refresh failed; keeping previous snapshot"
                );
                Err(error)
            }
        }
    }
}
