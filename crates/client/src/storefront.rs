use std::sync::Arc;
use std::time::Duration;

use furnish_core::catalog::{self, CartSummary};
use furnish_core::config::AppConfig;
use furnish_core::domain::product::{Product, ProductId};
use furnish_core::errors::FetchError;
use furnish_core::selection::{SelectionSnapshot, SelectionStore};
use serde::Serialize;
use tracing::info;

use crate::cache::{CatalogCache, CatalogSnapshot};
use crate::http::{CatalogSource, HttpCatalog};
use crate::search::SearchController;

/// A product joined with the session's selection state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProductCard {
    pub product: Product,
    pub favorite: bool,
    pub in_cart: bool,
}

/// Session handle: one catalog cache and one store per selection kind.
///
/// Clones share the same cache and stores.
#[derive(Clone)]
pub struct Storefront {
    cache: Arc<CatalogCache>,
    favorites: SelectionStore,
    cart: SelectionStore,
    debounce: Duration,
}

impl Storefront {
    pub fn new(source: Arc<dyn CatalogSource>, debounce: Duration) -> Self {
        Self {
            cache: Arc::new(CatalogCache::new(source)),
            favorites: SelectionStore::favorites(),
            cart: SelectionStore::cart(),
            debounce,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, FetchError> {
        let source = HttpCatalog::from_config(&config.catalog)?;
        Ok(Self::new(Arc::new(source), config.search.debounce()))
    }

    pub fn favorites_store(&self) -> &SelectionStore {
        &self.favorites
    }

    pub fn cart_store(&self) -> &SelectionStore {
        &self.cart
    }

    pub fn toggle_favorite(&self, id: &ProductId) -> bool {
        self.favorites.toggle(id)
    }

    pub fn toggle_cart(&self, id: &ProductId) -> bool {
        self.cart.toggle(id)
    }

    pub fn cart_count(&self) -> usize {
        self.cart.len()
    }

    pub fn search_controller(&self) -> SearchController {
        SearchController::new(Arc::clone(&self.cache), self.debounce)
    }

    pub async fn reload(&self) -> Result<CatalogSnapshot, FetchError> {
        info!(event_name = "storefront.reload", "manual catalog reload requested");
        self.cache.reload().await
    }

    pub async fn home(&self) -> Result<Vec<ProductCard>, FetchError> {
        let snapshot = self.cache.snapshot().await?;
        Ok(self.cards(snapshot.catalog.iter().cloned()))
    }

    pub async fn deals(&self) -> Result<Vec<ProductCard>, FetchError> {
        let snapshot = self.cache.snapshot().await?;
        Ok(self.cards(catalog::deals(snapshot.catalog.iter())))
    }

    pub async fn favorites(&self) -> Result<Vec<ProductCard>, FetchError> {
        let snapshot = self.cache.snapshot().await?;
        let selected = catalog::favorites(snapshot.catalog.iter(), &self.favorites.snapshot());
        Ok(self.cards(selected))
    }

    pub async fn cart(&self) -> Result<CartSummary, FetchError> {
        let snapshot = self.cache.snapshot().await?;
        Ok(catalog::cart_summary(snapshot.catalog.iter(), &self.cart.snapshot()))
    }

    /// Detail pages always ask the single-resource endpoint.
    pub async fn detail(&self, id: &ProductId) -> Result<ProductCard, FetchError> {
        let product = self.cache.source().fetch_one(id).await?;
        Ok(self.card(product, &self.favorites.snapshot(), &self.cart.snapshot()))
    }

    fn cards(&self, products: impl IntoIterator<Item = Product>) -> Vec<ProductCard> {
        let favorites = self.favorites.snapshot();
        let cart = self.cart.snapshot();
        products.into_iter().map(|product| self.card(product, &favorites, &cart)).collect()
    }

    fn card(
        &self,
        product: Product,
        favorites: &SelectionSnapshot,
        cart: &SelectionSnapshot,
    ) -> ProductCard {
        ProductCard {
            favorite: favorites.is_selected(&product.id),
            in_cart: cart.is_selected(&product.id),
            product,
        }
    }
}
