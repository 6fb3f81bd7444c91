//! Catalog access for the storefront.
//!
//! - **HTTP** (`http`) - `CatalogSource` trait and the `reqwest` client
//! - **Cache** (`cache`) - last successful catalog snapshot, explicit reload
//! - **Views** (`view`) - view lifetimes and per-site fetch state
//! - **Search** (`search`) - debounced, cancellable search controller
//! - **Storefront** (`storefront`) - page models joining catalog and selections
//!
//! ```text
//! View → FetchCell → Storefront → CatalogCache → HttpCatalog → REST catalog
//!                        ↓
//!               SelectionStore (favorites, cart)
//! ```

pub mod cache;
pub mod http;
pub mod search;
pub mod storefront;
pub mod view;

pub use cache::{CatalogCache, CatalogSnapshot};
pub use http::{CatalogSource, HttpCatalog};
pub use search::{SearchController, SearchResults};
pub use storefront::{ProductCard, Storefront};
pub use view::{FetchCell, ViewScope};

#[cfg(test)]
pub(crate) mod testing;
