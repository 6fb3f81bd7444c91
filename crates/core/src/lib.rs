//! Storefront core: catalog records, selection stores, search and the
//! derived views joined from them.

pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod fetch;
pub mod selection;

pub use catalog::{search, Catalog, CartLine, CartSummary};
pub use domain::product::{decode_catalog, decode_product, Product, ProductId, ProductRecord};
pub use errors::{DecodeError, FetchError};
pub use fetch::{FetchPhase, FetchState, FetchTransitionError};
pub use selection::{SelectionKind, SelectionSnapshot, SelectionStore, SelectionSubscription};
