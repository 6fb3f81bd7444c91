use std::sync::Arc;
use std::time::Duration;

use furnish_core::catalog::search;
use furnish_core::domain::product::Product;
use furnish_core::errors::FetchError;
use tokio::sync::watch;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::CatalogCache;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchResults {
    pub query: String,
    pub generation: u64,
    pub products: Vec<Product>,
    pub error: Option<FetchError>,
}

/// Debounced search over the cached catalog.
///
/// Every [`SearchController::input`] cancels the pending evaluation and
/// schedules a new one after the quiet period. Only the evaluation for the
/// latest input may publish.
pub struct SearchController {
    cache: Arc<CatalogCache>,
    debounce: Duration,
    generation: u64,
    in_flight: Option<CancellationToken>,
    closed: CancellationToken,
    results: Arc<watch::Sender<SearchResults>>,
}

impl SearchController {
    pub fn new(cache: Arc<CatalogCache>, debounce: Duration) -> Self {
        let (results, _) = watch::channel(SearchResults::default());
        Self {
            cache,
            debounce,
            generation: 0,
            in_flight: None,
            closed: CancellationToken::new(),
            results: Arc::new(results),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchResults> {
        self.results.subscribe()
    }

    pub fn latest(&self) -> SearchResults {
        self.results.borrow().clone()
    }

    /// True while a scheduled evaluation has neither published nor been
    /// cancelled.
    pub fn is_pending(&self) -> bool {
        self.in_flight.as_ref().is_some_and(|token| !token.is_cancelled())
    }

    /// Cancels the pending evaluation, if any.
    pub fn cancel(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.cancel();
        }
    }

    /// Handles one keystroke. Must be called inside a tokio runtime.
    pub fn input(&mut self, query: impl Into<String>) {
        let query = query.into();
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        self.cancel();

        if self.closed.is_cancelled() {
            return;
        }

        if query.trim().is_empty() {
            self.results.send_modify(|results| {
                *results = SearchResults { query, generation, ..SearchResults::default() };
            });
            return;
        }

        let cancel = self.closed.child_token();
        self.in_flight = Some(cancel.clone());

        let cache = Arc::clone(&self.cache);
        let results = Arc::clone(&self.results);
        let debounce = self.debounce;

        tokio::spawn(async move {
            if debounce > Duration::ZERO {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = sleep(debounce) => {}
                }
            } else if cancel.is_cancelled() {
                return;
            }

            let snapshot = tokio::select! {
                _ = cancel.cancelled() => return,
                snapshot = cache.snapshot() => snapshot,
            };

            let outcome = match snapshot {
                Ok(snapshot) => SearchResults {
                    products: search(&query, snapshot.catalog.iter()),
                    query,
                    generation,
                    error: None,
                },
                Err(error) => {
                    warn!(
                        event_name = "search.evaluation_failed",
                        generation,
                        error = %error,
                        "search could not load the catalog"
                    );
                    SearchResults { query, generation, products: Vec::new(), error: Some(error) }
                }
            };

            let published = results.send_if_modified(|current| {
                if cancel.is_cancelled() || current.generation > generation {
                    return false;
                }
                *current = outcome;
                // Settled before subscribers are woken.
                cancel.cancel();
                true
            });
            cancel.cancel();
            debug!(
                event_name = "search.evaluated",
                generation,
                published,
                "debounced search evaluated"
            );
        });
    }

    /// Stops the controller; pending and future evaluations never publish.
    pub fn close(&mut self) {
        self.cancel();
        self.closed.cancel();
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.closed.cancel();
    }
}
