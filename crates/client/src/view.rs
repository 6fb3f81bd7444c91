use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use furnish_core::errors::FetchError;
use furnish_core::fetch::FetchState;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Lifetime of one mounted view. Closing or dropping it cancels every fetch
/// started through it.
#[derive(Debug, Default)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// A nested scope that closes with its parent or on its own.
    pub fn child(&self) -> Self {
        Self { token: self.token.child_token() }
    }

    pub fn close(&self) {
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    pub async fn run<F>(&self, future: F) -> Result<F::Output, FetchError>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(FetchError::Cancelled),
            output = future => Ok(output),
        }
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Fetch state for one call site, published to whoever renders it.
///
/// Each [`FetchCell::load`] supersedes the previous one; results that arrive
/// after a newer load started, or after the scope closed, are dropped.
pub struct FetchCell<T> {
    name: &'static str,
    state: watch::Sender<FetchState<T>>,
    generation: AtomicU64,
}

impl<T> FetchCell<T>
where
    T: Clone + Send + Sync,
{
    pub fn new(name: &'static str) -> Self {
        let (state, _) = watch::channel(FetchState::Idle);
        Self { name, state, generation: AtomicU64::new(0) }
    }

    pub fn state(&self) -> FetchState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.state.subscribe()
    }

    pub async fn load<F>(&self, scope: &ViewScope, request: F) -> FetchState<T>
    where
        F: Future<Output = Result<T, FetchError>>,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(FetchState::begin);

        let result = match scope.run(request).await {
            Ok(result) => result,
            Err(_) => {
                debug!(
                    event_name = "view.fetch.cancelled",
                    view = self.name,
                    generation,
                    "view closed before fetch completed"
                );
                return self.state();
            }
        };

        let name = self.name;
        self.state.send_if_modified(|state| {
            if scope.is_closed() || self.generation.load(Ordering::SeqCst) != generation {
                debug!(
                    event_name = "view.fetch.discarded",
                    view = name,
                    generation,
                    "late fetch result discarded"
                );
                return false;
            }
            match state.resolve(result) {
                Ok(()) => true,
                Err(error) => {
                    warn!(event_name = "view.fetch.rejected", view = name, error = %error, "fetch result rejected");
                    false
                }
            }
        });

        self.state()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use furnish_core::errors::FetchError;
    use furnish_core::fetch::{FetchPhase, FetchState};

    use super::{FetchCell, ViewScope};

    #[tokio::test]
    async fn load_resolves_to_success() {
        let scope = ViewScope::new();
        let cell = FetchCell::<u32>::new("home");
        assert_eq!(cell.state(), FetchState::Idle);

        let state = cell.load(&scope, async { Ok(5) }).await;

        assert_eq!(state, FetchState::Success(5));
    }

    #[tokio::test]
    async fn server_error_then_manual_retry() {
        let scope = ViewScope::new();
        let cell = FetchCell::<u32>::new("home");
        let mut states = cell.subscribe();

        let failed = cell.load(&scope, async { Err(FetchError::Status { status: 500 }) }).await;
        assert_eq!(failed.phase(), FetchPhase::Error);
        assert!(!failed.error().map(FetchError::user_message).unwrap_or_default().is_empty());

        let retry = cell.load(&scope, async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(9)
        });
        tokio::pin!(retry);
        tokio::select! {
            _ = &mut retry => panic!("retry should still be pending"),
            _ = tokio::time::sleep(Duration::from_millis(1)) => {}
        }
        assert!(states.borrow_and_update().is_loading());

        assert_eq!(retry.await, FetchState::Success(9));
    }

    #[tokio::test]
    async fn result_arriving_after_close_is_discarded() {
        let scope = ViewScope::new();
        let cell = FetchCell::<u32>::new("detail");

        let state = cell
            .load(&scope, async {
                scope.close();
                Ok(1)
            })
            .await;

        assert!(state.is_loading(), "closed view must not commit results");
        assert!(cell.state().value().is_none());
    }

    #[tokio::test]
    async fn closed_scope_cancels_new_loads() {
        let scope = ViewScope::new();
        scope.close();
        let cell = FetchCell::<u32>::new("cart");

        let state = cell.load(&scope, async { Ok(2) }).await;

        assert!(state.is_loading());
    }

    #[tokio::test]
    async fn dropping_scope_cancels_in_flight_fetch() {
        let cell = Arc::new(FetchCell::<u32>::new("favorites"));
        let scope = ViewScope::new();
        let child = scope.child();

        let load = {
            let cell = Arc::clone(&cell);
            tokio::spawn(async move {
                cell.load(&child, async {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(3)
                })
                .await
            })
        };

        tokio::task::yield_now().await;
        drop(scope);
        let state = tokio::time::timeout(Duration::from_secs(5), load)
            .await
            .expect("cancellation should end the load promptly")
            .expect("load task joins");

        assert!(state.is_loading());
        assert!(cell.state().value().is_none());
    }

    #[tokio::test]
    async fn newer_load_supersedes_older_one() {
        let scope = Arc::new(ViewScope::new());
        let cell = Arc::new(FetchCell::<u32>::new("search"));

        let slow = {
            let (cell, scope) = (Arc::clone(&cell), Arc::clone(&scope));
            tokio::spawn(async move {
                cell.load(&scope, async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(1)
                })
                .await
            })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;

        let fast = cell.load(&scope, async { Ok(2) }).await;
        assert_eq!(fast, FetchState::Success(2));

        slow.await.expect("slow load joins");
        assert_eq!(cell.state(), FetchState::Success(2), "stale result must not overwrite");
    }
}
