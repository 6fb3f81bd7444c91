//! Toggle maps for favorites and cart membership.
//!
//! A [`SelectionStore`] is a cheap, cloneable handle. All clones share one
//! map, and every mutation is committed under the single writer lock of a
//! `tokio::sync::watch` channel, so subscribers see each toggle in the order
//! it was applied.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

use crate::domain::product::ProductId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKind {
    Favorites,
    Cart,
}

impl SelectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Favorites => "favorites",
            Self::Cart => "cart",
        }
    }
}

impl fmt::Display for SelectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct SelectionMap {
    entries: HashMap<ProductId, bool>,
    revision: u64,
}

/// Read-only copy of a store, used for joins against the catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionSnapshot {
    entries: Arc<HashMap<ProductId, bool>>,
    revision: u64,
}

impl SelectionSnapshot {
    pub fn is_selected(&self, id: &ProductId) -> bool {
        self.entries.get(id).copied().unwrap_or(false)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.entries.values().filter(|selected| **selected).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone)]
pub struct SelectionStore {
    kind: SelectionKind,
    state: Arc<watch::Sender<SelectionMap>>,
}

impl fmt::Debug for SelectionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionStore")
            .field("kind", &self.kind)
            .field("selected", &self.len())
            .finish()
    }
}

impl SelectionStore {
    pub fn new(kind: SelectionKind) -> Self {
        let (sender, _) = watch::channel(SelectionMap::default());
        Self { kind, state: Arc::new(sender) }
    }

    pub fn favorites() -> Self {
        Self::new(SelectionKind::Favorites)
    }

    pub fn cart() -> Self {
        Self::new(SelectionKind::Cart)
    }

    pub fn kind(&self) -> SelectionKind {
        self.kind
    }

    /// Unknown identifiers are unselected.
    pub fn is_selected(&self, id: &ProductId) -> bool {
        self.state.borrow().entries.get(id).copied().unwrap_or(false)
    }

    /// Flips the entry for `id` and returns its new value.
    pub fn toggle(&self, id: &ProductId) -> bool {
        let mut selected = false;
        self.state.send_modify(|map| {
            let entry = map.entries.entry(id.clone()).or_insert(false);
            *entry = !*entry;
            selected = *entry;
            map.revision = map.revision.wrapping_add(1);
        });

        debug!(
            event_name = "selection.toggled",
            store = %self.kind,
            product_id = %id,
            selected,
            "selection entry toggled"
        );
        selected
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        let map = self.state.borrow();
        SelectionSnapshot { entries: Arc::new(map.entries.clone()), revision: map.revision }
    }

    /// Identifiers currently selected, in identifier order.
    pub fn selected_ids(&self) -> BTreeSet<ProductId> {
        self.state
            .borrow()
            .entries
            .iter()
            .filter(|(_, selected)| **selected)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().entries.values().filter(|selected| **selected).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subscribe(&self) -> SelectionSubscription {
        SelectionSubscription { kind: self.kind, receiver: self.state.subscribe() }
    }
}

/// Change feed for a view observing one store.
pub struct SelectionSubscription {
    kind: SelectionKind,
    receiver: watch::Receiver<SelectionMap>,
}

impl SelectionSubscription {
    pub fn kind(&self) -> SelectionKind {
        self.kind
    }

    /// True when a toggle committed since the last `snapshot` or `changed`.
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// Waits for the next committed toggle. Returns `false` once every store
    /// handle has been dropped.
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }

    pub fn snapshot(&mut self) -> SelectionSnapshot {
        let map = self.receiver.borrow_and_update();
        SelectionSnapshot { entries: Arc::new(map.entries.clone()), revision: map.revision }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::{SelectionKind, SelectionStore};
    use crate::domain::product::ProductId;

    fn id(raw: &str) -> ProductId {
        ProductId(raw.to_owned())
    }

    #[test]
    fn unknown_ids_are_unselected() {
        let store = SelectionStore::favorites();

        assert!(!store.is_selected(&id("never-seen")));
        assert!(store.is_empty());
        assert!(!store.snapshot().is_selected(&id("never-seen")));
    }

    #[test]
    fn first_toggle_selects() {
        let store = SelectionStore::cart();

        assert!(store.toggle(&id("abc")));
        assert!(store.is_selected(&id("abc")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn double_toggle_restores_prior_state() {
        let store = SelectionStore::favorites();
        let ids = ["a", "b", "c"].map(id);
        store.toggle(&ids[1]);

        for product in &ids {
            let before = store.is_selected(product);
            store.toggle(product);
            store.toggle(product);
            assert_eq!(store.is_selected(product), before);
        }
    }

    #[test]
    fn clones_share_state() {
        let store = SelectionStore::cart();
        let view_handle = store.clone();

        store.toggle(&id("lamp"));

        assert!(view_handle.is_selected(&id("lamp")));
        assert_eq!(view_handle.kind(), SelectionKind::Cart);
    }

    #[test]
    fn subscribers_observe_toggle_before_it_returns() {
        let store = SelectionStore::favorites();
        let mut subscription = store.subscribe();
        assert!(!subscription.has_changed());

        store.toggle(&id("abc"));

        assert!(subscription.has_changed());
        let snapshot = subscription.snapshot();
        assert!(snapshot.is_selected(&id("abc")));
        assert_eq!(snapshot.revision(), 1);
        assert!(!subscription.has_changed());
    }

    #[test]
    fn untoggled_entries_stay_in_map_but_not_in_selection() {
        let store = SelectionStore::cart();
        store.toggle(&id("a"));
        store.toggle(&id("b"));
        store.toggle(&id("a"));

        let selected: Vec<_> = store.selected_ids().into_iter().collect();
        assert_eq!(selected, vec![id("b")]);
        assert_eq!(store.snapshot().len(), 1);
    }

    #[test]
    fn concurrent_toggles_serialize() {
        let store = Arc::new(SelectionStore::cart());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..100 {
                        store.toggle(&id("shared"));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("toggle thread should not panic");
        }

        assert!(!store.is_selected(&id("shared")), "800 toggles should cancel out");
        assert_eq!(store.snapshot().revision(), 800);
    }

    #[tokio::test]
    async fn changed_wakes_waiting_view() {
        let store = SelectionStore::favorites();
        let mut subscription = store.subscribe();

        let writer = store.clone();
        let task = tokio::spawn(async move {
            writer.toggle(&ProductId("chair".to_owned()));
        });

        assert!(subscription.changed().await);
        assert!(subscription.snapshot().is_selected(&id("chair")));
        task.await.expect("writer task should finish");
    }
}
