//! Store - the single mutation point for [`AppState`]
//!
//! Every write goes through [`Store::set_state`] (or one of the helpers built
//! on it) and is immediately followed by a render. The lock is never held
//! across an `.await`.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::actions::Intent;
use crate::record::Record;
use crate::render::{EventKind, RenderEngine, Surface};
use crate::state::{AppState, Collection, Notice, StatePatch, View};

/// How overlapping fetches of one collection are reconciled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseOrdering {
    /// Responses older than the newest dispatched request are dropped
    #[default]
    DiscardStale,
    /// Whatever resolves last is what the state shows
    LastWriteWins,
}

/// Identifies one dispatched fetch of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    pub collection: Collection,
    pub generation: u64,
}

struct Inner {
    state: AppState,
    engine: RenderEngine,
    generations: HashMap<Collection, u64>,
}

impl Inner {
    fn render(&mut self) -> View {
        let Inner { state, engine, .. } = self;
        engine.render(state)
    }
}

pub struct Store {
    inner: Mutex<Inner>,
    ordering: ResponseOrdering,
}

impl Store {
    pub fn new(surface: impl Surface + 'static, ordering: ResponseOrdering) -> Self {
        Self::with_state(AppState::default(), surface, ordering)
    }

    pub fn with_state(
        state: AppState,
        surface: impl Surface + 'static,
        ordering: ResponseOrdering,
    ) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state,
                engine: RenderEngine::new(surface),
                generations: HashMap::new(),
            }),
            ordering,
        }
    }

    /// Snapshot for views and handlers
    pub fn read(&self) -> AppState {
        self.inner.lock().state.clone()
    }

    /// Read one value without cloning the whole state
    pub fn select<T>(&self, f: impl FnOnce(&AppState) -> T) -> T {
        f(&self.inner.lock().state)
    }

    /// Merge a patch and re-render. Returns the view actually shown.
    pub fn set_state(&self, patch: StatePatch) -> View {
        let mut inner = self.inner.lock();
        inner.state.apply(patch);
        inner.render()
    }

    /// Atomic read-modify-write: the patch is computed under the lock
    pub fn update(&self, f: impl FnOnce(&AppState) -> StatePatch) -> View {
        let mut inner = self.inner.lock();
        let patch = f(&inner.state);
        inner.state.apply(patch);
        inner.render()
    }

    /// Surface a notice to the user
    pub fn push_notice(&self, notice: Notice) {
        let mut inner = self.inner.lock();
        inner.state.push_notice(notice);
        inner.render();
    }

    /// Re-render without changing state
    pub fn render(&self) -> View {
        self.inner.lock().render()
    }

    /// Register a new fetch of `collection`
    pub fn begin_request(&self, collection: Collection) -> RequestToken {
        let mut inner = self.inner.lock();
        let generation = inner.generations.entry(collection).or_insert(0);
        *generation += 1;
        RequestToken {
            collection,
            generation: *generation,
        }
    }

    /// Apply a fetch result as a full-collection replace.
    ///
    /// Returns false when the response was discarded as stale.
    pub fn commit(&self, token: RequestToken, records: Vec<Record>) -> bool {
        let mut inner = self.inner.lock();
        let latest = inner
            .generations
            .get(&token.collection)
            .copied()
            .unwrap_or(0);

        if self.ordering == ResponseOrdering::DiscardStale && token.generation < latest {
            info!(
                collection = %token.collection,
                generation = token.generation,
                latest,
                "Discarding stale response"
            );
            return false;
        }

        debug!(collection = %token.collection, rows = records.len(), "Replacing collection");
        inner
            .state
            .apply(StatePatch::new().collection(token.collection, records));
        inner.render();
        true
    }

    /// Intent bound to an element of the current tree
    pub fn resolve(&self, element_id: &str, event: EventKind) -> Option<Intent> {
        self.inner
            .lock()
            .engine
            .registry()
            .resolve(element_id, event)
            .cloned()
    }

    pub fn ordering(&self) -> ResponseOrdering {
        self.ordering
    }

    pub fn render_count(&self) -> u64 {
        self.inner.lock().engine.render_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::MemorySurface;

    fn rows(ids: &[&str]) -> Vec<Record> {
        ids.iter().map(|id| Record::new().with("id", *id)).collect()
    }

    fn listing_ids(store: &Store) -> Vec<String> {
        store.select(|s| {
            s.collection(Collection::Listings)
                .iter()
                .filter_map(Record::id)
                .collect()
        })
    }

    #[test]
    fn test_set_state_renders() {
        let surface = MemorySurface::new();
        let store = Store::new(surface.clone(), ResponseOrdering::default());
        store.set_state(StatePatch::navigate(View::Signup, None));
        assert_eq!(surface.render_count(), 1);
        assert!(surface.html().contains("signup-form"));
    }

    #[test]
    fn test_stale_commit_is_discarded() {
        let store = Store::new(MemorySurface::new(), ResponseOrdering::DiscardStale);
        let first = store.begin_request(Collection::Listings);
        let second = store.begin_request(Collection::Listings);
        assert!(store.commit(second, rows(&["new"])));
        assert!(!store.commit(first, rows(&["old"])));
        assert_eq!(listing_ids(&store), ["new"]);
    }

    #[test]
    fn test_last_write_wins_applies_everything() {
        let store = Store::new(MemorySurface::new(), ResponseOrdering::LastWriteWins);
        let first = store.begin_request(Collection::Listings);
        let second = store.begin_request(Collection::Listings);
        assert!(store.commit(second, rows(&["new"])));
        assert!(store.commit(first, rows(&["old"])));
        assert_eq!(listing_ids(&store), ["old"]);
    }

    #[test]
    fn test_generations_are_per_collection() {
        let store = Store::new(MemorySurface::new(), ResponseOrdering::DiscardStale);
        let listings = store.begin_request(Collection::Listings);
        store.begin_request(Collection::Bookings);
        assert!(store.commit(listings, rows(&["a"])));
    }
}
