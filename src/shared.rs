//! Shared wrapper for handing one coordinator to several owners.
//!
//! [`SearchCoordinator`] is deliberately single-owner; hosts that need
//! to reach the same coordinator from more than one place (an input
//! handler and a data-refresh path, say) can clone this handle
//! instead. Every operation takes the lock for its full duration, so
//! exclusive mutation is preserved and searches never interleave with
//! data updates.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::config::SearchConfig;
use crate::coordinator::{DatasetVersion, DebounceState, SearchCoordinator};
use crate::engine::SearchResult;
use crate::query::SearchMode;
use crate::record::Record;
use crate::stats::SearchStats;

/// Clone-able handle to a mutex-guarded [`SearchCoordinator`].
#[derive(Clone)]
pub struct SharedCoordinator {
    inner: Arc<Mutex<SearchCoordinator>>,
}

impl SharedCoordinator {
    /// Create a shared coordinator over a fresh dataset snapshot.
    pub fn new(records: Vec<Record>, config: SearchConfig, version: DatasetVersion) -> Self {
        Self::from_coordinator(SearchCoordinator::new(records, config, version))
    }

    /// Wrap an existing coordinator.
    pub fn from_coordinator(coordinator: SearchCoordinator) -> Self {
        Self {
            inner: Arc::new(Mutex::new(coordinator)),
        }
    }

    /// Immediate search. Holds the lock for the whole scan.
    pub fn search(&self, query: &str, mode: SearchMode) -> Vec<SearchResult> {
        self.inner.lock().search(query, mode)
    }

    /// Schedule a debounced search; replaces any pending one.
    pub fn search_debounced(
        &self,
        query: impl Into<String>,
        now: Instant,
        on_result: impl FnMut(Vec<SearchResult>) + Send + 'static,
    ) {
        self.inner.lock().search_debounced(query, now, on_result)
    }

    /// Drive the debounce timer.
    pub fn tick(&self, now: Instant) -> DebounceState {
        self.inner.lock().tick(now)
    }

    /// Discard any pending debounced query.
    pub fn cancel_pending(&self) {
        self.inner.lock().cancel_pending()
    }

    /// Replace the dataset snapshot under a new version token.
    pub fn update_data(&self, records: Vec<Record>, version: DatasetVersion) {
        self.inner.lock().update_data(records, version)
    }

    /// Forget the current version token.
    pub fn invalidate(&self) {
        self.inner.lock().invalidate()
    }

    /// Re-run field classification.
    pub fn rebuild(&self) {
        self.inner.lock().rebuild()
    }

    /// Autocomplete candidates.
    pub fn suggestions(&self, query: &str, limit: usize) -> Vec<String> {
        self.inner.lock().suggestions(query, limit)
    }

    /// Current debounce state.
    pub fn state(&self) -> DebounceState {
        self.inner.lock().state()
    }

    /// Snapshot of the cumulative counters.
    pub fn stats(&self) -> SearchStats {
        self.inner.lock().stats().clone()
    }

    /// Current dataset version token.
    pub fn version(&self) -> Option<DatasetVersion> {
        self.inner.lock().version()
    }
}
