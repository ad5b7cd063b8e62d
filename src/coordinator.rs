//! The search coordinator: exclusive engine ownership, debounced
//! scheduling, and explicit dataset-version caching.
//!
//! The debounce layer is a plain cancellable timer value polled with a
//! caller-supplied clock, so the Idle → Pending → Searching → Idle
//! cycle is testable without a UI or real time. A query arriving while
//! one is pending replaces it and resets the timer (last write wins);
//! once a search starts it runs to completion.
//!
//! Dataset identity is an explicit caller-supplied version token, not
//! reference identity: `update_data` with the current token is a
//! no-op, `invalidate` forgets the token, and `rebuild` re-runs field
//! classification in place.

use std::time::{Duration, Instant};

use crate::config::SearchConfig;
use crate::engine::{SearchEngine, SearchResult};
use crate::query::SearchMode;
use crate::record::Record;
use crate::stats::SearchStats;

/// Debounce phase of a coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebounceState {
    /// No debounced query is waiting.
    #[default]
    Idle,
    /// A query is waiting for the quiet period to elapse.
    Pending,
    /// The quiet period elapsed and the search is executing. Only
    /// observable from within the result callback; `tick` returns to
    /// `Idle` afterwards.
    Searching,
}

/// Caller-supplied identity token for a dataset snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatasetVersion(pub u64);

/// A cancellable one-shot timer polled against a caller-supplied
/// clock.
#[derive(Debug, Clone)]
pub struct DebounceTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl DebounceTimer {
    /// Create a disarmed timer with the given quiet period.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Arm (or re-arm) the timer: the deadline becomes `now + delay`.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Disarm without firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Whether a deadline is set.
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// The pending deadline, if armed.
    pub fn fires_at(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fire if the deadline has passed. Firing disarms the timer.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

type ResultSink = Box<dyn FnMut(Vec<SearchResult>) + Send>;

struct PendingSearch {
    query: String,
    sink: ResultSink,
}

/// Owns one [`SearchEngine`] and coordinates immediate and debounced
/// queries against it.
///
/// # Example
///
/// ```rust
/// use std::time::{Duration, Instant};
/// use rowsift::config::SearchConfig;
/// use rowsift::coordinator::{DatasetVersion, SearchCoordinator};
/// use rowsift::record::Record;
///
/// let records = vec![Record::new().with("name", "Alice").with("age", 30)];
/// let mut coordinator =
///     SearchCoordinator::new(records, SearchConfig::default(), DatasetVersion(1));
///
/// let start = Instant::now();
/// coordinator.search_debounced("alice", start, |results| {
///     assert_eq!(results.len(), 1);
/// });
/// coordinator.tick(start + Duration::from_millis(400));
/// ```
pub struct SearchCoordinator {
    engine: SearchEngine,
    timer: DebounceTimer,
    pending: Option<PendingSearch>,
    state: DebounceState,
    version: Option<DatasetVersion>,
    stats: SearchStats,
}

impl SearchCoordinator {
    /// Create a coordinator bound to a dataset snapshot and its
    /// version token.
    pub fn new(records: Vec<Record>, config: SearchConfig, version: DatasetVersion) -> Self {
        let delay = Duration::from_millis(config.debounce_delay_ms);
        Self {
            engine: SearchEngine::new(records, config),
            timer: DebounceTimer::new(delay),
            pending: None,
            state: DebounceState::Idle,
            version: Some(version),
            stats: SearchStats::default(),
        }
    }

    /// Immediate, synchronous search. Does not touch any pending
    /// debounced query.
    pub fn search(&mut self, query: &str, mode: SearchMode) -> Vec<SearchResult> {
        let (results, executed) = self.engine.search_with_outcome(query, mode);
        self.stats.record_search(executed, results.len());
        results
    }

    /// Schedule a debounced search in automatic mode.
    ///
    /// Replaces any pending query and callback and re-arms the timer
    /// from `now`. The callback runs inside a later [`tick`] call once
    /// the quiet period has elapsed.
    ///
    /// [`tick`]: SearchCoordinator::tick
    pub fn search_debounced(
        &mut self,
        query: impl Into<String>,
        now: Instant,
        on_result: impl FnMut(Vec<SearchResult>) + Send + 'static,
    ) {
        if self.pending.is_some() {
            self.stats.record_cancellation();
            tracing::trace!("pending debounced query replaced");
        }

        self.pending = Some(PendingSearch {
            query: query.into(),
            sink: Box::new(on_result),
        });
        self.timer.arm(now);
        self.state = DebounceState::Pending;
    }

    /// Drive the debounce timer.
    ///
    /// When the quiet period has elapsed, the pending query runs
    /// synchronously and its callback receives the results. Returns
    /// the state after the call: `Pending` while waiting, `Idle` once
    /// fired (or when nothing was scheduled).
    pub fn tick(&mut self, now: Instant) -> DebounceState {
        if self.state != DebounceState::Pending || !self.timer.poll(now) {
            return self.state;
        }

        let Some(mut pending) = self.pending.take() else {
            self.state = DebounceState::Idle;
            return self.state;
        };

        self.state = DebounceState::Searching;
        self.stats.record_fired();
        let results = self.search(&pending.query, SearchMode::Auto);
        (pending.sink)(results);
        self.state = DebounceState::Idle;
        self.state
    }

    /// Discard any pending debounced query without running it.
    pub fn cancel_pending(&mut self) {
        if self.pending.take().is_some() {
            self.stats.record_cancellation();
        }
        self.timer.cancel();
        self.state = DebounceState::Idle;
    }

    /// Replace the dataset snapshot when `version` differs from the
    /// current token. Auto-derived keys are reclassified on every
    /// applied update.
    pub fn update_data(&mut self, records: Vec<Record>, version: DatasetVersion) {
        if self.version == Some(version) {
            tracing::trace!(?version, "dataset version unchanged, skipping rebuild");
            return;
        }
        self.engine.update_data(records);
        self.version = Some(version);
    }

    /// Forget the current version token so the next `update_data`
    /// always applies.
    pub fn invalidate(&mut self) {
        self.version = None;
    }

    /// Re-run field classification against the current snapshot.
    pub fn rebuild(&mut self) {
        self.engine.rebuild_keys();
    }

    /// Autocomplete candidates for a partial query.
    pub fn suggestions(&self, query: &str, limit: usize) -> Vec<String> {
        self.engine.suggestions(query, limit)
    }

    /// Current debounce state.
    pub fn state(&self) -> DebounceState {
        self.state
    }

    /// Deadline of the pending debounced query, if any.
    pub fn pending_fires_at(&self) -> Option<Instant> {
        self.timer.fires_at()
    }

    /// Cumulative counters.
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// The current dataset version token.
    pub fn version(&self) -> Option<DatasetVersion> {
        self.version
    }

    /// Borrow the underlying engine.
    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn people() -> Vec<Record> {
        vec![
            Record::new().with("name", "Alice").with("age", 30),
            Record::new().with("name", "Bob").with("age", 45),
            Record::new().with("name", "Carol").with("age", 22),
        ]
    }

    fn coordinator() -> SearchCoordinator {
        SearchCoordinator::new(people(), SearchConfig::default(), DatasetVersion(1))
    }

    #[test]
    fn test_timer_arm_and_poll() {
        let start = Instant::now();
        let mut timer = DebounceTimer::new(Duration::from_millis(300));

        assert!(!timer.is_armed());
        timer.arm(start);
        assert!(timer.is_armed());

        assert!(!timer.poll(start + Duration::from_millis(299)));
        assert!(timer.poll(start + Duration::from_millis(300)));
        // Firing disarms.
        assert!(!timer.poll(start + Duration::from_millis(301)));
    }

    #[test]
    fn test_timer_rearm_resets_deadline() {
        let start = Instant::now();
        let mut timer = DebounceTimer::new(Duration::from_millis(300));

        timer.arm(start);
        timer.arm(start + Duration::from_millis(200));
        assert!(!timer.poll(start + Duration::from_millis(400)));
        assert!(timer.poll(start + Duration::from_millis(500)));
    }

    #[test]
    fn test_debounce_fires_after_quiet_period() {
        let mut coordinator = coordinator();
        let start = Instant::now();
        let received: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&received);
        coordinator.search_debounced("\"bob\"", start, move |results| {
            sink.lock().unwrap().push(results.len());
        });

        assert_eq!(coordinator.state(), DebounceState::Pending);
        assert_eq!(coordinator.tick(start + Duration::from_millis(100)), DebounceState::Pending);
        assert!(received.lock().unwrap().is_empty());

        assert_eq!(coordinator.tick(start + Duration::from_millis(300)), DebounceState::Idle);
        assert_eq!(*received.lock().unwrap(), vec![1]);
        assert_eq!(coordinator.stats().debounce_fired, 1);
    }

    #[test]
    fn test_last_write_wins() {
        let mut coordinator = coordinator();
        let start = Instant::now();
        let received: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&received);
        coordinator.search_debounced("alice", start, move |_| {
            sink.lock().unwrap().push("first".into());
        });

        let sink = Arc::clone(&received);
        coordinator.search_debounced("\"carol\"", start + Duration::from_millis(200), move |_| {
            sink.lock().unwrap().push("second".into());
        });

        // The first deadline has passed, but the query was replaced and
        // the timer reset.
        assert_eq!(coordinator.tick(start + Duration::from_millis(400)), DebounceState::Pending);
        assert_eq!(coordinator.tick(start + Duration::from_millis(500)), DebounceState::Idle);

        assert_eq!(*received.lock().unwrap(), vec!["second".to_string()]);
        assert_eq!(coordinator.stats().debounce_cancellations, 1);
        assert_eq!(coordinator.stats().debounce_fired, 1);
    }

    #[test]
    fn test_tick_without_pending_is_idle() {
        let mut coordinator = coordinator();
        assert_eq!(coordinator.tick(Instant::now()), DebounceState::Idle);
    }

    #[test]
    fn test_cancel_pending() {
        let mut coordinator = coordinator();
        let start = Instant::now();

        coordinator.search_debounced("alice", start, |_| panic!("must not fire"));
        coordinator.cancel_pending();

        assert_eq!(coordinator.state(), DebounceState::Idle);
        assert_eq!(coordinator.tick(start + Duration::from_secs(10)), DebounceState::Idle);
    }

    #[test]
    fn test_version_token_caching() {
        let mut coordinator = coordinator();

        // Same token: update skipped.
        coordinator.update_data(vec![Record::new().with("name", "Dave")], DatasetVersion(1));
        assert_eq!(coordinator.engine().len(), 3);

        // New token: update applied.
        coordinator.update_data(vec![Record::new().with("name", "Dave")], DatasetVersion(2));
        assert_eq!(coordinator.engine().len(), 1);
    }

    #[test]
    fn test_invalidate_forces_update() {
        let mut coordinator = coordinator();
        coordinator.invalidate();
        coordinator.update_data(vec![Record::new().with("name", "Dave")], DatasetVersion(1));
        assert_eq!(coordinator.engine().len(), 1);
    }

    #[test]
    fn test_immediate_search_records_stats() {
        let mut coordinator = coordinator();
        coordinator.search("age>25", SearchMode::Auto);
        coordinator.search("alice", SearchMode::Auto);
        coordinator.search("", SearchMode::Auto);

        let stats = coordinator.stats();
        assert_eq!(stats.range_searches, 1);
        assert_eq!(stats.fuzzy_searches, 1);
        assert_eq!(stats.empty_queries, 1);
    }

    #[test]
    fn test_suggestions_pass_through() {
        let coordinator = coordinator();
        let out = coordinator.suggestions("ali", 5);
        assert_eq!(out, vec!["Alice".to_string()]);
    }
}
