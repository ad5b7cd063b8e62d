//! Per-coordinator search counters.
//!
//! Cheap cumulative tallies a host can surface in a debug panel:
//! which strategies actually ran, how often range queries degraded to
//! fuzzy, and how much the debounce layer collapsed.

use serde::Serialize;

use crate::engine::ExecutedMode;

/// Cumulative counters for one coordinator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// Ranked or intersected fuzzy passes.
    pub fuzzy_searches: u64,
    /// Exact substring passes.
    pub exact_searches: u64,
    /// Range evaluations with at least one surviving clause.
    pub range_searches: u64,
    /// Range queries whose clauses all dropped, degrading to fuzzy.
    pub range_fallbacks: u64,
    /// Blank queries answered with the full dataset.
    pub empty_queries: u64,
    /// Pending debounced queries replaced before firing.
    pub debounce_cancellations: u64,
    /// Debounced searches that actually ran.
    pub debounce_fired: u64,
    /// Result count of the most recent search.
    pub last_result_count: usize,
}

impl SearchStats {
    /// Record one executed search.
    pub fn record_search(&mut self, executed: ExecutedMode, result_count: usize) {
        match executed {
            ExecutedMode::Fuzzy => self.fuzzy_searches += 1,
            ExecutedMode::Exact => self.exact_searches += 1,
            ExecutedMode::Range => self.range_searches += 1,
            ExecutedMode::RangeFallback => {
                self.fuzzy_searches += 1;
                self.range_fallbacks += 1;
            }
            ExecutedMode::EmptyQuery => self.empty_queries += 1,
        }
        self.last_result_count = result_count;
    }

    /// Record a pending debounced query being replaced.
    pub fn record_cancellation(&mut self) {
        self.debounce_cancellations += 1;
    }

    /// Record a debounced search firing.
    pub fn record_fired(&mut self) {
        self.debounce_fired += 1;
    }

    /// Total searches executed, regardless of strategy.
    pub fn total_searches(&self) -> u64 {
        self.fuzzy_searches + self.exact_searches + self.range_searches + self.empty_queries
    }
}
