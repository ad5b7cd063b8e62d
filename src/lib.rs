//! rowsift - multi-mode interactive search over in-memory tabular records
//!
//! A small engine for keystroke-driven filtering of flat table rows
//! (payroll, employee directories, admin grids) entirely in process.
//!
//! # Features
//! - Automatic field discovery with injectable pattern tables
//! - Query-shape detection: fuzzy, exact-substring, or numeric range
//! - Bit-parallel approximate matching with scores and highlight ranges
//! - A small `field OP number` comparison grammar with AND semantics
//! - Autocomplete suggestions drawn from field values
//! - A debounced coordinator with an explicit, clock-driven timer
//!
//! # Quick start
//!
//! ```rust
//! use rowsift::{Record, SearchConfig, SearchEngine, SearchMode};
//!
//! let records = vec![
//!     Record::new().with("name", "Alice").with("age", 30),
//!     Record::new().with("name", "Bob").with("age", 45),
//!     Record::new().with("name", "Carol").with("age", 22),
//! ];
//!
//! let engine = SearchEngine::new(records, SearchConfig::default());
//!
//! // Query shape picks the strategy: this is a range query.
//! let adults = engine.search("age>25", SearchMode::Auto);
//! assert_eq!(adults.len(), 2);
//!
//! // Quoted queries match exact substrings, case-insensitively.
//! let bob = engine.search("\"bob\"", SearchMode::Auto);
//! assert_eq!(bob.len(), 1);
//! ```
//!
//! The query path is total: any query string in any mode returns a
//! (possibly empty) result sequence and never panics.

pub mod classify;
pub mod config;
pub mod coordinator;
pub mod engine;
pub mod matching;
pub mod normalize;
pub mod query;
pub mod record;
pub mod shared;
pub mod stats;
pub mod suggest;

pub use config::{ClassifierProfile, ConfigError, SearchConfig, SearchConfigBuilder};
pub use coordinator::{DatasetVersion, DebounceState, DebounceTimer, SearchCoordinator};
pub use engine::{ExecutedMode, SearchEngine, SearchResult};
pub use matching::FieldMatch;
pub use normalize::TextNormalization;
pub use query::{ComparisonOp, RangeExpression, SearchMode};
pub use record::{records_from_json, FieldValue, Record};
pub use shared::SharedCoordinator;
pub use stats::SearchStats;

/// One-shot search with the default configuration.
///
/// Convenience for callers without a long-lived engine; building the
/// engine classifies fields from the dataset sample each call, so
/// hosts issuing repeated queries should hold a [`SearchEngine`] or
/// [`SearchCoordinator`] instead.
pub fn search_once(records: &[Record], query: &str) -> Vec<SearchResult> {
    SearchEngine::with_defaults(records.to_vec()).search(query, SearchMode::Auto)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_once() {
        let records = vec![
            Record::new().with("name", "Alice").with("age", 30),
            Record::new().with("name", "Bob").with("age", 45),
        ];

        assert_eq!(search_once(&records, "age>40").len(), 1);
        assert_eq!(search_once(&records, "").len(), 2);
    }
}
