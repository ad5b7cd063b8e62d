//! Search-mode selection from raw query text.
//!
//! Detection is a pure function of the query string and only applies
//! when the caller asks for [`SearchMode::Auto`]; an explicit mode
//! bypasses it entirely.

use serde::{Deserialize, Serialize};

use crate::query::range;

/// Search strategy for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Pick a strategy from the query shape.
    #[default]
    Auto,
    /// Threshold-bounded approximate matching.
    Fuzzy,
    /// Case-insensitive substring containment.
    Exact,
    /// Numeric comparison clauses.
    Range,
}

/// Detect the strategy for a query. Never returns [`SearchMode::Auto`].
///
/// Rules, in order: a comparison clause (`field OP number` or
/// `number OP field`) selects `Range`; a quote-wrapped query selects
/// `Exact`; a trimmed query of at most two characters selects `Exact`;
/// anything else is `Fuzzy`.
pub fn detect(query: &str) -> SearchMode {
    let trimmed = query.trim();

    if range::contains_comparison(trimmed) {
        return SearchMode::Range;
    }
    if is_quote_wrapped(trimmed) {
        return SearchMode::Exact;
    }
    if trimmed.chars().count() <= 2 {
        return SearchMode::Exact;
    }
    SearchMode::Fuzzy
}

fn is_quote_wrapped(trimmed: &str) -> bool {
    let bytes = trimmed.as_bytes();
    bytes.len() >= 2 && {
        let first = bytes[0];
        (first == b'"' || first == b'\'') && bytes[bytes.len() - 1] == first
    }
}
