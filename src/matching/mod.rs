//! Matching strategies: exact substring containment and bit-parallel
//! approximate matching.

pub mod bitap;
pub mod exact;
pub mod fuzzy;

use serde::{Deserialize, Serialize};

/// Inclusive `(start, end)` character-offset range into a folded value,
/// suitable for highlight rendering.
pub type MatchRange = (usize, usize);

/// One matched field of a record: which key matched, the stringified
/// value it matched in, and the highlighted character runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMatch {
    /// Field name that produced the match.
    pub key: String,
    /// Stringified field value the ranges index into.
    pub value: String,
    /// Inclusive character ranges of matched runs.
    pub indices: Vec<MatchRange>,
}
