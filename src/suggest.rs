//! Autocomplete suggestion generation from field values.
//!
//! Suggestions are existing stringified values of configured keys that
//! contain the partial query, deduplicated case-insensitively in
//! first-seen order and capped. The scan is read-only and touches
//! records in dataset order, keys in configured order.

use ahash::AHashSet;

use crate::normalize::{fold_string, TextNormalization};
use crate::record::Record;

/// Collect up to `limit` suggestion candidates for a partial query.
///
/// A blank query yields nothing: every value contains the empty
/// string, and surfacing arbitrary leading values helps no one typing
/// in a search box.
pub fn suggestions(
    records: &[Record],
    keys: &[String],
    query: &str,
    limit: usize,
    normalization: TextNormalization,
) -> Vec<String> {
    let needle = fold_string(query.trim(), normalization);
    if needle.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut seen: AHashSet<String> = AHashSet::new();
    let mut out = Vec::new();

    'scan: for record in records {
        for key in keys {
            let Some(text) = record.get(key).and_then(|value| value.as_text()) else {
                continue;
            };
            let folded = fold_string(&text, normalization);
            if folded.contains(&needle) && seen.insert(folded) {
                out.push(text.into_owned());
                if out.len() == limit {
                    break 'scan;
                }
            }
        }
    }

    out
}
