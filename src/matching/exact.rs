//! Case-insensitive exact substring matching.
//!
//! The exact strategy serves quoted queries and very short queries,
//! where approximate matching would be noise. No scoring: a record
//! either contains the cleaned query in one of its keyed values or it
//! does not.

use crate::normalize::{fold_string, TextNormalization};
use crate::record::Record;

/// Strip one pair of wrapping quotes (single or double) from a trimmed
/// query.
pub fn strip_quotes(query: &str) -> &str {
    let trimmed = query.trim();
    let bytes = trimmed.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        if (first == b'"' || first == b'\'') && bytes[bytes.len() - 1] == first {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}

/// Indices of records whose keyed values contain the cleaned query.
///
/// The query is quote-stripped and folded; each configured key's
/// stringified value is folded the same way. An empty cleaned query
/// matches every record.
pub fn search(
    records: &[Record],
    keys: &[String],
    query: &str,
    normalization: TextNormalization,
) -> Vec<usize> {
    let needle = fold_string(strip_quotes(query), normalization);
    if needle.is_empty() {
        return (0..records.len()).collect();
    }

    records
        .iter()
        .enumerate()
        .filter(|(_, record)| record_contains(record, keys, &needle, normalization))
        .map(|(i, _)| i)
        .collect()
}

fn record_contains(
    record: &Record,
    keys: &[String],
    needle: &str,
    normalization: TextNormalization,
) -> bool {
    keys.iter().any(|key| {
        record
            .get(key)
            .and_then(|value| value.as_text())
            .is_some_and(|text| fold_string(&text, normalization).contains(needle))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> (Vec<Record>, Vec<String>) {
        let records = vec![
            Record::new().with("name", "Alice").with("age", 30),
            Record::new().with("name", "Bob").with("age", 45),
            Record::new().with("name", "Carol").with("age", 22),
        ];
        (records, vec!["name".to_string(), "age".to_string()])
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("\"bob\""), "bob");
        assert_eq!(strip_quotes("'bob'"), "bob");
        assert_eq!(strip_quotes("bob"), "bob");
        assert_eq!(strip_quotes("\"bob'"), "\"bob'");
        assert_eq!(strip_quotes("  \"bob\"  "), "bob");
        assert_eq!(strip_quotes("\""), "\"");
    }

    #[test]
    fn test_case_insensitive_substring() {
        let (records, keys) = dataset();
        let hits = search(&records, &keys, "\"bob\"", TextNormalization::CaseFold);
        assert_eq!(hits, vec![1]);
    }

    #[test]
    fn test_short_query() {
        let (records, keys) = dataset();
        let hits = search(&records, &keys, "al", TextNormalization::CaseFold);
        assert_eq!(hits, vec![0]);
    }

    #[test]
    fn test_numeric_value_substring() {
        let (records, keys) = dataset();
        let hits = search(&records, &keys, "45", TextNormalization::CaseFold);
        assert_eq!(hits, vec![1]);
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let (records, keys) = dataset();
        let hits = search(&records, &keys, "\"\"", TextNormalization::CaseFold);
        assert_eq!(hits, vec![0, 1, 2]);
    }

    #[test]
    fn test_no_match() {
        let (records, keys) = dataset();
        assert!(search(&records, &keys, "zzz", TextNormalization::CaseFold).is_empty());
    }
}
