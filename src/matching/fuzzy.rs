//! Threshold-bounded fuzzy matching across configured keys.
//!
//! A single keyword runs one bitap pass per keyed value and keeps the
//! best (lowest) score per record. Multi-keyword queries AND their
//! per-keyword candidate sets by intersection; the per-keyword scores
//! are discarded, so intersected results carry no ranking. That
//! mirrors the established behavior of this engine's consumers and is
//! documented as a known gap rather than silently re-scored.

use ahash::AHashSet;

use crate::matching::bitap::BitapPattern;
use crate::matching::FieldMatch;
use crate::normalize::{fold_chars, TextNormalization};
use crate::record::Record;

/// A scored single-keyword hit.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyOutcome {
    /// Index of the record in the dataset.
    pub index: usize,
    /// Best per-key error fraction; lower is better.
    pub score: f64,
    /// Every key that matched within the threshold, with highlight
    /// ranges.
    pub matches: Vec<FieldMatch>,
}

/// Fuzzy pass output: ranked for single keywords, an unranked
/// intersection for multi-keyword queries.
#[derive(Debug, Clone, PartialEq)]
pub enum FuzzyResults {
    /// Single-keyword results, ascending by score, ties in dataset
    /// order.
    Ranked(Vec<FuzzyOutcome>),
    /// Multi-keyword intersection in dataset order, unscored.
    Intersection(Vec<usize>),
}

/// Matching parameters threaded from the engine configuration.
#[derive(Debug, Clone, Copy)]
pub struct FuzzyParams {
    /// Maximum acceptable error fraction.
    pub threshold: f64,
    /// Minimum highlight-run length.
    pub min_match_char_length: usize,
    /// Folding applied to keywords and values.
    pub normalization: TextNormalization,
}

/// Run the fuzzy strategy for a non-empty, trimmed query.
pub fn search(
    records: &[Record],
    keys: &[String],
    query: &str,
    params: FuzzyParams,
) -> FuzzyResults {
    let keywords: Vec<&str> = query.split_whitespace().collect();

    match keywords.as_slice() {
        [] => FuzzyResults::Ranked(Vec::new()),
        [keyword] => FuzzyResults::Ranked(search_keyword(records, keys, keyword, params)),
        keywords => FuzzyResults::Intersection(intersect_keywords(records, keys, keywords, params)),
    }
}

/// Single-keyword pass: best score per record across all keys.
pub fn search_keyword(
    records: &[Record],
    keys: &[String],
    keyword: &str,
    params: FuzzyParams,
) -> Vec<FuzzyOutcome> {
    let Some(pattern) = BitapPattern::new(fold_chars(keyword, params.normalization)) else {
        return Vec::new();
    };

    let mut outcomes = Vec::new();
    for (index, record) in records.iter().enumerate() {
        if let Some(outcome) = match_record(record, index, keys, &pattern, params) {
            outcomes.push(outcome);
        }
    }

    // Stable sort keeps dataset order for equal scores.
    outcomes.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal));
    outcomes
}

fn match_record(
    record: &Record,
    index: usize,
    keys: &[String],
    pattern: &BitapPattern,
    params: FuzzyParams,
) -> Option<FuzzyOutcome> {
    let mut best: Option<f64> = None;
    let mut matches = Vec::new();

    for key in keys {
        let Some(text) = record.get(key).and_then(|value| value.as_text()) else {
            continue;
        };
        let folded = fold_chars(&text, params.normalization);
        if let Some(hit) = pattern.search(&folded, params.threshold, params.min_match_char_length) {
            best = Some(best.map_or(hit.score, |b: f64| b.min(hit.score)));
            matches.push(FieldMatch {
                key: key.clone(),
                value: text.into_owned(),
                indices: hit.ranges,
            });
        }
    }

    best.map(|score| FuzzyOutcome {
        index,
        score,
        matches,
    })
}

/// AND-composition: intersect per-keyword candidate sets. Scores from
/// the individual passes are dropped; output order is dataset order.
fn intersect_keywords(
    records: &[Record],
    keys: &[String],
    keywords: &[&str],
    params: FuzzyParams,
) -> Vec<usize> {
    let mut surviving: Option<AHashSet<usize>> = None;

    for keyword in keywords {
        let candidates: AHashSet<usize> = search_keyword(records, keys, keyword, params)
            .into_iter()
            .map(|o| o.index)
            .collect();

        surviving = Some(match surviving {
            None => candidates,
            Some(prev) => prev.intersection(&candidates).copied().collect(),
        });

        if surviving.as_ref().is_some_and(|s| s.is_empty()) {
            break;
        }
    }

    let surviving = surviving.unwrap_or_default();
    (0..records.len()).filter(|i| surviving.contains(i)).collect()
}
