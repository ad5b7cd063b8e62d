//! Bit-parallel approximate substring search (Wu–Manber shift-and
//! bitap).
//!
//! A compiled pattern is matched against a text, permitting up to
//! `floor(threshold * pattern_len)` edit errors. The reported score is
//! the error fraction `errors / pattern_len`, so 0.0 is an exact
//! substring hit and lower is better. Patterns longer than one 64-bit
//! block fall back to a windowed edit-distance scan.

use ahash::AHashMap;
use smallvec::{smallvec, SmallVec};

use crate::matching::MatchRange;

/// Maximum pattern length handled by the bit-parallel path (one 64-bit
/// block).
const BITAP_BLOCK_SIZE: usize = 64;

/// Outcome of matching one pattern against one text.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternMatch {
    /// Error fraction in `[0.0, 1.0]`; 0.0 is an exact substring hit.
    pub score: f64,
    /// Inclusive character ranges of matched runs in the text.
    pub ranges: Vec<MatchRange>,
}

/// A query keyword compiled for repeated matching across many values.
///
/// Compilation builds the per-character bit mask table once; `search`
/// is then run against every candidate value.
#[derive(Debug, Clone)]
pub struct BitapPattern {
    chars: Vec<char>,
    masks: AHashMap<char, u64>,
}

impl BitapPattern {
    /// Compile a pattern from a folded character sequence.
    ///
    /// Returns `None` for an empty pattern; empty queries are handled
    /// upstream as match-everything.
    pub fn new(chars: Vec<char>) -> Option<Self> {
        if chars.is_empty() {
            return None;
        }

        let mut masks: AHashMap<char, u64> = AHashMap::with_capacity(chars.len().min(26));
        for (i, &c) in chars.iter().enumerate() {
            let entry = masks.entry(c).or_insert(0);
            // Positions past one block still register the character for
            // range marking; only the first block feeds the bit rows.
            if i < BITAP_BLOCK_SIZE {
                *entry |= 1u64 << i;
            }
        }

        Some(Self { chars, masks })
    }

    /// Pattern length in characters.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Whether the pattern is empty. Compiled patterns never are.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Match the pattern against a folded text.
    ///
    /// Returns `None` when the best achievable error fraction exceeds
    /// `threshold`. `min_run` suppresses highlight ranges shorter than
    /// the configured minimum match length.
    pub fn search(&self, text: &[char], threshold: f64, min_run: usize) -> Option<PatternMatch> {
        let m = self.chars.len();
        if text.is_empty() {
            return None;
        }

        let max_errors = (threshold * m as f64).floor() as usize;
        let best = if m > BITAP_BLOCK_SIZE {
            self.best_errors_windowed(text, max_errors)
        } else {
            self.best_errors_bitap(text, max_errors)
        }?;

        Some(PatternMatch {
            score: best as f64 / m as f64,
            ranges: self.match_ranges(text, min_run),
        })
    }

    /// Minimum error count over all alignments, via Wu–Manber shift-and.
    ///
    /// Row `d` tracks pattern prefixes reachable with at most `d`
    /// errors; the substitution and deletion terms are reseeded at
    /// every text position so a match may start anywhere.
    fn best_errors_bitap(&self, text: &[char], max_errors: usize) -> Option<usize> {
        let m = self.chars.len();
        let hit = 1u64 << (m - 1);

        let mut best: Option<usize> = None;
        let mut rows: SmallVec<[u64; 8]> = smallvec![0; max_errors + 1];

        for &c in text {
            let mask = self.masks.get(&c).copied().unwrap_or(0);

            // Only rows below the current best can still improve it.
            let active = best.map_or(max_errors, |b| b.saturating_sub(1));

            let mut prev_old = rows[0];
            rows[0] = ((rows[0] << 1) | 1) & mask;
            let mut prev_new = rows[0];

            if rows[0] & hit != 0 {
                return Some(0);
            }

            for d in 1..=active {
                let old = rows[d];
                rows[d] = (((old << 1) | 1) & mask)
                    | ((prev_old << 1) | 1)
                    | ((prev_new << 1) | 1)
                    | prev_old;
                prev_old = old;
                prev_new = rows[d];

                if rows[d] & hit != 0 && best.is_none_or(|b| d < b) {
                    best = Some(d);
                    break;
                }
            }
        }

        best
    }

    /// Fallback for long patterns: best bounded edit distance over
    /// pattern-length windows of the text.
    fn best_errors_windowed(&self, text: &[char], max_errors: usize) -> Option<usize> {
        let m = self.chars.len();
        let n = text.len();

        if n <= m {
            return edit_distance_bounded(&self.chars, text, max_errors);
        }

        let mut best: Option<usize> = None;
        for start in 0..=(n - m) {
            let budget = best.map_or(max_errors, |b| b.saturating_sub(1));
            let window = &text[start..start + m];
            if let Some(d) = edit_distance_bounded(&self.chars, window, budget) {
                if d == 0 {
                    return Some(0);
                }
                best = Some(d);
            }
        }

        best
    }

    /// Highlight ranges: consecutive runs of text positions whose
    /// character occurs in the pattern, at least `min_run` long.
    fn match_ranges(&self, text: &[char], min_run: usize) -> Vec<MatchRange> {
        let min_run = min_run.max(1);
        let mut ranges = Vec::new();
        let mut run_start: Option<usize> = None;

        for (j, c) in text.iter().enumerate() {
            let hit = self.masks.contains_key(c);
            match (hit, run_start) {
                (true, None) => run_start = Some(j),
                (false, Some(start)) => {
                    if j - start >= min_run {
                        ranges.push((start, j - 1));
                    }
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            if text.len() - start >= min_run {
                ranges.push((start, text.len() - 1));
            }
        }

        ranges
    }
}

/// Bounded Levenshtein distance over character slices.
///
/// Returns `None` as soon as the distance provably exceeds
/// `max_distance`. Single-row DP with a small-vector row.
fn edit_distance_bounded(a: &[char], b: &[char], max_distance: usize) -> Option<usize> {
    let m = a.len();
    let n = b.len();

    if m == 0 {
        return (n <= max_distance).then_some(n);
    }
    if n == 0 {
        return (m <= max_distance).then_some(m);
    }
    if m.abs_diff(n) > max_distance {
        return None;
    }

    let mut row: SmallVec<[usize; 64]> = (0..=n).collect();

    for (i, &ac) in a.iter().enumerate() {
        let mut prev = row[0];
        row[0] = i + 1;
        let mut row_min = row[0];

        for j in 0..n {
            let cost = usize::from(ac != b[j]);
            let cell = (prev + cost).min(row[j + 1] + 1).min(row[j] + 1);
            prev = row[j + 1];
            row[j + 1] = cell;
            row_min = row_min.min(cell);
        }

        if row_min > max_distance {
            return None;
        }
    }

    (row[n] <= max_distance).then_some(row[n])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(s: &str) -> BitapPattern {
        BitapPattern::new(s.chars().collect()).unwrap()
    }

    fn text(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_exact_substring_scores_zero() {
        let p = pattern("alice");
        let m = p.search(&text("alice cooper"), 0.4, 1).unwrap();
        assert_eq!(m.score, 0.0);
    }

    #[test]
    fn test_one_substitution() {
        let p = pattern("bob");
        let m = p.search(&text("rob"), 0.4, 1).unwrap();
        assert!((m.score - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_one_deletion() {
        // "alce" matches "alice" with one insertion in the text.
        let p = pattern("alce");
        let m = p.search(&text("alice"), 0.3, 1).unwrap();
        assert!((m.score - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_over_threshold_is_none() {
        let p = pattern("xyzzy");
        assert!(p.search(&text("alice"), 0.3, 1).is_none());
    }

    #[test]
    fn test_empty_pattern_rejected() {
        assert!(BitapPattern::new(Vec::new()).is_none());
    }

    #[test]
    fn test_empty_text_is_none() {
        let p = pattern("abc");
        assert!(p.search(&[], 1.0, 1).is_none());
    }

    #[test]
    fn test_threshold_zero_requires_exact() {
        let p = pattern("engine");
        assert!(p.search(&text("engineering"), 0.0, 1).is_some());
        assert!(p.search(&text("enginx"), 0.0, 1).is_none());
    }

    #[test]
    fn test_ranges_honor_min_run() {
        let p = pattern("al");
        let m = p.search(&text("alice la"), 0.4, 2).unwrap();
        // "al" at 0..=1 and "la" (both chars in pattern) at 6..=7.
        assert_eq!(m.ranges, vec![(0, 1), (6, 7)]);

        let m = p.search(&text("a-x-l"), 0.5, 2).unwrap();
        assert!(m.ranges.is_empty());
    }

    #[test]
    fn test_long_pattern_fallback() {
        let needle: String = "abcdefghij".repeat(7);
        let haystack = format!("zz{}zz", needle);

        let p = pattern(&needle);
        assert!(p.len() > 64);
        let m = p.search(&text(&haystack), 0.2, 1).unwrap();
        assert_eq!(m.score, 0.0);
    }

    #[test]
    fn test_long_pattern_with_errors() {
        let needle: String = "abcdefghij".repeat(7);
        let mut mutated = needle.clone();
        mutated.replace_range(0..1, "x");

        let p = pattern(&needle);
        let m = p.search(&text(&mutated), 0.2, 1).unwrap();
        assert!((m.score - 1.0 / needle.len() as f64).abs() < 1e-9);
    }

    #[test]
    fn test_edit_distance_bounded() {
        assert_eq!(edit_distance_bounded(&text("kitten"), &text("sitting"), 3), Some(3));
        assert_eq!(edit_distance_bounded(&text("kitten"), &text("sitting"), 2), None);
        assert_eq!(edit_distance_bounded(&text(""), &text("ab"), 2), Some(2));
        assert_eq!(edit_distance_bounded(&text("same"), &text("same"), 0), Some(0));
    }
}
