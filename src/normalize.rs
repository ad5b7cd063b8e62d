//! Text folding applied to values and queries before matching.
//!
//! Matching in this crate is case-insensitive by default. Folding is
//! defined per character so that the folded character sequence stays
//! aligned with the original stringified value, keeping highlight
//! ranges usable by the host. The NFKD mode trades that alignment for
//! compatibility folding of composed characters.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Folding mode applied to both sides of every comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextNormalization {
    /// Per-character lowercase folding. Keeps character offsets aligned
    /// with the source text.
    #[default]
    CaseFold,
    /// NFKD compatibility decomposition followed by case folding.
    /// Character offsets refer to the decomposed sequence.
    NfkdCaseFold,
    /// No folding; matching is case-sensitive.
    Preserve,
}

/// Fold one character to its primary lowercase form.
///
/// `char::to_lowercase` can expand to multiple characters for a handful
/// of code points; only the first is kept so offsets stay 1:1.
#[inline]
fn fold_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Fold a string into a character sequence under the given mode.
#[must_use]
pub fn fold_chars(s: &str, mode: TextNormalization) -> Vec<char> {
    match mode {
        TextNormalization::CaseFold => s.chars().map(fold_char).collect(),
        TextNormalization::NfkdCaseFold => s.nfkd().map(fold_char).collect(),
        TextNormalization::Preserve => s.chars().collect(),
    }
}

/// Fold a string into an owned string under the given mode.
#[must_use]
pub fn fold_string(s: &str, mode: TextNormalization) -> String {
    fold_chars(s, mode).into_iter().collect()
}
