//! Heuristic field classification: which record fields participate in
//! search, and in what order.
//!
//! Classification is a pure function of a dataset sample and a
//! [`ClassifierProfile`]. It runs when an engine is created and again
//! when the dataset snapshot is replaced, never per keystroke. The
//! derived key list is: priority fields (identity-style names, in
//! discovery order), then text fields up to a cap, then numeric fields
//! up to a cap. Excluded fields (identifiers, timestamps, private
//! names) never appear.

use crate::config::ClassifierProfile;
use crate::record::{FieldValue, Record};

/// Derive the ordered searchable key list from a dataset sample.
///
/// Field order comes from the first record. For fields whose first
/// value is null, up to `profile.sample_depth` leading records are
/// consulted before the field is typed. Returns an empty list for an
/// empty dataset.
pub fn derive_keys(records: &[Record], profile: &ClassifierProfile) -> Vec<String> {
    let Some(first) = records.first() else {
        return Vec::new();
    };

    let mut priority = Vec::new();
    let mut text = Vec::new();
    let mut numeric = Vec::new();

    for name in first.field_names() {
        if is_excluded(name, profile) {
            continue;
        }

        let folded = name.to_lowercase();
        if profile.priority_names.iter().any(|p| folded.contains(p.as_str())) {
            priority.push(name.to_string());
            continue;
        }

        if is_numeric_field(&folded, sample_value(records, name, profile.sample_depth), profile) {
            numeric.push(name.to_string());
        } else {
            text.push(name.to_string());
        }
    }

    text.truncate(profile.max_text_fields);
    numeric.truncate(profile.max_numeric_fields);

    priority.extend(text);
    priority.extend(numeric);
    priority
}

/// Exclusion test: private prefixes, identifier suffixes, exact
/// identifier names, timestamp-like substrings.
fn is_excluded(name: &str, profile: &ClassifierProfile) -> bool {
    if profile.exclude_prefixes.iter().any(|p| name.starts_with(p.as_str())) {
        return true;
    }
    // Suffixes are case-sensitive so "employeeId" is caught but "paid"
    // is not.
    if profile.exclude_suffixes.iter().any(|s| name.ends_with(s.as_str())) {
        return true;
    }

    let folded = name.to_lowercase();
    if profile.exclude_names.iter().any(|n| folded == *n) {
        return true;
    }
    profile.exclude_contains.iter().any(|c| folded.contains(c.as_str()))
}

/// First non-null value for `name` within the leading `depth` records.
fn sample_value<'a>(records: &'a [Record], name: &str, depth: usize) -> Option<&'a FieldValue> {
    records
        .iter()
        .take(depth.max(1))
        .filter_map(|r| r.get(name))
        .find(|v| !v.is_null())
}

/// A field is numeric when its sampled value coerces to a number or its
/// name carries numeric semantics.
fn is_numeric_field(folded_name: &str, sample: Option<&FieldValue>, profile: &ClassifierProfile) -> bool {
    if sample.is_some_and(FieldValue::is_numeric) {
        return true;
    }
    profile.numeric_hints.iter().any(|h| folded_name.contains(h.as_str()))
}
