//! The search engine: one dataset snapshot, one resolved
//! configuration, one derived key list.
//!
//! Every query re-scans the current snapshot; there is no persistent
//! index to maintain. The engine is exclusively owned by one
//! coordinator and its query path is total: any query string in any
//! mode produces a (possibly empty) result sequence.

use rayon::prelude::*;
use serde::Serialize;

use crate::classify;
use crate::config::SearchConfig;
use crate::matching::fuzzy::{self, FuzzyParams, FuzzyResults};
use crate::matching::{exact, FieldMatch};
use crate::query::mode::detect;
use crate::query::{range, SearchMode};
use crate::record::Record;
use crate::suggest;

/// One search hit. `score` and `matches` are populated only for ranked
/// fuzzy results, and only when the configuration asks for them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// The matched record.
    pub item: Record,
    /// Error-fraction score, lower is better. `None` for unscored
    /// modes (exact, range, multi-keyword fuzzy).
    pub score: Option<f64>,
    /// Highlight data per matched key.
    pub matches: Option<Vec<FieldMatch>>,
}

/// The strategy that actually ran, after detection and fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutedMode {
    /// Blank query; the dataset was returned unfiltered.
    EmptyQuery,
    /// Fuzzy pass (detected or explicit).
    Fuzzy,
    /// Exact substring pass.
    Exact,
    /// Range clause evaluation.
    Range,
    /// Range was selected but no clause survived; the fuzzy pass ran
    /// over the raw query text.
    RangeFallback,
}

/// Multi-mode search engine over an in-memory dataset snapshot.
///
/// # Example
///
/// ```rust
/// use rowsift::config::SearchConfig;
/// use rowsift::engine::SearchEngine;
/// use rowsift::query::SearchMode;
/// use rowsift::record::Record;
///
/// let records = vec![
///     Record::new().with("name", "Alice").with("age", 30),
///     Record::new().with("name", "Bob").with("age", 45),
/// ];
/// let engine = SearchEngine::new(records, SearchConfig::default());
///
/// let hits = engine.search("age>40", SearchMode::Auto);
/// assert_eq!(hits.len(), 1);
/// ```
pub struct SearchEngine {
    records: Vec<Record>,
    config: SearchConfig,
    keys: Vec<String>,
    auto_keys: bool,
}

impl SearchEngine {
    /// Create an engine bound to a dataset snapshot.
    ///
    /// When the configuration carries no explicit keys, the field
    /// classifier derives them from the snapshot.
    pub fn new(records: Vec<Record>, config: SearchConfig) -> Self {
        let (keys, auto_keys) = match &config.keys {
            Some(keys) => (keys.clone(), false),
            None => (classify::derive_keys(&records, &config.classifier), true),
        };

        tracing::debug!(
            records = records.len(),
            keys = ?keys,
            auto_keys,
            "search engine created"
        );

        Self {
            records,
            config,
            keys,
            auto_keys,
        }
    }

    /// Engine with the default configuration.
    pub fn with_defaults(records: Vec<Record>) -> Self {
        Self::new(records, SearchConfig::default())
    }

    /// Run a query. Total: always returns a sequence, never panics.
    pub fn search(&self, query: &str, mode: SearchMode) -> Vec<SearchResult> {
        self.search_with_outcome(query, mode).0
    }

    /// Run a query and report which strategy actually executed.
    pub fn search_with_outcome(&self, query: &str, mode: SearchMode) -> (Vec<SearchResult>, ExecutedMode) {
        let trimmed = query.trim();

        if trimmed.is_empty() {
            let mut results = self.all_unscored();
            self.truncate(&mut results);
            return (results, ExecutedMode::EmptyQuery);
        }

        let resolved = match mode {
            SearchMode::Auto => detect(trimmed),
            explicit => explicit,
        };

        if self.keys.is_empty() {
            tracing::debug!(?resolved, "no searchable keys, returning empty result set");
            let executed = match resolved {
                SearchMode::Exact => ExecutedMode::Exact,
                SearchMode::Range => ExecutedMode::Range,
                _ => ExecutedMode::Fuzzy,
            };
            return (Vec::new(), executed);
        }

        let (mut results, executed) = match resolved {
            SearchMode::Auto | SearchMode::Fuzzy => (self.run_fuzzy(trimmed), ExecutedMode::Fuzzy),
            SearchMode::Exact => {
                let indices = exact::search(&self.records, &self.keys, trimmed, self.config.normalization);
                (self.unscored(indices), ExecutedMode::Exact)
            }
            SearchMode::Range => {
                let expressions =
                    range::parse(trimmed, &self.keys, &self.records, self.config.classifier.sample_depth);
                if expressions.is_empty() {
                    tracing::debug!(query = trimmed, "no range clause survived, falling back to fuzzy");
                    (self.run_fuzzy(trimmed), ExecutedMode::RangeFallback)
                } else {
                    let indices = range::evaluate(&self.records, &expressions);
                    (self.unscored(indices), ExecutedMode::Range)
                }
            }
        };

        self.truncate(&mut results);
        tracing::debug!(?executed, results = results.len(), "search completed");
        (results, executed)
    }

    /// Evaluate independent queries in parallel against the snapshot.
    pub fn batch_search(&self, queries: &[String], mode: SearchMode) -> Vec<Vec<SearchResult>> {
        queries.par_iter().map(|q| self.search(q, mode)).collect()
    }

    /// Autocomplete candidates for a partial query.
    ///
    /// Returns nothing when suggestions are disabled; the per-call
    /// limit is additionally capped by `max_suggestions`.
    pub fn suggestions(&self, query: &str, limit: usize) -> Vec<String> {
        if !self.config.enable_suggestions {
            return Vec::new();
        }
        let effective = limit.min(self.config.max_suggestions);
        suggest::suggestions(&self.records, &self.keys, query, effective, self.config.normalization)
    }

    /// Replace the dataset snapshot. Auto-derived keys are recomputed;
    /// explicit keys stay as configured.
    pub fn update_data(&mut self, records: Vec<Record>) {
        self.records = records;
        if self.auto_keys {
            self.keys = classify::derive_keys(&self.records, &self.config.classifier);
            tracing::debug!(keys = ?self.keys, "keys reclassified after data update");
        }
    }

    /// Re-run field classification against the current snapshot.
    /// No-op when keys were supplied explicitly.
    pub fn rebuild_keys(&mut self) {
        if self.auto_keys {
            self.keys = classify::derive_keys(&self.records, &self.config.classifier);
        }
    }

    /// Number of records in the snapshot.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The active searchable keys.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// The engine configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    fn fuzzy_params(&self) -> FuzzyParams {
        FuzzyParams {
            threshold: self.config.threshold,
            min_match_char_length: self.config.min_match_char_length,
            normalization: self.config.normalization,
        }
    }

    fn run_fuzzy(&self, query: &str) -> Vec<SearchResult> {
        match fuzzy::search(&self.records, &self.keys, query, self.fuzzy_params()) {
            FuzzyResults::Ranked(hits) => hits
                .into_iter()
                .map(|hit| SearchResult {
                    item: self.records[hit.index].clone(),
                    score: self.config.include_score.then_some(hit.score),
                    matches: self.config.include_matches.then_some(hit.matches),
                })
                .collect(),
            FuzzyResults::Intersection(indices) => self.unscored(indices),
        }
    }

    fn unscored(&self, indices: Vec<usize>) -> Vec<SearchResult> {
        indices
            .into_iter()
            .map(|i| SearchResult {
                item: self.records[i].clone(),
                score: None,
                matches: None,
            })
            .collect()
    }

    fn all_unscored(&self) -> Vec<SearchResult> {
        self.records
            .iter()
            .map(|record| SearchResult {
                item: record.clone(),
                score: None,
                matches: None,
            })
            .collect()
    }

    fn truncate(&self, results: &mut Vec<SearchResult>) {
        if let Some(limit) = self.config.max_results {
            results.truncate(limit);
        }
    }
}
