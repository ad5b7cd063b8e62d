//! Search configuration: thresholds, key overrides, debounce timing,
//! and the injectable field-classification pattern tables.
//!
//! Configuration is validated once at build time via
//! [`SearchConfigBuilder`]; the query path itself never fails. The
//! classifier pattern tables default to payroll/HR vocabulary but are
//! plain data, intended to be replaced wholesale for other domains.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::normalize::TextNormalization;

/// Errors raised while building a [`SearchConfig`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Threshold outside `[0.0, 1.0]` or not finite.
    #[error("threshold must be a finite value in [0.0, 1.0], got {0}")]
    ThresholdOutOfRange(f64),

    /// `min_match_char_length` must be at least 1.
    #[error("min_match_char_length must be at least 1")]
    ZeroMinMatchLength,

    /// The same key was supplied twice in an explicit key list.
    #[error("duplicate search key: {0}")]
    DuplicateKey(String),

    /// An explicit key was empty or whitespace-only.
    #[error("search keys must not be empty")]
    EmptyKey,

    /// Suggestions are enabled but capped at zero.
    #[error("max_suggestions must be at least 1 when suggestions are enabled")]
    ZeroSuggestionCap,
}

/// Pattern tables and caps driving field classification.
///
/// All name patterns are matched against folded (lowercased) field
/// names, except `exclude_suffixes`, which is matched case-sensitively
/// against the raw name so that camelCase identifier suffixes (`Id`,
/// `Key`) can be told apart from ordinary words ending in the same
/// letters ("paid").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierProfile {
    /// Raw-name prefixes marking internal/private fields.
    pub exclude_prefixes: Vec<String>,

    /// Raw-name suffixes marking identifier-like fields. Case-sensitive.
    pub exclude_suffixes: Vec<String>,

    /// Folded names excluded exactly.
    pub exclude_names: Vec<String>,

    /// Folded-name substrings marking timestamp-like fields.
    pub exclude_contains: Vec<String>,

    /// Folded-name substrings marking canonical identity fields,
    /// ordered first in the derived key list.
    pub priority_names: Vec<String>,

    /// Folded-name substrings marking numeric-semantic fields even when
    /// sampled values are textual.
    pub numeric_hints: Vec<String>,

    /// Cap on text fields after the priority block.
    pub max_text_fields: usize,

    /// Cap on numeric fields after the text block.
    pub max_numeric_fields: usize,

    /// How many leading records to sample when the first record holds a
    /// null for some field.
    pub sample_depth: usize,
}

impl Default for ClassifierProfile {
    fn default() -> Self {
        Self {
            exclude_prefixes: vec!["_".into(), "$".into()],
            exclude_suffixes: vec!["Id".into(), "ID".into(), "_id".into(), "Key".into(), "_key".into()],
            exclude_names: vec!["id".into(), "key".into(), "uuid".into(), "guid".into()],
            exclude_contains: vec![
                "date".into(),
                "time".into(),
                "timestamp".into(),
                "created".into(),
                "updated".into(),
                "modified".into(),
            ],
            priority_names: vec![
                "name".into(),
                "code".into(),
                "department".into(),
                "position".into(),
                "title".into(),
            ],
            numeric_hints: vec![
                "amount".into(),
                "allowance".into(),
                "deduction".into(),
                "total".into(),
                "salary".into(),
                "wage".into(),
                "rate".into(),
                "bonus".into(),
                "tax".into(),
                "net".into(),
                "gross".into(),
            ],
            max_text_fields: 6,
            max_numeric_fields: 4,
            sample_depth: 5,
        }
    }
}

/// Resolved search configuration.
///
/// Use [`SearchConfig::builder`] to construct with validation, or
/// `SearchConfig::default()` for the stock settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum acceptable fuzzy score (error fraction, lower is
    /// better). A record matches when its best per-key score is at or
    /// below this value.
    pub threshold: f64,

    /// Populate `SearchResult::score` for ranked fuzzy results.
    pub include_score: bool,

    /// Populate `SearchResult::matches` with highlight ranges.
    pub include_matches: bool,

    /// Minimum length of a matched character run to be reported as a
    /// highlight range.
    pub min_match_char_length: usize,

    /// Explicit searchable keys. `None` derives them via the field
    /// classifier; `Some` disables classification entirely.
    pub keys: Option<Vec<String>>,

    /// Text folding applied to values and queries.
    pub normalization: TextNormalization,

    /// Truncate result sequences to this many entries.
    pub max_results: Option<usize>,

    /// Quiet period for the debounced entry point, in milliseconds.
    pub debounce_delay_ms: u64,

    /// Whether suggestion generation is available on this engine.
    pub enable_suggestions: bool,

    /// Upper bound on suggestions regardless of the per-call limit.
    pub max_suggestions: usize,

    /// Field-classification pattern tables.
    pub classifier: ClassifierProfile,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threshold: 0.4,
            include_score: true,
            include_matches: true,
            min_match_char_length: 2,
            keys: None,
            normalization: TextNormalization::CaseFold,
            max_results: None,
            debounce_delay_ms: 300,
            enable_suggestions: true,
            max_suggestions: 8,
            classifier: ClassifierProfile::default(),
        }
    }
}

impl SearchConfig {
    /// Start building a configuration from the defaults.
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::new()
    }
}

/// Builder for [`SearchConfig`] with validation at `build` time.
///
/// # Example
///
/// ```rust
/// use rowsift::config::SearchConfig;
///
/// let config = SearchConfig::builder()
///     .threshold(0.3)
///     .min_match_char_length(2)
///     .keys(["name", "department"])
///     .build()
///     .unwrap();
/// assert_eq!(config.keys.as_deref().unwrap().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    /// Create a builder seeded with the default configuration.
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    /// Set the fuzzy score threshold.
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Toggle score reporting on ranked results.
    pub fn include_score(mut self, include: bool) -> Self {
        self.config.include_score = include;
        self
    }

    /// Toggle highlight-range reporting.
    pub fn include_matches(mut self, include: bool) -> Self {
        self.config.include_matches = include;
        self
    }

    /// Set the minimum reported match-run length.
    pub fn min_match_char_length(mut self, length: usize) -> Self {
        self.config.min_match_char_length = length;
        self
    }

    /// Supply explicit searchable keys, bypassing classification.
    pub fn keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Set the text folding mode.
    pub fn normalization(mut self, mode: TextNormalization) -> Self {
        self.config.normalization = mode;
        self
    }

    /// Cap result sequences.
    pub fn max_results(mut self, limit: usize) -> Self {
        self.config.max_results = Some(limit);
        self
    }

    /// Set the debounce quiet period in milliseconds.
    pub fn debounce_delay_ms(mut self, delay: u64) -> Self {
        self.config.debounce_delay_ms = delay;
        self
    }

    /// Toggle suggestion generation.
    pub fn enable_suggestions(mut self, enable: bool) -> Self {
        self.config.enable_suggestions = enable;
        self
    }

    /// Set the global suggestion cap.
    pub fn max_suggestions(mut self, cap: usize) -> Self {
        self.config.max_suggestions = cap;
        self
    }

    /// Replace the classifier pattern tables.
    pub fn classifier(mut self, profile: ClassifierProfile) -> Self {
        self.config.classifier = profile;
        self
    }

    /// Validate and produce the configuration.
    pub fn build(self) -> Result<SearchConfig, ConfigError> {
        let config = self.config;

        if !config.threshold.is_finite() || !(0.0..=1.0).contains(&config.threshold) {
            return Err(ConfigError::ThresholdOutOfRange(config.threshold));
        }
        if config.min_match_char_length == 0 {
            return Err(ConfigError::ZeroMinMatchLength);
        }
        if config.enable_suggestions && config.max_suggestions == 0 {
            return Err(ConfigError::ZeroSuggestionCap);
        }
        if let Some(keys) = &config.keys {
            let mut seen = ahash::AHashSet::with_capacity(keys.len());
            for key in keys {
                if key.trim().is_empty() {
                    return Err(ConfigError::EmptyKey);
                }
                if !seen.insert(key.as_str()) {
                    return Err(ConfigError::DuplicateKey(key.clone()));
                }
            }
        }

        Ok(config)
    }
}

impl Default for SearchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SearchConfig::builder().build().unwrap();
        assert_eq!(config.threshold, 0.4);
        assert_eq!(config.min_match_char_length, 2);
        assert!(config.keys.is_none());
    }

    #[test]
    fn test_threshold_out_of_range() {
        let result = SearchConfig::builder().threshold(1.5).build();
        assert!(matches!(result, Err(ConfigError::ThresholdOutOfRange(_))));

        let result = SearchConfig::builder().threshold(f64::NAN).build();
        assert!(matches!(result, Err(ConfigError::ThresholdOutOfRange(_))));
    }

    #[test]
    fn test_zero_min_match_length() {
        let result = SearchConfig::builder().min_match_char_length(0).build();
        assert_eq!(result, Err(ConfigError::ZeroMinMatchLength));
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let result = SearchConfig::builder().keys(["name", "age", "name"]).build();
        assert_eq!(result, Err(ConfigError::DuplicateKey("name".to_string())));
    }

    #[test]
    fn test_empty_key_rejected() {
        let result = SearchConfig::builder().keys(["name", "  "]).build();
        assert_eq!(result, Err(ConfigError::EmptyKey));
    }

    #[test]
    fn test_suggestion_cap() {
        let result = SearchConfig::builder().max_suggestions(0).build();
        assert_eq!(result, Err(ConfigError::ZeroSuggestionCap));

        // Cap of zero is fine when suggestions are off.
        let config = SearchConfig::builder()
            .enable_suggestions(false)
            .max_suggestions(0)
            .build()
            .unwrap();
        assert!(!config.enable_suggestions);
    }

    #[test]
    fn test_profile_serde_round_trip() {
        let profile = ClassifierProfile::default();
        let json = serde_json::to_string(&profile).unwrap();
        let back: ClassifierProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, profile);
    }
}
