//! Unified error handling for stdout2prom.
//!
//! Two families live here: configuration errors, which are fatal and only
//! ever raised at startup, and extraction errors, which are raised per line
//! and only ever cause one metric update to be skipped.

use thiserror::Error;

// ============================================================================
// Configuration Errors (startup)
// ============================================================================

/// Errors that prevent the process from starting.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("metric {metric}: invalid regex: {source}")]
    InvalidPattern {
        metric: String,
        #[source]
        source: regex::Error,
    },

    #[error("metric {metric}: '{group}' is not a named group of the regex")]
    UnknownGroup { metric: String, group: String },

    #[error("metric {metric}: a labelled metric needs at least one label name")]
    EmptyLabelSet { metric: String },

    #[error("metric {metric}: {source}")]
    Collector {
        metric: String,
        #[source]
        source: prometheus::Error,
    },

    #[error("configuration is invalid ({0} problem(s))")]
    Invalid(usize),
}

// ============================================================================
// Extraction Errors (per line)
// ============================================================================

/// Errors that skip a single metric update for a single line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("value group '{group}' captured {text:?}, which is not a number")]
    BadValue { group: String, text: String },

    #[error("label group '{group}' did not take part in the match")]
    MissingLabel { group: String },

    #[error("no series for labels {values:?}: {reason}")]
    SeriesLookup { values: Vec<String>, reason: String },
}

impl ExtractError {
    /// Get a static error code string for log fields.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadValue { .. } => "bad_value",
            Self::MissingLabel { .. } => "missing_label",
            Self::SeriesLookup { .. } => "series_lookup",
        }
    }
}
