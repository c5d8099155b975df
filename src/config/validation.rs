//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early. Checks
//! that need the compiled regex (bad pattern, unknown group names) are done
//! when the engine compiles each metric. An empty regex is allowed and
//! matches every line.

use super::Config;
use std::collections::HashSet;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("metrics[{0}].name is required")]
    MissingMetricName(usize),
    #[error("metric name {0} is declared more than once")]
    DuplicateMetricName(String),
    #[error("metric {metric}: label {label} is listed more than once")]
    DuplicateLabel { metric: String, label: String },
    #[error("metric {metric}: group {group} cannot be both the value and a label")]
    ValueIsLabel { metric: String, group: String },
    #[error("listen is not a valid address: {0}")]
    InvalidListen(String),
    #[error("path must start with '/', got '{0}'")]
    InvalidPath(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listen_addr().is_err() {
        errors.push(ValidationError::InvalidListen(config.listen.clone()));
    }
    if !config.path.starts_with('/') {
        errors.push(ValidationError::InvalidPath(config.path.clone()));
    }

    let mut seen_names = HashSet::new();
    for (index, metric) in config.metrics.iter().enumerate() {
        if metric.name.is_empty() {
            errors.push(ValidationError::MissingMetricName(index));
            continue;
        }

        let name = config.metric_name(metric);
        if !seen_names.insert(name.clone()) {
            errors.push(ValidationError::DuplicateMetricName(name.clone()));
        }

        let mut seen_labels = HashSet::new();
        for label in &metric.labels {
            if !seen_labels.insert(label.as_str()) {
                errors.push(ValidationError::DuplicateLabel {
                    metric: name.clone(),
                    label: label.clone(),
                });
            }
        }

        if let Some(value) = &metric.value
            && metric.labels.contains(value)
        {
            errors.push(ValidationError::ValueIsLabel {
                metric: name.clone(),
                group: value.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
