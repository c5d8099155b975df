//! A compiled metric definition: pattern, resolved group indices and collector.

use prometheus::Registry;
use regex::Regex;

use super::extract::{extract_labels, extract_value, index_of};
use crate::config::MetricConfig;
use crate::error::{ConfigError, ExtractError};
use crate::metrics::{Collector, Shape};

/// One user metric, read-only once compiled.
pub struct MetricSpec {
    name: String,
    pattern: Regex,
    group_names: Vec<String>,
    /// Value group name and its submatch index.
    value: Option<(String, usize)>,
    /// Label names with their submatch indices, in label order.
    labels: Vec<(String, usize)>,
    collector: Collector,
}

impl MetricSpec {
    /// Compile the pattern, resolve group names, and build and register the
    /// collector.
    pub fn compile(
        name: &str,
        metric: &MetricConfig,
        registry: &Registry,
    ) -> Result<Self, ConfigError> {
        let pattern = Regex::new(&metric.regex).map_err(|source| ConfigError::InvalidPattern {
            metric: name.to_string(),
            source,
        })?;
        let group_names: Vec<String> = pattern
            .capture_names()
            .map(|n| n.unwrap_or_default().to_string())
            .collect();

        let resolve = |group: &String| {
            index_of(group, &group_names)
                .map(|index| (group.clone(), index))
                .ok_or_else(|| ConfigError::UnknownGroup {
                    metric: name.to_string(),
                    group: group.clone(),
                })
        };
        let value = metric.value.as_ref().map(resolve).transpose()?;
        let labels = metric
            .labels
            .iter()
            .map(resolve)
            .collect::<Result<Vec<_>, _>>()?;

        let shape = Shape::classify(metric.value.as_deref(), &metric.labels);
        let collector = Collector::build(name, &metric.description, &shape)?;
        collector.register(name, registry)?;

        tracing::debug!(
            metric = %name,
            shape = shape.kind(),
            value = ?metric.value,
            labels = ?metric.labels,
            "Added metric"
        );

        Ok(Self {
            name: name.to_string(),
            pattern,
            group_names,
            value,
            labels,
            collector,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group_names(&self) -> &[String] {
        &self.group_names
    }

    pub fn collector(&self) -> &Collector {
        &self.collector
    }

    /// Run the pattern against `line` and apply the update.
    ///
    /// Returns `None` when the pattern does not match. On a match, returns
    /// the outcome of the update; an extraction error means the collector
    /// was left untouched.
    pub fn apply(&self, line: &str) -> Option<Result<(), ExtractError>> {
        let caps = self.pattern.captures(line)?;

        let value = match &self.value {
            Some((group, index)) => match extract_value(&caps, group, *index) {
                Ok(v) => Some(v),
                Err(e) => return Some(Err(e)),
            },
            None => None,
        };
        let labels = match extract_labels(&caps, &self.labels) {
            Ok(l) => l,
            Err(e) => return Some(Err(e)),
        };

        Some(self.update(value, &labels))
    }

    fn update(&self, value: Option<f64>, labels: &[&str]) -> Result<(), ExtractError> {
        let lookup = |e: prometheus::Error| ExtractError::SeriesLookup {
            values: labels.iter().map(|s| s.to_string()).collect(),
            reason: e.to_string(),
        };

        match (&self.collector, value) {
            (Collector::Counter(c), _) => c.inc(),
            (Collector::CounterVec(c), _) => {
                c.get_metric_with_label_values(labels).map_err(lookup)?.inc()
            }
            (Collector::Gauge(g), Some(v)) => g.set(v),
            (Collector::GaugeVec(g), Some(v)) => {
                g.get_metric_with_label_values(labels).map_err(lookup)?.set(v)
            }
            // Gauge shapes are only built when a value group is declared.
            (Collector::Gauge(_) | Collector::GaugeVec(_), None) => {}
        }
        Ok(())
    }
}
