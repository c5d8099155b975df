//! Prometheus metrics collection for stdout2prom.
//!
//! Holds the process registry, the four collector shapes user metrics can
//! take, and the self-observability counters.
//!
//! ## Self-Observability Metrics
//!
//! - `stdout2prom_lines_parsed_total` - Lines read from the input
//! - `stdout2prom_bytes_read_total` - Bytes read, excluding line terminators
//! - `stdout2prom_matched_lines_total` - Lines matched by at least one metric
//! - `stdout2prom_extraction_failures_total` - Metric updates skipped on bad captures

use prometheus::{
    Encoder, Gauge, GaugeVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

use crate::error::ConfigError;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Collector shapes
// ========================================================================

/// Shape of a user metric, fixed when the metric is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Counter,
    CounterVec(Vec<String>),
    Gauge,
    GaugeVec(Vec<String>),
}

impl Shape {
    /// Pick the shape from whether a value group and any label groups exist.
    pub fn classify(value: Option<&str>, labels: &[String]) -> Self {
        match (value.is_some(), labels.is_empty()) {
            (false, true) => Shape::Counter,
            (false, false) => Shape::CounterVec(labels.to_vec()),
            (true, true) => Shape::Gauge,
            (true, false) => Shape::GaugeVec(labels.to_vec()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Counter => "counter",
            Shape::CounterVec(_) => "counter_vec",
            Shape::Gauge => "gauge",
            Shape::GaugeVec(_) => "gauge_vec",
        }
    }
}

/// Handle to a constructed Prometheus collector.
///
/// Every variant is a cheap clone around atomics, so updates from the line
/// worker are safe to observe from a concurrent scrape.
#[derive(Clone)]
pub enum Collector {
    Counter(IntCounter),
    CounterVec(IntCounterVec),
    Gauge(Gauge),
    GaugeVec(GaugeVec),
}

impl Collector {
    /// Construct the collector for `shape`.
    ///
    /// Vector shapes must carry at least one label name; the label set cannot
    /// change after construction.
    pub fn build(name: &str, help: &str, shape: &Shape) -> Result<Self, ConfigError> {
        // prometheus refuses an empty help string.
        let help = if help.is_empty() { name } else { help };
        let opts = Opts::new(name, help);
        let wrap = |source| ConfigError::Collector {
            metric: name.to_string(),
            source,
        };

        let collector = match shape {
            Shape::Counter => Collector::Counter(IntCounter::with_opts(opts).map_err(wrap)?),
            Shape::Gauge => Collector::Gauge(Gauge::with_opts(opts).map_err(wrap)?),
            Shape::CounterVec(labels) | Shape::GaugeVec(labels) if labels.is_empty() => {
                return Err(ConfigError::EmptyLabelSet {
                    metric: name.to_string(),
                });
            }
            Shape::CounterVec(labels) => {
                let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
                Collector::CounterVec(IntCounterVec::new(opts, &labels).map_err(wrap)?)
            }
            Shape::GaugeVec(labels) => {
                let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
                Collector::GaugeVec(GaugeVec::new(opts, &labels).map_err(wrap)?)
            }
        };
        Ok(collector)
    }

    /// Register with `registry`. Duplicate names are rejected here.
    pub fn register(&self, name: &str, registry: &Registry) -> Result<(), ConfigError> {
        let result = match self {
            Collector::Counter(c) => registry.register(Box::new(c.clone())),
            Collector::CounterVec(c) => registry.register(Box::new(c.clone())),
            Collector::Gauge(g) => registry.register(Box::new(g.clone())),
            Collector::GaugeVec(g) => registry.register(Box::new(g.clone())),
        };
        result.map_err(|source| ConfigError::Collector {
            metric: name.to_string(),
            source,
        })
    }
}

// ========================================================================
// Self-observability counters
// ========================================================================

/// Monotonic counters describing what the engine has processed.
///
/// Only the engine increments these; everything else gets read access.
#[derive(Clone)]
pub struct ProcessCounters {
    lines_read: IntCounter,
    bytes_read: IntCounter,
    lines_matched: IntCounter,
    extraction_failures: IntCounter,
}

impl ProcessCounters {
    /// Create the counters and register them with `registry`.
    pub fn register(registry: &Registry) -> Result<Self, ConfigError> {
        macro_rules! counter {
            ($name:literal, $help:literal) => {{
                let wrap = |source| ConfigError::Collector {
                    metric: $name.to_string(),
                    source,
                };
                let c = IntCounter::new($name, $help).map_err(wrap)?;
                registry.register(Box::new(c.clone())).map_err(wrap)?;
                c
            }};
        }

        Ok(Self {
            lines_read: counter!("stdout2prom_lines_parsed_total", "Total lines read from stdin"),
            bytes_read: counter!("stdout2prom_bytes_read_total", "Total number of bytes read from stdin"),
            lines_matched: counter!("stdout2prom_matched_lines_total", "Total lines that matched one of the regexes"),
            extraction_failures: counter!("stdout2prom_extraction_failures_total", "Total metric updates skipped because a capture could not be used"),
        })
    }

    #[inline]
    pub(crate) fn record_line(&self, bytes: usize) {
        self.lines_read.inc();
        self.bytes_read.inc_by(bytes as u64);
    }

    #[inline]
    pub(crate) fn record_match(&self) {
        self.lines_matched.inc();
    }

    #[inline]
    pub(crate) fn record_extraction_failure(&self) {
        self.extraction_failures.inc();
    }

    pub fn lines_read(&self) -> u64 {
        self.lines_read.get()
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read.get()
    }

    pub fn lines_matched(&self) -> u64 {
        self.lines_matched.get()
    }

    pub fn extraction_failures(&self) -> u64 {
        self.extraction_failures.get()
    }
}

/// Gather all metrics in `registry` and encode them in Prometheus text format.
pub fn gather_metrics(registry: &Registry) -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn classify_covers_all_four_shapes() {
        assert_eq!(Shape::classify(None, &[]), Shape::Counter);
        assert_eq!(
            Shape::classify(None, &labels(&["code"])),
            Shape::CounterVec(labels(&["code"]))
        );
        assert_eq!(Shape::classify(Some("ms"), &[]), Shape::Gauge);
        assert_eq!(
            Shape::classify(Some("ms"), &labels(&["code", "method"])),
            Shape::GaugeVec(labels(&["code", "method"]))
        );
    }

    #[test]
    fn empty_vector_shape_is_rejected() {
        let err = Collector::build("x", "help", &Shape::CounterVec(vec![])).err().unwrap();
        assert!(matches!(err, ConfigError::EmptyLabelSet { .. }));
        let err = Collector::build("x", "help", &Shape::GaugeVec(vec![])).err().unwrap();
        assert!(matches!(err, ConfigError::EmptyLabelSet { .. }));
    }

    #[test]
    fn invalid_metric_name_is_rejected() {
        let err = Collector::build("not a name", "help", &Shape::Counter).err().unwrap();
        assert!(matches!(err, ConfigError::Collector { .. }));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let registry = Registry::new();
        let a = Collector::build("dup_total", "a", &Shape::Counter).unwrap();
        let b = Collector::build("dup_total", "b", &Shape::Counter).unwrap();
        a.register("dup_total", &registry).unwrap();
        assert!(b.register("dup_total", &registry).is_err());
    }

    #[test]
    fn self_counters_are_exposed_under_fixed_names() {
        let registry = Registry::new();
        let counters = ProcessCounters::register(&registry).unwrap();
        counters.record_line(12);
        counters.record_match();
        counters.record_extraction_failure();

        assert_eq!(counters.lines_read(), 1);
        assert_eq!(counters.bytes_read(), 12);

        let output = gather_metrics(&registry);
        assert!(output.contains("stdout2prom_lines_parsed_total 1"));
        assert!(output.contains("stdout2prom_bytes_read_total 12"));
        assert!(output.contains("stdout2prom_matched_lines_total 1"));
        assert!(output.contains("stdout2prom_extraction_failures_total 1"));
    }

    #[test]
    fn empty_help_falls_back_to_name() {
        let registry = Registry::new();
        let c = Collector::build("quiet_total", "", &Shape::Counter).unwrap();
        c.register("quiet_total", &registry).unwrap();
        assert!(gather_metrics(&registry).contains("# HELP quiet_total quiet_total"));
    }
}
