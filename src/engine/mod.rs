//! Match-and-update engine.
//!
//! Every input line is tested against every configured metric in declaration
//! order. There is no short-circuit: one line may update several metrics.
//! After all metrics have been tried, the pass-through policy decides whether
//! the line is forwarded.
//!
//! - [`metric`]: Compiled metric definitions and their update step
//! - [`extract`]: Value and label extraction from a regex match
//! - [`policy`]: Forward/eat decision

mod extract;
mod metric;
mod policy;

pub use extract::{extract_labels, extract_value, index_of};
pub use metric::MetricSpec;
pub use policy::{Disposition, PassThrough};

use prometheus::Registry;
use tracing::{debug, trace};

use crate::config::Config;
use crate::error::ConfigError;
use crate::metrics::ProcessCounters;

/// Compiled metrics plus the process counters and pass-through policy.
///
/// Read-only after construction apart from the collectors' atomic values.
pub struct Engine {
    metrics: Vec<MetricSpec>,
    policy: PassThrough,
    counters: ProcessCounters,
}

impl Engine {
    /// Compile every configured metric and register it, together with the
    /// process counters, in `registry`.
    pub fn from_config(config: &Config, registry: &Registry) -> Result<Self, ConfigError> {
        let counters = ProcessCounters::register(registry)?;
        let metrics = config
            .metrics
            .iter()
            .map(|m| MetricSpec::compile(&config.metric_name(m), m, registry))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(metrics, PassThrough::from_config(config), counters))
    }

    pub fn new(metrics: Vec<MetricSpec>, policy: PassThrough, counters: ProcessCounters) -> Self {
        Self {
            metrics,
            policy,
            counters,
        }
    }

    pub fn metrics(&self) -> &[MetricSpec] {
        &self.metrics
    }

    pub fn counters(&self) -> &ProcessCounters {
        &self.counters
    }

    /// Match one line against every metric and decide whether to forward it.
    pub fn process_line(&self, line: &str) -> Disposition {
        self.evaluate(line, line.len())
    }

    /// Like [`Engine::process_line`] for a raw line that may not be UTF-8.
    ///
    /// Invalid sequences are replaced with U+FFFD for matching only; the
    /// byte count is taken from the raw line.
    pub fn process_bytes(&self, line: &[u8]) -> Disposition {
        self.evaluate(&String::from_utf8_lossy(line), line.len())
    }

    fn evaluate(&self, line: &str, raw_len: usize) -> Disposition {
        self.counters.record_line(raw_len);

        let mut matched = false;
        for metric in &self.metrics {
            trace!(metric = %metric.name(), "Testing line");
            let Some(outcome) = metric.apply(line) else {
                continue;
            };
            matched = true;
            match outcome {
                Ok(()) => trace!(metric = %metric.name(), "Match"),
                Err(e) => {
                    self.counters.record_extraction_failure();
                    debug!(
                        metric = %metric.name(),
                        code = e.error_code(),
                        error = %e,
                        "Skipped metric update"
                    );
                }
            }
        }

        if matched {
            self.counters.record_match();
        }
        self.policy.decide(matched)
    }
}
