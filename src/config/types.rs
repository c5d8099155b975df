//! Core configuration types and loading.

use serde::Deserialize;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;

use crate::error::ConfigError;

/// Top-level configuration document.
///
/// Key names follow the `metrics.yml` format (`eatMatches`, `eatAll`), so
/// existing YAML files load unchanged.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Prefix joined to every metric name with `_`.
    #[serde(default)]
    pub basename: String,
    /// Do not forward lines that matched at least one metric.
    #[serde(default)]
    pub eat_matches: bool,
    /// Do not forward any line.
    #[serde(default)]
    pub eat_all: bool,
    /// Exposition endpoint address. `":9000"` binds every interface;
    /// port 0 disables the endpoint.
    #[serde(default = "default_listen")]
    pub listen: String,
    /// HTTP path the registry is served on.
    #[serde(default = "default_path")]
    pub path: String,
    /// Metric definitions, evaluated in this order.
    #[serde(default)]
    pub metrics: Vec<MetricConfig>,
}

/// One user-declared metric.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub regex: String,
    /// Named group holding the gauge value. Absent means a counter.
    #[serde(default)]
    pub value: Option<String>,
    /// Named groups that become labels, in label order.
    #[serde(default)]
    pub labels: Vec<String>,
}

impl Config {
    /// Load configuration from a file.
    ///
    /// `.toml` files are read as TOML; anything else is read as YAML.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Fully qualified metric name as registered with Prometheus.
    pub fn metric_name(&self, metric: &MetricConfig) -> String {
        if self.basename.is_empty() {
            metric.name.clone()
        } else {
            format!("{}_{}", self.basename, metric.name)
        }
    }

    /// Resolve `listen` to a socket address.
    pub fn listen_addr(&self) -> std::io::Result<SocketAddr> {
        let listen = if self.listen.starts_with(':') {
            format!("0.0.0.0{}", self.listen)
        } else {
            self.listen.clone()
        };
        listen.to_socket_addrs()?.next().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("'{}' resolved to no address", self.listen),
            )
        })
    }
}

fn default_listen() -> String {
    ":9000".to_string()
}

fn default_path() -> String {
    "/metrics".to_string()
}
