//! stdout2prom - turn a line-oriented text stream into Prometheus metrics.
//!
//! Each input line is matched against user-defined regular expressions.
//! Matches increment counters or set gauges, optionally labelled from named
//! capture groups, and the registry is served for scraping over HTTP.

pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod metrics;
pub mod pipeline;
#[cfg(all(unix, feature = "cpuprofile"))]
pub mod profile;
