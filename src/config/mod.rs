//! Configuration loading and validation.
//!
//! - [`types`]: Config document structs and loading (YAML or TOML)
//! - [`validation`]: Startup checks that do not need a compiled regex

mod types;
mod validation;

pub use types::{Config, MetricConfig};
pub use validation::{ValidationError, validate};
