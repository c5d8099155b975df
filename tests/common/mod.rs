//! Integration test common infrastructure.
//!
//! Writes throwaway configs and spawns the stdout2prom binary with piped
//! stdio.

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

/// A config file in a temporary directory that lives as long as the value.
pub struct TestConfig {
    _dir: tempfile::TempDir,
    pub path: PathBuf,
}

impl TestConfig {
    pub fn yaml(content: &str) -> anyhow::Result<Self> {
        Self::with_name("metrics.yml", content)
    }

    #[allow(dead_code)]
    pub fn toml(content: &str) -> anyhow::Result<Self> {
        Self::with_name("metrics.toml", content)
    }

    fn with_name(name: &str, content: &str) -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(name);
        std::fs::write(&path, content)?;
        Ok(Self { _dir: dir, path })
    }
}

/// Spawn the binary against `config` with all three stdio streams piped.
pub fn spawn(config: &TestConfig, extra_args: &[&str]) -> anyhow::Result<Child> {
    let child = Command::new(env!("CARGO_BIN_EXE_stdout2prom"))
        .arg("--config")
        .arg(&config.path)
        .args(extra_args)
        .env("RUST_LOG", "warn")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    Ok(child)
}
