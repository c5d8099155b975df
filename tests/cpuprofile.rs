//! `--cpuprofile` writes its report once the binary exits.
#![cfg(all(unix, feature = "cpuprofile"))]

use anyhow::Result;
use std::io::Write;

mod common;
use common::{TestConfig, spawn};

fn run_profiled(config: &TestConfig, profile: &std::path::Path) -> Result<std::process::Output> {
    let profile = profile.to_str().expect("utf-8 temp path");
    let mut child = spawn(config, &["--cpuprofile", profile])?;
    let mut stdin = child.stdin.take().expect("stdin is piped");
    for i in 0..2000 {
        writeln!(stdin, "output packet {i}")?;
    }
    drop(stdin);
    Ok(child.wait_with_output()?)
}

#[test]
fn test_cpuprofile_writes_protobuf_report() -> Result<()> {
    let config = TestConfig::yaml(
        "listen: \"127.0.0.1:0\"\nmetrics:\n  - name: packetsOut\n    regex: output packet\n",
    )?;
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("cpu.pb");

    let output = run_profiled(&config, &path)?;

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(path.exists());
    Ok(())
}
