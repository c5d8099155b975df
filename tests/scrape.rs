//! Scrapes the metrics endpoint of a running binary.

use anyhow::Result;
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::sleep;

mod common;
use common::{TestConfig, spawn};

/// Fetch `path` from `port` with a bare HTTP/1.1 request.
async fn scrape(port: u16, path: &str) -> Result<String> {
    let mut stream = TcpStream::connect(("127.0.0.1", port)).await?;
    let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await?;
    let mut response = String::new();
    stream.read_to_string(&mut response).await?;
    Ok(response)
}

/// Retry `scrape` until the body contains `needle` or the deadline passes.
async fn scrape_until(port: u16, path: &str, needle: &str) -> Result<String> {
    let mut last = String::new();
    for _ in 0..50 {
        if let Ok(body) = scrape(port, path).await {
            if body.contains(needle) {
                return Ok(body);
            }
            last = body;
        }
        sleep(Duration::from_millis(100)).await;
    }
    anyhow::bail!("'{needle}' never appeared in scrape output:\n{last}")
}

#[tokio::test]
async fn test_metrics_reflect_processed_lines() -> Result<()> {
    let port = 19473;
    let config = TestConfig::yaml(&format!(
        r#"
listen: "127.0.0.1:{port}"
path: /prom
basename: web
metrics:
  - name: packetsOut
    description: Outgoing packets
    regex: output packet
  - name: response_ms
    regex: '.*POST\s+.*\s+(?P<returncode>\d+)\s+(?P<response>\d+)ms'
    value: response
    labels: [returncode]
  - name: level
    regex: 'level=(?P<v>\S+)'
    value: v
"#
    ))?;

    let mut child = spawn(&config, &["--tardy", "10"])?;
    {
        let mut stdin = child.stdin.take().expect("stdin is piped");
        stdin.write_all(b"output packet 42\nPOST /x 200 15ms\nlevel=2\nlevel=oops\n")?;
    }

    let body = scrape_until(port, "/prom", "stdout2prom_matched_lines_total 4").await;
    let _ = child.kill();
    let _ = child.wait();
    let body = body?;

    assert!(body.contains("web_packetsOut 1"));
    assert!(body.contains("web_response_ms{returncode=\"200\"} 15"));
    assert!(body.contains("web_level 2"));
    assert!(body.contains("stdout2prom_lines_parsed_total 4"));
    assert!(body.contains("stdout2prom_extraction_failures_total 1"));
    Ok(())
}
