//! stdout2prom - Takes your stdout and puts it into Prometheus.
//!
//! Reads lines from stdin, updates metrics from regex matches, and passes
//! lines through to stdout unless told to eat them.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use stdout2prom::config::{self, Config};
use stdout2prom::engine::Engine;
use stdout2prom::error::ConfigError;
use stdout2prom::{http, metrics, pipeline};
#[cfg(all(unix, feature = "cpuprofile"))]
use stdout2prom::profile::CpuProfile;

/// Turn a program's stdout into Prometheus metrics.
#[derive(Parser)]
#[command(name = "stdout2prom", version)]
struct Args {
    /// Config file (YAML, or TOML with a .toml extension).
    #[arg(short, long, default_value = "metrics.yml")]
    config: PathBuf,

    /// Display more of the inner workings.
    #[arg(short, long)]
    debug: bool,

    /// Hang around for this many seconds after stdin closes.
    #[arg(long, default_value = "0")]
    tardy: u64,

    /// Write a CPU profile to this file on exit (SVG flamegraph for a .svg
    /// extension, pprof protobuf otherwise).
    #[arg(long, value_name = "FILE")]
    cpuprofile: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // stdout carries the pass-through stream, so logs go to stderr.
    let default_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let config = Config::load(&args.config).map_err(|e| {
        error!(path = %args.config.display(), error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        return Err(ConfigError::Invalid(errors.len()).into());
    }

    let registry = metrics::registry();
    let engine = Engine::from_config(&config, registry).map_err(|e| {
        error!(error = %e, "Failed to build metrics");
        e
    })?;
    info!(
        metrics = engine.metrics().len(),
        eat_matches = config.eat_matches,
        eat_all = config.eat_all,
        "Starting stdout2prom"
    );

    // Convention: port 0 disables the HTTP endpoint (used by tests).
    let addr = config.listen_addr()?;
    if addr.port() == 0 {
        info!("Metrics endpoint disabled");
    } else {
        let listener = http::bind(addr).await.map_err(|e| {
            error!(%addr, error = %e, "Failed to bind metrics endpoint");
            e
        })?;
        tokio::spawn(http::run_http_server(
            listener,
            config.path.clone(),
            registry.clone(),
        ));
    }

    let profile = start_profile(args.cpuprofile.as_deref())?;

    let summary = pipeline::run(&engine, tokio::io::stdin(), tokio::io::stdout()).await?;
    info!(
        lines = summary.lines,
        forwarded = summary.forwarded,
        matched = engine.counters().lines_matched(),
        "Input closed"
    );

    if args.tardy > 0 {
        info!(seconds = args.tardy, "Stdin closed, waiting before exit");
        tokio::time::sleep(Duration::from_secs(args.tardy)).await;
    }

    if let Some(profile) = profile {
        profile.finish().map_err(|e| {
            error!(error = %e, "Failed to write CPU profile");
            e
        })?;
    }

    Ok(())
}

#[cfg(all(unix, feature = "cpuprofile"))]
fn start_profile(path: Option<&Path>) -> anyhow::Result<Option<CpuProfile>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let profile = CpuProfile::start(path)?;
    info!(path = %path.display(), "CPU profiling enabled");
    Ok(Some(profile))
}

#[cfg(not(all(unix, feature = "cpuprofile")))]
fn start_profile(path: Option<&Path>) -> anyhow::Result<Option<NoProfile>> {
    match path {
        Some(_) => anyhow::bail!("--cpuprofile needs a unix build with the cpuprofile feature"),
        None => Ok(None),
    }
}

#[cfg(not(all(unix, feature = "cpuprofile")))]
enum NoProfile {}

#[cfg(not(all(unix, feature = "cpuprofile")))]
impl NoProfile {
    fn finish(self) -> anyhow::Result<()> {
        match self {}
    }
}
