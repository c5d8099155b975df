//! CPU profiling for `--cpuprofile`.
//!
//! Samples the whole process from startup until [`CpuProfile::finish`]. The
//! report is an SVG flamegraph when the output path ends in `.svg`, and a
//! pprof protobuf profile otherwise.

use pprof::protos::Message;
use pprof::{ProfilerGuard, ProfilerGuardBuilder};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Sampling frequency in Hz.
const FREQUENCY: i32 = 1000;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profiler error: {0}")]
    Pprof(#[from] pprof::Error),
    #[error("failed to write profile: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode profile: {0}")]
    Encode(String),
}

/// A running profiler and the file its report goes to.
pub struct CpuProfile {
    guard: ProfilerGuard<'static>,
    path: PathBuf,
}

impl CpuProfile {
    /// Start sampling. Only one profile can run per process.
    pub fn start(path: impl Into<PathBuf>) -> Result<Self, ProfileError> {
        let guard = ProfilerGuardBuilder::default()
            .frequency(FREQUENCY)
            .blocklist(&["libc", "libgcc", "pthread", "vdso"])
            .build()?;
        Ok(Self {
            guard,
            path: path.into(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stop sampling and write the report.
    pub fn finish(self) -> Result<(), ProfileError> {
        let report = self.guard.report().build()?;

        if self.path.extension().is_some_and(|e| e == "svg") {
            let file = std::fs::File::create(&self.path)?;
            report.flamegraph(file)?;
        } else {
            let profile = report.pprof()?;
            let mut content = Vec::new();
            profile
                .encode(&mut content)
                .map_err(|e| ProfileError::Encode(e.to_string()))?;
            std::fs::write(&self.path, content)?;
        }

        tracing::info!(path = %self.path.display(), "CPU profile written");
        Ok(())
    }
}
