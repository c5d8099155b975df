//! Line worker: reads the input stream, feeds the engine, forwards lines.
//!
//! Runs strictly sequentially. A line is fully matched and either written or
//! eaten before the next one is read.

use futures_util::StreamExt;
use std::io;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, FramedRead};

use crate::engine::Engine;

/// Totals for one run of the worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub lines: u64,
    pub forwarded: u64,
}

/// Process `reader` line by line until it ends.
///
/// Lines are raw bytes split on `\n` with a trailing `\r` removed, so input
/// that is not UTF-8 is matched and forwarded like any other line. Forwarded
/// lines are written byte for byte with a `\n` terminator and flushed one at
/// a time. Only an I/O error on either side stops the worker.
pub async fn run<R, W>(engine: &Engine, reader: R, mut writer: W) -> io::Result<RunSummary>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let codec = AnyDelimiterCodec::new(b"\n".to_vec(), b"\n".to_vec());
    let mut lines = FramedRead::new(reader, codec);
    let mut summary = RunSummary::default();

    while let Some(frame) = lines.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(AnyDelimiterCodecError::Io(e)) => {
                tracing::error!(error = %e, lines = summary.lines, "Failed to read input");
                return Err(e);
            }
            Err(e) => return Err(io::Error::new(io::ErrorKind::InvalidData, e)),
        };
        let line = frame.strip_suffix(b"\r").unwrap_or(&frame[..]);
        summary.lines += 1;

        if engine.process_bytes(line).is_forward() {
            writer.write_all(line).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
            summary.forwarded += 1;
        }
    }

    writer.flush().await?;
    Ok(summary)
}
