use super::PayloadBuffer;
use crate::error::BenchError;
use std::fmt;
use std::io::{self, IoSlice};
use std::str::FromStr;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, instrument};

/// How a logical message is handed to the kernel. The bytes on the wire are
/// the same for every strategy; only the write boundaries differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Strategy {
    /// One write per chunk.
    Multiple = 1,
    /// One scatter/gather write per message.
    Vectored = 2,
    /// One write of the contiguous message.
    Single = 3,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Multiple, Strategy::Vectored, Strategy::Single];

    /// Writes `nreps` copies of `payload` to `writer`. Partial writes are
    /// resumed until every byte is out; the stream is left open.
    #[instrument(skip_all, fields(strategy = %self, nreps = nreps, len = payload.len()))]
    pub async fn transmit<W>(
        self,
        writer: &mut W,
        nreps: u32,
        payload: &PayloadBuffer,
    ) -> Result<TransmitStats, BenchError>
    where
        W: AsyncWrite + Unpin,
    {
        let mut stats = TransmitStats::default();
        match self {
            Strategy::Multiple => {
                for _ in 0..nreps {
                    for chunk in payload.chunks() {
                        write_fully(writer, chunk, &mut stats).await?;
                    }
                }
            }
            Strategy::Vectored => {
                let descriptor = payload.io_slices();
                let mut iov = Vec::with_capacity(descriptor.len());
                for _ in 0..nreps {
                    iov.clear();
                    iov.extend_from_slice(&descriptor);
                    write_vectored_fully(writer, &mut iov, &mut stats).await?;
                }
            }
            Strategy::Single => {
                for _ in 0..nreps {
                    write_fully(writer, payload.as_slice(), &mut stats).await?;
                }
            }
        }
        writer.flush().await.map_err(BenchError::transport("write"))?;
        debug!(
            bytes = stats.bytes,
            writes = stats.writes,
            short_writes = stats.short_writes,
            "transmission complete"
        );
        Ok(stats)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Multiple => "multiple",
            Strategy::Vectored => "vectored",
            Strategy::Single => "single",
        };
        f.write_str(name)
    }
}

impl TryFrom<u8> for Strategy {
    type Error = BenchError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Strategy::Multiple),
            2 => Ok(Strategy::Vectored),
            3 => Ok(Strategy::Single),
            _ => Err(BenchError::Usage("invalid write type".to_string())),
        }
    }
}

impl FromStr for Strategy {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "multiple" => Ok(Strategy::Multiple),
            "vectored" | "writev" => Ok(Strategy::Vectored),
            "single" => Ok(Strategy::Single),
            code => code
                .parse::<u8>()
                .map_err(|_| BenchError::Usage("invalid write type".to_string()))
                .and_then(Strategy::try_from),
        }
    }
}

/// Counters for one transmission. `writes` counts every write call issued,
/// including the follow-ups needed after a short write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransmitStats {
    pub bytes: u64,
    pub writes: u64,
    pub short_writes: u64,
}

async fn write_fully<W>(writer: &mut W, mut buf: &[u8], stats: &mut TransmitStats) -> Result<(), BenchError>
where
    W: AsyncWrite + Unpin,
{
    while !buf.is_empty() {
        let n = writer
            .write(buf)
            .await
            .map_err(BenchError::transport("write"))?;
        record(stats, n, buf.len())?;
        buf = &buf[n..];
    }
    Ok(())
}

async fn write_vectored_fully<W>(
    writer: &mut W,
    iov: &mut [IoSlice<'_>],
    stats: &mut TransmitStats,
) -> Result<(), BenchError>
where
    W: AsyncWrite + Unpin,
{
    let mut bufs = iov;
    while !bufs.is_empty() {
        let requested: usize = bufs.iter().map(|b| b.len()).sum();
        let n = writer
            .write_vectored(&*bufs)
            .await
            .map_err(BenchError::transport("writev"))?;
        record(stats, n, requested)?;
        IoSlice::advance_slices(&mut bufs, n);
    }
    Ok(())
}

fn record(stats: &mut TransmitStats, written: usize, requested: usize) -> Result<(), BenchError> {
    stats.writes += 1;
    if written == 0 {
        return Err(BenchError::Transport {
            stage: "write",
            source: io::Error::from(io::ErrorKind::WriteZero),
        });
    }
    stats.bytes += written as u64;
    if written < requested {
        stats.short_writes += 1;
        debug!(written, requested, "short write, resuming");
    }
    Ok(())
}
