use crate::error::BenchError;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{instrument, trace};

/// Running totals for one session.
///
/// `short_reads` is the fragmentation counter sent back to the sender: every
/// read that returned before its frame was complete. The read that completes
/// a frame is not counted, so `short_reads == reads - frames`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frames: u32,
    pub bytes: u64,
    pub reads: u64,
    pub short_reads: u32,
}

/// Reassembles fixed-size frames out of however many reads the stream needs.
pub struct FrameReader {
    buf: Vec<u8>,
    stats: FrameStats,
}

impl FrameReader {
    pub fn new(frame_size: usize) -> Self {
        assert!(frame_size > 0, "frame size must be positive");
        Self {
            buf: vec![0; frame_size],
            stats: FrameStats::default(),
        }
    }

    pub fn frame_size(&self) -> usize {
        self.buf.len()
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Contents of the most recently completed frame.
    pub fn frame(&self) -> &[u8] {
        &self.buf
    }

    /// Reads exactly one frame. Each read asks only for the bytes still
    /// missing, so nothing past the frame boundary is consumed.
    pub async fn read_frame<R>(&mut self, reader: &mut R) -> Result<(), BenchError>
    where
        R: AsyncRead + Unpin,
    {
        let frame_size = self.frame_size();
        let mut filled = 0;
        while filled < frame_size {
            let n = reader
                .read(&mut self.buf[filled..])
                .await
                .map_err(BenchError::transport("read"))?;
            if n == 0 {
                return Err(BenchError::Transport {
                    stage: "read",
                    source: io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!(
                            "peer closed after {} of {} bytes of frame {}",
                            filled,
                            frame_size,
                            self.stats.frames + 1
                        ),
                    ),
                });
            }
            filled += n;
            self.stats.reads += 1;
            self.stats.bytes += n as u64;
            if filled < frame_size {
                self.stats.short_reads = self.stats.short_reads.saturating_add(1);
            }
            trace!(n, filled, "read");
        }
        self.stats.frames += 1;
        Ok(())
    }

    /// Reads `nreps` frames and returns the session totals.
    #[instrument(skip_all, fields(nreps = nreps, frame_size = self.frame_size()))]
    pub async fn receive<R>(&mut self, reader: &mut R, nreps: u32) -> Result<FrameStats, BenchError>
    where
        R: AsyncRead + Unpin,
    {
        for _ in 0..nreps {
            self.read_frame(reader).await?;
        }
        Ok(self.stats)
    }
}
