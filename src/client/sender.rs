use super::{PayloadBuffer, Strategy, TransmitStats};
use crate::config::SenderParams;
use crate::error::BenchError;
use crate::net::{ConnectStream, ack};
use crate::timing::Timestamp;
use anyhow::{Context, Result};
use std::fmt;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{info, instrument};

/// What the sender prints once a session is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenderReport {
    /// T1 - T0: time spent handing the payload to the kernel
    pub sending_usec: u64,
    /// T2 - T0: sending, waiting for the ack, and closing
    pub round_trip_usec: u64,
    /// short reads reported back by the receiver
    pub reads: u32,
    pub transmit: TransmitStats,
}

impl fmt::Display for SenderReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "data-sending time = {} usec, round-trip time = {} usec, # reads = {}",
            self.sending_usec, self.round_trip_usec, self.reads
        )
    }
}

/// Connects to the server in `params` and runs one benchmark session over a
/// stream of type `S`.
pub async fn run<S: ConnectStream>(params: &SenderParams) -> Result<SenderReport> {
    // Allocated before connecting so allocation cost stays out of the timings.
    let payload = PayloadBuffer::new(params.nbufs, params.bufsize);
    let stream = S::connect(&params.host, params.port)
        .await
        .with_context(|| format!("connecting to {}:{}", params.host, params.port))?;
    info!(host = %params.host, port = params.port, "connected");
    run_session(stream, params.strategy, params.nreps, &payload).await
}

/// Sends `nreps` copies of `payload`, waits for the receiver's read count and
/// closes `stream`.
#[instrument(skip_all, fields(strategy = %strategy, nreps = nreps))]
pub async fn run_session<S>(
    mut stream: S,
    strategy: Strategy,
    nreps: u32,
    payload: &PayloadBuffer,
) -> Result<SenderReport>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let start = Timestamp::now();
    let transmit = strategy.transmit(&mut stream, nreps, payload).await?;
    let lap = Timestamp::now();

    let reads = ack::recv_ack(&mut stream)
        .await
        .map_err(BenchError::transport("read"))
        .context("waiting for read count")?;
    drop(stream);
    let stop = Timestamp::now();

    let report = SenderReport {
        sending_usec: lap.micros_since(start, "lap")?,
        round_trip_usec: stop.micros_since(start, "stop")?,
        reads,
        transmit,
    };
    info!(
        bytes = transmit.bytes,
        writes = transmit.writes,
        reads,
        "session complete"
    );
    Ok(report)
}
