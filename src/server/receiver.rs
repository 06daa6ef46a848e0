use super::{FrameReader, FrameStats};
use crate::config::ReceiverParams;
use crate::error::BenchError;
use crate::net::{Listener, ack};
use crate::timing::Timestamp;
use anyhow::{Context, Result};
use std::fmt;
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{info, instrument};

/// What the receiver prints once a session is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverReport {
    /// R1 - R0
    pub receiving_usec: u64,
    pub frames: FrameStats,
}

impl fmt::Display for ReceiverReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data-receiving time = {} usec", self.receiving_usec)
    }
}

/// Binds the listening socket described by `params`.
pub async fn bind<L: Listener>(params: &ReceiverParams) -> Result<L> {
    let addr = SocketAddr::new(params.bind, params.port);
    let listener = L::bind(addr)
        .await
        .map_err(BenchError::setup("bind"))
        .with_context(|| format!("binding {}", addr))?;
    Ok(listener)
}

/// Waits for the next client and serves one session on it.
pub async fn accept_session<L: Listener>(listener: &L, params: &ReceiverParams) -> Result<ReceiverReport> {
    let (stream, peer) = listener.accept().await.map_err(BenchError::setup("accept"))?;
    info!(%peer, "client connected");
    serve_connection(stream, params).await
}

/// Serves `params.sessions` clients one after another on `listener`, handing
/// each report to `on_report` as soon as its session ends.
pub async fn serve<L, F>(listener: &L, params: &ReceiverParams, mut on_report: F) -> Result<()>
where
    L: Listener,
    F: FnMut(&ReceiverReport),
{
    for session in 1..=params.sessions {
        let report = accept_session(listener, params)
            .await
            .with_context(|| format!("session {} of {}", session, params.sessions))?;
        on_report(&report);
    }
    Ok(())
}

/// Consumes `params.nreps` frames from `stream`, sends back the short-read
/// count and closes the connection.
#[instrument(skip_all, fields(nreps = params.nreps, frame_size = params.frame_size))]
pub async fn serve_connection<S>(mut stream: S, params: &ReceiverParams) -> Result<ReceiverReport>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut framer = FrameReader::new(params.frame_size);

    let start = Timestamp::now();
    let frames = framer.receive(&mut stream, params.nreps).await?;
    let stop = Timestamp::now();

    ack::send_ack(&mut stream, frames.short_reads)
        .await
        .map_err(BenchError::transport("write"))
        .context("sending read count")?;
    drop(stream);

    let report = ReceiverReport {
        receiving_usec: stop.micros_since(start, "stop")?,
        frames,
    };
    info!(
        bytes = frames.bytes,
        reads = frames.reads,
        short_reads = frames.short_reads,
        "session complete"
    );
    Ok(report)
}
