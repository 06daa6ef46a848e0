use crate::client::Strategy;
use crate::error::BenchError;
use clap::Parser;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

pub const MIN_PORT: u16 = 1024;
pub const DEFAULT_FRAME_SIZE: usize = 1500; // nreps x nbufs products are chosen to hit this

/// Sends `nreps` messages of `nbufs` x `bufsize` bytes to a tcp_server and
/// reports how long it took.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct SenderArgs {
    /// Server port
    #[arg(value_parser = clap::value_parser!(u16).range(MIN_PORT as i64..))]
    pub port: u16,
    /// Number of messages to send
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub nreps: u32,
    /// Number of chunks per message
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub nbufs: u32,
    /// Size of each chunk in bytes
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub bufsize: u32,
    /// Server host name or dotted-quad address
    #[arg(value_name = "SERVER_IP")]
    pub server: String,
    /// Write strategy: 1 (multiple writes), 2 (writev), 3 (single write)
    #[arg(value_name = "TYPE")]
    pub strategy: Strategy,
    /// Write a Chrome trace of the run to this file
    #[arg(long, value_name = "FILE")]
    pub chrome_trace: Option<PathBuf>,
}

/// Accepts a tcp_client session, counts the reads needed to reassemble each
/// message and reports the time spent receiving.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct ReceiverArgs {
    /// Port to listen on
    #[arg(value_parser = clap::value_parser!(u16).range(MIN_PORT as i64..))]
    pub port: u16,
    /// Number of messages expected per session
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub nreps: u32,
    /// Size of one message in bytes; must equal the client's nbufs x bufsize
    #[arg(long, default_value_t = DEFAULT_FRAME_SIZE)]
    pub frame_size: usize,
    /// Sessions to serve before exiting
    #[arg(long, default_value_t = 1)]
    pub sessions: u32,
    /// Local address to bind
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,
    /// Write a Chrome trace of the run to this file
    #[arg(long, value_name = "FILE")]
    pub chrome_trace: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderParams {
    pub port: u16,
    pub nreps: u32,
    pub nbufs: usize,
    pub bufsize: usize,
    pub host: String,
    pub strategy: Strategy,
}

impl SenderParams {
    pub fn new(
        port: u16,
        nreps: u32,
        nbufs: usize,
        bufsize: usize,
        host: impl Into<String>,
        strategy: Strategy,
    ) -> Result<Self, BenchError> {
        check_port(port)?;
        check_positive("nreps", nreps as usize)?;
        check_positive("nbufs", nbufs)?;
        check_positive("bufsize", bufsize)?;
        nbufs
            .checked_mul(bufsize)
            .ok_or_else(|| BenchError::Usage("nbufs x bufsize overflows".to_string()))?;
        Ok(Self {
            port,
            nreps,
            nbufs,
            bufsize,
            host: host.into(),
            strategy,
        })
    }

    /// Bytes in one logical message.
    pub fn message_len(&self) -> usize {
        self.nbufs * self.bufsize
    }

    pub fn total_bytes(&self) -> u64 {
        self.nreps as u64 * self.message_len() as u64
    }
}

impl TryFrom<&SenderArgs> for SenderParams {
    type Error = BenchError;

    fn try_from(args: &SenderArgs) -> Result<Self, Self::Error> {
        SenderParams::new(
            args.port,
            args.nreps,
            args.nbufs as usize,
            args.bufsize as usize,
            args.server.clone(),
            args.strategy,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverParams {
    pub port: u16,
    pub nreps: u32,
    pub frame_size: usize,
    pub sessions: u32,
    pub bind: IpAddr,
}

impl ReceiverParams {
    pub fn new(port: u16, nreps: u32) -> Result<Self, BenchError> {
        check_port(port)?;
        check_positive("nreps", nreps as usize)?;
        Ok(Self {
            port,
            nreps,
            frame_size: DEFAULT_FRAME_SIZE,
            sessions: 1,
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        })
    }

    pub fn with_frame_size(mut self, frame_size: usize) -> Result<Self, BenchError> {
        check_positive("frame size", frame_size)?;
        self.frame_size = frame_size;
        Ok(self)
    }

    pub fn with_sessions(mut self, sessions: u32) -> Result<Self, BenchError> {
        check_positive("sessions", sessions as usize)?;
        self.sessions = sessions;
        Ok(self)
    }

    pub fn with_bind(mut self, bind: IpAddr) -> Self {
        self.bind = bind;
        self
    }

    pub fn total_bytes(&self) -> u64 {
        self.nreps as u64 * self.frame_size as u64
    }
}

impl TryFrom<&ReceiverArgs> for ReceiverParams {
    type Error = BenchError;

    fn try_from(args: &ReceiverArgs) -> Result<Self, Self::Error> {
        Ok(ReceiverParams::new(args.port, args.nreps)?
            .with_frame_size(args.frame_size)?
            .with_sessions(args.sessions)?
            .with_bind(args.bind))
    }
}

fn check_port(port: u16) -> Result<(), BenchError> {
    if port < MIN_PORT {
        return Err(BenchError::Usage(format!(
            "port must be between {} and 65535",
            MIN_PORT
        )));
    }
    Ok(())
}

fn check_positive(name: &str, value: usize) -> Result<(), BenchError> {
    if value == 0 {
        return Err(BenchError::Usage(format!("{} must be positive", name)));
    }
    Ok(())
}
