use crate::error::BenchError;
use anyhow::Result;
use async_trait::async_trait;
use core::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener as TokioTcpListener, TcpSocket, TcpStream as TokioTcpStream};
use turmoil::net::{TcpListener as TurmoilTcpListener, TcpStream as TurmoilTcpStream};

pub const LISTEN_BACKLOG: u32 = 5; // Pending connections queued by the kernel

/// A stream the sender can open by host name and port.
#[async_trait]
pub trait ConnectStream: AsyncRead + AsyncWrite + Unpin + Send + Sized {
    async fn connect(host: &str, port: u16) -> Result<Self>;
}

#[async_trait]
impl ConnectStream for TokioTcpStream {
    async fn connect(host: &str, port: u16) -> Result<Self> {
        let addr = resolve(host, port).await?;
        tracing::debug!(host, %addr, "resolved server address");
        let stream = TokioTcpStream::connect(addr)
            .await
            .map_err(BenchError::setup("connect"))?;
        Ok(stream)
    }
}

#[async_trait]
impl ConnectStream for TurmoilTcpStream {
    async fn connect(host: &str, port: u16) -> Result<Self> {
        let stream = TurmoilTcpStream::connect((host, port))
            .await
            .map_err(BenchError::setup("connect"))?;
        Ok(stream)
    }
}

/// Resolves `host`, preferring an IPv4 address when the name has several.
pub async fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    let unknown = || BenchError::UnknownHost(host.to_string());
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
        .await
        .map_err(|_| unknown())?
        .collect();
    let addr = addrs
        .iter()
        .copied()
        .find(SocketAddr::is_ipv4)
        .or_else(|| addrs.first().copied())
        .ok_or_else(unknown)?;
    Ok(addr)
}

/// A listening socket the receiver accepts sessions on.
#[async_trait]
pub trait Listener: Send + Sync + Unpin + Sized {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    async fn bind(addr: SocketAddr) -> std::io::Result<Self>;
    async fn accept(&self) -> std::io::Result<(Self::Stream, SocketAddr)>;
    fn local_addr(&self) -> std::io::Result<SocketAddr>;
}

#[async_trait]
impl Listener for TokioTcpListener {
    type Stream = TokioTcpStream;

    async fn bind(addr: SocketAddr) -> std::io::Result<Self> {
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        socket.listen(LISTEN_BACKLOG)
    }

    async fn accept(&self) -> std::io::Result<(Self::Stream, SocketAddr)> {
        TokioTcpListener::accept(self).await
    }

    fn local_addr(&self) -> std::io::Result<SocketAddr> {
        TokioTcpListener::local_addr(self)
    }
}

#[async_trait]
impl Listener for TurmoilTcpListener {
    type Stream = TurmoilTcpStream;

    async fn bind(addr: SocketAddr) -> std::io::Result<Self> {
        // The simulated network has no socket options to set.
        TurmoilTcpListener::bind(addr).await
    }

    async fn accept(&self) -> std::io::Result<(Self::Stream, SocketAddr)> {
        TurmoilTcpListener::accept(self).await
    }

    fn local_addr(&self) -> std::io::Result<SocketAddr> {
        TurmoilTcpListener::local_addr(self)
    }
}
