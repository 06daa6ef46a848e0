//! The acknowledgment that closes a session: a single 4-byte read count sent
//! from receiver to sender, in network (big-endian) byte order.

use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const ACK_LEN: usize = 4;

pub fn encode(count: u32) -> [u8; ACK_LEN] {
    count.to_be_bytes()
}

pub fn decode(bytes: [u8; ACK_LEN]) -> u32 {
    u32::from_be_bytes(bytes)
}

pub async fn send_ack<W>(writer: &mut W, count: u32) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&encode(count)).await?;
    writer.flush().await
}

/// Waits for the receiver's count. Fails with `UnexpectedEof` if the peer
/// closes before all four bytes arrive.
pub async fn recv_ack<R>(reader: &mut R) -> io::Result<u32>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; ACK_LEN];
    reader.read_exact(&mut buf).await?;
    Ok(decode(buf))
}
