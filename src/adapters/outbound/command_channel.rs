use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::common::{ChannelError, ChannelResult};
use crate::config::ConnectionConfig;

/// Outbound (joystick -> simulator) channel: we are the client.
///
/// No connection is held between messages. Each send connects, writes the
/// whole payload and closes, so the simulator sees one message per connection.
#[derive(Debug, Clone)]
pub struct CommandChannel {
    addr: SocketAddr,
    connect_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
}

impl CommandChannel {
    pub fn new(config: &ConnectionConfig) -> ChannelResult<Self> {
        Ok(Self {
            addr: config.send_addr()?,
            connect_timeout: config.connect_timeout(),
            write_timeout: config.write_timeout(),
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Connect once and hang up, confirming the simulator is listening.
    pub async fn probe(&self) -> ChannelResult<()> {
        let stream = self.connect().await?;
        drop(stream);
        info!("Joystick->Robot connection established ({})", self.addr);
        Ok(())
    }

    /// Deliver one message on a fresh connection. No retry.
    pub async fn send(&self, payload: &[u8]) -> ChannelResult<usize> {
        let mut stream = self.connect().await?;

        let written = match self.write_timeout {
            Some(limit) => tokio::time::timeout(limit, write_payload(&mut stream, payload))
                .await
                .map_err(|_| ChannelError::Timeout {
                    operation: "sending command",
                })??,
            None => write_payload(&mut stream, payload).await?,
        };
        // Closing the write side is what terminates the message for the peer.
        stream.shutdown().await.map_err(ChannelError::Send)?;

        debug!(
            "sent {} bytes: \"{}\"",
            written,
            String::from_utf8_lossy(payload)
        );
        Ok(written)
    }

    async fn connect(&self) -> ChannelResult<TcpStream> {
        let addr = self.addr;
        let attempt = TcpStream::connect(addr);
        let result = match self.connect_timeout {
            Some(limit) => tokio::time::timeout(limit, attempt)
                .await
                .map_err(|_| ChannelError::Timeout {
                    operation: "connecting to simulator",
                })?,
            None => attempt.await,
        };
        result.map_err(|source| ChannelError::Connect { addr, source })
    }
}

async fn write_payload(stream: &mut TcpStream, payload: &[u8]) -> ChannelResult<usize> {
    let mut written = 0;
    while written < payload.len() {
        match stream.write(&payload[written..]).await {
            Ok(0) => {
                return Err(ChannelError::PartialSend {
                    written,
                    expected: payload.len(),
                })
            }
            Ok(n) => written += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ChannelError::Send(e)),
        }
    }
    stream.flush().await.map_err(ChannelError::Send)?;
    Ok(written)
}
