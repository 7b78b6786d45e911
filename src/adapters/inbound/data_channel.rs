use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tracing::{debug, info};

use super::frame_receiver::FrameReceiver;
use crate::common::{ChannelError, ChannelResult};
use crate::config::ReceiverConfig;

/// Inbound (simulator -> joystick) channel: we are the server.
///
/// Bound and listening once; every message arrives on its own accepted
/// connection and ends when the simulator closes it.
pub struct DataChannel {
    listener: Option<TcpListener>,
    local_addr: SocketAddr,
    receiver: FrameReceiver,
    accept_timeout: Option<Duration>,
}

impl DataChannel {
    /// Bind with `SO_REUSEADDR` and listen with a backlog of one.
    pub fn bind(addr: SocketAddr, config: &ReceiverConfig) -> ChannelResult<Self> {
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(|source| ChannelError::Bind { addr, source })?;

        socket
            .set_reuseaddr(true)
            .map_err(|source| ChannelError::Bind { addr, source })?;
        socket
            .bind(addr)
            .map_err(|source| ChannelError::Bind { addr, source })?;
        let listener = socket
            .listen(1)
            .map_err(|source| ChannelError::Listen { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ChannelError::Listen { addr, source })?;

        info!("Listening for simulator data on {}", local_addr);
        Ok(Self {
            listener: Some(listener),
            local_addr,
            receiver: FrameReceiver::new(config),
            accept_timeout: config.accept_timeout(),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept the simulator's probe connection and discard it.
    pub async fn accept_handshake(&mut self) -> ChannelResult<()> {
        let addr = self.local_addr;
        let (stream, peer) = self.accept().await.map_err(|e| match e {
            ChannelError::Accept(source) => ChannelError::HandshakeAccept { addr, source },
            other => other,
        })?;
        drop(stream);
        info!("Robot---->Joystick connection established ({})", peer);
        Ok(())
    }

    /// Accept one connection and read it to completion as a single message.
    pub async fn receive_once(&mut self) -> ChannelResult<Vec<u8>> {
        let (mut stream, peer) = self.accept().await?;
        let data = self.receiver.read_frame(&mut stream).await?;
        debug!("Received {} bytes from {}", data.len(), peer);
        Ok(data)
    }

    async fn accept(&self) -> ChannelResult<(TcpStream, SocketAddr)> {
        let listener = self.listener.as_ref().ok_or(ChannelError::Closed)?;
        match self.accept_timeout {
            Some(limit) => tokio::time::timeout(limit, listener.accept())
                .await
                .map_err(|_| ChannelError::Timeout {
                    operation: "waiting for simulator connection",
                })?
                .map_err(ChannelError::Accept),
            None => listener.accept().await.map_err(ChannelError::Accept),
        }
    }

    pub fn close(&mut self) {
        if self.listener.take().is_some() {
            debug!("Closed data channel on {}", self.local_addr);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.listener.is_none()
    }
}
