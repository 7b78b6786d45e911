use std::net::SocketAddr;

use async_trait::async_trait;
use tracing::info;

use crate::adapters::inbound::DataChannel;
use crate::adapters::outbound::CommandChannel;
use crate::common::ChannelResult;
use crate::config::{ConnectionConfig, ReceiverConfig};
use crate::domains::session::SimulatorLink;

/// Owns both channel roles for the lifetime of a session.
///
/// The listening socket is released on `close` or when the manager is
/// dropped, whichever comes first.
pub struct ConnectionManager {
    commands: CommandChannel,
    data: DataChannel,
}

impl ConnectionManager {
    /// Establish both channels.
    ///
    /// The inbound listener is bound before the outbound probe so the
    /// simulator can never dial back before we are listening. With
    /// `handshake_accept` on, the simulator's probe connection is then
    /// accepted and discarded.
    pub async fn establish(connection: &ConnectionConfig, receiver: &ReceiverConfig) -> ChannelResult<Self> {
        let commands = CommandChannel::new(connection)?;
        let mut data = DataChannel::bind(connection.recv_addr()?, receiver)?;

        commands.probe().await?;
        if connection.handshake_accept {
            data.accept_handshake().await?;
        }

        info!(
            "Channels established: commands -> {}, data <- {}",
            commands.peer_addr(),
            data.local_addr()
        );
        Ok(Self { commands, data })
    }

    pub fn local_recv_addr(&self) -> SocketAddr {
        self.data.local_addr()
    }

    pub fn command_addr(&self) -> SocketAddr {
        self.commands.peer_addr()
    }
}

#[async_trait]
impl SimulatorLink for ConnectionManager {
    async fn send(&mut self, payload: &[u8]) -> ChannelResult<usize> {
        self.commands.send(payload).await
    }

    async fn receive_once(&mut self) -> ChannelResult<Vec<u8>> {
        self.data.receive_once().await
    }

    async fn close(&mut self) {
        self.data.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ChannelError;
    use tokio::io::AsyncWriteExt;
    use tokio::net::{TcpListener, TcpStream};

    #[tokio::test]
    async fn test_establish_fails_without_simulator() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let connection = ConnectionConfig {
            send_port: port,
            recv_port: Some(0),
            ..ConnectionConfig::default()
        };
        let result = ConnectionManager::establish(&connection, &ReceiverConfig::default()).await;
        assert!(matches!(result, Err(ChannelError::Connect { .. })));
    }

    #[tokio::test]
    async fn test_establish_without_handshake_then_receive() {
        let sim = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let connection = ConnectionConfig {
            send_port: sim.local_addr().unwrap().port(),
            recv_port: Some(0),
            handshake_accept: false,
            ..ConnectionConfig::default()
        };

        let mut manager = ConnectionManager::establish(&connection, &ReceiverConfig::default())
            .await
            .unwrap();
        let data_addr = manager.local_recv_addr();

        let pusher = tokio::spawn(async move {
            let mut stream = TcpStream::connect(data_addr).await.unwrap();
            stream.write_all(b"payload").await.unwrap();
        });
        assert_eq!(manager.receive_once().await.unwrap(), b"payload");
        pusher.await.unwrap();

        manager.close().await;
        manager.close().await;
        assert!(matches!(manager.receive_once().await, Err(ChannelError::Closed)));
    }
}
