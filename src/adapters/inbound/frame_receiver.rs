//! Close-delimited framing.
//!
//! A frame is everything the peer writes between connecting and closing its
//! write side. There is no length prefix and no delimiter, so the only way to
//! tell a complete frame from a truncated one is how the stream ended: a clean
//! EOF completes the frame, a read error yields [`ChannelError::Receive`].

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use crate::common::{ChannelError, ChannelResult};
use crate::config::{ReceiverConfig, DEFAULT_CHUNK_SIZE};

#[derive(Debug, Clone)]
pub struct FrameReceiver {
    chunk_size: usize,
    read_timeout: Option<Duration>,
    max_frame_bytes: Option<usize>,
}

impl Default for FrameReceiver {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            read_timeout: None,
            max_frame_bytes: None,
        }
    }
}

impl FrameReceiver {
    pub fn new(config: &ReceiverConfig) -> Self {
        Self {
            chunk_size: config.chunk_size.max(1),
            read_timeout: config.read_timeout(),
            max_frame_bytes: config.max_frame_bytes,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Read fixed-size chunks until the peer closes, returning the whole frame.
    ///
    /// An immediate EOF is a valid empty frame. The read timeout, when set,
    /// applies to each individual read rather than the whole frame.
    pub async fn read_frame<R>(&self, reader: &mut R) -> ChannelResult<Vec<u8>>
    where
        R: AsyncRead + Unpin,
    {
        let mut buffer = vec![0u8; self.chunk_size];
        let mut data = Vec::new();

        loop {
            let read = match self.read_timeout {
                Some(limit) => tokio::time::timeout(limit, reader.read(&mut buffer))
                    .await
                    .map_err(|_| ChannelError::Timeout {
                        operation: "reading frame",
                    })?,
                None => reader.read(&mut buffer).await,
            };

            let n = match read {
                Ok(0) => break,
                Ok(n) => n,
                Err(source) => {
                    return Err(ChannelError::Receive {
                        received: data.len(),
                        source,
                    })
                }
            };

            if let Some(max) = self.max_frame_bytes {
                if data.len() + n > max {
                    return Err(ChannelError::FrameTooLarge {
                        size: data.len() + n,
                        max,
                    });
                }
            }
            data.extend_from_slice(&buffer[..n]);
        }

        debug!("Received frame of {} bytes", data.len());
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio_test::io::Builder;

    fn receiver(chunk_size: usize) -> FrameReceiver {
        FrameReceiver::new(&ReceiverConfig {
            chunk_size,
            ..ReceiverConfig::default()
        })
    }

    #[tokio::test]
    async fn test_reassembles_across_chunk_boundaries() {
        let message: Vec<u8> = (0u8..=255).cycle().take(1000).collect();

        for (chunk_size, split) in [(1, 7), (3, 128), (128, 1), (4096, 333)] {
            let mut mock = Builder::new();
            for piece in message.chunks(split) {
                mock.read(piece);
            }
            let mut stream = mock.build();
            let frame = receiver(chunk_size).read_frame(&mut stream).await.unwrap();
            assert_eq!(frame, message, "chunk_size={} split={}", chunk_size, split);
        }
    }

    #[tokio::test]
    async fn test_immediate_close_is_empty_frame() {
        let mut stream = Builder::new().build();
        let frame = FrameReceiver::default().read_frame(&mut stream).await.unwrap();
        assert!(frame.is_empty());
    }

    #[tokio::test]
    async fn test_read_error_reports_truncation() {
        let mut stream = Builder::new()
            .read(b"partial ")
            .read_error(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"))
            .build();
        let err = FrameReceiver::default().read_frame(&mut stream).await.unwrap_err();
        match err {
            ChannelError::Receive { received, source } => {
                assert_eq!(received, 8);
                assert_eq!(source.kind(), std::io::ErrorKind::ConnectionReset);
            }
            other => panic!("Expected Receive error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_frame_size_cap() {
        let receiver = FrameReceiver::new(&ReceiverConfig {
            max_frame_bytes: Some(4),
            ..ReceiverConfig::default()
        });
        let mut stream = Builder::new().read(b"too long").build();
        let err = receiver.read_frame(&mut stream).await.unwrap_err();
        assert!(matches!(err, ChannelError::FrameTooLarge { max: 4, .. }));
    }

    #[tokio::test]
    async fn test_read_timeout_when_peer_never_closes() {
        let receiver = FrameReceiver::new(&ReceiverConfig {
            read_timeout_ms: Some(20),
            ..ReceiverConfig::default()
        });
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all(b"hello").await.unwrap();

        let err = receiver.read_frame(&mut server).await.unwrap_err();
        assert!(matches!(err, ChannelError::Timeout { .. }));
        drop(client);
    }

    #[test]
    fn test_zero_chunk_size_is_clamped() {
        assert_eq!(receiver(0).chunk_size(), 1);
    }
}
