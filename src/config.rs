use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use crate::common::{ChannelError, ChannelResult};
use crate::domains::episode::{DEFAULT_GRID_SCALE, ROBOT_AGENT_KEY};

pub const DEFAULT_SEND_PORT: u16 = 6000;
pub const DEFAULT_CHUNK_SIZE: usize = 128;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub connection: ConnectionConfig,
    pub receiver: ReceiverConfig,
    pub decoder: DecoderConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

/// Where the two channels live. The receive port defaults to `send_port + 1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub host: String,
    pub send_port: u16,
    pub recv_port: Option<u16>,
    /// Accept and discard the simulator's probe connection while setting up.
    pub handshake_accept: bool,
    pub connect_timeout_ms: Option<u64>,
    pub write_timeout_ms: Option<u64>,
}

/// Frame receiver tuning. Timeouts are off unless set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    pub chunk_size: usize,
    pub accept_timeout_ms: Option<u64>,
    pub read_timeout_ms: Option<u64>,
    pub max_frame_bytes: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Metres per traversability cell.
    pub grid_scale: f64,
    pub robot_key: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub on_decode_failure: DecodeFailurePolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeFailurePolicy {
    /// Log the failure and wait for the next episode's metadata.
    #[default]
    Skip,
    /// End the session with the decode error.
    Abort,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: Option<String>,
    pub level: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            send_port: DEFAULT_SEND_PORT,
            recv_port: None,
            handshake_accept: true,
            connect_timeout_ms: None,
            write_timeout_ms: None,
        }
    }
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            accept_timeout_ms: None,
            read_timeout_ms: None,
            max_frame_bytes: None,
        }
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            grid_scale: DEFAULT_GRID_SCALE,
            robot_key: ROBOT_AGENT_KEY.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".to_string(),
        }
    }
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply `JOYSTICK_HOST` and `JOYSTICK_PORT` when present.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(host) = std::env::var("JOYSTICK_HOST") {
            self.connection.host = host;
        }
        if let Ok(port) = std::env::var("JOYSTICK_PORT") {
            self.connection.send_port = port
                .parse()
                .map_err(|e| anyhow::anyhow!("JOYSTICK_PORT '{}' is not a port: {}", port, e))?;
        }
        Ok(self)
    }
}

impl ConnectionConfig {
    fn ip(&self) -> ChannelResult<IpAddr> {
        if self.host == "localhost" {
            return Ok(IpAddr::V4(Ipv4Addr::LOCALHOST));
        }
        self.host
            .parse()
            .map_err(|_| ChannelError::InvalidAddress(self.host.clone()))
    }

    pub fn send_addr(&self) -> ChannelResult<SocketAddr> {
        Ok(SocketAddr::new(self.ip()?, self.send_port))
    }

    pub fn recv_addr(&self) -> ChannelResult<SocketAddr> {
        let port = match self.recv_port {
            Some(p) => p,
            None => self
                .send_port
                .checked_add(1)
                .ok_or_else(|| ChannelError::InvalidAddress(format!("{}:{}+1", self.host, self.send_port)))?,
        };
        Ok(SocketAddr::new(self.ip()?, port))
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        self.write_timeout_ms.map(Duration::from_millis)
    }
}

impl ReceiverConfig {
    pub fn accept_timeout(&self) -> Option<Duration> {
        self.accept_timeout_ms.map(Duration::from_millis)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ports_are_adjacent() {
        let config = Config::default();
        assert_eq!(config.connection.send_addr().unwrap().port(), 6000);
        assert_eq!(config.connection.recv_addr().unwrap().port(), 6001);
        assert!(config.connection.recv_addr().unwrap().ip().is_loopback());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [connection]
            send_port = 7000

            [session]
            on_decode_failure = "abort"
            "#,
        )
        .unwrap();
        assert_eq!(config.connection.recv_addr().unwrap().port(), 7001);
        assert_eq!(config.session.on_decode_failure, DecodeFailurePolicy::Abort);
        assert_eq!(config.receiver.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.decoder.robot_key, "robot_agent");
    }

    #[test]
    fn test_port_overflow_is_invalid() {
        let conn = ConnectionConfig {
            send_port: u16::MAX,
            ..ConnectionConfig::default()
        };
        assert!(matches!(conn.recv_addr(), Err(ChannelError::InvalidAddress(_))));
    }

    #[test]
    fn test_bad_host_is_invalid() {
        let conn = ConnectionConfig {
            host: "not a host".to_string(),
            ..ConnectionConfig::default()
        };
        assert!(conn.send_addr().is_err());
    }

    #[tokio::test]
    async fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("joystick.toml");
        tokio::fs::write(&path, "[receiver]\nchunk_size = 16\nread_timeout_ms = 250\n")
            .await
            .unwrap();
        let config = Config::from_file(&path).await.unwrap();
        assert_eq!(config.receiver.chunk_size, 16);
        assert_eq!(config.receiver.read_timeout(), Some(Duration::from_millis(250)));
    }
}
