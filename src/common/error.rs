use std::net::SocketAddr;

use thiserror::Error;

use crate::domains::session::SessionState;

/// Failures on either TCP channel.
///
/// `Bind`, `Listen` and `HandshakeAccept` can only occur while the channels
/// are being established and are fatal for the process.
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("Unable to bind receive socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to listen on {addr}: {source}")]
    Listen {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Simulator never completed the handshake connection on {addr}: {source}")]
    HandshakeAccept {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to connect to simulator at {addr} (is a simulator instance running?): {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to send message to simulator: {0}")]
    Send(#[source] std::io::Error),

    #[error("Partial send: wrote {written} of {expected} bytes")]
    PartialSend { written: usize, expected: usize },

    #[error("Unable to accept connection: {0}")]
    Accept(#[source] std::io::Error),

    #[error("Connection failed after {received} bytes; message is truncated: {source}")]
    Receive {
        received: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Frame exceeds maximum size: {size} > {max}")]
    FrameTooLarge { size: usize, max: usize },

    #[error("Timed out while {operation}")]
    Timeout { operation: &'static str },

    #[error("Invalid address {0}")]
    InvalidAddress(String),

    #[error("Channel already closed")]
    Closed,
}

impl ChannelError {
    /// Whether this error happened while establishing the channels.
    pub fn is_setup(&self) -> bool {
        matches!(
            self,
            ChannelError::Bind { .. }
                | ChannelError::Listen { .. }
                | ChannelError::HandshakeAccept { .. }
                | ChannelError::InvalidAddress(_)
        )
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum CatalogError {
    #[error("Catalog is not valid UTF-8: {0}")]
    NotUtf8(String),

    #[error("Catalog line {line} is empty")]
    EmptyTitle { line: usize },

    #[error("Catalog lists episode '{title}' more than once")]
    DuplicateTitle { title: String },
}

/// Outbound commands that cannot be built.
#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("Velocity batch has {v_len} linear but {w_len} angular commands")]
    MismatchedBatch { v_len: usize, w_len: usize },
}

/// Schema failures while turning a metadata document into an episode.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Metadata is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing field '{path}'")]
    MissingField { path: String },

    #[error("Field '{path}' has the wrong type, expected {expected}")]
    WrongType { path: String, expected: &'static str },

    #[error("Field '{path}' has {actual} elements, expected {expected}")]
    WrongLength {
        path: String,
        expected: usize,
        actual: usize,
    },

    #[error("Grid '{path}' is not rectangular: row {row} has {actual} cells, expected {expected}")]
    RaggedGrid {
        path: String,
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Grid '{path}' has non-binary cell {value} at ({row}, {col})")]
    InvalidCell {
        path: String,
        row: usize,
        col: usize,
        value: i64,
    },

    #[error("No robot named '{key}' in 'robots'")]
    MissingRobot { key: String },

    #[error("Expected exactly one robot, found {count}")]
    MultipleRobots { count: usize },

    #[error("Pedestrian '{name}' appears more than once")]
    DuplicateAgent { name: String },

    #[error("Failed to decode agent '{name}': {reason}")]
    AgentDecode { name: String, reason: String },

    #[error("Grid scale must be positive, got {0}")]
    InvalidScale(f64),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Invalid session transition from {from:?} to {to:?}")]
    InvalidTransition { from: SessionState, to: SessionState },
}

impl SessionError {
    /// Protocol and schema failures, as opposed to I/O failures.
    pub fn is_protocol(&self) -> bool {
        matches!(self, SessionError::Catalog(_) | SessionError::Decode(_))
    }
}

pub type ChannelResult<T> = Result<T, ChannelError>;
pub type DecodeResult<T> = Result<T, DecodeError>;
pub type SessionResult<T> = Result<T, SessionError>;
