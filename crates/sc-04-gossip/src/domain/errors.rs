use thiserror::Error;

use super::ConnectionId;

#[derive(Debug, Error)]
pub enum GossipError {
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    #[error("Payload encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Invalid message name: {0:?}")]
    InvalidName(String),

    #[error("Unknown connection: {0}")]
    UnknownConnection(ConnectionId),

    #[error("Connection {0} is closed")]
    ConnectionClosed(ConnectionId),

    #[error("Transport is shut down")]
    ShutDown,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GossipResult<T> = Result<T, GossipError>;
