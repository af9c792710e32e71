//! Client error types

use thiserror::Error;

/// Notification channel error
#[derive(Debug, Error)]
pub enum ChannelError {
    /// WebSocket transport failed
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Frame could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Server rejected the handshake or the registration
    #[error("Rejected by server: {0}")]
    Rejected(String),

    /// Reconnect budget used up
    #[error("Gave up after {0} reconnect attempts")]
    ReconnectExhausted(u32),
}

/// Notification store error
#[derive(Debug, Error)]
pub enum StoreError {
    /// Durable storage could not be read or written
    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted payload could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Position does not address a stored notification
    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

pub type ChannelResult<T> = Result<T, ChannelError>;
pub type StoreResult<T> = Result<T, StoreError>;
