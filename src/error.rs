//! Error types for fcgi-client.

use thiserror::Error;

/// Main error type for all FastCGI client operations.
#[derive(Debug, Error)]
pub enum FcgiError {
    /// I/O error during socket operations (socket creation, connect, send, recv).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Address string could not be parsed.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Unix socket path does not fit the platform `sun_path` limit.
    #[error("Socket path is {len} bytes, limit is {max}")]
    PathTooLong { len: usize, max: usize },

    /// Operation attempted on a transport with no open socket.
    #[error("Not connected")]
    NotConnected,

    /// Peer closed the connection (zero-byte read).
    #[error("Connection closed")]
    ConnectionClosed,

    /// A single read returned fewer bytes than a complete structure needs.
    #[error("Short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    /// Record type byte outside the defined range.
    #[error("Unknown record type: {0}")]
    UnknownRecordType(u8),

    /// Role value outside the defined range.
    #[error("Unknown role: {0}")]
    UnknownRole(u16),

    /// Configuration could not be deserialized.
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type alias using FcgiError.
pub type Result<T> = std::result::Result<T, FcgiError>;
