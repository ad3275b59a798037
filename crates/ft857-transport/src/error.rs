//! Error types for the CAT transport

use ft857_protocol::ParseError;
use thiserror::Error;

/// Errors that can occur during a command/reply exchange
#[derive(Debug, Error)]
pub enum CatError {
    /// No reply byte arrived before the deadline
    #[error("timeout: no reply within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Some, but not all, reply bytes arrived before the deadline
    #[error("short reply: expected {expected} bytes, received {received}")]
    ShortReply { expected: usize, received: usize },

    /// The stream reported end of file
    #[error("serial link closed")]
    Disconnected,

    /// Invalid parameter or undecodable reply
    #[error("protocol error: {0}")]
    Parse(#[from] ParseError),

    /// I/O error on the link
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial port error
    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),
}

impl CatError {
    /// Returns true for errors after which stray reply bytes may still arrive
    ///
    /// Callers retrying after one of these should drain the input first.
    pub fn may_desync(&self) -> bool {
        matches!(self, CatError::Timeout { .. } | CatError::ShortReply { .. })
    }
}
