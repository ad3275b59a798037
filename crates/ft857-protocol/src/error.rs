//! Error types for FT-857D CAT encoding and decoding

use thiserror::Error;

/// Errors that can occur while building frames or decoding replies
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A named parameter outside its closed set (mode, shift, squelch, tone kind)
    #[error("unrecognized {kind}: {value:?}")]
    UnrecognizedParameter { kind: &'static str, value: String },

    /// A reply decoder was handed the wrong number of bytes
    #[error("reply length mismatch: expected {expected} bytes, got {actual}")]
    ReplyLength { expected: usize, actual: usize },

    /// Opcode byte not in the command table
    #[error("unknown opcode: 0x{0:02X}")]
    UnknownOpcode(u8),
}

impl ParseError {
    pub(crate) fn unrecognized(kind: &'static str, value: &str) -> Self {
        Self::UnrecognizedParameter {
            kind,
            value: value.to_string(),
        }
    }
}
