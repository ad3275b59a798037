//! Streaming frame codec
//!
//! Splits a byte stream travelling towards the radio into 5-byte command
//! frames. There are no delimiters, so the codec relies purely on byte
//! count; once a stray byte slips in, every following frame is misaligned
//! until the buffer is cleared.

use tracing::trace;

use crate::command::Command;
use crate::{Frame, FRAME_LEN};

/// Trait for codecs that parse incoming data streams
pub trait ProtocolCodec {
    /// The item type produced by this codec
    type Item;

    /// Push raw bytes into the codec's buffer
    fn push_bytes(&mut self, data: &[u8]);

    /// Try to extract the next complete item from the buffer
    fn next_item(&mut self) -> Option<Self::Item>;

    /// Clear the internal buffer
    fn clear(&mut self);
}

/// Splits bytes into command frames
#[derive(Debug, Default)]
pub struct FrameCodec {
    buffer: Vec<u8>,
}

impl FrameCodec {
    /// Create a new frame codec
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(16),
        }
    }

    /// Number of buffered bytes not yet forming a full frame
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Extract the next frame together with its parsed command
    ///
    /// The command is `None` for frames with an unknown opcode or parameter
    /// byte; the raw frame is still returned so the caller can log it.
    pub fn next_command(&mut self) -> Option<(Frame, Option<Command>)> {
        let frame = self.next_item()?;
        match Command::parse(&frame) {
            Ok(cmd) => Some((frame, Some(cmd))),
            Err(e) => {
                trace!("Unrecognized frame {:02X?}: {}", frame, e);
                Some((frame, None))
            }
        }
    }
}

impl ProtocolCodec for FrameCodec {
    type Item = Frame;

    fn push_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    fn next_item(&mut self) -> Option<Frame> {
        if self.buffer.len() < FRAME_LEN {
            return None;
        }

        let mut frame: Frame = [0; FRAME_LEN];
        frame.copy_from_slice(&self.buffer[..FRAME_LEN]);
        self.buffer.drain(..FRAME_LEN);
        Some(frame)
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }
}
