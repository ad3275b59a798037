//! FT-857D CAT Protocol Library
//!
//! This crate provides frame encoding and reply decoding for the binary
//! CAT (Computer Aided Transceiver) protocol of the Yaesu FT-857D, which the
//! FT-817 and FT-897 share.
//!
//! # Architecture
//!
//! - [`bcd`]: big-endian packed BCD, the encoding of every numeric field
//! - [`params`]: closed enums for modes, repeater shift and squelch settings
//! - [`command`]: the opcode table and [`Command`], which encodes to a
//!   5-byte frame and knows how many reply bytes to expect
//! - [`reply`]: typed decoders for the 1, 2 and 5 byte replies
//! - [`codec`]: a streaming frame splitter for the radio side of the link
//!
//! Nothing here performs I/O.
//!
//! # Example
//!
//! ```rust
//! use ft857_protocol::{Command, FrequencyMode, Mode};
//!
//! let frame = Command::SetMode { mode: Mode::Usb }.encode();
//! assert_eq!(frame, [0x01, 0x00, 0x00, 0x00, 0x07]);
//!
//! let reply = [0x01, 0x40, 0x70, 0x00, 0x01];
//! let status = FrequencyMode::decode(&reply).unwrap();
//! assert_eq!(status.hz, 14_070_000);
//! assert_eq!(status.mode, Some(Mode::Usb));
//! ```

pub mod bcd;
pub mod codec;
pub mod command;
pub mod error;
pub mod params;
pub mod reply;

pub use codec::{FrameCodec, ProtocolCodec};
pub use command::{eeprom, Command, Opcode};
pub use error::ParseError;
pub use params::{Mode, RepeaterShift, SquelchMode, ToneKind};
pub use reply::{
    AgcDspConfig, CwMeterConfig, FrequencyMode, MeterMode, RxStatus, SMeter, TxState, TxStatus,
    Vfo,
};

/// Length of every command frame
pub const FRAME_LEN: usize = 5;

/// A command frame: `[P1, P2, P3, P4, CMD]`
pub type Frame = [u8; FRAME_LEN];

/// Format bytes as space separated hex, e.g. `01 40 70 00 01`
pub fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
