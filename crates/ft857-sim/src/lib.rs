//! FT-857D simulation library
//!
//! This crate provides a virtual FT-857D for exercising CAT code without
//! the physical radio:
//!
//! - **VirtualRadio**: tracks radio state and answers command frames with
//!   protocol-accurate replies, with fault injection for silent radios and
//!   truncated replies
//! - **run_virtual_radio_task**: serves a `VirtualRadio` over any async
//!   byte stream
//!
//! # Example
//!
//! ```rust
//! use ft857_sim::VirtualRadio;
//! use ft857_protocol::{Command, Mode};
//!
//! let mut radio = VirtualRadio::new("sim");
//! let ack = radio.handle_frame(&Command::SetMode { mode: Mode::Cw }.encode());
//! assert_eq!(ack, vec![0x00]);
//! assert_eq!(radio.mode(), Mode::Cw);
//! ```

pub mod radio;
pub mod task;

pub use radio::{RadioState, VfoState, VirtualRadio, VirtualRadioConfig, ACK};
pub use task::{run_virtual_radio_task, VirtualRadioCommand};
