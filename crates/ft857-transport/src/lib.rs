//! FT-857D CAT transport
//!
//! This crate drives the request/reply exchange with a Yaesu FT-857D over
//! a serial link: one five-byte command out, a fixed-length reply back,
//! bounded by a reply timeout. It also enumerates serial ports and probes
//! them for a radio.
//!
//! # Example
//!
//! ```rust,no_run
//! use ft857_transport::{CatTransport, LinkConfig};
//!
//! # async fn run() -> Result<(), ft857_transport::CatError> {
//! let mut radio = CatTransport::open("/dev/ttyUSB0", LinkConfig::default())?;
//! radio.set_frequency(14_070_000).await?;
//! let status = radio.get_frequency_and_mode().await?;
//! println!("{} Hz {}", status.hz, status.mode_name());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod probe;
pub mod scanner;
pub mod transport;

pub use config::{LinkConfig, DEFAULT_BAUD_RATE, SUPPORTED_BAUD_RATES};
pub use error::CatError;
pub use probe::{identify, probe_port, ProbeConfig, ProbeResult};
pub use scanner::{PortScanner, SerialPortInfo};
pub use transport::{open_serial, CatTransport};
