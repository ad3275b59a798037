//! Link configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Factory CAT baud rate of the FT-857D
pub const DEFAULT_BAUD_RATE: u32 = 4800;
/// Upper bound on the wait for a reply
pub const DEFAULT_REPLY_TIMEOUT_MS: u64 = 2000;
/// Quiet period that ends an input drain
pub const DEFAULT_DRAIN_WINDOW_MS: u64 = 20;

/// Baud rates the radio can be set to
pub const SUPPORTED_BAUD_RATES: [u32; 3] = [4800, 9600, 38400];

/// Serial link settings
///
/// The frame format is fixed at 8 data bits, no parity, 2 stop bits and
/// is not configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Baud rate
    pub baud_rate: u32,
    /// Reply timeout in milliseconds
    pub reply_timeout_ms: u64,
    /// Drain quiet period in milliseconds
    pub drain_window_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            reply_timeout_ms: DEFAULT_REPLY_TIMEOUT_MS,
            drain_window_ms: DEFAULT_DRAIN_WINDOW_MS,
        }
    }
}

impl LinkConfig {
    /// Config with the given baud rate and default timeouts
    pub fn with_baud_rate(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            ..Default::default()
        }
    }

    pub fn reply_timeout(&self) -> Duration {
        Duration::from_millis(self.reply_timeout_ms)
    }

    pub fn drain_window(&self) -> Duration {
        Duration::from_millis(self.drain_window_ms)
    }
}
