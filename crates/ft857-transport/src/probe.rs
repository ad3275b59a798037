//! Radio probing
//!
//! The binary CAT protocol has no identification command. A radio is
//! assumed present when the frequency/mode read returns five bytes whose
//! mode byte is in the mode table.

use std::time::Duration;

use ft857_protocol::{FrequencyMode, Mode};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, trace, warn};

use crate::config::LinkConfig;
use crate::transport::CatTransport;

/// Result of probing a serial port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    /// Baud rate the radio answered at
    pub baud_rate: u32,
    /// Frequency reported during the probe
    pub frequency_hz: u64,
    /// Mode reported during the probe
    pub mode: Mode,
}

/// Configuration for probing
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Reply timeout for each probe attempt
    pub timeout: Duration,
    /// Delay after opening the port before the first write
    pub settle_delay: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(500),
            settle_delay: Duration::from_millis(50),
        }
    }
}

/// Check an open link for a radio
///
/// Drains stray input, then issues one frequency/mode read.
pub async fn identify<T>(transport: &mut CatTransport<T>) -> Option<FrequencyMode>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    if let Err(e) = transport.drain_input().await {
        warn!("Failed to drain {}: {}", transport.name(), e);
        return None;
    }

    match transport.get_frequency_and_mode().await {
        Ok(status) if status.mode.is_some() => Some(status),
        Ok(status) => {
            trace!(
                "{}: mode byte 0x{:02X} not recognized",
                transport.name(),
                status.mode_code
            );
            None
        }
        Err(e) => {
            trace!("{}: probe failed: {}", transport.name(), e);
            None
        }
    }
}

/// Probe a port at each of the given baud rates
///
/// Returns the first baud rate at which a radio answers.
pub async fn probe_port(
    port_name: &str,
    baud_rates: &[u32],
    config: &ProbeConfig,
) -> Option<ProbeResult> {
    for &baud_rate in baud_rates {
        debug!("Probing {} at {} baud", port_name, baud_rate);

        let link_config = LinkConfig {
            baud_rate,
            reply_timeout_ms: config.timeout.as_millis() as u64,
            ..Default::default()
        };
        let mut transport = match CatTransport::open(port_name, link_config) {
            Ok(t) => t,
            Err(e) => {
                warn!("Failed to open {}: {}", port_name, e);
                return None;
            }
        };

        // Give the port a moment to settle
        tokio::time::sleep(config.settle_delay).await;

        if let Some(status) = identify(&mut transport).await {
            let mode = status.mode?;
            info!(
                "Found FT-857D on {} at {} baud ({} Hz {})",
                port_name, baud_rate, status.hz, mode
            );
            return Some(ProbeResult {
                baud_rate,
                frequency_hz: status.hz,
                mode,
            });
        }
    }

    debug!("No radio detected on {}", port_name);
    None
}
