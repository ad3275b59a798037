//! Request/reply transport
//!
//! [`CatTransport`] owns the link to the radio and runs exactly one
//! command/reply exchange at a time: every operation takes `&mut self`,
//! writes a 5-byte frame, then reads the fixed reply length for that
//! command against a single deadline.
//!
//! Generic over the I/O type to support both real serial ports and the
//! virtual radio. For the latter, use `DuplexStream` from
//! `tokio::io::duplex()`.
//!
//! Replies are not self-delimiting. After a [`CatError::Timeout`] or
//! [`CatError::ShortReply`] late bytes may still be on their way; call
//! [`CatTransport::drain_input`] before the next command to resynchronise.

use std::io::ErrorKind;
use std::time::Duration;

use ft857_protocol::{
    eeprom, reply, AgcDspConfig, Command, CwMeterConfig, Frame, FrequencyMode, Mode, RepeaterShift,
    RxStatus, SMeter, SquelchMode, ToneKind, TxState, TxStatus, Vfo,
};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{timeout_at, Instant};
use tokio_serial::{DataBits, FlowControl, Parity, SerialPortBuilderExt, SerialStream, StopBits};
use tracing::{debug, info, trace, warn};

use crate::config::LinkConfig;
use crate::error::CatError;

/// Read timeout handed to the OS serial driver; the reply deadline is
/// enforced separately
const PORT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Open a serial port with the fixed CAT frame format (8N2)
pub fn open_serial(port_name: &str, baud_rate: u32) -> Result<SerialStream, CatError> {
    let stream = tokio_serial::new(port_name, baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::Two)
        .flow_control(FlowControl::None)
        .timeout(PORT_READ_TIMEOUT)
        .open_native_async()?;
    Ok(stream)
}

/// CAT link to a single radio
pub struct CatTransport<T> {
    io: T,
    name: String,
    config: LinkConfig,
}

impl CatTransport<SerialStream> {
    /// Open the serial port and take ownership of it
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(port_name: &str, config: LinkConfig) -> Result<Self, CatError> {
        let stream = open_serial(port_name, config.baud_rate)?;
        info!("Opened {} at {} baud (8N2)", port_name, config.baud_rate);
        Ok(Self::new(port_name, stream, config))
    }
}

impl<T> CatTransport<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an already configured stream
    pub fn new(name: impl Into<String>, io: T, config: LinkConfig) -> Self {
        Self {
            io,
            name: name.into(),
            config,
        }
    }

    /// Link name used in log messages
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Release the underlying stream
    pub fn into_inner(self) -> T {
        self.io
    }

    // ------------------------------------------------------------------
    // Primitives
    // ------------------------------------------------------------------

    /// Write a command frame and flush it
    pub async fn send_frame(&mut self, frame: &Frame) -> Result<(), CatError> {
        debug!("{} <- {:02X?}", self.name, frame);
        self.io.write_all(frame).await?;
        self.io.flush().await?;
        Ok(())
    }

    /// Read a single byte within the reply timeout
    pub async fn read_byte(&mut self) -> Result<u8, CatError> {
        let bytes = self.read_exact(1).await?;
        Ok(bytes[0])
    }

    /// Read exactly `n` bytes within the reply timeout
    ///
    /// All `n` bytes share one deadline. Nothing received by then is a
    /// [`CatError::Timeout`], anything less than `n` a
    /// [`CatError::ShortReply`]; partial data is never returned.
    pub async fn read_exact(&mut self, n: usize) -> Result<Vec<u8>, CatError> {
        let deadline = Instant::now() + self.config.reply_timeout();
        let mut buf = vec![0u8; n];
        let mut filled = 0;

        while filled < n {
            match timeout_at(deadline, self.io.read(&mut buf[filled..])).await {
                Ok(Ok(0)) => return Err(CatError::Disconnected),
                Ok(Ok(k)) => {
                    trace!("{} -> {:02X?}", self.name, &buf[filled..filled + k]);
                    filled += k;
                }
                Ok(Err(e)) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    tokio::task::yield_now().await;
                }
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => return Err(self.deadline_error(n, filled)),
            }
        }

        Ok(buf)
    }

    fn deadline_error(&self, expected: usize, received: usize) -> CatError {
        if received == 0 {
            warn!(
                "{}: no reply within {}ms",
                self.name, self.config.reply_timeout_ms
            );
            CatError::Timeout {
                timeout_ms: self.config.reply_timeout_ms,
            }
        } else {
            warn!(
                "{}: short reply, {} of {} bytes",
                self.name, received, expected
            );
            CatError::ShortReply { expected, received }
        }
    }

    /// Discard any pending input bytes
    ///
    /// Reads until the link has been quiet for the drain window, bounded by
    /// the reply timeout. Returns the number of bytes discarded.
    pub async fn drain_input(&mut self) -> Result<usize, CatError> {
        let limit = Instant::now() + self.config.reply_timeout();
        let mut scratch = [0u8; 64];
        let mut discarded = 0;

        loop {
            let quiet_until = (Instant::now() + self.config.drain_window()).min(limit);
            match timeout_at(quiet_until, self.io.read(&mut scratch)).await {
                Ok(Ok(0)) | Err(_) => break,
                Ok(Ok(n)) => {
                    trace!("{}: discarding {:02X?}", self.name, &scratch[..n]);
                    discarded += n;
                }
                Ok(Err(e)) if e.kind() == ErrorKind::WouldBlock => break,
                Ok(Err(e)) => return Err(e.into()),
            }
            if Instant::now() >= limit {
                break;
            }
        }

        if discarded > 0 {
            debug!("{}: drained {} stray bytes", self.name, discarded);
        }
        Ok(discarded)
    }

    /// Send a command and read its full reply
    pub async fn execute(&mut self, command: Command) -> Result<Vec<u8>, CatError> {
        self.send_frame(&command.encode()).await?;
        let reply = self.read_exact(command.reply_len()).await?;
        debug!("{} -> {:02X?} ({:?})", self.name, reply, command);
        Ok(reply)
    }

    /// Send a set command; the one byte acknowledgement is discarded
    async fn acknowledged(&mut self, command: Command) -> Result<(), CatError> {
        self.execute(command).await.map(|_| ())
    }

    async fn status_byte(&mut self, command: Command) -> Result<u8, CatError> {
        let reply = self.execute(command).await?;
        Ok(reply[0])
    }

    // ------------------------------------------------------------------
    // Set commands
    // ------------------------------------------------------------------

    /// Lock or unlock the front panel
    pub async fn lock(&mut self, on: bool) -> Result<(), CatError> {
        self.acknowledged(Command::Lock { on }).await
    }

    /// Key or unkey the transmitter
    pub async fn ptt(&mut self, on: bool) -> Result<(), CatError> {
        self.acknowledged(Command::Ptt { on }).await
    }

    /// Tune the current VFO; resolution is 10 Hz
    pub async fn set_frequency(&mut self, hz: u64) -> Result<(), CatError> {
        self.acknowledged(Command::SetFrequency { hz }).await
    }

    pub async fn set_mode(&mut self, mode: Mode) -> Result<(), CatError> {
        self.acknowledged(Command::SetMode { mode }).await
    }

    /// Turn the clarifier on or off
    pub async fn clarifier(&mut self, on: bool) -> Result<(), CatError> {
        self.acknowledged(Command::Clarifier { on }).await
    }

    /// Set the clarifier offset in Hz (10 Hz resolution, sign selects direction)
    pub async fn set_clarifier_offset(&mut self, hz: i32) -> Result<(), CatError> {
        self.acknowledged(Command::ClarifierOffset { hz }).await
    }

    /// Swap VFO A and B
    pub async fn switch_vfo(&mut self) -> Result<(), CatError> {
        self.acknowledged(Command::ToggleVfo).await
    }

    pub async fn split(&mut self, on: bool) -> Result<(), CatError> {
        self.acknowledged(Command::Split { on }).await
    }

    pub async fn set_repeater_shift(&mut self, shift: RepeaterShift) -> Result<(), CatError> {
        self.acknowledged(Command::RepeaterShift { shift }).await
    }

    /// Set the repeater offset in kHz
    pub async fn set_repeater_offset(&mut self, khz: u32) -> Result<(), CatError> {
        self.acknowledged(Command::RepeaterOffset { khz }).await
    }

    pub async fn set_squelch_mode(&mut self, mode: SquelchMode) -> Result<(), CatError> {
        self.acknowledged(Command::SquelchMode { mode }).await
    }

    /// Set the same CTCSS tone (tenths of Hz) or DCS code for TX and RX
    pub async fn set_squelch_tone(&mut self, kind: ToneKind, tone: u16) -> Result<(), CatError> {
        self.set_squelch_tone_pair(kind, tone, tone).await
    }

    /// Set distinct TX and RX CTCSS tones or DCS codes
    pub async fn set_squelch_tone_pair(
        &mut self,
        kind: ToneKind,
        tx: u16,
        rx: u16,
    ) -> Result<(), CatError> {
        self.acknowledged(Command::SquelchTone { kind, tx, rx }).await
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Read the current frequency and mode
    pub async fn get_frequency_and_mode(&mut self) -> Result<FrequencyMode, CatError> {
        let reply = self.execute(Command::ReadFrequencyMode).await?;
        Ok(FrequencyMode::decode(&reply)?)
    }

    /// Read the current frequency in Hz
    pub async fn get_frequency(&mut self) -> Result<u64, CatError> {
        Ok(self.get_frequency_and_mode().await?.hz)
    }

    /// Read the current mode; `None` if the radio reports an unknown mode byte
    pub async fn get_mode(&mut self) -> Result<Option<Mode>, CatError> {
        Ok(self.get_frequency_and_mode().await?.mode)
    }

    /// Check whether the radio is transmitting
    pub async fn check_tx(&mut self) -> Result<TxState, CatError> {
        let status = self.status_byte(Command::ReadTxStatus).await?;
        Ok(TxState::from_status(status))
    }

    /// Read and decode the whole TX status byte
    pub async fn read_tx_status(&mut self) -> Result<TxStatus, CatError> {
        let status = self.status_byte(Command::ReadTxStatus).await?;
        Ok(TxStatus::from_status(status))
    }

    pub async fn get_s_meter(&mut self) -> Result<SMeter, CatError> {
        let status = self.status_byte(Command::ReadRxStatus).await?;
        Ok(SMeter::from_status(status))
    }

    /// Read and decode the whole RX status byte
    pub async fn read_rx_status(&mut self) -> Result<RxStatus, CatError> {
        let status = self.status_byte(Command::ReadRxStatus).await?;
        Ok(RxStatus::from_status(status))
    }

    /// Read two bytes of EEPROM starting at `address`
    pub async fn read_eeprom(&mut self, address: u16) -> Result<[u8; 2], CatError> {
        let reply = self.execute(Command::ReadEeprom { address }).await?;
        Ok([reply[0], reply[1]])
    }

    pub async fn get_vfo(&mut self) -> Result<Vfo, CatError> {
        let reply = self.read_eeprom(eeprom::VFO_STATUS).await?;
        Ok(Vfo::decode(&reply)?)
    }

    /// Meter mode, keyer and break-in settings
    pub async fn get_cw_meter_config(&mut self) -> Result<CwMeterConfig, CatError> {
        let reply = self.read_eeprom(eeprom::CW_METER_CONFIG).await?;
        Ok(CwMeterConfig::decode(&reply)?)
    }

    /// AGC and DSP filter settings
    pub async fn get_agc_dsp_config(&mut self) -> Result<AgcDspConfig, CatError> {
        let reply = self.read_eeprom(eeprom::AGC_DSP_CONFIG).await?;
        Ok(AgcDspConfig::decode(&reply)?)
    }

    /// Whether split operation is enabled
    pub async fn get_split_status(&mut self) -> Result<bool, CatError> {
        let bytes = self.read_eeprom(eeprom::SPLIT_STATUS).await?;
        Ok(reply::decode_split_status(&bytes)?)
    }
}
