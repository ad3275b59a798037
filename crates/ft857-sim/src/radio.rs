//! Virtual FT-857D
//!
//! Applies command frames to an in-memory radio state and produces the
//! replies the real radio would send.

use ft857_protocol::reply::{rx_status, tx_status, TX_IDLE};
use ft857_protocol::{
    bcd, eeprom, hex, AgcDspConfig, Command, CwMeterConfig, Frame, MeterMode, Mode,
    RepeaterShift, SquelchMode, ToneKind, Vfo,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Acknowledgement byte sent for every set command
pub const ACK: u8 = 0x00;

/// Frequency and mode held by one VFO
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VfoState {
    pub frequency_hz: u64,
    pub mode: Mode,
}

/// Snapshot of everything the virtual radio tracks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioState {
    pub vfo: Vfo,
    pub vfo_a: VfoState,
    pub vfo_b: VfoState,
    pub split: bool,
    pub locked: bool,
    pub ptt: bool,
    pub clarifier: bool,
    pub clarifier_offset_hz: i32,
    pub repeater_shift: RepeaterShift,
    pub repeater_offset_khz: u32,
    pub squelch_mode: SquelchMode,
    /// Last tone written, with its TX and RX values
    pub ctcss_tones: (u16, u16),
    pub dcs_codes: (u16, u16),
    /// S-meter nibble, 0-15
    pub signal: u8,
    /// PO meter nibble while transmitting, 0-15
    pub power_meter: u8,
    pub cw_meter: CwMeterConfig,
    pub agc_dsp: AgcDspConfig,
}

impl RadioState {
    /// The VFO currently in use
    pub fn active(&self) -> &VfoState {
        match self.vfo {
            Vfo::A => &self.vfo_a,
            Vfo::B => &self.vfo_b,
        }
    }

    fn active_mut(&mut self) -> &mut VfoState {
        match self.vfo {
            Vfo::A => &mut self.vfo_a,
            Vfo::B => &mut self.vfo_b,
        }
    }
}

/// Configuration for creating a virtual radio
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualRadioConfig {
    /// Display name/identifier
    pub id: String,
    /// Initial VFO A frequency in Hz
    pub initial_frequency_hz: u64,
    /// Initial VFO A mode
    pub initial_mode: Mode,
    /// Initial S-meter nibble
    pub signal: u8,
}

impl Default for VirtualRadioConfig {
    fn default() -> Self {
        Self {
            id: "Virtual FT-857D".to_string(),
            initial_frequency_hz: 14_070_000, // 20m
            initial_mode: Mode::Usb,
            signal: 0,
        }
    }
}

/// A simulated FT-857D answering binary CAT frames
#[derive(Debug)]
pub struct VirtualRadio {
    id: String,
    state: RadioState,
    silent: bool,
    reply_limit: Option<usize>,
}

impl VirtualRadio {
    /// Create a new virtual radio with default settings
    pub fn new(id: impl Into<String>) -> Self {
        Self::from_config(VirtualRadioConfig {
            id: id.into(),
            ..Default::default()
        })
    }

    /// Create a virtual radio from configuration
    pub fn from_config(config: VirtualRadioConfig) -> Self {
        let vfo = VfoState {
            frequency_hz: config.initial_frequency_hz,
            mode: config.initial_mode,
        };
        Self {
            id: config.id,
            state: RadioState {
                vfo: Vfo::A,
                vfo_a: vfo,
                vfo_b: vfo,
                split: false,
                locked: false,
                ptt: false,
                clarifier: false,
                clarifier_offset_hz: 0,
                repeater_shift: RepeaterShift::Simplex,
                repeater_offset_khz: 600,
                squelch_mode: SquelchMode::Off,
                ctcss_tones: (885, 885),
                dcs_codes: (23, 23),
                signal: config.signal & rx_status::S_METER_MASK,
                power_meter: 0,
                cw_meter: CwMeterConfig {
                    meter: MeterMode::Pwr,
                    keyer: false,
                    break_in: false,
                },
                agc_dsp: AgcDspConfig {
                    agc: true,
                    bandpass_filter: false,
                    noise_reduction: false,
                    notch_filter: false,
                },
            },
            silent: false,
            reply_limit: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current state snapshot
    pub fn state(&self) -> &RadioState {
        &self.state
    }

    /// Mutable access for tests and front panel style changes
    pub fn state_mut(&mut self) -> &mut RadioState {
        &mut self.state
    }

    pub fn frequency_hz(&self) -> u64 {
        self.state.active().frequency_hz
    }

    pub fn mode(&self) -> Mode {
        self.state.active().mode
    }

    /// Set the S-meter reading (masked to 0-15)
    pub fn set_signal(&mut self, level: u8) {
        self.state.signal = level & rx_status::S_METER_MASK;
    }

    /// Set the PO meter reading (masked to 0-15)
    pub fn set_power_meter(&mut self, level: u8) {
        self.state.power_meter = level & tx_status::METER_MASK;
    }

    /// Stop replying to anything
    pub fn set_silent(&mut self, silent: bool) {
        self.silent = silent;
    }

    /// Truncate every reply to at most `limit` bytes
    pub fn set_reply_limit(&mut self, limit: Option<usize>) {
        self.reply_limit = limit;
    }

    /// Apply one frame and return the bytes to send back
    ///
    /// Frames with an unknown opcode or parameter get no reply.
    pub fn handle_frame(&mut self, frame: &Frame) -> Vec<u8> {
        let command = match Command::parse(frame) {
            Ok(cmd) => cmd,
            Err(e) => {
                debug!("{}: ignoring frame [{}]: {}", self.id, hex(frame), e);
                return Vec::new();
            }
        };

        let mut reply = self.handle_command(command);
        trace!("{}: {:?} -> {:02X?}", self.id, command, reply);

        if self.silent {
            return Vec::new();
        }
        if let Some(limit) = self.reply_limit {
            reply.truncate(limit);
        }
        reply
    }

    /// Apply a parsed command and build the full reply
    pub fn handle_command(&mut self, command: Command) -> Vec<u8> {
        match command {
            Command::ReadFrequencyMode => self.frequency_mode_reply(),
            Command::ReadRxStatus => vec![self.rx_status_byte()],
            Command::ReadTxStatus => vec![self.tx_status_byte()],
            Command::ReadEeprom { address } => {
                vec![self.eeprom_byte(address), self.eeprom_byte(address.wrapping_add(1))]
            }
            Command::Lock { on: false } => {
                self.state.locked = false;
                vec![ACK]
            }
            _ if self.state.locked => {
                debug!("{}: locked, ignoring {:?}", self.id, command);
                vec![ACK]
            }
            cmd => {
                self.apply(cmd);
                vec![ACK]
            }
        }
    }

    fn apply(&mut self, command: Command) {
        let state = &mut self.state;
        match command {
            Command::Lock { on } => state.locked = on,
            Command::Ptt { on } => state.ptt = on,
            Command::SetFrequency { hz } => state.active_mut().frequency_hz = hz,
            Command::SetMode { mode } => state.active_mut().mode = mode,
            Command::Clarifier { on } => state.clarifier = on,
            Command::ClarifierOffset { hz } => state.clarifier_offset_hz = hz,
            Command::ToggleVfo => state.vfo = state.vfo.other(),
            Command::Split { on } => state.split = on,
            Command::RepeaterShift { shift } => state.repeater_shift = shift,
            Command::RepeaterOffset { khz } => state.repeater_offset_khz = khz,
            Command::SquelchMode { mode } => state.squelch_mode = mode,
            Command::SquelchTone { kind, tx, rx } => match kind {
                ToneKind::Ctcss => state.ctcss_tones = (tx, rx),
                ToneKind::Dcs => state.dcs_codes = (tx, rx),
            },
            Command::ReadFrequencyMode
            | Command::ReadRxStatus
            | Command::ReadTxStatus
            | Command::ReadEeprom { .. } => {}
        }
    }

    fn frequency_mode_reply(&self) -> Vec<u8> {
        let active = self.state.active();
        let mut reply = vec![0u8; 5];
        bcd::to_bcd_be(&mut reply[..4], active.frequency_hz / 10, 8);
        reply[4] = active.mode.code();
        reply
    }

    fn rx_status_byte(&self) -> u8 {
        let mut b = self.state.signal & rx_status::S_METER_MASK;
        if self.state.signal == 0 {
            b |= rx_status::SQUELCH_CLOSED;
        }
        b
    }

    fn tx_status_byte(&self) -> u8 {
        if !self.state.ptt {
            return TX_IDLE;
        }
        let mut b = tx_status::PTT | (self.state.power_meter & tx_status::METER_MASK);
        if !self.state.split {
            b |= tx_status::SPLIT_OFF;
        }
        b
    }

    fn eeprom_byte(&self, address: u16) -> u8 {
        match address {
            eeprom::VFO_STATUS => match self.state.vfo {
                Vfo::A => 0x80,
                Vfo::B => 0x00,
            },
            eeprom::CW_METER_CONFIG => self.state.cw_meter.to_byte(),
            eeprom::AGC_DSP_CONFIG => self.state.agc_dsp.to_byte(),
            eeprom::SPLIT_STATUS => {
                if self.state.split {
                    0x80
                } else {
                    0x00
                }
            }
            _ => 0x00,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ft857_protocol::{FrequencyMode, RxStatus, SMeter, TxState, TxStatus};
    use proptest::prelude::*;

    fn ask(radio: &mut VirtualRadio, command: Command) -> Vec<u8> {
        radio.handle_frame(&command.encode())
    }

    #[test]
    fn test_set_commands_ack() {
        let mut radio = VirtualRadio::new("test");
        assert_eq!(ask(&mut radio, Command::SetMode { mode: Mode::Cw }), vec![ACK]);
        assert_eq!(radio.mode(), Mode::Cw);
        assert_eq!(ask(&mut radio, Command::Ptt { on: true }), vec![ACK]);
        assert!(radio.state().ptt);
    }

    #[test]
    fn test_frequency_mode_reply() {
        let mut radio = VirtualRadio::new("test");
        ask(&mut radio, Command::SetFrequency { hz: 7_074_000 });
        ask(&mut radio, Command::SetMode { mode: Mode::Dig });

        let reply = ask(&mut radio, Command::ReadFrequencyMode);
        assert_eq!(reply, vec![0x00, 0x70, 0x74, 0x00, 0x0A]);
        let status = FrequencyMode::decode(&reply).unwrap();
        assert_eq!(status.hz, 7_074_000);
        assert_eq!(status.mode, Some(Mode::Dig));
    }

    #[test]
    fn test_toggle_vfo_keeps_separate_frequencies() {
        let mut radio = VirtualRadio::new("test");
        ask(&mut radio, Command::ToggleVfo);
        ask(&mut radio, Command::SetFrequency { hz: 145_500_000 });
        assert_eq!(radio.state().vfo, Vfo::B);
        assert_eq!(radio.state().vfo_a.frequency_hz, 14_070_000);

        let reply = ask(&mut radio, Command::ReadEeprom { address: eeprom::VFO_STATUS });
        assert_eq!(Vfo::decode(&reply).unwrap(), Vfo::B);
    }

    #[test]
    fn test_lock_ignores_set_commands() {
        let mut radio = VirtualRadio::new("test");
        ask(&mut radio, Command::Lock { on: true });
        assert_eq!(ask(&mut radio, Command::SetFrequency { hz: 3_573_000 }), vec![ACK]);
        assert_eq!(radio.frequency_hz(), 14_070_000);

        ask(&mut radio, Command::Lock { on: false });
        ask(&mut radio, Command::SetFrequency { hz: 3_573_000 });
        assert_eq!(radio.frequency_hz(), 3_573_000);
    }

    #[test]
    fn test_tx_status() {
        let mut radio = VirtualRadio::new("test");
        let idle = ask(&mut radio, Command::ReadTxStatus);
        assert_eq!(idle, vec![0xFF]);
        assert_eq!(TxState::from_status(idle[0]), TxState::Receiving);

        ask(&mut radio, Command::Ptt { on: true });
        radio.set_power_meter(7);
        let status = TxStatus::from_status(ask(&mut radio, Command::ReadTxStatus)[0]);
        assert_eq!(status.state(), TxState::Transmitting);
        assert_eq!(status.power_meter, 7);
        assert!(!status.split);
    }

    #[test]
    fn test_rx_status() {
        let mut radio = VirtualRadio::new("test");
        let status = RxStatus::from_status(ask(&mut radio, Command::ReadRxStatus)[0]);
        assert!(status.squelch_closed);
        assert_eq!(status.s_meter, SMeter::S(0));

        radio.set_signal(12);
        let status = RxStatus::from_status(ask(&mut radio, Command::ReadRxStatus)[0]);
        assert!(!status.squelch_closed);
        assert_eq!(status.s_meter, SMeter::OverS9(30));
    }

    #[test]
    fn test_eeprom_reads() {
        let mut radio = VirtualRadio::new("test");
        radio.state_mut().agc_dsp.notch_filter = true;

        let reply = ask(&mut radio, Command::ReadEeprom { address: eeprom::AGC_DSP_CONFIG });
        assert_eq!(reply, vec![0x21, 0x00]);
        assert_eq!(ask(&mut radio, Command::ReadEeprom { address: 0x0100 }), vec![0x00, 0x00]);
    }

    #[test]
    fn test_squelch_tones_stored_separately() {
        let mut radio = VirtualRadio::new("test");
        ask(
            &mut radio,
            Command::SquelchTone {
                kind: ToneKind::Ctcss,
                tx: 885,
                rx: 1000,
            },
        );
        ask(
            &mut radio,
            Command::SquelchTone {
                kind: ToneKind::Dcs,
                tx: 23,
                rx: 754,
            },
        );
        assert_eq!(radio.state().ctcss_tones, (885, 1000));
        assert_eq!(radio.state().dcs_codes, (23, 754));
    }

    #[test]
    fn test_fault_injection() {
        let mut radio = VirtualRadio::new("test");
        radio.set_reply_limit(Some(3));
        assert_eq!(ask(&mut radio, Command::ReadFrequencyMode).len(), 3);

        radio.set_silent(true);
        assert!(ask(&mut radio, Command::SetMode { mode: Mode::Am }).is_empty());
        // Silent radios still apply the command
        assert_eq!(radio.mode(), Mode::Am);
    }

    #[test]
    fn test_unknown_frame_gets_no_reply() {
        let mut radio = VirtualRadio::new("test");
        assert!(radio.handle_frame(&[0x00, 0x00, 0x00, 0x00, 0x42]).is_empty());
        assert!(radio.handle_frame(&[0x55, 0x00, 0x00, 0x00, 0x07]).is_empty());
    }

    proptest! {
        #[test]
        fn prop_frequency_read_back(tens in 0u64..100_000_000) {
            let mut radio = VirtualRadio::new("prop");
            let hz = tens * 10;
            ask(&mut radio, Command::SetFrequency { hz });
            let status = FrequencyMode::decode(&ask(&mut radio, Command::ReadFrequencyMode)).unwrap();
            prop_assert_eq!(status.hz, hz);
        }
    }
}
