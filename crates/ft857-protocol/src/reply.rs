//! Typed decoding of radio replies
//!
//! Replies are not self-describing. Each decoder takes the bytes read for
//! one specific command and checks only that the length matches.

use std::fmt;

use crate::bcd;
use crate::command::{EEPROM_REPLY_LEN, FREQ_MODE_REPLY_LEN};
use crate::error::ParseError;
use crate::params::Mode;

/// TX status byte value while the radio is receiving
pub const TX_IDLE: u8 = 0xFF;

/// RX status byte flags
pub mod rx_status {
    /// Squelch closed (no signal)
    pub const SQUELCH_CLOSED: u8 = 0x80;
    /// CTCSS/DCS unmatched
    pub const TONE_UNMATCHED: u8 = 0x40;
    /// Discriminator off centre
    pub const DISC_OFF_CENTER: u8 = 0x20;
    /// S-meter reading (bits 0-3)
    pub const S_METER_MASK: u8 = 0x0F;
}

/// TX status byte flags
pub mod tx_status {
    /// PTT active
    pub const PTT: u8 = 0x80;
    /// High SWR
    pub const HIGH_SWR: u8 = 0x40;
    /// Split off (inverted flag)
    pub const SPLIT_OFF: u8 = 0x20;
    /// Power output meter (bits 0-3)
    pub const METER_MASK: u8 = 0x0F;
}

fn expect_len(bytes: &[u8], expected: usize) -> Result<(), ParseError> {
    if bytes.len() == expected {
        Ok(())
    } else {
        Err(ParseError::ReplyLength {
            expected,
            actual: bytes.len(),
        })
    }
}

/// Reply to the frequency/mode read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrequencyMode {
    /// Frequency in Hz (10 Hz resolution)
    pub hz: u64,
    /// Decoded mode, `None` if the mode byte is not in the table
    pub mode: Option<Mode>,
    /// Mode byte as received
    pub mode_code: u8,
}

impl FrequencyMode {
    /// Decode the 5-byte reply: 4 BCD bytes of 10 Hz steps, then the mode byte
    pub fn decode(bytes: &[u8]) -> Result<Self, ParseError> {
        expect_len(bytes, FREQ_MODE_REPLY_LEN)?;
        let steps = bcd::from_bcd_be(&bytes[..4], 8);
        Ok(Self {
            hz: steps * 10,
            mode: Mode::from_code(bytes[4]),
            mode_code: bytes[4],
        })
    }

    /// Mode name, or "UNKNOWN" for an unrecognized mode byte
    pub fn mode_name(&self) -> &'static str {
        self.mode.map(Mode::name).unwrap_or("UNKNOWN")
    }
}

/// Whether the radio is transmitting, as reported by the TX status read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TxState {
    Receiving,
    Transmitting,
}

impl TxState {
    /// The radio reads 0xFF while idle; any other value means TX
    pub fn from_status(status: u8) -> Self {
        if status == TX_IDLE {
            TxState::Receiving
        } else {
            TxState::Transmitting
        }
    }

    pub fn is_transmitting(self) -> bool {
        self == TxState::Transmitting
    }
}

/// S-meter reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SMeter {
    /// S0 to S9
    S(u8),
    /// dB over S9 (10 to 60)
    OverS9(u8),
}

impl SMeter {
    /// Decode the low nibble of the RX status byte
    pub fn from_status(status: u8) -> Self {
        let level = status & rx_status::S_METER_MASK;
        if level < 10 {
            SMeter::S(level)
        } else {
            SMeter::OverS9((level - 9) * 10)
        }
    }
}

impl fmt::Display for SMeter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SMeter::S(n) => write!(f, "S{}", n),
            SMeter::OverS9(db) => write!(f, "S9+{}", db),
        }
    }
}

/// Full RX status byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RxStatus {
    pub squelch_closed: bool,
    pub tone_unmatched: bool,
    pub discriminator_off_center: bool,
    pub s_meter: SMeter,
}

impl RxStatus {
    pub fn from_status(status: u8) -> Self {
        Self {
            squelch_closed: status & rx_status::SQUELCH_CLOSED != 0,
            tone_unmatched: status & rx_status::TONE_UNMATCHED != 0,
            discriminator_off_center: status & rx_status::DISC_OFF_CENTER != 0,
            s_meter: SMeter::from_status(status),
        }
    }
}

/// Full TX status byte
///
/// The flag fields follow the vendor bit layout. [`TxState`] is the more
/// reliable transmit indicator since the radio reports 0xFF while idle,
/// which sets every flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxStatus {
    pub raw: u8,
    pub ptt: bool,
    pub high_swr: bool,
    pub split: bool,
    /// Power output meter, 0-15
    pub power_meter: u8,
}

impl TxStatus {
    pub fn from_status(status: u8) -> Self {
        Self {
            raw: status,
            ptt: status & tx_status::PTT != 0,
            high_swr: status & tx_status::HIGH_SWR != 0,
            split: status & tx_status::SPLIT_OFF == 0,
            power_meter: status & tx_status::METER_MASK,
        }
    }

    pub fn state(&self) -> TxState {
        TxState::from_status(self.raw)
    }
}

/// VFO selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Vfo {
    /// VFO A
    A,
    /// VFO B
    B,
}

impl Vfo {
    /// Decode the VFO status EEPROM reply; 0x80 in the first byte means A
    pub fn decode(bytes: &[u8]) -> Result<Self, ParseError> {
        expect_len(bytes, EEPROM_REPLY_LEN)?;
        Ok(if bytes[0] == 0x80 { Vfo::A } else { Vfo::B })
    }

    pub fn other(self) -> Self {
        match self {
            Vfo::A => Vfo::B,
            Vfo::B => Vfo::A,
        }
    }
}

impl fmt::Display for Vfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vfo::A => f.write_str("A"),
            Vfo::B => f.write_str("B"),
        }
    }
}

/// Meter shown while transmitting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MeterMode {
    Pwr,
    Alc,
    Swr,
    Mod,
}

impl MeterMode {
    /// Decode bits 0-1
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => MeterMode::Pwr,
            1 => MeterMode::Alc,
            2 => MeterMode::Swr,
            _ => MeterMode::Mod,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            MeterMode::Pwr => 0,
            MeterMode::Alc => 1,
            MeterMode::Swr => 2,
            MeterMode::Mod => 3,
        }
    }
}

impl fmt::Display for MeterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MeterMode::Pwr => "PWR",
            MeterMode::Alc => "ALC",
            MeterMode::Swr => "SWR",
            MeterMode::Mod => "MOD",
        };
        f.write_str(name)
    }
}

/// Meter mode, keyer and break-in, from EEPROM 0x006B
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CwMeterConfig {
    pub meter: MeterMode,
    pub keyer: bool,
    pub break_in: bool,
}

impl CwMeterConfig {
    const KEYER: u8 = 0x10;
    const BREAK_IN: u8 = 0x20;

    pub fn decode(bytes: &[u8]) -> Result<Self, ParseError> {
        expect_len(bytes, EEPROM_REPLY_LEN)?;
        let b = bytes[0];
        Ok(Self {
            meter: MeterMode::from_bits(b),
            keyer: b & Self::KEYER != 0,
            break_in: b & Self::BREAK_IN != 0,
        })
    }

    /// Byte as stored in EEPROM
    pub fn to_byte(&self) -> u8 {
        let mut b = self.meter.bits();
        if self.keyer {
            b |= Self::KEYER;
        }
        if self.break_in {
            b |= Self::BREAK_IN;
        }
        b
    }
}

/// AGC and DSP switches, from EEPROM 0x00A8
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgcDspConfig {
    /// AGC (bit 5)
    pub agc: bool,
    /// DSP bandpass filter (bits 2-3)
    pub bandpass_filter: bool,
    /// DSP noise reduction (bit 1)
    pub noise_reduction: bool,
    /// DSP notch filter (bit 0)
    pub notch_filter: bool,
}

impl AgcDspConfig {
    const AGC: u8 = 0x20;
    const DBF: u8 = 0x0C;
    const DNR: u8 = 0x02;
    const DNF: u8 = 0x01;

    pub fn decode(bytes: &[u8]) -> Result<Self, ParseError> {
        expect_len(bytes, EEPROM_REPLY_LEN)?;
        let b = bytes[0];
        Ok(Self {
            agc: b & Self::AGC != 0,
            bandpass_filter: b & Self::DBF != 0,
            noise_reduction: b & Self::DNR != 0,
            notch_filter: b & Self::DNF != 0,
        })
    }

    pub fn to_byte(&self) -> u8 {
        let mut b = 0;
        if self.agc {
            b |= Self::AGC;
        }
        if self.bandpass_filter {
            b |= Self::DBF;
        }
        if self.noise_reduction {
            b |= Self::DNR;
        }
        if self.notch_filter {
            b |= Self::DNF;
        }
        b
    }
}

/// Split flag, from EEPROM 0x008D bit 7
pub fn decode_split_status(bytes: &[u8]) -> Result<bool, ParseError> {
    expect_len(bytes, EEPROM_REPLY_LEN)?;
    Ok(bytes[0] & 0x80 != 0)
}
