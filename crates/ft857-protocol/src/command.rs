//! FT-857D command table and frame encoding
//!
//! # Command Format
//! ```text
//! [P1] [P2] [P3] [P4] [CMD]
//! ```
//!
//! - Bytes 0-3: Parameters (meaning depends on command, zero when unused)
//! - Byte 4: Command opcode
//!
//! The radio answers every command with a fixed number of bytes that the
//! caller has to know in advance: 5 for the frequency/mode read, 2 for
//! EEPROM reads and 1 for everything else.

use crate::bcd;
use crate::error::ParseError;
use crate::params::{Mode, RepeaterShift, SquelchMode, ToneKind};
use crate::{Frame, FRAME_LEN};

/// FT-857D command opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Lock on
    LockOn = 0x00,
    /// Lock off
    LockOff = 0x80,
    /// PTT on (TX)
    PttOn = 0x08,
    /// PTT off (RX)
    PttOff = 0x88,
    /// Set frequency (P1-P4 = BCD, 10 Hz steps)
    SetFrequency = 0x01,
    /// Set mode (P1 = mode)
    SetMode = 0x07,
    /// Clarifier on
    ClarOn = 0x05,
    /// Clarifier off
    ClarOff = 0x85,
    /// Clarifier frequency (P1 = direction, P3-P4 = BCD)
    ClarFreq = 0xF5,
    /// Toggle VFO A/B
    ToggleVfo = 0x81,
    /// Split on
    SplitOn = 0x02,
    /// Split off
    SplitOff = 0x82,
    /// Repeater shift (P1 = direction)
    RepeaterShift = 0x09,
    /// Repeater offset frequency (P1-P4 = BCD, 10 Hz steps)
    RepeaterOffset = 0xF9,
    /// CTCSS/DCS mode (P1 = squelch mode)
    SquelchMode = 0x0A,
    /// CTCSS tones (P1-P2 = TX, P3-P4 = RX)
    CtcssTone = 0x0B,
    /// DCS codes (P1-P2 = TX, P3-P4 = RX)
    DcsCode = 0x0C,
    /// Read RX status
    ReadRxStatus = 0xE7,
    /// Read TX status
    ReadTxStatus = 0xF7,
    /// Read frequency and mode
    ReadFreqMode = 0x03,
    /// Read two bytes of EEPROM (P1-P2 = address)
    EepromRead = 0xBB,
}

impl TryFrom<u8> for Opcode {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Self::LockOn),
            0x80 => Ok(Self::LockOff),
            0x08 => Ok(Self::PttOn),
            0x88 => Ok(Self::PttOff),
            0x01 => Ok(Self::SetFrequency),
            0x07 => Ok(Self::SetMode),
            0x05 => Ok(Self::ClarOn),
            0x85 => Ok(Self::ClarOff),
            0xF5 => Ok(Self::ClarFreq),
            0x81 => Ok(Self::ToggleVfo),
            0x02 => Ok(Self::SplitOn),
            0x82 => Ok(Self::SplitOff),
            0x09 => Ok(Self::RepeaterShift),
            0xF9 => Ok(Self::RepeaterOffset),
            0x0A => Ok(Self::SquelchMode),
            0x0B => Ok(Self::CtcssTone),
            0x0C => Ok(Self::DcsCode),
            0xE7 => Ok(Self::ReadRxStatus),
            0xF7 => Ok(Self::ReadTxStatus),
            0x03 => Ok(Self::ReadFreqMode),
            0xBB => Ok(Self::EepromRead),
            _ => Err(ParseError::UnknownOpcode(value)),
        }
    }
}

/// EEPROM addresses read by the status queries
pub mod eeprom {
    /// VFO A/B selection
    pub const VFO_STATUS: u16 = 0x0068;
    /// Meter mode, keyer and break-in
    pub const CW_METER_CONFIG: u16 = 0x006B;
    /// AGC and DSP switches
    pub const AGC_DSP_CONFIG: u16 = 0x00A8;
    /// Split flag
    pub const SPLIT_STATUS: u16 = 0x008D;
}

/// Reply length for every command except the two reads below
pub const ACK_LEN: usize = 1;
/// Reply length of [`Command::ReadFrequencyMode`]
pub const FREQ_MODE_REPLY_LEN: usize = 5;
/// Reply length of [`Command::ReadEeprom`]
pub const EEPROM_REPLY_LEN: usize = 2;

/// Digits in a frequency field (4 bytes)
const FREQ_DIGITS: usize = 8;
/// Digits in a tone, code or clarifier field (2 bytes)
const SHORT_DIGITS: usize = 4;

/// P1 of the clarifier frequency command for a negative offset
const CLAR_MINUS: u8 = 0x01;

/// A single CAT command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Front panel lock
    Lock { on: bool },
    /// Transmit
    Ptt { on: bool },
    /// Tune the current VFO (10 Hz resolution)
    SetFrequency { hz: u64 },
    /// Select operating mode
    SetMode { mode: Mode },
    /// Clarifier on/off
    Clarifier { on: bool },
    /// Clarifier offset in Hz, signed (10 Hz resolution, up to ±9.99 kHz)
    ClarifierOffset { hz: i32 },
    /// Swap VFO A and B
    ToggleVfo,
    /// Split on/off
    Split { on: bool },
    /// Repeater shift direction
    RepeaterShift { shift: RepeaterShift },
    /// Repeater offset in kHz
    RepeaterOffset { khz: u32 },
    /// CTCSS/DCS squelch selection
    SquelchMode { mode: SquelchMode },
    /// CTCSS tones (tenths of Hz) or DCS codes for TX and RX
    SquelchTone { kind: ToneKind, tx: u16, rx: u16 },
    /// Read frequency and mode
    ReadFrequencyMode,
    /// Read RX status byte
    ReadRxStatus,
    /// Read TX status byte
    ReadTxStatus,
    /// Read two bytes of EEPROM
    ReadEeprom { address: u16 },
}

impl Command {
    /// Opcode byte of this command
    pub fn opcode(&self) -> Opcode {
        match self {
            Command::Lock { on: true } => Opcode::LockOn,
            Command::Lock { on: false } => Opcode::LockOff,
            Command::Ptt { on: true } => Opcode::PttOn,
            Command::Ptt { on: false } => Opcode::PttOff,
            Command::SetFrequency { .. } => Opcode::SetFrequency,
            Command::SetMode { .. } => Opcode::SetMode,
            Command::Clarifier { on: true } => Opcode::ClarOn,
            Command::Clarifier { on: false } => Opcode::ClarOff,
            Command::ClarifierOffset { .. } => Opcode::ClarFreq,
            Command::ToggleVfo => Opcode::ToggleVfo,
            Command::Split { on: true } => Opcode::SplitOn,
            Command::Split { on: false } => Opcode::SplitOff,
            Command::RepeaterShift { .. } => Opcode::RepeaterShift,
            Command::RepeaterOffset { .. } => Opcode::RepeaterOffset,
            Command::SquelchMode { .. } => Opcode::SquelchMode,
            Command::SquelchTone {
                kind: ToneKind::Ctcss,
                ..
            } => Opcode::CtcssTone,
            Command::SquelchTone {
                kind: ToneKind::Dcs,
                ..
            } => Opcode::DcsCode,
            Command::ReadFrequencyMode => Opcode::ReadFreqMode,
            Command::ReadRxStatus => Opcode::ReadRxStatus,
            Command::ReadTxStatus => Opcode::ReadTxStatus,
            Command::ReadEeprom { .. } => Opcode::EepromRead,
        }
    }

    /// Number of bytes the radio sends back for this command
    pub fn reply_len(&self) -> usize {
        match self {
            Command::ReadFrequencyMode => FREQ_MODE_REPLY_LEN,
            Command::ReadEeprom { .. } => EEPROM_REPLY_LEN,
            _ => ACK_LEN,
        }
    }

    /// Returns true if the reply carries data rather than an acknowledgement
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Command::ReadFrequencyMode
                | Command::ReadRxStatus
                | Command::ReadTxStatus
                | Command::ReadEeprom { .. }
        )
    }

    /// Encode this command to its 5-byte wire frame
    pub fn encode(&self) -> Frame {
        let mut frame: Frame = [0; FRAME_LEN];
        frame[4] = self.opcode() as u8;

        match *self {
            Command::SetFrequency { hz } => {
                bcd::to_bcd_be(&mut frame[..4], hz / 10, FREQ_DIGITS);
            }
            Command::SetMode { mode } => frame[0] = mode.code(),
            Command::ClarifierOffset { hz } => {
                if hz < 0 {
                    frame[0] = CLAR_MINUS;
                }
                let steps = u64::from(hz.unsigned_abs() / 10);
                bcd::to_bcd_be(&mut frame[2..4], steps, SHORT_DIGITS);
            }
            Command::RepeaterShift { shift } => frame[0] = shift.code(),
            Command::RepeaterOffset { khz } => {
                bcd::to_bcd_be(&mut frame[..4], u64::from(khz) * 100, FREQ_DIGITS);
            }
            Command::SquelchMode { mode } => frame[0] = mode.code(),
            Command::SquelchTone { tx, rx, .. } => {
                bcd::to_bcd_be(&mut frame[..2], u64::from(tx), SHORT_DIGITS);
                bcd::to_bcd_be(&mut frame[2..4], u64::from(rx), SHORT_DIGITS);
            }
            Command::ReadEeprom { address } => {
                let [high, low] = address.to_be_bytes();
                frame[0] = high;
                frame[1] = low;
            }
            Command::Lock { .. }
            | Command::Ptt { .. }
            | Command::Clarifier { .. }
            | Command::ToggleVfo
            | Command::Split { .. }
            | Command::ReadFrequencyMode
            | Command::ReadRxStatus
            | Command::ReadTxStatus => {}
        }

        frame
    }

    /// Parse a 5-byte frame as sent to the radio
    ///
    /// Parameter bytes that do not map to a known value (an unknown mode or
    /// squelch byte) make the whole frame unrecognized.
    pub fn parse(frame: &Frame) -> Result<Command, ParseError> {
        let opcode = Opcode::try_from(frame[4])?;

        let cmd = match opcode {
            Opcode::LockOn => Command::Lock { on: true },
            Opcode::LockOff => Command::Lock { on: false },
            Opcode::PttOn => Command::Ptt { on: true },
            Opcode::PttOff => Command::Ptt { on: false },
            Opcode::SetFrequency => Command::SetFrequency {
                hz: bcd::from_bcd_be(&frame[..4], FREQ_DIGITS) * 10,
            },
            Opcode::SetMode => Command::SetMode {
                mode: Mode::from_code(frame[0])
                    .ok_or_else(|| ParseError::unrecognized("mode", &format!("0x{:02X}", frame[0])))?,
            },
            Opcode::ClarOn => Command::Clarifier { on: true },
            Opcode::ClarOff => Command::Clarifier { on: false },
            Opcode::ClarFreq => {
                let magnitude = bcd::from_bcd_be(&frame[2..4], SHORT_DIGITS) as i32 * 10;
                let hz = if frame[0] == CLAR_MINUS {
                    -magnitude
                } else {
                    magnitude
                };
                Command::ClarifierOffset { hz }
            }
            Opcode::ToggleVfo => Command::ToggleVfo,
            Opcode::SplitOn => Command::Split { on: true },
            Opcode::SplitOff => Command::Split { on: false },
            Opcode::RepeaterShift => Command::RepeaterShift {
                shift: RepeaterShift::from_code(frame[0]).ok_or_else(|| {
                    ParseError::unrecognized("repeater shift", &format!("0x{:02X}", frame[0]))
                })?,
            },
            Opcode::RepeaterOffset => Command::RepeaterOffset {
                khz: (bcd::from_bcd_be(&frame[..4], FREQ_DIGITS) / 100) as u32,
            },
            Opcode::SquelchMode => Command::SquelchMode {
                mode: SquelchMode::from_code(frame[0]).ok_or_else(|| {
                    ParseError::unrecognized("squelch mode", &format!("0x{:02X}", frame[0]))
                })?,
            },
            Opcode::CtcssTone | Opcode::DcsCode => Command::SquelchTone {
                kind: if opcode == Opcode::CtcssTone {
                    ToneKind::Ctcss
                } else {
                    ToneKind::Dcs
                },
                tx: bcd::from_bcd_be(&frame[..2], SHORT_DIGITS) as u16,
                rx: bcd::from_bcd_be(&frame[2..4], SHORT_DIGITS) as u16,
            },
            Opcode::ReadRxStatus => Command::ReadRxStatus,
            Opcode::ReadTxStatus => Command::ReadTxStatus,
            Opcode::ReadFreqMode => Command::ReadFrequencyMode,
            Opcode::EepromRead => Command::ReadEeprom {
                address: u16::from_be_bytes([frame[0], frame[1]]),
            },
        };

        Ok(cmd)
    }
}
