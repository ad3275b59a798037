//! Typed command parameters
//!
//! Each parameter is a closed enum carrying its vendor code. The vendor
//! names parse with [`FromStr`]; anything else is rejected with
//! [`ParseError::UnrecognizedParameter`] instead of falling back to a
//! default.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Operating modes understood by the FT-857D
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// Lower Sideband
    Lsb,
    /// Upper Sideband
    Usb,
    /// Continuous Wave
    Cw,
    /// CW Reverse
    CwR,
    /// Amplitude Modulation
    Am,
    /// Wide FM (broadcast receive)
    Wfm,
    /// Frequency Modulation
    Fm,
    /// Digital (user configured)
    Dig,
    /// Packet
    Pkt,
    /// FM Narrow
    FmN,
}

impl Mode {
    /// All modes in vendor table order
    pub const ALL: [Mode; 10] = [
        Mode::Lsb,
        Mode::Usb,
        Mode::Cw,
        Mode::CwR,
        Mode::Am,
        Mode::Wfm,
        Mode::Fm,
        Mode::Dig,
        Mode::Pkt,
        Mode::FmN,
    ];

    /// Mode byte sent in P1 of the set-mode command
    pub fn code(self) -> u8 {
        match self {
            Mode::Lsb => 0x00,
            Mode::Usb => 0x01,
            Mode::Cw => 0x02,
            Mode::CwR => 0x03,
            Mode::Am => 0x04,
            Mode::Wfm => 0x06,
            Mode::Fm => 0x08,
            Mode::Dig => 0x0A,
            Mode::Pkt => 0x0C,
            Mode::FmN => 0x88,
        }
    }

    /// Decode a mode byte as reported by the frequency/mode read
    ///
    /// The radio reports packet as 0xFC as well as 0x0C.
    pub fn from_code(code: u8) -> Option<Mode> {
        match code {
            0x00 => Some(Mode::Lsb),
            0x01 => Some(Mode::Usb),
            0x02 => Some(Mode::Cw),
            0x03 => Some(Mode::CwR),
            0x04 => Some(Mode::Am),
            0x06 => Some(Mode::Wfm),
            0x08 => Some(Mode::Fm),
            0x0A => Some(Mode::Dig),
            0x0C | 0xFC => Some(Mode::Pkt),
            0x88 => Some(Mode::FmN),
            _ => None,
        }
    }

    /// Vendor name of the mode
    pub fn name(self) -> &'static str {
        match self {
            Mode::Lsb => "LSB",
            Mode::Usb => "USB",
            Mode::Cw => "CW",
            Mode::CwR => "CWR",
            Mode::Am => "AM",
            Mode::Wfm => "WFM",
            Mode::Fm => "FM",
            Mode::Dig => "DIG",
            Mode::Pkt => "PKT",
            Mode::FmN => "FMN",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::unrecognized("mode", s))
    }
}

/// Repeater shift direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RepeaterShift {
    /// Negative shift ("-")
    Minus,
    /// Positive shift ("+")
    Plus,
    /// No shift ("s")
    Simplex,
}

impl RepeaterShift {
    /// P1 byte of the repeater offset command
    pub fn code(self) -> u8 {
        match self {
            RepeaterShift::Minus => 0x09,
            RepeaterShift::Plus => 0x49,
            RepeaterShift::Simplex => 0x89,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x09 => Some(RepeaterShift::Minus),
            0x49 => Some(RepeaterShift::Plus),
            0x89 => Some(RepeaterShift::Simplex),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            RepeaterShift::Minus => "-",
            RepeaterShift::Plus => "+",
            RepeaterShift::Simplex => "s",
        }
    }
}

impl fmt::Display for RepeaterShift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for RepeaterShift {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "-" => Ok(RepeaterShift::Minus),
            "+" => Ok(RepeaterShift::Plus),
            "s" | "S" => Ok(RepeaterShift::Simplex),
            _ => Err(ParseError::unrecognized("repeater shift", s)),
        }
    }
}

/// CTCSS/DCS squelch selection
///
/// Names follow the radio's menu abbreviations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SquelchMode {
    /// DCS encode and decode ("DCS")
    Dcs,
    /// DCS decoder only ("DDC"), mostly useful in split
    DcsDecoder,
    /// DCS encoder only ("DEN")
    DcsEncoder,
    /// CTCSS tone squelch ("TSQ")
    Ctcss,
    /// CTCSS decoder only ("TDC")
    CtcssDecoder,
    /// CTCSS encoder only ("TEN")
    CtcssEncoder,
    /// Tone squelch off ("OFF")
    Off,
}

impl SquelchMode {
    pub const ALL: [SquelchMode; 7] = [
        SquelchMode::Dcs,
        SquelchMode::DcsDecoder,
        SquelchMode::DcsEncoder,
        SquelchMode::Ctcss,
        SquelchMode::CtcssDecoder,
        SquelchMode::CtcssEncoder,
        SquelchMode::Off,
    ];

    /// P1 byte of the squelch mode command
    pub fn code(self) -> u8 {
        match self {
            SquelchMode::Dcs => 0x0A,
            SquelchMode::DcsDecoder => 0x0B,
            SquelchMode::DcsEncoder => 0x0C,
            SquelchMode::Ctcss => 0x2A,
            SquelchMode::CtcssDecoder => 0x3A,
            SquelchMode::CtcssEncoder => 0x4A,
            SquelchMode::Off => 0x8A,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        SquelchMode::ALL.into_iter().find(|m| m.code() == code)
    }

    pub fn name(self) -> &'static str {
        match self {
            SquelchMode::Dcs => "DCS",
            SquelchMode::DcsDecoder => "DDC",
            SquelchMode::DcsEncoder => "DEN",
            SquelchMode::Ctcss => "TSQ",
            SquelchMode::CtcssDecoder => "TDC",
            SquelchMode::CtcssEncoder => "TEN",
            SquelchMode::Off => "OFF",
        }
    }
}

impl fmt::Display for SquelchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SquelchMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SquelchMode::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::unrecognized("squelch mode", s))
    }
}

/// Which tone table a squelch tone command targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ToneKind {
    /// CTCSS tone, given in tenths of Hz ("C")
    Ctcss,
    /// DCS code, given as its decimal digits ("D")
    Dcs,
}

impl fmt::Display for ToneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToneKind::Ctcss => f.write_str("C"),
            ToneKind::Dcs => f.write_str("D"),
        }
    }
}

impl FromStr for ToneKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "C" | "c" | "CTCSS" | "ctcss" => Ok(ToneKind::Ctcss),
            "D" | "d" | "DCS" | "dcs" => Ok(ToneKind::Dcs),
            _ => Err(ParseError::unrecognized("tone kind", s)),
        }
    }
}
