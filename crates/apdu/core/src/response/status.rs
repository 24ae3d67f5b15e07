//! ISO 7816-4 status words

use std::fmt;

/// Trailing `SW1 SW2` of a card response
///
/// Kept numerically; [`description`](Self::description) is only for
/// messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusWord {
    /// SW1
    pub sw1: u8,
    /// SW2
    pub sw2: u8,
}

impl StatusWord {
    /// `90 00`
    pub const SUCCESS: Self = Self::new(0x90, 0x00);

    /// Build a status word from its two bytes
    pub const fn new(sw1: u8, sw2: u8) -> Self {
        Self { sw1, sw2 }
    }

    /// Both bytes as one big-endian value
    pub const fn to_u16(&self) -> u16 {
        u16::from_be_bytes([self.sw1, self.sw2])
    }

    /// `90 00`
    pub const fn is_success(&self) -> bool {
        self.sw1 == 0x90 && self.sw2 == 0x00
    }

    /// `61 XX`: XX more bytes wait for GET RESPONSE
    pub const fn is_more_data_available(&self) -> bool {
        self.sw1 == 0x61
    }

    /// Byte count announced by `61 XX`, where `00` stands for 256
    pub const fn remaining_bytes(&self) -> Option<u8> {
        if self.is_more_data_available() {
            Some(self.sw2)
        } else {
            None
        }
    }

    /// `69 83`, or `63 C0` with the retry counter at zero
    pub const fn is_blocked(&self) -> bool {
        matches!((self.sw1, self.sw2), (0x69, 0x83) | (0x63, 0xC0))
    }

    /// Retry counter carried by a `63 CX` verification failure
    pub const fn retries_remaining(&self) -> Option<u8> {
        if self.sw1 == 0x63 && self.sw2 & 0xF0 == 0xC0 {
            Some(self.sw2 & 0x0F)
        } else {
            None
        }
    }

    /// Short text for the status words an OpenPGP card returns
    pub const fn description(&self) -> &'static str {
        match (self.sw1, self.sw2) {
            (0x90, 0x00) => "Success",
            (0x61, _) => "More data available",
            (0x63, 0xC0) => "Password blocked, no retries left",
            (0x63, n) if n & 0xF0 == 0xC0 => "Verification failed, retries left",
            (0x64, _) => "Execution error, memory unchanged",
            (0x65, _) => "Execution error, memory changed",
            (0x67, 0x00) => "Wrong length",
            (0x68, 0x83) => "Last command of the chain expected",
            (0x68, 0x84) => "Command chaining not supported",
            (0x69, 0x82) => "Security status not satisfied",
            (0x69, 0x83) => "Authentication method blocked",
            (0x69, 0x85) => "Conditions of use not satisfied",
            (0x6A, 0x80) => "Incorrect data field",
            (0x6A, 0x82) => "File or application not found",
            (0x6A, 0x86) => "Incorrect P1-P2",
            (0x6A, 0x88) => "Referenced data not found",
            (0x6D, 0x00) => "Instruction not supported",
            (0x6E, 0x00) => "Class not supported",
            _ => "Unknown status word",
        }
    }
}

impl From<(u8, u8)> for StatusWord {
    fn from((sw1, sw2): (u8, u8)) -> Self {
        Self::new(sw1, sw2)
    }
}

impl fmt::Display for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X} {:02X}", self.sw1, self.sw2)
    }
}
