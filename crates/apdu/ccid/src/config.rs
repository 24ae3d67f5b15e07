//! Configuration options for the CCID transport

use std::time::Duration;

/// Voltage requested from the reader at power-on (`bPowerSelect`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Voltage {
    /// Let the reader choose
    #[default]
    Automatic,
    /// 5.0 V
    V5,
    /// 3.0 V
    V3,
    /// 1.8 V
    V1_8,
}

impl Voltage {
    /// `bPowerSelect` value for this voltage
    pub const fn power_select(self) -> u8 {
        match self {
            Self::Automatic => 0x00,
            Self::V5 => 0x01,
            Self::V3 => 0x02,
            Self::V1_8 => 0x03,
        }
    }
}

/// Configuration options for the CCID transport
#[derive(Debug, Clone)]
pub struct CcidConfig {
    /// Timeout applied to every bulk read and write
    pub timeout: Duration,
    /// Size of the bulk-in read buffer
    pub read_buffer_size: usize,
    /// Longest command accepted by `send_command`
    pub max_command_length: usize,
    /// Reader slot
    pub slot: u8,
    /// Power-on voltage
    pub voltage: Voltage,
}

impl Default for CcidConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            read_buffer_size: 1024,
            // CLA INS P1 P2 Lc, 255 data bytes, Le
            max_command_length: 261,
            slot: 0,
            voltage: Voltage::Automatic,
        }
    }
}

impl CcidConfig {
    /// Set the bulk transfer timeout
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the bulk-in read buffer size
    pub const fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Set the reader slot
    pub const fn with_slot(mut self, slot: u8) -> Self {
        self.slot = slot;
        self
    }

    /// Set the power-on voltage
    pub const fn with_voltage(mut self, voltage: Voltage) -> Self {
        self.voltage = voltage;
        self
    }
}
