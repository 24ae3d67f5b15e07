//! Error types for the CCID transport

use pgptoken_apdu_core::TransportError;

/// CCID-specific errors
#[derive(Debug, thiserror::Error)]
pub enum CcidError {
    /// libusb error
    #[error("USB error: {0}")]
    Usb(rusb::Error),

    /// A bulk transfer timed out
    #[error("USB transfer timed out")]
    Timeout,

    /// The device was unplugged
    #[error("Device disconnected")]
    Disconnected,

    /// No USB interface with the CCID class triple was found
    #[error("No CCID device present")]
    NotCcidDevice,

    /// The interface carries no usable CCID class descriptor
    #[error("Invalid CCID class descriptor")]
    InvalidClassDescriptor,

    /// The class descriptor advertises no known exchange level
    #[error("Unknown exchange level: features byte {0:#04x}")]
    UnknownExchangeLevel(u8),

    /// The reader only speaks TPDU, which is not implemented
    #[error("TPDU level exchange is not supported")]
    TpduUnsupported,

    /// Bulk-in message shorter than the 10-byte header, or truncated payload
    #[error("Malformed CCID message: {0} bytes")]
    Malformed(usize),

    /// Chain parameter outside the values allowed at this point of the exchange
    #[error("Unexpected chain parameter: {0:#04x}")]
    UnexpectedChain(u8),

    /// Short bulk-out write
    #[error("Incomplete USB write: {written}/{expected} bytes")]
    IncompleteWrite {
        /// Bytes accepted by the device
        written: usize,
        /// Bytes in the message
        expected: usize,
    },

    /// No card in the slot
    #[error("No ICC present")]
    NoCard,

    /// The slot status byte reports an unknown ICC state
    #[error("Unknown ICC status: {0:#04x}")]
    UnknownIccStatus(u8),

    /// The reader reported a failed command
    #[error("CCID command failed: status={status:#04x} error={error:#04x}")]
    CommandFailed {
        /// bStatus byte
        status: u8,
        /// bError byte
        error: u8,
    },

    /// Command longer than a short APDU
    #[error("Command too long: {len} bytes (max {max})")]
    CommandTooLong {
        /// Actual command length
        len: usize,
        /// Configured maximum
        max: usize,
    },

    /// A previous fatal error left the session unusable
    #[error("Session invalidated, reset required")]
    Invalidated,
}

impl From<rusb::Error> for CcidError {
    fn from(error: rusb::Error) -> Self {
        match error {
            rusb::Error::Timeout => Self::Timeout,
            rusb::Error::NoDevice => Self::Disconnected,
            other => Self::Usb(other),
        }
    }
}

impl CcidError {
    /// Whether this error invalidates the session until a reset
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Usb(_)
                | Self::Timeout
                | Self::Disconnected
                | Self::Malformed(_)
                | Self::UnexpectedChain(_)
                | Self::IncompleteWrite { .. }
                | Self::Invalidated
        )
    }
}

impl From<CcidError> for TransportError {
    fn from(error: CcidError) -> Self {
        match error {
            CcidError::Timeout => Self::Timeout,
            CcidError::Disconnected => Self::Disconnected,
            CcidError::NoCard => Self::NoCard,
            CcidError::Invalidated => Self::Invalidated,
            CcidError::TpduUnsupported => Self::Unsupported("TPDU level exchange"),
            e @ (CcidError::NotCcidDevice | CcidError::InvalidClassDescriptor) => {
                Self::Connection(e.to_string())
            }
            e if e.is_fatal() => Self::Protocol(e.to_string()),
            e => Self::Other(e.to_string()),
        }
    }
}
