use iso7816_tlv::TlvError;
use pgptoken_apdu_core::{StatusWord, TransportError};
use pgptoken_transport_ccid::CcidError;

/// Result type for OpenPGP card operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for OpenPGP card operations
///
/// Every variant that comes from talking to the card names the operation
/// that failed. Status words are kept numerically.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The card rejected a command
    #[error("{operation} failed with status {status}: {desc}", desc = status.description())]
    Status {
        /// Failing operation
        operation: &'static str,
        /// Status word returned by the card
        status: StatusWord,
    },

    /// The referenced password has no retries left
    #[error("{operation} failed: password blocked ({status})")]
    Blocked {
        /// Failing operation
        operation: &'static str,
        /// Status word returned by the card
        status: StatusWord,
    },

    /// The first block of a chained command was accepted, the last was not
    ///
    /// The card may hold partially written state.
    #[error("{operation} partially applied: closing block failed with status {status}")]
    PartialWrite {
        /// Failing operation
        operation: &'static str,
        /// Status word of the rejected block
        status: StatusWord,
    },

    /// Command data exceeds what the operation can carry
    #[error("{operation}: data too long ({len} bytes, max {max})")]
    DataTooLong {
        /// Failing operation
        operation: &'static str,
        /// Data length given
        len: usize,
        /// Maximum accepted length
        max: usize,
    },

    /// The card answered with data that cannot be interpreted
    #[error("{operation}: invalid response: {reason}")]
    InvalidResponse {
        /// Failing operation
        operation: &'static str,
        /// What was wrong
        reason: &'static str,
    },

    /// APDU layer error
    #[error("{operation}: {source}")]
    Apdu {
        /// Failing operation
        operation: &'static str,
        /// Underlying error
        source: pgptoken_apdu_core::Error,
    },

    /// Transport error
    #[error("{operation}: {source}")]
    Transport {
        /// Failing operation
        operation: &'static str,
        /// Underlying error
        source: TransportError,
    },

    /// CCID reader error while opening a device
    #[error(transparent)]
    Ccid(#[from] CcidError),

    /// TLV encoding error
    #[error("TLV error: {0}")]
    Tlv(TlvError),
}

impl Error {
    /// Wrap an APDU layer error for `operation`
    ///
    /// Status words and transport failures are lifted into their own
    /// variants so callers can match on them directly.
    pub fn from_apdu(operation: &'static str, source: pgptoken_apdu_core::Error) -> Self {
        match source.root() {
            pgptoken_apdu_core::Error::Transport(e) => Self::Transport {
                operation,
                source: e.clone(),
            },
            pgptoken_apdu_core::Error::Status(status) => Self::from_status(operation, *status),
            pgptoken_apdu_core::Error::DataTooLong { len, max } => Self::DataTooLong {
                operation,
                len: *len,
                max: *max,
            },
            _ => Self::Apdu { operation, source },
        }
    }

    /// Error for a failing status word, distinguishing blocked passwords
    pub const fn from_status(operation: &'static str, status: StatusWord) -> Self {
        if status.is_blocked() {
            Self::Blocked { operation, status }
        } else {
            Self::Status { operation, status }
        }
    }

    /// Status word carried by this error, if any
    pub fn status_word(&self) -> Option<StatusWord> {
        match self {
            Self::Status { status, .. }
            | Self::Blocked { status, .. }
            | Self::PartialWrite { status, .. } => Some(*status),
            Self::Apdu { source, .. } => source.status_word(),
            _ => None,
        }
    }

    /// Whether the session must be reset before it can be used again
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Transport { source, .. } => source.is_fatal(),
            Self::Apdu { source, .. } => source.is_fatal(),
            Self::Ccid(e) => e.is_fatal(),
            _ => false,
        }
    }
}

impl From<pgptoken_apdu_core::Error> for Error {
    fn from(error: pgptoken_apdu_core::Error) -> Self {
        Self::from_apdu("APDU exchange", error)
    }
}

impl From<TlvError> for Error {
    fn from(error: TlvError) -> Self {
        Self::Tlv(error)
    }
}
