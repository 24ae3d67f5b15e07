//! Core error type for all APDU operations
//!
//! This module provides a centralized error type used throughout the
//! pgptoken_apdu_core crate. Transport failures, status words and command
//! validation errors all bubble up through [`Error`].

use crate::response::status::StatusWord;
use crate::transport::TransportError;

/// Result type for APDU operations
pub type Result<T> = core::result::Result<T, Error>;

/// Core error type that encompasses all possible errors in the crate
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// The transport failed to move bytes to or from the card
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The card answered with a status word other than `90 00` or `61 XX`
    #[error("Status error {0}: {desc}", desc = .0.description())]
    Status(StatusWord),

    /// Response shorter than the two status bytes
    #[error("Incomplete response: {0} bytes")]
    IncompleteResponse(usize),

    /// Raw command bytes that do not form a valid short APDU
    #[error("Invalid command length: {0}")]
    InvalidCommandLength(usize),

    /// Command data does not fit a short APDU
    #[error("Command data too long: {len} bytes (max {max})")]
    DataTooLong {
        /// Actual data length
        len: usize,
        /// Maximum accepted length
        max: usize,
    },

    /// The card kept answering `61 XX` past the configured limit
    #[error("Chain limit exceeded")]
    ChainLimitExceeded,

    /// Context error with message and source error
    #[error("{context}: {source}")]
    Context {
        /// Contextual message
        context: String,
        /// Source error
        source: Box<Self>,
    },
}

impl Error {
    /// Create a new error with context information
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a new status error
    pub const fn status(sw1: u8, sw2: u8) -> Self {
        Self::Status(StatusWord::new(sw1, sw2))
    }

    /// Strip any context wrappers and return the innermost error
    pub fn root(&self) -> &Self {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Status word carried by this error, looking through context wrappers
    pub fn status_word(&self) -> Option<StatusWord> {
        match self.root() {
            Self::Status(sw) => Some(*sw),
            _ => None,
        }
    }

    /// Whether this error leaves the transport unusable until reset
    pub fn is_fatal(&self) -> bool {
        matches!(self.root(), Self::Transport(e) if e.is_fatal())
    }
}

/// Extension trait for Result with APDU Errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context<S: Into<String>>(self, context: S) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for core::result::Result<T, E> {
    fn context<S: Into<String>>(self, context: S) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }
}
