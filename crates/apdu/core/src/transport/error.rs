//! Error types specific to card transport

/// Transport error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Could not open or claim the device
    #[error("Failed to connect to device: {0}")]
    Connection(String),

    /// The device went away mid-session
    #[error("Device disconnected")]
    Disconnected,

    /// No card present in the reader slot
    #[error("No card present")]
    NoCard,

    /// A bulk transfer did not complete in time
    #[error("Operation timed out")]
    Timeout,

    /// The reader sent something that violates the framing protocol
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The device requires a mode this stack does not implement
    #[error("Unsupported: {0}")]
    Unsupported(&'static str),

    /// A previous fatal error invalidated the session; reset is required
    #[error("Transport invalidated, reset required")]
    Invalidated,

    /// Other error with message
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Create a general other error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other(message.into())
    }

    /// Create a protocol error
    pub fn protocol<S: Into<String>>(message: S) -> Self {
        Self::Protocol(message.into())
    }

    /// Whether the session must be reset before another exchange
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::Protocol(_) | Self::Disconnected | Self::Invalidated
        )
    }
}
