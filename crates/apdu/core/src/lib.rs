//! Core traits and types for APDU (Application Protocol Data Unit) operations
//!
//! This crate provides the foundational types and traits for exchanging
//! ISO/IEC 7816-4 commands with a smart card or security token.
//!
//! ## Overview
//!
//! This crate provides abstractions for:
//!
//! - Composing short-form APDU commands and parsing responses
//! - Interpreting status words, including the `61XX` "more data" family
//! - Following GET RESPONSE continuations until the card reports `90 00`
//! - Talking to cards through any [`CardTransport`] implementation
//!
//! The USB CCID transport lives in its own crate; the types here never
//! touch the wire directly.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

// Main modules
pub mod command;
pub mod executor;
pub mod processor;
pub mod response;
pub mod transport;

// Core error types
mod error;
pub use error::{Error, Result, ResultExt};

// Re-exports for common types
pub use command::{ApduCommand, Command, ExpectedLength, MAX_SHORT_DATA};
pub use executor::CardExecutor;
pub use processor::GetResponseProcessor;
pub use response::status::StatusWord;
pub use response::{Response, utils};
pub use transport::{CardTransport, TransportError};

/// Prelude module containing commonly used traits and types
pub mod prelude {
    pub use crate::{
        Bytes, BytesMut, CardExecutor, Command, Error, Response, Result, ResultExt,
        command::ApduCommand,
        processor::GetResponseProcessor,
        response::status::StatusWord,
        transport::{CardTransport, TransportError},
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test the basic types are re-exported correctly
    #[test]
    fn test_reexports() {
        let cmd = Command::new(0x00, 0xA4, 0x04, 0x0C);
        assert_eq!(cmd.class(), 0x00);
        assert_eq!(cmd.instruction(), 0xA4);
        assert_eq!(cmd.p1(), 0x04);
        assert_eq!(cmd.p2(), 0x0C);

        let resp = Response::success(Bytes::from_static(&[0x01, 0x02, 0x03]));
        assert!(resp.is_success());
        assert_eq!(resp.payload(), &[0x01, 0x02, 0x03][..]);
        assert_eq!(resp.status(), StatusWord::new(0x90, 0x00));
    }
}
