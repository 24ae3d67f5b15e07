//! USB CCID transport for APDU operations
//!
//! This crate implements the `CardTransport` trait from `pgptoken-apdu-core`
//! directly on top of USB bulk transfers, so a token can be driven without
//! PC/SC middleware.
//!
//! It handles:
//!
//! - CCID message framing and the per-reader sequence counter
//! - Chained responses (`bChainParameter` 1/3/2) and time extensions
//! - Power-on, power-off and slot status
//! - Exchange-level detection from the CCID class descriptor
//!
//! # Example
//!
//! ```no_run
//! use pgptoken_apdu_core::{CardExecutor, Command};
//! use pgptoken_transport_ccid::{CcidConfig, CcidTransport};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = CcidTransport::open_first(CcidConfig::default())?;
//! let mut executor = CardExecutor::new(transport);
//!
//! let challenge = executor.transmit(&Command::new(0x00, 0x84, 0x00, 0x00))?;
//! println!("Challenge: {}", hex::encode(challenge.payload()));
//! # Ok(())
//! # }
//! ```
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]

pub mod config;
pub mod descriptor;
pub mod error;
pub mod message;
pub mod pipe;
pub mod transport;

pub use config::{CcidConfig, Voltage};
pub use descriptor::ExchangeLevel;
pub use error::CcidError;
pub use pipe::{BulkPipe, UsbBulkPipe};
pub use transport::{CcidTransport, IccStatus};
