//! OpenPGP card commands for Gnuk-style USB tokens
//!
//! This crate speaks the OpenPGP card application's command set on top of
//! `pgptoken-apdu-core`, usually over the USB CCID transport from
//! `pgptoken-transport-ccid`.
//!
//! # Example
//!
//! ```no_run
//! use pgptoken_openpgp::{PasswordRole, open_first_device, tags};
//! use pgptoken_transport_ccid::CcidConfig;
//!
//! # fn main() -> pgptoken_openpgp::Result<()> {
//! let mut card = open_first_device(CcidConfig::default())?;
//!
//! card.verify(PasswordRole::Admin, b"12345678")?;
//! card.put_data(tags::LOGIN_DATA, b"gpg_user")?;
//! assert_eq!(card.get_data(tags::LOGIN_DATA)?.as_ref(), b"gpg_user");
//! # Ok(())
//! # }
//! ```
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]

mod card;
pub mod commands;
mod constants;
mod error;
mod types;

pub use card::{AuthState, OpenPgpCard};
pub use constants::*;
pub use error::{Error, Result};
pub use types::{KeySlot, PasswordRole, ResetMethod, RsaKeyMaterial, RsaPublicKey};

use pgptoken_transport_ccid::{CcidConfig, CcidTransport};

/// Session over the first CCID reader on the USB bus
pub type UsbCard = OpenPgpCard<CcidTransport>;

/// Open the first CCID token, power it on and select the OpenPGP application
pub fn open_first_device(config: CcidConfig) -> Result<UsbCard> {
    let transport = CcidTransport::open_first(config)?;
    OpenPgpCard::open(transport)
}
