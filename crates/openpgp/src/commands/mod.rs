//! OpenPGP card commands
//!
//! One typed command per card instruction. Commands whose data may exceed
//! a short APDU build their blocks through [`split_chained`].

mod authenticate;
mod binary;
mod chaining;
mod change_reference_data;
mod data;
mod generate_key_pair;
mod get_challenge;
mod pso;
mod reset_retry_counter;
mod select;
mod verify;

use bytes::Bytes;
use pgptoken_apdu_core::{ApduCommand, Response};

pub use authenticate::{ExternalAuthenticate, InternalAuthenticateCommand};
pub use binary::{ReadBinaryCommand, WriteBinary};
pub use chaining::split_chained;
pub use change_reference_data::ChangeReferenceDataCommand;
pub use data::{GetDataCommand, PutDataCommand, PutDataOdd};
pub use generate_key_pair::{GenerateKeyPairCommand, KeyPairMode};
pub use get_challenge::GetChallengeCommand;
pub use pso::PsoCommand;
pub use reset_retry_counter::ResetRetryCounterCommand;
pub use select::SelectCommand;
pub use verify::VerifyCommand;

use crate::{Error, Result};

/// A card command with a name used in errors and logs
pub trait CardCommand: ApduCommand<Error = Error> {
    /// Operation name
    const OPERATION: &'static str;
}

/// Payload of a successful response, or the status word as an error
pub(crate) fn expect_success(operation: &'static str, response: Response) -> Result<Bytes> {
    if response.is_success() {
        Ok(response.payload().clone())
    } else {
        Err(Error::from_status(operation, response.status()))
    }
}

/// Split a two-byte data object tag into P1 and P2
pub(crate) const fn tag_parameters(tag: u16) -> (u8, u8) {
    let [p1, p2] = tag.to_be_bytes();
    (p1, p2)
}
