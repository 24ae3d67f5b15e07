use bytes::Bytes;
use pgptoken_apdu_core::{ApduCommand, ExpectedLength, Response};

use super::{CardCommand, expect_success};
use crate::constants::{CLA_ISO, ins};
use crate::types::PasswordRole;
use crate::{Error, Result};

/// CHANGE REFERENCE DATA: replace a password
///
/// The data field is the current password immediately followed by the new
/// one.
#[derive(Clone, PartialEq, Eq)]
pub struct ChangeReferenceDataCommand {
    role: PasswordRole,
    data: Bytes,
}

impl std::fmt::Debug for ChangeReferenceDataCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeReferenceDataCommand")
            .field("role", &self.role)
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl ChangeReferenceDataCommand {
    /// Change the password of `role`; `data` is old password || new password
    pub fn new(role: PasswordRole, data: impl Into<Bytes>) -> Self {
        Self {
            role,
            data: data.into(),
        }
    }
}

impl ApduCommand for ChangeReferenceDataCommand {
    type Success = ();
    type Error = Error;

    fn class(&self) -> u8 {
        CLA_ISO
    }

    fn instruction(&self) -> u8 {
        ins::CHANGE_REFERENCE_DATA
    }

    fn p1(&self) -> u8 {
        0x00
    }

    fn p2(&self) -> u8 {
        self.role.reference()
    }

    fn data(&self) -> Option<&[u8]> {
        Some(&self.data)
    }

    fn expected_length(&self) -> Option<ExpectedLength> {
        None
    }

    fn parse_response(response: Response) -> Result<()> {
        expect_success(Self::OPERATION, response).map(drop)
    }
}

impl CardCommand for ChangeReferenceDataCommand {
    const OPERATION: &'static str = "CHANGE REFERENCE DATA";
}
