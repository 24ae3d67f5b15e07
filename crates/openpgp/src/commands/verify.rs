use bytes::Bytes;
use pgptoken_apdu_core::{ApduCommand, ExpectedLength, Response};

use super::{CardCommand, expect_success};
use crate::constants::{CLA_ISO, ins};
use crate::types::PasswordRole;
use crate::{Error, Result};

/// VERIFY a password
#[derive(Clone, PartialEq, Eq)]
pub struct VerifyCommand {
    role: PasswordRole,
    secret: Bytes,
}

impl std::fmt::Debug for VerifyCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifyCommand")
            .field("role", &self.role)
            .field("secret_len", &self.secret.len())
            .finish()
    }
}

impl VerifyCommand {
    /// Verify `secret` against the password of `role`
    pub fn new(role: PasswordRole, secret: impl Into<Bytes>) -> Self {
        Self {
            role,
            secret: secret.into(),
        }
    }

    /// Password being verified
    pub const fn role(&self) -> PasswordRole {
        self.role
    }
}

impl ApduCommand for VerifyCommand {
    type Success = ();
    type Error = Error;

    fn class(&self) -> u8 {
        CLA_ISO
    }

    fn instruction(&self) -> u8 {
        ins::VERIFY
    }

    fn p1(&self) -> u8 {
        0x00
    }

    fn p2(&self) -> u8 {
        self.role.reference()
    }

    fn data(&self) -> Option<&[u8]> {
        Some(&self.secret)
    }

    fn expected_length(&self) -> Option<ExpectedLength> {
        None
    }

    fn parse_response(response: Response) -> Result<()> {
        expect_success(Self::OPERATION, response).map(drop)
    }
}

impl CardCommand for VerifyCommand {
    const OPERATION: &'static str = "VERIFY";
}
