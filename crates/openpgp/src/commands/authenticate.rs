use bytes::Bytes;
use pgptoken_apdu_core::{ApduCommand, Command, ExpectedLength, Response};

use super::{CardCommand, expect_success, split_chained};
use crate::constants::{CLA_ISO, ins};
use crate::{Error, Result};

/// INTERNAL AUTHENTICATE with the authentication key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalAuthenticateCommand {
    data: Bytes,
}

impl InternalAuthenticateCommand {
    /// Sign `data` (a DigestInfo or raw challenge) with the authentication key
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }
}

impl ApduCommand for InternalAuthenticateCommand {
    type Success = Bytes;
    type Error = Error;

    fn class(&self) -> u8 {
        CLA_ISO
    }

    fn instruction(&self) -> u8 {
        ins::INTERNAL_AUTHENTICATE
    }

    fn p1(&self) -> u8 {
        0x00
    }

    fn p2(&self) -> u8 {
        0x00
    }

    fn data(&self) -> Option<&[u8]> {
        Some(&self.data)
    }

    fn expected_length(&self) -> Option<ExpectedLength> {
        None
    }

    fn parse_response(response: Response) -> Result<Bytes> {
        expect_success(Self::OPERATION, response)
    }
}

impl CardCommand for InternalAuthenticateCommand {
    const OPERATION: &'static str = "INTERNAL AUTHENTICATE";
}

/// EXTERNAL AUTHENTICATE with a signed challenge
///
/// Used by the firmware upgrade flow: the host proves possession of the
/// key registered under `keyno`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalAuthenticate {
    keyno: u8,
    signed: Bytes,
}

impl ExternalAuthenticate {
    /// Operation name used in errors
    pub const OPERATION: &'static str = "EXTERNAL AUTHENTICATE";

    /// Authenticate with `signed`, verified against key `keyno`
    pub fn new(keyno: u8, signed: impl Into<Bytes>) -> Self {
        Self {
            keyno,
            signed: signed.into(),
        }
    }

    /// APDUs carrying this command
    pub fn blocks(&self) -> Result<Vec<Command>> {
        split_chained(
            Self::OPERATION,
            ins::EXTERNAL_AUTHENTICATE,
            0x00,
            self.keyno,
            self.signed.clone(),
        )
    }
}
