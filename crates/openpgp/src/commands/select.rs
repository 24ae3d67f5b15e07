use pgptoken_apdu_core::{ApduCommand, ExpectedLength, Response};

use super::{CardCommand, expect_success};
use crate::constants::{CLA_ISO, OPENPGP_AID, ins};
use crate::{Error, Result};

/// SELECT by DF name, no response data requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectCommand {
    aid: &'static [u8],
}

impl SelectCommand {
    /// Select the OpenPGP application
    pub const fn openpgp() -> Self {
        Self { aid: OPENPGP_AID }
    }

    /// Select an arbitrary application
    pub const fn by_aid(aid: &'static [u8]) -> Self {
        Self { aid }
    }
}

impl ApduCommand for SelectCommand {
    type Success = ();
    type Error = Error;

    fn class(&self) -> u8 {
        CLA_ISO
    }

    fn instruction(&self) -> u8 {
        ins::SELECT
    }

    fn p1(&self) -> u8 {
        0x04
    }

    fn p2(&self) -> u8 {
        0x0C
    }

    fn data(&self) -> Option<&[u8]> {
        Some(self.aid)
    }

    fn expected_length(&self) -> Option<ExpectedLength> {
        None
    }

    fn parse_response(response: Response) -> Result<()> {
        expect_success(Self::OPERATION, response).map(drop)
    }
}

impl CardCommand for SelectCommand {
    const OPERATION: &'static str = "SELECT";
}
