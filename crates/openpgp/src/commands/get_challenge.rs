use bytes::Bytes;
use pgptoken_apdu_core::{ApduCommand, ExpectedLength, Response};

use super::{CardCommand, expect_success};
use crate::constants::{CLA_ISO, ins};
use crate::{Error, Result};

/// GET CHALLENGE: random bytes from the card
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetChallengeCommand {
    le: Option<ExpectedLength>,
}

impl GetChallengeCommand {
    /// Challenge of the card's default length
    pub const fn new() -> Self {
        Self { le: None }
    }

    /// Challenge of `len` bytes
    pub const fn with_length(len: ExpectedLength) -> Self {
        Self { le: Some(len) }
    }
}

impl ApduCommand for GetChallengeCommand {
    type Success = Bytes;
    type Error = Error;

    fn class(&self) -> u8 {
        CLA_ISO
    }

    fn instruction(&self) -> u8 {
        ins::GET_CHALLENGE
    }

    fn p1(&self) -> u8 {
        0x00
    }

    fn p2(&self) -> u8 {
        0x00
    }

    fn data(&self) -> Option<&[u8]> {
        None
    }

    fn expected_length(&self) -> Option<ExpectedLength> {
        self.le
    }

    fn parse_response(response: Response) -> Result<Bytes> {
        expect_success(Self::OPERATION, response)
    }
}

impl CardCommand for GetChallengeCommand {
    const OPERATION: &'static str = "GET CHALLENGE";
}
