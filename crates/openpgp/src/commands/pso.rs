use bytes::Bytes;
use pgptoken_apdu_core::{ApduCommand, Command, ExpectedLength, Response};

use super::{CardCommand, expect_success, split_chained};
use crate::constants::{CLA_ISO, ins, pso};
use crate::{Error, Result};

/// PERFORM SECURITY OPERATION
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsoCommand {
    p1: u8,
    p2: u8,
    data: Bytes,
}

impl PsoCommand {
    /// PSO with explicit P1/P2
    pub fn new(p1: u8, p2: u8, data: impl Into<Bytes>) -> Self {
        Self {
            p1,
            p2,
            data: data.into(),
        }
    }

    /// PSO:COMPUTE DIGITAL SIGNATURE over a DigestInfo
    pub fn compute_digital_signature(data: impl Into<Bytes>) -> Self {
        let (p1, p2) = pso::COMPUTE_DIGITAL_SIGNATURE;
        Self::new(p1, p2, data)
    }

    /// PSO:DECIPHER of a padding indicator byte followed by the cryptogram
    pub fn decipher(data: impl Into<Bytes>) -> Self {
        let (p1, p2) = pso::DECIPHER;
        Self::new(p1, p2, data)
    }

    /// APDUs carrying this command as a chained pair when over 128 bytes
    pub fn blocks(&self) -> Result<Vec<Command>> {
        split_chained(Self::OPERATION, ins::PSO, self.p1, self.p2, self.data.clone())
    }
}

impl ApduCommand for PsoCommand {
    type Success = Bytes;
    type Error = Error;

    fn class(&self) -> u8 {
        CLA_ISO
    }

    fn instruction(&self) -> u8 {
        ins::PSO
    }

    fn p1(&self) -> u8 {
        self.p1
    }

    fn p2(&self) -> u8 {
        self.p2
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

impl CardCommand for PsoCommand {
    const OPERATION: &'static str = "PSO";
}
