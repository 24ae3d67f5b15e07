use pgptoken_apdu_core::{ApduCommand, ExpectedLength, Response};

use super::{CardCommand, expect_success};
use crate::constants::{CLA_ISO, ins};
use crate::types::{KeySlot, RsaPublicKey};
use crate::{Error, Result};

/// What GENERATE ASYMMETRIC KEY PAIR should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPairMode {
    /// Generate a new key pair, replacing the slot's key
    Generate,
    /// Read the public key already in the slot
    ReadPublicKey,
}

impl KeyPairMode {
    const fn p1(self) -> u8 {
        match self {
            Self::Generate => 0x80,
            Self::ReadPublicKey => 0x81,
        }
    }
}

/// GENERATE ASYMMETRIC KEY PAIR
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateKeyPairCommand {
    mode: KeyPairMode,
    crt: [u8; 2],
}

impl GenerateKeyPairCommand {
    /// Generate a new key in `slot`
    pub const fn generate(slot: KeySlot) -> Self {
        Self {
            mode: KeyPairMode::Generate,
            crt: slot.crt(),
        }
    }

    /// Read the public key of `slot`
    pub const fn read_public_key(slot: KeySlot) -> Self {
        Self {
            mode: KeyPairMode::ReadPublicKey,
            crt: slot.crt(),
        }
    }

    /// Whether this command generates or reads
    pub const fn mode(&self) -> KeyPairMode {
        self.mode
    }
}

impl ApduCommand for GenerateKeyPairCommand {
    type Success = RsaPublicKey;
    type Error = Error;

    fn class(&self) -> u8 {
        CLA_ISO
    }

    fn instruction(&self) -> u8 {
        ins::GENERATE_KEY_PAIR
    }

    fn p1(&self) -> u8 {
        self.mode.p1()
    }

    fn p2(&self) -> u8 {
        0x00
    }

    fn data(&self) -> Option<&[u8]> {
        Some(&self.crt)
    }

    fn expected_length(&self) -> Option<ExpectedLength> {
        None
    }

    fn parse_response(response: Response) -> Result<RsaPublicKey> {
        let template = expect_success(Self::OPERATION, response)?;
        RsaPublicKey::from_template(&template)
    }
}

impl CardCommand for GenerateKeyPairCommand {
    const OPERATION: &'static str = "GENERATE KEY PAIR";
}
