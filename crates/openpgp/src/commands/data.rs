use bytes::Bytes;
use pgptoken_apdu_core::{ApduCommand, Command, ExpectedLength, Response};

use super::{CardCommand, expect_success, split_chained, tag_parameters};
use crate::constants::{CLA_ISO, ins};
use crate::{Error, Result};

/// GET DATA for one data object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetDataCommand {
    tag: u16,
}

impl GetDataCommand {
    /// Read the data object `tag`
    pub const fn new(tag: u16) -> Self {
        Self { tag }
    }
}

impl ApduCommand for GetDataCommand {
    type Success = Bytes;
    type Error = Error;

    fn class(&self) -> u8 {
        CLA_ISO
    }

    fn instruction(&self) -> u8 {
        ins::GET_DATA
    }

    fn p1(&self) -> u8 {
        tag_parameters(self.tag).0
    }

    fn p2(&self) -> u8 {
        tag_parameters(self.tag).1
    }

    fn data(&self) -> Option<&[u8]> {
        None
    }

    fn expected_length(&self) -> Option<ExpectedLength> {
        None
    }

    fn parse_response(response: Response) -> Result<Bytes> {
        expect_success(Self::OPERATION, response)
    }
}

impl CardCommand for GetDataCommand {
    const OPERATION: &'static str = "GET DATA";
}

/// PUT DATA for one data object
///
/// Empty content deletes the object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutDataCommand {
    tag: u16,
    content: Bytes,
}

impl PutDataCommand {
    /// Write `content` to the data object `tag`
    pub fn new(tag: u16, content: impl Into<Bytes>) -> Self {
        Self {
            tag,
            content: content.into(),
        }
    }

    /// Delete the data object `tag`
    pub const fn remove(tag: u16) -> Self {
        Self {
            tag,
            content: Bytes::new(),
        }
    }
}

impl ApduCommand for PutDataCommand {
    type Success = ();
    type Error = Error;

    fn class(&self) -> u8 {
        CLA_ISO
    }

    fn instruction(&self) -> u8 {
        ins::PUT_DATA
    }

    fn p1(&self) -> u8 {
        tag_parameters(self.tag).0
    }

    fn p2(&self) -> u8 {
        tag_parameters(self.tag).1
    }

    fn data(&self) -> Option<&[u8]> {
        Some(&self.content)
    }

    fn expected_length(&self) -> Option<ExpectedLength> {
        None
    }

    fn parse_response(response: Response) -> Result<()> {
        expect_success(Self::OPERATION, response).map(drop)
    }
}

impl CardCommand for PutDataCommand {
    const OPERATION: &'static str = "PUT DATA";
}

/// PUT DATA with the odd instruction `DB`, chained when over 128 bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutDataOdd {
    tag: u16,
    content: Bytes,
}

impl PutDataOdd {
    /// Operation name used in errors
    pub const OPERATION: &'static str = "PUT DATA (odd)";

    /// Write `content` to `tag`
    pub fn new(tag: u16, content: impl Into<Bytes>) -> Self {
        Self {
            tag,
            content: content.into(),
        }
    }

    /// APDUs carrying this command
    pub fn blocks(&self) -> Result<Vec<Command>> {
        let (p1, p2) = tag_parameters(self.tag);
        split_chained(Self::OPERATION, ins::PUT_DATA_ODD, p1, p2, self.content.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::tags;
    use hex_literal::hex;

    #[test]
    fn test_get_data_bytes() {
        assert_eq!(
            GetDataCommand::new(tags::LOGIN_DATA).to_bytes().as_ref(),
            &hex!("00CA005E")
        );
        assert_eq!(
            GetDataCommand::new(tags::URL).to_bytes().as_ref(),
            &hex!("00CA5F50")
        );
    }

    #[test]
    fn test_get_data_empty_success() {
        let data = GetDataCommand::parse_response(Response::success(Bytes::new())).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_put_data_bytes() {
        let cmd = PutDataCommand::new(tags::LOGIN_DATA, b"gpg_user".as_slice());
        assert_eq!(cmd.to_bytes().as_ref(), &hex!("00DA005E 08 6770675F75736572"));

        let cmd = PutDataCommand::remove(tags::FINGERPRINT_SIGNATURE);
        assert_eq!(cmd.to_bytes().as_ref(), &hex!("00DA00C7"));
    }

    #[test]
    fn test_put_data_odd_blocks() {
        let content = vec![0x5A; 200];
        let blocks = PutDataOdd::new(tags::EXTENDED_HEADER_LIST, content)
            .blocks()
            .unwrap();

        assert_eq!(blocks.len(), 2);
        assert_eq!(&blocks[0].to_bytes()[..5], &hex!("10DB3FFF 80"));
        assert_eq!(&blocks[1].to_bytes()[..5], &hex!("00DB3FFF 48"));
    }

    #[test]
    fn test_put_data_odd_short_is_single_block() {
        let blocks = PutDataOdd::new(tags::EXTENDED_HEADER_LIST, hex!("4D02B600").to_vec())
            .blocks()
            .unwrap();

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].to_bytes().as_ref(), &hex!("00DB3FFF 04 4D02B600"));
    }
}
