//! CCID bulk message framing
//!
//! Every bulk-out message carries a 10-byte header followed by optional data:
//!
//! ```text
//! Offset  Size  Description
//! 0       1     Message type
//! 1       4     Data length (little-endian)
//! 5       1     Slot number
//! 6       1     Sequence number
//! 7       1     Message-specific byte (power select for power-on)
//! 8       2     Message-specific parameter (little-endian)
//! 10      N     Data
//! ```
//!
//! Bulk-in messages share the first 7 bytes; bytes 7, 8 and 9 hold the slot
//! status, the slot error and the chain parameter.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::CcidError;

/// CCID header size in bytes
pub const CCID_HEADER_SIZE: usize = 10;

/// CCID message types
pub mod message_type {
    /// PC to Reader: ICC power on
    pub const PC_TO_RDR_ICC_POWER_ON: u8 = 0x62;
    /// PC to Reader: ICC power off
    pub const PC_TO_RDR_ICC_POWER_OFF: u8 = 0x63;
    /// PC to Reader: get slot status
    pub const PC_TO_RDR_GET_SLOT_STATUS: u8 = 0x65;
    /// PC to Reader: transfer block
    pub const PC_TO_RDR_XFR_BLOCK: u8 = 0x6F;
    /// Reader to PC: data block
    pub const RDR_TO_PC_DATA_BLOCK: u8 = 0x80;
    /// Reader to PC: slot status
    pub const RDR_TO_PC_SLOT_STATUS: u8 = 0x81;
}

/// Slot status byte layout
pub mod slot_status {
    /// bmICCStatus mask
    pub const ICC_STATUS_MASK: u8 = 0x03;
    /// Card present and active
    pub const ICC_PRESENT_ACTIVE: u8 = 0x00;
    /// Card present but inactive
    pub const ICC_PRESENT_INACTIVE: u8 = 0x01;
    /// No card present
    pub const ICC_NOT_PRESENT: u8 = 0x02;
    /// bmCommandStatus mask
    pub const COMMAND_STATUS_MASK: u8 = 0xC0;
    /// Command failed, see bError
    pub const COMMAND_FAILED: u8 = 0x40;
    /// Time extension requested, the answer is still coming
    pub const TIME_EXTENSION: u8 = 0x80;
}

/// `wLevelParameter` asking the reader for the next block of a chained response
pub const PARAM_CONTINUE_CHAIN: u16 = 0x0010;

/// Chain parameter of a bulk-in data block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainParameter {
    /// Complete response in this block
    Single,
    /// First block of a chained response
    Begin,
    /// Last block of a chained response
    End,
    /// Intermediate block of a chained response
    Continue,
}

impl TryFrom<u8> for ChainParameter {
    type Error = CcidError;

    fn try_from(value: u8) -> Result<Self, CcidError> {
        match value {
            0x00 => Ok(Self::Single),
            0x01 => Ok(Self::Begin),
            0x02 => Ok(Self::End),
            0x03 => Ok(Self::Continue),
            other => Err(CcidError::UnexpectedChain(other)),
        }
    }
}

/// Bulk-out message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CcidRequest<'a> {
    /// Message type
    pub msg_type: u8,
    /// Slot number
    pub slot: u8,
    /// Sequence number
    pub seq: u8,
    /// Message-specific byte 7
    pub rsv: u8,
    /// Message-specific parameter, bytes 8-9
    pub param: u16,
    /// Message data
    pub data: &'a [u8],
}

impl<'a> CcidRequest<'a> {
    /// Create a request with no data and zeroed parameters
    pub const fn new(msg_type: u8, slot: u8, seq: u8) -> Self {
        Self {
            msg_type,
            slot,
            seq,
            rsv: 0,
            param: 0,
            data: &[],
        }
    }

    /// Set the message-specific byte 7
    pub const fn with_rsv(mut self, rsv: u8) -> Self {
        self.rsv = rsv;
        self
    }

    /// Set the message-specific parameter
    pub const fn with_param(mut self, param: u16) -> Self {
        self.param = param;
        self
    }

    /// Attach data to the message
    pub const fn with_data(mut self, data: &'a [u8]) -> Self {
        self.data = data;
        self
    }

    /// Serialize to wire bytes
    pub fn encode(&self) -> Bytes {
        let mut buffer = BytesMut::with_capacity(CCID_HEADER_SIZE + self.data.len());
        buffer.put_u8(self.msg_type);
        buffer.put_u32_le(self.data.len() as u32);
        buffer.put_u8(self.slot);
        buffer.put_u8(self.seq);
        buffer.put_u8(self.rsv);
        buffer.put_u16_le(self.param);
        buffer.put_slice(self.data);
        buffer.freeze()
    }
}

/// Bulk-in message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CcidResponse {
    /// Message type
    pub msg_type: u8,
    /// Slot number
    pub slot: u8,
    /// Sequence number echoed by the reader
    pub seq: u8,
    /// Slot status byte
    pub status: u8,
    /// Slot error byte
    pub error: u8,
    /// Chain parameter byte, unvalidated
    pub chain: u8,
    /// Message data
    pub data: Bytes,
}

impl CcidResponse {
    /// Parse a bulk-in message
    ///
    /// Messages shorter than the header, or shorter than the data length they
    /// announce, are malformed.
    pub fn parse(message: &[u8]) -> Result<Self, CcidError> {
        if message.len() < CCID_HEADER_SIZE {
            return Err(CcidError::Malformed(message.len()));
        }

        let data_len =
            u32::from_le_bytes([message[1], message[2], message[3], message[4]]) as usize;
        let data = message[CCID_HEADER_SIZE..]
            .get(..data_len)
            .ok_or(CcidError::Malformed(message.len()))?;

        Ok(Self {
            msg_type: message[0],
            slot: message[5],
            seq: message[6],
            status: message[7],
            error: message[8],
            chain: message[9],
            data: Bytes::copy_from_slice(data),
        })
    }

    /// bmICCStatus bits of the slot status
    pub const fn icc_status(&self) -> u8 {
        self.status & slot_status::ICC_STATUS_MASK
    }

    /// Whether the reader asked for more time before answering
    pub const fn is_time_extension(&self) -> bool {
        self.status & slot_status::COMMAND_STATUS_MASK == slot_status::TIME_EXTENSION
    }

    /// Whether the reader reports a failed command
    pub const fn is_failed(&self) -> bool {
        self.status & slot_status::COMMAND_STATUS_MASK == slot_status::COMMAND_FAILED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_encode_xfr_block() {
        let apdu = hex!("00CA005E");
        let msg = CcidRequest::new(message_type::PC_TO_RDR_XFR_BLOCK, 0, 0x2A)
            .with_data(&apdu)
            .encode();
        assert_eq!(msg.as_ref(), &hex!("6F 04000000 00 2A 00 0000 00CA005E"));
    }

    #[test]
    fn test_encode_continuation_and_power_on() {
        let msg = CcidRequest::new(message_type::PC_TO_RDR_XFR_BLOCK, 0, 0xFF)
            .with_param(PARAM_CONTINUE_CHAIN)
            .encode();
        assert_eq!(msg.as_ref(), &hex!("6F 00000000 00 FF 00 1000"));

        let msg = CcidRequest::new(message_type::PC_TO_RDR_ICC_POWER_ON, 0, 1)
            .with_rsv(0x01)
            .encode();
        assert_eq!(msg.as_ref(), &hex!("62 00000000 00 01 01 0000"));
    }

    #[test]
    fn test_parse_data_block() {
        let resp = CcidResponse::parse(&hex!("80 03000000 00 07 00 00 00 AABB90")).unwrap();
        assert_eq!(resp.msg_type, message_type::RDR_TO_PC_DATA_BLOCK);
        assert_eq!(resp.seq, 0x07);
        assert_eq!(resp.chain, 0);
        assert_eq!(resp.data.as_ref(), &hex!("AABB90"));
        assert_eq!(resp.icc_status(), slot_status::ICC_PRESENT_ACTIVE);
        assert!(!resp.is_time_extension());
    }

    #[test]
    fn test_parse_status_bits() {
        let resp = CcidResponse::parse(&hex!("80 00000000 00 00 80 00 00")).unwrap();
        assert!(resp.is_time_extension());

        let resp = CcidResponse::parse(&hex!("81 00000000 00 00 42 FE 00")).unwrap();
        assert!(resp.is_failed());
        assert_eq!(resp.icc_status(), slot_status::ICC_NOT_PRESENT);
    }

    #[test]
    fn test_parse_rejects_short_messages() {
        assert!(matches!(
            CcidResponse::parse(&hex!("80 00000000 00 00 00")),
            Err(CcidError::Malformed(9))
        ));
        assert!(matches!(
            CcidResponse::parse(&hex!("80 05000000 00 00 00 00 00 0102")),
            Err(CcidError::Malformed(12))
        ));
    }

    #[test]
    fn test_chain_parameter() {
        assert_eq!(ChainParameter::try_from(0).unwrap(), ChainParameter::Single);
        assert_eq!(ChainParameter::try_from(3).unwrap(), ChainParameter::Continue);
        assert!(matches!(
            ChainParameter::try_from(0x10),
            Err(CcidError::UnexpectedChain(0x10))
        ));
    }
}
