use bytes::Bytes;
use pgptoken_apdu_core::{ApduCommand, Command, ExpectedLength, Response};

use super::{CardCommand, expect_success, split_chained};
use crate::constants::{BINARY_RECORD_SIZE, CLA_ISO, ins};
use crate::{Error, Result};

/// P1 flag selecting a file by short identifier
const SHORT_FILE_ID: u8 = 0x80;

/// READ BINARY of a whole file selected by short identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadBinaryCommand {
    file_id: u8,
}

impl ReadBinaryCommand {
    /// Read file `file_id`
    pub const fn new(file_id: u8) -> Self {
        Self { file_id }
    }
}

impl ApduCommand for ReadBinaryCommand {
    type Success = Bytes;
    type Error = Error;

    fn class(&self) -> u8 {
        CLA_ISO
    }

    fn instruction(&self) -> u8 {
        ins::READ_BINARY
    }

    fn p1(&self) -> u8 {
        SHORT_FILE_ID + self.file_id
    }

    fn p2(&self) -> u8 {
        0x00
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

impl CardCommand for ReadBinaryCommand {
    const OPERATION: &'static str = "READ BINARY";
}

/// WRITE BINARY or UPDATE BINARY of a whole file
///
/// Data goes out in 256-byte records. The first record selects the file
/// with `P1 = 0x80 + file_id`; record `n` after it carries `P1 = n`. Each
/// record over 128 bytes is sent as a chained pair.
///
/// Record numbers stop at `0x7F`: a P1 with bit 8 set selects a file by
/// short identifier, so the card would start the file over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteBinary {
    file_id: u8,
    data: Bytes,
    update: bool,
}

impl WriteBinary {
    /// Operation name used in errors
    pub const OPERATION: &'static str = "WRITE BINARY";

    /// Largest file the record numbering can address
    pub const MAX_LEN: usize = BINARY_RECORD_SIZE * 0x80;

    /// Write `data` to `file_id`, with UPDATE BINARY when `update` is set
    pub fn new(file_id: u8, data: impl Into<Bytes>, update: bool) -> Self {
        Self {
            file_id,
            data: data.into(),
            update,
        }
    }

    const fn instruction(&self) -> u8 {
        if self.update {
            ins::UPDATE_BINARY
        } else {
            ins::WRITE_BINARY
        }
    }

    /// APDUs of every record, in order
    pub fn records(&self) -> Result<Vec<Vec<Command>>> {
        if self.data.len() > Self::MAX_LEN {
            return Err(Error::DataTooLong {
                operation: Self::OPERATION,
                len: self.data.len(),
                max: Self::MAX_LEN,
            });
        }

        (0..self.data.len())
            .step_by(BINARY_RECORD_SIZE)
            .enumerate()
            .map(|(count, offset)| {
                let p1 = if count == 0 {
                    SHORT_FILE_ID + self.file_id
                } else {
                    count as u8
                };
                let end = (offset + BINARY_RECORD_SIZE).min(self.data.len());
                split_chained(
                    Self::OPERATION,
                    self.instruction(),
                    p1,
                    0x00,
                    self.data.slice(offset..end),
                )
            })
            .collect()
    }
}
