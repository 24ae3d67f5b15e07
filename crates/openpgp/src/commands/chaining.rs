//! Command chaining for data that does not fit one short APDU
//!
//! The card accepts a command split in two: a first block carrying exactly
//! [`CHAIN_BLOCK_SIZE`] bytes with `CLA = 0x10`, then a closing block with
//! `CLA = 0x00` carrying the rest.

use bytes::Bytes;
use pgptoken_apdu_core::{Command, MAX_SHORT_DATA};

use crate::constants::{CHAIN_BLOCK_SIZE, CLA_CHAIN, CLA_ISO};
use crate::{Error, Result};

/// Split `data` into the APDUs of one logical command
///
/// Data up to [`CHAIN_BLOCK_SIZE`] bytes goes out as a single unchained
/// APDU. Longer data becomes a chained first block and a closing block;
/// a closing block over 255 bytes is rejected before anything is sent.
pub fn split_chained(
    operation: &'static str,
    ins: u8,
    p1: u8,
    p2: u8,
    data: Bytes,
) -> Result<Vec<Command>> {
    if data.len() <= CHAIN_BLOCK_SIZE {
        return Ok(vec![Command::new_with_data(CLA_ISO, ins, p1, p2, data)]);
    }

    let max = CHAIN_BLOCK_SIZE + MAX_SHORT_DATA;
    if data.len() > max {
        return Err(Error::DataTooLong {
            operation,
            len: data.len(),
            max,
        });
    }

    Ok(vec![
        Command::new_with_data(CLA_CHAIN, ins, p1, p2, data.slice(..CHAIN_BLOCK_SIZE)),
        Command::new_with_data(CLA_ISO, ins, p1, p2, data.slice(CHAIN_BLOCK_SIZE..)),
    ])
}
