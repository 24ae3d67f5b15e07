use bytes::Bytes;
use pgptoken_apdu_core::{ApduCommand, ExpectedLength, Response};

use super::{CardCommand, expect_success};
use crate::constants::{CLA_ISO, ins};
use crate::types::ResetMethod;
use crate::{Error, Result};

/// P2 of RESET RETRY COUNTER: always PW1
const PW1_REFERENCE: u8 = 0x81;

/// RESET RETRY COUNTER: unblock PW1 and set a new value
#[derive(Clone, PartialEq, Eq)]
pub struct ResetRetryCounterCommand {
    method: ResetMethod,
    data: Bytes,
}

impl std::fmt::Debug for ResetRetryCounterCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetRetryCounterCommand")
            .field("method", &self.method)
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl ResetRetryCounterCommand {
    /// Reset PW1; `data` is resetting code || new PW1, or just the new PW1
    /// when PW3 has been verified
    pub fn new(method: ResetMethod, data: impl Into<Bytes>) -> Self {
        Self {
            method,
            data: data.into(),
        }
    }
}

impl ApduCommand for ResetRetryCounterCommand {
    type Success = ();
    type Error = Error;

    fn class(&self) -> u8 {
        CLA_ISO
    }

    fn instruction(&self) -> u8 {
        ins::RESET_RETRY_COUNTER
    }

    fn p1(&self) -> u8 {
        self.method.p1()
    }

    fn p2(&self) -> u8 {
        PW1_REFERENCE
    }

    fn data(&self) -> Option<&[u8]> {
        Some(&self.data)
    }

    fn expected_length(&self) -> Option<ExpectedLength> {
        None
    }

    fn parse_response(response: Response) -> Result<()> {
        expect_success(Self::OPERATION, response).map(drop)
    }
}

impl CardCommand for ResetRetryCounterCommand {
    const OPERATION: &'static str = "RESET RETRY COUNTER";
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_reset_retry_counter_bytes() {
        let cmd = ResetRetryCounterCommand::new(ResetMethod::Admin, b"123456".as_slice());
        assert_eq!(cmd.to_bytes().as_ref(), &hex!("002C0281 06 313233343536"));

        let cmd = ResetRetryCounterCommand::new(ResetMethod::ResettingCode, b"87654321123456".as_slice());
        assert_eq!(cmd.p1(), 0x00);
        assert_eq!(cmd.p2(), 0x81);
    }
}
