//! GET RESPONSE continuation handling
//!
//! When a card answers `61 XX` it holds `XX` more response bytes that must be
//! fetched with GET RESPONSE (`INS=0xC0`) before the exchange is complete.

use std::fmt;

use tracing::{debug, trace};

use crate::transport::CardTransport;
use crate::{ApduCommand, Command, Error, Response, Result, ResultExt};

/// GET RESPONSE instruction byte
pub const GET_RESPONSE_INS: u8 = 0xC0;

/// GET RESPONSE command processor
///
/// Sends GET RESPONSE commands while the card reports `61 XX`, accumulating
/// every returned block. The loop ends on `90 00`; any other status word
/// aborts with [`Error::Status`].
#[derive(Clone, Copy)]
pub struct GetResponseProcessor {
    /// Maximum number of GET RESPONSE exchanges for one command
    pub max_chain: usize,
    /// Class byte for GET RESPONSE command
    pub cla: u8,
}

impl Default for GetResponseProcessor {
    fn default() -> Self {
        Self {
            max_chain: 64,
            cla: 0x00,
        }
    }
}

impl fmt::Debug for GetResponseProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetResponseProcessor")
            .field("max_chain", &self.max_chain)
            .field("cla", &format!("{:#04x}", self.cla))
            .finish()
    }
}

impl GetResponseProcessor {
    /// Set the chain limit
    pub const fn with_max_chain(mut self, max_chain: usize) -> Self {
        self.max_chain = max_chain;
        self
    }

    /// Build the GET RESPONSE command for `expected_len` bytes
    pub const fn command(&self, expected_len: u8) -> Command {
        Command::new_with_le(self.cla, GET_RESPONSE_INS, 0x00, 0x00, expected_len)
    }

    /// Fetch `expected_len` bytes and everything that follows them
    ///
    /// Returns the concatenated payload of every GET RESPONSE block once the
    /// card reports `90 00`.
    pub fn fetch<T: CardTransport + ?Sized>(
        &self,
        transport: &mut T,
        expected_len: u8,
    ) -> Result<Response> {
        self.follow(transport, Response::new(bytes::Bytes::new(), (0x61, expected_len)))
    }

    /// Continue an exchange whose response ended in `61 XX`
    ///
    /// Any payload already present in `response` is kept in front of the
    /// fetched blocks. A response that does not ask for continuation is
    /// returned unchanged.
    pub fn follow<T: CardTransport + ?Sized>(
        &self,
        transport: &mut T,
        mut response: Response,
    ) -> Result<Response> {
        let mut chain_count = 0;

        while let Some(le) = response.bytes_available() {
            if chain_count >= self.max_chain {
                debug!(max_chain = self.max_chain, "GET RESPONSE chain limit hit");
                return Err(Error::ChainLimitExceeded);
            }

            trace!(le, chain_count, "Sending GET RESPONSE");
            let bytes = self.command(le).to_bytes();
            let response_bytes = transport
                .transmit_raw(&bytes)
                .context("Failed to transmit GET RESPONSE command")?;
            let next = Response::from_bytes(&response_bytes)
                .context("Failed to parse GET RESPONSE response")?;

            let status = next.status();
            if !status.is_success() && !status.is_more_data_available() {
                debug!(%status, "GET RESPONSE aborted");
                return Err(Error::Status(status));
            }

            response.extend(next);
            chain_count += 1;
        }

        Ok(response)
    }
}
