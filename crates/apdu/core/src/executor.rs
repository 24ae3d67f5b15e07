//! Executor for APDU command execution
//!
//! [`CardExecutor`] owns a transport and turns commands into complete
//! responses, following `61 XX` continuations on the way.

use bytes::Bytes;
use tracing::{debug, instrument, trace};

use crate::command::ApduCommand;
use crate::processor::GetResponseProcessor;
use crate::transport::CardTransport;
use crate::{Response, Result, ResultExt};

/// Card executor combining a transport with GET RESPONSE handling
#[derive(Debug)]
pub struct CardExecutor<T: CardTransport> {
    /// The transport used for communication
    transport: T,
    /// GET RESPONSE loop settings
    get_response: GetResponseProcessor,
}

impl<T: CardTransport> CardExecutor<T> {
    /// Create a new card executor with the given transport
    pub fn new(transport: T) -> Self {
        Self::with_processor(transport, GetResponseProcessor::default())
    }

    /// Create a new card executor with a custom GET RESPONSE processor
    pub const fn with_processor(transport: T, get_response: GetResponseProcessor) -> Self {
        Self {
            transport,
            get_response,
        }
    }

    /// Get a reference to the underlying transport
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a mutable reference to the underlying transport
    pub const fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Take ownership of the transport and return it
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Send raw command bytes and split the answer into payload and status
    ///
    /// No GET RESPONSE handling happens here.
    pub fn transmit_raw(&mut self, command: &[u8]) -> Result<Response> {
        let response_bytes = self
            .transport
            .transmit_raw(command)
            .context("Failed to transmit command")?;
        Response::from_bytes(&response_bytes)
    }

    /// Fetch pending response data announced by a `61 XX` status word
    ///
    /// Loops GET RESPONSE until `90 00` and returns the accumulated data.
    pub fn get_response(&mut self, expected_len: u8) -> Result<Bytes> {
        let response = self.get_response.fetch(&mut self.transport, expected_len)?;
        Ok(response.payload().clone())
    }

    /// Transmit a command and return the completed response
    ///
    /// The command is validated before anything reaches the card. A `61 XX`
    /// answer is followed with GET RESPONSE; the final response is returned
    /// whatever its status word so callers can interpret it.
    #[instrument(level = "trace", skip_all, fields(ins = command.instruction()))]
    pub fn transmit<C: ApduCommand>(&mut self, command: &C) -> Result<Response> {
        command.validate()?;

        let bytes = command.to_bytes();
        trace!(command = %hex::encode(&bytes), "Transmitting command");

        let response = self.transmit_raw(&bytes)?;
        let response = if response.more_data_available() {
            debug!(
                available = response.bytes_available(),
                "Card has more data, following with GET RESPONSE"
            );
            self.get_response.follow(&mut self.transport, response)?
        } else {
            response
        };

        let status = response.status();
        if status.is_success() {
            trace!(len = response.payload().len(), "Command complete");
        } else {
            debug!(%status, description = status.description(), "Command returned error status");
        }

        Ok(response)
    }

    /// Execute a typed APDU command
    pub fn execute<C: ApduCommand>(&mut self, command: &C) -> core::result::Result<C::Success, C::Error> {
        let response = self.transmit(command)?;
        C::parse_response(response)
    }

    /// Reset the underlying transport
    pub fn reset(&mut self) -> Result<()> {
        debug!("Resetting card transport");
        Ok(self.transport.reset()?)
    }
}
