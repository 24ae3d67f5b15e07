//! CCID transport implementation

use bytes::{Bytes, BytesMut};
use pgptoken_apdu_core::{CardTransport, TransportError};
use tracing::{debug, trace, warn};

use crate::config::CcidConfig;
use crate::descriptor::ExchangeLevel;
use crate::error::CcidError;
use crate::message::{
    CcidRequest, CcidResponse, ChainParameter, PARAM_CONTINUE_CHAIN, message_type, slot_status,
};
use crate::pipe::{BulkPipe, UsbBulkPipe};

/// ICC state reported by a slot status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IccStatus {
    /// Card present and powered
    Active,
    /// Card present but not powered
    Inactive,
    /// Slot is empty
    NotPresent,
    /// Any other status byte
    Unknown(u8),
}

impl From<u8> for IccStatus {
    fn from(status: u8) -> Self {
        match status {
            slot_status::ICC_PRESENT_ACTIVE => Self::Active,
            slot_status::ICC_PRESENT_INACTIVE => Self::Inactive,
            slot_status::ICC_NOT_PRESENT => Self::NotPresent,
            other => Self::Unknown(other),
        }
    }
}

/// Transport talking CCID over a bulk pipe
///
/// Owns the sequence counter of the reader. After a fatal error (timeout,
/// malformed message, chain violation) every exchange fails with
/// [`CcidError::Invalidated`] until [`CcidTransport::reset_device`] succeeds.
#[derive(Debug)]
pub struct CcidTransport<P: BulkPipe = UsbBulkPipe> {
    /// Bulk endpoints
    pipe: P,
    /// Configuration
    config: CcidConfig,
    /// Sequence number of the next bulk-out message
    sequence: u8,
    /// Exchange level advertised by the reader
    exchange_level: ExchangeLevel,
    /// Answer-to-reset from the last power-on
    atr: Option<Bytes>,
    /// Whether the card has been powered on
    powered: bool,
    /// Set by fatal errors, cleared by a successful reset
    invalidated: bool,
}

impl CcidTransport<UsbBulkPipe> {
    /// Open the first CCID reader on the bus and power its card on
    pub fn open_first(config: CcidConfig) -> Result<Self, CcidError> {
        Self::open(UsbBulkPipe::first_available()?, config)
    }
}

impl<P: BulkPipe> CcidTransport<P> {
    /// Wrap a pipe without touching the device
    ///
    /// The exchange level is read from the pipe's class descriptor; pipes
    /// without one are assumed to take short APDUs.
    pub fn new(pipe: P, config: CcidConfig) -> Result<Self, CcidError> {
        let exchange_level = pipe
            .class_descriptor()
            .map_or(Ok(ExchangeLevel::ShortApdu), ExchangeLevel::from_class_descriptor)?;
        debug!(?exchange_level, "CCID reader exchange level");

        Ok(Self {
            pipe,
            config,
            sequence: 0,
            exchange_level,
            atr: None,
            powered: false,
            invalidated: false,
        })
    }

    /// Wrap a pipe, query the slot and power the card on
    pub fn open(pipe: P, config: CcidConfig) -> Result<Self, CcidError> {
        let mut transport = Self::new(pipe, config)?;
        match transport.get_status()? {
            IccStatus::Active | IccStatus::Inactive => {
                transport.power_on()?;
            }
            IccStatus::NotPresent => return Err(CcidError::NoCard),
            IccStatus::Unknown(status) => return Err(CcidError::UnknownIccStatus(status)),
        }
        Ok(transport)
    }

    /// Answer-to-reset from the last power-on
    pub const fn atr(&self) -> Option<&Bytes> {
        self.atr.as_ref()
    }

    /// Exchange level advertised by the reader
    pub const fn exchange_level(&self) -> ExchangeLevel {
        self.exchange_level
    }

    /// Sequence number the next bulk-out message will carry
    pub const fn sequence(&self) -> u8 {
        self.sequence
    }

    /// Whether a fatal error requires a reset
    pub const fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    /// Get a reference to the underlying pipe
    pub const fn pipe(&self) -> &P {
        &self.pipe
    }

    /// Get a mutable reference to the underlying pipe
    pub const fn pipe_mut(&mut self) -> &mut P {
        &mut self.pipe
    }

    /// Power the card on and return its ATR
    pub fn power_on(&mut self) -> Result<Bytes, CcidError> {
        self.ensure_usable()?;
        let result = self.power_on_inner();
        self.check(result)
    }

    /// Power the card off and return the slot status byte
    pub fn power_off(&mut self) -> Result<u8, CcidError> {
        self.ensure_usable()?;
        let result = self
            .exchange(message_type::PC_TO_RDR_ICC_POWER_OFF, 0, 0, &[])
            .map(|response| response.status);
        self.powered = false;
        self.check(result)
    }

    /// Query the slot status
    pub fn get_status(&mut self) -> Result<IccStatus, CcidError> {
        self.ensure_usable()?;
        let result = self
            .exchange(message_type::PC_TO_RDR_GET_SLOT_STATUS, 0, 0, &[])
            .map(|response| IccStatus::from(response.status));
        self.check(result)
    }

    /// Send one command and return the reassembled response, status word included
    pub fn send_command(&mut self, command: &[u8]) -> Result<Bytes, CcidError> {
        self.ensure_usable()?;
        if !self.exchange_level.is_apdu() {
            return Err(CcidError::TpduUnsupported);
        }
        if command.len() > self.config.max_command_length {
            return Err(CcidError::CommandTooLong {
                len: command.len(),
                max: self.config.max_command_length,
            });
        }

        let result = self.send_command_inner(command);
        self.check(result)
    }

    /// Reset the USB device and power the card on again
    pub fn reset_device(&mut self) -> Result<Bytes, CcidError> {
        self.powered = false;
        self.atr = None;
        self.invalidated = true;

        self.pipe.reset()?;
        self.invalidated = false;
        self.power_on()
    }

    fn power_on_inner(&mut self) -> Result<Bytes, CcidError> {
        let power_select = self.config.voltage.power_select();
        let response = self.exchange(message_type::PC_TO_RDR_ICC_POWER_ON, power_select, 0, &[])?;

        if response.icc_status() == slot_status::ICC_NOT_PRESENT {
            return Err(CcidError::NoCard);
        }
        if response.is_failed() {
            return Err(CcidError::CommandFailed {
                status: response.status,
                error: response.error,
            });
        }

        debug!(atr = %hex::encode(&response.data), "ICC powered on");
        self.powered = true;
        self.atr = Some(response.data.clone());
        Ok(response.data)
    }

    fn send_command_inner(&mut self, command: &[u8]) -> Result<Bytes, CcidError> {
        self.write(message_type::PC_TO_RDR_XFR_BLOCK, 0, 0, command)?;
        let response = self.read_block()?;

        match ChainParameter::try_from(response.chain)? {
            ChainParameter::Single => Ok(response.data),
            ChainParameter::Begin => {
                let mut payload = BytesMut::from(response.data.as_ref());
                loop {
                    trace!(received = payload.len(), "Requesting next response block");
                    self.write(message_type::PC_TO_RDR_XFR_BLOCK, 0, PARAM_CONTINUE_CHAIN, &[])?;
                    let block = self.read_block()?;
                    payload.extend_from_slice(&block.data);

                    match block.chain {
                        0x02 => break,
                        0x03 => continue,
                        other => return Err(CcidError::UnexpectedChain(other)),
                    }
                }
                Ok(payload.freeze())
            }
            ChainParameter::End | ChainParameter::Continue => {
                Err(CcidError::UnexpectedChain(response.chain))
            }
        }
    }

    /// Read a data block answer, waiting out time extensions
    fn read_block(&mut self) -> Result<CcidResponse, CcidError> {
        let mut response = self.read()?;
        while response.is_time_extension() {
            trace!("Reader requested time extension");
            response = self.read()?;
        }

        if response.is_failed() {
            return Err(if response.icc_status() == slot_status::ICC_NOT_PRESENT {
                CcidError::NoCard
            } else {
                CcidError::CommandFailed {
                    status: response.status,
                    error: response.error,
                }
            });
        }
        Ok(response)
    }

    fn exchange(
        &mut self,
        msg_type: u8,
        rsv: u8,
        param: u16,
        data: &[u8],
    ) -> Result<CcidResponse, CcidError> {
        self.write(msg_type, rsv, param, data)?;
        self.read()
    }

    fn write(&mut self, msg_type: u8, rsv: u8, param: u16, data: &[u8]) -> Result<(), CcidError> {
        let seq = self.next_sequence();
        let message = CcidRequest::new(msg_type, self.config.slot, seq)
            .with_rsv(rsv)
            .with_param(param)
            .with_data(data)
            .encode();
        self.pipe.write(&message, self.config.timeout)
    }

    fn read(&mut self) -> Result<CcidResponse, CcidError> {
        let mut buffer = vec![0u8; self.config.read_buffer_size];
        let read = self.pipe.read(&mut buffer, self.config.timeout)?;
        CcidResponse::parse(&buffer[..read])
    }

    /// Get the next sequence number.
    fn next_sequence(&mut self) -> u8 {
        let seq = self.sequence;
        self.sequence = self.sequence.wrapping_add(1);
        seq
    }

    const fn ensure_usable(&self) -> Result<(), CcidError> {
        if self.invalidated {
            return Err(CcidError::Invalidated);
        }
        Ok(())
    }

    fn check<T>(&mut self, result: Result<T, CcidError>) -> Result<T, CcidError> {
        if let Err(e) = &result {
            if e.is_fatal() {
                warn!(error = %e, "Fatal CCID error, session invalidated");
                self.invalidated = true;
                self.powered = false;
            }
        }
        result
    }
}

impl<P: BulkPipe> CardTransport for CcidTransport<P> {
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        self.send_command(command).map_err(TransportError::from)
    }

    fn is_connected(&self) -> bool {
        self.powered && !self.invalidated
    }

    fn reset(&mut self) -> Result<(), TransportError> {
        self.reset_device().map(|_| ()).map_err(Into::into)
    }
}

impl<P: BulkPipe> Drop for CcidTransport<P> {
    fn drop(&mut self) {
        if self.powered && !self.invalidated {
            if let Err(e) = self.power_off() {
                debug!(error = %e, "Power-off on drop failed");
            }
        }
    }
}
