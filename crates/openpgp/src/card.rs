//! OpenPGP card session
//!
//! [`OpenPgpCard`] owns the executor (and through it the transport) and
//! exposes one method per card command. It tracks which passwords the card
//! currently considers verified.

use bytes::Bytes;
use pgptoken_apdu_core::{CardExecutor, CardTransport, Command, Response};
use tracing::{debug, warn};

use crate::commands::*;
use crate::constants::{pso, tags};
use crate::types::{KeySlot, PasswordRole, ResetMethod, RsaKeyMaterial, RsaPublicKey};
use crate::{Error, Result};

/// Passwords verified in the current session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthState {
    /// PW1 verified for signing
    pub user_sign: bool,
    /// PW1 verified for other operations
    pub user: bool,
    /// PW3 verified
    pub admin: bool,
}

impl AuthState {
    /// Whether `role` has been verified
    pub const fn is_verified(&self, role: PasswordRole) -> bool {
        match role {
            PasswordRole::UserSign => self.user_sign,
            PasswordRole::User => self.user,
            PasswordRole::Admin => self.admin,
        }
    }

    const fn set(&mut self, role: PasswordRole) {
        match role {
            PasswordRole::UserSign => self.user_sign = true,
            PasswordRole::User => self.user = true,
            PasswordRole::Admin => self.admin = true,
        }
    }
}

/// Session with the OpenPGP application of a token
///
/// Every operation takes `&mut self`, so at most one command is in flight.
#[derive(Debug)]
pub struct OpenPgpCard<T: CardTransport> {
    /// Command executor
    executor: CardExecutor<T>,
    /// Whether the OpenPGP application is selected
    selected: bool,
    /// Verified passwords
    auth: AuthState,
}

impl<T: CardTransport> OpenPgpCard<T> {
    /// Start a session on `transport` and select the OpenPGP application
    pub fn open(transport: T) -> Result<Self> {
        Self::with_executor(CardExecutor::new(transport))
    }

    /// Start a session on a configured executor and select the OpenPGP application
    pub fn with_executor(executor: CardExecutor<T>) -> Result<Self> {
        let mut card = Self {
            executor,
            selected: false,
            auth: AuthState::default(),
        };
        card.select_openpgp()?;
        Ok(card)
    }

    /// Get a reference to the executor
    pub const fn executor(&self) -> &CardExecutor<T> {
        &self.executor
    }

    /// Get a mutable reference to the executor
    pub const fn executor_mut(&mut self) -> &mut CardExecutor<T> {
        &mut self.executor
    }

    /// Get a reference to the underlying transport
    pub const fn transport(&self) -> &T {
        self.executor.transport()
    }

    /// Whether the OpenPGP application is selected
    pub const fn is_selected(&self) -> bool {
        self.selected
    }

    /// Passwords verified in this session
    pub const fn auth_state(&self) -> AuthState {
        self.auth
    }

    /// Whether `role` has been verified in this session
    pub const fn is_verified(&self, role: PasswordRole) -> bool {
        self.auth.is_verified(role)
    }

    /// End the session and hand back the transport
    pub fn close(self) -> T {
        self.executor.into_transport()
    }

    /// Reset the transport and select the OpenPGP application again
    pub fn reset(&mut self) -> Result<()> {
        self.selected = false;
        self.auth = AuthState::default();
        self.executor
            .reset()
            .map_err(|e| Error::from_apdu("reset", e))?;
        self.select_openpgp()
    }

    /// SELECT the OpenPGP application
    ///
    /// Clears every verified password.
    pub fn select_openpgp(&mut self) -> Result<()> {
        self.auth = AuthState::default();
        self.selected = false;
        self.execute(&SelectCommand::openpgp())?;
        self.selected = true;
        debug!("OpenPGP application selected");
        Ok(())
    }

    /// VERIFY a password
    ///
    /// On failure the session's verified state is left unchanged;
    /// [`Error::Blocked`] reports an exhausted retry counter.
    pub fn verify(&mut self, role: PasswordRole, secret: &[u8]) -> Result<()> {
        let command = VerifyCommand::new(role, Bytes::copy_from_slice(secret));
        match self.execute(&command) {
            Ok(()) => {
                debug!(?role, "Password verified");
                self.auth.set(role);
                Ok(())
            }
            Err(e) => {
                if let Some(retries) = e.status_word().and_then(|sw| sw.retries_remaining()) {
                    warn!(?role, retries, "Password verification failed");
                }
                Err(e)
            }
        }
    }

    /// CHANGE REFERENCE DATA; `data` is the current password || the new one
    pub fn change_reference_data(&mut self, role: PasswordRole, data: &[u8]) -> Result<()> {
        self.execute(&ChangeReferenceDataCommand::new(
            role,
            Bytes::copy_from_slice(data),
        ))
    }

    /// RESET RETRY COUNTER of PW1
    pub fn reset_retry_counter(&mut self, method: ResetMethod, data: &[u8]) -> Result<()> {
        self.execute(&ResetRetryCounterCommand::new(
            method,
            Bytes::copy_from_slice(data),
        ))
    }

    /// GET DATA; an object the card holds but which is empty reads as no bytes
    pub fn get_data(&mut self, tag: u16) -> Result<Bytes> {
        self.execute(&GetDataCommand::new(tag))
    }

    /// PUT DATA, content up to 255 bytes
    pub fn put_data(&mut self, tag: u16, content: &[u8]) -> Result<()> {
        self.execute(&PutDataCommand::new(tag, Bytes::copy_from_slice(content)))
    }

    /// Delete a data object with an empty PUT DATA
    pub fn remove_data(&mut self, tag: u16) -> Result<()> {
        self.execute(&PutDataCommand::remove(tag))
    }

    /// PUT DATA with the odd instruction, chained when over 128 bytes
    ///
    /// If the first block is accepted and the second rejected, the card may
    /// hold partial state and [`Error::PartialWrite`] is returned.
    pub fn put_data_odd(&mut self, tag: u16, content: &[u8]) -> Result<()> {
        let blocks = PutDataOdd::new(tag, Bytes::copy_from_slice(content)).blocks()?;
        self.send_chain(PutDataOdd::OPERATION, &blocks, true)
            .map(drop)
    }

    /// PERFORM SECURITY OPERATION with data up to 255 bytes
    pub fn pso(&mut self, p1: u8, p2: u8, data: &[u8]) -> Result<Bytes> {
        self.execute(&PsoCommand::new(p1, p2, Bytes::copy_from_slice(data)))
    }

    /// PERFORM SECURITY OPERATION with data sent as a chained pair
    ///
    /// The result is the response to the closing block.
    pub fn pso_longdata(&mut self, p1: u8, p2: u8, data: &[u8]) -> Result<Bytes> {
        let blocks = PsoCommand::new(p1, p2, Bytes::copy_from_slice(data)).blocks()?;
        self.send_chain(PsoCommand::OPERATION, &blocks, false)
    }

    /// PSO:COMPUTE DIGITAL SIGNATURE
    pub fn compute_digital_signature(&mut self, digest_info: &[u8]) -> Result<Bytes> {
        let (p1, p2) = pso::COMPUTE_DIGITAL_SIGNATURE;
        self.pso_by_length(p1, p2, digest_info)
    }

    /// PSO:DECIPHER; `data` starts with the padding indicator byte
    pub fn decipher(&mut self, data: &[u8]) -> Result<Bytes> {
        let (p1, p2) = pso::DECIPHER;
        self.pso_by_length(p1, p2, data)
    }

    /// INTERNAL AUTHENTICATE
    pub fn internal_authenticate(&mut self, data: &[u8]) -> Result<Bytes> {
        self.execute(&InternalAuthenticateCommand::new(Bytes::copy_from_slice(
            data,
        )))
    }

    /// EXTERNAL AUTHENTICATE with a signature over the last challenge
    pub fn external_authenticate(&mut self, keyno: u8, signed: &[u8]) -> Result<()> {
        let blocks = ExternalAuthenticate::new(keyno, Bytes::copy_from_slice(signed)).blocks()?;
        self.send_chain(ExternalAuthenticate::OPERATION, &blocks, false)
            .map(drop)
    }

    /// Generate a new RSA-2048 key pair in `slot` and return its public key
    pub fn generate_key_pair(&mut self, slot: KeySlot) -> Result<RsaPublicKey> {
        debug!(?slot, "Generating key pair");
        let key = self.execute(&GenerateKeyPairCommand::generate(slot))?;
        debug!(?slot, exponent = %hex::encode(&key.exponent), "Key pair generated");
        Ok(key)
    }

    /// Read the RSA-2048 public key of `slot`
    pub fn get_public_key(&mut self, slot: KeySlot) -> Result<RsaPublicKey> {
        self.execute(&GenerateKeyPairCommand::read_public_key(slot))
    }

    /// Import an RSA private key into `slot`
    pub fn import_rsa_key(&mut self, slot: KeySlot, key: &RsaKeyMaterial) -> Result<()> {
        let template = key.import_template(slot)?;
        self.put_data_odd(tags::EXTENDED_HEADER_LIST, &template)
    }

    /// Delete the private key in `slot`
    pub fn remove_key(&mut self, slot: KeySlot) -> Result<()> {
        let [crt, zero] = slot.crt();
        self.put_data_odd(
            tags::EXTENDED_HEADER_LIST,
            &[tags::TEMPLATE_EXTENDED_HEADER, 0x02, crt, zero],
        )
    }

    /// READ BINARY of a whole file
    pub fn read_binary(&mut self, file_id: u8) -> Result<Bytes> {
        self.execute(&ReadBinaryCommand::new(file_id))
    }

    /// WRITE BINARY, or UPDATE BINARY when `is_update` is set
    ///
    /// Stops at the first rejected record. A rejection after any block was
    /// accepted is reported as [`Error::PartialWrite`].
    pub fn write_binary(&mut self, file_id: u8, data: &[u8], is_update: bool) -> Result<()> {
        let records = WriteBinary::new(file_id, Bytes::copy_from_slice(data), is_update).records()?;
        for (index, blocks) in records.iter().enumerate() {
            self.send_chain(WriteBinary::OPERATION, blocks, true)
                .map_err(|e| match e {
                    Error::Status { operation, status } if index > 0 => {
                        Error::PartialWrite { operation, status }
                    }
                    other => other,
                })?;
        }
        Ok(())
    }

    /// GET CHALLENGE
    pub fn get_challenge(&mut self) -> Result<Bytes> {
        self.execute(&GetChallengeCommand::new())
    }

    fn pso_by_length(&mut self, p1: u8, p2: u8, data: &[u8]) -> Result<Bytes> {
        if data.len() > pgptoken_apdu_core::MAX_SHORT_DATA {
            self.pso_longdata(p1, p2, data)
        } else {
            self.pso(p1, p2, data)
        }
    }

    /// Transmit a typed command and interpret its response
    fn execute<C: CardCommand>(&mut self, command: &C) -> Result<C::Success> {
        let response = self
            .executor
            .transmit(command)
            .map_err(|e| Error::from_apdu(C::OPERATION, e))?;
        C::parse_response(response)
    }

    /// Send the blocks of one logical command, returning the last block's data
    ///
    /// With `partial_write` set, a rejected closing block after an accepted
    /// first block is reported as [`Error::PartialWrite`].
    fn send_chain(
        &mut self,
        operation: &'static str,
        blocks: &[Command],
        partial_write: bool,
    ) -> Result<Bytes> {
        let mut payload = Bytes::new();
        for (index, block) in blocks.iter().enumerate() {
            let response: Response = self
                .executor
                .transmit(block)
                .map_err(|e| Error::from_apdu(operation, e))?;

            if !response.is_success() {
                let status = response.status();
                if partial_write && index > 0 {
                    warn!(operation, %status, "Closing block rejected after first block was accepted");
                    return Err(Error::PartialWrite { operation, status });
                }
                return Err(Error::from_status(operation, status));
            }
            payload = response.payload().clone();
        }
        Ok(payload)
    }
}
