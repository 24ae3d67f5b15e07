//! Simulated token for full-stack tests
//!
//! [`SimulatedReader`] speaks CCID over an in-memory bulk pipe and forwards
//! data blocks to [`SimulatedCard`], a small OpenPGP application.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use pgptoken_apdu_core::Command;
use pgptoken_openpgp::{OpenPgpCard, tags};
use pgptoken_transport_ccid::message::{
    CCID_HEADER_SIZE, PARAM_CONTINUE_CHAIN, message_type, slot_status,
};
use pgptoken_transport_ccid::{BulkPipe, CcidConfig, CcidError, CcidTransport};

pub const PW1: &[u8] = b"123456";
pub const PW3: &[u8] = b"12345678";

const ATR: &[u8] = b"\x3B\xDA\x11\xFF\x81\xB1\xFE\x55\x1F\x03\x00\x31\x84\x73\x80\x01\x80\x00\x90\x00\xE4";
const OPENPGP_AID: &[u8] = b"\xD2\x76\x00\x01\x24\x01";
const MAX_RETRIES: u8 = 3;

/// Data objects the application defines; absent ones read as empty
const KNOWN_OBJECTS: &[u16] = &[
    tags::LOGIN_DATA,
    tags::NAME,
    tags::LANGUAGE,
    tags::SEX,
    tags::URL,
    tags::FINGERPRINT_SIGNATURE,
    tags::FINGERPRINT_DECRYPTION,
    tags::FINGERPRINT_AUTHENTICATION,
    tags::GENERATION_TIME_SIGNATURE,
    tags::GENERATION_TIME_DECRYPTION,
    tags::GENERATION_TIME_AUTHENTICATION,
    tags::CARDHOLDER_CERTIFICATE,
];

pub type SimulatedSession = OpenPgpCard<CcidTransport<SimulatedReader>>;

/// Install a test subscriber honouring `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Power the simulated token on and select the OpenPGP application
pub fn open_session(reader: SimulatedReader) -> SimulatedSession {
    init_tracing();
    let transport = CcidTransport::open(reader, CcidConfig::default()).unwrap();
    OpenPgpCard::open(transport).unwrap()
}

fn sw(sw1: u8, sw2: u8) -> Vec<u8> {
    vec![sw1, sw2]
}

/// Minimal OpenPGP application
#[derive(Debug)]
pub struct SimulatedCard {
    selected: bool,
    pw1_retries: u8,
    pw3_retries: u8,
    /// PW1 (signing), PW1 (other), PW3
    verified: [bool; 3],
    objects: HashMap<u16, Vec<u8>>,
    /// Public key templates per control reference template tag
    keys: HashMap<u8, Vec<u8>>,
    /// Response data waiting for GET RESPONSE
    pending: Vec<u8>,
    /// Data of a command chain in progress, with its instruction
    chain: Option<(u8, Vec<u8>)>,
    challenges: u8,
    /// Every APDU received, in order
    pub received: Vec<Vec<u8>>,
}

impl Default for SimulatedCard {
    fn default() -> Self {
        Self {
            selected: false,
            pw1_retries: MAX_RETRIES,
            pw3_retries: MAX_RETRIES,
            verified: [false; 3],
            objects: HashMap::new(),
            keys: HashMap::new(),
            pending: Vec::new(),
            chain: None,
            challenges: 0,
            received: Vec::new(),
        }
    }
}

impl SimulatedCard {
    /// Store a data object directly
    pub fn with_object(mut self, tag: u16, value: &[u8]) -> Self {
        self.objects.insert(tag, value.to_vec());
        self
    }

    /// Retry counter of PW1 or PW3
    pub fn retries(&self, admin: bool) -> u8 {
        if admin { self.pw3_retries } else { self.pw1_retries }
    }

    /// Whether a private key is present for the control reference template tag
    pub fn has_key(&self, crt: u8) -> bool {
        self.keys.contains_key(&crt)
    }

    pub fn object(&self, tag: u16) -> Option<&[u8]> {
        self.objects.get(&tag).map(Vec::as_slice)
    }

    /// Volatile state is lost when the ICC is powered down
    pub fn power_cycle(&mut self) {
        self.selected = false;
        self.verified = [false; 3];
        self.pending.clear();
        self.chain = None;
    }

    /// Process one APDU and return the response with its status word
    pub fn process(&mut self, apdu: &[u8]) -> Vec<u8> {
        self.received.push(apdu.to_vec());
        let Ok(command) = Command::from_bytes(apdu) else {
            return sw(0x67, 0x00);
        };
        let mut data = command.data.as_deref().unwrap_or_default().to_vec();

        if command.cla & 0x10 != 0 {
            let (_, buffer) = self.chain.get_or_insert_with(|| (command.ins, Vec::new()));
            buffer.extend_from_slice(&data);
            return sw(0x90, 0x00);
        }
        if let Some((ins, mut buffer)) = self.chain.take() {
            if ins != command.ins {
                return sw(0x68, 0x83);
            }
            buffer.extend_from_slice(&data);
            data = buffer;
        }
        if command.ins != 0xC0 {
            self.pending.clear();
        }

        let tag = u16::from_be_bytes([command.p1, command.p2]);
        match command.ins {
            0xA4 => self.select(&data),
            0xC0 => self.get_response(command.le),
            _ if !self.selected => sw(0x69, 0x85),
            0x20 => self.verify(command.p2, &data),
            0xCA => match self.objects.get(&tag).cloned() {
                Some(value) => self.respond(value),
                None if KNOWN_OBJECTS.contains(&tag) => sw(0x90, 0x00),
                None => sw(0x6A, 0x88),
            },
            0xDA => self.put_data(tag, data),
            0xDB => self.import_key(&data),
            0x47 => self.key_pair(command.p1, &data),
            0x2A => self.pso(command.p1, command.p2, &data),
            0x84 => {
                self.challenges = self.challenges.wrapping_add(1);
                let seed = self.challenges;
                self.respond((0..16).map(|i| seed.wrapping_mul(31).wrapping_add(i)).collect())
            }
            _ => sw(0x6D, 0x00),
        }
    }

    fn respond(&mut self, data: Vec<u8>) -> Vec<u8> {
        if data.is_empty() {
            return sw(0x90, 0x00);
        }
        self.pending = data;
        sw(0x61, self.announced())
    }

    fn announced(&self) -> u8 {
        u8::try_from(self.pending.len()).unwrap_or(0)
    }

    fn get_response(&mut self, le: Option<u8>) -> Vec<u8> {
        if self.pending.is_empty() {
            return sw(0x69, 0x85);
        }
        let wanted = match le {
            None | Some(0) => 256,
            Some(le) => usize::from(le),
        };
        let mut out: Vec<u8> = self
            .pending
            .drain(..wanted.min(self.pending.len()))
            .collect();
        if self.pending.is_empty() {
            out.extend_from_slice(&[0x90, 0x00]);
        } else {
            out.extend_from_slice(&[0x61, self.announced()]);
        }
        out
    }

    fn select(&mut self, aid: &[u8]) -> Vec<u8> {
        self.verified = [false; 3];
        if aid == OPENPGP_AID {
            self.selected = true;
            sw(0x90, 0x00)
        } else {
            self.selected = false;
            sw(0x6A, 0x82)
        }
    }

    fn verify(&mut self, reference: u8, secret: &[u8]) -> Vec<u8> {
        let (expected, retries) = match reference {
            0x81 | 0x82 => (PW1, &mut self.pw1_retries),
            0x83 => (PW3, &mut self.pw3_retries),
            _ => return sw(0x6A, 0x86),
        };
        if *retries == 0 {
            return sw(0x69, 0x83);
        }
        if secret != expected {
            *retries -= 1;
            return sw(0x63, 0xC0 | *retries);
        }
        *retries = MAX_RETRIES;
        self.verified[usize::from(reference - 0x81)] = true;
        sw(0x90, 0x00)
    }

    fn put_data(&mut self, tag: u16, value: Vec<u8>) -> Vec<u8> {
        if !self.verified[2] {
            return sw(0x69, 0x82);
        }
        if value.is_empty() {
            self.objects.remove(&tag);
        } else {
            self.objects.insert(tag, value);
        }
        sw(0x90, 0x00)
    }

    /// Odd PUT DATA `3FFF` carrying an extended header list
    fn import_key(&mut self, template: &[u8]) -> Vec<u8> {
        if !self.verified[2] {
            return sw(0x69, 0x82);
        }
        match template {
            [0x4D, 0x02, crt, 0x00] => {
                self.keys.remove(crt);
                sw(0x90, 0x00)
            }
            [0x4D, 0x82, _, _, crt, 0x00, 0x7F, 0x48, ..] if template.len() >= 4 + 256 => {
                let key_bytes = &template[template.len() - 256..];
                self.keys.insert(*crt, public_key_template(key_bytes));
                sw(0x90, 0x00)
            }
            _ => sw(0x6A, 0x80),
        }
    }

    fn key_pair(&mut self, p1: u8, crt: &[u8]) -> Vec<u8> {
        let &[crt, 0x00] = crt else {
            return sw(0x6A, 0x80);
        };
        match p1 {
            0x80 => {
                if !self.verified[2] {
                    return sw(0x69, 0x82);
                }
                let modulus: Vec<u8> = (0..=255u8).map(|b| b ^ crt).collect();
                let template = public_key_template(&modulus);
                self.keys.insert(crt, template.clone());
                self.respond(template)
            }
            0x81 => match self.keys.get(&crt).cloned() {
                Some(template) => self.respond(template),
                None => sw(0x6A, 0x88),
            },
            _ => sw(0x6A, 0x86),
        }
    }

    fn pso(&mut self, p1: u8, p2: u8, data: &[u8]) -> Vec<u8> {
        match (p1, p2) {
            (0x9E, 0x9A) if self.verified[0] => self.respond(data.iter().map(|b| !b).collect()),
            (0x80, 0x86) if self.verified[1] => match data.split_first() {
                Some((0x00, cryptogram)) => self.respond(cryptogram.iter().rev().copied().collect()),
                _ => sw(0x6A, 0x80),
            },
            (0x9E, 0x9A) | (0x80, 0x86) => sw(0x69, 0x82),
            _ => sw(0x6A, 0x86),
        }
    }
}

/// `7F49` template around an RSA-2048 modulus and exponent 65537
fn public_key_template(modulus: &[u8]) -> Vec<u8> {
    let mut template = vec![0x7F, 0x49, 0x82, 0x01, 0x09, 0x81, 0x82, 0x01, 0x00];
    template.extend_from_slice(modulus);
    template.extend_from_slice(&[0x82, 0x03, 0x01, 0x00, 0x01]);
    template
}

/// CCID reader in front of a [`SimulatedCard`]
#[derive(Debug)]
pub struct SimulatedReader {
    pub card: SimulatedCard,
    /// bmICCStatus reported by the slot
    pub icc_status: u8,
    /// Largest payload in one bulk-in message
    pub block_size: usize,
    /// Time extension messages sent before each data block answer
    pub busy_polls: usize,
    /// Answer the next data block with a truncated message
    pub truncate_next: bool,
    /// Sequence numbers of every bulk-out message
    pub sequences: Vec<u8>,
    /// Chain continuation requests received
    pub continuations: usize,
    /// Bulk-out messages received, by type
    pub message_types: Vec<u8>,
    pub resets: usize,
    outgoing: VecDeque<Vec<u8>>,
    chained: VecDeque<Vec<u8>>,
    last_seq: u8,
}

impl SimulatedReader {
    pub fn new(card: SimulatedCard) -> Self {
        Self {
            card,
            icc_status: slot_status::ICC_PRESENT_INACTIVE,
            block_size: 64,
            busy_polls: 0,
            truncate_next: false,
            sequences: Vec::new(),
            continuations: 0,
            message_types: Vec::new(),
            resets: 0,
            outgoing: VecDeque::new(),
            chained: VecDeque::new(),
            last_seq: 0,
        }
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_busy_polls(mut self, busy_polls: usize) -> Self {
        self.busy_polls = busy_polls;
        self
    }

    fn message(&self, msg_type: u8, status: u8, chain: u8, data: &[u8]) -> Vec<u8> {
        let mut message = vec![msg_type];
        message.extend_from_slice(&(data.len() as u32).to_le_bytes());
        message.extend_from_slice(&[0x00, self.last_seq, status, 0x00, chain]);
        message.extend_from_slice(data);
        message
    }

    fn data_block(&self, status: u8, chain: u8, data: &[u8]) -> Vec<u8> {
        self.message(message_type::RDR_TO_PC_DATA_BLOCK, status, chain, data)
    }

    fn slot_status(&self) -> Vec<u8> {
        self.message(message_type::RDR_TO_PC_SLOT_STATUS, self.icc_status, 0x00, &[])
    }

    fn transfer(&mut self, param: u16, apdu: &[u8]) {
        if param == PARAM_CONTINUE_CHAIN {
            self.continuations += 1;
            let Some(block) = self.chained.pop_front() else {
                self.outgoing.push_back(self.data_block(slot_status::COMMAND_FAILED, 0x00, &[]));
                return;
            };
            let chain = if self.chained.is_empty() { 0x02 } else { 0x03 };
            self.outgoing.push_back(self.data_block(0x00, chain, &block));
            return;
        }

        if self.icc_status != slot_status::ICC_PRESENT_ACTIVE {
            let status = slot_status::COMMAND_FAILED | self.icc_status;
            self.outgoing.push_back(self.data_block(status, 0x00, &[]));
            return;
        }

        let response = self.card.process(apdu);
        for _ in 0..self.busy_polls {
            self.outgoing.push_back(self.data_block(slot_status::TIME_EXTENSION, 0x00, &[]));
        }

        if self.truncate_next {
            self.truncate_next = false;
            self.outgoing.push_back(vec![message_type::RDR_TO_PC_DATA_BLOCK, 0x02, 0x00]);
            return;
        }

        let mut blocks: VecDeque<Vec<u8>> =
            response.chunks(self.block_size).map(<[u8]>::to_vec).collect();
        let first = blocks.pop_front().unwrap_or_default();
        let chain = if blocks.is_empty() { 0x00 } else { 0x01 };
        self.outgoing.push_back(self.data_block(0x00, chain, &first));
        self.chained = blocks;
    }
}

impl BulkPipe for SimulatedReader {
    fn write(&mut self, data: &[u8], _timeout: Duration) -> Result<(), CcidError> {
        assert!(data.len() >= CCID_HEADER_SIZE, "short bulk-out message");
        let msg_type = data[0];
        let seq = data[6];
        let param = u16::from_le_bytes([data[8], data[9]]);
        let payload = &data[CCID_HEADER_SIZE..];

        self.sequences.push(seq);
        self.message_types.push(msg_type);
        self.last_seq = seq;

        match msg_type {
            message_type::PC_TO_RDR_GET_SLOT_STATUS => {
                let status = self.slot_status();
                self.outgoing.push_back(status);
            }
            message_type::PC_TO_RDR_ICC_POWER_ON => {
                if self.icc_status == slot_status::ICC_NOT_PRESENT {
                    let status = slot_status::COMMAND_FAILED | slot_status::ICC_NOT_PRESENT;
                    self.outgoing.push_back(self.data_block(status, 0x00, &[]));
                } else {
                    self.icc_status = slot_status::ICC_PRESENT_ACTIVE;
                    self.card.power_cycle();
                    self.outgoing.push_back(self.data_block(0x00, 0x00, ATR));
                }
            }
            message_type::PC_TO_RDR_ICC_POWER_OFF => {
                self.icc_status = slot_status::ICC_PRESENT_INACTIVE;
                let status = self.slot_status();
                self.outgoing.push_back(status);
            }
            message_type::PC_TO_RDR_XFR_BLOCK => self.transfer(param, payload),
            other => panic!("unexpected CCID message type {other:#04x}"),
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize, CcidError> {
        let message = self.outgoing.pop_front().ok_or(CcidError::Timeout)?;
        buf[..message.len()].copy_from_slice(&message);
        Ok(message.len())
    }

    fn reset(&mut self) -> Result<(), CcidError> {
        self.resets += 1;
        self.outgoing.clear();
        self.chained.clear();
        self.icc_status = slot_status::ICC_PRESENT_INACTIVE;
        Ok(())
    }
}

/// Login data stored by the personalization scenario
pub const LOGIN: &[u8] = b"gpg_user";

/// A card with a URL object already present
pub fn personalized_card() -> SimulatedCard {
    SimulatedCard::default().with_object(tags::URL, b"https://example.org/key.asc")
}
