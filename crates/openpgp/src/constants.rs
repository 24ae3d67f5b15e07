/// OpenPGP application identifier (RID + PIX prefix)
pub const OPENPGP_AID: &[u8] = b"\xD2\x76\x00\x01\x24\x01";

/// Class byte of an interindustry command
pub const CLA_ISO: u8 = 0x00;
/// Class byte flagging "more blocks of this command follow"
pub const CLA_CHAIN: u8 = 0x10;

/// Data bytes carried by the first block of a chained command
pub const CHAIN_BLOCK_SIZE: usize = 128;

/// Record size used by WRITE BINARY and UPDATE BINARY
pub const BINARY_RECORD_SIZE: usize = 256;

/// Instruction bytes of the OpenPGP card command set
pub mod ins {
    /// SELECT
    pub const SELECT: u8 = 0xA4;
    /// VERIFY
    pub const VERIFY: u8 = 0x20;
    /// CHANGE REFERENCE DATA
    pub const CHANGE_REFERENCE_DATA: u8 = 0x24;
    /// RESET RETRY COUNTER
    pub const RESET_RETRY_COUNTER: u8 = 0x2C;
    /// GET DATA
    pub const GET_DATA: u8 = 0xCA;
    /// PUT DATA
    pub const PUT_DATA: u8 = 0xDA;
    /// PUT DATA with odd instruction (extended header list)
    pub const PUT_DATA_ODD: u8 = 0xDB;
    /// PERFORM SECURITY OPERATION
    pub const PSO: u8 = 0x2A;
    /// INTERNAL AUTHENTICATE
    pub const INTERNAL_AUTHENTICATE: u8 = 0x88;
    /// EXTERNAL AUTHENTICATE
    pub const EXTERNAL_AUTHENTICATE: u8 = 0x82;
    /// GENERATE ASYMMETRIC KEY PAIR
    pub const GENERATE_KEY_PAIR: u8 = 0x47;
    /// READ BINARY
    pub const READ_BINARY: u8 = 0xB0;
    /// WRITE BINARY
    pub const WRITE_BINARY: u8 = 0xD0;
    /// UPDATE BINARY
    pub const UPDATE_BINARY: u8 = 0xD6;
    /// GET CHALLENGE
    pub const GET_CHALLENGE: u8 = 0x84;
}

/// P1/P2 pairs of PERFORM SECURITY OPERATION
pub mod pso {
    /// COMPUTE DIGITAL SIGNATURE
    pub const COMPUTE_DIGITAL_SIGNATURE: (u8, u8) = (0x9E, 0x9A);
    /// DECIPHER
    pub const DECIPHER: (u8, u8) = (0x80, 0x86);
}

/// Data object tags
pub mod tags {
    /// Application identifier
    pub const AID: u16 = 0x004F;
    /// Login data
    pub const LOGIN_DATA: u16 = 0x005E;
    /// Cardholder related data
    pub const CARDHOLDER_DATA: u16 = 0x0065;
    /// Cardholder name
    pub const NAME: u16 = 0x005B;
    /// Language preference
    pub const LANGUAGE: u16 = 0x5F2D;
    /// Sex
    pub const SEX: u16 = 0x5F35;
    /// URL of the public key
    pub const URL: u16 = 0x5F50;
    /// Historical bytes
    pub const HISTORICAL_BYTES: u16 = 0x5F52;
    /// Application related data
    pub const APPLICATION_DATA: u16 = 0x006E;
    /// Security support template (digital signature counter)
    pub const SECURITY_SUPPORT: u16 = 0x007A;
    /// Password status bytes
    pub const PW_STATUS: u16 = 0x00C4;
    /// Algorithm attributes of the signature key
    pub const ALGORITHM_SIGNATURE: u16 = 0x00C1;
    /// Algorithm attributes of the decryption key
    pub const ALGORITHM_DECRYPTION: u16 = 0x00C2;
    /// Algorithm attributes of the authentication key
    pub const ALGORITHM_AUTHENTICATION: u16 = 0x00C3;
    /// Fingerprint of the signature key
    pub const FINGERPRINT_SIGNATURE: u16 = 0x00C7;
    /// Fingerprint of the decryption key
    pub const FINGERPRINT_DECRYPTION: u16 = 0x00C8;
    /// Fingerprint of the authentication key
    pub const FINGERPRINT_AUTHENTICATION: u16 = 0x00C9;
    /// CA fingerprints
    pub const CA_FINGERPRINTS: u16 = 0x00C6;
    /// Generation time of the signature key
    pub const GENERATION_TIME_SIGNATURE: u16 = 0x00CE;
    /// Generation time of the decryption key
    pub const GENERATION_TIME_DECRYPTION: u16 = 0x00CF;
    /// Generation time of the authentication key
    pub const GENERATION_TIME_AUTHENTICATION: u16 = 0x00D0;
    /// Resetting code
    pub const RESETTING_CODE: u16 = 0x00D3;
    /// Cardholder certificate
    pub const CARDHOLDER_CERTIFICATE: u16 = 0x7F21;
    /// Extended header list, used by odd PUT DATA for key import
    pub const EXTENDED_HEADER_LIST: u16 = 0x3FFF;

    /// Extended header list template
    pub const TEMPLATE_EXTENDED_HEADER: u8 = 0x4D;
    /// Cardholder private key template (header list)
    pub const TEMPLATE_PRIVATE_KEY: [u8; 2] = [0x7F, 0x48];
    /// Concatenated key data
    pub const PRIVATE_KEY_DATA: [u8; 2] = [0x5F, 0x48];
    /// Public exponent header inside the private key template
    pub const RSA_EXPONENT: u8 = 0x91;
    /// Prime p header inside the private key template
    pub const RSA_PRIME_P: u8 = 0x92;
    /// Prime q header inside the private key template
    pub const RSA_PRIME_Q: u8 = 0x93;
}
