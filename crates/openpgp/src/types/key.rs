use bytes::Bytes;
use iso7816_tlv::ber::{Tag, Tlv, Value};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::constants::tags;
use crate::{Error, Result};

/// Offset of the RSA-2048 modulus inside a GENERATE KEY PAIR response
const MODULUS_OFFSET: usize = 9;
/// Length of an RSA-2048 modulus
const MODULUS_LEN: usize = 256;
/// Offset of the public exponent, after the modulus and the `82 03` header
const EXPONENT_OFFSET: usize = MODULUS_OFFSET + MODULUS_LEN + 2;
/// Length of the public exponent
const EXPONENT_LEN: usize = 3;

/// One of the three key slots of the OpenPGP application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySlot {
    /// Signature key
    Signature,
    /// Decryption key
    Decryption,
    /// Authentication key
    Authentication,
}

impl KeySlot {
    /// Key number used by EXTERNAL AUTHENTICATE and the tooling (1, 2 or 3)
    pub const fn keyno(self) -> u8 {
        match self {
            Self::Signature => 1,
            Self::Decryption => 2,
            Self::Authentication => 3,
        }
    }

    /// Control reference template tag
    pub const fn crt_tag(self) -> u8 {
        match self {
            Self::Signature => 0xB6,
            Self::Decryption => 0xB8,
            Self::Authentication => 0xA4,
        }
    }

    /// Empty control reference template selecting this slot
    pub const fn crt(self) -> [u8; 2] {
        [self.crt_tag(), 0x00]
    }

    /// Data object holding this key's fingerprint
    pub const fn fingerprint_tag(self) -> u16 {
        match self {
            Self::Signature => tags::FINGERPRINT_SIGNATURE,
            Self::Decryption => tags::FINGERPRINT_DECRYPTION,
            Self::Authentication => tags::FINGERPRINT_AUTHENTICATION,
        }
    }

    /// Data object holding this key's generation time
    pub const fn generation_time_tag(self) -> u16 {
        match self {
            Self::Signature => tags::GENERATION_TIME_SIGNATURE,
            Self::Decryption => tags::GENERATION_TIME_DECRYPTION,
            Self::Authentication => tags::GENERATION_TIME_AUTHENTICATION,
        }
    }

    /// Data object holding this key's algorithm attributes
    pub const fn algorithm_tag(self) -> u16 {
        match self {
            Self::Signature => tags::ALGORITHM_SIGNATURE,
            Self::Decryption => tags::ALGORITHM_DECRYPTION,
            Self::Authentication => tags::ALGORITHM_AUTHENTICATION,
        }
    }
}

impl TryFrom<u8> for KeySlot {
    type Error = u8;

    fn try_from(keyno: u8) -> std::result::Result<Self, Self::Error> {
        match keyno {
            1 => Ok(Self::Signature),
            2 => Ok(Self::Decryption),
            3 => Ok(Self::Authentication),
            other => Err(other),
        }
    }
}

/// RSA public key returned by GENERATE ASYMMETRIC KEY PAIR
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    /// Modulus, big-endian
    pub modulus: Bytes,
    /// Public exponent, big-endian
    pub exponent: Bytes,
}

impl RsaPublicKey {
    /// Extract an RSA-2048 key from a `7F49` public key template
    ///
    /// Fixed offsets are used: the modulus sits at 9..265, the exponent at
    /// 267..270. Other key sizes and curve keys are not parsed.
    pub fn from_template(template: &Bytes) -> Result<Self> {
        if template.len() < EXPONENT_OFFSET + EXPONENT_LEN {
            return Err(Error::InvalidResponse {
                operation: "GENERATE KEY PAIR",
                reason: "public key template too short for RSA-2048",
            });
        }

        Ok(Self {
            modulus: template.slice(MODULUS_OFFSET..MODULUS_OFFSET + MODULUS_LEN),
            exponent: template.slice(EXPONENT_OFFSET..EXPONENT_OFFSET + EXPONENT_LEN),
        })
    }
}

/// RSA private key components for import
///
/// Owned by the caller and wiped on drop. Components are big-endian and
/// used exactly as given, so pad the exponent if the card expects a fixed
/// width.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct RsaKeyMaterial {
    /// Public exponent
    pub exponent: Vec<u8>,
    /// First prime
    pub prime_p: Vec<u8>,
    /// Second prime
    pub prime_q: Vec<u8>,
}

impl std::fmt::Debug for RsaKeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaKeyMaterial")
            .field("exponent_len", &self.exponent.len())
            .field("prime_p_len", &self.prime_p.len())
            .field("prime_q_len", &self.prime_q.len())
            .finish()
    }
}

impl RsaKeyMaterial {
    /// Create key material from its components
    pub const fn new(exponent: Vec<u8>, prime_p: Vec<u8>, prime_q: Vec<u8>) -> Self {
        Self {
            exponent,
            prime_p,
            prime_q,
        }
    }

    /// Build the extended header list sent with odd PUT DATA `3FFF`
    ///
    /// ```text
    /// 4D len
    ///    CRT 00
    ///    7F48 len  91 len(e) 92 len(p) 93 len(q)
    ///    5F48 len  e || p || q
    /// ```
    pub fn import_template(&self, slot: KeySlot) -> Result<Zeroizing<Vec<u8>>> {
        let mut headers = vec![tags::RSA_EXPONENT];
        encode_length(self.exponent.len(), &mut headers)?;
        headers.push(tags::RSA_PRIME_P);
        encode_length(self.prime_p.len(), &mut headers)?;
        headers.push(tags::RSA_PRIME_Q);
        encode_length(self.prime_q.len(), &mut headers)?;

        let mut key_data = Zeroizing::new(Vec::with_capacity(
            self.exponent.len() + self.prime_p.len() + self.prime_q.len(),
        ));
        key_data.extend_from_slice(&self.exponent);
        key_data.extend_from_slice(&self.prime_p);
        key_data.extend_from_slice(&self.prime_q);

        let key_data = Zeroizing::new(
            Tlv::new(
                Tag::try_from(&tags::PRIVATE_KEY_DATA[..])?,
                Value::Primitive(key_data.to_vec()),
            )?
            .to_vec(),
        );

        let mut body = Zeroizing::new(Vec::with_capacity(key_data.len() + headers.len() + 8));
        body.extend_from_slice(&slot.crt());
        body.extend_from_slice(&tags::TEMPLATE_PRIVATE_KEY);
        encode_length(headers.len(), &mut body)?;
        body.extend_from_slice(&headers);
        body.extend_from_slice(&key_data);

        let template = Tlv::new(
            Tag::try_from(tags::TEMPLATE_EXTENDED_HEADER)?,
            Value::Primitive(body.to_vec()),
        )?;
        Ok(Zeroizing::new(template.to_vec()))
    }
}

/// Append a BER length field
fn encode_length(len: usize, out: &mut Vec<u8>) -> Result<()> {
    match len {
        0..=0x7F => out.push(len as u8),
        0x80..=0xFF => out.extend_from_slice(&[0x81, len as u8]),
        0x100..=0xFFFF => {
            out.push(0x82);
            out.extend_from_slice(&(len as u16).to_be_bytes());
        }
        _ => {
            return Err(Error::DataTooLong {
                operation: "key import",
                len,
                max: 0xFFFF,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_slot_mapping() {
        assert_eq!(KeySlot::Signature.crt(), [0xB6, 0x00]);
        assert_eq!(KeySlot::Decryption.crt(), [0xB8, 0x00]);
        assert_eq!(KeySlot::Authentication.crt(), [0xA4, 0x00]);
        assert_eq!(KeySlot::try_from(2), Ok(KeySlot::Decryption));
        assert_eq!(KeySlot::try_from(4), Err(4));
        assert_eq!(KeySlot::Authentication.fingerprint_tag(), 0x00C9);
    }

    #[test]
    fn test_public_key_offsets() {
        let mut template = hex!("7F49 82 0109 81 82 0100").to_vec();
        template.extend((0..=255u8).collect::<Vec<_>>());
        template.extend_from_slice(&hex!("82 03 010001"));

        let key = RsaPublicKey::from_template(&Bytes::from(template)).unwrap();
        assert_eq!(key.modulus.len(), 256);
        assert_eq!(key.modulus[0], 0x00);
        assert_eq!(key.modulus[255], 0xFF);
        assert_eq!(key.exponent.as_ref(), &hex!("010001"));
    }

    #[test]
    fn test_public_key_too_short() {
        let result = RsaPublicKey::from_template(&Bytes::from_static(&hex!("7F49 05 82 03 010001")));
        assert!(matches!(result, Err(Error::InvalidResponse { .. })));
    }

    #[test]
    fn test_import_template_layout() {
        let key = RsaKeyMaterial::new(hex!("00010001").to_vec(), vec![0xAA; 128], vec![0xBB; 128]);

        let template = key.import_template(KeySlot::Signature).unwrap();

        assert_eq!(
            &template[..22],
            &hex!("4D 82 0116 B6 00 7F48 08 91 04 92 81 80 93 81 80 5F48 82 0104")
        );
        assert_eq!(template.len(), 4 + 0x116);
        assert_eq!(&template[22..26], &hex!("00010001"));
        assert!(template[26..154].iter().all(|&b| b == 0xAA));
        assert!(template[154..].iter().all(|&b| b == 0xBB));
    }

    #[test]
    fn test_import_template_short_lengths() {
        let key = RsaKeyMaterial::new(hex!("03").to_vec(), vec![0x11; 4], vec![0x22; 4]);

        let template = key.import_template(KeySlot::Authentication).unwrap();

        assert_eq!(
            template.as_slice(),
            &hex!("4D 17 A4 00 7F48 06 91 01 92 04 93 04 5F48 09 03 11111111 22222222")
        );
    }
}
