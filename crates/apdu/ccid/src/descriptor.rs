//! CCID class descriptor parsing

use crate::error::CcidError;

/// Descriptor type of the CCID functional descriptor
pub const CCID_DESCRIPTOR_TYPE: u8 = 0x21;

/// Length of the CCID functional descriptor
pub const CCID_DESCRIPTOR_LENGTH: usize = 54;

/// Offset of the `dwFeatures` byte that carries the exchange level bits
const EXCHANGE_LEVEL_OFFSET: usize = 42;

/// Level at which the reader exchanges data with the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeLevel {
    /// TPDU level, not supported by this transport
    Tpdu,
    /// Short APDU level
    ShortApdu,
    /// Short and extended APDU level
    ExtendedApdu,
}

impl ExchangeLevel {
    /// Read the exchange level from a 54-byte CCID class descriptor
    pub fn from_class_descriptor(descriptor: &[u8]) -> Result<Self, CcidError> {
        if descriptor.len() != CCID_DESCRIPTOR_LENGTH || descriptor[1] != CCID_DESCRIPTOR_TYPE {
            return Err(CcidError::InvalidClassDescriptor);
        }

        let features = descriptor[EXCHANGE_LEVEL_OFFSET];
        if features & 0x02 != 0 {
            Ok(Self::ShortApdu)
        } else if features & 0x04 != 0 {
            Ok(Self::ExtendedApdu)
        } else if features & 0x01 != 0 {
            Ok(Self::Tpdu)
        } else {
            Err(CcidError::UnknownExchangeLevel(features))
        }
    }

    /// Whether the reader takes whole APDUs
    pub const fn is_apdu(self) -> bool {
        matches!(self, Self::ShortApdu | Self::ExtendedApdu)
    }
}

/// Locate the CCID class descriptor inside an interface's extra descriptor bytes
pub fn find_class_descriptor(extra: &[u8]) -> Option<&[u8]> {
    let mut rest = extra;
    while let &[len, kind, ..] = rest {
        let len = usize::from(len);
        if len < 2 || len > rest.len() {
            return None;
        }
        if kind == CCID_DESCRIPTOR_TYPE && len == CCID_DESCRIPTOR_LENGTH {
            return Some(&rest[..len]);
        }
        rest = &rest[len..];
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(features: u8) -> Vec<u8> {
        let mut d = vec![0u8; CCID_DESCRIPTOR_LENGTH];
        d[0] = CCID_DESCRIPTOR_LENGTH as u8;
        d[1] = CCID_DESCRIPTOR_TYPE;
        d[EXCHANGE_LEVEL_OFFSET] = features;
        d
    }

    #[test]
    fn test_exchange_level() {
        assert_eq!(
            ExchangeLevel::from_class_descriptor(&descriptor(0x02)).unwrap(),
            ExchangeLevel::ShortApdu
        );
        assert_eq!(
            ExchangeLevel::from_class_descriptor(&descriptor(0x04)).unwrap(),
            ExchangeLevel::ExtendedApdu
        );
        assert_eq!(
            ExchangeLevel::from_class_descriptor(&descriptor(0x01)).unwrap(),
            ExchangeLevel::Tpdu
        );
        assert!(!ExchangeLevel::Tpdu.is_apdu());
        assert!(matches!(
            ExchangeLevel::from_class_descriptor(&descriptor(0x00)),
            Err(CcidError::UnknownExchangeLevel(0))
        ));
    }

    #[test]
    fn test_invalid_descriptor() {
        let mut d = descriptor(0x02);
        d[1] = 0x24;
        assert!(matches!(
            ExchangeLevel::from_class_descriptor(&d),
            Err(CcidError::InvalidClassDescriptor)
        ));
        assert!(matches!(
            ExchangeLevel::from_class_descriptor(&d[..20]),
            Err(CcidError::InvalidClassDescriptor)
        ));
    }

    #[test]
    fn test_find_class_descriptor() {
        let mut extra = vec![0x05, 0x24, 0x00, 0x10, 0x01];
        extra.extend(descriptor(0x04));

        let found = find_class_descriptor(&extra).unwrap();
        assert_eq!(found.len(), CCID_DESCRIPTOR_LENGTH);
        assert_eq!(
            ExchangeLevel::from_class_descriptor(found).unwrap(),
            ExchangeLevel::ExtendedApdu
        );

        assert!(find_class_descriptor(&[0x05, 0x24, 0x00]).is_none());
        assert!(find_class_descriptor(&[]).is_none());
    }
}
