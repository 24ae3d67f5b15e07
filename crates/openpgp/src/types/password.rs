/// Password referenced by VERIFY and CHANGE REFERENCE DATA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PasswordRole {
    /// PW1 for PSO:COMPUTE DIGITAL SIGNATURE
    UserSign,
    /// PW1 for every other user operation
    User,
    /// PW3 (admin)
    Admin,
}

impl PasswordRole {
    /// Password number used on the wire (1, 2 or 3)
    pub const fn who(self) -> u8 {
        match self {
            Self::UserSign => 1,
            Self::User => 2,
            Self::Admin => 3,
        }
    }

    /// P2 of VERIFY / CHANGE REFERENCE DATA
    pub const fn reference(self) -> u8 {
        0x80 + self.who()
    }
}

/// How RESET RETRY COUNTER authorizes the new PW1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetMethod {
    /// Data is resetting code followed by the new PW1
    ResettingCode,
    /// PW3 already verified, data is the new PW1 only
    Admin,
}

impl ResetMethod {
    /// P1 of RESET RETRY COUNTER
    pub const fn p1(self) -> u8 {
        match self {
            Self::ResettingCode => 0x00,
            Self::Admin => 0x02,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_references() {
        assert_eq!(PasswordRole::UserSign.reference(), 0x81);
        assert_eq!(PasswordRole::User.reference(), 0x82);
        assert_eq!(PasswordRole::Admin.reference(), 0x83);
        assert_eq!(ResetMethod::ResettingCode.p1(), 0x00);
        assert_eq!(ResetMethod::Admin.p1(), 0x02);
    }
}
