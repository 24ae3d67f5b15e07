mod key;
mod password;

pub use key::{KeySlot, RsaKeyMaterial, RsaPublicKey};
pub use password::{PasswordRole, ResetMethod};
