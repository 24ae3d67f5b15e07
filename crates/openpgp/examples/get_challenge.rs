//! Read a few data objects and a challenge from the first CCID token
//!
//! ```sh
//! RUST_LOG=debug cargo run -p pgptoken-openpgp --example get_challenge
//! ```

use pgptoken_openpgp::{open_first_device, tags};
use pgptoken_transport_ccid::CcidConfig;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut card = open_first_device(CcidConfig::default())?;

    let aid = card.get_data(tags::AID)?;
    info!(aid = %hex::encode(&aid), "OpenPGP application");

    match card.get_data(tags::LOGIN_DATA) {
        Ok(login) => info!(login = %String::from_utf8_lossy(&login), "Login data"),
        Err(e) => info!(error = %e, "No login data"),
    }

    let challenge = card.get_challenge()?;
    println!("{}", hex::encode(&challenge));
    Ok(())
}
