pub mod error;

use regex::Regex;

use std::sync::OnceLock;

use error::AddressError;

const MAINNET_PREFIXES: [&str; 3] = ["bc1", "1", "3"];

fn signet_bech32() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^tb1[a-z0-9]{39,87}$").expect("static regex"))
}

/// Returns the trimmed address when it looks like a signet bech32 address.
pub fn validate_signet_address(address: &str) -> Result<&str, AddressError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(AddressError::Empty);
    }
    if MAINNET_PREFIXES.iter().any(|p| address.starts_with(p)) {
        return Err(AddressError::Mainnet);
    }
    if !signet_bech32().is_match(address) {
        return Err(AddressError::InvalidFormat);
    }
    Ok(address)
}
