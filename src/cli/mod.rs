pub mod commands;
pub mod length;
pub mod pairing;
pub mod probe;

pub use commands::{Cli, Commands};

use crate::errors::HarnessError;

/// Normalize a BLE device address to uppercase colon-separated hex-octet
/// form, accepting dash separators on input.
pub fn normalize_address(raw: &str) -> Result<String, HarnessError> {
    let address = raw.to_uppercase().replace('-', ":");
    let octets: Vec<&str> = address.split(':').collect();
    let valid = octets.len() == 6
        && octets
            .iter()
            .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()));
    if !valid {
        return Err(HarnessError::Config(format!("invalid BLE address: {raw}")));
    }
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_uppercased_and_dashes_replaced() {
        assert_eq!(
            normalize_address("24-b2-31-d1-81-30").unwrap(),
            "24:B2:31:D1:81:30"
        );
    }

    #[test]
    fn test_valid_address_passes_through() {
        assert_eq!(
            normalize_address("AA:BB:CC:DD:EE:FF").unwrap(),
            "AA:BB:CC:DD:EE:FF"
        );
    }

    #[test]
    fn test_malformed_addresses_rejected() {
        assert!(normalize_address("AA:BB:CC").is_err());
        assert!(normalize_address("GG:BB:CC:DD:EE:FF").is_err());
        assert!(normalize_address("AABBCCDDEEFF").is_err());
    }
}
