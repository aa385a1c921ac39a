//! Address Classification
//!
//! Decides whether a piece of user input is a well-formed EVM address, a string
//! that merely looks like one, or ordinary chat text.
//!
//! Well-formed means `0x` followed by exactly 40 hex digits. A body that mixes
//! upper and lower case must also carry a valid EIP-55 checksum; single-case
//! bodies are accepted as-is.

use sha3::{Digest, Keccak256};

/// Required address prefix
pub const ADDRESS_PREFIX: &str = "0x";

/// Number of hex digits after the prefix
const ADDRESS_HEX_LEN: usize = 40;

/// Result of classifying a piece of input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressClass {
    /// Canonical address (checksum holds when mixed case)
    Valid,
    /// Carries the address prefix but fails validation
    MalformedLooksLikeAddress,
    /// Anything else
    Ordinary,
}

/// Classify raw input
///
/// Surrounding whitespace is ignored. Never panics.
#[must_use]
pub fn classify(text: &str) -> AddressClass {
    let text = text.trim();
    if is_valid_address(text) {
        AddressClass::Valid
    } else if text.starts_with(ADDRESS_PREFIX) {
        AddressClass::MalformedLooksLikeAddress
    } else {
        AddressClass::Ordinary
    }
}

/// Check format and, for mixed-case input, the EIP-55 checksum
#[must_use]
pub fn is_valid_address(text: &str) -> bool {
    let Some(body) = text.strip_prefix(ADDRESS_PREFIX) else {
        return false;
    };
    if body.len() != ADDRESS_HEX_LEN || !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return false;
    }

    let has_lower = body.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = body.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        return to_checksum_body(body) == body;
    }
    true
}

/// Render an address in EIP-55 checksum form
///
/// Returns `None` when the input is not `0x` + 40 hex digits.
#[must_use]
pub fn to_checksum_address(text: &str) -> Option<String> {
    let body = text.strip_prefix(ADDRESS_PREFIX)?;
    if body.len() != ADDRESS_HEX_LEN || !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("{ADDRESS_PREFIX}{}", to_checksum_body(body)))
}

fn to_checksum_body(body: &str) -> String {
    let lower = body.to_ascii_lowercase();
    let hash = hex::encode(Keccak256::digest(lower.as_bytes()));

    lower
        .chars()
        .zip(hash.chars())
        .map(|(c, h)| {
            // hash nibble >= 8 means uppercase
            if c.is_ascii_alphabetic() && h.to_digit(16).unwrap_or(0) >= 8 {
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // EIP-55 reference vectors
    const CHECKSUMMED: [&str; 4] = [
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
    ];

    #[test]
    fn test_checksummed_addresses_are_valid() {
        for addr in CHECKSUMMED {
            assert_eq!(classify(addr), AddressClass::Valid, "{addr}");
        }
    }

    #[test]
    fn test_single_case_addresses_are_valid() {
        for addr in CHECKSUMMED {
            let body = &addr[2..];
            assert_eq!(
                classify(&format!("0x{}", body.to_ascii_lowercase())),
                AddressClass::Valid
            );
            assert_eq!(
                classify(&format!("0x{}", body.to_ascii_uppercase())),
                AddressClass::Valid
            );
        }
    }

    #[test]
    fn test_bad_checksum_is_malformed() {
        // Last character flipped from 'd' to 'D'
        let addr = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAeD";
        assert_eq!(classify(addr), AddressClass::MalformedLooksLikeAddress);
    }

    #[test]
    fn test_wrong_length_is_malformed() {
        assert_eq!(classify("0x123"), AddressClass::MalformedLooksLikeAddress);
        assert_eq!(classify("0x"), AddressClass::MalformedLooksLikeAddress);
        let too_long = format!("{}00", CHECKSUMMED[0].to_ascii_lowercase());
        assert_eq!(classify(&too_long), AddressClass::MalformedLooksLikeAddress);
    }

    #[test]
    fn test_non_hex_body_is_malformed() {
        let addr = "0xzzzzzz6053f3e94c9b9a09f33669435e7ef1beae";
        assert_eq!(classify(addr), AddressClass::MalformedLooksLikeAddress);
    }

    #[test]
    fn test_ordinary_text() {
        for text in ["hello there", "", "   ", "x0abc", "0X5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"] {
            assert_eq!(classify(text), AddressClass::Ordinary, "{text:?}");
        }
        // Bare hex without the prefix is not an address
        assert_eq!(
            classify("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"),
            AddressClass::Ordinary
        );
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        let padded = format!("  {}\n", CHECKSUMMED[1]);
        assert_eq!(classify(&padded), AddressClass::Valid);
    }

    #[test]
    fn test_to_checksum_address() {
        for addr in CHECKSUMMED {
            let lower = addr.to_ascii_lowercase();
            assert_eq!(to_checksum_address(&lower).as_deref(), Some(addr));
        }
        assert_eq!(to_checksum_address("0x123"), None);
    }

    #[test]
    fn test_non_ascii_input_does_not_panic() {
        assert_eq!(classify("0xé"), AddressClass::MalformedLooksLikeAddress);
        assert_eq!(classify("héllo"), AddressClass::Ordinary);
    }
}
