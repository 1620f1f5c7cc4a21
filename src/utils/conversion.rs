//! Type conversion and formatting utilities.
//!
//! Functions for moving between wire-level types (alloy U256, raw bytes)
//! and the arbitrary-precision integers the entity models use.

use alloy::primitives::{hex, U256};
use num_bigint::BigUint;

// ============================================
// Hex Encoding
// ============================================

/// Encode bytes as a lowercase hex string with 0x prefix.
pub fn hex_encode(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

// ============================================
// U256 Conversions
// ============================================

/// Convert an alloy U256 into an arbitrary-precision BigUint.
///
/// Goes through the little-endian byte representation, which is faster
/// than string round-tripping for 32-byte values.
pub fn u256_to_biguint(value: U256) -> BigUint {
    let bytes: [u8; 32] = value.to_le_bytes();
    BigUint::from_bytes_le(&bytes)
}

// ============================================
// Serde Adapters
// ============================================

/// Serde adapter storing `BigUint` fields as decimal strings.
///
/// Entity dumps are JSON and 256-bit balances do not fit in a JSON number,
/// so they travel as decimal strings.
pub mod biguint_dec {
    use num_bigint::BigUint;
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let s = String::deserialize(deserializer)?;
        BigUint::from_str(&s).map_err(de::Error::custom)
    }
}
