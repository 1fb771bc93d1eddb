//! Address codec
//!
//! Encoding and decoding functions for the external address formats.
//!
//! ## Formats
//!
//! ```text
//! Binary (16 bytes, big-endian):
//! ┌──────────────────┬──────────────────┐
//! │  high (bytes 0-7)│  low (bytes 8-15)│
//! └──────────────────┴──────────────────┘
//!
//! Text:   Base64 (standard alphabet) of the binary form
//! Fields: [low_as_decimal, high_as_decimal]  — note the reversed order
//! ```
//!
//! The two-field decimal form carries `low` in field 0 and `high` in field 1,
//! the opposite of the binary layout. Existing stores encode addresses this
//! way, so the order is load-bearing and must not be normalized.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{CairnError, Result};

use super::Address;

/// Size of the binary address encoding in bytes
pub const BINARY_SIZE: usize = 16;

// =============================================================================
// Binary Encoding/Decoding
// =============================================================================

/// Encode an address to its 16-byte binary form
///
/// `high` as 8 big-endian bytes followed by `low` as 8 big-endian bytes.
/// Pure and total: every valid address has exactly one binary form.
pub fn encode_binary(address: &Address) -> [u8; BINARY_SIZE] {
    let mut bytes = [0u8; BINARY_SIZE];
    bytes[0..8].copy_from_slice(&address.high().to_be_bytes());
    bytes[8..16].copy_from_slice(&address.low().to_be_bytes());
    bytes
}

/// Decode an address from its 16-byte binary form
///
/// Fails with `MalformedAddress` if the buffer is not exactly 16 bytes or
/// the decoded word pair falls in neither the novelty nor the persisted
/// region of the address space.
pub fn decode_binary(bytes: &[u8]) -> Result<Address> {
    if bytes.len() != BINARY_SIZE {
        return Err(CairnError::MalformedAddress(format!(
            "expected {} bytes, got {}",
            BINARY_SIZE,
            bytes.len()
        )));
    }

    let high = u64::from_be_bytes(bytes[0..8].try_into().unwrap());
    let low = u64::from_be_bytes(bytes[8..16].try_into().unwrap());

    address_from_words(high, low)
}

// =============================================================================
// Text Encoding/Decoding
// =============================================================================

/// Encode an address to its canonical text form (Base64 of the binary form)
pub fn encode_text(address: &Address) -> String {
    STANDARD.encode(encode_binary(address))
}

/// Decode an address from its canonical text form
pub fn decode_text(text: &str) -> Result<Address> {
    let bytes = STANDARD
        .decode(text)
        .map_err(|e| CairnError::MalformedAddress(format!("invalid base64: {}", e)))?;

    decode_binary(&bytes)
}

// =============================================================================
// Two-Field Decimal Encoding/Decoding
// =============================================================================

/// Encode an address to the two-field decimal form: `[low, high]`
///
/// Both words are formatted as signed decimals; field order is reversed
/// relative to the binary layout.
pub fn encode_fields(address: &Address) -> [String; 2] {
    [
        (address.low() as i64).to_string(),
        (address.high() as i64).to_string(),
    ]
}

/// Decode an address from the two-field decimal form
///
/// Field 0 carries `low`, field 1 carries `high`. Fails with
/// `MalformedAddress` if either field is not a valid signed 64-bit decimal
/// or the word pair is in neither valid region.
pub fn decode_fields(fields: &[String; 2]) -> Result<Address> {
    let low = parse_word(&fields[0], "low")?;
    let high = parse_word(&fields[1], "high")?;

    address_from_words(high as u64, low as u64)
}

// =============================================================================
// Private Helpers
// =============================================================================

/// Parse one decimal field as a signed 64-bit word
fn parse_word(field: &str, name: &str) -> Result<i64> {
    field.trim().parse::<i64>().map_err(|e| {
        CairnError::MalformedAddress(format!("{} field {:?} is not a 64-bit decimal: {}", name, field, e))
    })
}

/// Dispatch a raw word pair to the matching constructor
///
/// `high == 0` with a non-negative `low` is a novelty address; a non-zero
/// `high` with a negative `low` is a persisted address. The two remaining
/// quadrants are unreachable through the constructors and are rejected.
fn address_from_words(high: u64, low: u64) -> Result<Address> {
    let negative_low = (low as i64) < 0;

    match (high, negative_low) {
        (0, false) => Address::novelty(low),
        (h, true) if h != 0 => Address::persisted(high, low),
        (0, true) => Err(CairnError::MalformedAddress(
            "persisted low word with zero high word".to_string(),
        )),
        _ => Err(CairnError::MalformedAddress(
            "novelty low word with non-zero high word".to_string(),
        )),
    }
}
