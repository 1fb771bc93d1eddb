//! Tests for the 128-bit address type and its codecs
//!
//! These tests verify:
//! - Constructor invariants for both address regions
//! - The sign-bit discriminator
//! - Equality and hashing over both words
//! - Bit-exact binary, Base64 text, and two-field decimal encodings

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use cairn::address::{
    decode_binary, decode_fields, decode_text, encode_binary, encode_fields, encode_text,
};
use cairn::{Address, CairnError};

// =============================================================================
// Helper Functions
// =============================================================================

fn hash_of(address: &Address) -> u64 {
    let mut hasher = DefaultHasher::new();
    address.hash(&mut hasher);
    hasher.finish()
}

fn fields(low: &str, high: &str) -> [String; 2] {
    [low.to_string(), high.to_string()]
}

// =============================================================================
// Constructor Tests
// =============================================================================

#[test]
fn test_novelty_construction() {
    for value in [0u64, 1, 5, 42, i64::MAX as u64] {
        let address = Address::novelty(value).unwrap();
        assert!(address.is_novelty());
        assert_eq!(address.high(), 0);
        assert_eq!(address.low(), value);
    }
}

#[test]
fn test_novelty_rejects_sign_bit() {
    let result = Address::novelty(1 << 63);
    assert!(matches!(
        result,
        Err(CairnError::InvalidAddressConstruction(_))
    ));

    let result = Address::novelty(u64::MAX);
    assert!(matches!(
        result,
        Err(CairnError::InvalidAddressConstruction(_))
    ));
}

#[test]
fn test_persisted_construction() {
    let address = Address::persisted(0x1000000000000000, (-1i64) as u64).unwrap();
    assert!(!address.is_novelty());
    assert_eq!(address.high(), 0x1000000000000000);
    assert_eq!(address.low() as i64, -1);
}

#[test]
fn test_persisted_rejects_non_negative_low() {
    let result = Address::persisted(7, 5);
    assert!(matches!(
        result,
        Err(CairnError::InvalidAddressConstruction(_))
    ));
}

#[test]
fn test_persisted_rejects_zero_high() {
    let result = Address::persisted(0, (-1i64) as u64);
    assert!(matches!(
        result,
        Err(CairnError::InvalidAddressConstruction(_))
    ));
}

// =============================================================================
// Equality and Hashing Tests
// =============================================================================

#[test]
fn test_equality_over_both_words() {
    let a = Address::persisted(1, (-5i64) as u64).unwrap();
    let b = Address::persisted(1, (-5i64) as u64).unwrap();
    let c = Address::persisted(2, (-5i64) as u64).unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c); // Same low word, different high word
}

#[test]
fn test_equal_addresses_hash_equal() {
    let a = Address::novelty(99).unwrap();
    let b = Address::novelty(99).unwrap();

    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
}

#[test]
fn test_novelty_never_equals_persisted() {
    // A persisted address can never share a low word with a novelty one
    // (the sign bit differs by invariant), and the high words differ too.
    let novelty = Address::novelty(5).unwrap();
    let persisted = Address::persisted(0x1000000000000000, (-1i64) as u64).unwrap();

    assert_ne!(novelty, persisted);
}

// =============================================================================
// Binary Codec Tests
// =============================================================================

#[test]
fn test_encode_binary_layout() {
    // high (big-endian) in bytes 0-7, low (big-endian) in bytes 8-15
    let address = Address::novelty(5).unwrap();
    let bytes = encode_binary(&address);

    let mut expected = [0u8; 16];
    expected[15] = 5;
    assert_eq!(bytes, expected);
}

#[test]
fn test_encode_binary_persisted_layout() {
    let address = Address::persisted(0x1000000000000000, (-1i64) as u64).unwrap();
    let bytes = encode_binary(&address);

    assert_eq!(&bytes[0..8], &[0x10, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(&bytes[8..16], &[0xFF; 8]);
}

#[test]
fn test_binary_round_trip_novelty() {
    for value in [0u64, 1, 5, 1 << 40, i64::MAX as u64] {
        let address = Address::novelty(value).unwrap();
        let decoded = decode_binary(&encode_binary(&address)).unwrap();
        assert_eq!(address, decoded);
        assert!(decoded.is_novelty());
    }
}

#[test]
fn test_binary_round_trip_persisted() {
    let cases = [
        (1u64, -1i64),
        (0x1000000000000000, -1),
        (u64::MAX, i64::MIN),
        (42, -99999),
    ];
    for (high, low) in cases {
        let address = Address::persisted(high, low as u64).unwrap();
        let decoded = decode_binary(&encode_binary(&address)).unwrap();
        assert_eq!(address, decoded);
        assert!(!decoded.is_novelty());
    }
}

#[test]
fn test_decode_binary_rejects_wrong_length() {
    assert!(matches!(
        decode_binary(&[0u8; 15]),
        Err(CairnError::MalformedAddress(_))
    ));
    assert!(matches!(
        decode_binary(&[0u8; 17]),
        Err(CairnError::MalformedAddress(_))
    ));
}

#[test]
fn test_decode_binary_rejects_invalid_regions() {
    // Non-zero high word with a non-negative low word
    let mut bytes = [0u8; 16];
    bytes[0] = 1;
    bytes[15] = 5;
    assert!(matches!(
        decode_binary(&bytes),
        Err(CairnError::MalformedAddress(_))
    ));

    // Zero high word with a negative low word
    let mut bytes = [0u8; 16];
    bytes[8] = 0x80;
    assert!(matches!(
        decode_binary(&bytes),
        Err(CairnError::MalformedAddress(_))
    ));
}

// =============================================================================
// Text Codec Tests
// =============================================================================

#[test]
fn test_encode_text_is_base64_of_binary() {
    // 15 zero bytes then 0x05, standard alphabet with padding
    let address = Address::novelty(5).unwrap();
    assert_eq!(encode_text(&address), "AAAAAAAAAAAAAAAAAAAABQ==");
}

#[test]
fn test_text_round_trip() {
    let addresses = [
        Address::novelty(0).unwrap(),
        Address::novelty(5).unwrap(),
        Address::novelty(i64::MAX as u64).unwrap(),
        Address::persisted(0x1000000000000000, (-1i64) as u64).unwrap(),
        Address::persisted(u64::MAX, i64::MIN as u64).unwrap(),
    ];
    for address in addresses {
        let decoded = decode_text(&encode_text(&address)).unwrap();
        assert_eq!(address, decoded);
    }
}

#[test]
fn test_display_matches_text_form() {
    let address = Address::novelty(5).unwrap();
    assert_eq!(address.to_string(), encode_text(&address));
}

#[test]
fn test_decode_text_rejects_garbage() {
    assert!(matches!(
        decode_text("not-valid-base64!!!"),
        Err(CairnError::MalformedAddress(_))
    ));

    // Valid Base64, wrong decoded length
    assert!(matches!(
        decode_text("AAAA"),
        Err(CairnError::MalformedAddress(_))
    ));
}

// =============================================================================
// Two-Field Decimal Codec Tests
// =============================================================================

#[test]
fn test_decode_fields_novelty_example() {
    // Field 0 carries low, field 1 carries high — reversed from binary
    let address = decode_fields(&fields("5", "0")).unwrap();
    assert_eq!(address, Address::novelty(5).unwrap());
    assert!(address.is_novelty());
}

#[test]
fn test_decode_fields_persisted_example() {
    // 0x1000000000000000 == 1152921504606846976
    let address = decode_fields(&fields("-1", "1152921504606846976")).unwrap();
    assert_eq!(
        address,
        Address::persisted(0x1000000000000000, (-1i64) as u64).unwrap()
    );
    assert!(!address.is_novelty());
}

#[test]
fn test_fields_round_trip() {
    let addresses = [
        Address::novelty(0).unwrap(),
        Address::novelty(12345).unwrap(),
        Address::persisted(0x1000000000000000, (-1i64) as u64).unwrap(),
        Address::persisted(u64::MAX, i64::MIN as u64).unwrap(),
    ];
    for address in addresses {
        let encoded = encode_fields(&address);
        let decoded = decode_fields(&encoded).unwrap();
        assert_eq!(address, decoded);
    }
}

#[test]
fn test_decode_fields_rejects_non_numeric() {
    assert!(matches!(
        decode_fields(&fields("abc", "0")),
        Err(CairnError::MalformedAddress(_))
    ));
    assert!(matches!(
        decode_fields(&fields("5", "")),
        Err(CairnError::MalformedAddress(_))
    ));
}

#[test]
fn test_decode_fields_rejects_out_of_range() {
    // One past i64::MAX
    assert!(matches!(
        decode_fields(&fields("9223372036854775808", "0")),
        Err(CairnError::MalformedAddress(_))
    ));
}

#[test]
fn test_decode_fields_rejects_invalid_regions() {
    // Would-be novelty low word with a non-zero high word
    assert!(matches!(
        decode_fields(&fields("5", "123")),
        Err(CairnError::MalformedAddress(_))
    ));

    // Negative low word with a zero high word
    assert!(matches!(
        decode_fields(&fields("-1", "0")),
        Err(CairnError::MalformedAddress(_))
    ));
}
