//! Address Module
//!
//! The 128-bit identifier at the heart of the store.
//!
//! ## Two Disjoint Regions
//!
//! The address space is split by the sign bit of the low word:
//! - **Novelty** addresses (`low >= 0`) identify entries created inside the
//!   open, not-yet-durable transaction. `high` is always zero.
//! - **Persisted** addresses (`low < 0`) identify entries durably located in
//!   the page store. `high` carries the packed store location and is never
//!   zero.
//!
//! The constructors enforce these invariants, so no valid `Address` can sit
//! in the ambiguous region between the two.

mod codec;

pub use codec::{
    decode_binary, decode_fields, decode_text, encode_binary, encode_fields, encode_text,
};

use std::fmt;

use crate::error::{CairnError, Result};

/// A 128-bit address composed of two 64-bit words
///
/// ## Invariants
/// - Novelty form: `high == 0`, sign bit of `low` clear
/// - Persisted form: `high != 0`, sign bit of `low` set
///
/// Equality and hashing cover both words, so a persisted address never
/// collides with a novelty address even when the low words happen to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    high: u64,
    low: u64,
}

impl Address {
    /// Create a novelty address from a non-negative counter value
    ///
    /// Fails with `InvalidAddressConstruction` if the sign bit of `value`
    /// is set (the value would read as negative and land in the persisted
    /// region).
    pub fn novelty(value: u64) -> Result<Self> {
        if (value as i64) < 0 {
            return Err(CairnError::InvalidAddressConstruction(format!(
                "novelty value {} has the sign bit set",
                value
            )));
        }
        Ok(Self {
            high: 0,
            low: value,
        })
    }

    /// Create a persisted address from an explicit `(high, low)` pair
    ///
    /// `high` carries the packed page store location and must be non-zero;
    /// `low` must read as negative. Anything else is rejected with
    /// `InvalidAddressConstruction` — a zero `high` or non-negative `low`
    /// would be ambiguous with the novelty encoding.
    pub fn persisted(high: u64, low: u64) -> Result<Self> {
        if (low as i64) >= 0 {
            return Err(CairnError::InvalidAddressConstruction(format!(
                "persisted low word {} is non-negative",
                low as i64
            )));
        }
        if high == 0 {
            return Err(CairnError::InvalidAddressConstruction(
                "persisted high word must be non-zero".to_string(),
            ));
        }
        Ok(Self { high, low })
    }

    /// True iff this address identifies a not-yet-durable entry
    ///
    /// The sign bit of the low word is the sole discriminator between the
    /// two address spaces.
    pub fn is_novelty(&self) -> bool {
        (self.low as i64) >= 0
    }

    /// The high word (packed store location for persisted addresses, zero
    /// for novelty addresses)
    pub fn high(&self) -> u64 {
        self.high
    }

    /// The low word
    pub fn low(&self) -> u64 {
        self.low
    }
}

impl fmt::Display for Address {
    /// The canonical external text form: Base64 of the binary encoding
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_text(self))
    }
}
