//! Manifest record definitions
//!
//! Defines the structure of the promotion batches written at each flush.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::Result;

/// One promoted entry: the novelty address and its persisted replacement
///
/// Stored as raw words so the on-disk format stays independent of the
/// in-memory `Address` representation; the words are re-validated through
/// the checked constructors on replay.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Promotion {
    /// Low word of the novelty address (high word is zero by invariant)
    pub novelty_low: u64,

    /// High word of the persisted address (packed location)
    pub persisted_high: u64,

    /// Low word of the persisted address (sign bit set)
    pub persisted_low: u64,
}

impl Promotion {
    /// Record a promoted pair
    pub fn new(novelty: &Address, persisted: &Address) -> Self {
        Self {
            novelty_low: novelty.low(),
            persisted_high: persisted.high(),
            persisted_low: persisted.low(),
        }
    }

    /// Rebuild the address pair, re-checking both invariants
    pub fn to_addresses(&self) -> Result<(Address, Address)> {
        let novelty = Address::novelty(self.novelty_low)?;
        let persisted = Address::persisted(self.persisted_high, self.persisted_low)?;
        Ok((novelty, persisted))
    }
}

/// All promotions published by one flush
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionBatch {
    /// Flush sequence number - monotonically increasing per store
    pub sequence: u64,

    /// The promoted pairs, in persist order
    pub promotions: Vec<Promotion>,
}

impl PromotionBatch {
    /// Create a batch for the given flush sequence
    pub fn new(sequence: u64, promotions: Vec<Promotion>) -> Self {
        Self {
            sequence,
            promotions,
        }
    }
}
