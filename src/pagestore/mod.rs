//! Page Store Module
//!
//! The durable storage boundary: turns bytes into a stable location and
//! back. The store core treats `write`/`read`/`delete` as opaque, fallible
//! operations; what it *does* define is how a location packs into the high
//! word of a persisted address.
//!
//! ## Location Packing
//!
//! ```text
//! ┌────────────────────┬──────────────────────────────┐
//! │ Segment ID (24)    │ Offset within segment (40)   │
//! └────────────────────┴──────────────────────────────┘
//!  bit 63           40  bit 39                      0
//! ```
//!
//! Segment IDs start at 1, so a packed location is never zero and can serve
//! directly as the high word of a persisted address. 40 offset bits allow
//! segments of up to ~1 TB.

mod file;
mod memory;

pub use file::FilePageStore;
pub use memory::MemoryPageStore;

use bytes::Bytes;

use crate::address::Address;
use crate::error::{CairnError, Result};

/// Number of bits for the segment ID
const SEGMENT_BITS: u32 = 24;
/// Number of bits for the offset within a segment
const OFFSET_BITS: u32 = 40;

/// Maximum segment ID (24 bits)
pub const MAX_SEGMENT: u32 = (1 << SEGMENT_BITS) - 1;
/// Maximum offset within a segment (40 bits)
pub const MAX_OFFSET: u64 = (1 << OFFSET_BITS) - 1;

/// Sign bit tag carried by the low word of every persisted address
const PERSISTED_LOW_TAG: u64 = 1 << 63;

/// A stable location inside the page store
///
/// Packs losslessly into a single non-zero 64-bit word; bounds are enforced
/// at construction so `pack` is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    segment: u32,
    offset: u64,
}

impl Location {
    /// Create a location, validating the bit-field bounds
    pub fn new(segment: u32, offset: u64) -> Result<Self> {
        if segment == 0 || segment > MAX_SEGMENT {
            return Err(CairnError::InvalidAddressConstruction(format!(
                "segment id {} outside 1..={}",
                segment, MAX_SEGMENT
            )));
        }
        if offset > MAX_OFFSET {
            return Err(CairnError::InvalidAddressConstruction(format!(
                "offset {} exceeds {} bits",
                offset, OFFSET_BITS
            )));
        }
        Ok(Self { segment, offset })
    }

    /// The segment ID (always non-zero)
    pub fn segment(&self) -> u32 {
        self.segment
    }

    /// The byte offset within the segment
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Pack into a single word: `segment << 40 | offset`
    ///
    /// Never zero, because segment IDs start at 1.
    pub fn pack(&self) -> u64 {
        ((self.segment as u64) << OFFSET_BITS) | self.offset
    }

    /// Unpack from a single word, rejecting the zero segment
    pub fn unpack(word: u64) -> Result<Self> {
        let segment = (word >> OFFSET_BITS) as u32;
        let offset = word & MAX_OFFSET;
        Self::new(segment, offset)
    }

    /// Build the persisted address for a payload stored at this location
    ///
    /// The high word is the packed location; the low word carries the sign
    /// bit plus the payload length, giving readers a cheap length hint
    /// while keeping the persisted invariant by construction.
    pub fn to_address(&self, payload_len: usize) -> Result<Address> {
        Address::persisted(self.pack(), PERSISTED_LOW_TAG | payload_len as u64)
    }

    /// Recover the location packed into a persisted address
    ///
    /// Fails with `MalformedAddress` for novelty addresses, which carry no
    /// location.
    pub fn from_address(address: &Address) -> Result<Self> {
        if address.is_novelty() {
            return Err(CairnError::MalformedAddress(
                "novelty address carries no page store location".to_string(),
            ));
        }
        Self::unpack(address.high())
    }
}

/// The page store boundary consumed by the engine
///
/// Implementations must be safe to share across the engine's readers;
/// `write` is only ever driven by the single flush in progress. Retry and
/// reclamation policy (orphaned locations from an abandoned flush,
/// compaction) belong to the implementation, not the core.
pub trait PageStore: Send + Sync {
    /// Persist a payload and return its stable location
    fn write(&self, bytes: &[u8]) -> Result<Location>;

    /// Read the payload at a location
    ///
    /// Returns `AddressNotFound` for unknown or deleted locations and
    /// `Corrupt` when stored bytes fail their integrity check.
    fn read(&self, location: Location) -> Result<Bytes>;

    /// Drop the payload at a location
    fn delete(&self, location: Location) -> Result<()>;

    /// Force buffered writes to durable storage
    fn sync(&self) -> Result<()>;
}
