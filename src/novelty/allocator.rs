//! Novelty allocator
//!
//! Issues unique novelty addresses within a single write transaction.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::address::Address;
use crate::error::Result;

/// Per-transaction allocator of novelty addresses
///
/// ## Concurrency:
/// - `next`: atomic counter (lock-free), so concurrent `put` calls inside
///   the single open write transaction never collide
///
/// The counter starts at 0 for every transaction. An allocator instance is
/// owned by the engine's current transaction scope and discarded at flush
/// or rollback; it never holds process-global state.
pub struct NoveltyAllocator {
    /// Next low word to issue (atomic, lock-free)
    next: AtomicU64,
}

impl NoveltyAllocator {
    /// Create a fresh allocator for a new transaction scope
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    /// Allocate a fresh novelty address
    ///
    /// Monotonically increasing low words, pairwise distinct within the
    /// transaction. The only failure mode is exhausting the non-negative
    /// 63-bit range, which the novelty constructor rejects rather than
    /// silently wrapping into the persisted region.
    pub fn allocate(&self) -> Result<Address> {
        let value = self.next.fetch_add(1, Ordering::SeqCst);
        Address::novelty(value)
    }

    /// Number of addresses issued so far (for testing/debugging)
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }
}

impl Default for NoveltyAllocator {
    fn default() -> Self {
        Self::new()
    }
}
