//! Resolution Module
//!
//! The published mapping from novelty addresses to the persisted addresses
//! they were promoted to at flush.
//!
//! ## Copy-on-Write Publish
//!
//! The table holds an immutable snapshot behind an atomic pointer:
//! - Read transactions load the current snapshot without locks
//! - Each flush builds the union of the previous snapshot and its batch,
//!   then swaps the pointer in a single step
//! - A concurrent reader sees either the pre-flush or post-flush snapshot
//!   in full, never a partial batch
//!
//! Publishes are serialized by the engine's write lock (single-writer
//! model), so the swap itself never needs a compare-and-swap loop and never
//! performs I/O.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::address::Address;

/// An immutable published snapshot of novelty → persisted promotions
pub type Snapshot = HashMap<Address, Address>;

/// The promotions published by one flush
///
/// Returned from `Engine::flush` so callers can rewrite any novelty
/// addresses they still hold.
#[derive(Debug, Clone, Default)]
pub struct FlushDelta {
    /// Promoted pairs, in the order they were persisted
    pub promoted: Vec<(Address, Address)>,
}

impl FlushDelta {
    /// Look up the persisted address a novelty address was promoted to
    pub fn resolve(&self, novelty: &Address) -> Option<Address> {
        self.promoted
            .iter()
            .find(|(from, _)| from == novelty)
            .map(|(_, to)| *to)
    }

    /// Number of promotions in this delta
    pub fn len(&self) -> usize {
        self.promoted.len()
    }

    /// Check if the flush promoted nothing
    pub fn is_empty(&self) -> bool {
        self.promoted.is_empty()
    }
}

/// Published novelty → persisted address mapping
pub struct ResolutionTable {
    /// Current snapshot (atomic pointer, lock-free reads)
    snapshot: ArcSwap<Snapshot>,
}

impl ResolutionTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(Snapshot::new()),
        }
    }

    /// Resolve a novelty address against the current snapshot
    ///
    /// Absence means either "not yet flushed" (the caller must consult the
    /// transaction-local novelty buffer) or "unknown address" — the table
    /// alone cannot tell the two apart; callers disambiguate by transaction
    /// membership.
    pub fn resolve(&self, novelty: &Address) -> Option<Address> {
        self.snapshot.load().get(novelty).copied()
    }

    /// Atomically publish a batch of promotions
    ///
    /// The new snapshot is the union of the previous snapshot and the
    /// batch: entries from earlier flushes stay valid for readers still
    /// holding references. Later batches win on key collisions (a low word
    /// reissued by a later transaction remaps on its next publish).
    ///
    /// Must only be called from the engine's serialized flush path.
    pub fn publish(&self, batch: &FlushDelta) {
        if batch.is_empty() {
            return;
        }

        let current = self.snapshot.load_full();
        let mut next = Snapshot::clone(&current);
        next.extend(batch.promoted.iter().copied());

        self.snapshot.store(Arc::new(next));
    }

    /// Number of published promotions
    pub fn len(&self) -> usize {
        self.snapshot.load().len()
    }

    /// Check if nothing has been published yet
    pub fn is_empty(&self) -> bool {
        self.snapshot.load().is_empty()
    }
}

impl Default for ResolutionTable {
    fn default() -> Self {
        Self::new()
    }
}
