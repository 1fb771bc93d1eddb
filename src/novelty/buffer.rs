//! Novelty buffer
//!
//! HashMap-based transaction-local buffer with RwLock for concurrency.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use parking_lot::RwLock;

use crate::address::Address;

/// Transaction-local buffer holding bytes behind novelty addresses
///
/// ## Concurrency:
/// - `entries`: Protected by RwLock (many concurrent readers, exclusive
///   writer)
/// - `byte_size`: Atomic counter tracking the approximate payload size
///
/// Entries live here from `put` until the transaction flushes (entries are
/// promoted and the buffer is cleared) or rolls back (entries are dropped).
pub struct NoveltyBuffer {
    /// Address → payload, protected by RwLock
    entries: RwLock<HashMap<Address, Bytes>>,

    /// Approximate total payload size in bytes (atomic, lock-free)
    byte_size: AtomicUsize,
}

impl NoveltyBuffer {
    /// Create a new empty buffer
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            byte_size: AtomicUsize::new(0),
        }
    }

    /// Insert a payload under a freshly allocated novelty address
    ///
    /// Returns the new approximate buffer size in bytes.
    pub fn insert(&self, address: Address, payload: Bytes) -> usize {
        let len = payload.len();
        let previous = self.entries.write().insert(address, payload);

        // Replacing an entry swaps its size contribution
        if let Some(old) = previous {
            self.byte_size.fetch_sub(old.len(), Ordering::SeqCst);
        }
        self.byte_size.fetch_add(len, Ordering::SeqCst) + len
    }

    /// Get the payload behind a novelty address, if buffered (read lock)
    ///
    /// `Bytes` clones are cheap reference bumps, so readers never copy the
    /// payload.
    pub fn get(&self, address: &Address) -> Option<Bytes> {
        self.entries.read().get(address).cloned()
    }

    /// Remove a single entry (for novelty deletes before flush)
    pub fn remove(&self, address: &Address) -> Option<Bytes> {
        let removed = self.entries.write().remove(address);
        if let Some(ref payload) = removed {
            self.byte_size.fetch_sub(payload.len(), Ordering::SeqCst);
        }
        removed
    }

    /// Snapshot all entries sorted by address (for flush)
    ///
    /// Sorting gives flushes a deterministic write order, which keeps
    /// segment layouts reproducible across runs.
    pub fn snapshot_sorted(&self) -> Vec<(Address, Bytes)> {
        let entries = self.entries.read();
        let mut snapshot: Vec<(Address, Bytes)> = entries
            .iter()
            .map(|(address, payload)| (*address, payload.clone()))
            .collect();
        snapshot.sort_by_key(|(address, _)| *address);
        snapshot
    }

    /// Clear all entries (after successful flush or on rollback)
    pub fn clear(&self) {
        self.entries.write().clear();
        self.byte_size.store(0, Ordering::SeqCst);
    }

    /// Approximate payload size in bytes
    pub fn size(&self) -> usize {
        self.byte_size.load(Ordering::SeqCst)
    }

    /// Number of buffered entries
    pub fn entry_count(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the buffer holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for NoveltyBuffer {
    fn default() -> Self {
        Self::new()
    }
}
