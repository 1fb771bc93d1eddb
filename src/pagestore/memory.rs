//! In-memory page store for tests and benchmarks
//!
//! All data lives in a HashMap and is lost on drop.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use parking_lot::RwLock;

use crate::error::{CairnError, Result};

use super::{Location, PageStore};

/// Segment ID used for every in-memory location
const MEMORY_SEGMENT: u32 = 1;

/// In-memory page store
///
/// ## Concurrency:
/// - `pages`: Protected by RwLock (many concurrent readers)
/// - `next_offset`: Atomic counter issuing one offset per write
pub struct MemoryPageStore {
    /// Offset → payload
    pages: RwLock<HashMap<u64, Bytes>>,

    /// Next offset to hand out (atomic, lock-free)
    next_offset: AtomicU64,
}

impl MemoryPageStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self {
            pages: RwLock::new(HashMap::new()),
            next_offset: AtomicU64::new(0),
        }
    }

    /// Number of live payloads (for testing/debugging)
    pub fn page_count(&self) -> usize {
        self.pages.read().len()
    }
}

impl Default for MemoryPageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PageStore for MemoryPageStore {
    fn write(&self, bytes: &[u8]) -> Result<Location> {
        let offset = self.next_offset.fetch_add(1, Ordering::SeqCst);
        let location = Location::new(MEMORY_SEGMENT, offset)?;

        self.pages
            .write()
            .insert(offset, Bytes::copy_from_slice(bytes));

        Ok(location)
    }

    fn read(&self, location: Location) -> Result<Bytes> {
        if location.segment() != MEMORY_SEGMENT {
            return Err(CairnError::AddressNotFound);
        }

        self.pages
            .read()
            .get(&location.offset())
            .cloned()
            .ok_or(CairnError::AddressNotFound)
    }

    fn delete(&self, location: Location) -> Result<()> {
        if location.segment() != MEMORY_SEGMENT {
            return Err(CairnError::AddressNotFound);
        }

        self.pages
            .write()
            .remove(&location.offset())
            .map(|_| ())
            .ok_or(CairnError::AddressNotFound)
    }

    fn sync(&self) -> Result<()> {
        // Nothing durable to sync
        Ok(())
    }
}
