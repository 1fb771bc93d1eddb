//! Engine Module
//!
//! The storage facade that coordinates all components.
//!
//! ## Responsibilities
//! - Coordinate the novelty allocator/buffer, resolution table, page store,
//!   and manifest
//! - Handle concurrent read/write access
//! - Promote novelty entries to persisted addresses at flush
//! - Rebuild the resolution table from the manifest on startup

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use bytes::Bytes;
use parking_lot::Mutex;

use crate::address::Address;
use crate::config::Config;
use crate::error::{CairnError, Result};
use crate::manifest::{ManifestReader, ManifestWriter, Promotion, PromotionBatch};
use crate::novelty::{NoveltyAllocator, NoveltyBuffer};
use crate::pagestore::{FilePageStore, Location, PageStore};
use crate::resolution::{FlushDelta, ResolutionTable};

/// The open write transaction's scope: allocator plus buffer
///
/// Replaced wholesale at flush and rollback, so no allocator state or
/// buffered entry ever leaks from one transaction into the next.
struct Transaction {
    allocator: NoveltyAllocator,
    buffer: NoveltyBuffer,
}

impl Transaction {
    fn new() -> Self {
        Self {
            allocator: NoveltyAllocator::new(),
            buffer: NoveltyBuffer::new(),
        }
    }
}

/// The main storage engine
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
///
/// - **Writes** (put/delete/flush/rollback): Serialized by `write_lock`
///   - Only ONE write operation at a time
///   - Flush performs page store I/O *before* taking any publish step
///
/// - **Reads** (get): Never take `write_lock`
///   - Novelty buffer uses an internal RwLock (many concurrent readers)
///   - Resolution table lookups are lock-free snapshot loads
///   - The only synchronization point with a concurrent flush is the
///     atomic snapshot swap itself
///
/// Flush publishes the batch to the resolution table *before* replacing
/// the transaction scope, so a reader racing a flush finds every flushed
/// address in at least one of the two places — visibility never regresses.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Durable byte storage (segment files in production, memory in tests)
    pagestore: Arc<dyn PageStore>,

    /// Published novelty → persisted mapping (lock-free reads)
    resolution: ResolutionTable,

    /// Durable promotion log (exclusive access needed)
    manifest: Mutex<ManifestWriter>,

    /// Current transaction scope (atomic pointer, swapped at flush/rollback)
    txn: ArcSwap<Transaction>,

    /// Sequence number of the last flush recorded in the manifest
    flush_sequence: AtomicU64,

    /// Serializes write operations (put/delete/flush/rollback)
    write_lock: Mutex<()>,
}

impl Engine {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const MANIFEST_FILENAME: &'static str = "manifest.log";
    const SEGMENT_DIR: &'static str = "segments";

    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Create the data directory
    /// 2. Open the segment store
    /// 3. Replay the manifest into the resolution table
    /// 4. Ready to serve requests
    pub fn open(config: Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;

        let segments_dir = config.data_dir.join(Self::SEGMENT_DIR);
        let pagestore = Arc::new(FilePageStore::open(
            &segments_dir,
            config.segment_size_limit,
        )?);

        Self::with_store(config, pagestore)
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let mut config = Config::default();
        config.data_dir = path.to_path_buf();
        Self::open(config)
    }

    /// Open against an explicit page store implementation
    ///
    /// The manifest still lives under the config's data directory; only the
    /// byte storage is swapped out. Used by tests and embedders that bring
    /// their own store.
    pub fn with_store(config: Config, pagestore: Arc<dyn PageStore>) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;
        let manifest_path = config.data_dir.join(Self::MANIFEST_FILENAME);

        // Replay the manifest to rebuild the published promotions
        let resolution = ResolutionTable::new();
        let (batches, stats) = ManifestReader::replay(&manifest_path)?;

        let mut last_sequence = 0;
        for batch in &batches {
            let mut promoted = Vec::with_capacity(batch.promotions.len());
            for promotion in &batch.promotions {
                promoted.push(promotion.to_addresses()?);
            }
            resolution.publish(&FlushDelta { promoted });
            last_sequence = last_sequence.max(batch.sequence);
        }

        if stats.batches_replayed > 0 || stats.tail_dropped {
            tracing::info!(
                batches = stats.batches_replayed,
                promotions = stats.promotions_replayed,
                tail_dropped = stats.tail_dropped,
                "manifest replay complete"
            );
        }

        let manifest = ManifestWriter::open(&manifest_path)?;

        Ok(Self {
            config,
            pagestore,
            resolution,
            manifest: Mutex::new(manifest),
            txn: ArcSwap::from_pointee(Transaction::new()),
            flush_sequence: AtomicU64::new(last_sequence),
            write_lock: Mutex::new(()),
        })
    }

    /// Store bytes under a freshly allocated novelty address
    ///
    /// O(1) amortized, no I/O: the bytes stay in the transaction-local
    /// buffer until `flush` promotes them or `rollback` discards them.
    pub fn put(&self, bytes: &[u8]) -> Result<Address> {
        let _write_guard = self.write_lock.lock();

        let txn = self.txn.load();
        let address = txn.allocator.allocate()?;
        txn.buffer.insert(address, Bytes::copy_from_slice(bytes));

        Ok(address)
    }

    /// Get the bytes behind an address
    ///
    /// Resolution order for a novelty address:
    /// 1. The open transaction's novelty buffer (not yet flushed)
    /// 2. The resolution table (flushed; read through the persisted path)
    /// 3. `AddressNotFound`
    ///
    /// A persisted address reads straight through the page store, with I/O
    /// failures reported as `StorageUnavailable` and unknown locations as
    /// `AddressNotFound`.
    pub fn get(&self, address: &Address) -> Result<Bytes> {
        if address.is_novelty() {
            let txn = self.txn.load();
            if let Some(bytes) = txn.buffer.get(address) {
                return Ok(bytes);
            }

            if let Some(persisted) = self.resolution.resolve(address) {
                return self.read_persisted(&persisted);
            }

            return Err(CairnError::AddressNotFound);
        }

        self.read_persisted(address)
    }

    /// Delete the entry behind an address
    ///
    /// A buffered novelty entry is dropped from the buffer; a flushed or
    /// persisted entry is deleted through the page store. The resolution
    /// table keeps its (now dangling) mapping — reclamation of published
    /// history is the store's compaction policy, not the core's.
    pub fn delete(&self, address: &Address) -> Result<()> {
        let _write_guard = self.write_lock.lock();

        if address.is_novelty() {
            let txn = self.txn.load();
            if txn.buffer.remove(address).is_some() {
                return Ok(());
            }

            if let Some(persisted) = self.resolution.resolve(address) {
                return self.pagestore.delete(Location::from_address(&persisted)?);
            }

            return Err(CairnError::AddressNotFound);
        }

        self.pagestore.delete(Location::from_address(address)?)
    }

    /// Flush the open transaction (public API)
    ///
    /// Persists every buffered novelty entry and publishes the promotions.
    /// Returns the delta so callers can rewrite addresses they still hold.
    pub fn flush(&self) -> Result<FlushDelta> {
        let _write_guard = self.write_lock.lock();
        self.flush_internal()
    }

    /// Discard the open transaction without persisting anything
    ///
    /// Every novelty address issued since the last flush becomes invalid;
    /// no page store side effect has occurred for them.
    pub fn rollback(&self) {
        let _write_guard = self.write_lock.lock();

        let txn = self.txn.load();
        let discarded = txn.buffer.entry_count();
        self.txn.store(Arc::new(Transaction::new()));

        tracing::debug!(discarded, "transaction rolled back");
    }

    /// Internal flush implementation (called with write lock held)
    ///
    /// All-or-nothing: any failure before the publish step aborts the whole
    /// flush. Locations already written to the page store become orphans
    /// for the store to reclaim; none of them is ever surfaced as a valid
    /// address.
    fn flush_internal(&self) -> Result<FlushDelta> {
        let txn = self.txn.load_full();

        // Skip if nothing was written
        if txn.buffer.is_empty() {
            return Ok(FlushDelta::default());
        }

        // Step 1: Persist every novelty entry through the page store
        let entries = txn.buffer.snapshot_sorted();
        let mut promoted = Vec::with_capacity(entries.len());
        for (novelty, payload) in &entries {
            let location = self.pagestore.write(payload)?;
            let persisted = location.to_address(payload.len())?;
            promoted.push((*novelty, persisted));
        }

        if self.config.sync_on_flush {
            self.pagestore.sync()?;
        }

        // Step 2: Record the batch durably before publishing it
        let sequence = self.flush_sequence.load(Ordering::SeqCst) + 1;
        let batch = PromotionBatch::new(
            sequence,
            promoted
                .iter()
                .map(|(novelty, persisted)| Promotion::new(novelty, persisted))
                .collect(),
        );
        {
            let mut manifest = self.manifest.lock();
            manifest.append(&batch)?;
            if self.config.sync_on_flush {
                manifest.sync()?;
            }
        }
        self.flush_sequence.store(sequence, Ordering::SeqCst);

        // Step 3: Publish, then retire the transaction scope
        //
        // Publish must come first: a reader racing this flush finds the
        // address in the old buffer until the swap, and in the table after
        // the publish — in both orders at least one source resolves it.
        let delta = FlushDelta { promoted };
        self.resolution.publish(&delta);
        self.txn.store(Arc::new(Transaction::new()));

        tracing::debug!(promoted = delta.len(), sequence, "flush published");

        Ok(delta)
    }

    /// Read through the page store behind a persisted address
    fn read_persisted(&self, address: &Address) -> Result<Bytes> {
        let location = Location::from_address(address)?;
        self.pagestore.read(location).map_err(|e| match e {
            // I/O trouble on the read path means the store, not the caller
            CairnError::Io(io) => CairnError::StorageUnavailable(io.to_string()),
            other => other,
        })
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Number of entries in the open transaction's novelty buffer
    pub fn pending_novelty_count(&self) -> usize {
        self.txn.load().buffer.entry_count()
    }

    /// Approximate payload bytes in the open transaction's novelty buffer
    pub fn pending_novelty_size(&self) -> usize {
        self.txn.load().buffer.size()
    }

    /// Number of published promotions in the resolution table
    pub fn published_count(&self) -> usize {
        self.resolution.len()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
