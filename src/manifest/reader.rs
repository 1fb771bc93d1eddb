//! Manifest reader
//!
//! Replays the manifest on open, tolerating a torn final record.

use std::fs;
use std::path::Path;

use crate::error::{CairnError, Result};

use super::record::PromotionBatch;
use super::{FRAME_HEADER_SIZE, MAX_BATCH_SIZE};

/// Statistics from a manifest replay
#[derive(Debug, Clone, Default)]
pub struct ReplayStats {
    /// Complete batches replayed
    pub batches_replayed: usize,

    /// Total promotions across those batches
    pub promotions_replayed: usize,

    /// Whether a torn or corrupt tail frame was dropped
    pub tail_dropped: bool,
}

/// Replays the manifest file
pub struct ManifestReader;

impl ManifestReader {
    /// Replay all complete batches from the manifest
    ///
    /// A frame with a truncated header, truncated payload, garbage length,
    /// or CRC mismatch ends the replay: that frame and everything after it
    /// is dropped. Only a clean prefix of the log is ever trusted.
    pub fn replay(path: &Path) -> Result<(Vec<PromotionBatch>, ReplayStats)> {
        let mut batches = Vec::new();
        let mut stats = ReplayStats::default();

        if !path.exists() {
            return Ok((batches, stats));
        }

        let data = fs::read(path)?;
        let mut pos = 0usize;

        while pos < data.len() {
            // Truncated header: torn final write
            if pos + FRAME_HEADER_SIZE > data.len() {
                stats.tail_dropped = true;
                break;
            }

            let len = u32::from_le_bytes(data[pos..pos + 4].try_into().unwrap());
            let expected_crc = u32::from_le_bytes(data[pos + 4..pos + 8].try_into().unwrap());

            if len > MAX_BATCH_SIZE {
                stats.tail_dropped = true;
                break;
            }

            let payload_start = pos + FRAME_HEADER_SIZE;
            let payload_end = payload_start + len as usize;

            // Truncated payload: torn final write
            if payload_end > data.len() {
                stats.tail_dropped = true;
                break;
            }

            let payload = &data[payload_start..payload_end];

            let mut hasher = crc32fast::Hasher::new();
            hasher.update(payload);
            if hasher.finalize() != expected_crc {
                stats.tail_dropped = true;
                break;
            }

            let batch: PromotionBatch = bincode::deserialize(payload)
                .map_err(|e| CairnError::Manifest(format!("failed to decode batch: {}", e)))?;

            stats.batches_replayed += 1;
            stats.promotions_replayed += batch.promotions.len();
            batches.push(batch);

            pos = payload_end;
        }

        if stats.tail_dropped {
            tracing::warn!(
                replayed = stats.batches_replayed,
                "dropped torn tail record during manifest replay"
            );
        }

        Ok((batches, stats))
    }
}
