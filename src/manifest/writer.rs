//! Manifest writer
//!
//! Handles appending promotion batches to the manifest file.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::error::{CairnError, Result};

use super::record::PromotionBatch;
use super::MAX_BATCH_SIZE;

/// Appends promotion batches to the manifest file
pub struct ManifestWriter {
    /// Open manifest file, positioned at the end
    file: File,
}

impl ManifestWriter {
    /// Open or create the manifest file for appending
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }

    /// Append one batch as a single CRC-framed record
    ///
    /// The frame is written with one `write_all` per section but replayed
    /// all-or-nothing: a torn write is dropped by the reader's length/CRC
    /// checks, so a crash mid-append can never surface a partial batch.
    pub fn append(&mut self, batch: &PromotionBatch) -> Result<()> {
        let payload = bincode::serialize(batch)
            .map_err(|e| CairnError::Manifest(format!("failed to encode batch: {}", e)))?;

        if payload.len() > MAX_BATCH_SIZE as usize {
            return Err(CairnError::Manifest(format!(
                "batch of {} bytes exceeds maximum {}",
                payload.len(),
                MAX_BATCH_SIZE
            )));
        }

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&payload);
        let crc = hasher.finalize();

        self.file.write_all(&(payload.len() as u32).to_le_bytes())?;
        self.file.write_all(&crc.to_le_bytes())?;
        self.file.write_all(&payload)?;

        Ok(())
    }

    /// Force the manifest to durable storage
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }
}
