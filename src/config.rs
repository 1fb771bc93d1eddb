//! Configuration for Cairn
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a Cairn store instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files (segments, manifest)
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── manifest.log     (promotion log, replayed on open)
    ///     └── segments/        (append-only segment files)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Segment Configuration
    // -------------------------------------------------------------------------
    /// Max size of a segment file before rolling to a new one (in bytes)
    pub segment_size_limit: u64,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// Whether to fsync segment and manifest files at the end of each flush
    pub sync_on_flush: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./cairn_data"),
            segment_size_limit: 256 * 1024 * 1024, // 256 MB
            sync_on_flush: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the segment size limit (in bytes)
    pub fn segment_size_limit(mut self, size: u64) -> Self {
        self.config.segment_size_limit = size;
        self
    }

    /// Set whether flush syncs files to disk before publishing
    pub fn sync_on_flush(mut self, sync: bool) -> Self {
        self.config.sync_on_flush = sync;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
