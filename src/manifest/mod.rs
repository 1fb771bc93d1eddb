//! Manifest Module
//!
//! Durable log of published promotions.
//!
//! ## Responsibilities
//! - Append one record per flush, carrying the whole promotion batch
//! - Replay records on open to rebuild the resolution table
//! - Detect and drop a torn final record (partial write at crash)
//!
//! ## Log Format
//!
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Len (4)  │ CRC (4)  │   bincode(PromotionBatch)   │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! A batch is one frame, so replay sees each flush all-or-nothing: a frame
//! that fails its length or CRC check ends the replay and everything after
//! it is ignored.

mod reader;
mod record;
mod writer;

pub use reader::{ManifestReader, ReplayStats};
pub use record::{Promotion, PromotionBatch};
pub use writer::ManifestWriter;

/// Frame header size: 4 bytes length + 4 bytes CRC
pub(crate) const FRAME_HEADER_SIZE: usize = 8;

/// Upper bound on one encoded batch (guards replay against garbage lengths)
pub(crate) const MAX_BATCH_SIZE: u32 = 1 << 28;
