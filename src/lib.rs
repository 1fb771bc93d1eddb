//! # Cairn
//!
//! The identity and indirection core of a copy-on-write, versioned storage
//! engine:
//! - A 128-bit address space split into two disjoint regions: **novelty**
//!   addresses for entries created inside an uncommitted transaction, and
//!   **persisted** addresses for entries durably located in a page store
//! - A per-transaction allocator guaranteeing collision-freedom between the
//!   two independently numbered spaces
//! - Atomic promotion of novelty to persisted identity at flush, without
//!   breaking in-flight readers
//! - Bit-exact external encodings (binary, Base64 text, two-field decimal)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Engine                                │
//! │                  (put / get / flush)                         │
//! └──────┬──────────────────┬──────────────────┬────────────────┘
//!        │                  │                  │
//!        ▼                  ▼                  ▼
//! ┌─────────────┐   ┌──────────────┐   ┌──────────────┐
//! │   Novelty   │   │  Resolution  │   │  Page Store  │
//! │ Alloc+Buffer│   │    Table     │   │  (segments)  │
//! │ (txn-local) │   │ (atomic swap)│   └──────┬───────┘
//! └─────────────┘   └──────────────┘          │
//!                                             ▼
//!                                      ┌──────────────┐
//!                                      │   Manifest   │
//!                                      │ (replay log) │
//!                                      └──────────────┘
//! ```
//!
//! A writer `put`s bytes into the transaction-local novelty buffer under a
//! freshly allocated novelty address. `flush` persists each entry through
//! the page store, records the promotion batch in the manifest, and
//! publishes the batch into the resolution table with a single atomic
//! snapshot swap. Readers follow either kind of address transparently.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod address;
pub mod novelty;
pub mod pagestore;
pub mod resolution;
pub mod manifest;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CairnError, Result};
pub use config::Config;
pub use address::Address;
pub use engine::Engine;
pub use resolution::{FlushDelta, ResolutionTable};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of Cairn
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
