//! Error types for Cairn
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using CairnError
pub type Result<T> = std::result::Result<T, CairnError>;

/// Unified error type for Cairn operations
#[derive(Debug, Error)]
pub enum CairnError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Address Errors
    // -------------------------------------------------------------------------
    #[error("invalid address construction: {0}")]
    InvalidAddressConstruction(String),

    #[error("malformed address: {0}")]
    MalformedAddress(String),

    #[error("address not found")]
    AddressNotFound,

    // -------------------------------------------------------------------------
    // Page Store Errors
    // -------------------------------------------------------------------------
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("corrupt data: {0}")]
    Corrupt(String),

    // -------------------------------------------------------------------------
    // Manifest Errors
    // -------------------------------------------------------------------------
    #[error("manifest error: {0}")]
    Manifest(String),
}
