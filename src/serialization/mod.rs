//! Postcard-based storage codec with versioned envelopes.
//!
//! Everything list-kit persists through a backend — chunks, the collection
//! index, individual element bodies — goes through this module. Entries are
//! wrapped in a small envelope so corrupted or foreign data is rejected on
//! read instead of deserializing into garbage.
//!
//! ```text
//! ┌─────────────────┬─────────────────┬──────────────────────────┐
//! │  MAGIC (4 bytes)│VERSION (4 bytes)│POSTCARD PAYLOAD (N bytes)│
//! └─────────────────┴─────────────────┴──────────────────────────┘
//!   "LKIT"              u32 (LE)          postcard::to_allocvec(T)
//! ```
//!
//! Same value always produces identical bytes; magic and version are checked
//! on every decode. A schema bump forces eviction, never silent migration.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Magic header for list-kit storage entries: b"LKIT".
pub const STORAGE_MAGIC: [u8; 4] = *b"LKIT";

/// Current schema version.
///
/// Increment when making breaking changes to any persisted type
/// ([`crate::collection::Collection`], [`crate::element::ListElement`], the
/// index map). Entries written under an older version are rejected with
/// `Error::VersionMismatch` and must be recreated.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Versioned envelope wrapping every persisted value.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StorageEnvelope<T> {
    /// Magic header: must be b"LKIT"
    pub magic: [u8; 4],
    /// Schema version: must match CURRENT_SCHEMA_VERSION
    pub version: u32,
    /// The actual stored data
    pub payload: T,
}

impl<T> StorageEnvelope<T> {
    /// Create a new envelope with the current magic and version.
    pub fn new(payload: T) -> Self {
        Self {
            magic: STORAGE_MAGIC,
            version: CURRENT_SCHEMA_VERSION,
            payload,
        }
    }
}

/// Encode a value with envelope for backend storage.
///
/// # Errors
///
/// Returns `Error::SerializationError` if postcard serialization fails.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let envelope = StorageEnvelope::new(value);
    postcard::to_allocvec(&envelope).map_err(|e| {
        error!("Storage serialization failed: {}", e);
        Error::SerializationError(e.to_string())
    })
}

/// Decode a value from backend storage with validation.
///
/// # Errors
///
/// - `Error::DeserializationError`: corrupted postcard payload
/// - `Error::InvalidEnvelope`: bad magic header
/// - `Error::VersionMismatch`: schema version changed
pub fn decode<'de, T: Deserialize<'de>>(bytes: &'de [u8]) -> Result<T> {
    let envelope: StorageEnvelope<T> = postcard::from_bytes(bytes).map_err(|e| {
        error!("Storage deserialization failed: {}", e);
        Error::DeserializationError(e.to_string())
    })?;

    if envelope.magic != STORAGE_MAGIC {
        warn!(
            "Invalid storage entry: expected magic {:?}, got {:?}",
            STORAGE_MAGIC, envelope.magic
        );
        return Err(Error::InvalidEnvelope(format!(
            "invalid magic: expected {:?}, got {:?}",
            STORAGE_MAGIC, envelope.magic
        )));
    }

    if envelope.version != CURRENT_SCHEMA_VERSION {
        warn!(
            "Storage version mismatch: expected {}, got {}",
            CURRENT_SCHEMA_VERSION, envelope.version
        );
        return Err(Error::VersionMismatch {
            expected: CURRENT_SCHEMA_VERSION,
            found: envelope.version,
        });
    }

    Ok(envelope.payload)
}
