//! The collection index: a registry of every known collection.
//!
//! The index maps collection uuids to their [`Collection`] metadata and is
//! persisted as one envelope-encoded blob under [`crate::key::INDEX_KEY`],
//! through the same backend the chunks go to. It survives process restarts
//! as long as the backend does.
//!
//! Every mutation is a read-modify-write of the whole blob; the repository
//! serializes those behind its index mutex. See [`crate::repository`] for
//! the multi-process caveat.

use crate::collection::Collection;
use crate::error::Result;
use crate::serialization;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Registry mapping collection uuids to their metadata.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ListIndex {
    entries: HashMap<String, Collection>,
}

impl ListIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a collection's metadata.
    pub fn get(&self, uuid: &str) -> Option<&Collection> {
        self.entries.get(uuid)
    }

    /// Insert or replace a collection's metadata, keyed by its uuid.
    pub fn put(&mut self, meta: Collection) {
        self.entries.insert(meta.uuid.clone(), meta);
    }

    /// Remove a collection's metadata, returning it if present.
    pub fn remove(&mut self, uuid: &str) -> Option<Collection> {
        self.entries.remove(uuid)
    }

    /// Whether a collection is registered.
    pub fn contains(&self, uuid: &str) -> bool {
        self.entries.contains_key(uuid)
    }

    /// All registered collections, in no particular order.
    pub fn all(&self) -> impl Iterator<Item = &Collection> {
        self.entries.values()
    }

    /// Number of registered collections.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode the index for storage under the reserved key.
    pub fn encode(&self) -> Result<Vec<u8>> {
        serialization::encode(self)
    }

    /// Decode an index blob read from the reserved key.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        serialization::decode(bytes)
    }
}
