//! Storage key layout.
//!
//! All keys the repository writes through a backend are built here, so the
//! namespace is visible in one place:
//!
//! - `list-kit:index` — the reserved index blob
//! - `{collection}:{i}` — chunk `i` of a collection
//! - `{collection}:counter` — the collection's monotonic counter

/// Reserved key holding the encoded collection index.
pub const INDEX_KEY: &str = "list-kit:index";

/// Suffix of per-collection counter keys.
const COUNTER_SUFFIX: &str = "counter";

/// Key of chunk `index` belonging to `collection_uuid`.
pub fn chunk_key(collection_uuid: &str, index: u32) -> String {
    format!("{}:{}", collection_uuid, index)
}

/// Key of the monotonic counter belonging to `collection_uuid`.
pub fn counter_key(collection_uuid: &str) -> String {
    format!("{}:{}", collection_uuid, COUNTER_SUFFIX)
}

/// Parse the numeric suffix of a chunk key.
///
/// Chunk keys are self-describing; the repository uses this to derive the
/// next chunk index after interior compaction left gaps in the stored
/// numbering.
pub fn chunk_index(chunk_key: &str) -> Option<u32> {
    chunk_key.rsplit(':').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_key_layout() {
        assert_eq!(chunk_key("fake-list", 0), "fake-list:0");
        assert_eq!(chunk_key("fake-list", 12), "fake-list:12");
    }

    #[test]
    fn test_counter_key_layout() {
        assert_eq!(counter_key("fake-list"), "fake-list:counter");
    }

    #[test]
    fn test_chunk_index_parses_suffix() {
        assert_eq!(chunk_index("fake-list:3"), Some(3));
        assert_eq!(chunk_index("with:colons:in:name:7"), Some(7));
        assert_eq!(chunk_index("fake-list:counter"), None);
    }

    #[test]
    fn test_keys_do_not_collide() {
        // Counter suffix is non-numeric, chunk suffixes are numeric.
        assert_ne!(chunk_key("a", 0), counter_key("a"));
        assert_ne!(chunk_key("a", 0), INDEX_KEY);
    }
}
