//! Collection metadata as kept in the index.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Upper bound accepted for collection TTLs, in seconds (10,000 years).
///
/// Larger values cannot be represented as a chrono duration; the repository
/// rejects them at the options boundary and `Collection` clamps to this
/// bound when constructing its expiry clock.
pub const MAX_TTL_SECONDS: u64 = 315_360_000_000;

/// Normalize a caller-chosen uuid to slug form: lowercased, whitespace runs
/// replaced with single hyphens ("Fake List" -> "fake-list").
pub fn normalize_uuid(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Metadata of one named collection, as stored in the index.
///
/// Element bodies live in the chunks; this is everything the repository needs
/// to locate, expire and account for them. `items_count` always equals the
/// number of live elements reachable through `chunk_uuids`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Collection {
    /// Slug-normalized identifier, unique across the index.
    pub uuid: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Configured TTL in seconds. `None` = no expiry.
    pub ttl: Option<u64>,
    /// Repository-side expiry clock, independent of backend-native expiry.
    pub expires_at: Option<DateTime<Utc>>,
    /// Maximum elements per chunk. `None` = one unbounded chunk.
    pub chunk_size: Option<usize>,
    /// Ordered chunk keys. Stored indices may have gaps after interior
    /// compaction; this sequence is the declared order.
    pub chunk_uuids: Vec<String>,
    /// Number of live elements.
    pub items_count: usize,
    /// Caller-supplied metadata attached to the collection.
    pub headers: HashMap<String, String>,
}

impl Collection {
    /// Create metadata for a fresh collection.
    pub fn new(
        uuid: String,
        ttl: Option<u64>,
        chunk_size: Option<usize>,
        headers: HashMap<String, String>,
    ) -> Self {
        let now = Utc::now();
        Collection {
            uuid,
            created_at: now,
            updated_at: now,
            ttl,
            expires_at: ttl
                .map(|secs| now + ChronoDuration::seconds(secs.min(MAX_TTL_SECONDS) as i64)),
            chunk_size,
            chunk_uuids: Vec::new(),
            items_count: 0,
            headers,
        }
    }

    /// Whether the collection's own TTL clock has lapsed.
    ///
    /// Checked on every read regardless of backend-native expiry, because not
    /// all backends expire entries automatically.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Utc::now() > exp)
    }

    /// Remaining time until expiry, for passing to backend writes.
    ///
    /// `None` when the collection has no TTL; `Some(0)` when already lapsed.
    pub fn remaining_ttl(&self) -> Option<Duration> {
        let expires_at = self.expires_at?;
        let remaining = (expires_at - Utc::now()).num_seconds().max(0);
        Some(Duration::from_secs(remaining as u64))
    }

    /// Reset the TTL and expiry clock, touching `updated_at`.
    ///
    /// Values above [`MAX_TTL_SECONDS`] are clamped to keep the expiry clock
    /// representable.
    pub fn set_ttl(&mut self, seconds: u64) {
        let now = Utc::now();
        self.ttl = Some(seconds);
        self.expires_at = Some(now + ChronoDuration::seconds(seconds.min(MAX_TTL_SECONDS) as i64));
        self.updated_at = now;
    }

    /// Mark the collection as mutated.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
