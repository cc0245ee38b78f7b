//! Cache backend implementations.

use crate::error::Result;
use std::time::Duration;

pub mod inmemory;
#[cfg(feature = "memcached")]
pub mod memcached;
#[cfg(feature = "redis")]
pub mod redis;

pub use inmemory::InMemoryBackend;
#[cfg(feature = "memcached")]
pub use memcached::{MemcachedBackend, MemcachedConfig};
#[cfg(feature = "redis")]
pub use redis::{RedisBackend, RedisConfig};

/// Minimal key-value capability interface the list repository relies on.
///
/// Backends know nothing about collections, chunks or elements — only opaque
/// string keys and byte payloads. The repository builds all list semantics on
/// top of these primitives.
///
/// **IMPORTANT:** All methods take `&self` to allow concurrent access.
/// Implementations should use interior mutability (DashMap, locks) or
/// external storage.
///
/// Capability flags advertise what the backend does natively; the repository
/// uses them opportunistically but never relies on them for correctness. TTL
/// expiry is always re-checked lazily against collection metadata, and
/// counters go through [`increment`](ListBackend::increment), whose default
/// is a plain read-modify-write.
#[allow(async_fn_in_trait)]
pub trait ListBackend: Send + Sync + Clone {
    /// Retrieve a value by key.
    ///
    /// # Returns
    /// - `Ok(Some(bytes))` - Value found
    /// - `Ok(None)` - Key not found
    ///
    /// # Errors
    /// Returns `Err` on backend failure (connection lost, etc.)
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store a value with optional TTL.
    ///
    /// `ttl: None` means no expiry (or backend default). Backends without
    /// native per-key expiry may ignore the TTL; the repository's lazy-expiry
    /// check covers them.
    ///
    /// # Errors
    /// Returns `Err` on backend failure
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()>;

    /// Remove a value. Deleting a missing key is not an error.
    ///
    /// # Errors
    /// Returns `Err` on backend failure
    async fn delete(&self, key: &str) -> Result<()>;

    /// Remove every key in the backend. Used by `flush()`; use with caution.
    ///
    /// # Errors
    /// Returns `Err` on backend failure
    async fn flush_all(&self) -> Result<()>;

    /// Increment an ASCII-decimal counter key, returning the new value.
    ///
    /// A missing key counts as 0. The default implementation is a
    /// read-modify-write and is only safe under a single writer; backends
    /// with a native atomic increment (Redis `INCR`) override it and report
    /// `supports_atomic_increment() == true`.
    ///
    /// # Errors
    /// Returns `Err` on backend failure, or `DeserializationError` if the
    /// existing value is not an ASCII integer.
    async fn increment(&self, key: &str) -> Result<i64> {
        let current = match self.get(key).await? {
            Some(bytes) => parse_counter(key, &bytes)?,
            None => 0,
        };
        let next = current + 1;
        self.set(key, next.to_string().into_bytes(), None).await?;
        Ok(next)
    }

    /// Whether [`increment`](ListBackend::increment) is atomic under
    /// concurrent writers.
    fn supports_atomic_increment(&self) -> bool {
        false
    }

    /// Whether the backend expires keys natively when a TTL is passed to
    /// [`set`](ListBackend::set).
    fn supports_native_ttl(&self) -> bool {
        false
    }
}

/// Parse an ASCII-decimal counter payload.
pub(crate) fn parse_counter(key: &str, bytes: &[u8]) -> Result<i64> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .ok_or_else(|| {
            crate::error::Error::DeserializationError(format!(
                "counter key {} does not hold an ASCII integer",
                key
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_increment_default_from_missing_key() {
        let backend = InMemoryBackend::new();
        assert_eq!(backend.increment("counter").await.expect("increment"), 1);
        assert_eq!(backend.increment("counter").await.expect("increment"), 2);
    }

    #[tokio::test]
    async fn test_increment_default_from_seeded_key() {
        let backend = InMemoryBackend::new();
        backend
            .set("counter", b"41".to_vec(), None)
            .await
            .expect("Failed to set counter");
        assert_eq!(backend.increment("counter").await.expect("increment"), 42);
    }

    #[tokio::test]
    async fn test_increment_rejects_non_numeric_value() {
        let backend = InMemoryBackend::new();
        backend
            .set("counter", b"not a number".to_vec(), None)
            .await
            .expect("Failed to set counter");
        assert!(backend.increment("counter").await.is_err());
    }

    #[test]
    fn test_capability_flags_default_off() {
        let backend = InMemoryBackend::new();
        assert!(!backend.supports_atomic_increment());
        assert!(!backend.supports_native_ttl());
    }
}
