//! Memcached backend implementation.
//!
//! Mid capability level: native per-key expiry on set, no atomic-increment
//! override (the trait's read-modify-write default applies, which is fine
//! under the single-writer discipline the repository assumes).

use super::ListBackend;
use crate::error::{Error, Result};
use async_memcached::AsciiProtocol;
use deadpool_memcached::{Manager, Pool};
use std::time::Duration;

/// Default Memcached connection pool size.
/// Override with the MEMCACHED_POOL_SIZE environment variable.
const DEFAULT_POOL_SIZE: u32 = 16;

/// Configuration for the Memcached backend.
#[derive(Clone, Debug)]
pub struct MemcachedConfig {
    pub servers: Vec<String>, // e.g., ["localhost:11211", "cache2:11211"]
    pub connection_timeout: Duration,
    pub pool_size: u32,
}

impl Default for MemcachedConfig {
    fn default() -> Self {
        MemcachedConfig {
            servers: vec!["localhost:11211".to_string()],
            connection_timeout: Duration::from_secs(5),
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

/// Memcached backend with connection pooling and async operations.
///
/// # Example
///
/// ```no_run
/// # use list_kit::backend::{MemcachedBackend, MemcachedConfig, ListBackend};
/// # use list_kit::error::Result;
/// # async fn example() -> Result<()> {
/// let config = MemcachedConfig {
///     servers: vec!["localhost:11211".to_string()],
///     ..Default::default()
/// };
///
/// let backend = MemcachedBackend::new(config).await?;
/// backend.set("key", b"value".to_vec(), None).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MemcachedBackend {
    pool: Pool,
}

impl MemcachedBackend {
    /// Create a new Memcached backend from configuration.
    ///
    /// # Errors
    /// Returns `Err` if connection pool creation fails
    pub async fn new(config: MemcachedConfig) -> Result<Self> {
        // deadpool-memcached Manager takes a single server address;
        // use the first one from the list.
        let addr = config
            .servers
            .first()
            .ok_or_else(|| Error::ConfigError("No memcached servers specified".to_string()))?
            .clone();

        let manager = Manager::new(addr.clone());

        let pool = Pool::builder(manager)
            .max_size(config.pool_size as usize)
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to create connection pool: {}", e)))?;

        info!(
            "Memcached backend initialized with server: {} (pool size: {})",
            addr, config.pool_size
        );

        Ok(MemcachedBackend { pool })
    }

    /// Create from a server address directly.
    ///
    /// Pool size comes from the `MEMCACHED_POOL_SIZE` environment variable
    /// when set, otherwise `DEFAULT_POOL_SIZE`.
    ///
    /// # Errors
    /// Returns `Err` if connection pool creation fails
    pub async fn from_server(addr: String) -> Result<Self> {
        let pool_size = std::env::var("MEMCACHED_POOL_SIZE")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_POOL_SIZE);

        let config = MemcachedConfig {
            servers: vec![addr],
            pool_size,
            ..Default::default()
        };
        Self::new(config).await
    }
}

impl ListBackend for MemcachedBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.pool.get().await.map_err(|e| {
            Error::BackendUnavailable(format!("Failed to get Memcached connection: {}", e))
        })?;

        match conn.get(key).await {
            Ok(Some(value)) => {
                debug!("Memcached GET {} -> HIT", key);
                Ok(value.data)
            }
            Ok(None) => {
                debug!("Memcached GET {} -> MISS", key);
                Ok(None)
            }
            Err(e) => Err(Error::BackendUnavailable(format!(
                "Memcached GET failed for key {}: {}",
                key, e
            ))),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.pool.get().await.map_err(|e| {
            Error::BackendUnavailable(format!("Failed to get Memcached connection: {}", e))
        })?;

        // Memcached interprets values < 2592000 (30 days) as seconds from
        // now; None = never expires (may still be evicted under pressure).
        let expiration = ttl.map(|d| d.as_secs() as i64);

        conn.set(key, value.as_slice(), expiration, None)
            .await
            .map_err(|e| {
                Error::BackendUnavailable(format!("Memcached SET failed for key {}: {}", key, e))
            })?;

        if let Some(d) = ttl {
            debug!("Memcached SET {} (TTL: {:?})", key, d);
        } else {
            debug!("Memcached SET {}", key);
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.pool.get().await.map_err(|e| {
            Error::BackendUnavailable(format!("Failed to get Memcached connection: {}", e))
        })?;

        // Memcached errors on deleting a missing key; that's not a failure
        // for the repository's purposes.
        match conn.delete(key).await {
            Ok(()) => {
                debug!("Memcached DELETE {}", key);
                Ok(())
            }
            Err(e) => {
                let msg = e.to_string();
                if msg.contains("not found") {
                    debug!("Memcached DELETE {} (missing)", key);
                    Ok(())
                } else {
                    Err(Error::BackendUnavailable(format!(
                        "Memcached DELETE failed for key {}: {}",
                        key, e
                    )))
                }
            }
        }
    }

    async fn flush_all(&self) -> Result<()> {
        let mut conn = self.pool.get().await.map_err(|e| {
            Error::BackendUnavailable(format!("Failed to get Memcached connection: {}", e))
        })?;

        conn.flush_all()
            .await
            .map_err(|e| Error::BackendUnavailable(format!("Memcached FLUSH_ALL failed: {}", e)))?;

        warn!("Memcached FLUSH_ALL executed - all keys cleared");
        Ok(())
    }

    fn supports_native_ttl(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memcached_config_default() {
        let config = MemcachedConfig::default();
        assert_eq!(config.servers.len(), 1);
        assert_eq!(config.servers[0], "localhost:11211");
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
    }

    #[test]
    fn test_memcached_config_multiple_servers() {
        let config = MemcachedConfig {
            servers: vec![
                "localhost:11211".to_string(),
                "cache1:11211".to_string(),
                "cache2:11211".to_string(),
            ],
            connection_timeout: Duration::from_secs(5),
            pool_size: 20,
        };

        assert_eq!(config.servers.len(), 3);
        assert_eq!(config.pool_size, 20);
    }

    // Integration tests - require a running memcached server.
    // Run with: cargo test --features memcached -- --ignored
    #[tokio::test]
    #[ignore]
    async fn test_memcached_backend_new() {
        let result = MemcachedBackend::new(MemcachedConfig::default()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    #[ignore]
    async fn test_memcached_backend_set_get_delete() {
        let backend = MemcachedBackend::from_server("localhost:11211".to_string())
            .await
            .expect("Failed to create backend");

        backend
            .set("list_kit_test_key", b"test_value".to_vec(), None)
            .await
            .expect("Failed to set");

        let result = backend.get("list_kit_test_key").await.expect("Failed to get");
        assert_eq!(result, Some(b"test_value".to_vec()));

        backend
            .delete("list_kit_test_key")
            .await
            .expect("Failed to delete");

        let result = backend.get("list_kit_test_key").await.expect("Failed to get");
        assert_eq!(result, None);
    }

    #[tokio::test]
    #[ignore]
    async fn test_memcached_backend_ttl() {
        let backend = MemcachedBackend::from_server("localhost:11211".to_string())
            .await
            .expect("Failed to create backend");

        backend
            .set(
                "list_kit_ttl_key",
                b"expires_soon".to_vec(),
                Some(Duration::from_secs(2)),
            )
            .await
            .expect("Failed to set");

        assert!(backend
            .get("list_kit_ttl_key")
            .await
            .expect("Failed to get")
            .is_some());

        tokio::time::sleep(Duration::from_secs(3)).await;

        assert!(backend
            .get("list_kit_ttl_key")
            .await
            .expect("Failed to get")
            .is_none());
    }

    #[tokio::test]
    #[ignore]
    async fn test_memcached_backend_flush_all() {
        let backend = MemcachedBackend::from_server("localhost:11211".to_string())
            .await
            .expect("Failed to create backend");

        backend
            .set("list_kit_flush_key", b"value".to_vec(), None)
            .await
            .expect("Failed to set");

        backend.flush_all().await.expect("Failed to flush");

        let result = backend
            .get("list_kit_flush_key")
            .await
            .expect("Failed to get");
        assert_eq!(result, None);
    }
}
