//! The client facade: driver selection plus repository forwarding.
//!
//! [`Client`] is the front door for applications: pick a driver, get a
//! ready-wired [`ListRepository`], and call list operations directly on the
//! client. Library integrators who need the lower layers can reach the
//! repository (and through it the backend) via [`Client::repository`].

use crate::backend::{InMemoryBackend, ListBackend};
#[cfg(feature = "memcached")]
use crate::backend::{MemcachedBackend, MemcachedConfig};
#[cfg(feature = "redis")]
use crate::backend::{RedisBackend, RedisConfig};
use crate::collection::Collection;
use crate::element::{ListElement, ListRecord};
use crate::error::{Error, Result};
use crate::repository::{CreateOptions, ListRepository};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// The storage drivers a client can be built on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverKind {
    /// Process-local storage, no external service.
    InMemory,
    /// Redis over a deadpool connection pool (`redis` feature).
    Redis,
    /// Memcached over a deadpool connection pool (`memcached` feature).
    Memcached,
}

impl FromStr for DriverKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "inmemory" | "in-memory" => Ok(DriverKind::InMemory),
            "redis" => Ok(DriverKind::Redis),
            "memcached" => Ok(DriverKind::Memcached),
            other => Err(Error::UnsupportedDriver(other.to_string())),
        }
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DriverKind::InMemory => "inmemory",
            DriverKind::Redis => "redis",
            DriverKind::Memcached => "memcached",
        };
        write!(f, "{}", name)
    }
}

/// Facade over a [`ListRepository`] bound to a chosen driver.
///
/// All list operations forward to the repository; see [`ListRepository`] for
/// their exact semantics and error contracts.
pub struct Client<B: ListBackend> {
    driver: DriverKind,
    repository: ListRepository<B>,
}

impl Client<InMemoryBackend> {
    /// Client over process-local in-memory storage.
    pub fn in_memory() -> Self {
        Client::new(DriverKind::InMemory, InMemoryBackend::new())
    }
}

#[cfg(feature = "redis")]
impl Client<RedisBackend> {
    /// Client over Redis.
    ///
    /// # Errors
    /// Returns `Err` if pool creation fails.
    pub async fn redis(config: RedisConfig) -> Result<Self> {
        Ok(Client::new(
            DriverKind::Redis,
            RedisBackend::new(config).await?,
        ))
    }
}

#[cfg(feature = "memcached")]
impl Client<MemcachedBackend> {
    /// Client over Memcached.
    ///
    /// # Errors
    /// Returns `Err` if connection pool creation fails.
    pub async fn memcached(config: MemcachedConfig) -> Result<Self> {
        Ok(Client::new(
            DriverKind::Memcached,
            MemcachedBackend::new(config).await?,
        ))
    }
}

impl<B: ListBackend> Client<B> {
    /// Wrap an already-built backend. For custom [`ListBackend`]
    /// implementations use the [`DriverKind`] that best describes them.
    pub fn new(driver: DriverKind, backend: B) -> Self {
        Client {
            driver,
            repository: ListRepository::new(backend),
        }
    }

    /// Which driver this client was built on.
    pub fn driver(&self) -> DriverKind {
        self.driver
    }

    /// The underlying repository, for lower-level access.
    pub fn repository(&self) -> &ListRepository<B> {
        &self.repository
    }

    /// Create a new collection. See [`ListRepository::create`].
    pub async fn create<T: ListRecord>(
        &self,
        records: Vec<T>,
        options: &CreateOptions,
    ) -> Result<Collection> {
        self.repository.create(records, options).await
    }

    /// Retrieve all elements of a collection. See
    /// [`ListRepository::find_by_uuid`].
    pub async fn find_list_by_uuid(&self, uuid: &str) -> Result<Option<Vec<ListElement>>> {
        self.repository.find_by_uuid(uuid).await
    }

    /// Retrieve one element. See [`ListRepository::find_element`].
    pub async fn find_element(&self, uuid: &str, element_uuid: &str) -> Result<ListElement> {
        self.repository.find_element(uuid, element_uuid).await
    }

    /// Append an element. See [`ListRepository::push_element`].
    pub async fn push_element<T: ListRecord>(
        &self,
        uuid: &str,
        element_uuid: impl Into<String>,
        record: &T,
    ) -> Result<()> {
        self.repository.push_element(uuid, element_uuid, record).await
    }

    /// Replace an element's body. See [`ListRepository::update_element`].
    pub async fn update_element<T: ListRecord>(
        &self,
        uuid: &str,
        element_uuid: &str,
        record: &T,
    ) -> Result<()> {
        self.repository.update_element(uuid, element_uuid, record).await
    }

    /// Remove an element. See [`ListRepository::delete_element`].
    pub async fn delete_element(&self, uuid: &str, element_uuid: &str) -> Result<()> {
        self.repository.delete_element(uuid, element_uuid).await
    }

    /// Reset a collection's TTL. See [`ListRepository::update_ttl`].
    pub async fn update_ttl(&self, uuid: &str, seconds: u64) -> Result<()> {
        self.repository.update_ttl(uuid, seconds).await
    }

    /// A collection's configured TTL. See [`ListRepository::get_ttl`].
    pub async fn get_ttl(&self, uuid: &str) -> Result<Option<u64>> {
        self.repository.get_ttl(uuid).await
    }

    /// A collection's headers. See [`ListRepository::get_headers`].
    pub async fn get_headers(&self, uuid: &str) -> Result<HashMap<String, String>> {
        self.repository.get_headers(uuid).await
    }

    /// A collection's monotonic counter. See [`ListRepository::get_counter`].
    pub async fn get_counter(&self, uuid: &str) -> Result<i64> {
        self.repository.get_counter(uuid).await
    }

    /// Delete a collection. See [`ListRepository::delete`].
    pub async fn delete(&self, uuid: &str) -> Result<()> {
        self.repository.delete(uuid).await
    }

    /// Drop a collection's index entry only. See
    /// [`ListRepository::remove_from_index`].
    pub async fn remove_list_from_index(&self, uuid: &str) -> Result<()> {
        self.repository.remove_from_index(uuid).await
    }

    /// Number of live collections. See [`ListRepository::index_len`].
    pub async fn index_len(&self) -> Result<usize> {
        self.repository.index_len().await
    }

    /// Remove everything. See [`ListRepository::flush`].
    pub async fn flush(&self) -> Result<()> {
        self.repository.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_kind_from_str() {
        assert_eq!(
            "inmemory".parse::<DriverKind>().expect("Failed to parse"),
            DriverKind::InMemory
        );
        assert_eq!(
            "in-memory".parse::<DriverKind>().expect("Failed to parse"),
            DriverKind::InMemory
        );
        assert_eq!(
            "Redis".parse::<DriverKind>().expect("Failed to parse"),
            DriverKind::Redis
        );
        assert_eq!(
            "memcached".parse::<DriverKind>().expect("Failed to parse"),
            DriverKind::Memcached
        );
    }

    #[test]
    fn test_unsupported_driver_is_rejected() {
        let err = "not-allowed-driver".parse::<DriverKind>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "not-allowed-driver is not a supported driver."
        );
    }

    #[test]
    fn test_driver_kind_display() {
        assert_eq!(DriverKind::InMemory.to_string(), "inmemory");
        assert_eq!(DriverKind::Redis.to_string(), "redis");
        assert_eq!(DriverKind::Memcached.to_string(), "memcached");
    }

    #[tokio::test]
    async fn test_in_memory_client_reports_driver() {
        let client = Client::in_memory();
        assert_eq!(client.driver(), DriverKind::InMemory);
        assert_eq!(client.index_len().await.expect("Failed to read index"), 0);
    }
}
