//! The chunked list repository - core engine.
//!
//! Owns collection creation, retrieval, mutation and deletion; chunk
//! splitting and reassembly; and the collection index. Raw storage is
//! delegated to a [`ListBackend`]; the backend sees only opaque keys and
//! byte payloads.

use crate::backend::{parse_counter, ListBackend};
use crate::collection::{normalize_uuid, Collection, MAX_TTL_SECONDS};
use crate::element::{resolve_element_uuid, ListElement, ListRecord};
use crate::error::{Error, Result};
use crate::index::ListIndex;
use crate::key::{self, INDEX_KEY};
use crate::observability::{ListMetrics, NoOpMetrics};
use crate::serialization;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Options recognized by [`ListRepository::create`].
///
/// Build directly with the `with_*` setters, or parse a caller-supplied map
/// through [`CreateOptions::from_value`], which rejects unrecognized keys
/// with `Error::MalformedConfig`. Map keys are kebab-case: `uuid`,
/// `element-uuid`, `chunk-size`, `ttl`, `headers`.
///
/// # Example
///
/// ```
/// use list_kit::CreateOptions;
/// use serde_json::json;
///
/// let options = CreateOptions::from_value(json!({
///     "uuid": "fake list",
///     "element-uuid": "id",
///     "chunk-size": 10,
///     "ttl": 3600,
/// })).unwrap();
/// assert_eq!(options.chunk_size, Some(10));
///
/// assert!(CreateOptions::from_value(json!({"not-allowed-key": 1})).is_err());
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", default)]
pub struct CreateOptions {
    /// Collection identifier; generated (v4) when omitted, slug-normalized
    /// either way.
    pub uuid: Option<String>,
    /// Record field used to derive element identifiers; ordinal position
    /// when omitted.
    pub element_uuid: Option<String>,
    /// Maximum elements per chunk; 0 or omitted means one unbounded chunk.
    pub chunk_size: Option<usize>,
    /// Collection TTL in seconds; 0 or omitted means no expiry.
    pub ttl: Option<u64>,
    /// Caller metadata attached to the collection.
    pub headers: HashMap<String, String>,
}

impl CreateOptions {
    /// Parse options from a caller-supplied map.
    ///
    /// # Errors
    /// Returns `Error::MalformedConfig` on any unrecognized option key or
    /// mistyped value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::MalformedConfig(e.to_string()))
    }

    /// Set the collection uuid.
    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = Some(uuid.into());
        self
    }

    /// Set the element identity field.
    pub fn with_element_uuid(mut self, field: impl Into<String>) -> Self {
        self.element_uuid = Some(field.into());
        self
    }

    /// Set the chunk size.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = Some(size);
        self
    }

    /// Set the TTL in seconds.
    pub fn with_ttl(mut self, seconds: u64) -> Self {
        self.ttl = Some(seconds);
        self
    }

    /// Attach one header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Replace all headers.
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    fn effective_chunk_size(&self) -> Option<usize> {
        self.chunk_size.filter(|k| *k > 0)
    }

    fn effective_ttl(&self) -> Option<u64> {
        self.ttl.filter(|t| *t > 0)
    }
}

/// Reject TTLs the expiry clock cannot represent.
fn validate_ttl(seconds: u64) -> Result<()> {
    if seconds > MAX_TTL_SECONDS {
        return Err(Error::MalformedConfig(format!(
            "ttl {} exceeds the maximum of {} seconds",
            seconds, MAX_TTL_SECONDS
        )));
    }
    Ok(())
}

/// The chunked list repository.
///
/// Stateless request/response logic: every operation runs to completion on
/// the calling task, with no background work. The single shared mutable
/// resource is the index blob under the reserved key; all operations take a
/// process-local mutex around its read-modify-write, which makes concurrent
/// tasks within one process safe.
///
/// **Multi-process caveat:** the index read-modify-write is NOT safe under
/// concurrent writers from multiple processes. Either keep a single writer
/// per collection uuid, or layer an atomic compare-and-swap / locking
/// discipline over the backend.
///
/// **Partial creates:** chunk writes inside `create` are sequential with no
/// cross-chunk atomicity. A failure mid-create leaves the index unwritten,
/// so the collection reads as nonexistent; already-written chunk keys leak
/// until a `flush`. Accepted tradeoff, not hidden.
///
/// Every operation slug-normalizes the collection uuid the way `create`
/// does, so `find_by_uuid("Fake List")` finds the collection created as
/// `"fake-list"`.
pub struct ListRepository<B: ListBackend> {
    backend: B,
    metrics: Box<dyn ListMetrics>,
    index_lock: Mutex<()>,
}

impl<B: ListBackend> ListRepository<B> {
    /// Create a repository over the given backend.
    pub fn new(backend: B) -> Self {
        ListRepository {
            backend,
            metrics: Box::new(NoOpMetrics),
            index_lock: Mutex::new(()),
        }
    }

    /// Set a custom metrics handler.
    pub fn with_metrics(mut self, metrics: Box<dyn ListMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Backend reference (for advanced use).
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Create a new collection from `records`.
    ///
    /// Element identities are resolved for every record up front, so an
    /// invalid identity field fails before anything is written
    /// (all-or-nothing). Records are partitioned into chunks of
    /// `chunk_size` (one chunk holding everything when unset), each chunk is
    /// written through the backend, and the index entry is written last.
    ///
    /// # Errors
    /// - `Error::CollectionAlreadyExists`: uuid already in the index
    /// - `Error::InvalidElementKey`: declared identity field unresolvable
    /// - `Error::BackendUnavailable`: storage failure
    pub async fn create<T: ListRecord>(
        &self,
        records: Vec<T>,
        options: &CreateOptions,
    ) -> Result<Collection> {
        let timer = Instant::now();
        let raw_uuid = options
            .uuid
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let uuid = normalize_uuid(&raw_uuid);
        if let Some(ttl) = options.ttl {
            validate_ttl(ttl)?;
        }

        let _guard = self.index_lock.lock().await;
        let mut index = self.load_index().await?;
        if self.live_meta(&mut index, &uuid).await?.is_some() {
            self.metrics.record_error(&uuid, "collection already exists");
            return Err(Error::CollectionAlreadyExists(uuid));
        }

        // Resolve every element identity before the first write
        let mut elements = Vec::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            let element_uuid =
                resolve_element_uuid(record, options.element_uuid.as_deref(), position)?;
            elements.push(ListElement::new(element_uuid, record)?);
        }

        let mut meta = Collection::new(
            uuid.clone(),
            options.effective_ttl(),
            options.effective_chunk_size(),
            options.headers.clone(),
        );
        let ttl = meta.remaining_ttl();

        let chunks: Vec<&[ListElement]> = match meta.chunk_size {
            Some(size) => elements.chunks(size).collect(),
            None if elements.is_empty() => Vec::new(),
            None => vec![elements.as_slice()],
        };
        for (i, chunk) in chunks.iter().enumerate() {
            let chunk_key = key::chunk_key(&uuid, i as u32);
            self.store_chunk(&chunk_key, chunk, ttl).await?;
            meta.chunk_uuids.push(chunk_key);
        }
        meta.items_count = elements.len();

        // Seed the monotonic counter at the created element count
        self.backend
            .set(
                &key::counter_key(&uuid),
                elements.len().to_string().into_bytes(),
                None,
            )
            .await?;

        index.put(meta.clone());
        self.store_index(&index).await?;

        self.metrics.record_write(&uuid, timer.elapsed());
        info!(
            "Created list {} ({} elements, {} chunks)",
            uuid,
            meta.items_count,
            meta.chunk_uuids.len()
        );
        Ok(meta)
    }

    /// Retrieve all elements of a collection, in declared order.
    ///
    /// Returns `Ok(None)` for a collection that never existed or whose TTL
    /// clock has lapsed (expired collections are purged on this read).
    ///
    /// # Errors
    /// Returns `Err` only on storage or codec failures.
    pub async fn find_by_uuid(&self, uuid: &str) -> Result<Option<Vec<ListElement>>> {
        let timer = Instant::now();
        let uuid = normalize_uuid(uuid);
        let _guard = self.index_lock.lock().await;
        let mut index = self.load_index().await?;
        let Some(meta) = self.live_meta(&mut index, &uuid).await? else {
            self.metrics.record_miss(&uuid, timer.elapsed());
            return Ok(None);
        };

        let mut elements = Vec::with_capacity(meta.items_count);
        for chunk_key in &meta.chunk_uuids {
            elements.extend(self.load_chunk(chunk_key).await?);
        }

        self.metrics.record_hit(&uuid, timer.elapsed());
        Ok(Some(elements))
    }

    /// Retrieve a single element by its identifier.
    ///
    /// Scans chunks in declared order until found: O(chunk count) backend
    /// reads worst case. There is no secondary index over chunk contents.
    ///
    /// # Errors
    /// - `Error::CollectionNotFound`: collection missing or expired
    /// - `Error::ElementNotFound`: no element with that identifier
    pub async fn find_element(&self, uuid: &str, element_uuid: &str) -> Result<ListElement> {
        let timer = Instant::now();
        let uuid = normalize_uuid(uuid);
        let _guard = self.index_lock.lock().await;
        let mut index = self.load_index().await?;
        let Some(meta) = self.live_meta(&mut index, &uuid).await? else {
            self.metrics.record_miss(&uuid, timer.elapsed());
            return Err(Error::CollectionNotFound(uuid));
        };

        for chunk_key in &meta.chunk_uuids {
            let chunk = self.load_chunk(chunk_key).await?;
            if let Some(element) = chunk.into_iter().find(|e| e.uuid == element_uuid) {
                self.metrics.record_hit(chunk_key, timer.elapsed());
                return Ok(element);
            }
        }

        self.metrics.record_miss(&uuid, timer.elapsed());
        Err(Error::ElementNotFound(element_uuid.to_string()))
    }

    /// Append an element to a collection.
    ///
    /// Always targets the last chunk by position: the element goes there if
    /// the chunk has capacity, otherwise a fresh chunk is appended to the
    /// declared order. Interior deletes never redirect a push. Increments
    /// `items_count` and the collection's monotonic counter.
    ///
    /// # Errors
    /// - `Error::CollectionNotFound`: collection missing or expired
    /// - `Error::ElementAlreadyExists`: identifier already present
    pub async fn push_element<T: ListRecord>(
        &self,
        uuid: &str,
        element_uuid: impl Into<String>,
        record: &T,
    ) -> Result<()> {
        let timer = Instant::now();
        let uuid = normalize_uuid(uuid);
        let element_uuid = element_uuid.into();
        let _guard = self.index_lock.lock().await;
        let mut index = self.load_index().await?;
        let Some(mut meta) = self.live_meta(&mut index, &uuid).await? else {
            return Err(Error::CollectionNotFound(uuid));
        };
        let ttl = meta.remaining_ttl();

        // Uniqueness check walks every chunk; remember the last one since
        // that is where the append lands.
        let mut last: Option<(String, Vec<ListElement>)> = None;
        for chunk_key in &meta.chunk_uuids {
            let chunk = self.load_chunk(chunk_key).await?;
            if chunk.iter().any(|e| e.uuid == element_uuid) {
                self.metrics.record_error(&uuid, "element already exists");
                return Err(Error::ElementAlreadyExists(element_uuid));
            }
            last = Some((chunk_key.clone(), chunk));
        }

        let element = ListElement::new(element_uuid, record)?;
        match last {
            Some((chunk_key, mut chunk))
                if meta.chunk_size.map_or(true, |size| chunk.len() < size) =>
            {
                chunk.push(element);
                self.store_chunk(&chunk_key, &chunk, ttl).await?;
            }
            _ => {
                // Last chunk at capacity, or collection created empty
                let next_index = meta
                    .chunk_uuids
                    .last()
                    .and_then(|k| key::chunk_index(k))
                    .map_or(0, |i| i + 1);
                let chunk_key = key::chunk_key(&uuid, next_index);
                self.store_chunk(&chunk_key, &[element], ttl).await?;
                meta.chunk_uuids.push(chunk_key);
            }
        }

        meta.items_count += 1;
        meta.touch();
        self.backend.increment(&key::counter_key(&uuid)).await?;
        index.put(meta);
        self.store_index(&index).await?;

        self.metrics.record_write(&uuid, timer.elapsed());
        Ok(())
    }

    /// Replace an element's body in place.
    ///
    /// Only the owning chunk is rewritten (a single backend `set`); sibling
    /// elements and other chunks are untouched.
    ///
    /// # Errors
    /// - `Error::CollectionNotFound`: collection missing or expired
    /// - `Error::ElementNotFound`: no element with that identifier
    pub async fn update_element<T: ListRecord>(
        &self,
        uuid: &str,
        element_uuid: &str,
        record: &T,
    ) -> Result<()> {
        let timer = Instant::now();
        let uuid = normalize_uuid(uuid);
        let _guard = self.index_lock.lock().await;
        let mut index = self.load_index().await?;
        let Some(mut meta) = self.live_meta(&mut index, &uuid).await? else {
            return Err(Error::CollectionNotFound(uuid));
        };

        let mut target: Option<(String, Vec<ListElement>)> = None;
        for chunk_key in &meta.chunk_uuids {
            let mut chunk = self.load_chunk(chunk_key).await?;
            if let Some(element) = chunk.iter_mut().find(|e| e.uuid == element_uuid) {
                element.replace_body(record)?;
                target = Some((chunk_key.clone(), chunk));
                break;
            }
        }
        let Some((chunk_key, chunk)) = target else {
            return Err(Error::ElementNotFound(element_uuid.to_string()));
        };

        self.store_chunk(&chunk_key, &chunk, meta.remaining_ttl())
            .await?;
        meta.touch();
        index.put(meta);
        self.store_index(&index).await?;

        self.metrics.record_write(&uuid, timer.elapsed());
        Ok(())
    }

    /// Remove an element from a collection.
    ///
    /// The element is removed from its chunk's record, not the whole chunk.
    /// A chunk that empties and is not the sole chunk is deleted and removed
    /// from the declared order; stored chunk indices are not re-sequenced,
    /// so gaps in the numbering are tolerated. Decrements `items_count`.
    ///
    /// # Errors
    /// - `Error::CollectionNotFound`: collection missing or expired
    /// - `Error::ElementNotFound`: no element with that identifier
    ///   (no side effects)
    pub async fn delete_element(&self, uuid: &str, element_uuid: &str) -> Result<()> {
        let timer = Instant::now();
        let uuid = normalize_uuid(uuid);
        let _guard = self.index_lock.lock().await;
        let mut index = self.load_index().await?;
        let Some(mut meta) = self.live_meta(&mut index, &uuid).await? else {
            return Err(Error::CollectionNotFound(uuid));
        };

        let mut target: Option<(usize, Vec<ListElement>)> = None;
        for (position, chunk_key) in meta.chunk_uuids.iter().enumerate() {
            let mut chunk = self.load_chunk(chunk_key).await?;
            if let Some(i) = chunk.iter().position(|e| e.uuid == element_uuid) {
                chunk.remove(i);
                target = Some((position, chunk));
                break;
            }
        }
        let Some((position, chunk)) = target else {
            return Err(Error::ElementNotFound(element_uuid.to_string()));
        };

        let chunk_key = meta.chunk_uuids[position].clone();
        if chunk.is_empty() && meta.chunk_uuids.len() > 1 {
            // Interior or terminal empty chunk: compact immediately
            self.backend.delete(&chunk_key).await?;
            meta.chunk_uuids.remove(position);
        } else {
            self.store_chunk(&chunk_key, &chunk, meta.remaining_ttl())
                .await?;
        }

        meta.items_count -= 1;
        meta.touch();
        index.put(meta);
        self.store_index(&index).await?;

        self.metrics.record_delete(&uuid, timer.elapsed());
        Ok(())
    }

    /// Delete a collection: all chunks, its counter, then the index entry.
    ///
    /// Deleting an unknown uuid is a no-op.
    pub async fn delete(&self, uuid: &str) -> Result<()> {
        let timer = Instant::now();
        let uuid = normalize_uuid(uuid);
        let _guard = self.index_lock.lock().await;
        let mut index = self.load_index().await?;

        if let Some(meta) = index.remove(&uuid) {
            for chunk_key in &meta.chunk_uuids {
                self.backend.delete(chunk_key).await?;
            }
            self.backend.delete(&key::counter_key(&uuid)).await?;
            self.store_index(&index).await?;
            info!("Deleted list {} ({} chunks)", uuid, meta.chunk_uuids.len());
        }

        self.metrics.record_delete(&uuid, timer.elapsed());
        Ok(())
    }

    /// Remove only the index entry, leaving chunks behind.
    ///
    /// For caller-managed cleanup of collections whose chunks are already
    /// gone or intentionally orphaned.
    pub async fn remove_from_index(&self, uuid: &str) -> Result<()> {
        let uuid = normalize_uuid(uuid);
        let _guard = self.index_lock.lock().await;
        let mut index = self.load_index().await?;
        if index.remove(&uuid).is_some() {
            self.store_index(&index).await?;
        }
        Ok(())
    }

    /// Reset the collection's TTL, restarting its expiry clock from now.
    ///
    /// An index-entry-only mutation; chunks are not rewritten.
    ///
    /// # Errors
    /// - `Error::CollectionNotFound`: collection missing or expired
    /// - `Error::MalformedConfig`: ttl beyond `MAX_TTL_SECONDS`
    pub async fn update_ttl(&self, uuid: &str, seconds: u64) -> Result<()> {
        let timer = Instant::now();
        let uuid = normalize_uuid(uuid);
        validate_ttl(seconds)?;
        let _guard = self.index_lock.lock().await;
        let mut index = self.load_index().await?;
        let Some(mut meta) = self.live_meta(&mut index, &uuid).await? else {
            return Err(Error::CollectionNotFound(uuid));
        };

        meta.set_ttl(seconds);
        index.put(meta);
        self.store_index(&index).await?;

        self.metrics.record_write(&uuid, timer.elapsed());
        Ok(())
    }

    /// The collection's configured TTL in seconds (`None` = no expiry).
    ///
    /// # Errors
    /// `Error::CollectionNotFound` if the collection is missing or expired.
    pub async fn get_ttl(&self, uuid: &str) -> Result<Option<u64>> {
        let uuid = normalize_uuid(uuid);
        let _guard = self.index_lock.lock().await;
        let mut index = self.load_index().await?;
        let Some(meta) = self.live_meta(&mut index, &uuid).await? else {
            return Err(Error::CollectionNotFound(uuid));
        };
        Ok(meta.ttl)
    }

    /// The collection's headers.
    ///
    /// # Errors
    /// `Error::CollectionNotFound` if the collection is missing or expired.
    pub async fn get_headers(&self, uuid: &str) -> Result<HashMap<String, String>> {
        let uuid = normalize_uuid(uuid);
        let _guard = self.index_lock.lock().await;
        let mut index = self.load_index().await?;
        let Some(meta) = self.live_meta(&mut index, &uuid).await? else {
            return Err(Error::CollectionNotFound(uuid));
        };
        Ok(meta.headers)
    }

    /// The collection's monotonic counter.
    ///
    /// Seeded at the created element count and incremented on every push,
    /// never decremented; suitable for deriving fresh element identifiers.
    ///
    /// # Errors
    /// `Error::CollectionNotFound` if the collection is missing or expired.
    pub async fn get_counter(&self, uuid: &str) -> Result<i64> {
        let uuid = normalize_uuid(uuid);
        let _guard = self.index_lock.lock().await;
        let mut index = self.load_index().await?;
        if self.live_meta(&mut index, &uuid).await?.is_none() {
            return Err(Error::CollectionNotFound(uuid));
        }

        match self.backend.get(&key::counter_key(&uuid)).await? {
            Some(bytes) => parse_counter(&key::counter_key(&uuid), &bytes),
            None => Ok(0),
        }
    }

    /// Remove every collection: backend flush-all, which also clears the
    /// index blob.
    pub async fn flush(&self) -> Result<()> {
        let timer = Instant::now();
        let _guard = self.index_lock.lock().await;
        self.backend.flush_all().await?;
        self.metrics.record_delete(INDEX_KEY, timer.elapsed());
        Ok(())
    }

    /// Number of live (non-expired) collections in the index.
    pub async fn index_len(&self) -> Result<usize> {
        let _guard = self.index_lock.lock().await;
        let index = self.load_index().await?;
        Ok(index.all().filter(|meta| !meta.is_expired()).count())
    }

    // ------------------------------------------------------------------
    // Index and chunk IO (callers hold the index lock)
    // ------------------------------------------------------------------

    async fn load_index(&self) -> Result<ListIndex> {
        match self.backend.get(INDEX_KEY).await? {
            Some(bytes) => ListIndex::decode(&bytes),
            None => Ok(ListIndex::new()),
        }
    }

    async fn store_index(&self, index: &ListIndex) -> Result<()> {
        self.backend.set(INDEX_KEY, index.encode()?, None).await
    }

    /// Resolve a live index entry, purging it if its TTL clock has lapsed.
    async fn live_meta(&self, index: &mut ListIndex, uuid: &str) -> Result<Option<Collection>> {
        match index.get(uuid) {
            None => return Ok(None),
            Some(meta) if !meta.is_expired() => return Ok(Some(meta.clone())),
            Some(_) => {}
        }

        // Lazy expiry: drop the entry and its storage on first read past
        // the deadline.
        if let Some(meta) = index.remove(uuid) {
            for chunk_key in &meta.chunk_uuids {
                self.backend.delete(chunk_key).await?;
            }
            self.backend.delete(&key::counter_key(uuid)).await?;
            self.store_index(index).await?;
            debug!(
                "List {} expired; purged {} chunks",
                uuid,
                meta.chunk_uuids.len()
            );
        }
        Ok(None)
    }

    async fn store_chunk(
        &self,
        chunk_key: &str,
        elements: &[ListElement],
        ttl: Option<Duration>,
    ) -> Result<()> {
        let bytes = serialization::encode(&elements)?;
        self.backend.set(chunk_key, bytes, ttl).await
    }

    /// Load a chunk's elements.
    ///
    /// A chunk key the backend already expired natively reads as empty; the
    /// collection-level expiry clock is authoritative.
    async fn load_chunk(&self, chunk_key: &str) -> Result<Vec<ListElement>> {
        match self.backend.get(chunk_key).await? {
            Some(bytes) => serialization::decode(&bytes),
            None => {
                warn!("Chunk {} missing from backend; reading as empty", chunk_key);
                Ok(Vec::new())
            }
        }
    }
}
