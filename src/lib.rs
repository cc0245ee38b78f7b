//! # list-kit
//!
//! Chunked list storage with indexing and TTL management over pluggable
//! key-value cache backends.
//!
//! Raw cache backends store opaque blobs under flat keys. list-kit layers the
//! collection semantics the backends lack natively on top of that:
//!
//! - **Collections:** named, ordered lists of records with stable element ids
//! - **Chunking:** large lists split into bounded-size chunks, transparently
//!   reassembled on read
//! - **Indexing:** a persisted registry of all known collections with their
//!   metadata (TTL, chunk layout, element count, headers)
//! - **Per-element CRUD:** find, push, update and delete single elements
//!   without rewriting the whole list
//! - **Backend Agnostic:** in-memory (default), Redis, Memcached, or custom
//!   [`ListBackend`] implementations with different native capability levels
//!
//! ## Quick Start
//!
//! ```
//! use list_kit::{Client, CreateOptions};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> list_kit::Result<()> {
//! let client = Client::in_memory();
//!
//! let records = vec![
//!     json!({"id": 1, "name": "Leanne Graham"}),
//!     json!({"id": 2, "name": "Ervin Howell"}),
//! ];
//!
//! let options = CreateOptions::default()
//!     .with_uuid("user list")
//!     .with_element_uuid("id")
//!     .with_ttl(3600);
//!
//! let collection = client.create(records, &options).await?;
//! assert_eq!(collection.uuid, "user-list");
//! assert_eq!(collection.items_count, 2);
//!
//! let element = client.find_element("user-list", "2").await?;
//! let body: serde_json::Value = element.decode()?;
//! assert_eq!(body["name"], "Ervin Howell");
//! # Ok(())
//! # }
//! ```
//!
//! ## Consistency model
//!
//! Chunk writes inside one `create` are sequential, not atomic as a group; the
//! index entry is written last, so a failed create leaves the collection
//! invisible (at the cost of leaked chunk keys until a `flush`). Index
//! mutations are serialized behind a process-local mutex; multi-process
//! writers need an external locking discipline. See [`ListRepository`].

#[macro_use]
extern crate log;

pub mod backend;
pub mod client;
pub mod collection;
pub mod element;
pub mod error;
pub mod index;
pub mod key;
pub mod observability;
pub mod repository;
pub mod serialization;

// Re-exports for convenience
pub use backend::ListBackend;
pub use client::{Client, DriverKind};
pub use collection::Collection;
pub use element::{ListElement, ListRecord};
pub use error::{Error, Result};
pub use index::ListIndex;
pub use repository::{CreateOptions, ListRepository};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
