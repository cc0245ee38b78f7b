//! List elements and the record trait they are built from.

use crate::error::{Error, Result};
use crate::serialization;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Trait for records stored as list elements.
///
/// Any serde-able, clonable type qualifies. Implement [`field_value`] when
/// records carry a natural identity field that `create` should use for
/// element uuids (the `element-uuid` option); the default resolves nothing,
/// which makes a declared identity field fail with `InvalidElementKey`.
///
/// `serde_json::Value` gets a provided implementation that looks the field up
/// in the JSON object, so plain-map records work out of the box.
///
/// # Example
///
/// ```
/// use list_kit::ListRecord;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Serialize, Deserialize)]
/// pub struct User {
///     pub id: u64,
///     pub name: String,
/// }
///
/// impl ListRecord for User {
///     fn field_value(&self, field: &str) -> Option<String> {
///         match field {
///             "id" => Some(self.id.to_string()),
///             "name" => Some(self.name.clone()),
///             _ => None,
///         }
///     }
/// }
/// ```
///
/// [`field_value`]: ListRecord::field_value
pub trait ListRecord: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Return the string form of a named identity field, if the record
    /// exposes one.
    fn field_value(&self, _field: &str) -> Option<String> {
        None
    }
}

impl ListRecord for serde_json::Value {
    fn field_value(&self, field: &str) -> Option<String> {
        match self.get(field)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// Derive an element's identifier: the declared identity field's value, or
/// the record's ordinal position when no field is declared.
pub(crate) fn resolve_element_uuid<T: ListRecord>(
    record: &T,
    key_field: Option<&str>,
    position: usize,
) -> Result<String> {
    match key_field {
        Some(field) => record
            .field_value(field)
            .ok_or_else(|| Error::InvalidElementKey(field.to_string())),
        None => Ok(position.to_string()),
    }
}

/// One stored record within a collection.
///
/// The `uuid` is derived once at creation (identity field value, or ordinal
/// position) and immutable thereafter; the body holds the encoded record so
/// chunk-level operations never need the record type.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ListElement {
    /// Stable element identifier, unique within its collection.
    pub uuid: String,
    /// When the element was first stored.
    pub created_at: DateTime<Utc>,
    /// Envelope-encoded record body.
    pub body: Vec<u8>,
}

impl ListElement {
    /// Encode a record into a new element.
    ///
    /// # Errors
    /// Returns `Error::SerializationError` if the record cannot be encoded.
    pub fn new<T: ListRecord>(uuid: impl Into<String>, record: &T) -> Result<Self> {
        Ok(ListElement {
            uuid: uuid.into(),
            created_at: Utc::now(),
            body: serialization::encode(record)?,
        })
    }

    /// Decode the element body back into a record.
    ///
    /// # Errors
    /// Returns the envelope layer's errors if the body is corrupted or was
    /// written under a different schema version.
    pub fn decode<T: ListRecord>(&self) -> Result<T> {
        serialization::decode(&self.body)
    }

    /// Replace the body with a re-encoded record, keeping uuid and
    /// created_at.
    ///
    /// # Errors
    /// Returns `Error::SerializationError` if the record cannot be encoded.
    pub fn replace_body<T: ListRecord>(&mut self, record: &T) -> Result<()> {
        self.body = serialization::encode(record)?;
        Ok(())
    }
}
