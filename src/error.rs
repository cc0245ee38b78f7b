//! Error types for the list framework.

use std::fmt;

/// Result type for list operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for list operations.
///
/// Every failure condition in the crate maps to exactly one variant; nothing
/// is logged-and-swallowed. Domain errors (`CollectionAlreadyExists`,
/// `ElementNotFound`, ...) are non-fatal outcomes reported to the caller;
/// `BackendUnavailable` surfaces adapter failures as-is, without retries.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// An option was rejected: an unrecognized key, a mistyped value, or a
    /// TTL beyond [`MAX_TTL_SECONDS`](crate::collection::MAX_TTL_SECONDS).
    ///
    /// Recognized create keys: `uuid`, `element-uuid`, `chunk-size`, `ttl`,
    /// `headers`. No partial state is created.
    MalformedConfig(String),

    /// A collection with the same uuid already exists in the index.
    ///
    /// `create` fails fast on the index presence check; the existing
    /// collection is left untouched.
    CollectionAlreadyExists(String),

    /// The requested collection is not in the index (or its TTL has lapsed).
    CollectionNotFound(String),

    /// The requested element is not in any chunk of the collection.
    ElementNotFound(String),

    /// `push_element` was called with an element uuid already present in the
    /// collection.
    ElementAlreadyExists(String),

    /// The declared `element-uuid` field cannot be resolved on one or more
    /// records.
    ///
    /// `create` resolves every element identity before writing anything, so
    /// this error leaves no state behind (all-or-nothing).
    InvalidElementKey(String),

    /// Backend storage error (connection lost, network timeout, protocol
    /// error). Surfaced as-is; retries are an external policy.
    BackendUnavailable(String),

    /// The facade was asked for a backend name it does not know.
    UnsupportedDriver(String),

    /// Invalid backend configuration at construction time.
    ConfigError(String),

    /// Serialization failed when encoding a record, chunk or the index.
    SerializationError(String),

    /// Deserialization failed: corrupted or malformed data in storage.
    DeserializationError(String),

    /// Stored entry has a bad magic header: not list-kit data, or corrupted
    /// in transit. The entry should be evicted.
    InvalidEnvelope(String),

    /// Stored entry was written with a different schema version.
    ///
    /// Expected during deployments after a schema bump; the entry should be
    /// evicted and recreated.
    VersionMismatch {
        /// Expected schema version (from compiled code)
        expected: u32,
        /// Found schema version (from the stored entry)
        found: u32,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MalformedConfig(msg) => {
                write!(f, "Malformed parameters provided: {}", msg)
            }
            Error::CollectionAlreadyExists(uuid) => {
                write!(f, "List {} already exists in memory.", uuid)
            }
            Error::CollectionNotFound(uuid) => {
                write!(f, "List {} does not exist in memory.", uuid)
            }
            Error::ElementNotFound(uuid) => {
                write!(
                    f,
                    "Cannot retrieve the element {} from the collection in memory.",
                    uuid
                )
            }
            Error::ElementAlreadyExists(uuid) => {
                write!(f, "Element {} already exists in the collection.", uuid)
            }
            Error::InvalidElementKey(field) => {
                write!(
                    f,
                    "{} is not a valid key. If your records are typed structs, check your field_value() implementation.",
                    field
                )
            }
            Error::BackendUnavailable(msg) => write!(f, "Backend unavailable: {}", msg),
            Error::UnsupportedDriver(name) => {
                write!(f, "{} is not a supported driver.", name)
            }
            Error::ConfigError(msg) => write!(f, "Config error: {}", msg),
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Error::DeserializationError(msg) => write!(f, "Deserialization error: {}", msg),
            Error::InvalidEnvelope(msg) => write!(f, "Invalid storage envelope: {}", msg),
            Error::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Storage version mismatch: expected {}, found {}",
                    expected, found
                )
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_already_exists_display() {
        let err = Error::CollectionAlreadyExists("fake-list".to_string());
        assert_eq!(err.to_string(), "List fake-list already exists in memory.");
    }

    #[test]
    fn test_element_not_found_display() {
        let err = Error::ElementNotFound("132131312".to_string());
        assert_eq!(
            err.to_string(),
            "Cannot retrieve the element 132131312 from the collection in memory."
        );
    }

    #[test]
    fn test_unsupported_driver_display() {
        let err = Error::UnsupportedDriver("not supported driver".to_string());
        assert_eq!(
            err.to_string(),
            "not supported driver is not a supported driver."
        );
    }

    #[test]
    fn test_version_mismatch_display() {
        let err = Error::VersionMismatch {
            expected: 1,
            found: 9,
        };
        assert_eq!(
            err.to_string(),
            "Storage version mismatch: expected 1, found 9"
        );
    }
}
