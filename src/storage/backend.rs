//! Storage medium abstraction
//!
//! A backend holds opaque string values under opaque string keys within one
//! namespace. It knows nothing about JSON or capsules; that lives in
//! [`super::RecordStore`].

use super::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Key-value medium underneath the record store.
///
/// Every call runs to completion before returning. There is no locking across
/// calls, so two processes sharing one medium interleave at the granularity of
/// single `set`/`remove` calls and the last write wins.
pub trait RecordBackend: Send + Sync {
    /// Read the raw value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// List every key currently present in the namespace
    fn keys(&self) -> Result<Vec<String>>;
}
