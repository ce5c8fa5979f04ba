//! Storage engines backing the key-value API.

pub mod bitcask;

use bytes::Bytes;

/// A uniform interface over a byte-string key-value storage engine.
///
/// Kept small and generic on purpose: it exists so that callers (and the
/// benchmark harness) can depend on one trait rather than a concrete engine.
pub trait KeyValueStorage {
    /// The error type returned by this storage engine's operations.
    type Error;

    /// Fetches the value associated with `key`, if any.
    fn get(&self, key: Bytes) -> Result<Option<Bytes>, Self::Error>;

    /// Sets `key` to `value`, overwriting any existing value.
    fn set(&self, key: Bytes, value: Bytes) -> Result<(), Self::Error>;

    /// Deletes `key`, returning `true` if it was present.
    fn del(&self, key: Bytes) -> Result<bool, Self::Error>;
}
