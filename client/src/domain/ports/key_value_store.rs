//! Driven port for the persistent string key-value store.
//!
//! In a browser this is local storage; the client only needs get, set, and
//! remove by string key, so any backing store can be injected.

use thiserror::Error;

/// Errors surfaced by key-value store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store could not be read or its contents were corrupt.
    #[error("key-value store read failed: {message}")]
    Read { message: String },
    /// The store could not be written.
    #[error("key-value store write failed: {message}")]
    Write { message: String },
}

impl StoreError {
    /// Construct [`Self::Read`].
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read {
            message: message.into(),
        }
    }

    /// Construct [`Self::Write`].
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write {
            message: message.into(),
        }
    }
}

/// Port for a string key-value store.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    /// Return the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] when the backing store is unreadable.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the removal cannot be persisted.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
