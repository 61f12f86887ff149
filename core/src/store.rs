//! The key-value collaborator the handler is written against.
//!
//! # Design
//! The host owns persistence. It hands the handler a `KeyValueStore` that can
//! open named collections; each `Collection` offers put/get/delete and a
//! prefix listing over byte values. Nothing here promises atomicity across
//! calls; whatever consistency the backing store has is what callers get.

/// Errors surfaced by a store or one of its collections.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or the collection could not be opened.
    #[error("database unavailable: {0}")]
    Unavailable(String),

    /// No value is stored under `key`.
    #[error("key not found: {key}")]
    NotFound { key: String },

    /// Any other failure reported by the backing store.
    #[error("{0}")]
    Backend(String),
}

/// A handle to one namespaced collection.
pub trait Collection {
    /// Store `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Every key that starts with `prefix`, as full keys.
    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

/// Opens collections by logical path.
pub trait KeyValueStore {
    type Collection: Collection;

    fn open(&self, name: &str) -> Result<Self::Collection, StoreError>;
}
