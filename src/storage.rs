//! The storage API: an abstraction over the keyed byte stores that back hierarchies.
//!
//! A store maps validated [`StoreKey`]s to byte values.
//! Node metadata and dataset data are held under the keys returned by [`meta_key`] and
//! [`data_key`].
//!
//! The storage traits are object safe: hierarchy handles hold stores as
//! `Arc<TStorage>` with `TStorage: ?Sized`.

pub mod store;
mod store_key;
mod store_prefix;

use thiserror::Error;

use crate::node::NodePath;

pub use self::{
    store_key::{StoreKey, StoreKeyError, StoreKeys},
    store_prefix::{StorePrefix, StorePrefixError},
};

/// An alias for bytes which may or may not be available.
pub type MaybeBytes = Option<Vec<u8>>;

/// A storage error.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A key was not found.
    #[error("key {_0} not found")]
    KeyNotFound(StoreKey),
    /// An invalid store key.
    #[error(transparent)]
    InvalidStoreKey(#[from] StoreKeyError),
    /// An invalid store prefix.
    #[error(transparent)]
    InvalidStorePrefix(#[from] StorePrefixError),
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// Any other error.
    #[error("{_0}")]
    Other(String),
}

/// Readable storage traits.
pub trait ReadableStorageTraits: Send + Sync {
    /// Retrieve the value (bytes) associated with a given [`StoreKey`].
    ///
    /// Returns [`None`] if the key is not found.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn get(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError>;

    /// Return the size in bytes of the value at `key`.
    ///
    /// Returns [`None`] if the key is not found.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn size_key(&self, key: &StoreKey) -> Result<Option<u64>, StorageError>;
}

/// Writable storage traits.
pub trait WritableStorageTraits: Send + Sync {
    /// Store bytes at a [`StoreKey`].
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn set(&self, key: &StoreKey, value: &[u8]) -> Result<(), StorageError>;

    /// Erase a [`StoreKey`].
    ///
    /// # Errors
    /// Returns [`StorageError::KeyNotFound`] if the key is not present, or a [`StorageError`]
    /// if there is an underlying storage error.
    fn erase(&self, key: &StoreKey) -> Result<(), StorageError>;

    /// Erase all keys with the prefix `prefix`.
    ///
    /// Succeeds if no key has the prefix.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn erase_prefix(&self, prefix: &StorePrefix) -> Result<(), StorageError>;
}

/// Listable storage traits.
pub trait ListableStorageTraits: Send + Sync {
    /// Retrieve all [`StoreKeys`] in the store, sorted.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn list(&self) -> Result<StoreKeys, StorageError>;

    /// Retrieve all [`StoreKeys`] with the prefix `prefix`, sorted.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn list_prefix(&self, prefix: &StorePrefix) -> Result<StoreKeys, StorageError>;
}

/// A supertrait of [`ReadableStorageTraits`] and [`WritableStorageTraits`].
pub trait ReadableWritableStorageTraits: ReadableStorageTraits + WritableStorageTraits {}

impl<T: ?Sized + ReadableStorageTraits + WritableStorageTraits> ReadableWritableStorageTraits
    for T
{
}

/// The key of the metadata document describing the node at `path`.
#[must_use]
pub fn meta_key(path: &NodePath) -> StoreKey {
    node_key(path, ".meta")
}

/// The key of the raw data of the dataset at `path`.
#[must_use]
pub fn data_key(path: &NodePath) -> StoreKey {
    node_key(path, ".data")
}

fn node_key(path: &NodePath, name: &str) -> StoreKey {
    let path = path.as_str().strip_prefix('/').unwrap_or(path.as_str());
    if path.is_empty() {
        unsafe { StoreKey::new_unchecked(name.to_string()) }
    } else {
        unsafe { StoreKey::new_unchecked(format!("{path}/{name}")) }
    }
}

/// The prefix under which all keys of the node at `path` (and its children) live.
#[must_use]
pub fn node_prefix(path: &NodePath) -> StorePrefix {
    let path = path.as_str().strip_prefix('/').unwrap_or(path.as_str());
    if path.is_empty() {
        StorePrefix::root()
    } else {
        unsafe { StorePrefix::new_unchecked(format!("{path}/")) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_keys() {
        let path = NodePath::new("/a/b").unwrap();
        assert_eq!(meta_key(&path).as_str(), "a/b/.meta");
        assert_eq!(data_key(&path).as_str(), "a/b/.data");
        assert_eq!(node_prefix(&path).as_str(), "a/b/");

        let root = NodePath::root();
        assert_eq!(meta_key(&root).as_str(), ".meta");
        assert_eq!(node_prefix(&root).as_str(), "");
    }
}
