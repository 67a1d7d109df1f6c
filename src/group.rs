//! Groups: interior nodes of a hierarchy.
//!
//! A group is a node that can hold attributes and child nodes (groups or
//! [`datasets`](crate::dataset)).
//! Its metadata is a JSON document, for example:
//! ```json
//! {
//!     "node_type": "group",
//!     "attributes": {
//!         "spam": "ham",
//!         "eggs": 42
//!     }
//! }
//! ```
//!
//! A group with no stored metadata is implicit: opening any path yields a group with empty
//! attributes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    node::{NodePath, NodePathError},
    storage::{
        meta_key, node_prefix, ListableStorageTraits, ReadableStorageTraits, StorageError,
        WritableStorageTraits,
    },
};

/// Group metadata.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GroupMetadata {
    /// The node type, always `group`.
    pub node_type: String,
    /// Optional user defined attributes.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl Default for GroupMetadata {
    fn default() -> Self {
        Self {
            node_type: "group".to_string(),
            attributes: serde_json::Map::default(),
        }
    }
}

impl GroupMetadata {
    /// Validates the node type.
    #[must_use]
    pub fn validate_node_type(&self) -> bool {
        self.node_type == "group"
    }
}

/// A group at a node of a hierarchical store.
#[derive(Debug)]
pub struct Group<TStorage: ?Sized> {
    /// The storage.
    storage: Arc<TStorage>,
    /// The path of the group in the store.
    path: NodePath,
    /// The metadata.
    metadata: GroupMetadata,
}

/// A group creation error.
#[derive(Debug, Error)]
pub enum GroupCreateError {
    /// An invalid node path.
    #[error(transparent)]
    NodePathError(#[from] NodePathError),
    /// Invalid node type.
    #[error("invalid node type {_0}, expected group")]
    InvalidNodeType(String),
    /// An error deserializing the metadata.
    #[error(transparent)]
    MetadataDeserializationError(#[from] serde_json::Error),
    /// A storage error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
}

impl<TStorage: ?Sized> Group<TStorage> {
    /// Create a group in `storage` at `path` with `metadata`.
    ///
    /// This does **not** write to the store, use [`store_metadata`](Group::store_metadata) to
    /// write `metadata` to `storage`.
    ///
    /// # Errors
    /// Returns [`GroupCreateError`] if `path` or any metadata is invalid.
    pub fn new_with_metadata(
        storage: Arc<TStorage>,
        path: &str,
        metadata: GroupMetadata,
    ) -> Result<Self, GroupCreateError> {
        let path = NodePath::new(path)?;
        if !metadata.validate_node_type() {
            return Err(GroupCreateError::InvalidNodeType(metadata.node_type));
        }
        Ok(Self {
            storage,
            path,
            metadata,
        })
    }

    /// Get the node path.
    #[must_use]
    pub const fn path(&self) -> &NodePath {
        &self.path
    }

    /// Get the attributes.
    #[must_use]
    pub const fn attributes(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.metadata.attributes
    }

    /// Mutably borrow the attributes.
    pub fn attributes_mut(&mut self) -> &mut serde_json::Map<String, serde_json::Value> {
        &mut self.metadata.attributes
    }

    /// Get the metadata.
    #[must_use]
    pub fn metadata(&self) -> GroupMetadata {
        self.metadata.clone()
    }
}

impl<TStorage: ?Sized + ReadableStorageTraits> Group<TStorage> {
    /// Open the group in `storage` at `path`. The metadata is read from the store.
    ///
    /// A group with no stored metadata is implicit: its attributes are empty.
    ///
    /// # Errors
    /// Returns [`GroupCreateError`] if there is a storage error or any metadata is invalid.
    pub fn open(storage: Arc<TStorage>, path: &str) -> Result<Self, GroupCreateError> {
        let node_path: NodePath = path.try_into()?;
        let metadata: GroupMetadata = match storage.get(&meta_key(&node_path))? {
            Some(metadata) => serde_json::from_slice(&metadata)?,
            None => GroupMetadata::default(),
        };
        Self::new_with_metadata(storage, path, metadata)
    }
}

impl<TStorage: ?Sized + WritableStorageTraits> Group<TStorage> {
    /// Store the group metadata.
    ///
    /// # Errors
    /// Returns [`GroupCreateError`] if there is an underlying store error.
    pub fn store_metadata(&self) -> Result<(), GroupCreateError> {
        let metadata = serde_json::to_vec_pretty(&self.metadata)?;
        Ok(self.storage.set(&meta_key(&self.path), &metadata)?)
    }

    /// Erase the group and all of its children from the store.
    ///
    /// # Errors
    /// Returns [`StorageError`] if there is an underlying store error.
    pub fn erase(&self) -> Result<(), StorageError> {
        self.storage.erase_prefix(&node_prefix(&self.path))
    }
}

impl<TStorage: ?Sized + ListableStorageTraits> Group<TStorage> {
    /// List the paths of the child nodes (groups and datasets) of this group, sorted.
    ///
    /// Only children with stored metadata are listed.
    ///
    /// # Errors
    /// Returns [`GroupCreateError`] if there is an underlying store error.
    pub fn children(&self) -> Result<Vec<NodePath>, GroupCreateError> {
        let prefix = node_prefix(&self.path);
        let mut children = vec![];
        for key in self.storage.list_prefix(&prefix)? {
            let Some(relative) = key.as_str().strip_prefix(prefix.as_str()) else {
                continue;
            };
            if let Some(name) = relative.strip_suffix("/.meta") {
                if !name.is_empty() && !name.contains('/') {
                    children.push(self.path.child(name)?);
                }
            }
        }
        Ok(children)
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::store::MemoryStore;

    use super::*;

    const JSON_VALID: &str = r#"{
        "node_type": "group",
        "attributes": {
            "spam": "ham",
            "eggs": 42
        }
    }"#;

    #[test]
    fn group_metadata_valid() {
        let metadata: GroupMetadata = serde_json::from_str(JSON_VALID).unwrap();
        assert!(metadata.validate_node_type());
        assert_eq!(metadata.attributes.len(), 2);
    }

    #[test]
    fn group_metadata_invalid_node_type() {
        let metadata: GroupMetadata =
            serde_json::from_str(r#"{"node_type": "dataset"}"#).unwrap();
        let store = Arc::new(MemoryStore::new());
        assert!(matches!(
            Group::new_with_metadata(store, "/group", metadata),
            Err(GroupCreateError::InvalidNodeType(_))
        ));
    }

    #[test]
    fn group_metadata_write_read() {
        let store = Arc::new(MemoryStore::new());
        let metadata: GroupMetadata = serde_json::from_str(JSON_VALID).unwrap();
        let group = Group::new_with_metadata(store.clone(), "/group", metadata).unwrap();
        group.store_metadata().unwrap();

        let opened = Group::open(store, "/group").unwrap();
        assert_eq!(opened.metadata(), group.metadata());
        assert_eq!(
            opened.attributes().get("eggs"),
            Some(&serde_json::Value::from(42))
        );
    }

    #[test]
    fn group_implicit() {
        let store = Arc::new(MemoryStore::new());
        let group = Group::open(store, "/not/stored").unwrap();
        assert!(group.attributes().is_empty());
    }

    #[test]
    fn group_children() {
        use crate::array::DataType;
        use crate::dataset::DatasetBuilder;

        let store = Arc::new(MemoryStore::new());
        Group::open(store.clone(), "/a")
            .unwrap()
            .store_metadata()
            .unwrap();
        Group::open(store.clone(), "/a/b")
            .unwrap()
            .store_metadata()
            .unwrap();
        DatasetBuilder::new(vec![4], DataType::Int32)
            .build(store.clone(), "/a/values")
            .unwrap()
            .store_metadata()
            .unwrap();

        let root = Group::open(store.clone(), "/").unwrap();
        assert_eq!(root.children().unwrap(), vec!["/a".try_into().unwrap()]);

        let group = Group::open(store.clone(), "/a").unwrap();
        let children = group.children().unwrap();
        assert_eq!(
            children,
            vec!["/a/b".try_into().unwrap(), "/a/values".try_into().unwrap()]
        );

        group.erase().unwrap();
        assert!(Group::open(store, "/a").unwrap().children().unwrap().is_empty());
    }
}
