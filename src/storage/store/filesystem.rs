//! A filesystem store.

use thiserror::Error;
use walkdir::WalkDir;

use crate::storage::{
    ListableStorageTraits, MaybeBytes, ReadableStorageTraits, StorageError, StoreKey, StoreKeys,
    StorePrefix, WritableStorageTraits,
};

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

/// A filesystem store.
///
/// Each key maps to a file at the same relative path under a base directory.
#[derive(Debug)]
pub struct FilesystemStore {
    base_directory: PathBuf,
}

/// A filesystem store creation error.
#[derive(Debug, Error)]
pub enum FilesystemStoreCreateError {
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// The base directory is an existing file.
    #[error("base directory {} is an existing file", _0.display())]
    ExistingFile(PathBuf),
}

impl FilesystemStore {
    /// Create a new filesystem store at `base_directory`.
    ///
    /// The base directory is created if it does not exist.
    ///
    /// # Errors
    /// Returns a [`FilesystemStoreCreateError`] if `base_directory` points to an existing file
    /// rather than a directory, or cannot be created.
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self, FilesystemStoreCreateError> {
        let base_directory = base_directory.as_ref().to_path_buf();
        if base_directory.is_file() {
            return Err(FilesystemStoreCreateError::ExistingFile(base_directory));
        }
        std::fs::create_dir_all(&base_directory)?;
        Ok(Self { base_directory })
    }

    fn key_to_fspath(&self, key: &StoreKey) -> PathBuf {
        let mut path = self.base_directory.clone();
        path.extend(key.as_str().split('/'));
        path
    }

    fn fspath_to_key(&self, path: &Path) -> Result<StoreKey, StorageError> {
        let relative = path
            .strip_prefix(&self.base_directory)
            .map_err(|err| StorageError::Other(err.to_string()))?;
        let components: Vec<_> = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect();
        Ok(StoreKey::new(components.join("/"))?)
    }
}

impl ReadableStorageTraits for FilesystemStore {
    fn get(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError> {
        match std::fs::read(self.key_to_fspath(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn size_key(&self, key: &StoreKey) -> Result<Option<u64>, StorageError> {
        match std::fs::metadata(self.key_to_fspath(key)) {
            Ok(metadata) => Ok(metadata.is_file().then(|| metadata.len())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

impl WritableStorageTraits for FilesystemStore {
    fn set(&self, key: &StoreKey, value: &[u8]) -> Result<(), StorageError> {
        let path = self.key_to_fspath(key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, value)?;
        Ok(())
    }

    fn erase(&self, key: &StoreKey) -> Result<(), StorageError> {
        match std::fs::remove_file(self.key_to_fspath(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(StorageError::KeyNotFound(key.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn erase_prefix(&self, prefix: &StorePrefix) -> Result<(), StorageError> {
        let mut path = self.base_directory.clone();
        path.extend(prefix.as_str().split('/').filter(|part| !part.is_empty()));
        match std::fs::remove_dir_all(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        if path.eq(&self.base_directory) {
            std::fs::create_dir_all(&self.base_directory)?;
        }
        Ok(())
    }
}

impl ListableStorageTraits for FilesystemStore {
    fn list(&self) -> Result<StoreKeys, StorageError> {
        self.list_prefix(&StorePrefix::root())
    }

    fn list_prefix(&self, prefix: &StorePrefix) -> Result<StoreKeys, StorageError> {
        let mut path = self.base_directory.clone();
        path.extend(prefix.as_str().split('/').filter(|part| !part.is_empty()));
        if !path.exists() {
            return Ok(vec![]);
        }
        let mut keys: StoreKeys = vec![];
        for entry in WalkDir::new(&path) {
            let entry = entry.map_err(|err| StorageError::Other(err.to_string()))?;
            if entry.file_type().is_file() {
                keys.push(self.fspath_to_key(entry.path())?);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn filesystem_set_get_list() -> Result<(), Box<dyn Error>> {
        let base_directory = tempfile::TempDir::new()?;
        let store = FilesystemStore::new(base_directory.path())?;

        let key = "a/b/.data".try_into()?;
        store.set(&key, &[1, 2, 3])?;
        assert_eq!(store.get(&key)?, Some(vec![1, 2, 3]));
        assert_eq!(store.size_key(&key)?, Some(3));
        assert_eq!(store.get(&"a/b/.meta".try_into()?)?, None);

        store.set(&"a/c/.meta".try_into()?, &[4])?;
        assert_eq!(
            store.list_prefix(&"a/b/".try_into()?)?,
            &["a/b/.data".try_into()?]
        );
        assert_eq!(store.list()?.len(), 2);

        store.erase_prefix(&"a/b/".try_into()?)?;
        assert_eq!(store.get(&key)?, None);
        assert!(store.erase(&key).is_err());
        Ok(())
    }

    #[test]
    fn filesystem_existing_file() -> Result<(), Box<dyn Error>> {
        let base_directory = tempfile::TempDir::new()?;
        let file_path = base_directory.path().join("file");
        std::fs::write(&file_path, [0])?;
        assert!(matches!(
            FilesystemStore::new(&file_path),
            Err(FilesystemStoreCreateError::ExistingFile(_))
        ));
        Ok(())
    }
}
