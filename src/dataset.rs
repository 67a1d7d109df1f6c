//! Datasets: shaped, typed array data at hierarchy nodes.
//!
//! A dataset holds array data with a fixed element [`DataType`], a current [`shape`], optional
//! growth bounds, a storage layout, and user attributes, all recorded in a self-describing
//! metadata document.
//!
//! Use [`DatasetBuilder`] to set up a new dataset, or [`Dataset::open`] for an existing one.
//! Values are written and read through their [`Adapter`]/[`AdapterOwned`] implementations, so
//! a `Vec<f32>`, a `[f64; 16]`, a `String`, or an `ndarray` array can be stored and retrieved
//! without explicit shape or data type arguments.
//!
//! [`DataType`]: crate::array::DataType
//! [`shape`]: Dataset::shape
//! [`Adapter`]: crate::array::Adapter
//! [`AdapterOwned`]: crate::array::AdapterOwned

mod dataset_builder;
mod dataset_errors;
mod dataset_metadata;

use std::sync::Arc;

use itertools::izip;

use crate::{
    array::{
        ravel_indices, unravel_index, Adapter, AdapterOwned, ArrayShape, ChunkShape, DataType,
        MaxShape,
    },
    node::NodePath,
    storage::{
        data_key, meta_key, node_prefix, ReadableStorageTraits, ReadableWritableStorageTraits,
        StorageError, WritableStorageTraits,
    },
};

pub use self::{
    dataset_builder::DatasetBuilder,
    dataset_errors::{DatasetCreateError, DatasetError},
    dataset_metadata::{DatasetLayout, DatasetMetadata, Filter},
};

/// A dataset at a node of a hierarchical store.
#[derive(Debug)]
pub struct Dataset<TStorage: ?Sized> {
    /// The storage.
    storage: Arc<TStorage>,
    /// The path of the dataset in the store.
    path: NodePath,
    /// The metadata.
    metadata: DatasetMetadata,
}

impl<TStorage: ?Sized> Dataset<TStorage> {
    /// Create a dataset in `storage` at `path` with `metadata`.
    ///
    /// This does **not** write to the store, use [`store_metadata`](Dataset::store_metadata)
    /// to write `metadata` to `storage`.
    ///
    /// # Errors
    /// Returns [`DatasetCreateError`] if `path` or any metadata is invalid.
    pub fn new_with_metadata(
        storage: Arc<TStorage>,
        path: &str,
        metadata: DatasetMetadata,
    ) -> Result<Self, DatasetCreateError> {
        let path = NodePath::new(path)?;
        if !metadata.validate_node_type() {
            return Err(DatasetCreateError::InvalidNodeType(
                metadata.node_type.clone(),
            ));
        }
        if let DatasetLayout::Chunked { chunk_shape } = &metadata.layout {
            if metadata.shape.is_empty() {
                return Err(DatasetCreateError::ChunkedScalarDataset);
            }
            if chunk_shape.len() != metadata.shape.len() {
                return Err(DatasetCreateError::InvalidChunkDimensionality(
                    chunk_shape.len(),
                    metadata.shape.len(),
                ));
            }
        }
        if let Some(max_shape) = &metadata.max_shape {
            if max_shape.len() != metadata.shape.len()
                || !izip!(&metadata.shape, max_shape).all(|(extent, bound)| bound.bounds(*extent))
            {
                return Err(DatasetCreateError::InvalidMaxShape(
                    max_shape.clone(),
                    metadata.shape.clone(),
                ));
            }
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

    /// Get the dataset shape.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        &self.metadata.shape
    }

    /// Get the number of dimensions.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.metadata.shape.len()
    }

    /// Get the number of elements.
    #[must_use]
    pub fn num_elements(&self) -> u64 {
        self.metadata.shape.iter().product()
    }

    /// Get the data type.
    #[must_use]
    pub const fn data_type(&self) -> &DataType {
        &self.metadata.data_type
    }

    /// Get the storage layout.
    #[must_use]
    pub const fn layout(&self) -> &DatasetLayout {
        &self.metadata.layout
    }

    /// Get the chunk shape, if the layout is chunked.
    #[must_use]
    pub const fn chunk_shape(&self) -> Option<&ChunkShape> {
        match &self.metadata.layout {
            DatasetLayout::Chunked { chunk_shape } => Some(chunk_shape),
            _ => None,
        }
    }

    /// Get the maximum shape, if the dataset is resizable.
    #[must_use]
    pub const fn max_shape(&self) -> Option<&MaxShape> {
        self.metadata.max_shape.as_ref()
    }

    /// Get the filters.
    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.metadata.filters
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
    pub fn metadata(&self) -> DatasetMetadata {
        self.metadata.clone()
    }

    /// The shape handed to adapters on read.
    ///
    /// A scalar text dataset reads through a shape holding its byte width, since the extent of
    /// a text value lives in its data type rather than its shape.
    fn read_shape(&self) -> ArrayShape {
        match self.metadata.data_type {
            DataType::FixedString(width) if self.metadata.shape.is_empty() => {
                vec![width as u64]
            }
            _ => self.metadata.shape.clone(),
        }
    }
}

impl<TStorage: ?Sized + ReadableStorageTraits> Dataset<TStorage> {
    /// Open the dataset in `storage` at `path`. The metadata is read from the store.
    ///
    /// # Errors
    /// Returns [`DatasetCreateError`] if there is a storage error, the metadata is missing, or
    /// any metadata is invalid.
    pub fn open(storage: Arc<TStorage>, path: &str) -> Result<Self, DatasetCreateError> {
        let node_path: NodePath = path.try_into()?;
        let Some(metadata) = storage.get(&meta_key(&node_path))? else {
            return Err(DatasetCreateError::MissingMetadata(node_path));
        };
        let metadata: DatasetMetadata = serde_json::from_slice(&metadata)?;
        Self::new_with_metadata(storage, path, metadata)
    }

    /// Read the dataset into a value of type `V`.
    ///
    /// The value is allocated to the dataset shape and filled from the stored bytes.
    ///
    /// # Errors
    /// Returns [`DatasetError`] if the dataset has no stored data, there is a storage error,
    /// or the adapter rejects the dataset shape, data type, or stored bytes.
    pub fn read<V: AdapterOwned>(&self) -> Result<V, DatasetError> {
        let bytes = self
            .storage
            .get(&data_key(&self.path))?
            .ok_or_else(|| DatasetError::MissingData(self.path.clone()))?;
        Ok(V::from_bytes(
            &self.read_shape(),
            &self.metadata.data_type,
            &bytes,
        )?)
    }
}

impl<TStorage: ?Sized + WritableStorageTraits> Dataset<TStorage> {
    /// Store the dataset metadata.
    ///
    /// # Errors
    /// Returns [`DatasetError`] if there is an underlying store error.
    pub fn store_metadata(&self) -> Result<(), DatasetError> {
        let metadata = serde_json::to_vec_pretty(&self.metadata)?;
        Ok(self.storage.set(&meta_key(&self.path), &metadata)?)
    }

    /// Write `value` as the dataset data.
    ///
    /// The data type and element count of `value` must match the dataset; mismatches are
    /// errors, never coerced.
    ///
    /// # Errors
    /// Returns [`DatasetError`] if the value is incompatible with the dataset or there is an
    /// underlying store error.
    pub fn write<V: Adapter>(&self, value: &V) -> Result<(), DatasetError> {
        let value_data_type = value.data_type();
        if value_data_type != self.metadata.data_type {
            return Err(DatasetError::IncompatibleDataType(
                value_data_type,
                self.metadata.data_type,
            ));
        }
        let value_shape = value.shape();
        if value_shape.iter().product::<u64>() != self.num_elements() {
            return Err(DatasetError::IncompatibleShape(
                value_shape,
                self.metadata.shape.clone(),
            ));
        }
        Ok(self.storage.set(&data_key(&self.path), &value.to_bytes())?)
    }

    /// Erase the dataset from the store.
    ///
    /// # Errors
    /// Returns [`StorageError`] if there is an underlying store error.
    pub fn erase(&self) -> Result<(), StorageError> {
        self.storage.erase_prefix(&node_prefix(&self.path))
    }
}

impl<TStorage: ?Sized + ReadableWritableStorageTraits> Dataset<TStorage> {
    /// Grow the dataset to `new_shape`.
    ///
    /// Every dimension must stay within the dataset bounds: its [`max_shape`] if set, its
    /// current shape otherwise. Dimensions cannot shrink. Stored data is relaid out to the
    /// grown extents with new elements zero filled, and the updated metadata is written to the
    /// store.
    ///
    /// # Errors
    /// Returns [`DatasetError::InvalidResize`] if `new_shape` violates the bounds, or a
    /// [`DatasetError`] on an underlying store error.
    ///
    /// # Panics
    /// Panics if the dataset size in bytes exceeds [`usize::MAX`].
    ///
    /// [`max_shape`]: Dataset::max_shape
    pub fn resize(&mut self, new_shape: ArrayShape) -> Result<(), DatasetError> {
        let old_shape = self.metadata.shape.clone();
        let valid = new_shape.len() == old_shape.len()
            && izip!(&new_shape, &old_shape).all(|(new, old)| new >= old)
            && match &self.metadata.max_shape {
                Some(max_shape) => {
                    izip!(&new_shape, max_shape).all(|(extent, bound)| bound.bounds(*extent))
                }
                None => new_shape == old_shape,
            };
        if !valid {
            return Err(DatasetError::InvalidResize(new_shape, old_shape));
        }
        if new_shape == old_shape {
            return Ok(());
        }

        if let Some(old_bytes) = self.storage.get(&data_key(&self.path))? {
            let item_nbytes = self.metadata.data_type.size();
            let new_num_elements = usize::try_from(new_shape.iter().product::<u64>()).unwrap();
            let mut new_bytes = vec![0u8; new_num_elements * item_nbytes];
            if old_shape[1..] == new_shape[1..] {
                // Only the slowest-varying dimension grew, offsets are unchanged
                let nbytes = old_bytes.len().min(new_bytes.len());
                new_bytes[..nbytes].copy_from_slice(&old_bytes[..nbytes]);
            } else {
                let old_num_elements =
                    usize::try_from(old_shape.iter().product::<u64>()).unwrap();
                for element in 0..old_num_elements {
                    let indices = unravel_index(element as u64, &old_shape);
                    let new_element =
                        usize::try_from(ravel_indices(&indices, &new_shape)).unwrap();
                    new_bytes[new_element * item_nbytes..(new_element + 1) * item_nbytes]
                        .copy_from_slice(
                            &old_bytes[element * item_nbytes..(element + 1) * item_nbytes],
                        );
                }
            }
            self.storage.set(&data_key(&self.path), &new_bytes)?;
        }

        self.metadata.shape = new_shape;
        self.store_metadata()
    }
}

#[cfg(test)]
mod tests {
    use crate::array::Extent;
    use crate::storage::store::MemoryStore;

    use super::*;

    #[test]
    fn dataset_metadata_write_read() {
        let store = Arc::new(MemoryStore::new());
        let dataset_path = "/group/dataset";
        let mut dataset = DatasetBuilder::new(vec![8, 8], DataType::UInt8)
            .chunk_shape(vec![4u64, 4].try_into().unwrap())
            .build(store.clone(), dataset_path)
            .unwrap();
        dataset
            .attributes_mut()
            .insert("units".to_string(), "kelvin".into());
        dataset.store_metadata().unwrap();

        let opened = Dataset::open(store, dataset_path).unwrap();
        assert_eq!(opened.metadata(), dataset.metadata());
        assert_eq!(opened.shape(), &[8, 8]);
        assert_eq!(opened.rank(), 2);
        assert_eq!(opened.num_elements(), 64);
        assert_eq!(opened.data_type(), &DataType::UInt8);
        assert_eq!(
            opened.chunk_shape().map(ChunkShape::num_elements_u64),
            Some(16)
        );
        assert_eq!(
            opened.attributes().get("units"),
            Some(&serde_json::Value::String("kelvin".to_string()))
        );
    }

    #[test]
    fn dataset_open_missing() {
        let store = Arc::new(MemoryStore::new());
        assert!(matches!(
            Dataset::open(store, "/missing"),
            Err(DatasetCreateError::MissingMetadata(_))
        ));
    }

    #[test]
    fn dataset_write_read_elements() {
        let store = Arc::new(MemoryStore::new());
        let dataset = DatasetBuilder::new(vec![4, 4], DataType::Float32)
            .build(store, "/dataset")
            .unwrap();
        dataset.store_metadata().unwrap();

        let elements: Vec<f32> = (0..16).map(|i| i as f32).collect();
        dataset.write(&elements).unwrap();
        assert_eq!(dataset.read::<Vec<f32>>().unwrap(), elements);

        // Element count and data type mismatches are rejected
        assert!(matches!(
            dataset.write(&vec![0.0f32; 15]),
            Err(DatasetError::IncompatibleShape(_, _))
        ));
        assert!(matches!(
            dataset.write(&vec![0.0f64; 16]),
            Err(DatasetError::IncompatibleDataType(
                DataType::Float64,
                DataType::Float32
            ))
        ));
    }

    #[test]
    fn dataset_read_missing_data() {
        let store = Arc::new(MemoryStore::new());
        let dataset = DatasetBuilder::new(vec![2], DataType::Int32)
            .build(store, "/dataset")
            .unwrap();
        dataset.store_metadata().unwrap();
        assert!(matches!(
            dataset.read::<Vec<i32>>(),
            Err(DatasetError::MissingData(_))
        ));
    }

    #[test]
    fn dataset_resize_rows() {
        let store = Arc::new(MemoryStore::new());
        let mut dataset = DatasetBuilder::new(vec![2, 3], DataType::Int64)
            .max_shape(vec![Extent::Unlimited, Extent::Fixed(3)])
            .build(store.clone(), "/dataset")
            .unwrap();
        dataset.store_metadata().unwrap();
        dataset.write(&vec![1i64, 2, 3, 4, 5, 6]).unwrap();

        dataset.resize(vec![4, 3]).unwrap();
        assert_eq!(dataset.shape(), &[4, 3]);
        assert_eq!(
            dataset.read::<Vec<i64>>().unwrap(),
            vec![1, 2, 3, 4, 5, 6, 0, 0, 0, 0, 0, 0]
        );

        // The stored metadata reflects the new shape
        let opened = Dataset::open(store, "/dataset").unwrap();
        assert_eq!(opened.shape(), &[4, 3]);

        // Shrinking and exceeding the bounds are rejected
        assert!(dataset.resize(vec![3, 3]).is_err());
        assert!(dataset.resize(vec![4, 4]).is_err());
    }

    #[test]
    fn dataset_resize_relayout() {
        let store = Arc::new(MemoryStore::new());
        let mut dataset = DatasetBuilder::new(vec![2, 2], DataType::UInt8)
            .max_shape(vec![Extent::Fixed(2), Extent::Unlimited])
            .build(store, "/dataset")
            .unwrap();
        dataset.store_metadata().unwrap();
        dataset.write(&vec![1u8, 2, 3, 4]).unwrap();

        // Growing an inner dimension moves rows to new offsets
        dataset.resize(vec![2, 3]).unwrap();
        assert_eq!(
            dataset.read::<Vec<u8>>().unwrap(),
            vec![1, 2, 0, 3, 4, 0]
        );
    }

    #[test]
    fn dataset_resize_unbounded_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let mut dataset = DatasetBuilder::new(vec![2], DataType::UInt8)
            .build(store, "/dataset")
            .unwrap();
        dataset.store_metadata().unwrap();
        // Without a max shape the dataset is not resizable
        assert!(matches!(
            dataset.resize(vec![3]),
            Err(DatasetError::InvalidResize(_, _))
        ));
        dataset.resize(vec![2]).unwrap();
    }

    #[test]
    fn dataset_erase() {
        let store = Arc::new(MemoryStore::new());
        let dataset = DatasetBuilder::new(vec![2], DataType::UInt8)
            .build(store.clone(), "/dataset")
            .unwrap();
        dataset.store_metadata().unwrap();
        dataset.write(&vec![1u8, 2]).unwrap();
        dataset.erase().unwrap();
        assert!(Dataset::open(store, "/dataset").is_err());
    }
}
