use std::num::NonZeroU64;
use std::sync::Arc;

use crate::{
    array::{plan_chunk_shape, ArrayShape, ChunkShape, DataType, MaxShape},
    config::global_config,
};

use super::{Dataset, DatasetCreateError, DatasetLayout, DatasetMetadata, Filter};

/// A [`Dataset`] builder.
///
/// The builder is initialised from a dataset shape and data type, with a contiguous layout and
/// no bounds, filters, or attributes.
/// Creation properties are chainable:
///
/// ```rust,ignore
/// # use std::sync::Arc;
/// # use gridstore::array::DataType;
/// # use gridstore::dataset::DatasetBuilder;
/// # let store = Arc::new(gridstore::storage::store::MemoryStore::new());
/// let dataset = DatasetBuilder::new(vec![100, 100], DataType::Float32)
///     .chunked()
///     .deflate(3)
///     .shuffle()
///     .build(store, "/dataset")?;
/// dataset.store_metadata()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// A chunked layout without an explicit [`chunk_shape`](DatasetBuilder::chunk_shape) has one
/// planned at build time with [`plan_chunk_shape`]; on a scalar dataset it falls back to
/// contiguous, since a rank-0 extent cannot be tiled.
///
/// Note that [`build`](DatasetBuilder::build) does not modify the store; the dataset metadata
/// has to be explicitly written with [`Dataset::store_metadata`].
#[derive(Debug, Clone)]
pub struct DatasetBuilder {
    shape: ArrayShape,
    data_type: DataType,
    max_shape: Option<MaxShape>,
    layout: RequestedLayout,
    filters: Vec<Filter>,
    attributes: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone)]
enum RequestedLayout {
    Compact,
    Contiguous,
    Chunked(Option<ChunkShape>),
}

impl DatasetBuilder {
    /// Create a new dataset builder for a dataset of `shape` and `data_type`.
    #[must_use]
    pub fn new(shape: ArrayShape, data_type: DataType) -> Self {
        Self {
            shape,
            data_type,
            max_shape: None,
            layout: RequestedLayout::Contiguous,
            filters: Vec::default(),
            attributes: serde_json::Map::default(),
        }
    }

    /// Set the shape.
    pub fn shape(&mut self, shape: ArrayShape) -> &mut Self {
        self.shape = shape;
        self
    }

    /// Set the data type.
    pub fn data_type(&mut self, data_type: DataType) -> &mut Self {
        self.data_type = data_type;
        self
    }

    /// Set the maximum shape, marking dimensions eligible for later growth.
    ///
    /// If left unmodified, the dataset is not resizable.
    pub fn max_shape(&mut self, max_shape: MaxShape) -> &mut Self {
        self.max_shape = Some(max_shape);
        self
    }

    /// Use a compact layout.
    pub fn compact(&mut self) -> &mut Self {
        self.layout = RequestedLayout::Compact;
        self
    }

    /// Use a contiguous layout. This is the default.
    pub fn contiguous(&mut self) -> &mut Self {
        self.layout = RequestedLayout::Contiguous;
        self
    }

    /// Use a chunked layout with a chunk shape planned at build time.
    pub fn chunked(&mut self) -> &mut Self {
        self.layout = RequestedLayout::Chunked(None);
        self
    }

    /// Use a chunked layout with an explicit chunk shape.
    pub fn chunk_shape(&mut self, chunk_shape: ChunkShape) -> &mut Self {
        self.layout = RequestedLayout::Chunked(Some(chunk_shape));
        self
    }

    /// Add a deflate filter with compression level `level`.
    pub fn deflate(&mut self, level: u32) -> &mut Self {
        self.filters.push(Filter::Deflate { level });
        self
    }

    /// Add a byte shuffle filter.
    pub fn shuffle(&mut self) -> &mut Self {
        self.filters.push(Filter::Shuffle);
        self
    }

    /// Add a Fletcher-32 checksum filter.
    pub fn fletcher32(&mut self) -> &mut Self {
        self.filters.push(Filter::Fletcher32);
        self
    }

    /// Set the user defined attributes.
    ///
    /// If left unmodified, the user defined attributes of the dataset will be empty.
    pub fn attributes(
        &mut self,
        attributes: serde_json::Map<String, serde_json::Value>,
    ) -> &mut Self {
        self.attributes = attributes;
        self
    }

    /// Build into a [`Dataset`].
    ///
    /// # Errors
    /// Returns [`DatasetCreateError`] if the path or the dataset configuration is invalid.
    pub fn build<TStorage: ?Sized>(
        &self,
        storage: Arc<TStorage>,
        path: &str,
    ) -> Result<Dataset<TStorage>, DatasetCreateError> {
        let layout = match &self.layout {
            RequestedLayout::Compact => DatasetLayout::Compact,
            RequestedLayout::Contiguous => DatasetLayout::Contiguous,
            // No chunking is applicable to a rank-0 extent
            RequestedLayout::Chunked(None) if self.shape.is_empty() => DatasetLayout::Contiguous,
            RequestedLayout::Chunked(None) => {
                let item_nbytes = NonZeroU64::new(self.data_type.size() as u64)
                    .ok_or(DatasetCreateError::ZeroSizeDataType(self.data_type))?;
                let chunk_nbytes = global_config().default_chunk_nbytes();
                DatasetLayout::Chunked {
                    chunk_shape: plan_chunk_shape(&self.shape, item_nbytes, chunk_nbytes, None),
                }
            }
            RequestedLayout::Chunked(Some(chunk_shape)) => DatasetLayout::Chunked {
                chunk_shape: chunk_shape.clone(),
            },
        };

        let mut metadata = DatasetMetadata::new(self.shape.clone(), self.data_type, layout);
        metadata.max_shape = self.max_shape.clone();
        metadata.filters = self.filters.clone();
        metadata.attributes = self.attributes.clone();
        Dataset::new_with_metadata(storage, path, metadata)
    }
}
