use thiserror::Error;

use crate::{
    array::{AdapterError, ArrayShape, DataType, MaxShape},
    node::{NodePath, NodePathError},
    storage::StorageError,
};

/// A dataset creation error.
#[derive(Debug, Error)]
pub enum DatasetCreateError {
    /// An invalid node path.
    #[error(transparent)]
    NodePathError(#[from] NodePathError),
    /// Invalid node type.
    #[error("invalid node type {_0}, expected dataset")]
    InvalidNodeType(String),
    /// The dimensionality of the chunk shape does not match the dataset shape.
    #[error("chunk dimensionality {_0} does not match dataset dimensionality {_1}")]
    InvalidChunkDimensionality(usize, usize),
    /// A chunked layout was requested for a scalar dataset.
    #[error("a chunked layout is not applicable to a scalar dataset")]
    ChunkedScalarDataset,
    /// The max shape is incompatible with the dataset shape.
    #[error("max shape {_0:?} is incompatible with dataset shape {_1:?}")]
    InvalidMaxShape(MaxShape, ArrayShape),
    /// The data type has no storable size.
    #[error("data type {_0} has zero size")]
    ZeroSizeDataType(DataType),
    /// Dataset metadata is missing from the store.
    #[error("dataset metadata is missing at {_0}")]
    MissingMetadata(NodePath),
    /// An error deserializing the metadata.
    #[error(transparent)]
    MetadataDeserializationError(#[from] serde_json::Error),
    /// A storage error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
}

/// A dataset operation error.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// A storage error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
    /// An adapter error.
    #[error(transparent)]
    AdapterError(#[from] AdapterError),
    /// An error serializing or deserializing metadata.
    #[error(transparent)]
    MetadataError(#[from] serde_json::Error),
    /// The data type of a value does not match the dataset.
    #[error("got value data type {_0}, expected {_1}")]
    IncompatibleDataType(DataType, DataType),
    /// The element count of a value does not match the dataset.
    #[error("value shape {_0:?} is incompatible with dataset shape {_1:?}")]
    IncompatibleShape(ArrayShape, ArrayShape),
    /// The dataset has no stored data.
    #[error("dataset at {_0} has no stored data")]
    MissingData(NodePath),
    /// An invalid resize.
    #[error("new shape {_0:?} is incompatible with shape {_1:?} and the dataset bounds")]
    InvalidResize(ArrayShape, ArrayShape),
}
