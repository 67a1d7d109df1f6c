use serde::{Deserialize, Serialize};

use crate::array::{ArrayShape, ChunkShape, DataType, MaxShape};

/// The self-describing metadata document stored alongside dataset data.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DatasetMetadata {
    /// The node type, always `dataset`.
    pub node_type: String,
    /// The dataset shape.
    pub shape: ArrayShape,
    /// Optional per-dimension upper bounds for resizable datasets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_shape: Option<MaxShape>,
    /// The element data type.
    pub data_type: DataType,
    /// The storage layout.
    pub layout: DatasetLayout,
    /// Filters applied to chunks by the storage engine.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
    /// Optional user defined attributes.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl DatasetMetadata {
    /// Create dataset metadata with no bounds, filters, or attributes.
    #[must_use]
    pub fn new(shape: ArrayShape, data_type: DataType, layout: DatasetLayout) -> Self {
        Self {
            node_type: "dataset".to_string(),
            shape,
            max_shape: None,
            data_type,
            layout,
            filters: Vec::default(),
            attributes: serde_json::Map::default(),
        }
    }

    /// Validates the node type.
    #[must_use]
    pub fn validate_node_type(&self) -> bool {
        self.node_type == "dataset"
    }
}

/// The storage layout of a dataset.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "name", content = "configuration", rename_all = "snake_case")]
pub enum DatasetLayout {
    /// Data small enough to store inline with the metadata.
    Compact,
    /// A single contiguous extent.
    Contiguous,
    /// Fixed-shape tiles, the atomic unit of compressed and extensible storage.
    Chunked {
        /// The chunk shape.
        chunk_shape: ChunkShape,
    },
}

/// A dataset filter, recorded in metadata and applied to chunks by the storage engine.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "name", content = "configuration", rename_all = "snake_case")]
pub enum Filter {
    /// Deflate compression.
    Deflate {
        /// The compression level, 0 to 9.
        level: u32,
    },
    /// Byte shuffling to improve compression of multi-byte elements.
    Shuffle,
    /// A Fletcher-32 checksum.
    Fletcher32,
}
