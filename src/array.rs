//! In-memory arrays: shapes, extents, element descriptors, and data adapters.
//!
//! A data-bearing value is described by a [`shape`](Adapter::shape) (per-dimension extents,
//! dimension 0 slowest-varying) and an element [`DataType`].
//! The [`Adapter`] and [`AdapterOwned`] traits bind these descriptions to concrete container
//! types; [`plan_chunk_shape`] derives a storage tile shape for chunked dataset layouts.

mod adapter;
mod chunk_plan;
mod chunk_shape;
mod data_type;

use serde::{Deserialize, Serialize};

pub use self::{
    adapter::{Adapter, AdapterError, AdapterOwned, Element},
    chunk_plan::{plan_chunk_shape, preferred_chunk_nbytes},
    chunk_shape::{chunk_shape_to_array_shape, ChunkShape, NonZeroError},
    data_type::{DataType, UnsupportedDataTypeError},
};

/// An ND index to an element in an array.
pub type ArrayIndices = Vec<u64>;

/// The shape of an array.
///
/// An extent of zero in any dimension denotes an empty array dimension.
/// A rank-0 (empty) shape denotes a scalar.
pub type ArrayShape = Vec<u64>;

/// The upper bound of one array dimension.
///
/// A dimension whose bound exceeds its current extent is eligible for later growth with
/// [`Dataset::resize`](crate::dataset::Dataset::resize).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Extent {
    /// A finite upper bound.
    Fixed(u64),
    /// No upper bound.
    Unlimited,
}

impl Extent {
    /// Returns true if `extent` is within this bound.
    #[must_use]
    pub fn bounds(&self, extent: u64) -> bool {
        match self {
            Self::Fixed(max) => extent <= *max,
            Self::Unlimited => true,
        }
    }
}

impl From<u64> for Extent {
    fn from(extent: u64) -> Self {
        Self::Fixed(extent)
    }
}

impl Serialize for Extent {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Fixed(extent) => serializer.serialize_some(extent),
            Self::Unlimited => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Extent {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map_or(Self::Unlimited, Self::Fixed))
    }
}

/// The maximum shape of an array, with one [`Extent`] per dimension.
pub type MaxShape = Vec<Extent>;

/// Unravel a linearised index to ND indices.
#[must_use]
pub fn unravel_index(mut index: u64, shape: &[u64]) -> ArrayIndices {
    let mut indices = vec![0; shape.len()];
    for (index_i, &dim) in std::iter::zip(indices.iter_mut().rev(), shape.iter().rev()) {
        *index_i = index % dim;
        index /= dim;
    }
    indices
}

/// Ravel ND indices to a linearised index.
#[must_use]
pub fn ravel_indices(indices: &[u64], shape: &[u64]) -> u64 {
    let mut index: u64 = 0;
    let mut count = 1;
    for (i, s) in std::iter::zip(indices, shape).rev() {
        index += i * count;
        count *= s;
    }
    index
}
