use std::num::NonZeroU64;

use derive_more::Deref;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ArrayShape;

/// An error arising from a zero value where a non-zero value is required.
#[derive(Debug, Error)]
#[error("value must be non-zero")]
pub struct NonZeroError;

/// The shape of a chunk. All dimensions must be non-zero.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Deref)]
pub struct ChunkShape(Vec<NonZeroU64>);

impl ChunkShape {
    /// Return the number of elements.
    ///
    /// Equal to the product of the components of its shape.
    #[must_use]
    pub fn num_elements_u64(&self) -> u64 {
        self.0.iter().copied().map(NonZeroU64::get).product::<u64>()
    }

    /// Return the number of elements as a usize.
    ///
    /// # Panics
    /// Panics if the number of elements exceeds [`usize::MAX`].
    #[must_use]
    pub fn num_elements_usize(&self) -> usize {
        usize::try_from(self.num_elements_u64()).unwrap()
    }
}

impl From<ChunkShape> for Vec<NonZeroU64> {
    fn from(value: ChunkShape) -> Self {
        value.0
    }
}

impl From<Vec<NonZeroU64>> for ChunkShape {
    fn from(value: Vec<NonZeroU64>) -> Self {
        Self(value)
    }
}

impl From<&[NonZeroU64]> for ChunkShape {
    fn from(value: &[NonZeroU64]) -> Self {
        Self(value.to_vec())
    }
}

impl TryFrom<Vec<u64>> for ChunkShape {
    type Error = NonZeroError;
    fn try_from(value: Vec<u64>) -> Result<Self, Self::Error> {
        value.as_slice().try_into()
    }
}

impl TryFrom<&[u64]> for ChunkShape {
    type Error = NonZeroError;
    fn try_from(value: &[u64]) -> Result<Self, Self::Error> {
        Ok(Self(
            value
                .iter()
                .map(|&i| NonZeroU64::new(i).ok_or(NonZeroError))
                .collect::<Result<_, _>>()?,
        ))
    }
}

/// Convert a [`ChunkShape`] to an [`ArrayShape`].
#[must_use]
pub fn chunk_shape_to_array_shape(chunk_shape: &[NonZeroU64]) -> ArrayShape {
    chunk_shape.iter().map(|i| i.get()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_shape_try_from() {
        let chunk_shape: ChunkShape = vec![4u64, 2, 1].try_into().unwrap();
        assert_eq!(chunk_shape.num_elements_u64(), 8);
        assert_eq!(chunk_shape.num_elements_usize(), 8);
        assert_eq!(chunk_shape_to_array_shape(&chunk_shape), vec![4, 2, 1]);
        assert!(ChunkShape::try_from(vec![4u64, 0, 1]).is_err());
    }

    #[test]
    fn chunk_shape_serde() {
        let chunk_shape: ChunkShape = vec![4u64, 2].try_into().unwrap();
        let json = serde_json::to_string(&chunk_shape).unwrap();
        assert_eq!(json, "[4,2]");
        assert_eq!(serde_json::from_str::<ChunkShape>(&json).unwrap(), chunk_shape);
    }
}
