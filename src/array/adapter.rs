//! Data adapters binding native containers to shaped, typed dataset storage.
//!
//! An [`Adapter`] infers the dimensional shape, element [`DataType`], and raw storage bytes of
//! an in-memory value; an [`AdapterOwned`] additionally constructs fresh values for reads.
//! The supported families are arithmetic scalars (including `bool`), fixed arrays `[T; N]`,
//! dynamically-sized sequences [`Vec<T>`], borrowed slices `&[T]` (write only), text
//! ([`String`]), and `ndarray` arrays with the `ndarray` feature.
//!
//! A type outside these families has no implementation, so requesting an adapter operation for
//! it fails at compile time rather than at runtime.
//!
//! Booleans have no storage-level data type: a `bool` is bound to the same-width unsigned
//! integer descriptor, written as the bytes `0`/`1`, and validated on read.

use std::borrow::Cow;

use thiserror::Error;

use super::{ArrayShape, DataType};

/// An adapter error.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The shape holds a different number of elements than the value type can.
    #[error("shape {_0:?} holds {_1} elements, expected {_2}")]
    SizeMismatch(ArrayShape, u64, u64),
    /// The data type is incompatible with the value type.
    #[error("incompatible data type {_0}")]
    IncompatibleDataType(DataType),
    /// The shape rank is incompatible with the dimensionality of the value type.
    #[error("shape {_0:?} is incompatible with an array of dimensionality {_1}")]
    IncompatibleDimensionality(ArrayShape, usize),
    /// Text storage must be one dimensional.
    #[error("text storage must be one dimensional, got shape {_0:?}")]
    IncompatibleTextShape(ArrayShape),
    /// The byte buffer length does not match the storage size of the value.
    #[error("got {_0} bytes, expected {_1}")]
    InvalidBytesLength(usize, usize),
    /// A stored byte pattern is not valid for the element type.
    #[error("invalid byte pattern for the element type")]
    InvalidElementValue,
}

/// A fixed-width scalar element type with a matching [`DataType`] descriptor.
pub trait Element:
    bytemuck::NoUninit + bytemuck::CheckedBitPattern + Default + Copy + Send + Sync
{
    /// The descriptor an element of this type is stored as.
    const DATA_TYPE: DataType;

    /// Returns true if elements of this type can hold values stored as `data_type`.
    fn matches_data_type(data_type: &DataType) -> bool {
        data_type == &Self::DATA_TYPE
    }
}

/// A value with inferable shape, element data type, and raw storage.
///
/// Implementations exist for the supported container families only; any other type is a
/// compile-time failure at the call site.
pub trait Adapter {
    /// The number of dimensions. A property of the value type, not of its contents.
    fn rank(&self) -> usize;

    /// The shape of the value.
    ///
    /// Empty for scalars and text: the extent of a text value is encoded in the byte width of
    /// its data type, not in its shape.
    fn shape(&self) -> ArrayShape;

    /// The data type of one element of the value.
    fn data_type(&self) -> DataType;

    /// The raw storage of the value as bytes, borrowed where the storage is contiguous.
    fn to_bytes(&self) -> Cow<'_, [u8]>;
}

/// An [`Adapter`] that can also be constructed from a shape and raw storage bytes.
pub trait AdapterOwned: Adapter + Sized {
    /// Construct a value sized to hold `shape` elements of `data_type`, default initialised.
    ///
    /// # Errors
    /// Returns [`AdapterError::SizeMismatch`] if the element count of `shape` conflicts with a
    /// fixed-capacity value type, and [`AdapterError::IncompatibleTextShape`] for text with a
    /// multi-dimensional shape. The conflict is never resolved by truncation or padding.
    fn allocate(shape: &[u64], data_type: &DataType) -> Result<Self, AdapterError>;

    /// Construct a value of shape `shape` holding the elements stored in `bytes`.
    ///
    /// # Errors
    /// Returns an [`AdapterError`] if `data_type` is incompatible with the value type, if the
    /// allocation policy of [`allocate`](AdapterOwned::allocate) rejects `shape`, if the length
    /// of `bytes` conflicts with `shape`, or if `bytes` holds an invalid element bit pattern.
    fn from_bytes(shape: &[u64], data_type: &DataType, bytes: &[u8])
        -> Result<Self, AdapterError>;
}

/// Decode a byte buffer into elements, validating each bit pattern.
fn elements_from_bytes<T: Element>(bytes: &[u8]) -> Result<Vec<T>, AdapterError> {
    let size = core::mem::size_of::<T>();
    if size == 0 || bytes.len() % size != 0 {
        return Err(AdapterError::InvalidBytesLength(bytes.len(), size));
    }
    bytes
        .chunks_exact(size)
        .map(|chunk| {
            bytemuck::checked::try_pod_read_unaligned::<T>(chunk)
                .map_err(|_| AdapterError::InvalidElementValue)
        })
        .collect()
}

macro_rules! impl_element_scalar {
    ($raw_type:ty, $data_type:expr, $pattern:pat) => {
        impl Element for $raw_type {
            const DATA_TYPE: DataType = $data_type;
            fn matches_data_type(data_type: &DataType) -> bool {
                matches!(data_type, $pattern)
            }
        }

        impl Adapter for $raw_type {
            fn rank(&self) -> usize {
                0
            }

            fn shape(&self) -> ArrayShape {
                vec![]
            }

            fn data_type(&self) -> DataType {
                <Self as Element>::DATA_TYPE
            }

            fn to_bytes(&self) -> Cow<'_, [u8]> {
                Cow::Borrowed(bytemuck::must_cast_slice(core::slice::from_ref(self)))
            }
        }

        impl AdapterOwned for $raw_type {
            fn allocate(shape: &[u64], _data_type: &DataType) -> Result<Self, AdapterError> {
                let num_elements = shape.iter().product::<u64>();
                if num_elements == 1 {
                    Ok(Self::default())
                } else {
                    Err(AdapterError::SizeMismatch(shape.to_vec(), num_elements, 1))
                }
            }

            fn from_bytes(
                shape: &[u64],
                data_type: &DataType,
                bytes: &[u8],
            ) -> Result<Self, AdapterError> {
                if !<Self as Element>::matches_data_type(data_type) {
                    return Err(AdapterError::IncompatibleDataType(*data_type));
                }
                Self::allocate(shape, data_type)?;
                if bytes.len() != core::mem::size_of::<Self>() {
                    return Err(AdapterError::InvalidBytesLength(
                        bytes.len(),
                        core::mem::size_of::<Self>(),
                    ));
                }
                Ok(elements_from_bytes::<Self>(bytes)?[0])
            }
        }
    };
}

impl_element_scalar!(i8, DataType::Int8, DataType::Int8);
impl_element_scalar!(i16, DataType::Int16, DataType::Int16);
impl_element_scalar!(i32, DataType::Int32, DataType::Int32);
impl_element_scalar!(i64, DataType::Int64, DataType::Int64);
impl_element_scalar!(u8, DataType::UInt8, DataType::UInt8);
impl_element_scalar!(u16, DataType::UInt16, DataType::UInt16);
impl_element_scalar!(u32, DataType::UInt32, DataType::UInt32);
impl_element_scalar!(u64, DataType::UInt64, DataType::UInt64);
impl_element_scalar!(f32, DataType::Float32, DataType::Float32);
impl_element_scalar!(f64, DataType::Float64, DataType::Float64);
// The storage engine has no boolean kind. A bool is one byte, so it binds to the one byte
// unsigned integer descriptor and accepts either same-width integer kind on read.
impl_element_scalar!(bool, DataType::UInt8, DataType::Int8 | DataType::UInt8);

impl<T: Element, const N: usize> Adapter for [T; N] {
    fn rank(&self) -> usize {
        1
    }

    fn shape(&self) -> ArrayShape {
        vec![N as u64]
    }

    fn data_type(&self) -> DataType {
        T::DATA_TYPE
    }

    fn to_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(bytemuck::must_cast_slice(self.as_slice()))
    }
}

impl<T: Element, const N: usize> AdapterOwned for [T; N] {
    fn allocate(shape: &[u64], _data_type: &DataType) -> Result<Self, AdapterError> {
        let num_elements = shape.iter().product::<u64>();
        if num_elements == N as u64 {
            Ok([T::default(); N])
        } else {
            Err(AdapterError::SizeMismatch(
                shape.to_vec(),
                num_elements,
                N as u64,
            ))
        }
    }

    fn from_bytes(
        shape: &[u64],
        data_type: &DataType,
        bytes: &[u8],
    ) -> Result<Self, AdapterError> {
        if !T::matches_data_type(data_type) {
            return Err(AdapterError::IncompatibleDataType(*data_type));
        }
        Self::allocate(shape, data_type)?;
        let expected_nbytes = N * core::mem::size_of::<T>();
        if bytes.len() != expected_nbytes {
            return Err(AdapterError::InvalidBytesLength(
                bytes.len(),
                expected_nbytes,
            ));
        }
        elements_from_bytes::<T>(bytes)?
            .try_into()
            .map_err(|_| AdapterError::InvalidBytesLength(bytes.len(), expected_nbytes))
    }
}

impl<T: Element> Adapter for Vec<T> {
    fn rank(&self) -> usize {
        1
    }

    fn shape(&self) -> ArrayShape {
        vec![self.len() as u64]
    }

    fn data_type(&self) -> DataType {
        T::DATA_TYPE
    }

    fn to_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(bytemuck::must_cast_slice(self.as_slice()))
    }
}

impl<T: Element> AdapterOwned for Vec<T> {
    fn allocate(shape: &[u64], _data_type: &DataType) -> Result<Self, AdapterError> {
        let num_elements = usize::try_from(shape.iter().product::<u64>()).unwrap();
        Ok(vec![T::default(); num_elements])
    }

    fn from_bytes(
        shape: &[u64],
        data_type: &DataType,
        bytes: &[u8],
    ) -> Result<Self, AdapterError> {
        if !T::matches_data_type(data_type) {
            return Err(AdapterError::IncompatibleDataType(*data_type));
        }
        let num_elements = usize::try_from(shape.iter().product::<u64>()).unwrap();
        let expected_nbytes = num_elements * core::mem::size_of::<T>();
        if bytes.len() != expected_nbytes {
            return Err(AdapterError::InvalidBytesLength(
                bytes.len(),
                expected_nbytes,
            ));
        }
        elements_from_bytes::<T>(bytes)
    }
}

// A borrowed slice carries its length, so shape and data are inferable, but it cannot be
// allocated: slices bind as write-only adapters.
impl<'a, T: Element> Adapter for &'a [T] {
    fn rank(&self) -> usize {
        1
    }

    fn shape(&self) -> ArrayShape {
        vec![self.len() as u64]
    }

    fn data_type(&self) -> DataType {
        T::DATA_TYPE
    }

    fn to_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(bytemuck::must_cast_slice(self))
    }
}

fn validate_text_shape(shape: &[u64]) -> Result<u64, AdapterError> {
    if shape.len() > 1 && shape[1..].iter().product::<u64>() > 1 {
        return Err(AdapterError::IncompatibleTextShape(shape.to_vec()));
    }
    Ok(shape.first().copied().unwrap_or(1))
}

impl Adapter for String {
    fn rank(&self) -> usize {
        0
    }

    fn shape(&self) -> ArrayShape {
        vec![]
    }

    fn data_type(&self) -> DataType {
        DataType::FixedString(self.len())
    }

    fn to_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl AdapterOwned for String {
    fn allocate(shape: &[u64], _data_type: &DataType) -> Result<Self, AdapterError> {
        let len = validate_text_shape(shape)?;
        Ok("\0".repeat(usize::try_from(len).unwrap()))
    }

    fn from_bytes(
        shape: &[u64],
        data_type: &DataType,
        bytes: &[u8],
    ) -> Result<Self, AdapterError> {
        let DataType::FixedString(_) = data_type else {
            return Err(AdapterError::IncompatibleDataType(*data_type));
        };
        let len = validate_text_shape(shape)?;
        if bytes.len() as u64 != len {
            return Err(AdapterError::InvalidBytesLength(
                bytes.len(),
                usize::try_from(len).unwrap(),
            ));
        }
        Self::from_utf8(bytes.to_vec()).map_err(|_| AdapterError::InvalidElementValue)
    }
}

#[cfg(feature = "ndarray")]
impl<T: Element, D: ndarray::Dimension> Adapter for ndarray::Array<T, D> {
    fn rank(&self) -> usize {
        self.ndim()
    }

    fn shape(&self) -> ArrayShape {
        self.shape().iter().map(|&extent| extent as u64).collect()
    }

    fn data_type(&self) -> DataType {
        T::DATA_TYPE
    }

    fn to_bytes(&self) -> Cow<'_, [u8]> {
        self.as_slice().map_or_else(
            || {
                let elements: Vec<T> = self.iter().copied().collect();
                Cow::Owned(bytemuck::must_cast_slice(&elements).to_vec())
            },
            |elements| Cow::Borrowed(bytemuck::must_cast_slice(elements)),
        )
    }
}

#[cfg(feature = "ndarray")]
fn ndarray_dimension<D: ndarray::Dimension>(shape: &[u64]) -> Result<D, AdapterError> {
    let shape_usize: Vec<usize> = shape
        .iter()
        .map(|&extent| usize::try_from(extent).unwrap())
        .collect();
    D::from_dimension(&ndarray::IxDyn(&shape_usize)).ok_or_else(|| {
        AdapterError::IncompatibleDimensionality(shape.to_vec(), D::NDIM.unwrap_or(0))
    })
}

#[cfg(feature = "ndarray")]
impl<T: Element, D: ndarray::Dimension> AdapterOwned for ndarray::Array<T, D> {
    fn allocate(shape: &[u64], _data_type: &DataType) -> Result<Self, AdapterError> {
        Ok(Self::default(ndarray_dimension::<D>(shape)?))
    }

    fn from_bytes(
        shape: &[u64],
        data_type: &DataType,
        bytes: &[u8],
    ) -> Result<Self, AdapterError> {
        if !T::matches_data_type(data_type) {
            return Err(AdapterError::IncompatibleDataType(*data_type));
        }
        let dim = ndarray_dimension::<D>(shape)?;
        let num_elements = usize::try_from(shape.iter().product::<u64>()).unwrap();
        let expected_nbytes = num_elements * core::mem::size_of::<T>();
        if bytes.len() != expected_nbytes {
            return Err(AdapterError::InvalidBytesLength(
                bytes.len(),
                expected_nbytes,
            ));
        }
        let elements = elements_from_bytes::<T>(bytes)?;
        Self::from_shape_vec(dim, elements).map_err(|_| {
            AdapterError::IncompatibleDimensionality(shape.to_vec(), D::NDIM.unwrap_or(0))
        })
    }
}
