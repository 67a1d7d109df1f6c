//! Element data types.
//!
//! A [`DataType`] describes the encoding and byte width of one dataset element.
//! The fixed-width integer and floating point variants are plain process-wide values;
//! [`DataType::FixedString`] is parameterized by its byte width and constructed by whoever
//! needs it, typically from the current byte length of a text value.
//!
//! There is no boolean data type: booleans are stored as same-width unsigned integers by the
//! [`bool` adapter](crate::array::Adapter).

use derive_more::From;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A data type.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
#[rustfmt::skip]
pub enum DataType {
    /// `int8` Integer in `[-2^7, 2^7-1]`.
    Int8,
    /// `int16` Integer in `[-2^15, 2^15-1]`.
    Int16,
    /// `int32` Integer in `[-2^31, 2^31-1]`.
    Int32,
    /// `int64` Integer in `[-2^63, 2^63-1]`.
    Int64,
    /// `uint8` Integer in `[0, 2^8-1]`.
    UInt8,
    /// `uint16` Integer in `[0, 2^16-1]`.
    UInt16,
    /// `uint32` Integer in `[0, 2^32-1]`.
    UInt32,
    /// `uint64` Integer in `[0, 2^64-1]`.
    UInt64,
    /// `float32` IEEE 754 single-precision floating point.
    Float32,
    /// `float64` IEEE 754 double-precision floating point.
    Float64,
    /// `s*` Fixed-length text, size in bytes given by *.
    FixedString(usize),
}

/// An unsupported data type error.
#[derive(Debug, Error, From)]
#[error("unsupported data type {_0}")]
pub struct UnsupportedDataTypeError(String);

impl DataType {
    /// Returns the name.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Int8 => "int8".to_string(),
            Self::Int16 => "int16".to_string(),
            Self::Int32 => "int32".to_string(),
            Self::Int64 => "int64".to_string(),
            Self::UInt8 => "uint8".to_string(),
            Self::UInt16 => "uint16".to_string(),
            Self::UInt32 => "uint32".to_string(),
            Self::UInt64 => "uint64".to_string(),
            Self::Float32 => "float32".to_string(),
            Self::Float64 => "float64".to_string(),
            Self::FixedString(size) => format!("s{size}"),
        }
    }

    /// Returns the size in bytes of one element.
    #[must_use]
    pub const fn size(&self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
            Self::FixedString(size) => *size,
        }
    }

    /// Create a data type from its name.
    ///
    /// # Errors
    /// Returns [`UnsupportedDataTypeError`] if `name` is not a supported data type name.
    pub fn from_name(name: &str) -> Result<Self, UnsupportedDataTypeError> {
        match name {
            "int8" => return Ok(Self::Int8),
            "int16" => return Ok(Self::Int16),
            "int32" => return Ok(Self::Int32),
            "int64" => return Ok(Self::Int64),
            "uint8" => return Ok(Self::UInt8),
            "uint16" => return Ok(Self::UInt16),
            "uint32" => return Ok(Self::UInt32),
            "uint64" => return Ok(Self::UInt64),
            "float32" => return Ok(Self::Float32),
            "float64" => return Ok(Self::Float64),
            _ => {}
        }

        if let Some(size) = name.strip_prefix('s') {
            if let Ok(size) = size.parse::<usize>() {
                return Ok(Self::FixedString(size));
            }
        }

        Err(UnsupportedDataTypeError(name.to_string()))
    }
}

impl core::fmt::Display for DataType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for DataType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

impl<'de> Deserialize<'de> for DataType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::from_name(&name).map_err(|err| D::Error::custom(err.to_string()))
    }
}
