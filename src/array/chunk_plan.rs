//! Chunk shape planning for chunked dataset layouts.
//!
//! When a dataset is created with a chunked layout and no explicit chunk shape, a chunk shape
//! is derived from the dataset shape and element size with [`plan_chunk_shape`].
//! The target chunk byte budget either is given explicitly or scales sub-linearly with the
//! dataset size via [`preferred_chunk_nbytes`], trading transfer efficiency against per-chunk
//! metadata and compression overhead.

use std::num::NonZeroU64;

use crate::config::global_config;

use super::ChunkShape;

/// Return a preferred target chunk size in bytes for a dataset of shape `data_shape` with
/// elements of `item_nbytes` bytes.
///
/// `line_nbytes` is the assumed minimal efficient transfer size.
/// The dataset size in MiB is clamped into `[1, 2^23]` (1 MiB to 8 TiB) and the target is
/// `floor(sqrt(data_mib)) * line_nbytes`: a 1 MiB dataset gets a one line chunk, a 1 TiB
/// dataset roughly a 1024 line chunk.
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_precision_loss)]
#[allow(clippy::cast_sign_loss)]
#[must_use]
pub fn preferred_chunk_nbytes(
    data_shape: &[u64],
    item_nbytes: NonZeroU64,
    line_nbytes: NonZeroU64,
) -> u64 {
    let num_elements = data_shape.iter().map(|extent| (*extent).max(1)).product::<u64>();
    let data_mib = ((item_nbytes.get() * num_elements) >> 20).clamp(1, 1 << 23);
    (data_mib as f64).sqrt() as u64 * line_nbytes.get()
}

/// Plan a chunk shape for a dataset of shape `data_shape` with elements of `item_nbytes`
/// bytes.
///
/// Zero extents in `data_shape` are clamped to one: a zero-sized dimension cannot be tiled.
/// If `chunk_nbytes` is [`None`], a target is derived with [`preferred_chunk_nbytes`].
/// If `line_nbytes` is [`None`], the [global configuration](crate::config) value is used.
///
/// If the whole dataset fits in the target, its shape is the chunk shape.
/// Otherwise dimensions are trimmed to one in index order, dimension 0 first; the first
/// dimension whose trim drops the chunk below the target is expanded to meet it and trimming
/// stops.
/// Later dimensions keep their full extent, favoring locality along the fastest-varying
/// dimension.
///
/// The returned shape has the rank of `data_shape`, every extent at least one, and never
/// exceeds the (clamped) dataset shape in any dimension.
#[must_use]
pub fn plan_chunk_shape(
    data_shape: &[u64],
    item_nbytes: NonZeroU64,
    chunk_nbytes: Option<NonZeroU64>,
    line_nbytes: Option<NonZeroU64>,
) -> ChunkShape {
    let line_nbytes = line_nbytes.unwrap_or_else(|| global_config().chunk_line_nbytes());
    let chunk_nbytes = chunk_nbytes.map_or_else(
        || preferred_chunk_nbytes(data_shape, item_nbytes, line_nbytes),
        NonZeroU64::get,
    );
    let desired_chunk_elements = chunk_nbytes / item_nbytes;

    // Start with a chunk as large as the whole dataset
    let mut chunk_shape: Vec<u64> = data_shape.iter().map(|extent| (*extent).max(1)).collect();
    let mut chunk_elements = chunk_shape.iter().product::<u64>();
    if chunk_elements > desired_chunk_elements {
        // Trim each dimension in turn until the chunk drops below the target, then expand the
        // last trimmed dimension as far as the target allows
        for trim_dim in 0..chunk_shape.len() {
            chunk_shape[trim_dim] = 1;
            chunk_elements = chunk_shape.iter().product::<u64>();
            if chunk_elements < desired_chunk_elements {
                chunk_shape[trim_dim] = (desired_chunk_elements / chunk_elements).max(1);
                break;
            }
        }
    }

    chunk_shape
        .into_iter()
        .map(|extent| NonZeroU64::new(extent).unwrap_or(NonZeroU64::MIN))
        .collect::<Vec<_>>()
        .into()
}
