//! A library for storing typed multidimensional data and metadata in hierarchical self-describing stores.
//!
//! `gridstore` maps native in-memory containers (scalars, fixed arrays, `Vec`s, strings, and
//! optionally `ndarray` arrays) to shaped, typed datasets in a hierarchical store without the
//! caller hand-managing shapes, element descriptors, or raw buffers.
//! The mapping is driven by the [`Adapter`](crate::array::Adapter) and
//! [`AdapterOwned`](crate::array::AdapterOwned) traits, which infer the dimensional shape,
//! element [`DataType`](crate::array::DataType), and raw storage of a value, and construct fresh
//! values for reads.
//! When a dataset uses a chunked layout and no chunk shape is given, one is derived with
//! [`plan_chunk_shape`](crate::array::plan_chunk_shape).
//!
//! ## Example
//! ```rust,ignore
//! # use std::sync::Arc;
//! use gridstore::array::DataType;
//! use gridstore::dataset::{Dataset, DatasetBuilder};
//!
//! let store = Arc::new(gridstore::storage::store::MemoryStore::new());
//! let dataset = DatasetBuilder::new(vec![100, 100], DataType::Float32)
//!     .chunked()
//!     .deflate(5)
//!     .build(store.clone(), "/group/dataset")?;
//! dataset.store_metadata()?;
//!
//! dataset.write(&vec![0.0f32; 100 * 100])?;
//! let elements: Vec<f32> = dataset.read()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crate Features
//!  - `ndarray` (default): adapter support for `ndarray` arrays.

#![warn(unused_variables)]
#![warn(dead_code)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![deny(clippy::missing_panics_doc)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod array;
pub mod config;
pub mod dataset;
pub mod group;
pub mod node;
pub mod storage;
