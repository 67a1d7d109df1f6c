//! Hierarchy nodes.
//!
//! A node is a location in a hierarchical store holding a [`Group`](crate::group::Group) or a
//! [`Dataset`](crate::dataset::Dataset), addressed by a [`NodePath`].

mod node_path;

pub use node_path::{NodePath, NodePathError};
