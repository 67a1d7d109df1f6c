//! Global configuration options.
//!
//! Retrieve the global [`Config`] with [`global_config`] and modify it with
//! [`global_config_mut`].
//!
//! ## Chunk Line Bytes
//! > default: `8192`
//!
//! The assumed minimal efficient transfer size used when a target chunk byte budget is derived
//! for a dataset with a chunked layout and no explicit chunk shape.
//!
//! ## Default Chunk Bytes
//! > default: [`None`]
//!
//! A fixed target chunk byte budget applied at dataset creation.
//! If [`None`], the target scales with the dataset size, see
//! [`preferred_chunk_nbytes`](crate::array::preferred_chunk_nbytes).

use std::num::NonZeroU64;
use std::sync::{OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The default [chunk line bytes](crate::config#chunk-line-bytes) configuration.
pub const DEFAULT_CHUNK_LINE_NBYTES: NonZeroU64 = match NonZeroU64::new(8192) {
    Some(value) => value,
    None => unreachable!(),
};

/// Global configuration options.
#[derive(Debug)]
pub struct Config {
    chunk_line_nbytes: NonZeroU64,
    default_chunk_nbytes: Option<NonZeroU64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_line_nbytes: DEFAULT_CHUNK_LINE_NBYTES,
            default_chunk_nbytes: None,
        }
    }
}

impl Config {
    /// Get the [chunk line bytes](crate::config#chunk-line-bytes) configuration.
    #[must_use]
    pub fn chunk_line_nbytes(&self) -> NonZeroU64 {
        self.chunk_line_nbytes
    }

    /// Set the [chunk line bytes](crate::config#chunk-line-bytes) configuration.
    pub fn set_chunk_line_nbytes(&mut self, chunk_line_nbytes: NonZeroU64) {
        self.chunk_line_nbytes = chunk_line_nbytes;
    }

    /// Get the [default chunk bytes](crate::config#default-chunk-bytes) configuration.
    #[must_use]
    pub fn default_chunk_nbytes(&self) -> Option<NonZeroU64> {
        self.default_chunk_nbytes
    }

    /// Set the [default chunk bytes](crate::config#default-chunk-bytes) configuration.
    pub fn set_default_chunk_nbytes(&mut self, default_chunk_nbytes: Option<NonZeroU64>) {
        self.default_chunk_nbytes = default_chunk_nbytes;
    }
}

static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

/// Returns a reference to the global configuration.
///
/// # Panics
/// This function panics if the underlying lock has been poisoned and might panic if the global
/// config is already held by the current thread.
pub fn global_config() -> RwLockReadGuard<'static, Config> {
    CONFIG
        .get_or_init(|| RwLock::new(Config::default()))
        .read()
        .unwrap()
}

/// Returns a mutable reference to the global configuration.
///
/// # Panics
/// This function panics if the underlying lock has been poisoned and might panic if the global
/// config is already held by the current thread.
pub fn global_config_mut() -> RwLockWriteGuard<'static, Config> {
    CONFIG
        .get_or_init(|| RwLock::new(Config::default()))
        .write()
        .unwrap()
}
