//! botones-storage — decides where produced artifacts (screenshots, merged
//! files) land on disk and under what name.
//!
//! Resolution order for the base directory: explicit override from config,
//! then the first existing well-known directory, then the process cwd as the
//! always-available fallback. Names never overwrite: a taken name gets a
//! zero-padded numeric suffix, and a timestamp when even those run out.

pub mod error;
pub mod resolver;

pub use error::{Result, StorageError};
pub use resolver::{unique_name, OutputKind, StorageResolver};
