//! Content loaders for reading authored data from files.
//!
//! Loaders convert RON definition files and the TOML rules file into the
//! in-memory [`DefinitionRegistry`](crate::registry::DefinitionRegistry)
//! and [`CoreConfig`](skirmish_core::CoreConfig).

mod definitions;

pub use definitions::{load_abilities, load_config, load_registry, load_statuses, load_zones};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
