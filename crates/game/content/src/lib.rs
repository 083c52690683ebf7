//! Data-driven content definitions and loaders.
//!
//! This crate houses the authored-data side of the rules core:
//! - In-memory registries implementing the core's definition oracles
//! - A simple grid map implementing the grid oracle
//! - RON loaders for ability/status/zone definition files
//! - A TOML loader for the rules configuration
//!
//! Content is consumed by host oracles and never appears in game state.
//! All loaders deserialize straight into `skirmish-core` types with serde.

pub mod registry;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use registry::{DefinitionRegistry, GridMap};

#[cfg(feature = "loaders")]
pub use loaders::{
    LoadResult, load_abilities, load_config, load_registry, load_statuses, load_zones,
};
