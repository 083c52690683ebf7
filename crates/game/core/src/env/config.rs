//! Configuration oracle exposing rules tunables to the engine.

use crate::config::CoreConfig;

/// Provides access to runtime rules configuration.
pub trait ConfigOracle: Send + Sync {
    fn rules(&self) -> &CoreConfig;
}

impl ConfigOracle for CoreConfig {
    fn rules(&self) -> &CoreConfig {
        self
    }
}
