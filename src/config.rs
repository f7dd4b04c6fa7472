//! # Engine Configuration
//!
//! Settings are read from a JSON document. Every key is optional and falls
//! back to its default, so `{}` is a valid configuration:
//!
//! ```json
//! {
//!     "world": {
//!         "seed": 42,
//!         "generator": "value_noise",
//!         "preload_distance": 6,
//!         "render_distance": 4,
//!         "unload_distance": 8,
//!         "loader_threads": 2,
//!         "chunk_cache_capacity": 64
//!     }
//! }
//! ```
//!
//! Distances are in chunks, measured as the larger of the x and z offsets.

use std::fs;
use std::path::Path;

use log::info;
use serde::Deserialize;

use crate::engine_state::voxels::land::{GeneratorKind, Seed};
use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// World generation and streaming settings
    pub world: WorldConfig,
}

/// World generation and chunk streaming settings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Terrain seed
    pub seed: Seed,
    /// Terrain generator
    pub generator: GeneratorKind,
    /// Chunks within this distance of the centre are generated
    pub preload_distance: i32,
    /// Chunks within this distance of the centre are meshed
    pub render_distance: i32,
    /// Chunks beyond this distance of the centre are unloaded
    pub unload_distance: i32,
    /// Chunk generation worker threads, `0` to generate on the calling thread
    pub loader_threads: usize,
    /// Unloaded chunks kept in memory for quick reloading
    pub chunk_cache_capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            seed: 42,
            generator: GeneratorKind::ValueNoise,
            preload_distance: 6,
            render_distance: 4,
            unload_distance: 8,
            loader_threads: 2,
            chunk_cache_capacity: 64,
        }
    }
}

impl WorldConfig {
    /// Checks that the distances are ordered and the cache can hold a chunk.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render_distance < 0 {
            return Err(ConfigError::Invalid(format!(
                "render_distance ({}) must not be negative",
                self.render_distance
            )));
        }
        if self.render_distance >= self.preload_distance {
            return Err(ConfigError::Invalid(format!(
                "render_distance ({}) must be less than preload_distance ({})",
                self.render_distance, self.preload_distance
            )));
        }
        if self.preload_distance >= self.unload_distance {
            return Err(ConfigError::Invalid(format!(
                "preload_distance ({}) must be less than unload_distance ({})",
                self.preload_distance, self.unload_distance
            )));
        }
        if self.chunk_cache_capacity == 0 {
            return Err(ConfigError::Invalid(
                "chunk_cache_capacity must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

impl EngineConfig {
    /// Parses and validates a configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.world.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("Loading config from: {}", path.display());
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
