//! Error types of the crate.

use thiserror::Error;

use crate::engine_state::voxels::coordinates::ChunkPosition;

/// Failure to load or validate the engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file format: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// A rejected world edit.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("Block y {y} is outside the world")]
    OutOfWorld { y: i32 },
    #[error("Chunk {0:?} is not loaded")]
    ChunkNotLoaded(ChunkPosition),
}
