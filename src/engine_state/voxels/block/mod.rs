//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel world.
//! It includes block type definitions, packed light values, block faces and the
//! static per-type metadata table.

use block_light::BlockLight;
use block_type::BlockType;

pub mod block_info;
pub mod block_light;
pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in compact form.
pub type BlockTypeSize = u8;

/// Represents a single voxel in the world: its type and its current light.
///
/// This is a lightweight value; chunks store the two halves in separate arrays
/// and assemble a `Block` on read.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Block {
    /// The type of this block
    pub block_type: BlockType,
    /// Light currently reaching this block
    pub light: BlockLight,
}

impl Block {
    /// Creates a new block of the specified type and light.
    pub fn new(block_type: BlockType, light: BlockLight) -> Self {
        Block { block_type, light }
    }

    /// An air block under open sky.
    pub fn sky() -> Self {
        Block::new(BlockType::AIR, BlockLight::SKY)
    }
}
