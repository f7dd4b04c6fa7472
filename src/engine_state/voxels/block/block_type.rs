//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world.
//! It provides conversion from the compact storage integer back to the enum.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// The discriminants are dense and start at zero, so a `BlockType` can index
/// per-type tables directly. The `FromPrimitive` derive allows conversion back
/// from the compact storage integer.
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// Empty space. Transparent, lets sunlight fall through unchanged.
    AIR,

    /// Unbreakable floor of the world, always at y = 0.
    BEDROCK,

    /// Bulk underground material.
    STONE,

    /// Thin layer between stone and the surface.
    DIRT,

    /// Dirt with a grass top, the dry surface block.
    GRASS_BOX,

    /// Tall grass tuft growing on top of a grass box.
    GRASS,

    /// A flower growing on top of a grass box.
    FLOWER,

    /// Translucent liquid filling terrain below the water level.
    WATER,

    /// Oak trunk.
    WOOD,

    /// Oak leaves. Rendered with cut-out transparency.
    LEAF,

    /// Emits red light.
    RED_GLOW_STONE,

    /// Emits green light.
    GREEN_GLOW_STONE,

    /// Emits blue light.
    BLUE_GLOW_STONE,
}

/// Number of distinct block types.
pub const BLOCK_TYPE_COUNT: usize = BlockType::BLUE_GLOW_STONE as usize + 1;

impl BlockType {
    /// Converts a `BlockTypeSize` to a `BlockType`.
    ///
    /// # Arguments
    /// * `btype` - The block type as stored in a chunk
    ///
    /// # Returns
    /// The corresponding `BlockType`, or `None` for an unknown discriminant.
    pub fn from_int(btype: BlockTypeSize) -> Option<Self> {
        FromPrimitive::from_u8(btype)
    }

    /// Iterates over every block type in discriminant order.
    pub fn all() -> impl Iterator<Item = BlockType> {
        (0..BLOCK_TYPE_COUNT as BlockTypeSize).filter_map(BlockType::from_int)
    }
}
