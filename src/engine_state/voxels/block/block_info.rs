//! # Block Info Module
//!
//! Static per-type metadata: how a block is shaped, which renderer draws it,
//! where its textures live in the renderer's atlas, and how it interacts with
//! light. Exactly one [`BlockInfo`] exists per [`BlockType`]; the table is
//! immutable and indexed by discriminant.
//!
//! The face-visibility rule used by every model builder also lives here, since
//! it depends only on this metadata.

use super::{block_light::BlockLight, block_side::BlockSide, block_type::BlockType};

/// Geometric shape of a block.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BlockShape {
    /// Nothing is drawn.
    NONE = 0,
    /// A unit cube.
    BOX = 1,
    /// Two crossed diagonal quads, used for foliage.
    CROSS = 2,
    /// A cube whose top is lowered at a liquid surface.
    LIQUID = 3,
}

/// Renderer kind responsible for a block's geometry.
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BlockRenderer {
    /// Not rendered.
    NULL = 0,
    /// Opaque geometry.
    BASIC = 1,
    /// Alpha-tested (cut-out) geometry.
    CARVE = 2,
    /// Translucent liquid geometry.
    TRANS_LIQUID = 3,
}

/// Number of shape variants, the column count of the builder table.
pub const BLOCK_SHAPE_COUNT: usize = 4;
/// Number of renderer variants, the row count of the builder table.
pub const BLOCK_RENDERER_COUNT: usize = 4;

/// Static metadata for one block type.
#[derive(Copy, Clone, Debug)]
pub struct BlockInfo {
    /// Geometric shape
    pub shape: BlockShape,
    /// Renderer drawing this block
    pub renderer: BlockRenderer,
    /// Texture slot within the renderer, selects the output model
    pub atlas: usize,
    /// Atlas cell per face in [`BlockSide`] order. Cross shapes use the first two entries.
    pub textures: [u16; 6],
    /// Full opaque cube: hides neighbouring faces
    pub solid: bool,
    /// Can be replaced by a placed block
    pub coverable: bool,
    /// Blocks all light
    pub opaque: bool,
    /// Light lost when light enters this block
    pub light_attenuation: u8,
    /// Coloured light emitted, `[r, g, b]`
    pub emission: [u8; 3],
}

impl BlockInfo {
    /// Emitted light as a packed value. Emitters never produce sunlight.
    pub fn emission_light(&self) -> BlockLight {
        BlockLight::new(self.emission[0], self.emission[1], self.emission[2], 0)
    }

    /// Atlas cell for the given face.
    pub fn texture(&self, side: BlockSide) -> u16 {
        self.textures[side as usize]
    }
}

const fn opaque_box(textures: [u16; 6], emission: [u8; 3]) -> BlockInfo {
    BlockInfo {
        shape: BlockShape::BOX,
        renderer: BlockRenderer::BASIC,
        atlas: 0,
        textures,
        solid: true,
        coverable: false,
        opaque: true,
        light_attenuation: 1,
        emission,
    }
}

const fn cross(cell: u16) -> BlockInfo {
    BlockInfo {
        shape: BlockShape::CROSS,
        renderer: BlockRenderer::CARVE,
        atlas: 0,
        textures: [cell, cell, 0, 0, 0, 0],
        solid: false,
        coverable: true,
        opaque: false,
        light_attenuation: 1,
        emission: [0, 0, 0],
    }
}

const NO_LIGHT: [u8; 3] = [0, 0, 0];

/// Metadata for every block type, indexed by `BlockType as usize`.
///
/// Basic atlas cells: stone 0, dirt 1, grass side 2, grass top 3, bedrock 4,
/// wood side 5, wood top 6, glow stones 7..=9. Carve atlas: leaves 0, grass 1,
/// flower 2. Liquid atlas: water 0.
pub static BLOCK_INFOS: [BlockInfo; super::block_type::BLOCK_TYPE_COUNT] = [
    // AIR
    BlockInfo {
        shape: BlockShape::NONE,
        renderer: BlockRenderer::NULL,
        atlas: 0,
        textures: [0; 6],
        solid: false,
        coverable: true,
        opaque: false,
        light_attenuation: 1,
        emission: NO_LIGHT,
    },
    // BEDROCK
    opaque_box([4; 6], NO_LIGHT),
    // STONE
    opaque_box([0; 6], NO_LIGHT),
    // DIRT
    opaque_box([1; 6], NO_LIGHT),
    // GRASS_BOX
    opaque_box([2, 2, 3, 1, 2, 2], NO_LIGHT),
    // GRASS
    cross(1),
    // FLOWER
    cross(2),
    // WATER
    BlockInfo {
        shape: BlockShape::LIQUID,
        renderer: BlockRenderer::TRANS_LIQUID,
        atlas: 0,
        textures: [0; 6],
        solid: false,
        coverable: true,
        opaque: false,
        light_attenuation: 2,
        emission: NO_LIGHT,
    },
    // WOOD
    opaque_box([5, 5, 6, 6, 5, 5], NO_LIGHT),
    // LEAF
    BlockInfo {
        shape: BlockShape::BOX,
        renderer: BlockRenderer::CARVE,
        atlas: 0,
        textures: [0; 6],
        solid: false,
        coverable: false,
        opaque: false,
        light_attenuation: 1,
        emission: NO_LIGHT,
    },
    // RED_GLOW_STONE
    opaque_box([7; 6], [15, 0, 0]),
    // GREEN_GLOW_STONE
    opaque_box([8; 6], [0, 15, 0]),
    // BLUE_GLOW_STONE
    opaque_box([9; 6], [0, 0, 15]),
];

/// Looks up the metadata of a block type.
#[inline]
pub fn block_info(block_type: BlockType) -> &'static BlockInfo {
    &BLOCK_INFOS[block_type as usize]
}

/// True if the block is a full opaque cube.
#[inline]
pub fn is_solid(block_type: BlockType) -> bool {
    block_info(block_type).solid
}

/// True if a placed block may replace this one.
#[inline]
pub fn is_coverable(block_type: BlockType) -> bool {
    block_info(block_type).coverable
}

/// True if the block stops light.
#[inline]
pub fn is_opaque(block_type: BlockType) -> bool {
    block_info(block_type).opaque
}

/// Decides whether face `side` of a `src` block is drawn when `dst` is the
/// neighbour across that face.
///
/// * A neighbour without geometry never hides the face.
/// * A liquid shows its top face to anything that is not the same liquid.
/// * A solid neighbour hides the face.
/// * Two blocks of the same type hide their shared faces.
pub fn is_face_visible(src: BlockType, dst: BlockType, side: BlockSide) -> bool {
    let dst_info = block_info(dst);
    if dst_info.shape == BlockShape::NONE {
        return true;
    }
    if side == BlockSide::TOP && block_info(src).shape == BlockShape::LIQUID && src != dst {
        return true;
    }
    if dst_info.solid {
        return false;
    }
    src != dst
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_blocks_are_opaque_boxes() {
        for t in BlockType::all() {
            let info = block_info(t);
            if info.solid {
                assert_eq!(info.shape, BlockShape::BOX, "{:?}", t);
                assert_eq!(info.renderer, BlockRenderer::BASIC, "{:?}", t);
                assert!(info.opaque, "{:?}", t);
            }
        }
    }

    #[test]
    fn coverable_set() {
        let coverable: Vec<BlockType> = BlockType::all().filter(|t| is_coverable(*t)).collect();
        assert_eq!(
            coverable,
            vec![BlockType::AIR, BlockType::GRASS, BlockType::FLOWER, BlockType::WATER]
        );
    }

    #[test]
    fn face_visibility_rules() {
        use BlockType::*;
        assert!(is_face_visible(STONE, AIR, BlockSide::RIGHT));
        assert!(!is_face_visible(STONE, DIRT, BlockSide::RIGHT));
        assert!(is_face_visible(STONE, WATER, BlockSide::TOP));
        assert!(is_face_visible(STONE, LEAF, BlockSide::FRONT));
        assert!(!is_face_visible(LEAF, LEAF, BlockSide::FRONT));
        assert!(!is_face_visible(WATER, WATER, BlockSide::LEFT));
        assert!(!is_face_visible(WATER, STONE, BlockSide::LEFT));
        assert!(is_face_visible(WATER, STONE, BlockSide::TOP));
        assert!(!is_face_visible(WATER, WATER, BlockSide::TOP));
    }

    #[test]
    fn glow_stones_emit_their_colour() {
        assert_eq!(
            block_info(BlockType::RED_GLOW_STONE).emission_light(),
            BlockLight::new(15, 0, 0, 0)
        );
        assert_eq!(
            block_info(BlockType::BLUE_GLOW_STONE).emission_light(),
            BlockLight::new(0, 0, 15, 0)
        );
        assert!(block_info(BlockType::STONE).emission_light().is_dark());
    }
}
