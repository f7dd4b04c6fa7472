//! Block model builders.
//!
//! Every block is turned into geometry by the builder registered for its
//! `(renderer, shape)` pair in [`BUILDERS`]. A builder sees the block together
//! with its 26 neighbours and appends quads to the section's models.
//!
//! Vertex light is a cheap ambient occlusion term: each corner averages the
//! light of the four voxels touching it on the outside of the face, so corners
//! tucked against solid blocks (which carry no light) come out darker.

use cgmath::Vector3;

use super::{ChunkSectionModels, Neighborhood};
use crate::engine_state::rendering::Vertex;
use crate::engine_state::voxels::block::{
    block_info::{
        block_info, is_face_visible, is_solid, BlockInfo, BlockRenderer, BlockShape,
        BLOCK_RENDERER_COUNT, BLOCK_SHAPE_COUNT,
    },
    block_side::BlockSide,
    Block,
};

/// Light factor applied to every face except the top one.
pub const BLOCK_SIDE_BOTTOM_LIGHT_DEC_RATIO: f32 = 0.75;
/// Height of a liquid surface that is not covered by more liquid.
pub const LIQUID_SURFACE_HEIGHT: f32 = 0.8;
/// Atlas grid size in cells per row and column.
const ATLAS_CELLS: u16 = 16;
/// Inset of texture coordinates from the cell border, to avoid bleeding.
const UV_EPSILON: f32 = 0.0005;

/// Index into a [`Neighborhood`], `[x][y][z]` with the block itself at `[1][1][1]`.
type Sample = [usize; 3];

/// Geometry of one box face.
struct FaceTemplate {
    side: BlockSide,
    /// Unit-cube corners, in quad order.
    corners: [[f32; 3]; 4],
    /// For each corner, the four neighbours whose light is averaged.
    occluders: [[Sample; 4]; 4],
}

/// Faces of a box in [`BlockSide`] order.
const BOX_FACES: [FaceTemplate; 6] = [
    FaceTemplate {
        side: BlockSide::RIGHT,
        corners: [[1., 0., 1.], [1., 1., 1.], [1., 1., 0.], [1., 0., 0.]],
        occluders: [
            [[2, 0, 1], [2, 1, 1], [2, 1, 2], [2, 0, 2]],
            [[2, 1, 1], [2, 2, 1], [2, 2, 2], [2, 1, 2]],
            [[2, 1, 0], [2, 2, 0], [2, 2, 1], [2, 1, 1]],
            [[2, 0, 0], [2, 1, 0], [2, 1, 1], [2, 0, 1]],
        ],
    },
    FaceTemplate {
        side: BlockSide::LEFT,
        corners: [[0., 0., 0.], [0., 1., 0.], [0., 1., 1.], [0., 0., 1.]],
        occluders: [
            [[0, 0, 0], [0, 1, 0], [0, 1, 1], [0, 0, 1]],
            [[0, 1, 0], [0, 2, 0], [0, 2, 1], [0, 1, 1]],
            [[0, 1, 1], [0, 2, 1], [0, 2, 2], [0, 1, 2]],
            [[0, 0, 1], [0, 1, 1], [0, 1, 2], [0, 0, 2]],
        ],
    },
    FaceTemplate {
        side: BlockSide::TOP,
        corners: [[0., 1., 1.], [0., 1., 0.], [1., 1., 0.], [1., 1., 1.]],
        occluders: [
            [[0, 2, 2], [0, 2, 1], [1, 2, 1], [1, 2, 2]],
            [[0, 2, 1], [0, 2, 0], [1, 2, 0], [1, 2, 1]],
            [[1, 2, 1], [1, 2, 0], [2, 2, 0], [2, 2, 1]],
            [[1, 2, 2], [1, 2, 1], [2, 2, 1], [2, 2, 2]],
        ],
    },
    FaceTemplate {
        side: BlockSide::BOTTOM,
        corners: [[0., 0., 0.], [0., 0., 1.], [1., 0., 1.], [1., 0., 0.]],
        occluders: [
            [[0, 0, 1], [0, 0, 0], [1, 0, 0], [1, 0, 1]],
            [[0, 0, 2], [0, 0, 1], [1, 0, 1], [1, 0, 2]],
            [[1, 0, 2], [1, 0, 1], [2, 0, 1], [2, 0, 2]],
            [[1, 0, 1], [1, 0, 0], [2, 0, 0], [2, 0, 1]],
        ],
    },
    FaceTemplate {
        side: BlockSide::FRONT,
        corners: [[0., 0., 1.], [0., 1., 1.], [1., 1., 1.], [1., 0., 1.]],
        occluders: [
            [[0, 0, 2], [0, 1, 2], [1, 1, 2], [1, 0, 2]],
            [[0, 1, 2], [0, 2, 2], [1, 2, 2], [1, 1, 2]],
            [[1, 1, 2], [1, 2, 2], [2, 2, 2], [2, 1, 2]],
            [[1, 0, 2], [1, 1, 2], [2, 1, 2], [2, 0, 2]],
        ],
    },
    FaceTemplate {
        side: BlockSide::BACK,
        corners: [[1., 0., 0.], [1., 1., 0.], [0., 1., 0.], [0., 0., 0.]],
        occluders: [
            [[1, 0, 0], [1, 1, 0], [2, 1, 0], [2, 0, 0]],
            [[1, 1, 0], [1, 2, 0], [2, 2, 0], [2, 1, 0]],
            [[0, 1, 0], [0, 2, 0], [1, 2, 0], [1, 1, 0]],
            [[0, 0, 0], [0, 1, 0], [1, 1, 0], [1, 0, 0]],
        ],
    },
];

/// The two diagonal quads of a cross, as unit-cube corners.
const CROSS_QUADS: [[[f32; 3]; 4]; 2] = [
    [[0., 0., 1.], [0., 1., 1.], [1., 1., 0.], [1., 0., 0.]],
    [[0., 0., 0.], [0., 1., 0.], [1., 1., 1.], [1., 0., 1.]],
];

/// Pairs of (side neighbour, block above it) that keep a liquid at full height.
const LIQUID_FULL_HEIGHT_PAIRS: [(Sample, Sample); 4] = [
    ([2, 1, 1], [2, 2, 1]),
    ([0, 1, 1], [0, 2, 1]),
    ([1, 1, 2], [1, 2, 2]),
    ([1, 1, 0], [1, 2, 0]),
];

/// Turns one block into geometry.
pub trait BlockModelBuilder {
    /// Appends the geometry of the centre block of `blocks` to `models`.
    ///
    /// # Arguments
    /// * `pos_offset` - World position of the block's minimum corner
    /// * `blocks` - The block and its neighbours
    /// * `models` - Output models of the section being built
    fn build(&self, pos_offset: Vector3<f32>, blocks: &Neighborhood, models: &mut ChunkSectionModels);
}

/// Builder for blocks that produce no geometry.
pub struct NullBuilder;

/// Builder for opaque cubes.
pub struct BasicBoxBuilder;

/// Builder for cut-out cubes such as leaves.
pub struct CarveBoxBuilder;

/// Builder for crossed foliage quads.
pub struct CarveCrossBuilder;

/// Builder for liquid blocks.
pub struct LiquidBuilder;

type BuilderRef = &'static (dyn BlockModelBuilder + Sync);

/// Builders indexed by `[renderer][shape]`.
pub static BUILDERS: [[BuilderRef; BLOCK_SHAPE_COUNT]; BLOCK_RENDERER_COUNT] = [
    // NULL
    [&NullBuilder, &NullBuilder, &NullBuilder, &NullBuilder],
    // BASIC
    [&NullBuilder, &BasicBoxBuilder, &NullBuilder, &NullBuilder],
    // CARVE
    [&NullBuilder, &CarveBoxBuilder, &CarveCrossBuilder, &NullBuilder],
    // TRANS_LIQUID
    [&NullBuilder, &NullBuilder, &NullBuilder, &LiquidBuilder],
];

/// The builder for a block's renderer and shape.
pub fn builder_for(info: &BlockInfo) -> BuilderRef {
    BUILDERS[info.renderer as usize][info.shape as usize]
}

impl BlockModelBuilder for NullBuilder {
    fn build(&self, _pos_offset: Vector3<f32>, _blocks: &Neighborhood, _models: &mut ChunkSectionModels) {}
}

impl BlockModelBuilder for BasicBoxBuilder {
    fn build(&self, pos_offset: Vector3<f32>, blocks: &Neighborhood, models: &mut ChunkSectionModels) {
        build_box(pos_offset, blocks, models, BlockRenderer::BASIC, 1.0);
    }
}

impl BlockModelBuilder for CarveBoxBuilder {
    fn build(&self, pos_offset: Vector3<f32>, blocks: &Neighborhood, models: &mut ChunkSectionModels) {
        build_box(pos_offset, blocks, models, BlockRenderer::CARVE, 1.0);
    }
}

impl BlockModelBuilder for LiquidBuilder {
    fn build(&self, pos_offset: Vector3<f32>, blocks: &Neighborhood, models: &mut ChunkSectionModels) {
        let block_type = centre(blocks).block_type;
        let same = |[x, y, z]: Sample| blocks[x][y][z].block_type == block_type;

        let covered = same([1, 2, 1])
            || LIQUID_FULL_HEIGHT_PAIRS
                .iter()
                .any(|&(side, above)| same(side) && same(above));
        let height = if covered { 1.0 } else { LIQUID_SURFACE_HEIGHT };

        build_box(pos_offset, blocks, models, BlockRenderer::TRANS_LIQUID, height);
    }
}

impl BlockModelBuilder for CarveCrossBuilder {
    fn build(&self, pos_offset: Vector3<f32>, blocks: &Neighborhood, models: &mut ChunkSectionModels) {
        let block = centre(blocks);
        let exposed = BlockSide::all().iter().any(|side| {
            let [x, y, z] = neighbour_index(*side);
            !is_solid(blocks[x][y][z].block_type)
        });
        if !exposed {
            return;
        }

        let info = block_info(block.block_type);
        let Some(model) = models.model_mut(BlockRenderer::CARVE, info.atlas) else {
            return;
        };
        let light = block.light.to_rgba();
        for (quad, cell) in CROSS_QUADS.iter().zip(info.textures) {
            let uvs = atlas_uvs(cell);
            model.add_quad(std::array::from_fn(|i| {
                Vertex::new(pos_offset + Vector3::from(quad[i]), uvs[i], light)
            }));
        }
    }
}

#[inline]
fn centre(blocks: &Neighborhood) -> Block {
    blocks[1][1][1]
}

/// Neighbourhood index of the block across `side`.
#[inline]
fn neighbour_index(side: BlockSide) -> Sample {
    let n = side.normal();
    [(1 + n.x) as usize, (1 + n.y) as usize, (1 + n.z) as usize]
}

/// Emits every visible face of the centre block as a unit box whose top
/// corners sit at `height`.
fn build_box(
    pos_offset: Vector3<f32>,
    blocks: &Neighborhood,
    models: &mut ChunkSectionModels,
    renderer: BlockRenderer,
    height: f32,
) {
    let block = centre(blocks);
    let info = block_info(block.block_type);
    let Some(model) = models.model_mut(renderer, info.atlas) else {
        return;
    };

    for face in &BOX_FACES {
        let [x, y, z] = neighbour_index(face.side);
        if !is_face_visible(block.block_type, blocks[x][y][z].block_type, face.side) {
            continue;
        }

        let ratio = if face.side == BlockSide::TOP {
            1.0
        } else {
            BLOCK_SIDE_BOTTOM_LIGHT_DEC_RATIO
        };
        let uvs = atlas_uvs(info.texture(face.side));
        model.add_quad(std::array::from_fn(|i| {
            let [cx, cy, cz] = face.corners[i];
            let position = pos_offset + Vector3::new(cx, cy * height, cz);
            Vertex::new(position, uvs[i], occlusion(blocks, &face.occluders[i], ratio))
        }));
    }
}

/// Corner light: `0.15 + 0.85 · mean(light of the four samples)`, scaled by `ratio`.
fn occlusion(blocks: &Neighborhood, samples: &[Sample; 4], ratio: f32) -> [f32; 4] {
    let mut sum = [0.0f32; 4];
    for &[x, y, z] in samples {
        let rgba = blocks[x][y][z].light.to_rgba();
        for (total, component) in sum.iter_mut().zip(rgba) {
            *total += component;
        }
    }
    sum.map(|total| (0.15 + 0.85 * 0.25 * total) * ratio)
}

/// Texture coordinates of an atlas cell's four corners, in quad order.
fn atlas_uvs(cell: u16) -> [[f32; 2]; 4] {
    let grid = 1.0 / ATLAS_CELLS as f32;
    let u0 = (cell % ATLAS_CELLS) as f32 * grid;
    let v0 = (cell / ATLAS_CELLS) as f32 * grid;
    [
        [u0 + UV_EPSILON, v0 + grid - UV_EPSILON],
        [u0 + UV_EPSILON, v0 + UV_EPSILON],
        [u0 + grid - UV_EPSILON, v0 + UV_EPSILON],
        [u0 + grid - UV_EPSILON, v0 + grid - UV_EPSILON],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::{block_light::BlockLight, block_type::BlockType};

    fn filled(block: Block) -> Neighborhood {
        [[[block; 3]; 3]; 3]
    }

    fn build(blocks: &Neighborhood) -> ChunkSectionModels {
        let mut models = ChunkSectionModels::default();
        let info = block_info(centre(blocks).block_type);
        builder_for(info).build(Vector3::new(0.0, 0.0, 0.0), blocks, &mut models);
        models
    }

    #[test]
    fn table_dispatch() {
        assert_eq!(BlockShape::BOX as usize, 1);
        for t in BlockType::all() {
            let info = block_info(t);
            let mut blocks = filled(Block::sky());
            blocks[1][1][1] = Block::new(t, BlockLight::DARK);
            let models = build(&blocks);
            let quads = models.quad_count();
            match (info.renderer, info.shape) {
                (BlockRenderer::NULL, _) => assert_eq!(quads, 0, "{:?}", t),
                (_, BlockShape::CROSS) => assert_eq!(quads, 2, "{:?}", t),
                _ => assert_eq!(quads, 6, "{:?}", t),
            }
        }
    }

    #[test]
    fn buried_box_has_no_faces() {
        let mut blocks = filled(Block::new(BlockType::STONE, BlockLight::DARK));
        blocks[1][1][1] = Block::new(BlockType::DIRT, BlockLight::DARK);
        assert_eq!(build(&blocks).quad_count(), 0);
    }

    #[test]
    fn exposed_box_lighting_and_uvs() {
        let mut blocks = filled(Block::sky());
        blocks[1][1][1] = Block::new(BlockType::STONE, BlockLight::DARK);
        let models = build(&blocks);
        let model = &models.basic[0];
        assert_eq!(model.vertices.len(), 24);
        assert_eq!(model.indices.len(), 6 * model.vertices.len() / 4);

        // Side faces are dimmed, the top face is not.
        let right = model.vertices[0];
        assert_eq!(right.position, [1.0, 0.0, 1.0]);
        assert!((right.sunlight - 0.75).abs() < 1e-6);
        assert_eq!(right.light_color, [0.15 * 0.75; 3]);
        let top = model.vertices[8];
        assert_eq!(top.position, [0.0, 1.0, 1.0]);
        assert!((top.sunlight - 1.0).abs() < 1e-6);

        // Stone is atlas cell 0.
        assert_eq!(right.tex_coords, [0.0005, 0.0625 - 0.0005]);
    }

    #[test]
    fn corner_against_wall_is_darker() {
        let mut blocks = filled(Block::sky());
        blocks[1][1][1] = Block::new(BlockType::STONE, BlockLight::DARK);
        // A solid block diagonally above the +X face.
        blocks[2][2][1] = Block::new(BlockType::STONE, BlockLight::DARK);
        let models = build(&blocks);
        let right = &models.basic[0].vertices[0..4];
        assert!(right[1].sunlight < right[0].sunlight);
        assert!(right[2].sunlight < right[3].sunlight);
    }

    #[test]
    fn cross_needs_an_open_side() {
        let mut blocks = filled(Block::new(BlockType::STONE, BlockLight::DARK));
        blocks[1][1][1] = Block::new(BlockType::FLOWER, BlockLight::sun_only(14));
        assert_eq!(build(&blocks).quad_count(), 0);

        blocks[1][2][1] = Block::sky();
        let models = build(&blocks);
        assert_eq!(models.carve[0].quad_count(), 2);
        let vertex = models.carve[0].vertices[0];
        assert_eq!(vertex.light_color, [0.0; 3]);
        assert!((vertex.sunlight - 14.0 / 15.0).abs() < 1e-6);
    }

    #[test]
    fn liquid_surface_is_lowered() {
        let water = Block::new(BlockType::WATER, BlockLight::sun_only(13));
        let mut blocks = filled(water);
        for x in 0..3 {
            for z in 0..3 {
                blocks[x][2][z] = Block::sky();
            }
        }
        let models = build(&blocks);
        let model = &models.liquid[0];
        // Only the top face faces a different block.
        assert_eq!(model.quad_count(), 1);
        assert!(model.vertices.iter().all(|v| (v.position[1] - LIQUID_SURFACE_HEIGHT).abs() < 1e-6));

        // Water above keeps full height.
        blocks[1][2][1] = water;
        let models = build(&blocks);
        assert_eq!(models.liquid[0].quad_count(), 0);

        // A neighbouring column of deeper water also keeps full height.
        blocks[1][2][1] = Block::sky();
        blocks[2][2][1] = water;
        let models = build(&blocks);
        assert!(models.liquid[0].vertices.iter().any(|v| (v.position[1] - 1.0).abs() < 1e-6));
    }
}
