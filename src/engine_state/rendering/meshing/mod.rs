//! Mesh generation for voxel rendering.
//!
//! This module converts the voxels of one chunk section into renderable
//! geometry. The key pieces are:
//! - `ChunkSectionModels`: the output bundle, one [`Model`] per renderer and atlas slot
//! - `builders`: the per-block model builders and their `[renderer][shape]` table
//! - `build_section_models`: walks a section and runs the builder of every block
//!
//! # Section Meshing
//! A builder needs every neighbour of the block it draws, including those in
//! the next section or chunk. Before building, the section is therefore copied
//! into a padded cache one voxel larger on every side. Voxels outside the world
//! are filled in as bedrock (below) or open sky (above); voxels of chunks that
//! are not loaded count as open sky.

use cgmath::Vector3;

use crate::engine_state::voxels::{
    block::{
        block_info::{block_info, BlockRenderer},
        block_light::BlockLight,
        block_type::BlockType,
        Block,
    },
    chunk::chunk_map::ChunkMap,
    coordinates::{
        block_xz_to_block_xz_in_chunk, block_xz_to_chunk_xz, section_index_to_block_y,
        ChunkPosition, LocalPosition, MAX_HEIGHT, SECTION_SIZE,
    },
};

pub mod builders;
mod model;

pub use builders::{BlockModelBuilder, BUILDERS};
pub use model::Model;

/// Texture slots of the basic renderer.
pub const BASIC_TEXTURE_NUM: usize = 1;
/// Texture slots of the carve renderer.
pub const CARVE_TEXTURE_NUM: usize = 1;
/// Texture slots of the liquid renderer.
pub const LIQUID_TEXTURE_NUM: usize = 1;

/// Edge length of the padded block cache of a section.
const SECTION_DIMENSION_WRAPPED: usize = SECTION_SIZE as usize + 2;

/// A block and its 26 neighbours, indexed `[x][y][z]` with the block at `[1][1][1]`.
pub type Neighborhood = [[[Block; 3]; 3]; 3];

/// Geometry of one chunk section, bucketed by renderer and texture slot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkSectionModels {
    /// Opaque geometry per basic atlas slot
    pub basic: [Model; BASIC_TEXTURE_NUM],
    /// Cut-out geometry per carve atlas slot
    pub carve: [Model; CARVE_TEXTURE_NUM],
    /// Translucent liquid geometry per liquid atlas slot
    pub liquid: [Model; LIQUID_TEXTURE_NUM],
}

impl ChunkSectionModels {
    /// The output model for a renderer and atlas slot.
    ///
    /// # Returns
    /// `None` for the null renderer or an unknown slot.
    pub fn model_mut(&mut self, renderer: BlockRenderer, atlas: usize) -> Option<&mut Model> {
        match renderer {
            BlockRenderer::NULL => None,
            BlockRenderer::BASIC => self.basic.get_mut(atlas),
            BlockRenderer::CARVE => self.carve.get_mut(atlas),
            BlockRenderer::TRANS_LIQUID => self.liquid.get_mut(atlas),
        }
    }

    /// Iterates over every model of the bundle.
    pub fn models(&self) -> impl Iterator<Item = &Model> {
        self.basic.iter().chain(self.carve.iter()).chain(self.liquid.iter())
    }

    /// Total number of quads across all models.
    pub fn quad_count(&self) -> usize {
        self.models().map(Model::quad_count).sum()
    }

    /// True if no model has geometry.
    pub fn is_empty(&self) -> bool {
        self.models().all(Model::is_empty)
    }
}

/// Padded copy of a section and its one-voxel border.
struct SectionCache {
    blocks: Vec<Block>,
}

impl SectionCache {
    #[inline]
    fn index(x: usize, y: usize, z: usize) -> usize {
        (x * SECTION_DIMENSION_WRAPPED + z) * SECTION_DIMENSION_WRAPPED + y
    }

    /// Copies the section at `section` of `chunk_pos`, plus border, out of `chunks`.
    fn gather(chunks: &ChunkMap, chunk_pos: ChunkPosition, section: usize) -> Self {
        let base_x = chunk_pos.block_x_base() - 1;
        let base_y = section_index_to_block_y(section as i32) - 1;
        let base_z = chunk_pos.block_z_base() - 1;
        let bedrock = Block::new(BlockType::BEDROCK, BlockLight::DARK);

        let mut blocks = vec![Block::sky(); SECTION_DIMENSION_WRAPPED.pow(3)];
        for x in 0..SECTION_DIMENSION_WRAPPED {
            let world_x = base_x + x as i32;
            for z in 0..SECTION_DIMENSION_WRAPPED {
                let world_z = base_z + z as i32;
                let column_chunk = ChunkPosition::new(
                    block_xz_to_chunk_xz(world_x),
                    block_xz_to_chunk_xz(world_z),
                );
                let Some(chunk) = chunks.get(column_chunk) else {
                    continue;
                };
                let local_x = block_xz_to_block_xz_in_chunk(world_x) as usize;
                let local_z = block_xz_to_block_xz_in_chunk(world_z) as usize;

                for y in 0..SECTION_DIMENSION_WRAPPED {
                    let world_y = base_y + y as i32;
                    let block = if world_y < 0 {
                        bedrock
                    } else if world_y >= MAX_HEIGHT {
                        continue;
                    } else {
                        chunk.block(LocalPosition {
                            x: local_x,
                            y: world_y as usize,
                            z: local_z,
                        })
                    };
                    blocks[Self::index(x, y, z)] = block;
                }
            }
        }

        SectionCache { blocks }
    }

    /// Neighbourhood around padded position `(x, y, z)`, which must not lie on the border.
    fn neighborhood(&self, x: usize, y: usize, z: usize) -> Neighborhood {
        std::array::from_fn(|dx| {
            std::array::from_fn(|dy| {
                std::array::from_fn(|dz| self.blocks[Self::index(x + dx - 1, y + dy - 1, z + dz - 1)])
            })
        })
    }
}

/// Builds the geometry of one section.
///
/// # Arguments
/// * `chunks` - Loaded chunks; neighbours supply the border voxels when present
/// * `chunk_pos` - The chunk owning the section
/// * `section` - Section index, `0` at the bottom
///
/// # Returns
/// A fresh bundle; empty if the chunk is not loaded.
pub fn build_section_models(
    chunks: &ChunkMap,
    chunk_pos: ChunkPosition,
    section: usize,
) -> ChunkSectionModels {
    let mut models = ChunkSectionModels::default();
    if !chunks.contains(chunk_pos) {
        return models;
    }

    let cache = SectionCache::gather(chunks, chunk_pos, section);
    let size = SECTION_SIZE as usize;
    let base_y = section_index_to_block_y(section as i32);

    for x in 1..=size {
        for z in 1..=size {
            for y in 1..=size {
                let block = cache.blocks[SectionCache::index(x, y, z)];
                if block.block_type == BlockType::AIR {
                    continue;
                }
                let pos_offset = Vector3::new(
                    (chunk_pos.block_x_base() + x as i32 - 1) as f32,
                    (base_y + y as i32 - 1) as f32,
                    (chunk_pos.block_z_base() + z as i32 - 1) as f32,
                );
                let neighborhood = cache.neighborhood(x, y, z);
                builders::builder_for(block_info(block.block_type)).build(
                    pos_offset,
                    &neighborhood,
                    &mut models,
                );
            }
        }
    }

    models
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::Chunk;
    use cgmath::Point3;

    fn stone() -> Block {
        Block::new(BlockType::STONE, BlockLight::DARK)
    }

    #[test]
    fn lone_block_gets_six_faces() {
        let mut chunks = ChunkMap::new();
        chunks.insert(Chunk::new(ChunkPosition::new(0, 0)));
        chunks.set_block_at(Point3::new(3, 20, 4), stone());

        let models = build_section_models(&chunks, ChunkPosition::new(0, 0), 1);
        assert_eq!(models.quad_count(), 6);
        let model = &models.basic[0];
        assert_eq!(model.indices.len(), 6 * model.vertices.len() / 4);
        assert!(model
            .vertices
            .iter()
            .all(|v| (3.0..=4.0).contains(&v.position[0]) && (20.0..=21.0).contains(&v.position[1])));

        assert!(build_section_models(&chunks, ChunkPosition::new(0, 0), 0).is_empty());
    }

    #[test]
    fn faces_against_neighbour_chunk_are_hidden() {
        let mut chunks = ChunkMap::new();
        chunks.insert(Chunk::new(ChunkPosition::new(0, 0)));
        chunks.set_block_at(Point3::new(15, 40, 8), stone());
        assert_eq!(build_section_models(&chunks, ChunkPosition::new(0, 0), 2).quad_count(), 6);

        chunks.insert(Chunk::new(ChunkPosition::new(1, 0)));
        chunks.set_block_at(Point3::new(16, 40, 8), stone());
        assert_eq!(build_section_models(&chunks, ChunkPosition::new(0, 0), 2).quad_count(), 5);
        assert_eq!(build_section_models(&chunks, ChunkPosition::new(1, 0), 2).quad_count(), 5);
    }

    #[test]
    fn world_floor_hides_bottom_faces() {
        let mut chunks = ChunkMap::new();
        chunks.insert(Chunk::new(ChunkPosition::new(-1, -1)));
        chunks.set_block_at(Point3::new(-5, 0, -5), stone());
        assert_eq!(build_section_models(&chunks, ChunkPosition::new(-1, -1), 0).quad_count(), 5);
    }

    #[test]
    fn unloaded_chunk_yields_nothing() {
        let chunks = ChunkMap::new();
        assert!(build_section_models(&chunks, ChunkPosition::new(0, 0), 0).is_empty());
    }
}
