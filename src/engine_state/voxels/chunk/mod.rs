//! # Chunk Module
//!
//! This module provides the `Chunk` struct: one `SECTION_SIZE × MAX_HEIGHT × SECTION_SIZE`
//! column of voxels, split into `SECTION_NUM` vertically stacked sections for meshing.
//!
//! ## Storage
//!
//! Block types and light values live in two flat arrays of `CHUNK_BLOCK_NUM`
//! entries each, addressed by [`Chunk::index`]. Y varies fastest, so a column is a
//! contiguous run, which keeps top-down passes (sunlight, height map) cache friendly.
//!
//! Each chunk also owns:
//! - a height map with the topmost non-air Y of every column,
//! - one optional [`ChunkSectionModels`] per section, replaced wholesale on remesh,
//! - a bit vector of sections whose models are stale.

use bitvec::prelude::BitVec;
use bitvec::bitvec;

use super::block::{block_light::BlockLight, block_type::BlockType, Block};
use super::coordinates::{ChunkPosition, LocalPosition, MAX_HEIGHT, SECTION_NUM, SECTION_SIZE};
use crate::engine_state::rendering::meshing::ChunkSectionModels;

pub mod chunk_map;

/// Number of columns in a chunk (SECTION_SIZE²).
pub const CHUNK_COLUMN_NUM: usize = (SECTION_SIZE * SECTION_SIZE) as usize;
/// Total number of voxels in a chunk.
pub const CHUNK_BLOCK_NUM: usize = CHUNK_COLUMN_NUM * MAX_HEIGHT as usize;

/// Lifecycle of a chunk as seen by the world.
///
/// `Unloaded` and `Loading` describe positions with no chunk in memory yet;
/// the remaining states are carried by the chunk itself.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChunkState {
    /// Not in memory and not requested
    Unloaded,
    /// Generation requested, result not integrated yet
    Loading,
    /// In memory, every meshable section up to date
    Loaded,
    /// In memory with at least one stale section
    Dirty,
    /// Sections are being rebuilt
    Remeshing,
    /// Being removed from the world
    Unloading,
}

/// A vertical column of voxels at a fixed chunk position.
pub struct Chunk {
    /// The position of this chunk in chunk coordinates.
    position: ChunkPosition,
    /// Block type per voxel, see [`Chunk::index`].
    blocks: Vec<BlockType>,
    /// Light per voxel, same layout as `blocks`.
    lights: Vec<BlockLight>,
    /// Topmost non-air Y per column, indexed by `x * SECTION_SIZE + z`.
    height_map: Vec<i32>,
    /// Latest geometry per section.
    models: Vec<Option<ChunkSectionModels>>,
    /// One bit per section, set when its geometry is stale.
    dirty_sections: BitVec,
    /// Current lifecycle state.
    state: ChunkState,
}

impl Chunk {
    /// Creates a chunk filled with air under open sky.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the new chunk
    pub fn new(position: ChunkPosition) -> Self {
        Chunk {
            position,
            blocks: vec![BlockType::AIR; CHUNK_BLOCK_NUM],
            lights: vec![BlockLight::SKY; CHUNK_BLOCK_NUM],
            height_map: vec![0; CHUNK_COLUMN_NUM],
            models: (0..SECTION_NUM).map(|_| None).collect(),
            dirty_sections: bitvec![0; SECTION_NUM],
            state: ChunkState::Loaded,
        }
    }

    /// Flat array index of a local position.
    ///
    /// Equivalent to the packed layout `(x << 11) | (z << 7) | y`.
    #[inline]
    pub fn index(x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < SECTION_SIZE as usize, "local x out of range: {}", x);
        debug_assert!(z < SECTION_SIZE as usize, "local z out of range: {}", z);
        debug_assert!(y < MAX_HEIGHT as usize, "local y out of range: {}", y);
        (x * SECTION_SIZE as usize + z) * MAX_HEIGHT as usize + y
    }

    #[inline]
    fn column_index(x: usize, z: usize) -> usize {
        debug_assert!(x < SECTION_SIZE as usize && z < SECTION_SIZE as usize);
        x * SECTION_SIZE as usize + z
    }

    /// The position of this chunk in chunk coordinates.
    pub fn position(&self) -> ChunkPosition {
        self.position
    }

    /// Reads the block at a local position.
    #[inline]
    pub fn block(&self, local: LocalPosition) -> Block {
        let i = Self::index(local.x, local.y, local.z);
        Block::new(self.blocks[i], self.lights[i])
    }

    /// Block type at local coordinates.
    #[inline]
    pub fn block_type(&self, x: usize, y: usize, z: usize) -> BlockType {
        self.blocks[Self::index(x, y, z)]
    }

    /// Light at local coordinates.
    #[inline]
    pub fn light(&self, x: usize, y: usize, z: usize) -> BlockLight {
        self.lights[Self::index(x, y, z)]
    }

    /// Overwrites a voxel's type and light.
    #[inline]
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, block: Block) {
        let i = Self::index(x, y, z);
        self.blocks[i] = block.block_type;
        self.lights[i] = block.light;
    }

    /// Overwrites a voxel's type, keeping its light.
    #[inline]
    pub fn set_block_type(&mut self, x: usize, y: usize, z: usize, block_type: BlockType) {
        self.blocks[Self::index(x, y, z)] = block_type;
    }

    /// Overwrites a voxel's light, keeping its type.
    #[inline]
    pub fn set_light(&mut self, x: usize, y: usize, z: usize, light: BlockLight) {
        self.lights[Self::index(x, y, z)] = light;
    }

    /// Recorded surface height of a column.
    pub fn height(&self, x: usize, z: usize) -> i32 {
        self.height_map[Self::column_index(x, z)]
    }

    /// Records the surface height of a column.
    pub fn set_height(&mut self, x: usize, z: usize, height: i32) {
        self.height_map[Self::column_index(x, z)] = height;
    }

    /// Recomputes a column's height as its topmost non-air voxel (0 for an empty column).
    pub fn update_height(&mut self, x: usize, z: usize) -> i32 {
        let height = (0..MAX_HEIGHT as usize)
            .rev()
            .find(|&y| self.block_type(x, y, z) != BlockType::AIR)
            .map_or(0, |y| y as i32);
        self.set_height(x, z, height);
        height
    }

    /// Geometry of a section, if it has been meshed.
    pub fn models(&self, section: usize) -> Option<&ChunkSectionModels> {
        debug_assert!(section < SECTION_NUM);
        self.models[section].as_ref()
    }

    /// Replaces a section's geometry, dropping the previous bundle.
    pub fn set_models(&mut self, section: usize, models: ChunkSectionModels) {
        debug_assert!(section < SECTION_NUM);
        self.models[section] = Some(models);
    }

    /// Drops the geometry of every section.
    pub fn clear_models(&mut self) {
        for models in self.models.iter_mut() {
            *models = None;
        }
    }

    /// Flags a section for remeshing.
    pub fn mark_section_dirty(&mut self, section: usize) {
        debug_assert!(section < SECTION_NUM);
        self.dirty_sections.set(section, true);
        if self.state == ChunkState::Loaded {
            self.state = ChunkState::Dirty;
        }
    }

    /// Flags every section for remeshing.
    pub fn mark_all_dirty(&mut self) {
        for section in 0..SECTION_NUM {
            self.mark_section_dirty(section);
        }
    }

    /// Clears a section's dirty flag.
    pub fn clear_section_dirty(&mut self, section: usize) {
        self.dirty_sections.set(section, false);
    }

    /// True if the section's geometry is stale.
    pub fn is_section_dirty(&self, section: usize) -> bool {
        self.dirty_sections[section]
    }

    /// Indices of every stale section, bottom to top.
    pub fn dirty_sections(&self) -> Vec<usize> {
        self.dirty_sections.iter_ones().collect()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ChunkState {
        self.state
    }

    /// Sets the lifecycle state.
    pub fn set_state(&mut self, state: ChunkState) {
        self.state = state;
    }

    /// Settles the state after a remesh pass: `Dirty` if stale sections remain, else `Loaded`.
    pub fn finish_remeshing(&mut self) {
        self.state = if self.dirty_sections.any() {
            ChunkState::Dirty
        } else {
            ChunkState::Loaded
        };
    }

    /// Block types in storage order, for comparisons and diagnostics.
    pub fn block_types(&self) -> &[BlockType] {
        &self.blocks
    }

    /// Light values in storage order.
    pub fn lights(&self) -> &[BlockLight] {
        &self.lights
    }

    /// Height map, indexed by `x * SECTION_SIZE + z`.
    pub fn height_map(&self) -> &[i32] {
        &self.height_map
    }
}
