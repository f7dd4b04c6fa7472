//! # Chunk Map
//!
//! The arena holding every loaded chunk, keyed by chunk position. Chunks never
//! point at their siblings; anything that crosses a chunk border (lighting,
//! meshing, picking) goes through world-coordinate lookups on this map.

use std::collections::HashMap;

use cgmath::Point3;

use super::Chunk;
use crate::engine_state::voxels::block::{block_light::BlockLight, Block};
use crate::engine_state::voxels::coordinates::{
    block_xz_to_chunk_xz, block_y_to_section_index, world_to_local, ChunkPosition, MAX_HEIGHT,
};

/// Loaded chunks keyed by position.
#[derive(Default)]
pub struct ChunkMap {
    chunks: HashMap<ChunkPosition, Chunk>,
}

impl ChunkMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        ChunkMap {
            chunks: HashMap::new(),
        }
    }

    /// Number of loaded chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// True if no chunk is loaded.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// True if the chunk at `pos` is loaded.
    pub fn contains(&self, pos: ChunkPosition) -> bool {
        self.chunks.contains_key(&pos)
    }

    /// The chunk at `pos`, if loaded.
    pub fn get(&self, pos: ChunkPosition) -> Option<&Chunk> {
        self.chunks.get(&pos)
    }

    /// Mutable access to the chunk at `pos`, if loaded.
    pub fn get_mut(&mut self, pos: ChunkPosition) -> Option<&mut Chunk> {
        self.chunks.get_mut(&pos)
    }

    /// Adds a chunk, replacing any chunk already at its position.
    pub fn insert(&mut self, chunk: Chunk) -> Option<Chunk> {
        self.chunks.insert(chunk.position(), chunk)
    }

    /// Removes and returns the chunk at `pos`.
    pub fn remove(&mut self, pos: ChunkPosition) -> Option<Chunk> {
        self.chunks.remove(&pos)
    }

    /// Positions of every loaded chunk, in arbitrary order.
    pub fn positions(&self) -> Vec<ChunkPosition> {
        self.chunks.keys().copied().collect()
    }

    /// Iterates over every loaded chunk.
    pub fn iter(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    /// True if all 8 chunks around `pos` are loaded.
    pub fn surrounded(&self, pos: ChunkPosition) -> bool {
        (-1..=1).all(|dx| {
            (-1..=1).all(|dz| (dx == 0 && dz == 0) || self.contains(pos.offset(dx, dz)))
        })
    }

    /// The block at a world position.
    ///
    /// # Returns
    /// `None` if the position is outside the world's height range or its chunk is not loaded.
    pub fn block_at(&self, pos: Point3<i32>) -> Option<Block> {
        let (chunk_pos, local) = world_to_local(pos)?;
        self.chunks.get(&chunk_pos).map(|chunk| chunk.block(local))
    }

    /// Overwrites the light at a world position.
    ///
    /// # Returns
    /// `false` if the voxel is not loaded.
    pub fn set_light_at(&mut self, pos: Point3<i32>, light: BlockLight) -> bool {
        let Some((chunk_pos, local)) = world_to_local(pos) else {
            return false;
        };
        match self.chunks.get_mut(&chunk_pos) {
            Some(chunk) => {
                chunk.set_light(local.x, local.y, local.z, light);
                true
            }
            None => false,
        }
    }

    /// Overwrites type and light at a world position.
    ///
    /// # Returns
    /// `false` if the voxel is not loaded.
    pub fn set_block_at(&mut self, pos: Point3<i32>, block: Block) -> bool {
        let Some((chunk_pos, local)) = world_to_local(pos) else {
            return false;
        };
        match self.chunks.get_mut(&chunk_pos) {
            Some(chunk) => {
                chunk.set_block(local.x, local.y, local.z, block);
                true
            }
            None => false,
        }
    }

    /// Marks dirty every loaded section whose 3×3×3 meshing context contains `pos`.
    ///
    /// That is the section owning `pos` plus any section in a neighbouring chunk
    /// or layer that `pos` borders.
    pub fn mark_context_dirty(&mut self, pos: Point3<i32>) {
        let chunk_xs = distinct([
            block_xz_to_chunk_xz(pos.x - 1),
            block_xz_to_chunk_xz(pos.x),
            block_xz_to_chunk_xz(pos.x + 1),
        ]);
        let chunk_zs = distinct([
            block_xz_to_chunk_xz(pos.z - 1),
            block_xz_to_chunk_xz(pos.z),
            block_xz_to_chunk_xz(pos.z + 1),
        ]);
        let sections = distinct([
            block_y_to_section_index((pos.y - 1).max(0)),
            block_y_to_section_index(pos.y.clamp(0, MAX_HEIGHT - 1)),
            block_y_to_section_index((pos.y + 1).min(MAX_HEIGHT - 1)),
        ]);

        for &cx in chunk_xs.iter().flatten() {
            for &cz in chunk_zs.iter().flatten() {
                if let Some(chunk) = self.chunks.get_mut(&ChunkPosition::new(cx, cz)) {
                    for &section in sections.iter().flatten() {
                        chunk.mark_section_dirty(section as usize);
                    }
                }
            }
        }
    }
}

/// Deduplicates a sorted triple, keeping at most the two distinct values that can occur.
fn distinct(values: [i32; 3]) -> [Option<i32>; 3] {
    let mut out = [None; 3];
    let mut n = 0;
    for v in values {
        if !out[..n].contains(&Some(v)) {
            out[n] = Some(v);
            n += 1;
        }
    }
    out
}
