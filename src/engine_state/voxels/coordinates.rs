//! # Coordinate Mapping
//!
//! Conversions between the three coordinate spaces of the voxel world:
//!
//! * **World-block** coordinates: signed, unbounded integers naming a single voxel.
//! * **Chunk** coordinates: signed, unbounded `(x, z)` pairs naming a chunk column.
//! * **Local** coordinates: bounded offsets inside a chunk, `[0, SECTION_SIZE)` on X/Z
//!   and `[0, MAX_HEIGHT)` on Y.
//!
//! All conversions use floor semantics, so `-1` maps to chunk `-1`, local `15`.

use cgmath::Point3;

/// Width and depth of a chunk, and height of one chunk section, in blocks.
pub const SECTION_SIZE: i32 = 16;
/// Number of sections stacked along Y in a chunk.
pub const SECTION_NUM: usize = 8;
/// Height of the world in blocks.
pub const MAX_HEIGHT: i32 = SECTION_SIZE * SECTION_NUM as i32;

/// Position of a chunk column in chunk coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkPosition {
    /// Chunk X coordinate
    pub x: i32,
    /// Chunk Z coordinate
    pub z: i32,
}

impl ChunkPosition {
    /// Creates a new chunk position.
    pub const fn new(x: i32, z: i32) -> Self {
        ChunkPosition { x, z }
    }

    /// Returns the position offset by `(dx, dz)` chunks.
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        ChunkPosition::new(self.x + dx, self.z + dz)
    }

    /// Chebyshev distance in chunks, the metric used for preload, render and unload rings.
    pub fn distance(self, other: ChunkPosition) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }

    /// World X coordinate of the chunk's first column.
    pub fn block_x_base(self) -> i32 {
        chunk_xz_to_block_xz(self.x)
    }

    /// World Z coordinate of the chunk's first column.
    pub fn block_z_base(self) -> i32 {
        chunk_xz_to_block_xz(self.z)
    }
}

/// A block position relative to its chunk.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LocalPosition {
    /// X within `[0, SECTION_SIZE)`
    pub x: usize,
    /// Y within `[0, MAX_HEIGHT)`
    pub y: usize,
    /// Z within `[0, SECTION_SIZE)`
    pub z: usize,
}

/// Chunk coordinate containing world-block coordinate `blk` (X or Z axis).
#[inline]
pub fn block_xz_to_chunk_xz(blk: i32) -> i32 {
    blk.div_euclid(SECTION_SIZE)
}

/// Offset of world-block coordinate `blk` inside its chunk (X or Z axis).
#[inline]
pub fn block_xz_to_block_xz_in_chunk(blk: i32) -> i32 {
    blk.rem_euclid(SECTION_SIZE)
}

/// World-block coordinate of the first column of chunk `ck` (X or Z axis).
#[inline]
pub fn chunk_xz_to_block_xz(ck: i32) -> i32 {
    ck * SECTION_SIZE
}

/// Index of the chunk section containing world Y coordinate `blk`.
#[inline]
pub fn block_y_to_section_index(blk: i32) -> i32 {
    blk.div_euclid(SECTION_SIZE)
}

/// Offset of world Y coordinate `blk` inside its chunk section.
#[inline]
pub fn block_y_to_block_y_in_section(blk: i32) -> i32 {
    blk.rem_euclid(SECTION_SIZE)
}

/// World Y coordinate of the bottom layer of section `section`.
#[inline]
pub fn section_index_to_block_y(section: i32) -> i32 {
    section * SECTION_SIZE
}

/// World-block coordinate containing the continuous camera coordinate `cam`.
#[inline]
pub fn camera_to_block(cam: f32) -> i32 {
    cam.floor() as i32
}

/// Chunk column containing the given world-block position.
pub fn world_to_chunk_position(pos: Point3<i32>) -> ChunkPosition {
    ChunkPosition::new(block_xz_to_chunk_xz(pos.x), block_xz_to_chunk_xz(pos.z))
}

/// Splits a world-block position into its chunk and local offset.
///
/// # Returns
/// `None` when `pos.y` lies outside `[0, MAX_HEIGHT)`.
pub fn world_to_local(pos: Point3<i32>) -> Option<(ChunkPosition, LocalPosition)> {
    if !(0..MAX_HEIGHT).contains(&pos.y) {
        return None;
    }
    Some((
        world_to_chunk_position(pos),
        LocalPosition {
            x: block_xz_to_block_xz_in_chunk(pos.x) as usize,
            y: pos.y as usize,
            z: block_xz_to_block_xz_in_chunk(pos.z) as usize,
        },
    ))
}

/// Converts a chunk and local offset back to a world-block position.
pub fn local_to_world(chunk: ChunkPosition, local: LocalPosition) -> Point3<i32> {
    Point3::new(
        chunk.block_x_base() + local.x as i32,
        local.y as i32,
        chunk.block_z_base() + local.z as i32,
    )
}
