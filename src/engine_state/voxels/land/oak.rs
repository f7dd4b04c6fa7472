//! Oak tree decoration.
//!
//! Whether a column roots a tree, and the tree's exact shape, depend only on the
//! seed and the root column. A chunk therefore considers every root close
//! enough for its crown to reach in, including roots in neighbouring chunks, and
//! writes only the voxels that fall inside itself. Two chunks sharing a tree
//! produce matching halves regardless of which was generated first.

use cgmath::Point3;

use super::random::{column_hash, column_unit, SALT_TREE_ROOT, SALT_TREE_SHAPE};
use super::{clamped_surface_height, LandGenerator, WATER_LEVEL};
use crate::engine_state::voxels::block::{block_info::is_solid, block_type::BlockType};
use crate::engine_state::voxels::chunk::Chunk;
use crate::engine_state::voxels::coordinates::{world_to_local, SECTION_SIZE};

/// Chance that a dry column roots a tree.
pub const OAK_DENSITY: f32 = 0.01;
/// Shortest trunk.
const TRUNK_MIN: i32 = 4;
/// Tallest trunk.
const TRUNK_MAX: i32 = 6;
/// Horizontal reach of the crown from the trunk.
pub const CROWN_RADIUS: i32 = 2;

/// Voxels of one tree in world coordinates.
struct Oak {
    trunk: Vec<Point3<i32>>,
    leaves: Vec<Point3<i32>>,
}

/// Returns the tree rooted at world column `(x, z)`, if any.
fn oak_at<G: LandGenerator + ?Sized>(generator: &G, x: i32, z: i32) -> Option<Oak> {
    let seed = generator.seed();
    if column_unit(seed, SALT_TREE_ROOT, x, z) >= OAK_DENSITY {
        return None;
    }
    let surface = clamped_surface_height(generator, x, z);
    if surface < WATER_LEVEL {
        return None;
    }

    let mut rng = fastrand::Rng::with_seed(column_hash(seed, SALT_TREE_SHAPE, x, z));
    let trunk_height = rng.i32(TRUNK_MIN..=TRUNK_MAX);
    let top = surface + trunk_height;

    let trunk = (surface + 1..=top).map(|y| Point3::new(x, y, z)).collect();

    let mut leaves = Vec::new();
    for dy in -2..=1 {
        let radius = if dy < 0 { CROWN_RADIUS } else { 1 };
        for dx in -radius..=radius {
            for dz in -radius..=radius {
                let corner = dx.abs() == radius && dz.abs() == radius;
                if corner && (dy == 1 || !rng.bool()) {
                    continue;
                }
                leaves.push(Point3::new(x + dx, top + dy, z + dz));
            }
        }
    }

    Some(Oak { trunk, leaves })
}

/// Places every oak whose voxels reach into `chunk`.
///
/// Leaves only replace air and surface plants; trunks are written after all
/// leaves and replace anything that is not solid.
pub fn decorate<G: LandGenerator + ?Sized>(generator: &G, chunk: &mut Chunk) {
    let position = chunk.position();
    let x0 = position.block_x_base();
    let z0 = position.block_z_base();

    let mut oaks = Vec::new();
    for x in x0 - CROWN_RADIUS..x0 + SECTION_SIZE + CROWN_RADIUS {
        for z in z0 - CROWN_RADIUS..z0 + SECTION_SIZE + CROWN_RADIUS {
            if let Some(oak) = oak_at(generator, x, z) {
                oaks.push(oak);
            }
        }
    }
    if !oaks.is_empty() {
        log::trace!("{} oaks reach chunk {:?}", oaks.len(), position);
    }

    for oak in &oaks {
        for &leaf in &oak.leaves {
            place(chunk, leaf, BlockType::LEAF, |existing| {
                matches!(existing, BlockType::AIR | BlockType::GRASS | BlockType::FLOWER)
            });
        }
    }
    for oak in &oaks {
        for &wood in &oak.trunk {
            place(chunk, wood, BlockType::WOOD, |existing| !is_solid(existing));
        }
    }
}

fn place(
    chunk: &mut Chunk,
    pos: Point3<i32>,
    block_type: BlockType,
    replaceable: impl Fn(BlockType) -> bool,
) {
    let Some((chunk_pos, local)) = world_to_local(pos) else {
        return;
    };
    if chunk_pos != chunk.position() {
        return;
    }
    if replaceable(chunk.block_type(local.x, local.y, local.z)) {
        chunk.set_block_type(local.x, local.y, local.z, block_type);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::chunk_map::ChunkMap;
    use crate::engine_state::voxels::coordinates::{world_to_chunk_position, ChunkPosition};
    use crate::engine_state::voxels::land::FlatLandGenerator;

    /// Finds a tree root whose crown crosses the +X border of its chunk.
    fn border_root(generator: &FlatLandGenerator) -> Option<(i32, i32)> {
        for cx in 0..40 {
            for z in 2..14 {
                let x = cx * SECTION_SIZE + 15;
                if oak_at(generator, x, z).is_some() {
                    return Some((x, z));
                }
            }
        }
        None
    }

    #[test]
    fn trees_grow_on_dry_land_only() {
        let dry = FlatLandGenerator::new(5, 60);
        let wet = FlatLandGenerator::new(5, 20);
        let mut found = 0;
        for x in 0..200 {
            for z in 0..50 {
                if let Some(oak) = oak_at(&dry, x, z) {
                    found += 1;
                    assert_eq!(oak.trunk[0], Point3::new(x, 61, z));
                    assert!((TRUNK_MIN..=TRUNK_MAX).contains(&(oak.trunk.len() as i32)));
                }
                assert!(oak_at(&wet, x, z).is_none());
            }
        }
        assert!(found > 0);
    }

    #[test]
    fn shared_trees_match_across_chunk_border() {
        let generator = FlatLandGenerator::new(5, 60);
        let (x, z) = border_root(&generator).expect("no border tree in search area");

        let left_pos = world_to_chunk_position(Point3::new(x, 0, z));
        let right_pos = left_pos.offset(1, 0);

        // Build the pair into a map in both orders.
        let build = |order: [ChunkPosition; 2]| {
            let mut map = ChunkMap::new();
            for pos in order {
                let mut chunk = Chunk::new(pos);
                generator.generate_land(&mut chunk);
                map.insert(chunk);
            }
            map
        };
        let left_first = build([left_pos, right_pos]);
        let right_first = build([right_pos, left_pos]);

        let oak = oak_at(&generator, x, z).unwrap();
        let mut crossing = 0;
        for &pos in oak.trunk.iter().chain(oak.leaves.iter()) {
            let a = left_first.block_at(pos).unwrap();
            let b = right_first.block_at(pos).unwrap();
            assert_eq!(a, b, "{:?}", pos);
            assert!(matches!(a.block_type, BlockType::WOOD | BlockType::LEAF), "{:?}", pos);
            if world_to_chunk_position(pos) == right_pos {
                crossing += 1;
            }
        }
        assert!(crossing > 0);

        // The crown spills one column over the border into the right chunk.
        let top = oak.trunk.last().unwrap().y;
        assert_eq!(
            left_first.block_at(Point3::new(x, top, z)).unwrap().block_type,
            BlockType::WOOD
        );
        assert_eq!(
            right_first.block_at(Point3::new(x + 1, top - 1, z)).unwrap().block_type,
            BlockType::LEAF
        );
    }
}
