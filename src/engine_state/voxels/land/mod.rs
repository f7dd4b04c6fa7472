//! # Land Generation
//!
//! Deterministic terrain synthesis for a single chunk.
//!
//! A [`LandGenerator`] supplies a surface height per world column; the shared
//! [`generate_land`] routine turns heights into voxels:
//!
//! 1. Fill each column: bedrock, stone, two layers of dirt, then either water up
//!    to [`WATER_LEVEL`] or a grass box with an occasional grass tuft or flower.
//! 2. Run the oak decoration pass.
//! 3. Recompute the height map and sweep sunlight down every column.
//! 4. Collect the voxels whose light must be propagated once the chunk joins the
//!    world.
//!
//! ## Available Generators
//!
//! * `value_noise` - five octaves of smoothed lattice noise, the default
//! * `perlin` - fractal Perlin noise from the `noise` crate
//! * `flat` - constant height, for testing and debugging
//!
//! All randomness is derived from `(seed, world column, salt)` through
//! [`random`], so generation is idempotent and independent of generation order.

use std::sync::Arc;

use cgmath::Point3;
use serde::Deserialize;

use super::block::{
    block_info::block_info,
    block_light::{BlockLight, LIGHT_COMPONENT_MAX, SUN_CHANNEL},
    block_type::BlockType,
    Block,
};
use super::chunk::Chunk;
use super::coordinates::{local_to_world, LocalPosition, MAX_HEIGHT, SECTION_SIZE};

mod oak;
mod perlin;
pub mod random;
mod value_noise;

pub use perlin::PerlinLandGenerator;
pub use random::Seed;
pub use value_noise::ValueNoiseLandGenerator;

/// Surface height below which columns are flooded.
pub const WATER_LEVEL: i32 = 40;
/// Lowest surface height a generator may produce; leaves room for bedrock and dirt.
pub const MIN_SURFACE_HEIGHT: i32 = 3;
/// Highest surface height a generator may produce; leaves room for trees.
pub const MAX_SURFACE_HEIGHT: i32 = MAX_HEIGHT - 16;

/// Probability band of a grass tuft on a dry surface.
pub const GRASS_PROBABILITY: f32 = 0.02;
/// Upper edge of the flower band, which starts at [`GRASS_PROBABILITY`].
pub const FLOWER_PROBABILITY: f32 = 0.04;

/// A source of terrain for whole chunks.
///
/// Implementations only decide the height field; column filling, decoration
/// and lighting seeds are shared by [`generate_land`].
pub trait LandGenerator: Send + Sync {
    /// The world seed.
    fn seed(&self) -> Seed;

    /// Raw surface height of a world column, before clamping.
    fn surface_height(&self, block_x: i32, block_z: i32) -> i32;

    /// Whether plants and trees are placed on dry land.
    fn decorates(&self) -> bool {
        true
    }

    /// Fills `chunk` and returns the world positions that need light propagation.
    fn generate_land(&self, chunk: &mut Chunk) -> Vec<Point3<i32>> {
        generate_land(self, chunk)
    }
}

/// Which generator the world uses.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    /// [`ValueNoiseLandGenerator`]
    #[default]
    ValueNoise,
    /// [`PerlinLandGenerator`]
    Perlin,
    /// [`FlatLandGenerator`]
    Flat,
}

/// Surface height used when the `flat` generator is selected from configuration.
pub const FLAT_DEFAULT_HEIGHT: i32 = 64;

/// Builds the generator selected by `kind`.
pub fn create_land_generator(kind: GeneratorKind, seed: Seed) -> Arc<dyn LandGenerator> {
    match kind {
        GeneratorKind::ValueNoise => Arc::new(ValueNoiseLandGenerator::new(seed)),
        GeneratorKind::Perlin => Arc::new(PerlinLandGenerator::new(seed)),
        GeneratorKind::Flat => Arc::new(FlatLandGenerator::new(seed, FLAT_DEFAULT_HEIGHT)),
    }
}

/// Constant-height terrain.
#[derive(Clone, Debug)]
pub struct FlatLandGenerator {
    seed: Seed,
    height: i32,
    decorate: bool,
}

impl FlatLandGenerator {
    /// Flat land at `height` with plants and trees.
    pub fn new(seed: Seed, height: i32) -> Self {
        FlatLandGenerator {
            seed,
            height,
            decorate: true,
        }
    }

    /// The same land without plants or trees.
    pub fn without_decoration(mut self) -> Self {
        self.decorate = false;
        self
    }
}

impl LandGenerator for FlatLandGenerator {
    fn seed(&self) -> Seed {
        self.seed
    }

    fn surface_height(&self, _block_x: i32, _block_z: i32) -> i32 {
        self.height
    }

    fn decorates(&self) -> bool {
        self.decorate
    }
}

/// Surface height clamped to `[MIN_SURFACE_HEIGHT, MAX_SURFACE_HEIGHT]`.
pub fn clamped_surface_height<G: LandGenerator + ?Sized>(generator: &G, x: i32, z: i32) -> i32 {
    let raw = generator.surface_height(x, z);
    let clamped = raw.clamp(MIN_SURFACE_HEIGHT, MAX_SURFACE_HEIGHT);
    if clamped != raw {
        log::warn!(
            "Surface height {} at ({}, {}) clamped to {}",
            raw,
            x,
            z,
            clamped
        );
    }
    clamped
}

/// Fills every voxel of `chunk` from `generator`.
///
/// # Returns
/// World positions of lit voxels that may need to spread light
/// sideways: everything up to one above the tallest of a column and its four
/// neighbours, and whole columns on the chunk border.
pub fn generate_land<G: LandGenerator + ?Sized>(generator: &G, chunk: &mut Chunk) -> Vec<Point3<i32>> {
    let size = SECTION_SIZE as usize;

    for x in 0..size {
        for z in 0..size {
            fill_column(generator, chunk, x, z);
        }
    }

    if generator.decorates() {
        oak::decorate(generator, chunk);
    }

    for x in 0..size {
        for z in 0..size {
            chunk.update_height(x, z);
        }
    }

    relight_chunk(chunk)
}

/// Rebuilds a chunk's light from its own blocks alone.
///
/// Every voxel is reset to its sunlight and its own emission, dropping any
/// light that reached it from neighbouring chunks.
///
/// # Returns
/// World positions that must spread their light once the chunk is in the world.
pub fn relight_chunk(chunk: &mut Chunk) -> Vec<Point3<i32>> {
    let size = SECTION_SIZE as usize;
    for x in 0..size {
        for z in 0..size {
            sweep_sunlight(chunk, x, z);
        }
    }
    collect_light_updates(chunk)
}

fn fill_column<G: LandGenerator + ?Sized>(generator: &G, chunk: &mut Chunk, x: usize, z: usize) {
    let position = chunk.position();
    let world_x = position.block_x_base() + x as i32;
    let world_z = position.block_z_base() + z as i32;
    let dark = |block_type| Block::new(block_type, BlockLight::DARK);

    let mut h = clamped_surface_height(generator, world_x, world_z);

    chunk.set_block(x, 0, z, dark(BlockType::BEDROCK));
    for y in 1..h - 2 {
        chunk.set_block(x, y as usize, z, dark(BlockType::STONE));
    }
    for y in h - 2..h {
        chunk.set_block(x, y as usize, z, dark(BlockType::DIRT));
    }

    if h < WATER_LEVEL {
        for y in h..=WATER_LEVEL {
            let sun = (LIGHT_COMPONENT_MAX as i32 - 2 * (WATER_LEVEL - y + 1)).max(0) as u8;
            chunk.set_block(
                x,
                y as usize,
                z,
                Block::new(BlockType::WATER, BlockLight::sun_only(sun)),
            );
        }
        h = WATER_LEVEL;
    } else {
        chunk.set_block(x, h as usize, z, dark(BlockType::GRASS_BOX));

        if generator.decorates() {
            let draw = random::column_unit(
                generator.seed(),
                random::SALT_SURFACE_PLANT,
                world_x,
                world_z,
            );
            let plant = if draw < GRASS_PROBABILITY {
                Some(BlockType::GRASS)
            } else if draw < FLOWER_PROBABILITY {
                Some(BlockType::FLOWER)
            } else {
                None
            };
            if let Some(plant) = plant {
                h += 1;
                chunk.set_block(
                    x,
                    h as usize,
                    z,
                    Block::new(plant, BlockLight::sun_only(LIGHT_COMPONENT_MAX - 1)),
                );
            }
        }
    }

    for y in h + 1..MAX_HEIGHT {
        chunk.set_block(x, y as usize, z, Block::sky());
    }

    chunk.set_height(x, z, h);
}

/// Recomputes a column's light from the top down.
///
/// Sunlight stays at full strength through air under open sky, loses the
/// block's attenuation through any other transparent block and is cut by
/// opaque blocks. Emitters keep their own colour.
pub fn sweep_sunlight(chunk: &mut Chunk, x: usize, z: usize) {
    let mut sun = LIGHT_COMPONENT_MAX;
    for y in (0..MAX_HEIGHT as usize).rev() {
        let block_type = chunk.block_type(x, y, z);
        let info = block_info(block_type);
        if info.opaque {
            sun = 0;
        } else if block_type != BlockType::AIR || sun != LIGHT_COMPONENT_MAX {
            sun = sun.saturating_sub(info.light_attenuation);
        }
        chunk.set_light(x, y, z, info.emission_light().with(SUN_CHANNEL, sun));
    }
}

fn collect_light_updates(chunk: &Chunk) -> Vec<Point3<i32>> {
    let size = SECTION_SIZE as usize;
    let last = size - 1;
    let mut updates = Vec::new();

    for x in 0..size {
        for z in 0..size {
            let top = if x == 0 || z == 0 || x == last || z == last {
                MAX_HEIGHT - 1
            } else {
                let neighbours = [
                    chunk.height(x, z),
                    chunk.height(x - 1, z),
                    chunk.height(x + 1, z),
                    chunk.height(x, z - 1),
                    chunk.height(x, z + 1),
                ];
                (neighbours.into_iter().max().unwrap_or(0) + 1).min(MAX_HEIGHT - 1)
            };

            for y in 0..=top as usize {
                let info = block_info(chunk.block_type(x, y, z));
                let blocked = info.opaque && info.emission_light().is_dark();
                if blocked || chunk.light(x, y, z).is_dark() {
                    continue;
                }
                updates.push(local_to_world(
                    chunk.position(),
                    LocalPosition { x, y, z },
                ));
            }
        }
    }

    updates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::coordinates::ChunkPosition;

    fn generate<G: LandGenerator>(generator: &G, pos: ChunkPosition) -> (Chunk, Vec<Point3<i32>>) {
        let mut chunk = Chunk::new(pos);
        let updates = generator.generate_land(&mut chunk);
        (chunk, updates)
    }

    #[test]
    fn flat_column_layers() {
        let generator = FlatLandGenerator::new(1, 50).without_decoration();
        let (chunk, _) = generate(&generator, ChunkPosition::new(0, 0));

        assert_eq!(chunk.block_type(3, 0, 3), BlockType::BEDROCK);
        assert_eq!(chunk.block_type(3, 1, 3), BlockType::STONE);
        assert_eq!(chunk.block_type(3, 47, 3), BlockType::STONE);
        assert_eq!(chunk.block_type(3, 48, 3), BlockType::DIRT);
        assert_eq!(chunk.block_type(3, 49, 3), BlockType::DIRT);
        assert_eq!(chunk.block_type(3, 50, 3), BlockType::GRASS_BOX);
        assert_eq!(chunk.block_type(3, 51, 3), BlockType::AIR);
        assert_eq!(chunk.height(3, 3), 50);

        assert_eq!(chunk.light(3, 50, 3), BlockLight::DARK);
        for y in 51..MAX_HEIGHT as usize {
            assert_eq!(chunk.light(3, y, 3), BlockLight::SKY);
        }
    }

    #[test]
    fn low_columns_flood_to_water_level() {
        let generator = FlatLandGenerator::new(1, 30).without_decoration();
        let (chunk, _) = generate(&generator, ChunkPosition::new(-2, 5));

        assert_eq!(chunk.block_type(0, 29, 0), BlockType::DIRT);
        for y in 30..=WATER_LEVEL as usize {
            assert_eq!(chunk.block_type(0, y, 0), BlockType::WATER);
        }
        assert_eq!(chunk.block_type(0, WATER_LEVEL as usize + 1, 0), BlockType::AIR);
        assert_eq!(chunk.height(0, 0), WATER_LEVEL);

        // Sun fades two levels per block of water, starting one step below the surface.
        assert_eq!(chunk.light(0, 40, 0).sun(), 13);
        assert_eq!(chunk.light(0, 39, 0).sun(), 11);
        assert_eq!(chunk.light(0, 34, 0).sun(), 1);
        assert_eq!(chunk.light(0, 33, 0).sun(), 0);
    }

    #[test]
    fn degenerate_heights_are_clamped() {
        let low = FlatLandGenerator::new(1, -20).without_decoration();
        assert_eq!(clamped_surface_height(&low, 0, 0), MIN_SURFACE_HEIGHT);
        let (chunk, _) = generate(&low, ChunkPosition::new(0, 0));
        assert_eq!(chunk.block_type(0, 0, 0), BlockType::BEDROCK);

        let high = FlatLandGenerator::new(1, 500).without_decoration();
        let (chunk, _) = generate(&high, ChunkPosition::new(0, 0));
        assert_eq!(chunk.height(5, 5), MAX_SURFACE_HEIGHT);
        assert_eq!(chunk.block_type(5, MAX_SURFACE_HEIGHT as usize, 5), BlockType::GRASS_BOX);
    }

    #[test]
    fn light_updates_cover_border_columns_and_surface() {
        let generator = FlatLandGenerator::new(1, 50).without_decoration();
        let (_, updates) = generate(&generator, ChunkPosition::new(1, 1));

        // Interior column: only the voxel just above the surface.
        let interior: Vec<_> = updates
            .iter()
            .filter(|p| p.x == 16 + 5 && p.z == 16 + 5)
            .collect();
        assert_eq!(interior, vec![&Point3::new(21, 51, 21)]);

        // Border column: the whole lit part.
        let border = updates
            .iter()
            .filter(|p| p.x == 16 && p.z == 16 + 5)
            .count();
        assert_eq!(border, (MAX_HEIGHT - 51) as usize);
    }

    #[test]
    fn relight_drops_foreign_light_and_seeds_emitters() {
        let generator = FlatLandGenerator::new(1, 50).without_decoration();
        let (mut chunk, _) = generate(&generator, ChunkPosition::new(0, 0));
        chunk.set_light(4, 60, 4, BlockLight::new(9, 0, 0, LIGHT_COMPONENT_MAX));
        chunk.set_block_type(8, 49, 8, BlockType::GREEN_GLOW_STONE);

        let updates = relight_chunk(&mut chunk);
        assert_eq!(chunk.light(4, 60, 4), BlockLight::SKY);
        assert_eq!(chunk.light(8, 49, 8).g(), LIGHT_COMPONENT_MAX);
        assert!(updates.contains(&Point3::new(8, 49, 8)));
        assert!(!updates.contains(&Point3::new(8, 48, 8)));
    }

    #[test]
    fn generation_is_deterministic() {
        let generator = ValueNoiseLandGenerator::new(42);
        let (a, updates_a) = generate(&generator, ChunkPosition::new(3, -7));
        let (b, updates_b) = generate(&generator, ChunkPosition::new(3, -7));
        assert_eq!(a.block_types(), b.block_types());
        assert_eq!(a.lights(), b.lights());
        assert_eq!(a.height_map(), b.height_map());
        assert_eq!(updates_a, updates_b);
    }

    #[test]
    fn create_generator_by_kind() {
        let generator = create_land_generator(GeneratorKind::Flat, 9);
        assert_eq!(generator.seed(), 9);
        assert_eq!(generator.surface_height(100, -100), FLAT_DEFAULT_HEIGHT);

        let generator = create_land_generator(GeneratorKind::ValueNoise, 42);
        assert_eq!(generator.surface_height(0, 0), 64);
    }
}
