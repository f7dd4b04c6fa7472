//! # World Module
//!
//! This module provides the `World` struct, which owns every loaded chunk and
//! coordinates loading, lighting, meshing and editing.
//!
//! ## Architecture
//!
//! Chunks live in a [`ChunkMap`] arena keyed by chunk position and are only
//! touched from the thread that owns the `World`. Generation runs on a
//! [`TaskManager`] worker pool: a worker receives a position plus the shared
//! generator and hands back a finished chunk, which is integrated on the next
//! [`World::process_chunk_loader_messages`].
//!
//! ## Streaming
//!
//! The world follows a centre chunk. Distances are Chebyshev distances in chunks:
//!
//! - within `preload_distance` chunks are requested, nearest first
//! - within `render_distance` chunks whose eight neighbours are loaded get meshed
//! - beyond `unload_distance` chunks are dropped into an LRU cache, from which a
//!   chunk that comes back into range is restored without regenerating it
//!   and has its light rebuilt from its own blocks
//!
//! ## Update Order
//!
//! [`World::update`] runs, in order: centre tracking, light propagation,
//! remeshing of dirty sections, then integration of generated chunks.

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;

use cgmath::{InnerSpace, Point3, Vector3};
use log::{debug, info, trace};
use lru::LruCache;

use super::block::{block_side::BlockSide, block_type::BlockType, Block};
use super::chunk::{chunk_map::ChunkMap, Chunk, ChunkState};
use super::coordinates::{world_to_chunk_position, world_to_local, ChunkPosition, SECTION_NUM};
use super::land::{create_land_generator, relight_chunk, LandGenerator};
use super::lighting::LightPropagator;
use super::tasks::chunk_generation_task::{ChunkGenerationTask, GeneratedChunk};
use crate::config::WorldConfig;
use crate::engine_state::rendering::meshing::{build_section_models, ChunkSectionModels};
use crate::engine_state::task_management::TaskManager;
use crate::error::{ConfigError, WorldError};

/// Identifies one section of one chunk.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionKey {
    /// The chunk owning the section
    pub chunk: ChunkPosition,
    /// Section index, `0` at the bottom
    pub section: usize,
}

/// Result of a successful [`World::pick_block`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockPick {
    /// The block that was hit
    pub block: Block,
    /// The face of the hit block the ray entered through
    pub face: BlockSide,
    /// World position of the hit block
    pub position: Point3<i32>,
}

/// The loaded voxel world.
pub struct World {
    /// Streaming settings
    config: WorldConfig,
    /// Terrain source shared with generation tasks
    generator: Arc<dyn LandGenerator>,
    /// Every loaded chunk
    chunks: ChunkMap,
    /// Positions with a generation task in flight
    loading: HashSet<ChunkPosition>,
    /// Recently unloaded chunks
    cache: LruCache<ChunkPosition, Chunk>,
    /// Pending light work
    light: LightPropagator,
    /// Chunk generation workers
    loader: TaskManager<ChunkGenerationTask>,
    /// Chunk the loaded area is centred on, once known
    centre: Option<ChunkPosition>,
}

impl World {
    /// Creates an empty world using the generator named in `config`.
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        let generator = create_land_generator(config.generator, config.seed);
        Self::with_generator(config, generator)
    }

    /// Creates an empty world with an explicit generator.
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] if the streaming distances are out of order
    /// or the cache has no room.
    pub fn with_generator(
        config: WorldConfig,
        generator: Arc<dyn LandGenerator>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            "Creating world: seed {}, generator {:?}, distances preload {} / render {} / unload {}",
            config.seed,
            config.generator,
            config.preload_distance,
            config.render_distance,
            config.unload_distance
        );
        let capacity = NonZeroUsize::new(config.chunk_cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Ok(World {
            loader: TaskManager::new(config.loader_threads),
            cache: LruCache::new(capacity),
            config,
            generator,
            chunks: ChunkMap::new(),
            loading: HashSet::new(),
            light: LightPropagator::new(),
            centre: None,
        })
    }

    /// Streaming settings of this world.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The loaded chunks.
    pub fn chunks(&self) -> &ChunkMap {
        &self.chunks
    }

    /// The chunk the loaded area is centred on.
    pub fn centre(&self) -> Option<ChunkPosition> {
        self.centre
    }

    /// Lifecycle state of the chunk at `pos`.
    pub fn chunk_state(&self, pos: ChunkPosition) -> ChunkState {
        match self.chunks.get(pos) {
            Some(chunk) => chunk.state(),
            None if self.loading.contains(&pos) => ChunkState::Loading,
            None => ChunkState::Unloaded,
        }
    }

    /// Number of unloaded chunks held in the cache.
    pub fn cached_chunk_count(&self) -> usize {
        self.cache.len()
    }

    /// True when no chunk is loading and no light work is pending.
    pub fn is_settled(&self) -> bool {
        self.loading.is_empty() && self.light.is_idle()
    }

    /// Runs one world tick centred on a world block position.
    ///
    /// # Returns
    /// The sections rebuilt during this tick.
    pub fn update(&mut self, centre_block: Point3<i32>) -> Vec<SectionKey> {
        self.set_centre_position(world_to_chunk_position(centre_block));
        self.process_light_updates();
        let rebuilt = self.process_model_updates();
        self.process_chunk_loader_messages();
        rebuilt
    }

    /// Moves the centre of the loaded area.
    ///
    /// Unloads chunks beyond the unload distance and requests every missing
    /// chunk within the preload distance, nearest first.
    pub fn set_centre_position(&mut self, centre: ChunkPosition) {
        self.centre = Some(centre);

        for pos in self.chunks.positions() {
            if pos.distance(centre) > self.config.unload_distance {
                self.unload_chunk(pos);
            }
        }

        let preload = self.config.preload_distance;
        let mut missing = Vec::new();
        for dx in -preload..=preload {
            for dz in -preload..=preload {
                let pos = centre.offset(dx, dz);
                if !self.chunks.contains(pos) && !self.loading.contains(&pos) {
                    missing.push(pos);
                }
            }
        }
        missing.sort_by_key(|pos| (pos.distance(centre), pos.x, pos.z));

        for pos in missing {
            if let Some(mut chunk) = self.cache.pop(&pos) {
                debug!("Restoring chunk {:?} from cache", pos);
                let light_updates = relight_chunk(&mut chunk);
                self.integrate(chunk, light_updates);
            } else {
                self.loading.insert(pos);
                self.loader
                    .publish_task(ChunkGenerationTask::new(pos, self.generator.clone()));
            }
        }
    }

    fn unload_chunk(&mut self, pos: ChunkPosition) {
        let Some(mut chunk) = self.chunks.remove(pos) else {
            return;
        };
        debug!("Unloading chunk {:?}", pos);
        chunk.set_state(ChunkState::Unloading);
        chunk.clear_models();
        if let Some((evicted, _)) = self.cache.push(pos, chunk) {
            if evicted != pos {
                trace!("Evicted chunk {:?} from cache", evicted);
            }
        }
    }

    /// Integrates finished generation results.
    ///
    /// Results for chunks that moved beyond the unload distance while they
    /// were generated are discarded.
    pub fn process_chunk_loader_messages(&mut self) {
        self.loader.process_queued_tasks();
        for GeneratedChunk {
            chunk,
            light_updates,
        } in self.loader.process_completed_tasks()
        {
            let pos = chunk.position();
            self.loading.remove(&pos);

            let wanted = self
                .centre
                .map_or(true, |centre| pos.distance(centre) <= self.config.unload_distance);
            if !wanted || self.chunks.contains(pos) {
                debug!("Discarding generated chunk {:?}", pos);
                continue;
            }
            debug!("Loaded chunk {:?}", pos);
            self.integrate(chunk, light_updates);
        }
    }

    /// Adds a chunk to the world and schedules its light and mesh work.
    fn integrate(&mut self, mut chunk: Chunk, light_updates: Vec<Point3<i32>>) {
        let pos = chunk.position();
        chunk.set_state(ChunkState::Loaded);
        chunk.mark_all_dirty();
        self.chunks.insert(chunk);

        self.light.enqueue_all(light_updates);
        self.light.enqueue_chunk_borders(&self.chunks, pos);

        for dx in -1..=1 {
            for dz in -1..=1 {
                if dx == 0 && dz == 0 {
                    continue;
                }
                if let Some(neighbour) = self.chunks.get_mut(pos.offset(dx, dz)) {
                    neighbour.mark_all_dirty();
                }
            }
        }
    }

    /// Runs all pending light work.
    ///
    /// # Returns
    /// The number of voxels whose light changed.
    pub fn process_light_updates(&mut self) -> usize {
        if self.light.is_idle() {
            return 0;
        }
        let queued = self.light.pending();
        let changed = self.light.process(&mut self.chunks);
        trace!("Light pass: {} queued, {} voxels changed", queued, changed);
        changed
    }

    /// Rebuilds dirty sections of chunks within render distance whose eight
    /// neighbours are loaded.
    ///
    /// # Returns
    /// The rebuilt sections; their previous models have been replaced.
    pub fn process_model_updates(&mut self) -> Vec<SectionKey> {
        let Some(centre) = self.centre else {
            return Vec::new();
        };

        let mut candidates: Vec<ChunkPosition> = self
            .chunks
            .iter()
            .filter(|chunk| {
                chunk.position().distance(centre) <= self.config.render_distance
                    && !chunk.dirty_sections().is_empty()
            })
            .map(Chunk::position)
            .filter(|&pos| self.chunks.surrounded(pos))
            .collect();
        candidates.sort_by_key(|pos| (pos.distance(centre), pos.x, pos.z));

        let mut rebuilt = Vec::new();
        for pos in candidates {
            let Some(chunk) = self.chunks.get_mut(pos) else {
                continue;
            };
            chunk.set_state(ChunkState::Remeshing);
            let sections = chunk.dirty_sections();

            for section in sections {
                let models = build_section_models(&self.chunks, pos, section);
                trace!(
                    "Remeshed section {} of chunk {:?}: {} quads",
                    section,
                    pos,
                    models.quad_count()
                );
                if let Some(chunk) = self.chunks.get_mut(pos) {
                    chunk.set_models(section, models);
                    chunk.clear_section_dirty(section);
                }
                rebuilt.push(SectionKey {
                    chunk: pos,
                    section,
                });
            }

            if let Some(chunk) = self.chunks.get_mut(pos) {
                chunk.finish_remeshing();
            }
        }
        rebuilt
    }

    /// The block at a world position, if loaded.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Option<Block> {
        self.chunks.block_at(Point3::new(x, y, z))
    }

    /// Changes the type of a loaded block.
    ///
    /// Updates the height map, dirties every section whose meshes sample the
    /// block and schedules the light change. Lighting itself runs on the next
    /// [`World::process_light_updates`].
    pub fn set_block(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        block_type: BlockType,
    ) -> Result<(), WorldError> {
        let pos = Point3::new(x, y, z);
        let Some((chunk_pos, local)) = world_to_local(pos) else {
            return Err(WorldError::OutOfWorld { y });
        };
        let Some(chunk) = self.chunks.get_mut(chunk_pos) else {
            return Err(WorldError::ChunkNotLoaded(chunk_pos));
        };

        let old = chunk.block(local);
        if old.block_type == block_type {
            return Ok(());
        }
        chunk.set_block_type(local.x, local.y, local.z, block_type);
        chunk.update_height(local.x, local.z);

        self.chunks.mark_context_dirty(pos);
        self.light.block_changed(&mut self.chunks, pos, old.light);
        Ok(())
    }

    /// Marches a ray through the world in fixed steps and returns the first
    /// block accepted by `predicate`.
    ///
    /// # Arguments
    /// * `origin` - Start of the ray in world space
    /// * `direction` - Ray direction; need not be normalized
    /// * `max_distance` - Length of the ray
    /// * `step` - Distance between samples
    /// * `predicate` - Which blocks stop the ray
    ///
    /// # Returns
    /// `None` if nothing was hit, or the direction or step is degenerate.
    pub fn pick_block(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
        step: f32,
        predicate: impl Fn(Block) -> bool,
    ) -> Option<BlockPick> {
        if step <= 0.0 || direction.magnitude2() == 0.0 {
            return None;
        }
        let direction = direction.normalize();
        let origin_cell = floor_cell(origin);
        let mut previous = origin_cell;

        let steps = (max_distance / step).floor() as u32;
        for i in 0..=steps {
            let cell = floor_cell(origin + direction * (i as f32 * step));
            if i > 0 && cell == previous {
                continue;
            }
            if let Some(block) = self.chunks.block_at(cell) {
                if predicate(block) {
                    let face = if cell == origin_cell {
                        entry_face_for(direction)
                    } else {
                        face_between(previous, cell)
                    };
                    return Some(BlockPick {
                        block,
                        face,
                        position: cell,
                    });
                }
            }
            previous = cell;
        }
        None
    }

    /// Meshed sections of chunks within render distance.
    pub fn section_models_in_render_range(
        &self,
    ) -> impl Iterator<Item = (ChunkPosition, usize, &ChunkSectionModels)> + '_ {
        let centre = self.centre;
        let render_distance = self.config.render_distance;
        self.chunks
            .iter()
            .filter(move |chunk| {
                centre.is_some_and(|centre| chunk.position().distance(centre) <= render_distance)
            })
            .flat_map(|chunk| {
                (0..SECTION_NUM).filter_map(move |section| {
                    chunk
                        .models(section)
                        .map(|models| (chunk.position(), section, models))
                })
            })
    }

    /// The current models of one section, if it has been meshed.
    pub fn section_models(&self, pos: ChunkPosition, section: usize) -> Option<&ChunkSectionModels> {
        if section >= SECTION_NUM {
            return None;
        }
        self.chunks.get(pos)?.models(section)
    }
}

fn floor_cell(p: Point3<f32>) -> Point3<i32> {
    Point3::new(p.x.floor() as i32, p.y.floor() as i32, p.z.floor() as i32)
}

/// Face of `hit` that faces `previous`, using the first axis on which they differ.
fn face_between(previous: Point3<i32>, hit: Point3<i32>) -> BlockSide {
    let d = previous - hit;
    let normal = if d.x != 0 {
        Vector3::new(d.x.signum(), 0, 0)
    } else if d.y != 0 {
        Vector3::new(0, d.y.signum(), 0)
    } else {
        Vector3::new(0, 0, d.z.signum())
    };
    BlockSide::from_normal(normal).unwrap_or(BlockSide::TOP)
}

/// Face a ray travelling along `direction` enters through: the one opposite its dominant axis.
fn entry_face_for(direction: Vector3<f32>) -> BlockSide {
    let (ax, ay, az) = (direction.x.abs(), direction.y.abs(), direction.z.abs());
    let axis = if ax >= ay && ax >= az {
        Vector3::new(direction.x.signum() as i32, 0, 0)
    } else if ay >= az {
        Vector3::new(0, direction.y.signum() as i32, 0)
    } else {
        Vector3::new(0, 0, direction.z.signum() as i32)
    };
    BlockSide::from_normal(axis).map_or(BlockSide::TOP, BlockSide::opposite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_light::BlockLight;
    use crate::engine_state::voxels::coordinates::MAX_HEIGHT;
    use crate::engine_state::voxels::land::FlatLandGenerator;

    const SURFACE: i32 = 50;

    fn config() -> WorldConfig {
        WorldConfig {
            preload_distance: 2,
            render_distance: 1,
            unload_distance: 3,
            loader_threads: 0,
            chunk_cache_capacity: 16,
            ..WorldConfig::default()
        }
    }

    fn flat_world() -> World {
        let generator = Arc::new(FlatLandGenerator::new(1, SURFACE).without_decoration());
        World::with_generator(config(), generator).unwrap()
    }

    fn settle(world: &mut World, centre: Point3<i32>) {
        for _ in 0..4 {
            world.update(centre);
        }
    }

    #[test]
    fn rejects_unordered_distances() {
        let generator = Arc::new(FlatLandGenerator::new(1, SURFACE));
        let config = WorldConfig {
            render_distance: 2,
            ..config()
        };
        assert!(matches!(
            World::with_generator(config, generator),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn loads_preload_square_nearest_first() {
        let mut world = flat_world();
        world.set_centre_position(ChunkPosition::new(0, 0));
        assert_eq!(world.chunk_state(ChunkPosition::new(2, -2)), ChunkState::Loading);
        assert_eq!(world.chunk_state(ChunkPosition::new(3, 0)), ChunkState::Unloaded);

        world.process_chunk_loader_messages();
        assert_eq!(world.chunks().len(), 25);
        assert_eq!(world.chunk_state(ChunkPosition::new(0, 0)), ChunkState::Dirty);

        // Generation seeds are waiting for the light pass.
        assert!(!world.is_settled());
        world.process_light_updates();
        assert!(world.is_settled());
    }

    #[test]
    fn remeshes_only_surrounded_chunks_in_range() {
        let mut world = flat_world();
        settle(&mut world, Point3::new(0, 60, 0));

        for x in -2..=2 {
            for z in -2..=2 {
                let pos = ChunkPosition::new(x, z);
                let meshed = world.section_models(pos, 3).is_some();
                assert_eq!(meshed, pos.distance(ChunkPosition::new(0, 0)) <= 1, "{:?}", pos);
            }
        }
        assert_eq!(world.chunk_state(ChunkPosition::new(0, 0)), ChunkState::Loaded);
        assert_eq!(world.section_models_in_render_range().count(), 9 * SECTION_NUM);

        // The surface section shows exactly one top face per column.
        let models = world.section_models(ChunkPosition::new(0, 0), 3).unwrap();
        assert_eq!(models.basic[0].quad_count(), 16 * 16);
    }

    #[test]
    fn set_block_validates_and_dirties_neighbours() {
        let mut world = flat_world();
        settle(&mut world, Point3::new(0, 60, 0));

        assert_eq!(
            world.set_block(0, MAX_HEIGHT, 0, BlockType::STONE),
            Err(WorldError::OutOfWorld { y: MAX_HEIGHT })
        );
        assert_eq!(
            world.set_block(1000, 10, 0, BlockType::STONE),
            Err(WorldError::ChunkNotLoaded(ChunkPosition::new(62, 0)))
        );

        world.set_block(15, SURFACE, 3, BlockType::AIR).unwrap();
        assert_eq!(world.get_block(15, SURFACE, 3).unwrap().block_type, BlockType::AIR);
        assert_eq!(world.chunks().get(ChunkPosition::new(0, 0)).unwrap().height(15, 3), SURFACE - 1);
        assert!(world.chunks().get(ChunkPosition::new(1, 0)).unwrap().is_section_dirty(3));
        assert!(world.chunks().get(ChunkPosition::new(0, 0)).unwrap().is_section_dirty(3));

        let before = world
            .section_models(ChunkPosition::new(1, 0), 3)
            .unwrap()
            .quad_count();
        world.process_light_updates();
        let rebuilt = world.process_model_updates();
        assert!(rebuilt.contains(&SectionKey {
            chunk: ChunkPosition::new(1, 0),
            section: 3
        }));
        let after = world
            .section_models(ChunkPosition::new(1, 0), 3)
            .unwrap()
            .quad_count();
        assert_eq!(after, before + 1);

        // The hole is lit from above.
        assert_eq!(world.get_block(15, SURFACE, 3).unwrap().light, BlockLight::SKY);
    }

    #[test]
    fn unloaded_chunks_come_back_from_cache() {
        let mut world = flat_world();
        settle(&mut world, Point3::new(0, 60, 0));
        world.set_block(-30, SURFACE, -30, BlockType::WOOD).unwrap();

        // Move far enough that chunk (-2, -2) passes the unload distance.
        settle(&mut world, Point3::new(40, 60, 40));
        assert_eq!(world.chunk_state(ChunkPosition::new(-2, -2)), ChunkState::Unloaded);
        assert!(world.get_block(-30, SURFACE, -30).is_none());
        assert!(world.cached_chunk_count() > 0);

        world.set_centre_position(ChunkPosition::new(0, 0));
        assert_eq!(world.get_block(-30, SURFACE, -30).unwrap().block_type, BlockType::WOOD);
    }

    #[test]
    fn late_results_are_discarded() {
        let mut world = flat_world();
        world.set_centre_position(ChunkPosition::new(0, 0));
        world.set_centre_position(ChunkPosition::new(100, 0));
        world.process_chunk_loader_messages();
        assert!(world.chunks().get(ChunkPosition::new(0, 0)).is_none());
        assert!(world.chunks().get(ChunkPosition::new(100, 0)).is_some());
        assert_eq!(world.chunks().len(), 25);
        assert_eq!(world.chunk_state(ChunkPosition::new(0, 0)), ChunkState::Unloaded);
    }

    #[test]
    fn pick_reports_entry_face() {
        let mut world = flat_world();
        settle(&mut world, Point3::new(0, 60, 0));
        let solid = |block: Block| block.block_type != BlockType::AIR;

        let down = world
            .pick_block(Point3::new(4.5, 55.5, 4.5), Vector3::new(0.0, -1.0, 0.0), 10.0, 0.01, solid)
            .unwrap();
        assert_eq!(down.position, Point3::new(4, SURFACE, 4));
        assert_eq!(down.face, BlockSide::TOP);
        assert_eq!(down.block.block_type, BlockType::GRASS_BOX);

        world.set_block(8, SURFACE + 1, 4, BlockType::STONE).unwrap();
        let sideways = world
            .pick_block(Point3::new(4.5, 51.5, 4.5), Vector3::new(1.0, 0.0, 0.0), 10.0, 0.01, solid)
            .unwrap();
        assert_eq!(sideways.position, Point3::new(8, SURFACE + 1, 4));
        assert_eq!(sideways.face, BlockSide::LEFT);

        let inside = world
            .pick_block(Point3::new(8.5, 51.5, 4.5), Vector3::new(0.0, 0.0, -2.0), 10.0, 0.01, solid)
            .unwrap();
        assert_eq!(inside.face, BlockSide::FRONT);

        assert!(world
            .pick_block(Point3::new(4.5, 55.5, 4.5), Vector3::new(0.0, 1.0, 0.0), 10.0, 0.01, solid)
            .is_none());
    }
}
