//! # Engine State Module
//!
//! The top-level state of the engine: the loaded world plus the edit requests
//! a player can make against it.
//!
//! ## Key Components
//!
//! * `EngineState` - Follows the camera and turns look rays into block edits
//! * `rendering` - Vertex layout and section meshing
//! * `task_management` - Worker pool for background work
//! * `voxels` - Voxel data, terrain generation, lighting and the world itself

use cgmath::{Point3, Vector3};
use log::debug;

use crate::config::EngineConfig;
use crate::error::{ConfigError, WorldError};
use voxels::block::{block_info::is_coverable, block_type::BlockType, Block};
use voxels::coordinates::camera_to_block;
use voxels::world::{BlockPick, SectionKey, World};

pub mod rendering;
pub mod task_management;
pub mod voxels;

/// How far the player can reach, in blocks.
pub const REACH_DISTANCE: f32 = 10.0;
/// Distance between samples along a look ray.
pub const PICK_STEP: f32 = 0.01;

/// The main state container of the engine.
pub struct EngineState {
    world: World,
}

impl EngineState {
    /// Creates the engine with an empty world.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Ok(EngineState {
            world: World::new(config.world)?,
        })
    }

    /// Wraps an existing world.
    pub fn with_world(world: World) -> Self {
        EngineState { world }
    }

    /// The loaded world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the loaded world.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Runs one world tick centred on the block containing the camera.
    ///
    /// # Returns
    /// The sections remeshed during this tick.
    pub fn update(&mut self, camera: Point3<f32>) -> Vec<SectionKey> {
        let centre = Point3::new(
            camera_to_block(camera.x),
            camera_to_block(camera.y),
            camera_to_block(camera.z),
        );
        self.world.update(centre)
    }

    /// The first block along the look ray that can be broken or built against.
    pub fn target_block(&self, origin: Point3<f32>, direction: Vector3<f32>) -> Option<BlockPick> {
        self.world
            .pick_block(origin, direction, REACH_DISTANCE, PICK_STEP, is_targetable)
    }

    /// Replaces the targeted block with air.
    ///
    /// # Returns
    /// The position of the broken block, or `None` if nothing is in reach.
    pub fn break_block(
        &mut self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
    ) -> Result<Option<Point3<i32>>, WorldError> {
        let Some(hit) = self.target_block(origin, direction) else {
            return Ok(None);
        };
        let p = hit.position;
        debug!("Breaking {:?} at {:?}", hit.block.block_type, p);
        self.world.set_block(p.x, p.y, p.z, BlockType::AIR)?;
        Ok(Some(p))
    }

    /// Places a block against the face of the targeted block.
    ///
    /// Nothing is placed when the cell across that face holds a block that
    /// cannot be covered.
    ///
    /// # Returns
    /// The position of the new block, or `None` if nothing was placed.
    pub fn place_block(
        &mut self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        block_type: BlockType,
    ) -> Result<Option<Point3<i32>>, WorldError> {
        let Some(hit) = self.target_block(origin, direction) else {
            return Ok(None);
        };
        let p = hit.position + hit.face.normal();
        let Some(current) = self.world.get_block(p.x, p.y, p.z) else {
            return Ok(None);
        };
        if !is_coverable(current.block_type) {
            return Ok(None);
        }
        debug!("Placing {:?} at {:?}", block_type, p);
        self.world.set_block(p.x, p.y, p.z, block_type)?;
        Ok(Some(p))
    }
}

fn is_targetable(block: Block) -> bool {
    block.block_type != BlockType::AIR && block.block_type != BlockType::WATER
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::WorldConfig;
    use crate::engine_state::voxels::land::FlatLandGenerator;

    const SURFACE: i32 = 50;

    fn engine() -> EngineState {
        let config = WorldConfig {
            preload_distance: 2,
            render_distance: 1,
            unload_distance: 3,
            loader_threads: 0,
            ..WorldConfig::default()
        };
        let generator = Arc::new(FlatLandGenerator::new(1, SURFACE).without_decoration());
        let mut engine = EngineState::with_world(World::with_generator(config, generator).unwrap());
        for _ in 0..4 {
            engine.update(Point3::new(4.5, 55.0, 4.5));
        }
        engine
    }

    #[test]
    fn camera_selects_centre_chunk() {
        let mut engine = engine();
        engine.update(Point3::new(-0.5, 55.0, 16.0));
        assert_eq!(
            engine.world().centre(),
            Some(voxels::coordinates::ChunkPosition::new(-1, 1))
        );
    }

    #[test]
    fn break_then_place_restores_surface() {
        let mut engine = engine();
        let origin = Point3::new(4.5, 55.5, 4.5);
        let down = Vector3::new(0.0, -1.0, 0.0);

        let broken = engine.break_block(origin, down).unwrap();
        assert_eq!(broken, Some(Point3::new(4, SURFACE, 4)));
        assert_eq!(engine.world().get_block(4, SURFACE, 4).unwrap().block_type, BlockType::AIR);

        // The ray now stops on the dirt below and builds on its top face.
        let placed = engine.place_block(origin, down, BlockType::STONE).unwrap();
        assert_eq!(placed, Some(Point3::new(4, SURFACE, 4)));
        assert_eq!(engine.world().get_block(4, SURFACE, 4).unwrap().block_type, BlockType::STONE);
    }

    #[test]
    fn nothing_in_reach() {
        let mut engine = engine();
        let up = Vector3::new(0.0, 1.0, 0.0);
        assert_eq!(engine.break_block(Point3::new(4.5, 55.5, 4.5), up).unwrap(), None);
        assert_eq!(
            engine
                .place_block(Point3::new(4.5, 55.5, 4.5), up, BlockType::STONE)
                .unwrap(),
            None
        );
    }

    #[test]
    fn water_is_not_a_target() {
        let mut engine = engine();
        engine.world_mut().set_block(4, SURFACE + 1, 4, BlockType::WATER).unwrap();
        let hit = engine
            .target_block(Point3::new(4.5, 55.5, 4.5), Vector3::new(0.0, -1.0, 0.0))
            .unwrap();
        assert_eq!(hit.position, Point3::new(4, SURFACE, 4));
    }
}
