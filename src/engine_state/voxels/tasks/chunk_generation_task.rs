//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask`, which fills a new chunk on
//! a worker thread. It is scheduled when the centre of the loaded area moves
//! and a chunk comes within preload distance.

use std::sync::Arc;

use cgmath::Point3;

use crate::engine_state::{
    task_management::task::Task,
    voxels::{chunk::Chunk, coordinates::ChunkPosition, land::LandGenerator},
};

/// A task that generates chunk data asynchronously.
///
/// The task owns everything it needs: the target position and a shared,
/// immutable generator. Loaded chunks are never visible to workers.
pub struct ChunkGenerationTask {
    /// The position of the chunk to generate
    position: ChunkPosition,
    /// Terrain source shared by all generation tasks
    generator: Arc<dyn LandGenerator>,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the chunk to generate
    /// * `generator` - The world's terrain generator
    pub fn new(position: ChunkPosition, generator: Arc<dyn LandGenerator>) -> Self {
        ChunkGenerationTask {
            position,
            generator,
        }
    }

    /// The position of the chunk this task generates.
    pub fn position(&self) -> ChunkPosition {
        self.position
    }
}

/// The output of a chunk generation task.
pub struct GeneratedChunk {
    /// The filled chunk
    pub chunk: Chunk,
    /// World positions whose light must spread once the chunk is in the world
    pub light_updates: Vec<Point3<i32>>,
}

impl Task for ChunkGenerationTask {
    type Output = GeneratedChunk;

    /// Generates the chunk.
    fn process(&self) -> GeneratedChunk {
        let mut chunk = Chunk::new(self.position);
        let light_updates = self.generator.generate_land(&mut chunk);
        GeneratedChunk {
            chunk,
            light_updates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::land::FlatLandGenerator;

    #[test]
    fn generates_requested_chunk() {
        let generator: Arc<dyn LandGenerator> = Arc::new(FlatLandGenerator::new(3, 45));
        let task = ChunkGenerationTask::new(ChunkPosition::new(-4, 9), generator);
        let generated = task.process();
        assert_eq!(generated.chunk.position(), ChunkPosition::new(-4, 9));
        assert!(!generated.light_updates.is_empty());
        assert!(generated
            .light_updates
            .iter()
            .all(|p| (-64..-48).contains(&p.x) && (144..160).contains(&p.z)));
    }
}
