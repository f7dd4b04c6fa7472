//! # Light Propagation
//!
//! Flood-fill lighting across the loaded chunks of a [`ChunkMap`].
//!
//! Light has four channels: red, green and blue from emitting blocks, and sun
//! from the sky. Each channel spreads independently. Entering a transparent
//! block costs that block's attenuation. Sunlight at full strength falls
//! straight down through air at no cost.
//!
//! The propagator keeps two work queues, both in world coordinates:
//!
//! * the **raise** queue holds voxels whose light may brighten their neighbours;
//! * the **removal** queue holds voxels whose previous light has to be withdrawn
//!   from everything that depended on it.
//!
//! [`LightPropagator::process`] drains removal first, then raise. Every voxel
//! whose light changes dirties the sections whose meshes sample it.

use std::collections::VecDeque;

use cgmath::{Point3, Vector3};

use super::block::{
    block_info::block_info,
    block_light::{BlockLight, LIGHT_CHANNEL_COUNT, LIGHT_COMPONENT_MAX, SUN_CHANNEL},
    block_side::BlockSide,
    block_type::BlockType,
};
use super::chunk::chunk_map::ChunkMap;
use super::coordinates::{local_to_world, ChunkPosition, LocalPosition, MAX_HEIGHT, SECTION_SIZE};

/// Offset from a voxel to the one below it.
const DOWN: Vector3<i32> = Vector3::new(0, -1, 0);

/// Pending light work for the loaded world.
#[derive(Default)]
pub struct LightPropagator {
    raise_queue: VecDeque<Point3<i32>>,
    removal_queue: VecDeque<(Point3<i32>, BlockLight)>,
}

impl LightPropagator {
    /// Creates a propagator with empty queues.
    pub fn new() -> Self {
        LightPropagator {
            raise_queue: VecDeque::new(),
            removal_queue: VecDeque::new(),
        }
    }

    /// Queues a voxel to spread its light.
    pub fn enqueue(&mut self, pos: Point3<i32>) {
        self.raise_queue.push_back(pos);
    }

    /// Queues many voxels to spread their light.
    pub fn enqueue_all(&mut self, positions: impl IntoIterator<Item = Point3<i32>>) {
        self.raise_queue.extend(positions);
    }

    /// Number of queued voxels, removals included.
    pub fn pending(&self) -> usize {
        self.raise_queue.len() + self.removal_queue.len()
    }

    /// True if there is no queued work.
    pub fn is_idle(&self) -> bool {
        self.raise_queue.is_empty() && self.removal_queue.is_empty()
    }

    /// Queues the lit voxels along the borders a freshly loaded chunk shares
    /// with its loaded neighbours, on both sides of each border.
    pub fn enqueue_chunk_borders(&mut self, chunks: &ChunkMap, pos: ChunkPosition) {
        // (neighbour offset, this chunk's edge column, neighbour's facing column)
        let borders: [((i32, i32), fn(usize) -> (usize, usize), fn(usize) -> (usize, usize)); 4] = [
            ((1, 0), |i| (last_index(), i), |i| (0, i)),
            ((-1, 0), |i| (0, i), |i| (last_index(), i)),
            ((0, 1), |i| (i, last_index()), |i| (i, 0)),
            ((0, -1), |i| (i, 0), |i| (i, last_index())),
        ];

        for ((dx, dz), own_column, facing_column) in borders {
            let neighbour = pos.offset(dx, dz);
            if !chunks.contains(neighbour) {
                continue;
            }
            for i in 0..=last_index() {
                self.enqueue_lit_column(chunks, pos, own_column(i));
                self.enqueue_lit_column(chunks, neighbour, facing_column(i));
            }
        }
    }

    fn enqueue_lit_column(&mut self, chunks: &ChunkMap, pos: ChunkPosition, (x, z): (usize, usize)) {
        let Some(chunk) = chunks.get(pos) else {
            return;
        };
        for y in 0..MAX_HEIGHT as usize {
            if block_info(chunk.block_type(x, y, z)).opaque || chunk.light(x, y, z).is_dark() {
                continue;
            }
            self.raise_queue.push_back(local_to_world(pos, LocalPosition { x, y, z }));
        }
    }

    /// Re-lights a voxel whose block type just changed.
    ///
    /// `old_light` is the light the voxel had before the change. The voxel gets
    /// its new block's emission (plus full sun on the top layer), the old light is
    /// queued for removal, and the voxel and its neighbours are queued to refill.
    pub fn block_changed(&mut self, chunks: &mut ChunkMap, pos: Point3<i32>, old_light: BlockLight) {
        let Some(block) = chunks.block_at(pos) else {
            return;
        };
        let info = block_info(block.block_type);
        let mut light = info.emission_light();
        if !info.opaque && pos.y == MAX_HEIGHT - 1 {
            light = light.with(SUN_CHANNEL, LIGHT_COMPONENT_MAX);
        }
        if light != block.light {
            chunks.set_light_at(pos, light);
            chunks.mark_context_dirty(pos);
        }

        if !old_light.is_dark() {
            self.removal_queue.push_back((pos, old_light));
        }
        self.raise_queue.push_back(pos);
        for side in BlockSide::all() {
            self.raise_queue.push_back(pos + side.normal());
        }
    }

    /// Runs queued work until both queues are empty.
    ///
    /// # Returns
    /// The number of voxels whose light changed.
    pub fn process(&mut self, chunks: &mut ChunkMap) -> usize {
        let mut changed = 0;
        while let Some((pos, removed)) = self.removal_queue.pop_front() {
            changed += self.remove_from(chunks, pos, removed);
        }
        while let Some(pos) = self.raise_queue.pop_front() {
            changed += self.raise_from(chunks, pos);
        }
        changed
    }

    /// Spreads the light of `pos` into its neighbours.
    fn raise_from(&mut self, chunks: &mut ChunkMap, pos: Point3<i32>) -> usize {
        let Some(source) = chunks.block_at(pos) else {
            return 0;
        };
        let light = source.light;
        if light.is_dark() {
            return 0;
        }

        let mut changed = 0;
        for side in BlockSide::all() {
            let offset = side.normal();
            let n = pos + offset;
            let Some(target) = chunks.block_at(n) else {
                continue;
            };
            let info = block_info(target.block_type);
            if info.opaque {
                continue;
            }

            let mut raised = target.light;
            for channel in 0..LIGHT_CHANNEL_COUNT {
                let mut candidate = light.get(channel).saturating_sub(info.light_attenuation);
                if channel == SUN_CHANNEL
                    && offset == DOWN
                    && light.sun() == LIGHT_COMPONENT_MAX
                    && target.block_type == BlockType::AIR
                {
                    candidate = LIGHT_COMPONENT_MAX;
                }
                if candidate > raised.get(channel) {
                    raised = raised.with(channel, candidate);
                }
            }

            if raised != target.light {
                chunks.set_light_at(n, raised);
                chunks.mark_context_dirty(n);
                self.raise_queue.push_back(n);
                changed += 1;
            }
        }
        changed
    }

    /// Withdraws `removed` from the neighbours of `pos` that were lit by it.
    ///
    /// A neighbour channel dimmer than the removed value (or sun falling straight
    /// down at full strength) depended on it and is cleared, continuing the
    /// removal from there. Brighter neighbours have another source and are
    /// queued to relight the cleared region.
    fn remove_from(&mut self, chunks: &mut ChunkMap, pos: Point3<i32>, removed: BlockLight) -> usize {
        let mut changed = 0;
        for side in BlockSide::all() {
            let offset = side.normal();
            let n = pos + offset;
            let Some(target) = chunks.block_at(n) else {
                continue;
            };

            let mut cleared = target.light;
            let mut withdrawn = BlockLight::DARK;
            let mut relight = false;
            for channel in 0..LIGHT_CHANNEL_COUNT {
                let removed_value = removed.get(channel);
                let value = target.light.get(channel);
                if removed_value == 0 || value == 0 {
                    continue;
                }
                let falling_sun = channel == SUN_CHANNEL
                    && offset == DOWN
                    && removed_value == LIGHT_COMPONENT_MAX
                    && value == LIGHT_COMPONENT_MAX;
                if value < removed_value || falling_sun {
                    cleared = cleared.with(channel, 0);
                    withdrawn = withdrawn.with(channel, value);
                } else {
                    relight = true;
                }
            }

            if cleared != target.light {
                let emission = block_info(target.block_type).emission_light();
                let restored = cleared.max(emission);
                if restored != cleared {
                    relight = true;
                }
                chunks.set_light_at(n, restored);
                chunks.mark_context_dirty(n);
                self.removal_queue.push_back((n, withdrawn));
                changed += 1;
            }
            if relight {
                self.raise_queue.push_back(n);
            }
        }
        changed
    }
}

#[inline]
fn last_index() -> usize {
    SECTION_SIZE as usize - 1
}
