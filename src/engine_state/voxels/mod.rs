//! # Voxel World
//!
//! Everything that describes the voxel world itself, independent of how it
//! is drawn.
//!
//! ## Architecture
//!
//! * **Coordinates**: Conversions between world, chunk and section space
//! * **Block**: Block types, their static properties, light and faces
//! * **Chunk**: A 16 x 128 x 16 column of blocks split into eight sections
//! * **Land**: Terrain generators that fill fresh chunks
//! * **Lighting**: Flood-fill propagation of coloured light and sunlight
//! * **Tasks**: Chunk generation work sent to the worker pool
//! * **World**: Owns the loaded chunks and drives loading, light and meshing
//!
//! ## Data Flow
//!
//! 1. The world moves its centre and requests missing chunks
//! 2. Workers generate terrain and report the columns that need lighting
//! 3. Light spreads across chunk borders and dirties the sections it touches
//! 4. Dirty sections of fully surrounded chunks are remeshed

pub mod block;
pub mod chunk;
pub mod coordinates;
pub mod land;
pub mod lighting;
pub mod tasks;
pub mod world;
