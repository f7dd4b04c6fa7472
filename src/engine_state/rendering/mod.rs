//! Geometry output of the voxel engine.
//!
//! This module turns voxel state into vertex and index buffers grouped by
//! renderer kind and texture-atlas slot. It does not talk to a GPU: window,
//! device, shader and draw submission live with whoever consumes the
//! [`meshing::ChunkSectionModels`] the world hands out.

pub mod meshing;
mod vertex;

// Re-export commonly used types
pub use vertex::Vertex;
