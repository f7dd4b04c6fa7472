//! Vertex data structures for voxel rendering.
//!
//! This module defines the vertex format produced by the block model builders.
//! The layout is plain old data so a renderer can upload a model's vertices
//! byte-for-byte with [`bytemuck::cast_slice`].

use cgmath::Vector3;

/// A vertex of a block model.
///
/// # Memory Layout
/// - Position: [f32; 3] (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
/// - Light Color: [f32; 3] (12 bytes)
/// - Sunlight: f32 (4 bytes)
///
/// Total size: 36 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position in world space
    pub position: [f32; 3],
    /// Atlas texture coordinates (normalized 0.0-1.0)
    pub tex_coords: [f32; 2],
    /// Block light reaching the vertex, per colour channel
    pub light_color: [f32; 3],
    /// Sunlight reaching the vertex
    pub sunlight: f32,
}

impl Vertex {
    /// Creates a new vertex.
    ///
    /// # Arguments
    /// * `position` - World space position
    /// * `tex_coords` - Atlas UV coordinates
    /// * `light` - Vertex light as `[r, g, b, sun]`
    pub fn new(position: Vector3<f32>, tex_coords: [f32; 2], light: [f32; 4]) -> Self {
        Vertex {
            position: position.into(),
            tex_coords,
            light_color: [light[0], light[1], light[2]],
            sunlight: light[3],
        }
    }
}
