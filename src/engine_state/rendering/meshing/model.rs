//! Indexed triangle geometry.

use crate::engine_state::rendering::Vertex;

/// An indexed triangle list for one renderer and atlas slot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Model {
    /// The vertex data
    pub vertices: Vec<Vertex>,
    /// Triangle list indices into `vertices`
    pub indices: Vec<u32>,
}

impl Model {
    /// Creates an empty model.
    pub fn new() -> Self {
        Model {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// True if the model has no geometry.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of quads in the model.
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Appends vertices with indices relative to them.
    ///
    /// # Arguments
    /// * `vertices` - The vertices to append
    /// * `indices` - Indices into `vertices`, offset here by the existing vertex count
    pub fn add_vertices(&mut self, vertices: &[Vertex], indices: &[u32]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(vertices);
        self.indices.extend(indices.iter().map(|i| i + base));
    }

    /// Appends a quad as the two triangles `(0, 1, 2)` and `(0, 2, 3)`.
    pub fn add_quad(&mut self, quad: [Vertex; 4]) {
        self.add_vertices(&quad, &[0, 1, 2, 0, 2, 3]);
    }
}
