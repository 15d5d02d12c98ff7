//! Spatial index handle owned by the mesh.
//!
//! The mesh holds exactly one quadtree for its whole lifetime. Spatial queries
//! belong to the meshing front end; the container only creates the handle and
//! releases it when the mesh is dropped.

/// Opaque quadtree handle. Created empty with the mesh and dropped with it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuadTree {
    _root: (),
}

impl QuadTree {
    /// Creates an empty root branch.
    pub fn new() -> Self {
        Self::default()
    }
}
