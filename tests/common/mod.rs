#![allow(dead_code)]

use planar_mesh::prelude::*;

/// Structured triangulation of `[0, n]²` with unit cells, face geometry
/// computed and connectivity built.
pub fn unit_grid(n: usize) -> Mesh {
    let opts = MeshBuildOptions {
        boundary_group: Some("boundary".into()),
        build_connectivity: true,
    };
    let mut mesh = structured_triangles(n, n, [0.0, 0.0], [n as f64, n as f64], &opts)
        .expect("structured grid");
    compute_face_properties(&mut mesh).expect("face properties");
    mesh
}

/// Lower-right triangle of cell `(i, j)` in a grid with `n` cells per row.
pub fn lower_triangle(n: usize, i: usize, j: usize) -> ElementId {
    ElementId::new(2 * (j * n + i))
}

/// Upper-left triangle of cell `(i, j)`.
pub fn upper_triangle(n: usize, i: usize, j: usize) -> ElementId {
    ElementId::new(2 * (j * n + i) + 1)
}
