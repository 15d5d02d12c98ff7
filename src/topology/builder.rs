//! Mesh construction from triangle lists.
//!
//! Faces are derived from element edges: each distinct edge becomes one face
//! whose `left` element is the first triangle that traverses it
//! counter-clockwise, and whose `right` element is the second triangle, if
//! any. Element neighbour and face arrays are filled in the same pass.

use hashbrown::HashMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::mesh_error::MeshError;
use crate::topology::connectivity::build_connectivity;
use crate::topology::ids::{ElementId, FaceId, NodeId};
use crate::topology::mesh::{FaceSide, Mesh};

/// Optional behaviour of the mesh builders.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshBuildOptions {
    /// When set, boundary faces are collected in a group of this name.
    pub boundary_group: Option<String>,
    /// When set, node incidence maps are built before returning.
    pub build_connectivity: bool,
}

fn invalid_geometry(message: impl Into<String>) -> MeshError {
    MeshError::InvalidGeometry(message.into())
}

fn signed_area(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    0.5 * ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1]))
}

/// Builds a 2D mesh from node coordinates and triangles given as node
/// indices. Clockwise triangles are reoriented.
///
/// # Errors
/// [`MeshError::InvalidGeometry`] for out-of-range indices, degenerate
/// triangles or edges shared by more than two triangles.
pub fn triangle_mesh(
    coords: &[[f64; 2]],
    triangles: &[[usize; 3]],
    options: &MeshBuildOptions,
) -> Result<Mesh, MeshError> {
    let mut mesh = Mesh::with_dimension(2);
    let nodes: Vec<NodeId> = coords
        .iter()
        .map(|c| mesh.add_node(c))
        .collect::<Result<_, _>>()?;

    for (t, tri) in triangles.iter().enumerate() {
        let [a, b, c] = *tri;
        let corner = |i: usize| {
            coords.get(i).copied().ok_or_else(|| {
                invalid_geometry(format!("triangle {t} references missing node {i}"))
            })
        };
        let area = signed_area(corner(a)?, corner(b)?, corner(c)?);
        if area.abs() <= f64::EPSILON {
            return Err(invalid_geometry(format!("triangle {t} is degenerate")));
        }
        let ordered = if area > 0.0 { [a, b, c] } else { [a, c, b] };
        mesh.add_element(&ordered.map(|i| nodes[i]))?;
    }

    let mut edge_faces: HashMap<(NodeId, NodeId), FaceId> = HashMap::new();
    let mut element_faces: Vec<Vec<FaceId>> = Vec::with_capacity(triangles.len());
    for e in 0..mesh.n_elements() {
        let element = ElementId::new(e);
        let element_nodes = mesh.element(element)?.nodes().to_vec();
        let mut faces = Vec::with_capacity(element_nodes.len());
        for (&p, &q) in element_nodes.iter().circular_tuple_windows() {
            let key = (p.min(q), p.max(q));
            let face = match edge_faces.get(&key) {
                None => {
                    let face = mesh.add_face(&[p, q], Some(element), None)?;
                    edge_faces.insert(key, face);
                    face
                }
                Some(&face) => {
                    let shared = mesh.face_mut(face)?;
                    if shared.right().is_some() {
                        return Err(invalid_geometry(format!(
                            "edge ({p}, {q}) is shared by more than two triangles"
                        )));
                    }
                    shared.set_element(FaceSide::Right, Some(element));
                    face
                }
            };
            faces.push(face);
        }
        element_faces.push(faces);
    }

    for (e, faces) in element_faces.into_iter().enumerate() {
        let element = ElementId::new(e);
        let neighbors = faces
            .iter()
            .map(|&f| {
                let face = mesh.face(f)?;
                Ok(if face.left() == Some(element) {
                    face.right()
                } else {
                    face.left()
                })
            })
            .collect::<Result<Vec<_>, MeshError>>()?;
        mesh.set_adjacency(element, faces, neighbors)?;
    }

    if let Some(name) = &options.boundary_group {
        let boundary: Vec<FaceId> = mesh
            .live_faces()
            .filter(|&f| mesh.faces[f.index()].is_boundary())
            .collect();
        mesh.add_boundary_group(name, boundary)?;
    }
    if options.build_connectivity {
        build_connectivity(&mut mesh)?;
    }
    Ok(mesh)
}

/// Structured triangulation of the box `[min, max]` with `nx`×`ny` cells,
/// each split along its `v0 → v2` diagonal.
pub fn structured_triangles(
    nx: usize,
    ny: usize,
    min: [f64; 2],
    max: [f64; 2],
    options: &MeshBuildOptions,
) -> Result<Mesh, MeshError> {
    if nx == 0 || ny == 0 {
        return Err(invalid_geometry("nx and ny must be positive"));
    }
    let dx = (max[0] - min[0]) / nx as f64;
    let dy = (max[1] - min[1]) / ny as f64;
    let mut coords = Vec::with_capacity((nx + 1) * (ny + 1));
    for j in 0..=ny {
        let y = min[1] + dy * j as f64;
        for i in 0..=nx {
            coords.push([min[0] + dx * i as f64, y]);
        }
    }

    let row_stride = nx + 1;
    let mut triangles = Vec::with_capacity(2 * nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            let v0 = j * row_stride + i;
            let v1 = v0 + 1;
            let v3 = v0 + row_stride;
            let v2 = v3 + 1;
            triangles.push([v0, v1, v2]);
            triangles.push([v0, v2, v3]);
        }
    }
    triangle_mesh(&coords, &triangles, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug_invariants::DebugInvariants;

    #[test]
    fn shared_edge_has_two_sides() {
        let coords = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let mesh = triangle_mesh(&coords, &[[0, 1, 2], [0, 2, 3]], &MeshBuildOptions::default())
            .unwrap();
        assert_eq!(mesh.n_faces(), 5);
        let e0 = mesh.element(ElementId::new(0)).unwrap();
        let e1 = mesh.element(ElementId::new(1)).unwrap();
        // edge 2 of e0 is (2, 0), edge 0 of e1 is (0, 2)
        assert_eq!(e0.faces()[2], e1.faces()[0]);
        assert_eq!(e0.neighbors(), &[None, None, Some(ElementId::new(1))]);
        assert_eq!(e1.neighbors(), &[Some(ElementId::new(0)), None, None]);
        let diag = mesh.face(e0.faces()[2]).unwrap();
        assert_eq!(diag.left(), Some(ElementId::new(0)));
        assert_eq!(diag.right(), Some(ElementId::new(1)));
        assert!(mesh.validate_invariants().is_ok());
    }

    #[test]
    fn clockwise_input_is_reoriented() {
        let coords = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        let mesh = triangle_mesh(&coords, &[[0, 2, 1]], &MeshBuildOptions::default()).unwrap();
        let nodes: Vec<usize> = mesh
            .element(ElementId::new(0))
            .unwrap()
            .nodes()
            .iter()
            .map(|n| n.index())
            .collect();
        assert_eq!(nodes, vec![0, 1, 2]);
    }

    #[test]
    fn bad_input_is_rejected() {
        let coords = [[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [0.0, 1.0]];
        let opts = MeshBuildOptions::default();
        assert!(matches!(
            triangle_mesh(&coords, &[[0, 1, 2]], &opts),
            Err(MeshError::InvalidGeometry(_))
        ));
        assert!(matches!(
            triangle_mesh(&coords, &[[0, 1, 7]], &opts),
            Err(MeshError::InvalidGeometry(_))
        ));
        let fan = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, -1.0], [1.0, 1.0]];
        assert!(matches!(
            triangle_mesh(&fan, &[[0, 1, 2], [0, 3, 1], [0, 1, 4]], &opts),
            Err(MeshError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn structured_box_counts() {
        let opts = MeshBuildOptions {
            boundary_group: Some("boundary".into()),
            build_connectivity: true,
        };
        let mesh = structured_triangles(3, 2, [0.0, 0.0], [3.0, 2.0], &opts).unwrap();
        assert_eq!(mesh.n_nodes(), 12);
        assert_eq!(mesh.n_elements(), 12);
        // horizontal 3*3 + vertical 4*2 + diagonals 6
        assert_eq!(mesh.n_faces(), 23);
        assert_eq!(mesh.boundary_groups()[0].faces.len(), 10);
        assert_eq!(mesh.node_elements(NodeId::new(0)).unwrap().len(), 2);
    }
}
