//! Point location by walking across element faces.
//!
//! Starting from a given element, the walk casts the segment from the query
//! point to the element centroid and crosses the first face (in the element's
//! local face order) that the segment intersects. It stops when no face is
//! crossed, in which case the point is inside the current element, or when the
//! crossed face lies on the domain boundary.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use super::predicates::{
    GeometryTolerances, edges_intersect_with, element_centroid, point_in_element_with,
};
use crate::mesh_error::MeshError;
use crate::topology::ids::ElementId;
use crate::topology::mesh::Mesh;

/// Result of a point-location walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    /// The point lies strictly inside this element.
    Inside(ElementId),
    /// The walk left the mesh through a boundary face of `last`.
    Outside {
        /// Last element visited before reaching the boundary.
        last: ElementId,
    },
}

impl Location {
    /// Element containing the point, if it was found inside the mesh.
    pub fn element(self) -> Option<ElementId> {
        match self {
            Location::Inside(e) => Some(e),
            Location::Outside { .. } => None,
        }
    }
}

/// Tunables of [`locate_with`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LocateOptions {
    /// Maximum number of elements visited. `None` uses the number of
    /// elements in the mesh.
    pub max_steps: Option<usize>,
    /// Tolerances of the intersection and containment tests.
    pub tolerances: GeometryTolerances,
}

/// Locates `coord` starting from `start` with default options.
pub fn locate(mesh: &Mesh, start: ElementId, coord: [f64; 2]) -> Result<Location, MeshError> {
    locate_with(mesh, start, coord, &LocateOptions::default())
}

/// Locates `coord` starting from `start`.
///
/// Requires valid face geometry (see
/// [`compute_face_properties`](super::face::compute_face_properties)) and
/// element face/neighbour arrays.
///
/// # Errors
/// - [`MeshError::SearchBoundExceeded`] if the walk revisits an element or
///   visits more than `max_steps` elements. A point lying on an interior edge
///   or vertex ends this way.
/// - [`MeshError::Logic`] if no face is crossed yet the point is not inside
///   the element, as for a point within the containment tolerance of a face.
/// - Lookup and geometry errors from the mesh.
pub fn locate_with(
    mesh: &Mesh,
    start: ElementId,
    coord: [f64; 2],
    options: &LocateOptions,
) -> Result<Location, MeshError> {
    let max_steps = options.max_steps.unwrap_or(mesh.n_elements());
    let tol = &options.tolerances;
    let mut visited = HashSet::new();
    let mut current = start;

    loop {
        if visited.len() >= max_steps || !visited.insert(current) {
            return Err(MeshError::SearchBoundExceeded {
                start,
                steps: visited.len(),
            });
        }
        let element = mesh.element(current)?;
        let [cx, cy] = element_centroid(mesh, current)?;
        let ray = [coord[0], coord[1], cx, cy];

        let mut crossed = None;
        for (i, &f) in element.faces().iter().enumerate() {
            let nodes = mesh.face(f)?.nodes();
            if nodes.len() < 2 {
                return Err(MeshError::InvalidGeometry(format!(
                    "face {f} has {} nodes, expected 2",
                    nodes.len()
                )));
            }
            let [x0, y0] = mesh.coords().xy(nodes[0])?;
            let [x1, y1] = mesh.coords().xy(nodes[1])?;
            if edges_intersect_with(ray, [x0, y0, x1, y1], tol).is_some() {
                crossed = Some(i);
                break;
            }
        }

        match crossed {
            Some(i) => match element.neighbors().get(i).copied().flatten() {
                Some(next) => {
                    log::debug!("locate: {current} -> {next} across local face {i}");
                    current = next;
                }
                None => return Ok(Location::Outside { last: current }),
            },
            None => {
                return if point_in_element_with(mesh, current, coord, tol)? {
                    Ok(Location::Inside(current))
                } else {
                    Err(MeshError::Logic(format!(
                        "no face of element {current} separates ({}, {}) yet it is not inside",
                        coord[0], coord[1]
                    )))
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::face::compute_face_properties;
    use crate::topology::builder::{MeshBuildOptions, structured_triangles};

    fn grid() -> Mesh {
        let opts = MeshBuildOptions::default();
        let mut mesh = structured_triangles(4, 4, [0.0, 0.0], [4.0, 4.0], &opts).unwrap();
        compute_face_properties(&mut mesh).unwrap();
        mesh
    }

    #[test]
    fn start_element_contains_point() {
        let mesh = grid();
        // element 0 is the lower-right triangle of the first cell
        assert_eq!(
            locate(&mesh, ElementId::new(0), [0.7, 0.2]).unwrap(),
            Location::Inside(ElementId::new(0))
        );
    }

    #[test]
    fn walk_reaches_far_cell() {
        let mesh = grid();
        let found = locate(&mesh, ElementId::new(0), [3.7, 3.2]).unwrap();
        let e = found.element().unwrap();
        // lower-right triangle of cell (3, 3)
        assert_eq!(e, ElementId::new(2 * (3 * 4 + 3)));
    }

    #[test]
    fn point_outside_domain_stops_at_boundary() {
        let mesh = grid();
        match locate(&mesh, ElementId::new(0), [5.5, 0.5]).unwrap() {
            Location::Outside { last } => {
                let element = mesh.element(last).unwrap();
                assert!(element.neighbors().iter().any(Option::is_none));
            }
            other => panic!("expected Outside, got {other:?}"),
        }
    }

    #[test]
    fn step_bound_is_enforced() {
        let mesh = grid();
        let options = LocateOptions {
            max_steps: Some(1),
            ..LocateOptions::default()
        };
        assert!(matches!(
            locate_with(&mesh, ElementId::new(0), [3.7, 3.2], &options),
            Err(MeshError::SearchBoundExceeded { steps: 1, .. })
        ));
    }
}
