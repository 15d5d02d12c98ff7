//! Half-plane containment and segment intersection in 2D.
//!
//! # Conventions
//! Segments are passed as four flat coordinates `[xa, ya, xb, yb]`. Face
//! normals point to the left of the face (`nodes[0] → nodes[1]`), so for the
//! element on the face's left the normal points inwards.

use serde::{Deserialize, Serialize};

use crate::mesh_error::MeshError;
use crate::topology::ids::ElementId;
use crate::topology::mesh::Mesh;

/// Numerical tolerances of the geometric predicates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeometryTolerances {
    /// A point counts as strictly inside a half-plane when its signed
    /// distance exceeds this value.
    pub containment: f64,
    /// Segments whose system determinant is at most this value in magnitude
    /// are treated as parallel.
    pub parallel: f64,
}

impl Default for GeometryTolerances {
    fn default() -> Self {
        Self {
            containment: 1.0e-6,
            parallel: 1.0e-7,
        }
    }
}

/// Intersection point of segments `a` and `b`, or `None` if they are
/// (nearly) parallel or do not cross within both segments.
pub fn edges_intersect(a: [f64; 4], b: [f64; 4]) -> Option<[f64; 2]> {
    edges_intersect_with(a, b, &GeometryTolerances::default())
}

/// [`edges_intersect`] with explicit tolerances.
pub fn edges_intersect_with(
    a: [f64; 4],
    b: [f64; 4],
    tol: &GeometryTolerances,
) -> Option<[f64; 2]> {
    let [xa0, ya0, xa1, ya1] = a;
    let [xb0, yb0, xb1, yb1] = b;

    // qsi0 * (a1 - a0) - qsi1 * (b1 - b0) = b0 - a0
    let m11 = xa1 - xa0;
    let m12 = xb0 - xb1;
    let m21 = ya1 - ya0;
    let m22 = yb0 - yb1;
    let det = m11 * m22 - m21 * m12;
    if det.abs() <= tol.parallel {
        return None;
    }

    let b0 = xb0 - xa0;
    let b1 = yb0 - ya0;
    let qsi0 = (m22 * b0 - m12 * b1) / det;
    let qsi1 = (-m21 * b0 + m11 * b1) / det;

    let within = |q: f64| (0.0..=1.0).contains(&q);
    if within(qsi0) && within(qsi1) {
        Some([
            xa0 * (1.0 - qsi0) + xa1 * qsi0,
            ya0 * (1.0 - qsi0) + ya1 * qsi0,
        ])
    } else {
        None
    }
}

/// Returns `true` if `coord` lies strictly inside `element`.
///
/// The point is inside when it lies on the inner side of every bounding face,
/// so the count of satisfied half-planes must equal the element's face count
/// (three for the triangles produced by the mesh builders).
///
/// # Errors
/// - [`MeshError::NotSupported`] for meshes that are not 2D.
/// - [`MeshError::StaleFaceGeometry`] if a bounding face has no valid
///   geometry; run [`compute_face_properties`](super::face::compute_face_properties).
/// - [`MeshError::Logic`] if the element has no faces.
pub fn point_in_element(
    mesh: &Mesh,
    element: ElementId,
    coord: [f64; 2],
) -> Result<bool, MeshError> {
    point_in_element_with(mesh, element, coord, &GeometryTolerances::default())
}

/// [`point_in_element`] with explicit tolerances.
pub fn point_in_element_with(
    mesh: &Mesh,
    element: ElementId,
    coord: [f64; 2],
    tol: &GeometryTolerances,
) -> Result<bool, MeshError> {
    if mesh.dimension() != 2 {
        return Err(MeshError::NotSupported {
            operation: "point in element",
            dimension: mesh.dimension(),
        });
    }
    let elem = mesh.element(element)?;
    if elem.faces().is_empty() {
        return Err(MeshError::Logic(format!("element {element} has no faces")));
    }
    let mut inner = 0;
    for &f in elem.faces() {
        let face = mesh.face(f)?;
        let info = face.info().ok_or(MeshError::StaleFaceGeometry(f))?;
        let sign = face.side_of(element).sign();
        let proj = sign
            * (info.normal[0] * (coord[0] - info.centroid[0])
                + info.normal[1] * (coord[1] - info.centroid[1]));
        if proj > tol.containment {
            inner += 1;
        }
    }
    Ok(inner == elem.faces().len())
}

/// Mean of the node coordinates of `element`.
pub fn element_centroid(mesh: &Mesh, element: ElementId) -> Result<[f64; 2], MeshError> {
    let elem = mesh.element(element)?;
    let n = elem.n_nodes();
    if n == 0 {
        return Err(MeshError::Logic(format!("element {element} has no nodes")));
    }
    let mut c = [0.0; 2];
    for &node in elem.nodes() {
        let [x, y] = mesh.coords().xy(node)?;
        c[0] += x;
        c[1] += y;
    }
    Ok([c[0] / n as f64, c[1] / n as f64])
}
