//! Face normals, centroids and measures.

use crate::mesh_error::MeshError;
use crate::topology::ids::FaceId;
use crate::topology::mesh::{FaceInfo, Mesh};

/// Computes the geometry of every live face whose cache is not valid and
/// returns the number of faces computed.
///
/// In 2D the normal is the left normal `(-dy, dx) / len` of the edge
/// `nodes[0] → nodes[1]`, the centroid is the edge midpoint and the area is
/// the edge length. A second call without intervening edits computes nothing.
///
/// # Errors
/// - [`MeshError::NotSupported`] if a face needs computing and the mesh is
///   not 2D.
/// - [`MeshError::InvalidGeometry`] for faces that are not two-node edges or
///   have zero length.
pub fn compute_face_properties(mesh: &mut Mesh) -> Result<usize, MeshError> {
    let pending: Vec<FaceId> = mesh
        .live_faces()
        .filter(|&f| mesh.faces[f.index()].info().is_none())
        .collect();
    if pending.is_empty() {
        return Ok(0);
    }
    if mesh.dimension() != 2 {
        return Err(MeshError::NotSupported {
            operation: "face properties",
            dimension: mesh.dimension(),
        });
    }

    for &f in &pending {
        let info = edge_info(mesh, f)?;
        mesh.face_mut(f)?.set_info(info);
    }
    log::debug!("face properties computed for {} faces", pending.len());
    Ok(pending.len())
}

fn edge_info(mesh: &Mesh, f: FaceId) -> Result<FaceInfo, MeshError> {
    let [a, b] = match mesh.face(f)?.nodes() {
        &[a, b] => [a, b],
        nodes => {
            return Err(MeshError::InvalidGeometry(format!(
                "face {f} has {} nodes, expected 2",
                nodes.len()
            )));
        }
    };
    let p = mesh.coords().xy(a)?;
    let q = mesh.coords().xy(b)?;
    let (dx, dy) = (q[0] - p[0], q[1] - p[1]);
    let len = dx.hypot(dy);
    if len <= f64::EPSILON {
        return Err(MeshError::InvalidGeometry(format!("face {f} has zero length")));
    }
    Ok(FaceInfo {
        normal: [-dy / len, dx / len],
        centroid: [0.5 * (p[0] + q[0]), 0.5 * (p[1] + q[1])],
        area: len,
    })
}
