mod common;

use approx::assert_relative_eq;
use planar_mesh::prelude::*;
use planar_mesh::topology::FaceGeometry;

fn right_triangle() -> Result<Mesh, MeshError> {
    let coords = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
    let mut mesh = triangle_mesh(&coords, &[[0, 1, 2]], &MeshBuildOptions::default())?;
    compute_face_properties(&mut mesh)?;
    Ok(mesh)
}

#[test]
fn point_in_reference_triangle() -> Result<(), MeshError> {
    let mesh = right_triangle()?;
    let e = ElementId::new(0);
    assert!(point_in_element(&mesh, e, [0.25, 0.25])?);
    assert!(!point_in_element(&mesh, e, [0.75, 0.75])?);
    assert!(!point_in_element(&mesh, e, [-0.1, 0.1])?);
    // on an edge is not strictly inside
    assert!(!point_in_element(&mesh, e, [0.5, 0.0])?);
    Ok(())
}

#[test]
fn containment_from_the_right_side_of_shared_faces() -> Result<(), MeshError> {
    let mesh = common::unit_grid(2);
    let upper = common::upper_triangle(2, 0, 0);
    // the diagonal of cell (0, 0) is owned on its left by the lower triangle
    assert!(point_in_element(&mesh, upper, [0.2, 0.7])?);
    assert!(!point_in_element(&mesh, upper, [0.7, 0.2])?);
    Ok(())
}

#[test]
fn diagonals_meet_in_the_middle() {
    let p = edges_intersect([0.0, 0.0, 1.0, 1.0], [0.0, 1.0, 1.0, 0.0]).expect("diagonals cross");
    assert_relative_eq!(p[0], 0.5, epsilon = 1e-12);
    assert_relative_eq!(p[1], 0.5, epsilon = 1e-12);
}

#[test]
fn parallel_and_disjoint_segments() {
    assert!(edges_intersect([0.0, 0.0, 1.0, 0.0], [0.0, 1.0, 1.0, 1.0]).is_none());
    assert!(edges_intersect([0.0, 0.0, 1.0, 1.0], [2.0, 2.0, 3.0, 3.0]).is_none());
    assert!(edges_intersect([0.0, 0.0, 1.0, 0.0], [0.5, 0.1, 0.5, 2.0]).is_none());
}

#[test]
fn face_properties_are_idempotent() -> Result<(), MeshError> {
    let opts = MeshBuildOptions::default();
    let mut mesh = structured_triangles(3, 2, [0.0, 0.0], [3.0, 2.0], &opts)?;
    assert_eq!(compute_face_properties(&mut mesh)?, mesh.n_faces());
    let first: Vec<FaceGeometry> = (0..mesh.n_faces())
        .map(|f| mesh.face(FaceId::new(f)).map(|face| face.geometry()))
        .collect::<Result<_, _>>()?;
    assert_eq!(compute_face_properties(&mut mesh)?, 0);
    for (f, before) in first.iter().enumerate() {
        assert_eq!(mesh.face(FaceId::new(f))?.geometry(), *before);
    }
    Ok(())
}

#[test]
fn normals_are_unit_and_point_into_left_element() -> Result<(), MeshError> {
    let mesh = common::unit_grid(3);
    for f in mesh.live_faces() {
        let face = mesh.face(f)?;
        let info = face.info().ok_or(MeshError::StaleFaceGeometry(f))?;
        assert_relative_eq!(info.normal[0].hypot(info.normal[1]), 1.0, epsilon = 1e-12);
        if let Some(left) = face.left() {
            let c = element_centroid(&mesh, left)?;
            let side = info.normal[0] * (c[0] - info.centroid[0])
                + info.normal[1] * (c[1] - info.centroid[1]);
            assert!(side > 0.0, "face {f} normal points away from {left}");
        }
    }
    Ok(())
}

#[test]
fn moved_node_refreshes_only_its_faces() -> Result<(), MeshError> {
    let mut mesh = common::unit_grid(2);
    let center = NodeId::new(4);
    mesh.node_coords_mut(center)?.copy_from_slice(&[1.2, 0.9]);
    let touched = mesh.invalidate_faces_at_node(center)?;
    assert_eq!(touched, 6);
    assert_eq!(compute_face_properties(&mut mesh)?, 6);

    let faces: Vec<FaceId> = mesh
        .node_faces(center)
        .map(|set| set.iter().collect())
        .unwrap_or_default();
    for f in faces {
        let face = mesh.face(f)?;
        let info = face.info().ok_or(MeshError::StaleFaceGeometry(f))?;
        let other = face.nodes().iter().find(|&&n| n != center).copied().ok_or_else(|| {
            MeshError::Logic(format!("face {f} does not leave the center"))
        })?;
        let [x, y] = mesh.coords().xy(other)?;
        assert_relative_eq!(info.centroid[0], 0.5 * (x + 1.2), epsilon = 1e-12);
        assert_relative_eq!(info.centroid[1], 0.5 * (y + 0.9), epsilon = 1e-12);
    }
    Ok(())
}

#[test]
fn three_dimensional_mesh_is_not_supported() -> Result<(), MeshError> {
    let mut mesh = Mesh::with_dimension(3);
    let a = mesh.add_node(&[0.0, 0.0, 0.0])?;
    let b = mesh.add_node(&[1.0, 0.0, 0.0])?;
    let c = mesh.add_node(&[0.0, 1.0, 0.0])?;
    mesh.add_face(&[a, b, c], None, None)?;
    assert!(matches!(
        compute_face_properties(&mut mesh),
        Err(MeshError::NotSupported { dimension: 3, .. })
    ));
    Ok(())
}
