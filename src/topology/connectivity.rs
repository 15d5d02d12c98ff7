//! Node → element and node → face incidence.
//!
//! Both maps hold one [`OrderedSet`] per node. Building is incremental: new
//! incidences are added, existing ones are kept even if their entity has since
//! been put on the removal stack. Call
//! [`Mesh::clear_connectivity`](crate::topology::mesh::Mesh::clear_connectivity)
//! first to rebuild from scratch.

use crate::data::ordered_set::OrderedSet;
use crate::mesh_error::MeshError;
use crate::topology::ids::{EntityId, NodeId};
use crate::topology::mesh::Mesh;

/// Builds (or extends) the node → element and node → face maps of `mesh`,
/// skipping entities on the pending-removal stack.
///
/// # Errors
/// Allocation failures and out-of-range node references are propagated; the
/// maps may be partially extended in that case.
pub fn build_connectivity(mesh: &mut Mesh) -> Result<(), MeshError> {
    let n_nodes = mesh.n_nodes();

    let mut node_to_element = mesh.node_to_element.take().unwrap_or_default();
    let result = fill_incidence(
        &mut node_to_element,
        n_nodes,
        mesh.stack
            .live_elements(mesh.elements.len())
            .map(|e| (e, mesh.elements[e.index()].nodes())),
    );
    mesh.node_to_element = Some(node_to_element);
    result?;

    let mut node_to_face = mesh.node_to_face.take().unwrap_or_default();
    let result = fill_incidence(
        &mut node_to_face,
        n_nodes,
        mesh.stack
            .live_faces(mesh.faces.len())
            .map(|f| (f, mesh.faces[f.index()].nodes())),
    );
    mesh.node_to_face = Some(node_to_face);
    result?;

    log::debug!(
        "connectivity built: {n_nodes} nodes, {} live elements, {} live faces",
        mesh.live_elements().count(),
        mesh.live_faces().count()
    );
    Ok(())
}

fn fill_incidence<'a, I, It>(
    map: &mut Vec<OrderedSet<I>>,
    n_nodes: usize,
    entities: It,
) -> Result<(), MeshError>
where
    I: EntityId,
    It: Iterator<Item = (I, &'a [NodeId])>,
{
    // nodes may have been appended since the previous build
    if map.len() < n_nodes {
        crate::data::alloc::try_grow("node incidence", map, n_nodes - map.len())?;
        map.resize_with(n_nodes, OrderedSet::new);
    }
    for (entity, nodes) in entities {
        for &node in nodes {
            let set = map.get_mut(node.index()).ok_or(MeshError::NodeOutOfRange {
                node,
                len: n_nodes,
            })?;
            set.insert(entity, false)?;
        }
    }
    Ok(())
}
