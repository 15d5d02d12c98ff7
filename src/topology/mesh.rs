//! Mesh container: nodes, elements, faces, derived connectivity, the
//! pending-removal stack and the spatial index.
//!
//! # Layout
//! - Node coordinates live in one flat [`Coordinates`] buffer.
//! - Elements are stored by value in a contiguous array. Edge `i` of an
//!   element joins `nodes[i]` and `nodes[(i + 1) % n]`; `neighbors[i]` and
//!   `faces[i]` refer to that edge.
//! - Faces are shared by up to two elements and are addressed by [`FaceId`].
//!   The element on the `left` side sees the face running counter-clockwise.
//! - Node → element and node → face incidence sets are built on demand by
//!   [`build_connectivity`](crate::topology::connectivity::build_connectivity).
//!
//! Dropping a mesh releases everything it owns, whatever state it is in.

use serde::{Deserialize, Serialize};

use crate::data::coordinates::Coordinates;
use crate::data::ordered_set::OrderedSet;
use crate::debug_invariants::{DebugInvariants, ensure_sorted};
use crate::mesh_error::MeshError;
use crate::topology::cache::InvalidateCache;
use crate::topology::ids::{ElementId, FaceId, NodeId};
use crate::topology::quadtree::QuadTree;
use crate::topology::stack::RemovalStack;

/// Cached geometric data of a face.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceInfo {
    /// Unit normal, pointing to the left of the `nodes[0] → nodes[1]` edge.
    pub normal: [f64; 2],
    /// Mean of the face node coordinates.
    pub centroid: [f64; 2],
    /// Face measure (edge length in 2D).
    pub area: f64,
}

/// State of the geometry cache of a face.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum FaceGeometry {
    /// Never computed.
    #[default]
    Uncomputed,
    /// Up to date.
    Valid(FaceInfo),
    /// Computed once, invalidated by a mesh edit since.
    Stale,
}

/// Which side of a face an element lies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceSide {
    /// The face runs counter-clockwise around the element.
    Left,
    /// The face runs clockwise around the element.
    Right,
}

impl FaceSide {
    /// `+1.0` for the left side, `-1.0` for the right side.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            FaceSide::Left => 1.0,
            FaceSide::Right => -1.0,
        }
    }
}

/// A face (an edge in 2D) shared by at most two elements.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Face {
    nodes: Vec<NodeId>,
    left: Option<ElementId>,
    right: Option<ElementId>,
    geometry: FaceGeometry,
}

impl Face {
    /// Creates a face over `nodes` with no adjacent element and no geometry.
    pub fn new(nodes: Vec<NodeId>) -> Self {
        Self {
            nodes,
            left: None,
            right: None,
            geometry: FaceGeometry::Uncomputed,
        }
    }

    /// Face nodes in orientation order.
    #[inline]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Element on the left of the face, if any.
    #[inline]
    pub fn left(&self) -> Option<ElementId> {
        self.left
    }

    /// Element on the right of the face, if any.
    #[inline]
    pub fn right(&self) -> Option<ElementId> {
        self.right
    }

    /// Returns `true` if only one side has an element.
    pub fn is_boundary(&self) -> bool {
        self.left.is_none() || self.right.is_none()
    }

    /// Side on which `element` lies. Any element other than the left one is
    /// treated as lying on the right.
    pub fn side_of(&self, element: ElementId) -> FaceSide {
        if self.left == Some(element) {
            FaceSide::Left
        } else {
            FaceSide::Right
        }
    }

    /// Sets the element on `side`.
    pub fn set_element(&mut self, side: FaceSide, element: Option<ElementId>) {
        match side {
            FaceSide::Left => self.left = element,
            FaceSide::Right => self.right = element,
        }
    }

    /// Current geometry cache state.
    #[inline]
    pub fn geometry(&self) -> FaceGeometry {
        self.geometry
    }

    /// Cached geometry, if valid.
    pub fn info(&self) -> Option<&FaceInfo> {
        match &self.geometry {
            FaceGeometry::Valid(info) => Some(info),
            FaceGeometry::Uncomputed | FaceGeometry::Stale => None,
        }
    }

    pub(crate) fn set_info(&mut self, info: FaceInfo) {
        self.geometry = FaceGeometry::Valid(info);
    }
}

impl InvalidateCache for Face {
    fn invalidate_cache(&mut self) {
        if matches!(self.geometry, FaceGeometry::Valid(_)) {
            self.geometry = FaceGeometry::Stale;
        }
    }
}

/// A mesh element with its per-edge neighbours and faces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    nodes: Vec<NodeId>,
    neighbors: Vec<Option<ElementId>>,
    faces: Vec<FaceId>,
}

impl Element {
    /// Creates an element over `nodes` without adjacency.
    pub fn new(nodes: Vec<NodeId>) -> Self {
        let n = nodes.len();
        Self {
            nodes,
            neighbors: vec![None; n],
            faces: Vec::new(),
        }
    }

    /// Element nodes, counter-clockwise.
    #[inline]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Neighbour across each edge, `None` at the boundary.
    #[inline]
    pub fn neighbors(&self) -> &[Option<ElementId>] {
        &self.neighbors
    }

    /// Face bounding each edge. Empty until adjacency has been set.
    #[inline]
    pub fn faces(&self) -> &[FaceId] {
        &self.faces
    }

    /// Number of nodes (equal to the number of edges in 2D).
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }
}

/// A named group of boundary faces.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryGroup {
    /// Group name, e.g. `"wall"` or `"farfield"`.
    pub name: String,
    /// Faces in the group.
    pub faces: Vec<FaceId>,
}

/// Owner of all mesh entities.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub(crate) coords: Coordinates,
    pub(crate) elements: Vec<Element>,
    pub(crate) faces: Vec<Face>,
    pub(crate) node_to_element: Option<Vec<OrderedSet<ElementId>>>,
    pub(crate) node_to_face: Option<Vec<OrderedSet<FaceId>>>,
    pub(crate) stack: RemovalStack,
    pub(crate) boundary_groups: Vec<BoundaryGroup>,
    quadtree: QuadTree,
}

impl Mesh {
    /// Creates an empty mesh of dimension 0 with an empty removal stack and a
    /// fresh spatial index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty mesh whose nodes have `dimension` coordinates.
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            coords: Coordinates::new(dimension),
            ..Self::default()
        }
    }

    /// Spatial dimension.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.coords.dimension()
    }

    /// Sets the spatial dimension of an empty mesh.
    pub fn set_dimension(&mut self, dimension: usize) -> Result<(), MeshError> {
        if !self.coords.is_empty() {
            return Err(MeshError::Logic(format!(
                "cannot change dimension of a mesh with {} nodes",
                self.coords.len()
            )));
        }
        self.coords = Coordinates::new(dimension);
        Ok(())
    }

    /// Node coordinates.
    #[inline]
    pub fn coords(&self) -> &Coordinates {
        &self.coords
    }

    /// Number of nodes, removed ones included.
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.coords.len()
    }

    /// Number of elements, removed ones included.
    #[inline]
    pub fn n_elements(&self) -> usize {
        self.elements.len()
    }

    /// Number of faces, removed ones included.
    #[inline]
    pub fn n_faces(&self) -> usize {
        self.faces.len()
    }

    /// Pending-removal stack.
    #[inline]
    pub fn stack(&self) -> &RemovalStack {
        &self.stack
    }

    /// Spatial index.
    #[inline]
    pub fn quadtree(&self) -> &QuadTree {
        &self.quadtree
    }

    /// Boundary face groups.
    #[inline]
    pub fn boundary_groups(&self) -> &[BoundaryGroup] {
        &self.boundary_groups
    }

    /// Appends a node. Fails on a mesh of dimension 0.
    pub fn add_node(&mut self, coord: &[f64]) -> Result<NodeId, MeshError> {
        self.coords.push(coord)
    }

    /// Appends an element over existing nodes.
    pub fn add_element(&mut self, nodes: &[NodeId]) -> Result<ElementId, MeshError> {
        for &node in nodes {
            self.check_node(node)?;
        }
        let id = ElementId::new(self.elements.len());
        crate::data::alloc::try_grow("elements", &mut self.elements, 1)?;
        self.elements.push(Element::new(nodes.to_vec()));
        Ok(id)
    }

    /// Appends a face over existing nodes with its adjacent elements.
    pub fn add_face(
        &mut self,
        nodes: &[NodeId],
        left: Option<ElementId>,
        right: Option<ElementId>,
    ) -> Result<FaceId, MeshError> {
        for &node in nodes {
            self.check_node(node)?;
        }
        for element in left.into_iter().chain(right) {
            self.check_element(element)?;
        }
        let id = FaceId::new(self.faces.len());
        let mut face = Face::new(nodes.to_vec());
        face.left = left;
        face.right = right;
        crate::data::alloc::try_grow("faces", &mut self.faces, 1)?;
        self.faces.push(face);
        Ok(id)
    }

    /// Sets the per-edge faces and neighbours of `element`.
    pub fn set_adjacency(
        &mut self,
        element: ElementId,
        faces: Vec<FaceId>,
        neighbors: Vec<Option<ElementId>>,
    ) -> Result<(), MeshError> {
        let n = self.element(element)?.n_nodes();
        if faces.len() != n || neighbors.len() != n {
            return Err(MeshError::DimensionMismatch {
                context: "element adjacency",
                expected: n,
                found: faces.len().max(neighbors.len()),
            });
        }
        for &face in &faces {
            self.check_face(face)?;
        }
        for nbor in neighbors.iter().flatten() {
            self.check_element(*nbor)?;
        }
        let e = &mut self.elements[element.index()];
        e.faces = faces;
        e.neighbors = neighbors;
        Ok(())
    }

    /// Adds a named boundary group.
    pub fn add_boundary_group(&mut self, name: &str, faces: Vec<FaceId>) -> Result<(), MeshError> {
        for &face in &faces {
            self.check_face(face)?;
        }
        self.boundary_groups.push(BoundaryGroup {
            name: name.to_string(),
            faces,
        });
        Ok(())
    }

    /// Element `id`.
    pub fn element(&self, id: ElementId) -> Result<&Element, MeshError> {
        self.elements
            .get(id.index())
            .ok_or(MeshError::ElementOutOfRange {
                element: id,
                len: self.elements.len(),
            })
    }

    /// Face `id`.
    pub fn face(&self, id: FaceId) -> Result<&Face, MeshError> {
        self.faces.get(id.index()).ok_or(MeshError::FaceOutOfRange {
            face: id,
            len: self.faces.len(),
        })
    }

    /// Mutable face `id`.
    pub fn face_mut(&mut self, id: FaceId) -> Result<&mut Face, MeshError> {
        let len = self.faces.len();
        self.faces
            .get_mut(id.index())
            .ok_or(MeshError::FaceOutOfRange { face: id, len })
    }

    /// Live elements in index order.
    pub fn live_elements(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.stack.live_elements(self.elements.len())
    }

    /// Live faces in index order.
    pub fn live_faces(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.stack.live_faces(self.faces.len())
    }

    /// Puts `element` on the pending-removal stack.
    pub fn mark_element_removed(&mut self, element: ElementId) -> Result<bool, MeshError> {
        self.check_element(element)?;
        self.stack.push_element(element)
    }

    /// Puts `face` on the pending-removal stack.
    pub fn mark_face_removed(&mut self, face: FaceId) -> Result<bool, MeshError> {
        self.check_face(face)?;
        self.stack.push_face(face)
    }

    /// Puts `node` on the pending-removal stack.
    pub fn mark_node_removed(&mut self, node: NodeId) -> Result<bool, MeshError> {
        self.check_node(node)?;
        self.stack.push_node(node)
    }

    /// Elements incident to `node`, once connectivity has been built.
    pub fn node_elements(&self, node: NodeId) -> Option<&OrderedSet<ElementId>> {
        self.node_to_element.as_ref()?.get(node.index())
    }

    /// Faces incident to `node`, once connectivity has been built.
    pub fn node_faces(&self, node: NodeId) -> Option<&OrderedSet<FaceId>> {
        self.node_to_face.as_ref()?.get(node.index())
    }

    /// Drops the incidence maps so the next build starts from scratch.
    ///
    /// `build_connectivity` only adds incidences; call this first to purge
    /// the entries of entities removed since the last build.
    pub fn clear_connectivity(&mut self) {
        self.node_to_element = None;
        self.node_to_face = None;
    }

    /// Marks the geometry of every face incident to `node` as stale and
    /// returns how many faces were touched. Requires node → face connectivity.
    pub fn invalidate_faces_at_node(&mut self, node: NodeId) -> Result<usize, MeshError> {
        self.check_node(node)?;
        let incident: Vec<FaceId> = self
            .node_faces(node)
            .ok_or_else(|| MeshError::Logic("node to face connectivity not built".into()))?
            .iter()
            .collect();
        for &face in &incident {
            self.face_mut(face)?.invalidate_cache();
        }
        Ok(incident.len())
    }

    /// Mutable coordinates of `node`; faces touching it are not invalidated.
    pub fn node_coords_mut(&mut self, node: NodeId) -> Result<&mut [f64], MeshError> {
        self.coords.try_restrict_mut(node)
    }

    pub(crate) fn check_node(&self, node: NodeId) -> Result<(), MeshError> {
        if node.index() >= self.coords.len() {
            return Err(MeshError::NodeOutOfRange {
                node,
                len: self.coords.len(),
            });
        }
        Ok(())
    }

    pub(crate) fn check_element(&self, element: ElementId) -> Result<(), MeshError> {
        self.element(element).map(|_| ())
    }

    pub(crate) fn check_face(&self, face: FaceId) -> Result<(), MeshError> {
        self.face(face).map(|_| ())
    }
}

impl InvalidateCache for Mesh {
    /// Marks every face geometry stale.
    fn invalidate_cache(&mut self) {
        self.faces.invalidate_cache();
    }
}

impl DebugInvariants for Mesh {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "Mesh");
    }

    fn validate_invariants(&self) -> Result<(), MeshError> {
        self.stack.validate_invariants()?;
        for element in &self.elements {
            for &node in element.nodes() {
                self.check_node(node)?;
            }
            for &face in element.faces() {
                self.check_face(face)?;
            }
            for nbor in element.neighbors().iter().flatten() {
                self.check_element(*nbor)?;
            }
        }
        for face in &self.faces {
            for &node in face.nodes() {
                self.check_node(node)?;
            }
            for element in face.left().into_iter().chain(face.right()) {
                self.check_element(element)?;
            }
        }
        if let Some(map) = &self.node_to_element {
            for set in map {
                ensure_sorted(set.as_slice(), false, "node to element set")?;
            }
        }
        if let Some(map) = &self.node_to_face {
            for set in map {
                ensure_sorted(set.as_slice(), false, "node to face set")?;
            }
        }
        Ok(())
    }
}
