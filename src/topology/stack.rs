//! Pending-removal stack: entities deleted logically but still present in the
//! backing arrays.
//!
//! Removing an element, face or node from the mesh only records its index
//! here; compaction of the arrays happens elsewhere. Every scan over an entity
//! array must skip the recorded indices. Each list is an [`OrderedSet`], so it
//! is sorted ascending and duplicate-free by construction, which is what the
//! forward-cursor scan in [`LiveIndices`] relies on.

use serde::{Deserialize, Serialize};

use crate::data::ordered_set::OrderedSet;
use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshError;
use crate::topology::ids::{ElementId, EntityId, FaceId, NodeId};

/// Sorted lists of removed elements, faces and nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalStack {
    elements: OrderedSet<ElementId>,
    faces: OrderedSet<FaceId>,
    nodes: OrderedSet<NodeId>,
}

impl RemovalStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removed elements, ascending.
    #[inline]
    pub fn elements(&self) -> &OrderedSet<ElementId> {
        &self.elements
    }

    /// Removed faces, ascending.
    #[inline]
    pub fn faces(&self) -> &OrderedSet<FaceId> {
        &self.faces
    }

    /// Removed nodes, ascending.
    #[inline]
    pub fn nodes(&self) -> &OrderedSet<NodeId> {
        &self.nodes
    }

    /// Records `element` as removed. Returns `false` if it already was.
    pub fn push_element(&mut self, element: ElementId) -> Result<bool, MeshError> {
        self.elements.insert(element, false)
    }

    /// Records `face` as removed. Returns `false` if it already was.
    pub fn push_face(&mut self, face: FaceId) -> Result<bool, MeshError> {
        self.faces.insert(face, false)
    }

    /// Records `node` as removed. Returns `false` if it already was.
    pub fn push_node(&mut self, node: NodeId) -> Result<bool, MeshError> {
        self.nodes.insert(node, false)
    }

    /// Takes `element` back off the stack (it becomes live again).
    pub fn restore_element(&mut self, element: ElementId) -> Result<bool, MeshError> {
        Ok(self.elements.remove(element, None)? > 0)
    }

    /// Takes `face` back off the stack.
    pub fn restore_face(&mut self, face: FaceId) -> Result<bool, MeshError> {
        Ok(self.faces.remove(face, None)? > 0)
    }

    /// Takes `node` back off the stack.
    pub fn restore_node(&mut self, node: NodeId) -> Result<bool, MeshError> {
        Ok(self.nodes.remove(node, None)? > 0)
    }

    /// `O(log n)` membership test for elements.
    #[inline]
    pub fn contains_element(&self, element: ElementId) -> bool {
        self.elements.contains(element)
    }

    /// `O(log n)` membership test for faces.
    #[inline]
    pub fn contains_face(&self, face: FaceId) -> bool {
        self.faces.contains(face)
    }

    /// `O(log n)` membership test for nodes.
    #[inline]
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.nodes.contains(node)
    }

    /// Live element ids among the first `total` elements.
    pub fn live_elements(&self, total: usize) -> LiveIndices<'_, ElementId> {
        LiveIndices::new(self.elements.as_slice(), total)
    }

    /// Live face ids among the first `total` faces.
    pub fn live_faces(&self, total: usize) -> LiveIndices<'_, FaceId> {
        LiveIndices::new(self.faces.as_slice(), total)
    }

    /// Live node ids among the first `total` nodes.
    pub fn live_nodes(&self, total: usize) -> LiveIndices<'_, NodeId> {
        LiveIndices::new(self.nodes.as_slice(), total)
    }

    /// Total number of recorded entities.
    pub fn len(&self) -> usize {
        self.elements.len() + self.faces.len() + self.nodes.len()
    }

    /// Returns `true` if nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DebugInvariants for RemovalStack {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "RemovalStack");
    }

    fn validate_invariants(&self) -> Result<(), MeshError> {
        // strictly increasing: a repeated index would desynchronize the cursor
        crate::debug_invariants::ensure_sorted(self.elements.as_slice(), false, "element stack")?;
        crate::debug_invariants::ensure_sorted(self.faces.as_slice(), false, "face stack")?;
        crate::debug_invariants::ensure_sorted(self.nodes.as_slice(), false, "node stack")
    }
}

/// Iterator over `0..total` that skips the indices of a sorted stack.
///
/// A single cursor tracks the next stack entry to skip, so each scan visits
/// the stack once in order. Stack entries at or beyond `total` are ignored.
#[derive(Clone, Debug)]
pub struct LiveIndices<'a, I> {
    skip: &'a [I],
    cursor: usize,
    next: usize,
    total: usize,
}

impl<'a, I: EntityId> LiveIndices<'a, I> {
    fn new(skip: &'a [I], total: usize) -> Self {
        Self {
            skip,
            cursor: 0,
            next: 0,
            total,
        }
    }
}

impl<I: EntityId> Iterator for LiveIndices<'_, I> {
    type Item = I;

    fn next(&mut self) -> Option<I> {
        while self.next < self.total {
            let index = self.next;
            self.next += 1;
            if self
                .skip
                .get(self.cursor)
                .is_some_and(|s| s.index() == index)
            {
                self.cursor += 1;
                continue;
            }
            return Some(I::from(index));
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.total - self.next))
    }
}
