//! MeshError: Unified error type for planar-mesh public APIs
//!
//! Every fallible operation in the crate returns this type so that callers can
//! propagate failures with `?` and branch on the kind. Search misses that are a
//! normal outcome (an entry absent from an ordered set, a walk that leaves the
//! mesh through the boundary) are reported as values, not as errors.

use thiserror::Error;

use crate::topology::ids::{ElementId, FaceId, NodeId};

/// Unified error type for planar-mesh operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    /// Growing or shrinking a backing buffer failed.
    #[error("allocation failed in {what}: requested {requested} entries")]
    Allocation {
        /// Container or operation that requested the memory.
        what: &'static str,
        /// Number of entries requested.
        requested: usize,
    },
    /// An ordered list lookup did not find the requested key.
    #[error("entry {0} not found")]
    EntryNotFound(i64),
    /// An internal invariant was violated.
    #[error("logic error: {0}")]
    Logic(String),
    /// The operation is not implemented for this dimensionality.
    #[error("{operation} is not supported in dimension {dimension}")]
    NotSupported {
        /// Name of the unsupported operation.
        operation: &'static str,
        /// Spatial dimension that triggered the error.
        dimension: usize,
    },
    /// A point-location walk visited too many elements.
    #[error("point location from {start} exceeded its bound after {steps} steps")]
    SearchBoundExceeded {
        /// Element the walk started from.
        start: ElementId,
        /// Number of elements visited before giving up.
        steps: usize,
    },
    /// A node id does not address a node of the mesh.
    #[error("node {node} out of range (mesh has {len} nodes)")]
    NodeOutOfRange {
        /// Offending node id.
        node: NodeId,
        /// Number of nodes in the mesh.
        len: usize,
    },
    /// An element id does not address an element of the mesh.
    #[error("element {element} out of range (mesh has {len} elements)")]
    ElementOutOfRange {
        /// Offending element id.
        element: ElementId,
        /// Number of elements in the mesh.
        len: usize,
    },
    /// A face id does not address a face of the mesh.
    #[error("face {face} out of range (mesh has {len} faces)")]
    FaceOutOfRange {
        /// Offending face id.
        face: FaceId,
        /// Number of faces in the mesh.
        len: usize,
    },
    /// Coordinates or a metric have the wrong number of components.
    #[error("dimension mismatch in {context}: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Operation that checked the dimension.
        context: &'static str,
        /// Expected number of components.
        expected: usize,
        /// Number of components found.
        found: usize,
    },
    /// Input geometry or topology is unusable (degenerate, non-manifold, ...).
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    /// Face geometry was read before being (re)computed.
    #[error("geometry of face {0} is not computed; run compute_face_properties first")]
    StaleFaceGeometry(FaceId),
    /// The segment definition cannot be meshed.
    #[error("invalid segment: {0}")]
    InvalidSegment(String),
    /// The metric returned an unusable value or was misconfigured.
    #[error("invalid metric: {0}")]
    InvalidMetric(String),
    /// The minimizer was set up with inconsistent inputs.
    #[error("minimizer error: {0}")]
    Minimizer(String),
}

impl MeshError {
    /// Returns `true` for failures the surrounding application treats as fatal
    /// (allocation and invariant violations).
    pub fn is_fatal(&self) -> bool {
        matches!(self, MeshError::Allocation { .. } | MeshError::Logic(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = MeshError::NotSupported {
            operation: "face properties",
            dimension: 3,
        };
        assert_eq!(err.to_string(), "face properties is not supported in dimension 3");

        let err = MeshError::ElementOutOfRange {
            element: ElementId::new(7),
            len: 3,
        };
        assert_eq!(err.to_string(), "element 7 out of range (mesh has 3 elements)");
    }

    #[test]
    fn fatal_kinds() {
        assert!(MeshError::Logic("x".into()).is_fatal());
        assert!(
            MeshError::Allocation {
                what: "ordered set",
                requested: 1
            }
            .is_fatal()
        );
        assert!(!MeshError::EntryNotFound(4).is_fatal());
    }
}
