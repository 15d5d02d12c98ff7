#![cfg_attr(docsrs, feature(doc_cfg))]
//! # planar-mesh
//!
//! planar-mesh is the computational core of a 2D unstructured mesh generator.
//! It keeps node/element/face adjacency consistent under incremental edits,
//! answers geometric queries on triangle meshes, and redistributes points
//! along boundary curves so that edges have uniform length in a metric field.
//!
//! ## Features
//! - Sorted, duplicate-free index sets and keyed payload lists
//! - A mesh container with a pending-removal stack and node incidence maps
//! - Face normals, half-plane containment, segment intersection and a
//!   point-location walk
//! - Metric-driven 1D remeshing with a BFGS minimizer
//!
//! ## Invariant checking
//! Containers implement [`DebugInvariants`]. Checks run in debug builds and
//! in release builds with the `check-invariants` feature; `strict-invariants`
//! turns every violation into a panic.
//!
//! ## Usage
//! ```
//! use planar_mesh::prelude::*;
//!
//! let opts = MeshBuildOptions { build_connectivity: true, ..Default::default() };
//! let mut mesh = structured_triangles(4, 4, [0.0, 0.0], [1.0, 1.0], &opts)?;
//! compute_face_properties(&mut mesh)?;
//! let found = locate(&mesh, ElementId::new(0), [0.9, 0.8])?;
//! assert!(matches!(found, Location::Inside(_)));
//! # Ok::<(), MeshError>(())
//! ```
//!
//! The library logs through the [`log`] facade and installs no logger.

pub mod data;
pub mod debug_invariants;
pub mod geometry;
pub mod mesh_error;
pub mod segment;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::data::coordinates::Coordinates;
    pub use crate::data::ordered_list::OrderedDataList;
    pub use crate::data::ordered_set::OrderedSet;
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::geometry::{
        GeometryTolerances, LocateOptions, Location, compute_face_properties, edges_intersect,
        element_centroid, locate, locate_with, point_in_element,
    };
    pub use crate::mesh_error::MeshError;
    pub use crate::segment::{
        Euclidean, InitGuessBudget, InterpKind, Metric, RemeshOptions, Segment, SegmentMesh,
        TensorMetric, mesh_segment,
    };
    pub use crate::topology::builder::{MeshBuildOptions, structured_triangles, triangle_mesh};
    pub use crate::topology::connectivity::build_connectivity;
    pub use crate::topology::{ElementId, EntityId, FaceId, InvalidateCache, Mesh, NodeId};
}
