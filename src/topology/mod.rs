//! Top-level module for mesh topology.
//!
//! This module provides:
//! - Strong entity handles (`NodeId`, `ElementId`, `FaceId`)
//! - The `Mesh` container with its faces, elements and pending-removal stack
//! - Builders deriving faces and neighbours from triangle lists
//! - Node → element / node → face connectivity
//!
//! Most users build a mesh with [`builder::triangle_mesh`], then call
//! [`connectivity::build_connectivity`] and the geometry routines.

pub mod builder;
pub mod cache;
pub mod connectivity;
pub mod ids;
pub mod mesh;
pub mod quadtree;
pub mod stack;

pub use cache::InvalidateCache;
pub use ids::{ElementId, EntityId, FaceId, NodeId};
pub use mesh::{BoundaryGroup, Element, Face, FaceGeometry, FaceInfo, FaceSide, Mesh};
