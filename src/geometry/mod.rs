//! Geometry utilities for 2D meshes.
//!
//! This module provides face normals and centroids, half-plane containment,
//! segment intersection and a point-location walk over element neighbours.

pub mod face;
pub mod locate;
pub mod predicates;

pub use face::compute_face_properties;
pub use locate::{LocateOptions, Location, locate, locate_with};
pub use predicates::{
    GeometryTolerances, edges_intersect, edges_intersect_with, element_centroid, point_in_element,
    point_in_element_with,
};
