//! Boundary segments and their metric-driven remeshing.
//!
//! A [`Segment`] is a named curve parametrized over `[0, 1]`. Given a
//! [`Metric`], [`mesh_segment`] picks parametric positions for a fixed
//! number of points so that every edge has (nearly) the same metric length.
//!
//! ```
//! use planar_mesh::segment::{Euclidean, InterpKind, RemeshOptions, Segment, mesh_segment};
//!
//! let mut seg = Segment::new("inlet", &[[0.0, 0.0], [2.0, 0.0]], InterpKind::Linear)?;
//! let mesh = mesh_segment(&mut seg, &Euclidean::new(2), 5, &RemeshOptions::default())?;
//! assert_eq!(mesh.t.len(), 5);
//! assert!((mesh.scale - 0.4).abs() < 1e-12);
//! # Ok::<(), planar_mesh::mesh_error::MeshError>(())
//! ```

pub mod curve;
pub mod interp;
pub mod metric;
pub mod minimize;
pub mod remesh;

pub use curve::Segment;
pub use interp::{InterpKind, Interpolant};
pub use metric::{Euclidean, Metric, QuadratureRule, TensorMetric};
pub use minimize::{Bfgs, IterStatus, Objective};
pub use remesh::{
    InitGuessBudget, RemeshOptions, SegmentMesh, SegmentObjective, initial_guess, mesh_segment,
};
