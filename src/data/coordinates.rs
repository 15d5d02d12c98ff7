//! Geometry/coordinates storage for mesh nodes.
//!
//! Coordinates are stored in one flat buffer with a fixed dimension per node:
//! component `d` of node `n` lives at `n * dimension + d`.

use serde::{Deserialize, Serialize};

use crate::data::alloc::try_grow;
use crate::mesh_error::MeshError;
use crate::topology::ids::NodeId;

/// Flat coordinate storage with an attached dimension.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinates")]
pub struct Coordinates {
    dimension: usize,
    values: Vec<f64>,
}

/// Unchecked wire form of [`Coordinates`].
#[derive(Deserialize)]
struct RawCoordinates {
    dimension: usize,
    values: Vec<f64>,
}

impl TryFrom<RawCoordinates> for Coordinates {
    type Error = MeshError;

    fn try_from(raw: RawCoordinates) -> Result<Self, MeshError> {
        Coordinates::from_flat(raw.dimension, raw.values)
    }
}

impl Coordinates {
    /// Creates empty storage for points of `dimension` components.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            values: Vec::new(),
        }
    }

    /// Wraps an existing flat buffer, validating its length.
    pub fn from_flat(dimension: usize, values: Vec<f64>) -> Result<Self, MeshError> {
        if dimension == 0 {
            if values.is_empty() {
                return Ok(Self::new(0));
            }
            return Err(MeshError::DimensionMismatch {
                context: "coordinates",
                expected: 0,
                found: values.len(),
            });
        }
        if values.len() % dimension != 0 {
            return Err(MeshError::DimensionMismatch {
                context: "coordinates",
                expected: dimension,
                found: values.len() % dimension,
            });
        }
        Ok(Self { dimension, values })
    }

    /// Returns the spatial dimension per node.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored nodes.
    #[inline]
    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.values.len() / self.dimension
        }
    }

    /// Returns `true` if no node is stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The whole flat buffer.
    #[inline]
    pub fn as_flat(&self) -> &[f64] {
        &self.values
    }

    /// Appends a node and returns its id.
    ///
    /// # Errors
    /// [`MeshError::Logic`] while the dimension is 0, and
    /// [`MeshError::DimensionMismatch`] if `point` has the wrong length.
    pub fn push(&mut self, point: &[f64]) -> Result<NodeId, MeshError> {
        if self.dimension == 0 {
            return Err(MeshError::Logic(
                "coordinates have dimension 0; set the dimension before adding nodes".into(),
            ));
        }
        if point.len() != self.dimension {
            return Err(MeshError::DimensionMismatch {
                context: "coordinates push",
                expected: self.dimension,
                found: point.len(),
            });
        }
        let id = NodeId::new(self.len());
        try_grow("coordinates", &mut self.values, point.len())?;
        self.values.extend_from_slice(point);
        Ok(id)
    }

    /// Read-only view of the coordinates of `node`.
    #[inline]
    pub fn try_restrict(&self, node: NodeId) -> Result<&[f64], MeshError> {
        let len = self.len();
        let n = node.index();
        if n >= len {
            return Err(MeshError::NodeOutOfRange { node, len });
        }
        Ok(&self.values[n * self.dimension..(n + 1) * self.dimension])
    }

    /// Mutable view of the coordinates of `node`.
    #[inline]
    pub fn try_restrict_mut(&mut self, node: NodeId) -> Result<&mut [f64], MeshError> {
        let len = self.len();
        let n = node.index();
        if n >= len {
            return Err(MeshError::NodeOutOfRange { node, len });
        }
        let dim = self.dimension;
        Ok(&mut self.values[n * dim..(n + 1) * dim])
    }

    /// First two components of `node` (2D meshes).
    pub fn xy(&self, node: NodeId) -> Result<[f64; 2], MeshError> {
        let c = self.try_restrict(node)?;
        if c.len() < 2 {
            return Err(MeshError::DimensionMismatch {
                context: "planar coordinates",
                expected: 2,
                found: c.len(),
            });
        }
        Ok([c[0], c[1]])
    }
}
