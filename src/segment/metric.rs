//! Metric fields measuring edge lengths for remeshing.
//!
//! A metric assigns a length to the straight edge between two points. The
//! remesher asks for distances at two accuracies: the metric's own `order`
//! and `2 * order` for the objective value.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::curve::Segment;
use crate::mesh_error::MeshError;

/// Distance in a (possibly anisotropic) metric field.
pub trait Metric {
    /// Number of coordinates per point.
    fn dimension(&self) -> usize;

    /// Base quadrature order.
    fn order(&self) -> usize;

    /// Metric length of the straight edge `a → b`, integrated with `order`
    /// quadrature points.
    fn distance(&self, order: usize, a: &[f64], b: &[f64]) -> Result<f64, MeshError>;

    /// Metric length of `segment`, summed over `samples` equal parametric
    /// pieces measured at `2 * order`.
    fn curve_length(&self, segment: &Segment, samples: usize) -> Result<f64, MeshError> {
        if segment.dimension() != self.dimension() {
            return Err(MeshError::DimensionMismatch {
                context: "curve length",
                expected: self.dimension(),
                found: segment.dimension(),
            });
        }
        let samples = samples.max(1);
        let order = 2 * self.order();
        let mut a = segment.eval(0.0);
        let mut b = vec![0.0; a.len()];
        let mut length = 0.0;
        for i in 1..=samples {
            segment.eval_into(i as f64 / samples as f64, &mut b);
            length += self.distance(order, &a, &b)?;
            std::mem::swap(&mut a, &mut b);
        }
        Ok(length)
    }
}

fn check_points(dimension: usize, a: &[f64], b: &[f64]) -> Result<(), MeshError> {
    for p in [a, b] {
        if p.len() != dimension {
            return Err(MeshError::DimensionMismatch {
                context: "metric distance",
                expected: dimension,
                found: p.len(),
            });
        }
    }
    Ok(())
}

/// The identity metric: plain Euclidean distance. Quadrature order is
/// irrelevant and only reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Euclidean {
    dimension: usize,
    order: usize,
}

impl Euclidean {
    /// Euclidean metric in `dimension` coordinates.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            order: 1,
        }
    }
}

impl Metric for Euclidean {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn order(&self) -> usize {
        self.order
    }

    fn distance(&self, _order: usize, a: &[f64], b: &[f64]) -> Result<f64, MeshError> {
        check_points(self.dimension, a, b)?;
        Ok(a.iter()
            .zip(b)
            .map(|(x, y)| (y - x) * (y - x))
            .sum::<f64>()
            .sqrt())
    }
}

/// Gauss-Legendre nodes and weights mapped to `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct QuadratureRule {
    /// Abscissae in `(0, 1)`.
    pub nodes: Vec<f64>,
    /// Weights, summing to one.
    pub weights: Vec<f64>,
}

impl QuadratureRule {
    /// `n`-point Gauss-Legendre rule (exact for polynomials up to degree
    /// `2n - 1`). `n = 0` is treated as 1.
    pub fn gauss_legendre(n: usize) -> Self {
        let n = n.max(1);
        let mut nodes = vec![0.0; n];
        let mut weights = vec![0.0; n];
        for i in 0..n.div_ceil(2) {
            // Newton on P_n from the Chebyshev-like initial guess
            let mut z = (std::f64::consts::PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
            let mut dp = 1.0;
            for _ in 0..100 {
                let (mut p1, mut p2) = (1.0, 0.0);
                for j in 1..=n {
                    let p3 = p2;
                    p2 = p1;
                    p1 = ((2 * j - 1) as f64 * z * p2 - (j - 1) as f64 * p3) / j as f64;
                }
                dp = n as f64 * (z * p1 - p2) / (z * z - 1.0);
                let z1 = z;
                z = z1 - p1 / dp;
                if (z - z1).abs() <= 1.0e-15 {
                    break;
                }
            }
            nodes[i] = 0.5 * (1.0 - z);
            nodes[n - 1 - i] = 0.5 * (1.0 + z);
            let w = 1.0 / ((1.0 - z * z) * dp * dp);
            weights[i] = w;
            weights[n - 1 - i] = w;
        }
        Self { nodes, weights }
    }
}

/// 2D metric given by a symmetric positive-definite tensor field `M(x)`.
///
/// The length of `a → b` is `∫₀¹ sqrt(dᵀ M(a + s d) d) ds` with `d = b - a`,
/// integrated by Gauss-Legendre quadrature.
#[derive(Clone)]
pub struct TensorMetric<F> {
    field: F,
    order: usize,
    base: QuadratureRule,
    doubled: QuadratureRule,
}

impl<F> TensorMetric<F>
where
    F: Fn([f64; 2]) -> [[f64; 2]; 2],
{
    /// Metric sampling `field` with `order` quadrature points (at least 1).
    pub fn new(field: F, order: usize) -> Self {
        let order = order.max(1);
        Self {
            field,
            order,
            base: QuadratureRule::gauss_legendre(order),
            doubled: QuadratureRule::gauss_legendre(2 * order),
        }
    }

    fn integrate(&self, rule: &QuadratureRule, a: &[f64], b: &[f64]) -> Result<f64, MeshError> {
        let d = [b[0] - a[0], b[1] - a[1]];
        let mut length = 0.0;
        for (&s, &w) in rule.nodes.iter().zip(&rule.weights) {
            let m = (self.field)([a[0] + s * d[0], a[1] + s * d[1]]);
            let md = [m[0][0] * d[0] + m[0][1] * d[1], m[1][0] * d[0] + m[1][1] * d[1]];
            let q = d[0] * md[0] + d[1] * md[1];
            if !(q.is_finite() && q >= 0.0) {
                return Err(MeshError::InvalidMetric(format!(
                    "tensor is not positive definite near ({}, {})",
                    a[0] + s * d[0],
                    a[1] + s * d[1]
                )));
            }
            length += w * q.sqrt();
        }
        Ok(length)
    }
}

impl<F> Metric for TensorMetric<F>
where
    F: Fn([f64; 2]) -> [[f64; 2]; 2],
{
    fn dimension(&self) -> usize {
        2
    }

    fn order(&self) -> usize {
        self.order
    }

    fn distance(&self, order: usize, a: &[f64], b: &[f64]) -> Result<f64, MeshError> {
        check_points(2, a, b)?;
        if order == self.order {
            self.integrate(&self.base, a, b)
        } else if order == 2 * self.order {
            self.integrate(&self.doubled, a, b)
        } else {
            self.integrate(&QuadratureRule::gauss_legendre(order), a, b)
        }
    }
}

impl<F> fmt::Debug for TensorMetric<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TensorMetric")
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}
