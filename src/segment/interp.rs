//! One-dimensional interpolation of segment coordinates over the
//! parametric anchors.
//!
//! Evaluation outside the anchor range clamps to the nearest end so that a
//! minimizer probing slightly past `t = 0` or `t = 1` sees the endpoints.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::mesh_error::MeshError;

/// Interpolation scheme of a [`Segment`](super::curve::Segment).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterpKind {
    /// Piecewise linear between anchors.
    #[default]
    Linear,
    /// Natural cubic spline (zero second derivative at both ends).
    CubicSpline,
}

impl InterpKind {
    /// Minimum number of anchors the scheme accepts.
    pub fn min_points(self) -> usize {
        match self {
            InterpKind::Linear => 2,
            InterpKind::CubicSpline => 3,
        }
    }
}

/// An interpolant `y(x)` through strictly increasing abscissae.
///
/// Deserialization goes through [`Interpolant::new`], so spline second
/// derivatives are recomputed from the data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawInterpolant")]
pub enum Interpolant {
    /// Piecewise linear.
    Linear {
        /// Abscissae, strictly increasing.
        x: Vec<f64>,
        /// Ordinates.
        y: Vec<f64>,
    },
    /// Natural cubic spline.
    CubicSpline {
        /// Abscissae, strictly increasing.
        x: Vec<f64>,
        /// Ordinates.
        y: Vec<f64>,
        /// Second derivative at each abscissa.
        y2: Vec<f64>,
    },
}

/// Unchecked wire form of [`Interpolant`].
#[derive(Deserialize)]
enum RawInterpolant {
    Linear { x: Vec<f64>, y: Vec<f64> },
    CubicSpline { x: Vec<f64>, y: Vec<f64>, y2: Vec<f64> },
}

impl TryFrom<RawInterpolant> for Interpolant {
    type Error = MeshError;

    fn try_from(raw: RawInterpolant) -> Result<Self, MeshError> {
        match raw {
            RawInterpolant::Linear { x, y } => Interpolant::new(InterpKind::Linear, &x, &y),
            RawInterpolant::CubicSpline { x, y, y2 } => {
                if y2.len() != x.len() {
                    return Err(MeshError::InvalidSegment(format!(
                        "{} second derivatives for {} abscissae",
                        y2.len(),
                        x.len()
                    )));
                }
                Interpolant::new(InterpKind::CubicSpline, &x, &y)
            }
        }
    }
}

impl Interpolant {
    /// Builds an interpolant of `kind` through `(x[i], y[i])`.
    ///
    /// # Errors
    /// [`MeshError::InvalidSegment`] if the lengths differ, there are too
    /// few points for `kind`, or `x` is not strictly increasing.
    pub fn new(kind: InterpKind, x: &[f64], y: &[f64]) -> Result<Self, MeshError> {
        if x.len() != y.len() {
            return Err(MeshError::InvalidSegment(format!(
                "{} abscissae but {} ordinates",
                x.len(),
                y.len()
            )));
        }
        if x.len() < kind.min_points() {
            return Err(MeshError::InvalidSegment(format!(
                "{kind:?} interpolation needs at least {} points, got {}",
                kind.min_points(),
                x.len()
            )));
        }
        if let Some(w) = x
            .windows(2)
            .find(|w| w[0].partial_cmp(&w[1]) != Some(Ordering::Less))
        {
            return Err(MeshError::InvalidSegment(format!(
                "abscissae not strictly increasing: {} then {}",
                w[0], w[1]
            )));
        }
        Ok(match kind {
            InterpKind::Linear => Interpolant::Linear {
                x: x.to_vec(),
                y: y.to_vec(),
            },
            InterpKind::CubicSpline => Interpolant::CubicSpline {
                x: x.to_vec(),
                y: y.to_vec(),
                y2: natural_second_derivatives(x, y),
            },
        })
    }

    /// Scheme of this interpolant.
    pub fn kind(&self) -> InterpKind {
        match self {
            Interpolant::Linear { .. } => InterpKind::Linear,
            Interpolant::CubicSpline { .. } => InterpKind::CubicSpline,
        }
    }

    /// Evaluates at `at`, clamped to the abscissa range.
    pub fn eval(&self, at: f64) -> f64 {
        match self {
            Interpolant::Linear { x, y } => {
                let (k, at) = interval(x, at);
                let w = (at - x[k]) / (x[k + 1] - x[k]);
                y[k] * (1.0 - w) + y[k + 1] * w
            }
            Interpolant::CubicSpline { x, y, y2 } => {
                let (k, at) = interval(x, at);
                let h = x[k + 1] - x[k];
                let a = (x[k + 1] - at) / h;
                let b = (at - x[k]) / h;
                a * y[k]
                    + b * y[k + 1]
                    + ((a * a * a - a) * y2[k] + (b * b * b - b) * y2[k + 1]) * h * h / 6.0
            }
        }
    }
}

/// Index `k` with `x[k] <= at <= x[k + 1]` and the clamped abscissa.
fn interval(x: &[f64], at: f64) -> (usize, f64) {
    let last = x.len() - 1;
    let at = at.clamp(x[0], x[last]);
    let k = x.partition_point(|&v| v <= at).saturating_sub(1).min(last - 1);
    (k, at)
}

/// Thomas algorithm on the natural-spline tridiagonal system.
fn natural_second_derivatives(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    let mut y2 = vec![0.0; n];
    let mut u = vec![0.0; n];
    for i in 1..n - 1 {
        let sig = (x[i] - x[i - 1]) / (x[i + 1] - x[i - 1]);
        let p = sig * y2[i - 1] + 2.0;
        y2[i] = (sig - 1.0) / p;
        let slope = (y[i + 1] - y[i]) / (x[i + 1] - x[i]) - (y[i] - y[i - 1]) / (x[i] - x[i - 1]);
        u[i] = (6.0 * slope / (x[i + 1] - x[i - 1]) - sig * u[i - 1]) / p;
    }
    y2[n - 1] = 0.0;
    for k in (0..n - 1).rev() {
        y2[k] = y2[k] * y2[k + 1] + u[k];
    }
    y2
}
