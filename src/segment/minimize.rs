//! BFGS minimization with a strong-Wolfe line search.
//!
//! The driver owns the iterate, and the caller owns the loop: [`Bfgs::iterate`]
//! performs one line search and inverse-Hessian update, and
//! [`Bfgs::test_gradient`] decides convergence. A step that cannot decrease
//! the objective is reported as [`IterStatus::NoProgress`] rather than an
//! error.

use nalgebra::{DMatrix, DVector};

use crate::mesh_error::MeshError;

/// A smooth function with gradient.
pub trait Objective {
    /// Function value at `x`.
    fn value(&self, x: &DVector<f64>) -> Result<f64, MeshError>;

    /// Gradient at `x`, written into `grad`.
    fn gradient(&self, x: &DVector<f64>, grad: &mut DVector<f64>) -> Result<(), MeshError>;

    /// Value and gradient in one call.
    fn value_and_gradient(
        &self,
        x: &DVector<f64>,
        grad: &mut DVector<f64>,
    ) -> Result<f64, MeshError> {
        self.gradient(x, grad)?;
        self.value(x)
    }
}

/// Outcome of one [`Bfgs::iterate`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IterStatus {
    /// The iterate moved and the objective decreased.
    Progress,
    /// No acceptable step was found; the iterate is unchanged.
    NoProgress,
}

/// Sufficient-decrease constant of the line search.
const ARMIJO: f64 = 1.0e-4;
/// Trial step growth while bracketing.
const EXPANSION: f64 = 4.0;
/// Objective evaluations allowed per bracketing or zoom phase.
const MAX_LINE_EVALS: usize = 40;

/// Point accepted by the line search.
struct Trial {
    alpha: f64,
    f: f64,
    g: DVector<f64>,
}

/// Dense BFGS minimizer state.
#[derive(Clone, Debug)]
pub struct Bfgs {
    x: DVector<f64>,
    f: f64,
    g: DVector<f64>,
    h: DMatrix<f64>,
    step_size: f64,
    line_tol: f64,
    first: bool,
}

impl Bfgs {
    /// Starts from `x0`. The first trial step has length `step_size`; the
    /// line search accepts a step when the directional derivative has shrunk
    /// by the factor `line_tol`.
    ///
    /// # Errors
    /// [`MeshError::Minimizer`] for an empty start point or out-of-range
    /// parameters; objective errors are propagated.
    pub fn new<O: Objective + ?Sized>(
        objective: &O,
        x0: DVector<f64>,
        step_size: f64,
        line_tol: f64,
    ) -> Result<Self, MeshError> {
        if x0.is_empty() {
            return Err(MeshError::Minimizer("empty start point".into()));
        }
        if !(step_size > 0.0 && step_size.is_finite()) {
            return Err(MeshError::Minimizer(format!("step size {step_size} must be positive")));
        }
        if !(line_tol > ARMIJO && line_tol < 1.0) {
            return Err(MeshError::Minimizer(format!(
                "line tolerance {line_tol} must lie in ({ARMIJO}, 1)"
            )));
        }
        let n = x0.len();
        let mut g = DVector::zeros(n);
        let f = objective.value_and_gradient(&x0, &mut g)?;
        Ok(Self {
            x: x0,
            f,
            g,
            h: DMatrix::identity(n, n),
            step_size,
            line_tol,
            first: true,
        })
    }

    /// Current iterate.
    #[inline]
    pub fn x(&self) -> &DVector<f64> {
        &self.x
    }

    /// Objective value at the current iterate.
    #[inline]
    pub fn value(&self) -> f64 {
        self.f
    }

    /// Gradient at the current iterate.
    #[inline]
    pub fn gradient(&self) -> &DVector<f64> {
        &self.g
    }

    /// Euclidean norm of the gradient.
    #[inline]
    pub fn gradient_norm(&self) -> f64 {
        self.g.norm()
    }

    /// Returns `true` when the gradient norm is below `epsabs`.
    pub fn test_gradient(&self, epsabs: f64) -> bool {
        self.gradient_norm() < epsabs
    }

    /// Consumes the minimizer and returns the final iterate.
    pub fn into_x(self) -> DVector<f64> {
        self.x
    }

    /// Performs one line search along the quasi-Newton direction and updates
    /// the inverse Hessian approximation.
    pub fn iterate<O: Objective + ?Sized>(
        &mut self,
        objective: &O,
    ) -> Result<IterStatus, MeshError> {
        let gnorm = self.g.norm();
        if gnorm == 0.0 || !gnorm.is_finite() {
            return Ok(IterStatus::NoProgress);
        }
        let mut p = -(&self.h * &self.g);
        let mut slope = p.dot(&self.g);
        if slope >= 0.0 || slope.is_nan() {
            // lost positive definiteness; restart from steepest descent
            self.h.fill_with_identity();
            p = -&self.g;
            slope = -gnorm * gnorm;
        }
        let alpha0 = if self.first {
            self.step_size / p.norm()
        } else {
            1.0
        };

        let Some(trial) = self.line_search(objective, &p, slope, alpha0)? else {
            return Ok(IterStatus::NoProgress);
        };

        let s = &p * trial.alpha;
        let y = &trial.g - &self.g;
        let sy = s.dot(&y);
        if sy > f64::MIN_POSITIVE {
            if self.first {
                let n = self.x.len();
                self.h = DMatrix::identity(n, n) * (sy / y.dot(&y));
            }
            let rho = 1.0 / sy;
            let hy = &self.h * &y;
            let yhy = y.dot(&hy);
            // H⁺ = H − ρ(s·Hyᵀ + Hy·sᵀ) + (ρ²·yᵀHy + ρ)·s·sᵀ
            self.h -= (&s * hy.transpose() + &hy * s.transpose()) * rho;
            self.h += (&s * s.transpose()) * (rho * rho * yhy + rho);
        }
        self.first = false;
        self.x += s;
        self.f = trial.f;
        self.g = trial.g;
        Ok(IterStatus::Progress)
    }

    fn evaluate<O: Objective + ?Sized>(
        &self,
        objective: &O,
        p: &DVector<f64>,
        alpha: f64,
    ) -> Result<(f64, DVector<f64>, f64), MeshError> {
        let x = &self.x + p * alpha;
        let mut g = DVector::zeros(x.len());
        let f = objective.value_and_gradient(&x, &mut g)?;
        let d = g.dot(p);
        Ok((f, g, d))
    }

    /// Bracketing phase of a strong-Wolfe line search.
    fn line_search<O: Objective + ?Sized>(
        &self,
        objective: &O,
        p: &DVector<f64>,
        slope: f64,
        alpha0: f64,
    ) -> Result<Option<Trial>, MeshError> {
        let mut prev = Trial {
            alpha: 0.0,
            f: self.f,
            g: self.g.clone(),
        };
        let mut prev_d = slope;
        let mut alpha = alpha0;
        for i in 0..MAX_LINE_EVALS {
            let (f, g, d) = self.evaluate(objective, p, alpha)?;
            if !f.is_finite() {
                alpha = 0.5 * (prev.alpha + alpha);
                continue;
            }
            let current = Trial { alpha, f, g };
            if f > self.f + ARMIJO * alpha * slope || (i > 0 && f >= prev.f) {
                return self.zoom(objective, p, slope, prev, prev_d, current);
            }
            if d.abs() <= -self.line_tol * slope {
                return Ok(Some(current));
            }
            if d >= 0.0 {
                return self.zoom(objective, p, slope, current, d, prev);
            }
            prev = current;
            prev_d = d;
            alpha *= EXPANSION;
        }
        Ok(None)
    }

    /// Zoom phase: shrinks `[lo, hi]` until a strong-Wolfe point is found.
    /// Falls back to the best sufficient-decrease point seen.
    fn zoom<O: Objective + ?Sized>(
        &self,
        objective: &O,
        p: &DVector<f64>,
        slope: f64,
        mut lo: Trial,
        mut lo_d: f64,
        mut hi: Trial,
    ) -> Result<Option<Trial>, MeshError> {
        for _ in 0..MAX_LINE_EVALS {
            let width = hi.alpha - lo.alpha;
            // minimizer of the quadratic through f(lo), f'(lo), f(hi)
            let denom = 2.0 * (hi.f - lo.f - lo_d * width);
            let low = lo.alpha.min(hi.alpha) + 0.1 * width.abs();
            let high = lo.alpha.max(hi.alpha) - 0.1 * width.abs();
            let alpha = Some(lo.alpha - lo_d * width * width / denom)
                .filter(|a| denom > 0.0 && (low..=high).contains(a))
                .unwrap_or(0.5 * (lo.alpha + hi.alpha));

            let (f, g, d) = self.evaluate(objective, p, alpha)?;
            let current = Trial { alpha, f, g };
            if !f.is_finite() || f > self.f + ARMIJO * alpha * slope || f >= lo.f {
                hi = current;
            } else {
                if d.abs() <= -self.line_tol * slope {
                    return Ok(Some(current));
                }
                if d * (hi.alpha - lo.alpha) >= 0.0 {
                    hi = lo;
                }
                lo = current;
                lo_d = d;
            }
            if (hi.alpha - lo.alpha).abs() <= f64::EPSILON * lo.alpha.abs().max(1.0) {
                break;
            }
        }
        Ok((lo.alpha > 0.0 && lo.f < self.f).then_some(lo))
    }
}
