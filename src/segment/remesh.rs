//! Metric-driven redistribution of the points of a segment.
//!
//! Given `np` points, the segment's metric length `L` defines the target
//! edge length `scale = L / np`. The parametric positions `t` (with
//! `t[0] = 0` and `t[np - 1] = 1` fixed) minimize
//! `J(t) = Σ (ℓ_k − scale)²` over the edges `k = 1..np`, where `ℓ_k` is the
//! metric length of the edge `x(t[k-1]) → x(t[k])`.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use super::curve::Segment;
use super::metric::Metric;
use super::minimize::{Bfgs, IterStatus, Objective};
use crate::data::alloc::try_filled;
use crate::mesh_error::MeshError;

/// How the initial-guess root-finding budget is spent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitGuessBudget {
    /// One pool of iterations for all interior points; once exhausted, the
    /// remaining points are placed where their search starts.
    #[default]
    Shared,
    /// A fresh pool for every interior point.
    PerPoint,
}

/// Tolerances and caps of [`mesh_segment`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RemeshOptions {
    /// Length of the minimizer's first trial step.
    pub step_size: f64,
    /// Line-search tolerance of the minimizer.
    pub line_tol: f64,
    /// Convergence threshold on the gradient norm.
    pub grad_tol: f64,
    /// Maximum minimizer iterations.
    pub max_iterations: usize,
    /// Central-difference step of the objective gradient.
    pub fd_step: f64,
    /// Forward-difference step of the initial-guess root finding.
    pub guess_step: f64,
    /// Relative tolerance on each initial-guess edge length.
    pub guess_rel_tol: f64,
    /// Root-finding iterations available to the initial guess.
    pub guess_max_iterations: usize,
    /// Whether `guess_max_iterations` is shared by all points or per point.
    pub guess_budget: InitGuessBudget,
    /// Pieces used to measure the segment length; `None` uses `np`.
    pub length_samples: Option<usize>,
}

impl Default for RemeshOptions {
    fn default() -> Self {
        Self {
            step_size: 1.0e-3,
            line_tol: 1.0e-2,
            grad_tol: 1.0e-4,
            max_iterations: 15,
            fd_step: 1.0e-8,
            guess_step: 1.0e-6,
            guess_rel_tol: 1.0e-3,
            guess_max_iterations: 1000,
            guess_budget: InitGuessBudget::Shared,
            length_samples: None,
        }
    }
}

/// Result of [`mesh_segment`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentMesh {
    /// Parametric positions of the points, `t[0] = 0` and `t[np - 1] = 1`.
    pub t: Vec<f64>,
    /// Target metric edge length, `L / np`.
    pub scale: f64,
    /// Minimizer iterations performed.
    pub iterations: usize,
    /// Whether the gradient test passed.
    pub converged: bool,
}

impl SegmentMesh {
    /// Number of points.
    pub fn len(&self) -> usize {
        self.t.len()
    }

    /// Returns `true` if there are no points.
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }
}

fn check_points(np: usize) -> Result<(), MeshError> {
    if np < 2 {
        return Err(MeshError::InvalidSegment(format!(
            "at least 2 points are needed, got {np}"
        )));
    }
    Ok(())
}

/// Places interior points one after another so that each edge has metric
/// length `scale` (within `guess_rel_tol`), by Newton iteration on the
/// parameter with a forward-difference derivative.
///
/// The last edge takes whatever remains of the segment.
pub fn initial_guess<M: Metric + ?Sized>(
    segment: &Segment,
    metric: &M,
    np: usize,
    scale: f64,
    options: &RemeshOptions,
) -> Result<Vec<f64>, MeshError> {
    check_points(np)?;
    let e = options.guess_step;
    let dim = segment.dimension();
    let order = metric.order();
    let mut a = vec![0.0; dim];
    let mut b = vec![0.0; dim];
    let missed = |l: f64| (l - scale).abs() > options.guess_rel_tol * scale;

    let mut t = try_filled("initial guess", np as isize, 0.0)?;
    let mut used = 0;
    for ip in 1..np - 1 {
        if options.guess_budget == InitGuessBudget::PerPoint {
            used = 0;
        }
        let t0 = t[ip - 1];
        let mut ti = t0;
        let mut l = 0.0;
        while missed(l) && used < options.guess_max_iterations {
            segment.eval_into(ti, &mut a);
            segment.eval_into(ti + e, &mut b);
            let dl = metric.distance(order, &a, &b)?;
            let dt = -(l - scale) / (dl / e);
            if !dt.is_finite() {
                log::warn!(
                    "segment {}: length sensitivity vanished at t = {ti}, keeping point {ip} there",
                    segment.name()
                );
                break;
            }
            ti = (ti + dt).min(1.0 - e);
            segment.eval_into(t0, &mut a);
            segment.eval_into(ti, &mut b);
            l = metric.distance(order, &a, &b)?;
            used += 1;
        }
        if missed(l) && used >= options.guess_max_iterations {
            log::warn!(
                "segment {}: initial guess budget exhausted at point {ip}",
                segment.name()
            );
        }
        t[ip] = ti;
    }
    t[np - 1] = 1.0;
    Ok(t)
}

/// The remeshing objective of a segment under a metric.
pub struct SegmentObjective<'a, M: ?Sized> {
    segment: &'a Segment,
    metric: &'a M,
    scale: f64,
    fd_step: f64,
}

impl<'a, M: Metric + ?Sized> SegmentObjective<'a, M> {
    /// Objective with target edge length `scale` and gradient step `fd_step`.
    pub fn new(segment: &'a Segment, metric: &'a M, scale: f64, fd_step: f64) -> Self {
        Self {
            segment,
            metric,
            scale,
            fd_step,
        }
    }

    /// Target edge length.
    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    fn edge(
        &self,
        order: usize,
        t0: f64,
        t1: f64,
        a: &mut [f64],
        b: &mut [f64],
    ) -> Result<f64, MeshError> {
        self.segment.eval_into(t0, a);
        self.segment.eval_into(t1, b);
        self.metric.distance(order, a, b)
    }
}

impl<M: Metric + ?Sized> Objective for SegmentObjective<'_, M> {
    /// `Σ (ℓ_k − scale)²` with lengths at twice the metric order.
    fn value(&self, t: &DVector<f64>) -> Result<f64, MeshError> {
        let order = 2 * self.metric.order();
        let dim = self.segment.dimension();
        let (mut a, mut b) = (vec![0.0; dim], vec![0.0; dim]);
        let mut j = 0.0;
        for k in 1..t.len() {
            let l = self.edge(order, t[k - 1], t[k], &mut a, &mut b)?;
            j += (l - self.scale) * (l - self.scale);
        }
        Ok(j)
    }

    /// Central differences at interior points with lengths at the metric
    /// order; the endpoint components are zero.
    fn gradient(&self, t: &DVector<f64>, grad: &mut DVector<f64>) -> Result<(), MeshError> {
        let n = t.len();
        let order = self.metric.order();
        let eps = self.fd_step;
        let dim = self.segment.dimension();
        let (mut a, mut b) = (vec![0.0; dim], vec![0.0; dim]);
        let sq = |l: f64| (l - self.scale) * (l - self.scale);

        grad.fill(0.0);
        for k in 1..n.saturating_sub(1) {
            let (tm, tk, tp) = (t[k - 1], t[k], t[k + 1]);
            let next_plus = self.edge(order, tk + eps, tp, &mut a, &mut b)?;
            let prev_plus = self.edge(order, tm, tk + eps, &mut a, &mut b)?;
            let next_minus = self.edge(order, tk - eps, tp, &mut a, &mut b)?;
            let prev_minus = self.edge(order, tm, tk - eps, &mut a, &mut b)?;
            grad[k] = (sq(next_plus) - sq(next_minus)) / (2.0 * eps)
                + (sq(prev_plus) - sq(prev_minus)) / (2.0 * eps);
        }
        Ok(())
    }
}

/// Distributes `np` points along `segment` so that all edges have nearly
/// equal metric length.
///
/// The segment's metric length is computed on first use and cached on the
/// segment. The minimizer stops after `max_iterations`, on convergence, or
/// when a step makes no progress; the best iterate so far is returned in
/// every case.
///
/// # Errors
/// - [`MeshError::InvalidSegment`] if `np < 2`.
/// - [`MeshError::DimensionMismatch`] if the metric and segment dimensions
///   differ.
/// - Metric and minimizer errors.
pub fn mesh_segment<M: Metric + ?Sized>(
    segment: &mut Segment,
    metric: &M,
    np: usize,
    options: &RemeshOptions,
) -> Result<SegmentMesh, MeshError> {
    check_points(np)?;
    if segment.dimension() != metric.dimension() {
        return Err(MeshError::DimensionMismatch {
            context: "segment remeshing",
            expected: metric.dimension(),
            found: segment.dimension(),
        });
    }
    let length = segment.metric_length_with(metric, options.length_samples.unwrap_or(np))?;
    let scale = length / np as f64;

    let segment: &Segment = segment;
    let t0 = initial_guess(segment, metric, np, scale, options)?;
    let objective = SegmentObjective::new(segment, metric, scale, options.fd_step);
    let mut solver = Bfgs::new(
        &objective,
        DVector::from_vec(t0),
        options.step_size,
        options.line_tol,
    )?;

    let mut iterations = 0;
    while iterations < options.max_iterations {
        iterations += 1;
        if solver.iterate(&objective)? == IterStatus::NoProgress {
            log::debug!(
                "segment {}: minimizer made no progress at iteration {iterations}",
                segment.name()
            );
            break;
        }
        log::debug!(
            "segment {}: iteration {iterations}, gradient norm {:e}",
            segment.name(),
            solver.gradient_norm()
        );
        if solver.test_gradient(options.grad_tol) {
            break;
        }
    }
    let converged = solver.test_gradient(options.grad_tol);
    if !converged {
        log::warn!(
            "segment {}: gradient norm {:e} above {:e} after {iterations} iterations",
            segment.name(),
            solver.gradient_norm(),
            options.grad_tol
        );
    }

    log::info!("segment {} scale: {scale:.3e}", segment.name());
    Ok(SegmentMesh {
        t: solver.into_x().iter().copied().collect(),
        scale,
        iterations,
        converged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::interp::InterpKind;
    use crate::segment::metric::{Euclidean, TensorMetric};

    fn straight() -> Segment {
        Segment::new("bottom", &[[0.0, 0.0], [1.0, 0.0], [4.0, 0.0]], InterpKind::Linear).unwrap()
    }

    #[test]
    fn guess_places_points_at_scale() {
        let seg = straight();
        let t = initial_guess(&seg, &Euclidean::new(2), 6, 4.0 / 6.0, &RemeshOptions::default())
            .unwrap();
        assert_eq!(t.len(), 6);
        assert_eq!((t[0], t[5]), (0.0, 1.0));
        for (k, tk) in t.iter().enumerate().take(5).skip(1) {
            assert!((tk - k as f64 / 6.0).abs() < 1e-3 / 6.0, "t[{k}] = {tk}");
        }
    }

    #[test]
    fn exhausted_shared_budget_stacks_points() {
        let seg = straight();
        let options = RemeshOptions {
            guess_max_iterations: 1,
            ..RemeshOptions::default()
        };
        let t = initial_guess(&seg, &Euclidean::new(2), 5, 0.8, &options).unwrap();
        // one Newton step lands point 1, later points start on it and stay
        assert!((t[1] - 0.2).abs() < 1e-6);
        assert_eq!(t[2], t[1]);
        assert_eq!(t[3], t[1]);

        let per_point = RemeshOptions {
            guess_budget: InitGuessBudget::PerPoint,
            ..options
        };
        let t = initial_guess(&seg, &Euclidean::new(2), 5, 0.8, &per_point).unwrap();
        assert!((t[3] - 0.6).abs() < 1e-5);
    }

    #[test]
    fn gradient_vanishes_at_uniform_spacing() {
        let seg = straight();
        let metric = Euclidean::new(2);
        let objective = SegmentObjective::new(&seg, &metric, 1.0, 1e-8);
        let t = DVector::from_vec(vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        let mut g = DVector::zeros(5);
        let j = objective.value_and_gradient(&t, &mut g).unwrap();
        assert!(j.abs() < 1e-20);
        assert!(g.norm() < 1e-6);

        let t = DVector::from_vec(vec![0.0, 0.3, 0.5, 0.75, 1.0]);
        objective.gradient(&t, &mut g).unwrap();
        assert_eq!((g[0], g[4]), (0.0, 0.0));
        // moving point 1 back towards 0.25 lowers J
        assert!(g[1] > 0.0);
    }

    #[test]
    fn straight_segment_is_uniform() {
        let mut seg = straight();
        let out = mesh_segment(&mut seg, &Euclidean::new(2), 6, &RemeshOptions::default()).unwrap();
        assert!((out.scale - 4.0 / 6.0).abs() < 1e-12);
        assert!((seg.metric_length().unwrap() - 4.0).abs() < 1e-12);
        assert!(out.converged);
        assert!(out.iterations <= 15);
        for (k, tk) in out.t.iter().enumerate() {
            assert!((tk - k as f64 / 5.0).abs() < 1e-6, "t[{k}] = {tk}");
        }
    }

    #[test]
    fn graded_metric_equalizes_edges() {
        let metric = TensorMetric::new(
            |p| {
                let h = (1.0 + p[0]) * (1.0 + p[0]);
                [[h, 0.0], [0.0, h]]
            },
            3,
        );
        let mut seg =
            Segment::new("graded", &[[0.0, 0.0], [1.0, 0.0]], InterpKind::Linear).unwrap();
        let out = mesh_segment(&mut seg, &metric, 5, &RemeshOptions::default()).unwrap();
        assert!((out.scale - 0.3).abs() < 1e-9);
        assert!(out.converged);
        let lengths: Vec<f64> = out
            .t
            .windows(2)
            .map(|w| metric.distance(6, &seg.eval(w[0]), &seg.eval(w[1])).unwrap())
            .collect();
        for l in &lengths {
            assert!((l - 0.375).abs() < 1e-4, "{lengths:?}");
        }
        // points crowd where the metric is large
        assert!(out.t[1] - out.t[0] > out.t[4] - out.t[3]);
    }

    #[test]
    fn two_points_need_no_work() {
        let mut seg = straight();
        let out = mesh_segment(&mut seg, &Euclidean::new(2), 2, &RemeshOptions::default()).unwrap();
        assert_eq!(out.t, vec![0.0, 1.0]);
        assert!(out.converged);
        assert!((out.scale - 2.0).abs() < 1e-12);
    }

    #[test]
    fn invalid_requests_are_errors() {
        let mut seg = straight();
        let metric = Euclidean::new(2);
        assert!(matches!(
            mesh_segment(&mut seg, &metric, 1, &RemeshOptions::default()),
            Err(MeshError::InvalidSegment(_))
        ));
        assert!(matches!(
            mesh_segment(&mut seg, &Euclidean::new(3), 4, &RemeshOptions::default()),
            Err(MeshError::DimensionMismatch { .. })
        ));
    }
}
