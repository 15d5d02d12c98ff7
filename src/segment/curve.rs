//! Boundary segments: named curves parametrized over `[0, 1]`.

use serde::{Deserialize, Serialize};

use super::interp::{InterpKind, Interpolant};
use super::metric::Metric;
use crate::mesh_error::MeshError;

/// A named curve through anchor points, parametrized by normalized chord
/// length.
///
/// Anchor `i` sits at parameter `s[i]`, with `s[0] = 0` and `s[n - 1] = 1`.
/// Each coordinate is interpolated separately over `s`. Deserialization
/// rebuilds the segment from its anchor coordinates with [`Segment::new`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSegment")]
pub struct Segment {
    name: String,
    s: Vec<f64>,
    coords: Vec<Vec<f64>>,
    interp: Vec<Interpolant>,
    metric_length: Option<f64>,
}

/// Unchecked wire form of [`Segment`].
#[derive(Deserialize)]
struct RawSegment {
    name: String,
    s: Vec<f64>,
    coords: Vec<Vec<f64>>,
    interp: Vec<Interpolant>,
    metric_length: Option<f64>,
}

impl TryFrom<RawSegment> for Segment {
    type Error = MeshError;

    fn try_from(raw: RawSegment) -> Result<Self, MeshError> {
        let name = raw.name;
        let kind = raw.interp.first().map(Interpolant::kind).ok_or_else(|| {
            MeshError::InvalidSegment(format!("segment {name} has no interpolants"))
        })?;
        if raw.interp.len() != raw.coords.len() || raw.interp.iter().any(|f| f.kind() != kind) {
            return Err(MeshError::InvalidSegment(format!(
                "segment {name} interpolants do not match its {} coordinates",
                raw.coords.len()
            )));
        }
        let n = raw.s.len();
        if raw.coords.iter().any(|c| c.len() != n) {
            return Err(MeshError::InvalidSegment(format!(
                "segment {name} coordinate arrays differ from its {n} anchors"
            )));
        }
        let points: Vec<Vec<f64>> = (0..n)
            .map(|i| raw.coords.iter().map(|c| c[i]).collect())
            .collect();
        let mut segment = Segment::new(name, &points, kind)?;
        if segment.s != raw.s {
            return Err(MeshError::InvalidSegment(format!(
                "segment {} anchors are not its normalized chord lengths",
                segment.name
            )));
        }
        if let Some(length) = raw.metric_length {
            if !(length.is_finite() && length > 0.0) {
                return Err(MeshError::InvalidMetric(format!(
                    "segment {} has metric length {length}",
                    segment.name
                )));
            }
        }
        segment.metric_length = raw.metric_length;
        Ok(segment)
    }
}

impl Segment {
    /// Builds a segment through `points` interpolated with `kind`.
    ///
    /// # Errors
    /// [`MeshError::InvalidSegment`] if there are too few points for `kind`,
    /// if two consecutive points coincide, or if the points do not all have
    /// the same non-zero dimension.
    pub fn new<P: AsRef<[f64]>>(
        name: impl Into<String>,
        points: &[P],
        kind: InterpKind,
    ) -> Result<Self, MeshError> {
        let name = name.into();
        let dimension = points.first().map_or(0, |p| p.as_ref().len());
        if dimension == 0 {
            return Err(MeshError::InvalidSegment(format!("segment {name} has no coordinates")));
        }
        if let Some(p) = points.iter().find(|p| p.as_ref().len() != dimension) {
            return Err(MeshError::InvalidSegment(format!(
                "segment {name} mixes {dimension}D and {}D points",
                p.as_ref().len()
            )));
        }

        let mut s = Vec::with_capacity(points.len());
        let mut total = 0.0;
        for (i, p) in points.iter().enumerate() {
            if i > 0 {
                let prev = points[i - 1].as_ref();
                let chord = p
                    .as_ref()
                    .iter()
                    .zip(prev)
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum::<f64>()
                    .sqrt();
                if chord <= f64::EPSILON {
                    return Err(MeshError::InvalidSegment(format!(
                        "segment {name} repeats point {}",
                        i - 1
                    )));
                }
                total += chord;
            }
            s.push(total);
        }
        if points.len() < kind.min_points() {
            return Err(MeshError::InvalidSegment(format!(
                "segment {name} needs at least {} points, got {}",
                kind.min_points(),
                points.len()
            )));
        }
        for v in &mut s {
            *v /= total;
        }
        // exact end despite rounding in the normalization
        if let Some(last) = s.last_mut() {
            *last = 1.0;
        }

        let coords: Vec<Vec<f64>> = (0..dimension)
            .map(|d| points.iter().map(|p| p.as_ref()[d]).collect())
            .collect();
        let interp = coords
            .iter()
            .map(|c| Interpolant::new(kind, &s, c))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name,
            s,
            coords,
            interp,
            metric_length: None,
        })
    }

    /// Segment name, used in log output.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of coordinates per point.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.coords.len()
    }

    /// Normalized chord-length parameter of each anchor.
    #[inline]
    pub fn anchors(&self) -> &[f64] {
        &self.s
    }

    /// Anchor coordinates along dimension `d`.
    pub fn anchor_coords(&self, d: usize) -> Option<&[f64]> {
        self.coords.get(d).map(Vec::as_slice)
    }

    /// Interpolation scheme.
    pub fn kind(&self) -> InterpKind {
        self.interp
            .first()
            .map_or(InterpKind::default(), Interpolant::kind)
    }

    /// Point at parameter `t`, clamped to `[0, 1]`.
    pub fn eval(&self, t: f64) -> Vec<f64> {
        self.interp.iter().map(|f| f.eval(t)).collect()
    }

    /// Writes the point at parameter `t` into `out`.
    pub(crate) fn eval_into(&self, t: f64, out: &mut [f64]) {
        for (o, f) in out.iter_mut().zip(&self.interp) {
            *o = f.eval(t);
        }
    }

    /// Cached metric length, if computed.
    #[inline]
    pub fn metric_length(&self) -> Option<f64> {
        self.metric_length
    }

    /// Metric length of the whole segment, computed with `samples` pieces on
    /// first use and cached afterwards.
    pub fn metric_length_with<M: Metric + ?Sized>(
        &mut self,
        metric: &M,
        samples: usize,
    ) -> Result<f64, MeshError> {
        if let Some(length) = self.metric_length {
            return Ok(length);
        }
        let length = metric.curve_length(self, samples)?;
        if !(length.is_finite() && length > 0.0) {
            return Err(MeshError::InvalidMetric(format!(
                "segment {} has metric length {length}",
                self.name
            )));
        }
        self.metric_length = Some(length);
        Ok(length)
    }

    /// Forgets the cached metric length, e.g. after the metric changed.
    pub fn reset_metric_length(&mut self) {
        self.metric_length = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::metric::Euclidean;

    #[test]
    fn anchors_follow_chord_length() {
        let seg = Segment::new("wall", &[[0.0, 0.0], [1.0, 0.0], [4.0, 0.0]], InterpKind::Linear)
            .unwrap();
        assert_eq!(seg.anchors(), &[0.0, 0.25, 1.0]);
        assert_eq!(seg.dimension(), 2);
        let mid = seg.eval(0.5);
        assert!((mid[0] - 2.0).abs() < 1e-12 && mid[1].abs() < 1e-12);
    }

    #[test]
    fn length_is_memoized() {
        let mut seg = Segment::new("s", &[[0.0, 0.0], [3.0, 4.0]], InterpKind::Linear).unwrap();
        assert_eq!(seg.metric_length(), None);
        let l = seg.metric_length_with(&Euclidean::new(2), 4).unwrap();
        assert!((l - 5.0).abs() < 1e-12);
        assert_eq!(seg.metric_length(), Some(l));
        // cached value wins over new sampling until reset
        assert_eq!(seg.metric_length_with(&Euclidean::new(2), 1).unwrap(), l);
        seg.reset_metric_length();
        assert_eq!(seg.metric_length(), None);
    }

    #[test]
    fn invalid_definitions_are_rejected() {
        let none: [[f64; 2]; 0] = [];
        assert!(Segment::new("a", &none, InterpKind::Linear).is_err());
        assert!(Segment::new("b", &[[0.0, 0.0]], InterpKind::Linear).is_err());
        assert!(Segment::new("c", &[[0.0, 0.0], [0.0, 0.0]], InterpKind::Linear).is_err());
        assert!(
            Segment::new("d", &[[0.0, 0.0], [1.0, 0.0]], InterpKind::CubicSpline).is_err()
        );
        let mixed: [&[f64]; 2] = [&[0.0, 0.0], &[1.0, 0.0, 0.0]];
        assert!(Segment::new("e", &mixed, InterpKind::Linear).is_err());
    }

    #[test]
    fn json_round_trip_keeps_cached_length() {
        let mut seg =
            Segment::new("arc", &[[0.0, 0.0], [1.0, 1.0], [2.0, 0.0]], InterpKind::CubicSpline)
                .unwrap();
        seg.metric_length_with(&Euclidean::new(2), 8).unwrap();
        let back: Segment = serde_json::from_str(&serde_json::to_string(&seg).unwrap()).unwrap();
        assert_eq!(back, seg);
    }

    #[test]
    fn inconsistent_json_is_rejected() {
        let seg = Segment::new("l", &[[0.0, 0.0], [1.0, 0.0], [3.0, 0.0]], InterpKind::Linear)
            .unwrap();
        let mut value = serde_json::to_value(&seg).unwrap();
        value["s"] = serde_json::json!([0.0, 0.5, 1.0]);
        assert!(serde_json::from_value::<Segment>(value).is_err());

        let mut value = serde_json::to_value(&seg).unwrap();
        value["coords"][1] = serde_json::json!([0.0, 0.0]);
        assert!(serde_json::from_value::<Segment>(value).is_err());

        let mut value = serde_json::to_value(&seg).unwrap();
        value["metric_length"] = serde_json::json!(-1.0);
        assert!(serde_json::from_value::<Segment>(value).is_err());
    }
}
