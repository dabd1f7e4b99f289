//! Cubic interpolation of series points into Bézier control points.
//!
//! Every mode yields one [`BezierControls`] pair per adjacent point pair.
//! Degenerate input (NaN samples, duplicate X, zero-length spans) contributes
//! zero curvature or a zero tangent locally; control points are always finite.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::primitives::CalendarPeriod;
use crate::core::types::ChartPoint;

const ONE_THIRD: f64 = 1.0 / 3.0;

/// Interpolation policy used by spline series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SplineMode {
    #[default]
    Natural,
    Clamped,
    Cardinal,
    Monotonic,
}

/// Boundary condition of the second-derivative solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurvatureBoundary {
    /// Second derivative is zero at both ends.
    Natural,
    /// End slopes come from the `(x1 - x0) / (y1 - y0)` ratio of the end spans.
    Clamped,
}

/// Axis space in which cardinal tangents are taken.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum TangentSpace {
    #[default]
    Linear,
    /// X is laid out logarithmically with this base.
    Logarithmic { base: f64 },
    /// X holds OLE days on an axis that gives every calendar period equal width.
    Calendar(CalendarPeriod),
}

/// The two inner control points of one cubic Bézier segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BezierControls {
    pub control1: ChartPoint,
    pub control2: ChartPoint,
}

impl BezierControls {
    /// Controls of a straight segment between `start` and `end`.
    #[must_use]
    pub fn straight(start: ChartPoint, end: ChartPoint) -> Self {
        let (start, end) = (finite_point(start), finite_point(end));
        Self {
            control1: ChartPoint::new(
                start.x + (end.x - start.x) * ONE_THIRD,
                start.y + (end.y - start.y) * ONE_THIRD,
            ),
            control2: ChartPoint::new(
                start.x + (end.x - start.x) * 2.0 * ONE_THIRD,
                start.y + (end.y - start.y) * 2.0 * ONE_THIRD,
            ),
        }
    }
}

/// Computes control points for every adjacent pair of `(x, y)`.
#[must_use]
pub fn compute_curve(x: &[f64], y: &[f64], mode: SplineMode) -> Vec<BezierControls> {
    compute_curve_with(x, y, mode, TangentSpace::Linear)
}

/// [`compute_curve`] with an explicit cardinal tangent space.
///
/// `space` only affects [`SplineMode::Cardinal`].
#[must_use]
pub fn compute_curve_with(
    x: &[f64],
    y: &[f64],
    mode: SplineMode,
    space: TangentSpace,
) -> Vec<BezierControls> {
    let n = paired_len(x, y);
    if n < 2 {
        return Vec::new();
    }
    let (x, y) = (&x[..n], &y[..n]);

    match mode {
        SplineMode::Natural => natural_curve(x, y, CurvatureBoundary::Natural),
        SplineMode::Clamped => natural_curve(x, y, CurvatureBoundary::Clamped),
        SplineMode::Cardinal => cardinal_curve(x, y, space),
        SplineMode::Monotonic => monotonic_curve(x, y),
    }
}

fn natural_curve(x: &[f64], y: &[f64], boundary: CurvatureBoundary) -> Vec<BezierControls> {
    let ys2 = second_derivatives(x, y, boundary);
    (0..x.len() - 1)
        .map(|i| {
            bezier_from_second_derivatives(
                ChartPoint::new(x[i], y[i]),
                ChartPoint::new(x[i + 1], y[i + 1]),
                ys2[i],
                ys2[i + 1],
            )
        })
        .collect()
}

/// Second-derivative coefficients of the cubic spline through `(x, y)`.
///
/// One forward sweep and one back-substitution over the tridiagonal system.
/// Interior points with a NaN in their three-point stencil, or sharing X with
/// a neighbor, are solved as zero curvature.
#[must_use]
pub fn second_derivatives(x: &[f64], y: &[f64], boundary: CurvatureBoundary) -> Vec<f64> {
    let n = paired_len(x, y);
    let mut ys2 = vec![0.0; n];
    if n < 2 {
        return ys2;
    }
    let mut u = vec![0.0; n];

    if boundary == CurvatureBoundary::Clamped {
        let h0 = x[1] - x[0];
        let slope = finite_or_zero(h0 / (y[1] - y[0]));
        ys2[0] = -0.5;
        u[0] = finite_or_zero((3.0 / h0) * ((y[1] - y[0]) / h0 - slope));
    }

    for i in 1..n - 1 {
        let stencil_has_nan = y[i - 1].is_nan() || y[i].is_nan() || y[i + 1].is_nan();
        if stencil_has_nan || x[i] == x[i - 1] || x[i] == x[i + 1] {
            ys2[i] = 0.0;
            u[i] = 0.0;
            continue;
        }
        let sig = (x[i] - x[i - 1]) / (x[i + 1] - x[i - 1]);
        let p = sig * ys2[i - 1] + 2.0;
        let slope_delta =
            (y[i + 1] - y[i]) / (x[i + 1] - x[i]) - (y[i] - y[i - 1]) / (x[i] - x[i - 1]);
        ys2[i] = finite_or_zero((sig - 1.0) / p);
        u[i] = finite_or_zero((6.0 * slope_delta / (x[i + 1] - x[i - 1]) - sig * u[i - 1]) / p);
    }

    let last = n - 1;
    ys2[last] = match boundary {
        CurvatureBoundary::Natural => 0.0,
        CurvatureBoundary::Clamped => {
            let hn = x[last] - x[last - 1];
            let slope = finite_or_zero(hn / (y[last] - y[last - 1]));
            let un = finite_or_zero((3.0 / hn) * (slope - (y[last] - y[last - 1]) / hn));
            finite_or_zero((un - 0.5 * u[last - 1]) / (0.5 * ys2[last - 1] + 1.0))
        }
    };

    for k in (0..last).rev() {
        ys2[k] = finite_or_zero(ys2[k] * ys2[k + 1] + u[k]);
    }
    ys2
}

/// Converts one cubic span with end curvatures `ys1`/`ys2` into Bézier form.
#[must_use]
pub fn bezier_from_second_derivatives(
    start: ChartPoint,
    end: ChartPoint,
    ys1: f64,
    ys2: f64,
) -> BezierControls {
    let (start, end) = (finite_point(start), finite_point(end));
    let (ys1, ys2) = (finite_or_zero(ys1), finite_or_zero(ys2));
    let span_sq = (end.x - start.x) * (end.x - start.x);

    let y1 = ONE_THIRD * ((2.0 * start.y + end.y) - ONE_THIRD * span_sq * (ys1 + 0.5 * ys2));
    let y2 = ONE_THIRD * ((start.y + 2.0 * end.y) - ONE_THIRD * span_sq * (0.5 * ys1 + ys2));
    BezierControls {
        control1: ChartPoint::new((2.0 * start.x + end.x) * ONE_THIRD, finite_or_zero(y1)),
        control2: ChartPoint::new((start.x + 2.0 * end.x) * ONE_THIRD, finite_or_zero(y2)),
    }
}

/// Per-point cardinal tangents: half the secant across the neighbors, or
/// across the first/last three points at the ends.
#[must_use]
pub fn cardinal_tangents(x: &[f64], y: &[f64]) -> Vec<ChartPoint> {
    let n = paired_len(x, y);
    if n < 2 {
        return vec![ChartPoint::new(0.0, 0.0); n];
    }
    (0..n)
        .map(|i| {
            let (from, to) = if i == 0 {
                (0, 2.min(n - 1))
            } else if i == n - 1 {
                (n - 1 - 2.min(n - 1), n - 1)
            } else {
                (i - 1, i + 1)
            };
            ChartPoint::new(
                finite_or_zero(0.5 * (x[to] - x[from])),
                finite_or_zero(0.5 * (y[to] - y[from])),
            )
        })
        .collect()
}

fn cardinal_curve(x: &[f64], y: &[f64], space: TangentSpace) -> Vec<BezierControls> {
    let (axis_x, space) = match to_tangent_space(x, space) {
        Some(axis_x) => (axis_x, space),
        None => {
            warn!(?space, "x values fall outside tangent space, using linear tangents");
            (x.to_vec(), TangentSpace::Linear)
        }
    };

    let tangents = cardinal_tangents(&axis_x, y);
    (0..x.len() - 1)
        .map(|i| {
            let start = finite_point(ChartPoint::new(axis_x[i], y[i]));
            let end = finite_point(ChartPoint::new(axis_x[i + 1], y[i + 1]));
            let control1 = start.x + tangents[i].x * ONE_THIRD;
            let control2 = end.x - tangents[i + 1].x * ONE_THIRD;
            BezierControls {
                control1: ChartPoint::new(
                    from_tangent_space(control1, space, x[i]),
                    start.y + tangents[i].y * ONE_THIRD,
                ),
                control2: ChartPoint::new(
                    from_tangent_space(control2, space, x[i + 1]),
                    end.y - tangents[i + 1].y * ONE_THIRD,
                ),
            }
        })
        .collect()
}

fn to_tangent_space(x: &[f64], space: TangentSpace) -> Option<Vec<f64>> {
    match space {
        TangentSpace::Linear => Some(x.to_vec()),
        TangentSpace::Logarithmic { base } => {
            if !(base.is_finite() && base > 0.0 && base != 1.0) {
                return None;
            }
            x.iter()
                .map(|&value| {
                    let mapped = value.log(base);
                    (mapped.is_finite() || value.is_nan()).then_some(mapped)
                })
                .collect()
        }
        TangentSpace::Calendar(period) => x
            .iter()
            .map(|&value| {
                if value.is_nan() {
                    Some(value)
                } else {
                    period.from_ole_days(value)
                }
            })
            .collect(),
    }
}

fn from_tangent_space(value: f64, space: TangentSpace, fallback: f64) -> f64 {
    let mapped = match space {
        TangentSpace::Linear => Some(value),
        TangentSpace::Logarithmic { base } => Some(base.powf(value)),
        TangentSpace::Calendar(period) => period.to_ole_days(value),
    };
    mapped
        .filter(|mapped| mapped.is_finite())
        .unwrap_or_else(|| finite_or_zero(fallback))
}

/// Slope-limited derivatives of the monotonic cubic through `(x, y)`.
///
/// A point between secants of opposite sign (or next to a flat secant) gets a
/// zero derivative; otherwise the secants are blended by a weighted harmonic
/// mean. End derivatives equal the adjacent secant.
#[must_use]
pub fn monotonic_derivatives(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = paired_len(x, y);
    if n < 2 {
        return vec![0.0; n];
    }

    let spans: Vec<f64> = x.windows(2).take(n - 1).map(|w| w[1] - w[0]).collect();
    let secants: Vec<f64> = spans
        .iter()
        .zip(y.windows(2))
        .map(|(h, w)| finite_or_zero((w[1] - w[0]) / h))
        .collect();

    let mut derivatives = vec![0.0; n];
    derivatives[0] = secants[0];
    derivatives[n - 1] = secants[n - 2];
    for k in 1..n - 1 {
        let (s1, s2) = (secants[k - 1], secants[k]);
        if s1 * s2 <= 0.0 {
            continue;
        }
        let (h1, h2) = (spans[k - 1], spans[k]);
        let w1 = 2.0 * h2 + h1;
        let w2 = h2 + 2.0 * h1;
        derivatives[k] = finite_or_zero((w1 + w2) / (w1 / s1 + w2 / s2));
    }
    derivatives
}

fn monotonic_curve(x: &[f64], y: &[f64]) -> Vec<BezierControls> {
    let derivatives = monotonic_derivatives(x, y);
    (0..x.len() - 1)
        .map(|i| {
            let start = finite_point(ChartPoint::new(x[i], y[i]));
            let end = finite_point(ChartPoint::new(x[i + 1], y[i + 1]));
            let third = (end.x - start.x) * ONE_THIRD;
            BezierControls {
                control1: ChartPoint::new(
                    start.x + third,
                    finite_or_zero(start.y + derivatives[i] * third),
                ),
                control2: ChartPoint::new(
                    end.x - third,
                    finite_or_zero(end.y - derivatives[i + 1] * third),
                ),
            }
        })
        .collect()
}

fn paired_len(x: &[f64], y: &[f64]) -> usize {
    debug_assert_eq!(x.len(), y.len(), "x and y must be index-aligned");
    x.len().min(y.len())
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn finite_point(point: ChartPoint) -> ChartPoint {
    ChartPoint::new(finite_or_zero(point.x), finite_or_zero(point.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_boundary_curvature_is_exactly_zero() {
        let ys2 =
            second_derivatives(&[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0], CurvatureBoundary::Natural);
        assert_eq!(ys2[0], 0.0);
        assert_eq!(ys2[2], 0.0);
        assert!((ys2[1] + 3.0).abs() < 1e-12);
    }

    #[test]
    fn natural_spline_of_a_line_is_straight() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 2.0, 4.0, 6.0];
        let ys2 = second_derivatives(&x, &y, CurvatureBoundary::Natural);
        assert!(ys2.iter().all(|v| v.abs() < 1e-12));
        let curve = compute_curve(&x, &y, SplineMode::Natural);
        assert!((curve[1].control1.y - (2.0 + 2.0 / 3.0)).abs() < 1e-12);
        assert!((curve[1].control2.y - (2.0 + 4.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn duplicate_x_is_solved_as_zero_curvature() {
        let x = [0.0, 1.0, 1.0, 2.0];
        let y = [0.0, 1.0, 2.0, 0.0];
        let ys2 = second_derivatives(&x, &y, CurvatureBoundary::Natural);
        assert_eq!(ys2[1], 0.0);
        assert_eq!(ys2[2], 0.0);
        let curve = compute_curve(&x, &y, SplineMode::Natural);
        assert_eq!(curve.len(), 3);
    }

    #[test]
    fn clamped_two_point_curve_is_finite() {
        for y in [[0.0, 1.0], [1.0, 1.0]] {
            let curve = compute_curve(&[0.0, 1.0], &y, SplineMode::Clamped);
            assert_eq!(curve.len(), 1);
            assert!(curve[0].control1.is_finite() && curve[0].control2.is_finite());
        }
    }

    #[test]
    fn monotonic_zeroes_derivative_at_extremum() {
        let d = monotonic_derivatives(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 1.0, 0.0]);
        assert_eq!(d, vec![1.0, 0.0, 0.0, -1.0]);
    }

    #[test]
    fn monotonic_blends_same_sign_secants_harmonically() {
        let d = monotonic_derivatives(&[0.0, 1.0, 2.0], &[0.0, 1.0, 3.0]);
        // secants 1 and 2 with equal spans: 6 / (3 / 1 + 3 / 2)
        assert!((d[1] - 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn cardinal_uses_neighbor_secants() {
        let tangents = cardinal_tangents(&[0.0, 1.0, 2.0, 4.0], &[0.0, 2.0, 2.0, 0.0]);
        assert_eq!(tangents[1], ChartPoint::new(1.0, 1.0));
        assert_eq!(tangents[0], ChartPoint::new(1.0, 1.0));
        assert_eq!(tangents[3], ChartPoint::new(1.5, -1.0));
    }

    #[test]
    fn nan_samples_never_leak_into_controls() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, f64::NAN, 3.0, 2.0];
        for mode in [
            SplineMode::Natural,
            SplineMode::Clamped,
            SplineMode::Cardinal,
            SplineMode::Monotonic,
        ] {
            for controls in compute_curve(&x, &y, mode) {
                assert!(controls.control1.is_finite(), "{mode:?}");
                assert!(controls.control2.is_finite(), "{mode:?}");
            }
        }
    }

    #[test]
    fn logarithmic_tangents_map_back_to_data_space() {
        let x = [1.0, 10.0, 100.0];
        let y = [0.0, 1.0, 2.0];
        let space = TangentSpace::Logarithmic { base: 10.0 };
        let curve = compute_curve_with(&x, &y, SplineMode::Cardinal, space);
        // In log space the points are evenly spaced, so controls sit at 1/3 decades.
        assert!((curve[0].control1.x - 10f64.powf(1.0 / 3.0)).abs() < 1e-9);
        assert!((curve[1].control2.x - 10f64.powf(5.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn invalid_log_base_falls_back_to_linear() {
        let x = [1.0, 2.0, 3.0];
        let y = [0.0, 1.0, 0.0];
        let linear = compute_curve(&x, &y, SplineMode::Cardinal);
        let space = TangentSpace::Logarithmic { base: 1.0 };
        let fallback = compute_curve_with(&x, &y, SplineMode::Cardinal, space);
        assert_eq!(linear, fallback);
    }
}
