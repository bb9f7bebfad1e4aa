//! Curve sampling for curved terrain
//!
//! Pure functions: sample circular arcs, elliptical arcs and quadratic Bezier
//! curves into `segments + 1` ordered points, each carrying the tangent
//! direction of the analytic derivative at that parameter.
//!
//! Angles follow screen space (+Y down), so `sin` grows downward.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A sampled position plus tangent direction (radians)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub pos: Vec2,
    pub angle: f32,
}

impl CurvePoint {
    pub fn new(x: f32, y: f32, angle: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            angle,
        }
    }
}

/// Parameter for sample `i` of `segments` (0 segments yields a single t = 0)
#[inline]
fn param(i: usize, segments: usize) -> f32 {
    if segments == 0 {
        0.0
    } else {
        i as f32 / segments as f32
    }
}

/// Sweep direction of an angle range; an empty range sweeps forward so the
/// tangent stays defined.
#[inline]
fn sweep_sign(start_angle: f32, end_angle: f32) -> f32 {
    if end_angle < start_angle { -1.0 } else { 1.0 }
}

/// Sample a circular arc from `start_angle` to `end_angle` (inclusive).
///
/// Tangent is perpendicular to the radius, signed by sweep direction.
pub fn sample_arc(
    center: Vec2,
    radius: f32,
    start_angle: f32,
    end_angle: f32,
    segments: usize,
) -> Vec<CurvePoint> {
    sample_elliptical_arc(center, Vec2::splat(radius), start_angle, end_angle, segments)
}

/// Sample an axis-aligned elliptical arc with radii `radii` (x, y).
pub fn sample_elliptical_arc(
    center: Vec2,
    radii: Vec2,
    start_angle: f32,
    end_angle: f32,
    segments: usize,
) -> Vec<CurvePoint> {
    let sweep = sweep_sign(start_angle, end_angle);

    (0..=segments)
        .map(|i| {
            let t = param(i, segments);
            let theta = start_angle + (end_angle - start_angle) * t;
            let (sin, cos) = theta.sin_cos();
            // d/dθ (rx cos θ, ry sin θ) = (-rx sin θ, ry cos θ)
            let dx = -radii.x * sin * sweep;
            let dy = radii.y * cos * sweep;
            CurvePoint::new(
                center.x + radii.x * cos,
                center.y + radii.y * sin,
                tangent_angle(dx, dy, theta, sweep),
            )
        })
        .collect()
}

/// Tangent angle from a derivative, falling back to the circular tangent when
/// the ellipse degenerates (a zero radius) so no sample ever reports 0/0.
#[inline]
fn tangent_angle(dx: f32, dy: f32, theta: f32, sweep: f32) -> f32 {
    if dx == 0.0 && dy == 0.0 {
        (theta.cos() * sweep).atan2(-theta.sin() * sweep)
    } else {
        dy.atan2(dx)
    }
}

/// Sample a quadratic Bezier `B(t) = (1-t)²·p0 + 2(1-t)t·control + t²·p1`.
pub fn sample_bezier(p0: Vec2, control: Vec2, p1: Vec2, segments: usize) -> Vec<CurvePoint> {
    (0..=segments)
        .map(|i| {
            let t = param(i, segments);
            let mt = 1.0 - t;
            let pos = p0 * (mt * mt) + control * (2.0 * mt * t) + p1 * (t * t);
            // B'(t) = 2(1-t)(control - p0) + 2t(p1 - control)
            let mut d = (control - p0) * (2.0 * mt) + (p1 - control) * (2.0 * t);
            if d == Vec2::ZERO {
                // Control point coincides with an endpoint: use the chord
                d = p1 - p0;
            }
            let angle = if d == Vec2::ZERO { 0.0 } else { d.y.atan2(d.x) };
            CurvePoint { pos, angle }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_arc_endpoints_match_analytic() {
        let center = Vec2::new(100.0, 200.0);
        let points = sample_arc(center, 50.0, 0.0, FRAC_PI_2, 8);
        assert_eq!(points.len(), 9);
        assert!((points[0].pos - Vec2::new(150.0, 200.0)).length() < 1e-3);
        assert!((points[8].pos - Vec2::new(100.0, 250.0)).length() < 1e-3);
    }

    #[test]
    fn test_arc_tangent_follows_sweep() {
        // Counter-sweep at θ=0: derivative (0, r) forward, (0, -r) reversed
        let forward = sample_arc(Vec2::ZERO, 10.0, 0.0, 1.0, 4);
        assert!((forward[0].angle - FRAC_PI_2).abs() < 1e-5);
        let reverse = sample_arc(Vec2::ZERO, 10.0, 0.0, -1.0, 4);
        assert!((reverse[0].angle + FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_zero_range_arc_is_degenerate_not_nan() {
        let points = sample_arc(Vec2::new(5.0, 5.0), 20.0, PI / 3.0, PI / 3.0, 6);
        assert_eq!(points.len(), 7);
        for p in &points {
            assert!(p.pos.is_finite());
            assert!(p.angle.is_finite());
            assert_eq!(p.angle, points[0].angle);
            assert_eq!(p.pos, points[0].pos);
        }
    }

    #[test]
    fn test_zero_segments_yields_single_point() {
        let points = sample_arc(Vec2::ZERO, 10.0, 0.0, PI, 0);
        assert_eq!(points.len(), 1);
        assert!(points[0].angle.is_finite());
    }

    #[test]
    fn test_degenerate_ellipse_has_finite_tangent() {
        let points = sample_elliptical_arc(Vec2::ZERO, Vec2::ZERO, 0.0, FRAC_PI_2, 4);
        assert!(points.iter().all(|p| p.angle.is_finite()));
    }

    #[test]
    fn test_bezier_endpoints_and_apex() {
        let p0 = Vec2::new(0.0, 100.0);
        let p1 = Vec2::new(200.0, 100.0);
        let control = Vec2::new(100.0, -100.0);
        let points = sample_bezier(p0, control, p1, 10);
        assert_eq!(points.len(), 11);
        assert_eq!(points[0].pos, p0);
        assert!((points[10].pos - p1).length() < 1e-3);
        // Apex at t=0.5: y = 0.25*100 + 0.5*(-100) + 0.25*100 = 0
        assert!((points[5].pos.y - 0.0).abs() < 1e-3);
        // Flat tangent at the apex
        assert!(points[5].angle.abs() < 1e-5);
        // Rising (negative y) at the start
        assert!(points[0].angle < 0.0);
    }

    #[test]
    fn test_bezier_degenerate_control() {
        let p = Vec2::new(3.0, 4.0);
        let points = sample_bezier(p, p, p, 4);
        assert!(points.iter().all(|pt| pt.angle == 0.0 && pt.pos == p));
    }

    proptest! {
        #[test]
        fn prop_arc_endpoints_and_spacing(
            radius in 1.0f32..500.0,
            start in -PI..PI,
            span in 0.05f32..PI,
            segments in 1usize..64,
        ) {
            let center = Vec2::new(10.0, -20.0);
            let end = start + span;
            let points = sample_arc(center, radius, start, end, segments);
            prop_assert_eq!(points.len(), segments + 1);

            let first = center + Vec2::new(start.cos(), start.sin()) * radius;
            let last = center + Vec2::new(end.cos(), end.sin()) * radius;
            prop_assert!((points[0].pos - first).length() < 1e-2 * radius.max(1.0));
            prop_assert!((points[segments].pos - last).length() < 1e-2 * radius.max(1.0));

            // Equal parameter steps on a circle give equal chords; no duplicates
            let expected_chord = 2.0 * radius * (span / segments as f32 / 2.0).sin();
            for pair in points.windows(2) {
                let chord = (pair[1].pos - pair[0].pos).length();
                prop_assert!(chord > 0.0);
                prop_assert!((chord - expected_chord).abs() < 1e-2 * radius.max(1.0));
            }
        }
    }
}
