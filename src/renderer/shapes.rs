//! Shape generation for terrain primitives
//!
//! All shapes are triangle lists in world space.

use glam::Vec2;

use super::vertex::Vertex;
use crate::sim::curve::CurvePoint;

/// Filled ramp triangle: `low` is the low end, `high` the high end, and the
/// right angle sits under the high end.
pub fn slope_triangle(low: Vec2, high: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    let corner = Vec2::new(high.x, low.y);
    vec![
        Vertex::new(low.x, low.y, color),
        Vertex::new(high.x, high.y, color),
        Vertex::new(corner.x, corner.y, color),
    ]
}

/// Fill the area between a sampled curve and a horizontal base line
pub fn curve_fill(points: &[CurvePoint], base_y: f32, color: [f32; 4]) -> Vec<Vertex> {
    if points.len() < 2 {
        return Vec::new();
    }

    let mut vertices = Vec::with_capacity((points.len() - 1) * 6);

    for pair in points.windows(2) {
        let a = pair[0].pos;
        let b = pair[1].pos;

        // Two triangles per column
        vertices.push(Vertex::new(a.x, a.y, color));
        vertices.push(Vertex::new(b.x, b.y, color));
        vertices.push(Vertex::new(a.x, base_y, color));

        vertices.push(Vertex::new(a.x, base_y, color));
        vertices.push(Vertex::new(b.x, b.y, color));
        vertices.push(Vertex::new(b.x, base_y, color));
    }

    vertices
}

/// Quad strip of `width` along a polyline (surface highlight)
pub fn curve_stroke(points: &[Vec2], width: f32, color: [f32; 4]) -> Vec<Vertex> {
    if points.len() < 2 {
        return Vec::new();
    }

    let half = width / 2.0;
    let mut vertices = Vec::with_capacity((points.len() - 1) * 6);

    for pair in points.windows(2) {
        let p1 = pair[0];
        let p2 = pair[1];

        // Direction from p1 to p2
        let dir = (p2 - p1).normalize_or_zero();
        if dir == Vec2::ZERO {
            continue;
        }
        // Perpendicular for width
        let perp = Vec2::new(-dir.y, dir.x) * half;

        let v1a = p1 + perp;
        let v1b = p1 - perp;
        let v2a = p2 + perp;
        let v2b = p2 - perp;

        vertices.push(Vertex::new(v1a.x, v1a.y, color));
        vertices.push(Vertex::new(v1b.x, v1b.y, color));
        vertices.push(Vertex::new(v2a.x, v2a.y, color));

        vertices.push(Vertex::new(v2a.x, v2a.y, color));
        vertices.push(Vertex::new(v1b.x, v1b.y, color));
        vertices.push(Vertex::new(v2b.x, v2b.y, color));
    }

    vertices
}

/// Axis-aligned rectangle centered on `center`
pub fn platform_quad(center: Vec2, size: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    let min = center - size / 2.0;
    let max = center + size / 2.0;
    vec![
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
    ]
}
