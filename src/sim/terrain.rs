//! Terrain registry: straight and curved slopes
//!
//! Owns every slope in the level, builds its collision segments and render
//! mesh, and answers the per-frame question "what surface is under the
//! player". The first matching slope in registration order wins; surfaces are
//! never blended.
//!
//! Coordinates are screen space (+Y down). A slope's "low end" therefore has
//! the larger Y.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::curve::{self, CurvePoint};
use crate::renderer::{DrawHandle, TerrainCanvas, Vertex, colors, shapes};
use crate::tuning::SlopeTuning;
use crate::{angle_to_dir, sign};

/// Segments shorter than this horizontally cannot be interpolated
const MIN_SPAN: f32 = 1e-4;

/// Stable id of a registered slope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TerrainId(pub u32);

/// Which side of a ramp is low
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlopeDirection {
    /// Low on the left, rises left-to-right
    Left,
    /// Low on the right, rises right-to-left
    Right,
}

impl SlopeDirection {
    /// Alternate direction for successive ramps
    pub fn alternating(index: usize) -> Self {
        if index % 2 == 0 {
            SlopeDirection::Left
        } else {
            SlopeDirection::Right
        }
    }
}

/// A straight line piece of terrain surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
    /// `atan2(b - a)` in sample order
    pub angle: f32,
}

impl Segment {
    pub fn new(a: Vec2, b: Vec2) -> Self {
        let d = b - a;
        Self {
            a,
            b,
            angle: d.y.atan2(d.x),
        }
    }

    pub fn min_x(&self) -> f32 {
        self.a.x.min(self.b.x)
    }

    pub fn max_x(&self) -> f32 {
        self.a.x.max(self.b.x)
    }

    /// Interpolated surface Y at `x`, `None` outside the span or for a
    /// (near-)vertical segment
    pub fn surface_y_at(&self, x: f32) -> Option<f32> {
        let dx = self.b.x - self.a.x;
        if dx.abs() < MIN_SPAN || x < self.min_x() || x > self.max_x() {
            return None;
        }
        let t = (x - self.a.x) / dx;
        Some(self.a.y + (self.b.y - self.a.y) * t)
    }

    /// Horizontal sign pointing from the high end toward the low end (0 when flat)
    pub fn downhill_sign(&self) -> f32 {
        if self.a.y > self.b.y {
            // a is the low end
            sign(self.a.x - self.b.x)
        } else if self.b.y > self.a.y {
            sign(self.b.x - self.a.x)
        } else {
            0.0
        }
    }

    /// Tangent angle with the segment oriented left-to-right, in (-π/2, π/2]
    pub fn surface_angle(&self) -> f32 {
        let (left, right) = if self.a.x <= self.b.x {
            (self.a, self.b)
        } else {
            (self.b, self.a)
        };
        let d = right - left;
        d.y.atan2(d.x)
    }
}

/// Axis-aligned box around a curve's samples
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn from_points(points: &[CurvePoint]) -> Self {
        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for p in points {
            min = min.min(p.pos);
            max = max.max(p.pos);
        }
        Self { min, max }
    }
}

/// A single linear ramp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StraightSlope {
    /// Low end (x1, y1)
    pub low: Vec2,
    /// High end (x2, y2)
    pub high: Vec2,
    /// `atan2` from low to high
    pub angle: f32,
    pub width: f32,
    pub height: f32,
}

impl StraightSlope {
    pub fn as_segment(&self) -> Segment {
        Segment::new(self.low, self.high)
    }
}

/// Shape a curved slope was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveShape {
    QuarterPipe(SlopeDirection),
    Hill,
    HalfPipe,
}

/// Polyline approximation of a sampled curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvedSlope {
    pub shape: CurveShape,
    pub points: Vec<CurvePoint>,
    /// Ordered and adjacent: segment i ends where segment i+1 starts
    pub segments: Vec<Segment>,
    pub bounds: Bounds,
}

impl CurvedSlope {
    pub fn new(shape: CurveShape, points: Vec<CurvePoint>) -> Self {
        let segments = points
            .windows(2)
            .filter(|pair| pair[0].pos != pair[1].pos)
            .map(|pair| Segment::new(pair[0].pos, pair[1].pos))
            .collect();
        let bounds = Bounds::from_points(&points);
        Self {
            shape,
            points,
            segments,
            bounds,
        }
    }
}

/// Terrain geometry variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TerrainGeometry {
    Straight(StraightSlope),
    Curved(CurvedSlope),
}

/// A registered slope with its drawable
#[derive(Debug, Clone)]
pub struct Terrain {
    pub id: TerrainId,
    pub geometry: TerrainGeometry,
    pub tint: u32,
    handle: DrawHandle,
}

impl Terrain {
    /// Largest Y (lowest on screen) the slope reaches
    pub fn lowest_y(&self) -> f32 {
        match &self.geometry {
            TerrainGeometry::Straight(slope) => slope.low.y,
            TerrainGeometry::Curved(curved) => curved.bounds.max.y,
        }
    }

    pub fn handle(&self) -> DrawHandle {
        self.handle
    }
}

/// What the registry needs to know about the player this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlopeProbe {
    pub center: Vec2,
    pub half_size: Vec2,
    pub velocity: Vec2,
}

impl SlopeProbe {
    pub fn bottom(&self) -> f32 {
        self.center.y + self.half_size.y
    }

    pub fn left(&self) -> f32 {
        self.center.x - self.half_size.x
    }

    pub fn right(&self) -> f32 {
        self.center.x + self.half_size.x
    }
}

/// The single surface under the player this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlopeCollisionResult {
    pub surface_y: f32,
    /// Tangent of the contacted surface oriented left-to-right, in
    /// (-π/2, π/2]; negative when the surface rises to the right
    pub angle: f32,
    pub speed_mod: f32,
    pub terrain: TerrainId,
    /// Set when the player is fast enough to launch on leaving the slope
    pub launch_vector: Option<Vec2>,
}

/// Surface found under the probe before speed/launch are applied
#[derive(Debug, Clone, Copy)]
struct Contact {
    surface_y: f32,
    /// Left-to-right tangent
    surface_angle: f32,
    downhill: f32,
}

/// Owns all slope geometry
#[derive(Debug)]
pub struct TerrainRegistry {
    terrain: Vec<Terrain>,
    canvas: Box<dyn TerrainCanvas>,
    tuning: SlopeTuning,
    next_id: u32,
}

impl TerrainRegistry {
    pub fn new(tuning: SlopeTuning, canvas: Box<dyn TerrainCanvas>) -> Self {
        Self {
            terrain: Vec::new(),
            canvas,
            tuning,
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.terrain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terrain.is_empty()
    }

    /// Registered slopes in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Terrain> {
        self.terrain.iter()
    }

    pub fn get(&self, id: TerrainId) -> Option<&Terrain> {
        self.terrain.iter().find(|t| t.id == id)
    }

    pub fn tuning(&self) -> &SlopeTuning {
        &self.tuning
    }

    fn register(&mut self, geometry: TerrainGeometry, tint: u32, mesh: Vec<Vertex>) -> TerrainId {
        let id = TerrainId(self.next_id);
        self.next_id += 1;
        let handle = self.canvas.create(mesh);
        self.terrain.push(Terrain {
            id,
            geometry,
            tint,
            handle,
        });
        id
    }

    /// Straight ramp in the box with bottom-left corner `(x, y)`.
    pub fn create_slope(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        direction: SlopeDirection,
        tint: u32,
    ) -> TerrainId {
        let (low, high) = match direction {
            SlopeDirection::Left => (Vec2::new(x, y), Vec2::new(x + width, y - height)),
            SlopeDirection::Right => (Vec2::new(x + width, y), Vec2::new(x, y - height)),
        };
        let d = high - low;
        let slope = StraightSlope {
            low,
            high,
            angle: d.y.atan2(d.x),
            width,
            height,
        };

        let mut mesh = shapes::slope_triangle(low, high, colors::tint_rgba(tint, colors::SLOPE_FILL_ALPHA));
        mesh.extend(shapes::curve_stroke(&[low, high], 2.0, colors::SLOPE_STROKE));

        self.register(TerrainGeometry::Straight(slope), tint, mesh)
    }

    fn register_curve(&mut self, curved: CurvedSlope, base_y: f32, tint: u32) -> TerrainId {
        let mut mesh = shapes::curve_fill(&curved.points, base_y, colors::tint_rgba(tint, colors::SLOPE_FILL_ALPHA));
        let outline: Vec<Vec2> = curved.points.iter().map(|p| p.pos).collect();
        mesh.extend(shapes::curve_stroke(&outline, 2.0, colors::SLOPE_STROKE));
        self.register(TerrainGeometry::Curved(curved), tint, mesh)
    }

    /// Concave 90° ramp fit to the box with bottom-left corner `(x, y)`.
    /// `Left` is low on the left and steepens toward the top-right corner.
    pub fn create_quarter_pipe(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        direction: SlopeDirection,
        tint: u32,
    ) -> TerrainId {
        let radii = Vec2::new(width, height);
        let points = match direction {
            // Center at the top-left corner, sweep from bottom (π/2) to right (0)
            SlopeDirection::Left => curve::sample_elliptical_arc(
                Vec2::new(x, y - height),
                radii,
                FRAC_PI_2,
                0.0,
                self.tuning.curve_segments,
            ),
            // Mirror: center at the top-right corner, sweep bottom (π/2) to left (π)
            SlopeDirection::Right => curve::sample_elliptical_arc(
                Vec2::new(x + width, y - height),
                radii,
                FRAC_PI_2,
                std::f32::consts::PI,
                self.tuning.curve_segments,
            ),
        };
        self.register_curve(CurvedSlope::new(CurveShape::QuarterPipe(direction), points), y, tint)
    }

    /// Quadratic Bezier hump over the baseline `y` from `x` to `x + width`,
    /// peaking `height` above it.
    pub fn create_hill(&mut self, x: f32, y: f32, width: f32, height: f32, tint: u32) -> TerrainId {
        // Control point at twice the height puts the curve apex at `height`
        let points = curve::sample_bezier(
            Vec2::new(x, y),
            Vec2::new(x + width / 2.0, y - 2.0 * height),
            Vec2::new(x + width, y),
            self.tuning.curve_segments,
        );
        self.register_curve(CurvedSlope::new(CurveShape::Hill, points), y, tint)
    }

    /// Bowl with floor at `y` and rims `depth` above it, spanning `width`.
    /// Two elliptical walls joined by a flat bottom.
    pub fn create_half_pipe(&mut self, x: f32, y: f32, width: f32, depth: f32, tint: u32) -> TerrainId {
        let wall_width = width * 0.3;
        let radii = Vec2::new(wall_width, depth);
        let segments = self.tuning.curve_segments;

        // Left wall: rim (π) down to floor (π/2)
        let mut points = curve::sample_elliptical_arc(
            Vec2::new(x + wall_width, y - depth),
            radii,
            std::f32::consts::PI,
            FRAC_PI_2,
            segments,
        );
        // Right wall: floor (π/2) up to rim (0). The gap between the walls'
        // floor points becomes the flat bottom segment.
        points.extend(curve::sample_elliptical_arc(
            Vec2::new(x + width - wall_width, y - depth),
            radii,
            FRAC_PI_2,
            0.0,
            segments,
        ));
        self.register_curve(CurvedSlope::new(CurveShape::HalfPipe, points), y, tint)
    }

    /// Per-frame query: the first registered slope the probe stands on
    pub fn update(&self, probe: &SlopeProbe) -> Option<SlopeCollisionResult> {
        self.terrain.iter().find_map(|terrain| {
            let contact = match &terrain.geometry {
                TerrainGeometry::Straight(slope) => self.straight_contact(slope, probe),
                TerrainGeometry::Curved(curved) => self.curved_contact(curved, probe),
            }?;
            Some(self.resolve(terrain.id, contact, probe))
        })
    }

    fn straight_contact(&self, slope: &StraightSlope, probe: &SlopeProbe) -> Option<Contact> {
        let segment = slope.as_segment();
        let (min_x, max_x) = (segment.min_x(), segment.max_x());

        // Player center X must be over the slope's horizontal range
        if probe.center.x < min_x || probe.center.x > max_x {
            return None;
        }
        // Some of the body must overlap the span as well
        if probe.right() < min_x || probe.left() > max_x {
            return None;
        }

        // Zero-width slopes fall out here
        let surface_y = segment.surface_y_at(probe.center.x)?;
        if (probe.bottom() - surface_y).abs() > self.tuning.snap_tolerance {
            return None;
        }
        // Jumping up through the slope
        if probe.velocity.y < self.tuning.upward_velocity_cutoff {
            return None;
        }

        Some(Contact {
            surface_y,
            surface_angle: segment.surface_angle(),
            downhill: sign(slope.low.x - slope.high.x),
        })
    }

    fn curved_contact(&self, curved: &CurvedSlope, probe: &SlopeProbe) -> Option<Contact> {
        let tol = self.tuning.snap_tolerance;
        let bottom = probe.bottom();
        let b = &curved.bounds;

        // Cheap rejection before the segment scan
        if probe.center.x < b.min.x
            || probe.center.x > b.max.x
            || bottom < b.min.y - tol
            || bottom > b.max.y + tol
        {
            return None;
        }
        if probe.velocity.y < self.tuning.upward_velocity_cutoff {
            return None;
        }

        let mut best: Option<(f32, f32, &Segment)> = None;
        for segment in &curved.segments {
            let Some(surface_y) = segment.surface_y_at(probe.center.x) else {
                continue;
            };
            let dist = (bottom - surface_y).abs();
            if best.is_none_or(|(d, _, _)| dist < d) {
                best = Some((dist, surface_y, segment));
            }
        }

        let (dist, surface_y, segment) = best?;
        if dist > tol {
            return None;
        }

        Some(Contact {
            surface_y,
            surface_angle: segment.surface_angle(),
            downhill: segment.downhill_sign(),
        })
    }

    fn resolve(&self, terrain: TerrainId, contact: Contact, probe: &SlopeProbe) -> SlopeCollisionResult {
        let vx = probe.velocity.x;
        let speed_mod = if vx == 0.0 || contact.downhill == 0.0 {
            1.0
        } else if sign(vx) == contact.downhill {
            self.tuning.downhill_speed_mult
        } else {
            self.tuning.uphill_speed_mult
        };

        let speed = probe.velocity.length();
        let launch_vector = (speed >= self.tuning.min_launch_speed).then(|| {
            // Outward normal: tangent rotated -90°
            angle_to_dir(contact.surface_angle - FRAC_PI_2) * speed * self.tuning.launch_force_mult
        });

        SlopeCollisionResult {
            surface_y: contact.surface_y,
            angle: contact.surface_angle,
            speed_mod,
            terrain,
            launch_vector,
        }
    }

    /// Remove every slope whose lowest point is more than `buffer` below
    /// `player_y`, releasing its drawable. Returns the number removed.
    pub fn cleanup(&mut self, player_y: f32, buffer: f32) -> usize {
        let limit = player_y + buffer;
        let before = self.terrain.len();
        let canvas = &mut self.canvas;
        self.terrain.retain(|terrain| {
            if terrain.lowest_y() > limit {
                canvas.release(terrain.handle);
                false
            } else {
                true
            }
        });
        let removed = before - self.terrain.len();
        if removed > 0 {
            log::debug!("Pruned {} slopes below y={:.0} ({} live)", removed, limit, self.terrain.len());
        }
        removed
    }
}
