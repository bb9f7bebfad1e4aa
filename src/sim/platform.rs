//! Typed platforms
//!
//! Axis-aligned platforms are collided by the host physics engine; the
//! simulation only tags them (type, tint), animates moving platforms and runs
//! the breakable lifecycle. Slope-typed entries never become platforms, the
//! generator routes them to the terrain registry.

use std::f32::consts::PI;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::events::{EventSink, GameEvent};
use super::terrain::SlopeDirection;
use crate::consts::{PLATFORM_BASE_WIDTH, PLATFORM_HEIGHT};
use crate::renderer::{Vertex, colors, shapes};

/// Horizontal travel of a moving platform
pub const MOVE_DISTANCE: f32 = 200.0;
/// One-way travel time (seconds)
pub const MOVE_DURATION: f32 = 2.0;
/// Moving platforms reverse direction instead of passing this X
pub const MOVE_LIMIT_X: f32 = 1850.0;
/// Fade time after a breakable is stepped on (seconds)
pub const BREAK_FADE: f32 = 0.5;
/// Time a broken platform stays disabled (seconds)
pub const BREAK_RESPAWN: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlatformId(pub u32);

/// Platform surface types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlatformKind {
    #[default]
    Standard,
    Moving,
    Breakable,
    Ice,
    Sticky,
    Bounce,
    SlopeLeft,
    SlopeRight,
}

/// Static properties of a platform type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformDef {
    pub color: u32,
    /// Overrides ground drag scaling when set
    pub friction: Option<f32>,
    pub speed_mult: Option<f32>,
    pub jump_mult: Option<f32>,
    pub breakable: bool,
    /// Degrees
    pub slope_angle: Option<f32>,
}

impl PlatformDef {
    const fn plain(color: u32) -> Self {
        Self {
            color,
            friction: None,
            speed_mult: None,
            jump_mult: None,
            breakable: false,
            slope_angle: None,
        }
    }
}

impl PlatformKind {
    pub const ALL: [PlatformKind; 8] = [
        PlatformKind::Standard,
        PlatformKind::Moving,
        PlatformKind::Breakable,
        PlatformKind::Ice,
        PlatformKind::Sticky,
        PlatformKind::Bounce,
        PlatformKind::SlopeLeft,
        PlatformKind::SlopeRight,
    ];

    pub fn def(self) -> PlatformDef {
        match self {
            PlatformKind::Standard => PlatformDef::plain(0x00ff00),
            PlatformKind::Moving => PlatformDef::plain(0x00ffff),
            PlatformKind::Breakable => PlatformDef {
                breakable: true,
                ..PlatformDef::plain(0xff4444)
            },
            PlatformKind::Ice => PlatformDef {
                friction: Some(0.05),
                speed_mult: Some(1.0),
                ..PlatformDef::plain(0x88ccff)
            },
            PlatformKind::Sticky => PlatformDef {
                speed_mult: Some(0.4),
                jump_mult: Some(1.3),
                ..PlatformDef::plain(0x88ff44)
            },
            PlatformKind::Bounce => PlatformDef {
                jump_mult: Some(2.0),
                ..PlatformDef::plain(0xff88ff)
            },
            PlatformKind::SlopeLeft | PlatformKind::SlopeRight => PlatformDef {
                slope_angle: Some(30.0),
                ..PlatformDef::plain(0xffaa44)
            },
        }
    }

    pub fn slope_direction(self) -> Option<SlopeDirection> {
        match self {
            PlatformKind::SlopeLeft => Some(SlopeDirection::Left),
            PlatformKind::SlopeRight => Some(SlopeDirection::Right),
            _ => None,
        }
    }

    pub fn is_slope(self) -> bool {
        self.slope_direction().is_some()
    }
}

/// Sine-eased yoyo tween on X, repeating forever
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Oscillation {
    pub origin_x: f32,
    pub target_x: f32,
    pub elapsed: f32,
}

impl Oscillation {
    pub fn new(origin_x: f32) -> Self {
        let target_x = if origin_x + MOVE_DISTANCE > MOVE_LIMIT_X {
            origin_x - MOVE_DISTANCE
        } else {
            origin_x + MOVE_DISTANCE
        };
        Self {
            origin_x,
            target_x,
            elapsed: 0.0,
        }
    }

    /// X at the current elapsed time
    pub fn x(&self) -> f32 {
        let cycle = self.elapsed.rem_euclid(2.0 * MOVE_DURATION) / MOVE_DURATION;
        let t = if cycle > 1.0 { 2.0 - cycle } else { cycle };
        // Sine in-out
        let eased = -((PI * t).cos() - 1.0) / 2.0;
        self.origin_x + (self.target_x - self.origin_x) * eased
    }
}

/// Breakable lifecycle: Solid → Breaking (fade) → Broken (disabled) → Solid
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum BreakState {
    #[default]
    Solid,
    Breaking { remaining: f32 },
    Broken { remaining: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: PlatformId,
    pub kind: PlatformKind,
    /// Center
    pub pos: Vec2,
    pub size: Vec2,
    pub tint: u32,
    pub motion: Option<Oscillation>,
    /// Horizontal velocity from the last tick, for carrying riders
    pub velocity_x: f32,
    pub break_state: BreakState,
}

impl Platform {
    pub fn top(&self) -> f32 {
        self.pos.y - self.size.y / 2.0
    }

    pub fn left(&self) -> f32 {
        self.pos.x - self.size.x / 2.0
    }

    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x / 2.0
    }

    /// Disabled platforms have no body
    pub fn is_solid(&self) -> bool {
        !matches!(self.break_state, BreakState::Broken { .. })
    }

    pub fn is_breaking(&self) -> bool {
        !matches!(self.break_state, BreakState::Solid)
    }

    /// Quad for the host renderer; breaking platforms fade out, broken ones
    /// draw nothing
    pub fn mesh(&self) -> Vec<Vertex> {
        let alpha = match self.break_state {
            BreakState::Solid => 1.0,
            BreakState::Breaking { remaining } => (remaining / BREAK_FADE).clamp(0.0, 1.0),
            BreakState::Broken { .. } => return Vec::new(),
        };
        shapes::platform_quad(self.pos, self.size, colors::tint_rgba(self.tint, alpha))
    }

    /// Render alpha: fades to half while breaking
    pub fn alpha(&self) -> f32 {
        match self.break_state {
            BreakState::Solid => 1.0,
            BreakState::Breaking { remaining } => 0.5 + 0.5 * (remaining / BREAK_FADE),
            BreakState::Broken { .. } => 0.0,
        }
    }
}

/// All live platforms in creation order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformSet {
    platforms: Vec<Platform>,
    next_id: u32,
}

impl PlatformSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a platform centered at `(x, y)` with horizontal `scale`.
    /// Slope kinds are not platforms and fall back to standard.
    pub fn spawn(&mut self, x: f32, y: f32, scale: f32, kind: PlatformKind, tint: u32) -> PlatformId {
        let kind = if kind.is_slope() {
            log::warn!("Slope kind {:?} spawned as a platform; using Standard", kind);
            PlatformKind::Standard
        } else {
            kind
        };

        self.next_id += 1;
        let id = PlatformId(self.next_id);
        let motion = (kind == PlatformKind::Moving).then(|| Oscillation::new(x));
        self.platforms.push(Platform {
            id,
            kind,
            pos: Vec2::new(x, y),
            size: Vec2::new(PLATFORM_BASE_WIDTH * scale, PLATFORM_HEIGHT),
            tint,
            motion,
            velocity_x: 0.0,
            break_state: BreakState::Solid,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter()
    }

    pub fn get(&self, id: PlatformId) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.id == id)
    }

    /// Surface type for a platform id; unknown ids are standard ground
    pub fn kind_of(&self, id: Option<PlatformId>) -> PlatformKind {
        id.and_then(|id| self.get(id))
            .map(|p| p.kind)
            .unwrap_or_default()
    }

    /// Advance moving platforms and breakable timers
    pub fn tick(&mut self, dt: f32, events: &mut dyn EventSink) {
        for platform in &mut self.platforms {
            if let Some(motion) = &mut platform.motion {
                let before = motion.x();
                motion.elapsed += dt;
                let after = motion.x();
                platform.pos.x = after;
                platform.velocity_x = if dt > 0.0 { (after - before) / dt } else { 0.0 };
            }

            platform.break_state = match platform.break_state {
                BreakState::Solid => BreakState::Solid,
                BreakState::Breaking { remaining } if remaining - dt > 0.0 => {
                    BreakState::Breaking { remaining: remaining - dt }
                }
                BreakState::Breaking { .. } => {
                    log::debug!("Platform {:?} broke", platform.id);
                    events.emit(GameEvent::PlatformBroken { id: platform.id });
                    BreakState::Broken { remaining: BREAK_RESPAWN }
                }
                BreakState::Broken { remaining } if remaining - dt > 0.0 => {
                    BreakState::Broken { remaining: remaining - dt }
                }
                BreakState::Broken { .. } => {
                    log::debug!("Platform {:?} restored", platform.id);
                    BreakState::Solid
                }
            };
        }
    }

    /// Player landed on top of `id`. Starts the break timer on a solid
    /// breakable; returns whether it did.
    pub fn on_landed(&mut self, id: PlatformId) -> bool {
        let Some(platform) = self.platforms.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        if !platform.kind.def().breakable || platform.is_breaking() {
            return false;
        }
        platform.break_state = BreakState::Breaking { remaining: BREAK_FADE };
        true
    }

    /// Solid platform whose top is within `tolerance` of `bottom` under `x`
    pub fn support_at(&self, x: f32, bottom: f32, tolerance: f32) -> Option<&Platform> {
        self.platforms.iter().find(|p| {
            p.is_solid()
                && x >= p.left()
                && x <= p.right()
                && (bottom - p.top()).abs() <= tolerance
        })
    }

    /// Remove platforms more than `buffer` below `player_y`
    pub fn cleanup(&mut self, player_y: f32, buffer: f32) -> usize {
        let before = self.platforms.len();
        self.platforms.retain(|p| p.pos.y <= player_y + buffer);
        before - self.platforms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::events::EventQueue;

    #[test]
    fn test_platform_defs_match_types() {
        assert!(PlatformKind::Breakable.def().breakable);
        assert_eq!(PlatformKind::Bounce.def().jump_mult, Some(2.0));
        assert_eq!(PlatformKind::Sticky.def().speed_mult, Some(0.4));
        assert_eq!(PlatformKind::Ice.def().friction, Some(0.05));
        assert_eq!(PlatformKind::SlopeLeft.slope_direction(), Some(SlopeDirection::Left));
        assert!(PlatformKind::ALL.iter().filter(|k| k.is_slope()).count() == 2);
    }

    #[test]
    fn test_breaking_platform_fades_out() {
        let mut set = PlatformSet::new();
        let id = set.spawn(500.0, 500.0, 1.0, PlatformKind::Breakable, 0x336699);
        let mut events = EventQueue::new();
        assert_eq!(set.get(id).unwrap().mesh()[0].color[3], 1.0);

        set.on_landed(id);
        for _ in 0..15 {
            set.tick(1.0 / 60.0, &mut events);
        }
        let alpha = set.get(id).unwrap().mesh()[0].color[3];
        assert!((alpha - 0.5).abs() < 0.01);

        for _ in 0..30 {
            set.tick(1.0 / 60.0, &mut events);
        }
        assert!(set.get(id).unwrap().mesh().is_empty());
    }

    #[test]
    fn test_moving_platform_yoyo() {
        let mut set = PlatformSet::new();
        let id = set.spawn(1000.0, 500.0, 1.0, PlatformKind::Moving, 0);
        let mut events = EventQueue::new();

        // Half the one-way trip: halfway across with sine easing
        for _ in 0..60 {
            set.tick(1.0 / 60.0, &mut events);
        }
        let p = set.get(id).unwrap();
        assert!((p.pos.x - 1100.0).abs() < 1.0);
        assert!(p.velocity_x > 0.0);

        // Full cycle returns home
        for _ in 0..180 {
            set.tick(1.0 / 60.0, &mut events);
        }
        assert!((set.get(id).unwrap().pos.x - 1000.0).abs() < 1.0);
    }

    #[test]
    fn test_moving_platform_reverses_near_edge() {
        let osc = Oscillation::new(1700.0);
        assert_eq!(osc.target_x, 1500.0);
        let osc = Oscillation::new(1600.0);
        assert_eq!(osc.target_x, 1800.0);
    }

    #[test]
    fn test_breakable_lifecycle() {
        let mut set = PlatformSet::new();
        let id = set.spawn(500.0, 500.0, 2.0, PlatformKind::Breakable, 0);
        let mut events = EventQueue::new();

        assert!(set.on_landed(id));
        // Repeated landings while breaking are ignored
        assert!(!set.on_landed(id));

        for _ in 0..31 {
            set.tick(1.0 / 60.0, &mut events);
        }
        assert!(!set.get(id).unwrap().is_solid());
        assert_eq!(events.drain(), vec![GameEvent::PlatformBroken { id }]);
        assert!(set.support_at(500.0, 484.0, 4.0).is_none());

        for _ in 0..(8 * 60 + 1) {
            set.tick(1.0 / 60.0, &mut events);
        }
        let p = set.get(id).unwrap();
        assert!(p.is_solid());
        assert!(!p.is_breaking());
        assert_eq!(p.alpha(), 1.0);
    }

    #[test]
    fn test_standard_platform_never_breaks() {
        let mut set = PlatformSet::new();
        let id = set.spawn(500.0, 500.0, 1.0, PlatformKind::Standard, 0);
        assert!(!set.on_landed(id));
        assert!(!set.on_landed(PlatformId(999)));
    }

    #[test]
    fn test_cleanup_and_support() {
        let mut set = PlatformSet::new();
        let low = set.spawn(500.0, 3000.0, 1.0, PlatformKind::Standard, 0);
        let high = set.spawn(500.0, 500.0, 1.0, PlatformKind::Ice, 0);
        assert_eq!(set.cleanup(1000.0, 1500.0), 1);
        assert!(set.get(low).is_none());
        assert_eq!(set.kind_of(Some(high)), PlatformKind::Ice);
        assert_eq!(set.kind_of(Some(low)), PlatformKind::Standard);
        // Top is y - 16
        assert_eq!(set.support_at(500.0, 484.0, 1.0).map(|p| p.id), Some(high));
    }

    #[test]
    fn test_slope_kind_spawns_standard() {
        let mut set = PlatformSet::new();
        let id = set.spawn(0.0, 0.0, 1.0, PlatformKind::SlopeRight, 0);
        assert_eq!(set.get(id).unwrap().kind, PlatformKind::Standard);
    }
}
