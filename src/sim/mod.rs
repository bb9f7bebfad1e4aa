//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by registration / entity ID)
//! - No rendering dependencies beyond the [`crate::renderer::TerrainCanvas`] handle contract

use rand::Rng;
use rand_pcg::Pcg32;

pub mod biome;
pub mod combat;
pub mod curve;
pub mod events;
pub mod items;
pub mod level;
pub mod platform;
pub mod player;
pub mod spawn;
pub mod state;
pub mod style;
pub mod terrain;
pub mod tick;

pub use biome::{BiomeKind, DifficultyProfile, roll_platform_type};
pub use curve::{CurvePoint, sample_arc, sample_bezier, sample_elliptical_arc};
pub use events::{EventQueue, EventSink, GameEvent};
pub use level::{GenerationStats, LevelGenerator, Pattern};
pub use platform::{PlatformId, PlatformKind, PlatformSet};
pub use player::Player;
pub use state::World;
pub use terrain::{
    SlopeCollisionResult, SlopeDirection, SlopeProbe, TerrainGeometry, TerrainId,
    TerrainRegistry,
};
pub use tick::{TickInput, tick};

/// Inclusive integer roll; swapped bounds are reordered instead of panicking
pub(crate) fn between(rng: &mut Pcg32, min: i32, max: i32) -> i32 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    rng.random_range(lo..=hi)
}

/// Uniform float in `[min, max)`, or `min` for an empty range
pub(crate) fn float_between(rng: &mut Pcg32, min: f32, max: f32) -> f32 {
    if max <= min {
        return min;
    }
    rng.random_range(min..max)
}
