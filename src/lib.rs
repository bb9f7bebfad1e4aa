//! Ascent - procedural vertical-ascent platformer core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (curve sampling, terrain collision,
//!   level generation, player movement and combat)
//! - `renderer`: Mesh generation and drawable handles for terrain
//! - `tuning`: Data-driven game balance
//! - `error`: Configuration errors

pub mod error;
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use error::TuningError;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, matches the source frame pacing)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Player body size (pixels)
    pub const PLAYER_WIDTH: f32 = 32.0;
    pub const PLAYER_HEIGHT: f32 = 48.0;

    /// Platform texture size before scaling
    pub const PLATFORM_BASE_WIDTH: f32 = 400.0;
    pub const PLATFORM_HEIGHT: f32 = 32.0;

    /// Segments used when sampling curved terrain
    pub const CURVE_SEGMENTS: usize = 16;

    /// Fallback tint when a biome has no platform color
    pub const DEFAULT_TERRAIN_TINT: u32 = 0xffaa44;
}

/// Sign of a value as -1, 0 or 1 (unlike `f32::signum`, zero maps to zero)
#[inline]
pub fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Unit direction for an angle in radians
#[inline]
pub fn angle_to_dir(angle: f32) -> glam::Vec2 {
    glam::Vec2::new(angle.cos(), angle.sin())
}
