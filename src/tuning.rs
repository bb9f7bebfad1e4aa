//! Data-driven game balance
//!
//! Every tunable the simulation reads lives here. Defaults are the shipped
//! values; a JSON document can override any subset because every section is
//! `#[serde(default)]`.
//!
//! Timers are in seconds, distances in pixels, speeds in pixels/second.
//! Screen space: +Y points down, so climbing means decreasing Y.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::TuningError;
use crate::sim::biome::BiomeKind;
use crate::sim::level::Pattern;

/// Inclusive integer range rolled with `between`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntRange {
    pub min: i32,
    pub max: i32,
}

impl IntRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }
}

/// Movement and jump physics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    pub gravity: f32,
    pub move_speed: f32,
    /// Negative: up
    pub jump_force: f32,
    pub wall_slide_speed: f32,
    pub wall_jump: Vec2,
    pub coyote_time: f32,
    pub jump_buffer: f32,
    pub ground_drag: f32,
    pub air_drag: f32,
    pub acceleration: f32,
    pub jump_hold_force: f32,
    pub jump_hold_duration: f32,
    pub double_jump_multiplier: f32,
    /// Acceleration scale while standing on ice
    pub ice_acceleration_mult: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: 1000.0,
            move_speed: 200.0,
            jump_force: -500.0,
            wall_slide_speed: 100.0,
            wall_jump: Vec2::new(300.0, -500.0),
            coyote_time: 0.1,
            jump_buffer: 0.15,
            ground_drag: 1200.0,
            air_drag: 200.0,
            acceleration: 1000.0,
            jump_hold_force: -10.0,
            jump_hold_duration: 0.25,
            double_jump_multiplier: 0.8,
            ice_acceleration_mult: 0.5,
        }
    }
}

/// Combat timing and damage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    pub combo_window: f32,
    /// Failsafe: any attack older than this is forced back to idle
    pub attack_stuck_timeout: f32,
    pub hit_flash_duration: f32,
    pub invincibility_duration: f32,
    pub invincibility_flash_rate: f32,
    pub knockback_player: Vec2,
    pub knockback_enemy: Vec2,
    pub base_damage: f32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            combo_window: 0.5,
            attack_stuck_timeout: 2.0,
            hit_flash_duration: 0.2,
            invincibility_duration: 1.0,
            invincibility_flash_rate: 0.1,
            knockback_player: Vec2::new(300.0, -300.0),
            knockback_enemy: Vec2::new(200.0, -200.0),
            base_damage: 10.0,
        }
    }
}

/// World layout and streaming distances
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    pub width: f32,
    pub height: f32,
    pub wall_width: f32,
    pub base_platform_y: f32,
    pub player_spawn: Vec2,
    pub death_plane_offset: f32,
    pub platform_cleanup_buffer: f32,
    pub generation_lookahead: f32,
    pub altitude_scale: f32,
    /// Keep generated content this far from the side walls
    pub edge_margin: f32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
            wall_width: 50.0,
            base_platform_y: 1050.0,
            player_spawn: Vec2::new(960.0, 950.0),
            death_plane_offset: 1000.0,
            platform_cleanup_buffer: 1500.0,
            generation_lookahead: 1200.0,
            altitude_scale: 10.0,
            edge_margin: 100.0,
        }
    }
}

impl WorldTuning {
    /// Altitude for a world Y (0 at the base platform, grows while climbing)
    pub fn altitude_at(&self, y: f32) -> f32 {
        ((self.base_platform_y - y) / self.altitude_scale).max(0.0)
    }

    pub fn center_x(&self) -> f32 {
        self.width / 2.0
    }
}

/// Slope snapping, speed modulation, launch and curve shape ranges
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlopeTuning {
    pub snap_tolerance: f32,
    /// Vertical velocity below this (strongly upward) never snaps
    pub upward_velocity_cutoff: f32,
    pub downhill_speed_mult: f32,
    pub uphill_speed_mult: f32,
    pub min_launch_speed: f32,
    pub launch_force_mult: f32,
    pub curve_segments: usize,
    pub half_pipe_width: IntRange,
    pub half_pipe_depth: IntRange,
    pub quarter_pipe_width: IntRange,
    pub quarter_pipe_height: IntRange,
    pub hill_width: IntRange,
    pub hill_height: IntRange,
}

impl Default for SlopeTuning {
    fn default() -> Self {
        Self {
            snap_tolerance: 16.0,
            upward_velocity_cutoff: -50.0,
            downhill_speed_mult: 1.4,
            uphill_speed_mult: 0.7,
            min_launch_speed: 300.0,
            launch_force_mult: 0.6,
            curve_segments: crate::consts::CURVE_SEGMENTS,
            half_pipe_width: IntRange::new(300, 500),
            half_pipe_depth: IntRange::new(100, 180),
            quarter_pipe_width: IntRange::new(150, 250),
            quarter_pipe_height: IntRange::new(100, 180),
            hill_width: IntRange::new(200, 400),
            hill_height: IntRange::new(40, 100),
        }
    }
}

/// Style meter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleTuning {
    pub speed_threshold: f32,
    /// Gain per 60 Hz frame above the speed threshold
    pub speed_gain: f32,
    pub decay_delay: f32,
    /// Meter units per second
    pub decay_rate: f32,
    pub max_meter: f32,
    pub airborne_kill_bonus: f32,
    pub multi_kill_bonus: f32,
    pub wall_jump_chain_bonus: f32,
    pub wall_jump_chain_window: f32,
    pub slope_launch_bonus: f32,
    pub tier_thresholds: Vec<f32>,
    pub tier_names: Vec<String>,
    pub tier_multipliers: Vec<f32>,
}

impl Default for StyleTuning {
    fn default() -> Self {
        Self {
            speed_threshold: 300.0,
            speed_gain: 0.5,
            decay_delay: 1.5,
            decay_rate: 10.0,
            max_meter: 100.0,
            airborne_kill_bonus: 10.0,
            multi_kill_bonus: 5.0,
            wall_jump_chain_bonus: 3.0,
            wall_jump_chain_window: 2.0,
            slope_launch_bonus: 8.0,
            tier_thresholds: vec![0.0, 20.0, 40.0, 60.0, 80.0, 95.0],
            tier_names: ["D", "C", "B", "A", "S", "SSS"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            tier_multipliers: vec![1.0, 1.2, 1.5, 2.0, 2.5, 3.0],
        }
    }
}

/// Enemy mix for an altitude band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnTier {
    pub max_altitude: f32,
    pub basic: f32,
    pub intermediate: f32,
    pub advanced: f32,
    pub elite: f32,
}

/// Enemy spawning cadence and composition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    pub min_interval: f32,
    pub max_interval: f32,
    pub min_distance_from_player: f32,
    pub max_enemies_on_screen: usize,
    pub cleanup_buffer: f32,
    /// Altitude at which the spawn interval bottoms out
    pub full_difficulty_altitude: f32,
    pub composition: Vec<SpawnTier>,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        let tier = |max_altitude, basic, intermediate, advanced, elite| SpawnTier {
            max_altitude,
            basic,
            intermediate,
            advanced,
            elite,
        };
        Self {
            min_interval: 5.0,
            max_interval: 15.0,
            min_distance_from_player: 300.0,
            max_enemies_on_screen: 8,
            cleanup_buffer: 2000.0,
            full_difficulty_altitude: 10000.0,
            composition: vec![
                tier(1000.0, 0.9, 0.1, 0.0, 0.0),
                tier(3000.0, 0.7, 0.25, 0.05, 0.0),
                tier(6000.0, 0.4, 0.4, 0.15, 0.05),
                tier(9000.0, 0.1, 0.4, 0.4, 0.1),
                tier(f32::MAX, 0.0, 0.0, 0.5, 0.5),
            ],
        }
    }
}

/// Relative platform-type weights for one biome (should sum to ~1)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlatformWeights {
    pub standard: f32,
    pub moving: f32,
    pub breakable: f32,
    pub ice: f32,
    pub sticky: f32,
    pub bounce: f32,
    /// Split evenly between left and right slopes
    pub slope: f32,
}

impl PlatformWeights {
    pub fn as_array(&self) -> [f32; 7] {
        [
            self.standard,
            self.moving,
            self.breakable,
            self.ice,
            self.sticky,
            self.bounce,
            self.slope,
        ]
    }

    pub fn total(&self) -> f32 {
        self.as_array().iter().sum()
    }
}

/// An altitude-banded theme
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiomeDef {
    pub kind: BiomeKind,
    pub name: String,
    /// Exclusive upper altitude bound
    pub max_altitude: f32,
    pub platform_tint: u32,
    pub bg_color: u32,
    pub weights: PlatformWeights,
}

/// Gap range for an altitude band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyBand {
    /// Exclusive upper altitude bound
    pub max_altitude: f32,
    pub min_gap: i32,
    pub max_gap: i32,
}

/// Cumulative cutoff: rolls below `below` (and above the previous cutoff) pick `pattern`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternCutoff {
    pub below: f32,
    pub pattern: Pattern,
}

/// Smallest reach accepted on either axis
pub const MIN_REACH: f32 = 100.0;

/// Largest displacement allowed between consecutive frontier positions
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ReachTuning {
    pub max_step_x: f32,
    pub max_step_y: f32,
}

impl Default for ReachTuning {
    fn default() -> Self {
        Self {
            max_step_x: 480.0,
            max_step_y: 320.0,
        }
    }
}

/// Complete tuning surface
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub physics: PhysicsTuning,
    pub combat: CombatTuning,
    pub world: WorldTuning,
    pub slopes: SlopeTuning,
    pub style: StyleTuning,
    pub spawning: SpawnTuning,
    pub biomes: Vec<BiomeDef>,
    pub difficulty: Vec<DifficultyBand>,
    pub patterns: Vec<PatternCutoff>,
    pub reach: ReachTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            physics: PhysicsTuning::default(),
            combat: CombatTuning::default(),
            world: WorldTuning::default(),
            slopes: SlopeTuning::default(),
            style: StyleTuning::default(),
            spawning: SpawnTuning::default(),
            biomes: default_biomes(),
            difficulty: vec![
                DifficultyBand { max_altitude: 500.0, min_gap: 80, max_gap: 150 },
                DifficultyBand { max_altitude: 2000.0, min_gap: 100, max_gap: 200 },
                DifficultyBand { max_altitude: 5000.0, min_gap: 130, max_gap: 260 },
                DifficultyBand { max_altitude: f32::MAX, min_gap: 150, max_gap: 300 },
            ],
            // Standard 25%, Rolling Hills 15%, Halfpipe 12%, ZigZag 12%,
            // Launch Sequence 10%, Wall Jump 10%, Slope Run 8%, Bounce Chain 8%
            patterns: vec![
                PatternCutoff { below: 0.12, pattern: Pattern::ZigZag },
                PatternCutoff { below: 0.22, pattern: Pattern::WallJump },
                PatternCutoff { below: 0.30, pattern: Pattern::SlopeRun },
                PatternCutoff { below: 0.38, pattern: Pattern::BounceChain },
                PatternCutoff { below: 0.50, pattern: Pattern::HalfPipe },
                PatternCutoff { below: 0.60, pattern: Pattern::LaunchSequence },
                PatternCutoff { below: 0.75, pattern: Pattern::RollingHills },
            ],
            reach: ReachTuning::default(),
        }
    }
}

fn default_biomes() -> Vec<BiomeDef> {
    let weights = |standard, moving, breakable, ice, sticky, bounce, slope| PlatformWeights {
        standard,
        moving,
        breakable,
        ice,
        sticky,
        bounce,
        slope,
    };
    vec![
        BiomeDef {
            kind: BiomeKind::Depths,
            name: "The Depths".to_string(),
            max_altitude: 1000.0,
            platform_tint: 0x8b4513,
            bg_color: 0x1a0505,
            weights: weights(0.6, 0.1, 0.1, 0.0, 0.1, 0.05, 0.05),
        },
        BiomeDef {
            kind: BiomeKind::Caverns,
            name: "Crystal Caverns".to_string(),
            max_altitude: 3000.0,
            platform_tint: 0x6a5acd,
            bg_color: 0x0d0d2b,
            weights: weights(0.3, 0.15, 0.15, 0.1, 0.1, 0.05, 0.15),
        },
        BiomeDef {
            kind: BiomeKind::Spire,
            name: "The Spire".to_string(),
            max_altitude: 6000.0,
            platform_tint: 0xb0c4de,
            bg_color: 0x1c2841,
            weights: weights(0.2, 0.2, 0.1, 0.15, 0.05, 0.1, 0.2),
        },
        BiomeDef {
            kind: BiomeKind::Summit,
            name: "The Summit".to_string(),
            max_altitude: f32::MAX,
            platform_tint: 0xf0f8ff,
            bg_color: 0x87ceeb,
            weights: weights(0.1, 0.25, 0.15, 0.2, 0.05, 0.1, 0.15),
        },
    ]
}

impl Tuning {
    /// Parse and validate a JSON tuning document. Missing keys keep defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load overrides if given, falling back to defaults on any error
    pub fn load_or_default(json: Option<&str>) -> Self {
        let Some(json) = json else {
            log::info!("Using default tuning");
            return Self::default();
        };
        match Self::from_json(json) {
            Ok(tuning) => {
                log::info!("Loaded tuning overrides");
                tuning
            }
            Err(err) => {
                log::warn!("{}; using default tuning", err);
                Self::default()
            }
        }
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.slopes.snap_tolerance <= 0.0 {
            return Err(TuningError::invalid(
                "slopes.snap_tolerance",
                "must be positive",
            ));
        }
        if self.slopes.curve_segments == 0 {
            return Err(TuningError::invalid(
                "slopes.curve_segments",
                "must be at least 1",
            ));
        }
        if self.world.altitude_scale <= 0.0 {
            return Err(TuningError::invalid(
                "world.altitude_scale",
                "must be positive",
            ));
        }
        if self.world.platform_cleanup_buffer < self.world.generation_lookahead {
            return Err(TuningError::invalid(
                "world.platform_cleanup_buffer",
                "must be at least the generation lookahead",
            ));
        }
        if self.biomes.is_empty() {
            return Err(TuningError::invalid("biomes", "at least one biome required"));
        }
        for biome in &self.biomes {
            if biome.weights.as_array().iter().any(|w| *w < 0.0) {
                return Err(TuningError::invalid(
                    "biomes.weights",
                    format!("negative weight in biome '{}'", biome.name),
                ));
            }
        }
        if self.difficulty.is_empty() {
            return Err(TuningError::invalid(
                "difficulty",
                "at least one band required",
            ));
        }
        if self
            .difficulty
            .iter()
            .any(|band| band.min_gap <= 0 || band.min_gap > band.max_gap)
        {
            return Err(TuningError::invalid(
                "difficulty",
                "gaps must satisfy 0 < min_gap <= max_gap",
            ));
        }
        for (field, reach) in [
            ("reach.max_step_x", self.reach.max_step_x),
            ("reach.max_step_y", self.reach.max_step_y),
        ] {
            if !reach.is_finite() || reach < MIN_REACH {
                return Err(TuningError::invalid(
                    field,
                    format!("must be at least {MIN_REACH}"),
                ));
            }
        }
        if let Some(band) = self
            .difficulty
            .iter()
            .find(|band| band.max_gap as f32 > self.reach.max_step_y)
        {
            return Err(TuningError::invalid(
                "difficulty",
                format!(
                    "max_gap {} exceeds reach.max_step_y {}",
                    band.max_gap, self.reach.max_step_y
                ),
            ));
        }
        if self.patterns.windows(2).any(|w| w[0].below > w[1].below) {
            return Err(TuningError::invalid(
                "patterns",
                "cutoffs must be in ascending order",
            ));
        }
        if self.style.tier_thresholds.is_empty()
            || self.style.tier_thresholds.len() != self.style.tier_names.len()
            || self.style.tier_thresholds.len() != self.style.tier_multipliers.len()
        {
            return Err(TuningError::invalid(
                "style.tier_thresholds",
                "tier thresholds, names and multipliers must be non-empty and equal length",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "slopes": { "snap_tolerance": 8.0 } }"#).unwrap();
        assert_eq!(tuning.slopes.snap_tolerance, 8.0);
        assert_eq!(tuning.slopes.downhill_speed_mult, 1.4);
        assert_eq!(tuning.world.generation_lookahead, 1200.0);
        assert_eq!(tuning.biomes.len(), 4);
    }

    #[test]
    fn test_invalid_snap_rejected() {
        let err = Tuning::from_json(r#"{ "slopes": { "snap_tolerance": 0.0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid { field: "slopes.snap_tolerance", .. }
        ));
    }

    #[test]
    fn test_unordered_patterns_rejected() {
        let json = r#"{ "patterns": [
            { "below": 0.5, "pattern": "ZigZag" },
            { "below": 0.2, "pattern": "WallJump" }
        ] }"#;
        assert!(Tuning::from_json(json).is_err());
    }

    #[test]
    fn test_reach_below_minimum_rejected() {
        let err = Tuning::from_json(r#"{ "reach": { "max_step_x": 50.0 } }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "reach.max_step_x", .. }));
        let err = Tuning::from_json(r#"{ "reach": { "max_step_y": -1.0 } }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "reach.max_step_y", .. }));
    }

    #[test]
    fn test_gap_beyond_vertical_reach_rejected() {
        let json = r#"{ "reach": { "max_step_x": 250.0, "max_step_y": 200.0 } }"#;
        // Default bands go up to a 300 px gap
        let err = Tuning::from_json(json).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "difficulty", .. }));

        let json = r#"{
            "reach": { "max_step_x": 250.0, "max_step_y": 200.0 },
            "difficulty": [ { "max_altitude": 1e30, "min_gap": 80, "max_gap": 200 } ]
        }"#;
        assert!(Tuning::from_json(json).is_ok());
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let tuning = Tuning::load_or_default(Some("not json"));
        assert_eq!(tuning.slopes.snap_tolerance, SlopeTuning::default().snap_tolerance);
    }

    #[test]
    fn test_altitude_mapping() {
        let world = WorldTuning::default();
        assert_eq!(world.altitude_at(1050.0), 0.0);
        assert_eq!(world.altitude_at(2000.0), 0.0);
        assert!((world.altitude_at(50.0) - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_default_round_trips_through_json() {
        let json = serde_json::to_string(&Tuning::default()).unwrap();
        let parsed = Tuning::from_json(&json).unwrap();
        assert_eq!(parsed.patterns, Tuning::default().patterns);
    }
}
