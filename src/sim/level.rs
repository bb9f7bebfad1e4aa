//! Procedural level generation
//!
//! The generator keeps a frontier, the highest point generated so far, and
//! extends the level upward in chunks while the frontier is within the
//! lookahead distance of the player. Each chunk is one pattern: a short
//! procedure that places platforms and slopes and walks the frontier to its
//! exit.
//!
//! Every placement a pattern makes moves the frontier by a bounded step, so
//! the next surface is always within a jump of the previous one.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::biome::{self, DifficultyProfile, roll_platform_type};
use super::platform::{PlatformKind, PlatformSet};
use super::terrain::{SlopeDirection, TerrainRegistry};
use super::{between, float_between};
use crate::consts::PLATFORM_BASE_WIDTH;
use crate::tuning::{IntRange, PatternCutoff, Tuning};

/// Upper bound on chunks per update; each chunk climbs, so this only trips on
/// a pathological tuning
const MAX_CHUNKS_PER_UPDATE: usize = 64;

/// Height of a slope placed in place of a platform
const PLATFORM_SLOPE_HEIGHT: f32 = 80.0;

/// Generation patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pattern {
    ZigZag,
    WallJump,
    SlopeRun,
    BounceChain,
    HalfPipe,
    LaunchSequence,
    RollingHills,
    Standard,
}

impl Pattern {
    pub const ALL: [Pattern; 8] = [
        Pattern::ZigZag,
        Pattern::WallJump,
        Pattern::SlopeRun,
        Pattern::BounceChain,
        Pattern::HalfPipe,
        Pattern::LaunchSequence,
        Pattern::RollingHills,
        Pattern::Standard,
    ];

    /// First cutoff the roll falls under; past every cutoff is `Standard`
    pub fn select(cutoffs: &[PatternCutoff], roll: f32) -> Pattern {
        cutoffs
            .iter()
            .find(|c| roll < c.below)
            .map(|c| c.pattern)
            .unwrap_or(Pattern::Standard)
    }
}

/// Running totals for a generator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationStats {
    pub chunks: BTreeMap<Pattern, u32>,
    pub platforms: u32,
    pub slopes: u32,
    /// Largest |dx| between consecutive frontier positions
    pub max_step_x: f32,
    /// Largest |dy| between consecutive frontier positions
    pub max_step_y: f32,
}

impl GenerationStats {
    pub fn total_chunks(&self) -> u32 {
        self.chunks.values().sum()
    }

    fn record_step(&mut self, from: Vec2, to: Vec2) {
        self.max_step_x = self.max_step_x.max((to.x - from.x).abs());
        self.max_step_y = self.max_step_y.max((to.y - from.y).abs());
    }
}

/// Endless upward level generator
#[derive(Debug, Clone)]
pub struct LevelGenerator {
    rng: Pcg32,
    tuning: Tuning,
    frontier: Vec2,
    stats: GenerationStats,
    /// Every frontier position in order, when tracing is enabled
    trace: Option<Vec<Vec2>>,
}

impl LevelGenerator {
    pub fn new(seed: u64, tuning: &Tuning) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            tuning: tuning.clone(),
            frontier: Vec2::new(tuning.world.center_x(), tuning.world.base_platform_y),
            stats: GenerationStats::default(),
            trace: None,
        }
    }

    /// Record every frontier position (for tests and debugging)
    pub fn with_trace(mut self) -> Self {
        self.trace = Some(vec![self.frontier]);
        self
    }

    pub fn frontier(&self) -> Vec2 {
        self.frontier
    }

    pub fn stats(&self) -> &GenerationStats {
        &self.stats
    }

    pub fn trace(&self) -> &[Vec2] {
        self.trace.as_deref().unwrap_or(&[])
    }

    /// Altitude of the frontier
    pub fn altitude(&self) -> f32 {
        self.tuning.world.altitude_at(self.frontier.y)
    }

    /// Place the fixed starting layout and move the frontier to its top
    pub fn init(&mut self, terrain: &mut TerrainRegistry, platforms: &mut PlatformSet) {
        let base_y = self.tuning.world.base_platform_y;
        let layout = [
            (960.0, base_y, 10.0, PlatformKind::Standard),
            (600.0, 800.0, 2.0, PlatformKind::Standard),
            (1400.0, 700.0, 2.0, PlatformKind::Moving),
            (200.0, 500.0, 2.0, PlatformKind::Standard),
            (1000.0, 300.0, 2.0, PlatformKind::Breakable),
        ];
        let mut chunk = self.chunk(terrain, platforms);
        for (x, y, scale, kind) in layout {
            chunk.place_platform(x, y, scale, kind);
        }
        let placed = chunk.placed;
        self.stats.platforms += placed.0;
        self.stats.slopes += placed.1;

        self.frontier = Vec2::new(1000.0, 300.0);
        if let Some(trace) = &mut self.trace {
            trace.clear();
            trace.push(self.frontier);
        }
        log::info!(
            "Level initialized: {} platforms, frontier ({:.0}, {:.0})",
            platforms.len(),
            self.frontier.x,
            self.frontier.y
        );
    }

    /// Generate until the frontier is `lookahead` above the player, then prune
    /// content that fell behind. Returns the number of chunks generated.
    pub fn update(&mut self, player_y: f32, terrain: &mut TerrainRegistry, platforms: &mut PlatformSet) -> usize {
        let threshold = player_y - self.tuning.world.generation_lookahead;

        let mut generated = 0;
        while self.frontier.y > threshold {
            if generated >= MAX_CHUNKS_PER_UPDATE {
                log::warn!(
                    "Chunk limit reached with frontier at y={:.0} (threshold {:.0})",
                    self.frontier.y,
                    threshold
                );
                break;
            }
            self.generate_chunk(terrain, platforms);
            generated += 1;
        }

        let buffer = self.tuning.world.platform_cleanup_buffer;
        let removed = platforms.cleanup(player_y, buffer);
        if removed > 0 {
            log::debug!("Pruned {} platforms ({} live)", removed, platforms.len());
        }
        terrain.cleanup(player_y, buffer);
        generated
    }

    /// Generate exactly one chunk at the frontier
    pub fn generate_chunk(&mut self, terrain: &mut TerrainRegistry, platforms: &mut PlatformSet) -> Pattern {
        let altitude = self.altitude();
        let pattern = Pattern::select(&self.tuning.patterns, self.rng.random());

        let mut chunk = self.chunk(terrain, platforms);
        match pattern {
            Pattern::ZigZag => chunk.zigzag(),
            Pattern::WallJump => chunk.wall_jump(),
            Pattern::SlopeRun => chunk.slope_run(),
            Pattern::BounceChain => chunk.bounce_chain(),
            Pattern::HalfPipe => chunk.half_pipe(),
            Pattern::LaunchSequence => chunk.launch_sequence(),
            Pattern::RollingHills => chunk.rolling_hills(),
            Pattern::Standard => chunk.standard(),
        }
        let Chunk { frontier, steps, placed, .. } = chunk;

        let mut from = self.frontier;
        for step in &steps {
            self.stats.record_step(from, *step);
            from = *step;
        }
        if let Some(trace) = &mut self.trace {
            trace.extend_from_slice(&steps);
        }
        self.frontier = frontier;
        *self.stats.chunks.entry(pattern).or_default() += 1;
        self.stats.platforms += placed.0;
        self.stats.slopes += placed.1;

        log::debug!(
            "Generated {:?} at altitude {:.0}: frontier ({:.0}, {:.0})",
            pattern,
            altitude,
            frontier.x,
            frontier.y
        );
        pattern
    }

    fn chunk<'a>(&'a mut self, terrain: &'a mut TerrainRegistry, platforms: &'a mut PlatformSet) -> Chunk<'a> {
        let profile = biome::difficulty_for(
            &self.tuning.biomes,
            &self.tuning.difficulty,
            self.tuning.world.altitude_at(self.frontier.y),
        );
        Chunk {
            rng: &mut self.rng,
            tuning: &self.tuning,
            profile,
            frontier: self.frontier,
            steps: Vec::new(),
            placed: (0, 0),
            terrain,
            platforms,
        }
    }
}

/// One pattern's working state: borrows the generator's RNG and the world
/// containers, and collects frontier steps for the caller
struct Chunk<'a> {
    rng: &'a mut Pcg32,
    tuning: &'a Tuning,
    profile: DifficultyProfile,
    frontier: Vec2,
    steps: Vec<Vec2>,
    /// (platforms, slopes)
    placed: (u32, u32),
    terrain: &'a mut TerrainRegistry,
    platforms: &'a mut PlatformSet,
}

impl Chunk<'_> {
    fn roll(&mut self, range: IntRange) -> f32 {
        between(self.rng, range.min, range.max) as f32
    }

    fn roll_gap(&mut self) -> f32 {
        let gap = between(self.rng, self.profile.min_gap, self.profile.max_gap) as f32;
        gap.min(self.tuning.reach.max_step_y)
    }

    /// Rise of `min..=max`, capped at half the vertical reach so a piece
    /// standing on it still has room for its own height
    fn roll_rise(&mut self, min: i32, max: i32) -> f32 {
        let rise = between(self.rng, min, max) as f32;
        rise.min(self.tuning.reach.max_step_y / 2.0)
    }

    /// Height of a piece sitting `rise` above the frontier whose exit is at
    /// its top
    fn fit_height(&self, height: f32, rise: f32) -> f32 {
        height.min(self.tuning.reach.max_step_y - rise)
    }

    fn min_x(&self) -> f32 {
        self.tuning.world.edge_margin
    }

    fn max_x(&self) -> f32 {
        self.tuning.world.width - self.tuning.world.edge_margin
    }

    /// Center X of a piece `width` wide, within `radius` (capped at the
    /// horizontal reach) of the frontier and inside the world margins. The
    /// reach bound wins over the margins.
    fn centered_near(&mut self, radius: f32, width: f32) -> f32 {
        let fx = self.frontier.x;
        let radius = radius.min(self.tuning.reach.max_step_x);
        let lo = (self.min_x() + width / 2.0).max(fx - radius);
        let hi = (self.max_x() - width / 2.0).min(fx + radius);
        let x = between(self.rng, lo as i32, hi as i32) as f32;
        x.clamp(fx - radius, fx + radius)
    }

    fn advance(&mut self, to: Vec2) {
        self.frontier = to;
        self.steps.push(to);
    }

    /// Platform centered at `(x, y)`; slope kinds become straight slopes
    fn place_platform(&mut self, x: f32, y: f32, scale: f32, kind: PlatformKind) {
        if let Some(direction) = kind.slope_direction() {
            let width = scale * PLATFORM_BASE_WIDTH;
            let altitude = self.tuning.world.altitude_at(y);
            let tint = biome::biome_for_altitude(&self.tuning.biomes, altitude)
                .map(|b| b.platform_tint)
                .unwrap_or(crate::consts::DEFAULT_TERRAIN_TINT);
            self.terrain
                .create_slope(x - width / 2.0, y, width, PLATFORM_SLOPE_HEIGHT, direction, tint);
            self.placed.1 += 1;
            return;
        }

        // Plain ground wears the biome color, typed platforms their own
        let tint = match kind {
            PlatformKind::Standard => self.profile.tint,
            _ => kind.def().color,
        };
        self.platforms.spawn(x, y, scale, kind, tint);
        self.placed.0 += 1;
    }

    fn standard(&mut self) {
        let y = self.frontier.y - self.roll_gap();
        let x = self.centered_near(400.0, 0.0);
        let scale = float_between(self.rng, 0.8, 2.0);
        let kind = roll_platform_type(&self.profile.weights, self.rng);
        self.place_platform(x, y, scale, kind);
        self.advance(Vec2::new(x, y));
    }

    /// Platforms alternating sides of the frontier, each a short hop away
    fn zigzag(&mut self) {
        let steps = between(self.rng, 3, 5);
        let y_gap = self.roll_gap();
        let reach = self.tuning.reach.max_step_x;
        let hop = (reach - 30.0).max(reach / 2.0);

        for _ in 0..steps {
            let y = self.frontier.y - y_gap;
            let fx = self.frontier.x;
            let go_right = fx < self.tuning.world.center_x();
            let dx = float_between(self.rng, 200.0f32.min(hop), hop).floor();
            let x = if go_right { fx + dx } else { fx - dx }
                .clamp(self.min_x(), self.max_x())
                .clamp(fx - reach, fx + reach);
            self.place_platform(x, y, 1.5, PlatformKind::Standard);
            self.advance(Vec2::new(x, y));
        }
    }

    /// Narrow ledges stacked along one side wall, with stepping platforms
    /// first if the wall is out of reach
    fn wall_jump(&mut self) {
        let steps = between(self.rng, 3, 6);
        let y_gap = 150.0f32
            .min(self.profile.max_gap as f32)
            .min(self.tuning.reach.max_step_y);
        let left_wall = 200.0;
        let right_wall = self.tuning.world.width - 200.0;
        // Favor the nearer wall half the time, otherwise pick at random
        let wall_x = if self.rng.random_bool(0.5) {
            if (self.frontier.x - left_wall).abs() <= (self.frontier.x - right_wall).abs() {
                left_wall
            } else {
                right_wall
            }
        } else if self.rng.random_bool(0.5) {
            left_wall
        } else {
            right_wall
        };

        // The first ledge lands up to `jitter` past the wall line
        let reach = self.tuning.reach.max_step_x;
        let jitter = (reach / 4.0).min(50.0).floor();
        let approach = (reach - jitter).min(400.0).max(1.0);
        let to_wall = wall_x - self.frontier.x;
        let hops = ((to_wall.abs() / approach).ceil() as usize).saturating_sub(1);
        for _ in 0..hops {
            let x = self.frontier.x + approach * to_wall.signum();
            let y = self.frontier.y - y_gap;
            self.place_platform(x, y, 1.0, PlatformKind::Standard);
            self.advance(Vec2::new(x, y));
        }

        for _ in 0..steps {
            let y = self.frontier.y - y_gap;
            let x = wall_x + between(self.rng, -(jitter as i32), jitter as i32) as f32;
            self.place_platform(x, y, 0.8, PlatformKind::Standard);
            self.advance(Vec2::new(x, y));
        }
    }

    /// Alternating straight ramps, then a safety ledge
    fn slope_run(&mut self) {
        let count = between(self.rng, 2, 3);
        let width = between(self.rng, 200, 350) as f32;
        let height = between(self.rng, 60, 120) as f32;
        let tint = self.profile.tint;

        for i in 0..count as usize {
            let rise = self.roll_rise(40, 80);
            let height = self.fit_height(height, rise);
            let y = self.frontier.y - rise;
            let center = self.centered_near(300.0, width);
            self.terrain.create_slope(
                center - width / 2.0,
                y,
                width,
                height,
                SlopeDirection::alternating(i),
                tint,
            );
            self.placed.1 += 1;
            self.advance(Vec2::new(center, y - height));
        }

        self.safety_platform(60, 100, 1.5);
    }

    /// Bounce pads climbing to a wide reward ledge
    fn bounce_chain(&mut self) {
        let count = between(self.rng, 2, 4);
        for _ in 0..count {
            let y = self.frontier.y - self.roll_rise(80, 140);
            let x = self.centered_near(350.0, 0.0);
            self.place_platform(x, y, 0.6, PlatformKind::Bounce);
            self.advance(Vec2::new(x, y));
        }
        self.safety_platform(200, 300, 2.0);
    }

    /// Bowl whose floor is one gap above the frontier; the exit ledge sits
    /// above the bowl's rim
    fn half_pipe(&mut self) {
        let width = self.roll(self.tuning.slopes.half_pipe_width);
        let depth = self
            .roll(self.tuning.slopes.half_pipe_depth)
            .min(self.tuning.reach.max_step_y);
        let y = self.frontier.y - self.roll_gap();
        let fx = self.frontier.x;
        let reach = self.tuning.reach.max_step_x;
        let center = fx
            .min(self.max_x() - width / 2.0)
            .max(self.min_x() + width / 2.0)
            .clamp(fx - reach, fx + reach);

        self.terrain
            .create_half_pipe(center - width / 2.0, y, width, depth, self.profile.tint);
        self.placed.1 += 1;

        // Land on the floor, ride up to the rim
        self.advance(Vec2::new(center, y));
        self.advance(Vec2::new(center, y - depth));

        self.safety_platform(80, 140, 1.5);
    }

    /// Quarter pipes in alternating directions, then a reward ledge
    fn launch_sequence(&mut self) {
        let count = between(self.rng, 2, 3);
        for i in 0..count as usize {
            let width = self.roll(self.tuning.slopes.quarter_pipe_width);
            let height = self.roll(self.tuning.slopes.quarter_pipe_height);
            let rise = self.roll_rise(40, 80);
            let height = self.fit_height(height, rise);
            let y = self.frontier.y - rise;
            let center = self.centered_near(300.0, width);
            self.terrain.create_quarter_pipe(
                center - width / 2.0,
                y,
                width,
                height,
                SlopeDirection::alternating(i),
                self.profile.tint,
            );
            self.placed.1 += 1;
            self.advance(Vec2::new(center, y - height));
        }
        self.safety_platform(80, 140, 2.0);
    }

    /// Closely spaced hills with a small ledge on each peak
    fn rolling_hills(&mut self) {
        let count = between(self.rng, 2, 4);
        for _ in 0..count {
            let width = self.roll(self.tuning.slopes.hill_width);
            let height = self.roll(self.tuning.slopes.hill_height);
            let rise = self.roll_rise(20, 50);
            let height = self.fit_height(height, rise);
            let y = self.frontier.y - rise;
            let center = self.centered_near(250.0, width);

            self.terrain
                .create_hill(center - width / 2.0, y, width, height, self.profile.tint);
            self.placed.1 += 1;
            self.place_platform(center, y - height + 10.0, 0.6, PlatformKind::Standard);
            self.advance(Vec2::new(center, y - height));
        }
        self.safety_platform(60, 100, 1.5);
    }

    /// Standard ledge directly above the frontier
    fn safety_platform(&mut self, min_rise: i32, max_rise: i32, scale: f32) {
        let x = self.frontier.x;
        let rise = between(self.rng, min_rise, max_rise) as f32;
        let y = self.frontier.y - rise.min(self.tuning.reach.max_step_y);
        self.place_platform(x, y, scale, PlatformKind::Standard);
        self.advance(Vec2::new(x, y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::HeadlessCanvas;
    use proptest::prelude::*;

    fn world(seed: u64) -> (LevelGenerator, TerrainRegistry, PlatformSet) {
        let tuning = Tuning::default();
        let generator = LevelGenerator::new(seed, &tuning).with_trace();
        let terrain = TerrainRegistry::new(tuning.slopes.clone(), Box::new(HeadlessCanvas::new()));
        (generator, terrain, PlatformSet::new())
    }

    #[test]
    fn test_pattern_cutoffs() {
        let cutoffs = Tuning::default().patterns;
        assert_eq!(Pattern::select(&cutoffs, 0.0), Pattern::ZigZag);
        assert_eq!(Pattern::select(&cutoffs, 0.12), Pattern::WallJump);
        assert_eq!(Pattern::select(&cutoffs, 0.29), Pattern::SlopeRun);
        assert_eq!(Pattern::select(&cutoffs, 0.37), Pattern::BounceChain);
        assert_eq!(Pattern::select(&cutoffs, 0.45), Pattern::HalfPipe);
        assert_eq!(Pattern::select(&cutoffs, 0.55), Pattern::LaunchSequence);
        assert_eq!(Pattern::select(&cutoffs, 0.70), Pattern::RollingHills);
        assert_eq!(Pattern::select(&cutoffs, 0.75), Pattern::Standard);
        assert_eq!(Pattern::select(&[], 0.1), Pattern::Standard);
    }

    #[test]
    fn test_init_layout() {
        let (mut generator, mut terrain, mut platforms) = world(1);
        generator.init(&mut terrain, &mut platforms);
        assert_eq!(platforms.len(), 5);
        assert_eq!(generator.frontier(), Vec2::new(1000.0, 300.0));
        let kinds: Vec<_> = platforms.iter().map(|p| p.kind).collect();
        assert_eq!(kinds[2], PlatformKind::Moving);
        assert_eq!(kinds[4], PlatformKind::Breakable);
        assert_eq!(platforms.iter().next().unwrap().size.x, 4000.0);
    }

    #[test]
    fn test_update_fills_lookahead() {
        let (mut generator, mut terrain, mut platforms) = world(3);
        generator.init(&mut terrain, &mut platforms);
        let generated = generator.update(950.0, &mut terrain, &mut platforms);
        assert!(generated > 0);
        assert!(generator.frontier().y <= 950.0 - 1200.0);
        // Nothing more to do for the same player height
        assert_eq!(generator.update(950.0, &mut terrain, &mut platforms), 0);
    }

    #[test]
    fn test_reachability_over_thousand_chunks() {
        let tuning = Tuning::default();
        let (mut generator, mut terrain, mut platforms) = world(42);
        generator.init(&mut terrain, &mut platforms);

        for _ in 0..1000 {
            generator.generate_chunk(&mut terrain, &mut platforms);
            let y = generator.frontier().y;
            // Keep the containers small as the frontier climbs
            platforms.cleanup(y, 2000.0);
            terrain.cleanup(y, 2000.0);
        }

        let stats = generator.stats();
        assert_eq!(stats.total_chunks(), 1000);
        for pattern in Pattern::ALL {
            assert!(stats.chunks.get(&pattern).copied().unwrap_or(0) > 0, "{:?} never generated", pattern);
        }
        assert!(stats.max_step_x <= tuning.reach.max_step_x, "max dx {}", stats.max_step_x);
        assert!(stats.max_step_y <= tuning.reach.max_step_y, "max dy {}", stats.max_step_y);

        // Independent check over the raw trace, and it always climbs
        for pair in generator.trace().windows(2) {
            assert!((pair[1].x - pair[0].x).abs() <= tuning.reach.max_step_x);
            assert!((pair[1].y - pair[0].y).abs() <= tuning.reach.max_step_y);
            assert!(pair[1].y < pair[0].y);
            assert!(pair[1].x >= 0.0 && pair[1].x <= tuning.world.width);
        }
    }

    fn generate_with(tuning: &Tuning, seed: u64, chunks: usize) -> LevelGenerator {
        let mut generator = LevelGenerator::new(seed, tuning).with_trace();
        let mut terrain = TerrainRegistry::new(tuning.slopes.clone(), Box::new(HeadlessCanvas::new()));
        let mut platforms = PlatformSet::new();
        generator.init(&mut terrain, &mut platforms);
        for _ in 0..chunks {
            generator.generate_chunk(&mut terrain, &mut platforms);
            let y = generator.frontier().y;
            platforms.cleanup(y, 2000.0);
            terrain.cleanup(y, 2000.0);
        }
        generator
    }

    fn assert_trace_within_reach(generator: &LevelGenerator, tuning: &Tuning) {
        let reach = tuning.reach;
        let stats = generator.stats();
        assert!(stats.max_step_x <= reach.max_step_x, "max dx {} > {}", stats.max_step_x, reach.max_step_x);
        assert!(stats.max_step_y <= reach.max_step_y, "max dy {} > {}", stats.max_step_y, reach.max_step_y);
        for pair in generator.trace().windows(2) {
            assert!(pair[1].y < pair[0].y);
        }
    }

    #[test]
    fn test_tightened_reach_override_holds() {
        let json = r#"{
            "reach": { "max_step_x": 250.0, "max_step_y": 200.0 },
            "difficulty": [
                { "max_altitude": 2000.0, "min_gap": 80, "max_gap": 150 },
                { "max_altitude": 1e30, "min_gap": 120, "max_gap": 200 }
            ]
        }"#;
        let tuning = Tuning::from_json(json).unwrap();
        for seed in [1, 77, 4242] {
            let generator = generate_with(&tuning, seed, 300);
            assert_eq!(generator.stats().chunks.len(), Pattern::ALL.len());
            assert_trace_within_reach(&generator, &tuning);
        }
    }

    #[test]
    fn test_tiny_reach_still_terminates() {
        // Built in code, so validation never sees it
        let mut tuning = Tuning::default();
        tuning.reach.max_step_x = 10.0;
        tuning.reach.max_step_y = 40.0;
        tuning.patterns = vec![PatternCutoff { below: 1.0, pattern: Pattern::WallJump }];

        let generator = generate_with(&tuning, 3, 5);
        assert_eq!(generator.stats().chunks.get(&Pattern::WallJump), Some(&5));
        // Crossing at most the full world width in 10 px hops
        assert!(generator.trace().len() < 5 * (1920 / 5 + 6));
        assert_trace_within_reach(&generator, &tuning);
    }

    #[test]
    fn test_same_seed_same_level() {
        let run = |seed| {
            let (mut generator, mut terrain, mut platforms) = world(seed);
            generator.init(&mut terrain, &mut platforms);
            generator.update(-5000.0, &mut terrain, &mut platforms);
            (generator.trace().to_vec(), platforms.len(), terrain.len())
        };
        assert_eq!(run(9), run(9));
        assert_ne!(run(9).0, run(10).0);
    }

    #[test]
    fn test_cleanup_prunes_behind_player() {
        let (mut generator, mut terrain, mut platforms) = world(5);
        generator.init(&mut terrain, &mut platforms);
        generator.update(-3000.0, &mut terrain, &mut platforms);
        let buffer = Tuning::default().world.platform_cleanup_buffer;
        assert!(platforms.iter().all(|p| p.pos.y <= -3000.0 + buffer));
        assert!(terrain.iter().all(|t| t.lowest_y() <= -3000.0 + buffer));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_every_seed_stays_reachable(seed in any::<u64>()) {
            let tuning = Tuning::default();
            let (mut generator, mut terrain, mut platforms) = world(seed);
            generator.init(&mut terrain, &mut platforms);
            for _ in 0..100 {
                generator.generate_chunk(&mut terrain, &mut platforms);
            }
            let stats = generator.stats();
            prop_assert!(stats.max_step_x <= tuning.reach.max_step_x);
            prop_assert!(stats.max_step_y <= tuning.reach.max_step_y);
        }
    }
}
