//! World state
//!
//! Everything one run needs lives in [`World`]. The tick in [`super::tick`]
//! is the only code that advances it; hosts read it and drain its events.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::biome::{BiomeKind, biome_for_altitude};
use super::combat::{Aabb, ClassType};
use super::events::{EventQueue, EventSink, GameEvent};
use super::level::LevelGenerator;
use super::platform::PlatformSet;
use super::player::{Contacts, Player};
use super::spawn::{Enemy, ItemDrop, SpawnDirector};
use super::style::StyleMeter;
use super::terrain::TerrainRegistry;
use crate::renderer::{HeadlessCanvas, TerrainCanvas};
use crate::tuning::Tuning;

/// Side length of an item pickup box
pub const ITEM_SIZE: f32 = 24.0;
/// A falling body lands if its bottom was at most this far below a top last step
const LANDING_SLOP: f32 = 2.0;

/// Complete state of one run
#[derive(Debug)]
pub struct World {
    pub seed: u64,
    pub tuning: Tuning,
    pub player: Player,
    pub terrain: TerrainRegistry,
    pub platforms: PlatformSet,
    pub generator: LevelGenerator,
    pub style: StyleMeter,
    pub spawner: SpawnDirector,
    pub enemies: Vec<Enemy>,
    pub items: Vec<ItemDrop>,
    /// Gameplay RNG (spawns, drops). Level layout has its own stream.
    pub rng: Pcg32,
    /// Lowest Y (highest point) the player has reached
    pub highest_y: f32,
    /// Where the player stood at `highest_y`; death-plane respawns go here
    pub highest_pos: Vec2,
    pub biome: BiomeKind,
    pub kills: u32,
    pub time_ticks: u64,
    pub game_over: bool,
    pub events: EventQueue,
    /// Last whole altitude reported
    pub(crate) reported_altitude: i64,
}

impl World {
    /// New run with the level's starting layout in place
    pub fn new(seed: u64, tuning: Tuning, class: ClassType, canvas: Box<dyn TerrainCanvas>) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed.rotate_left(32) ^ 0x9e37_79b9_7f4a_7c15);
        let mut terrain = TerrainRegistry::new(tuning.slopes.clone(), canvas);
        let mut platforms = PlatformSet::new();
        let mut generator = LevelGenerator::new(seed, &tuning);
        generator.init(&mut terrain, &mut platforms);

        let spawn = tuning.world.player_spawn;
        let biome = biome_for_altitude(&tuning.biomes, 0.0)
            .map(|b| b.kind)
            .unwrap_or_default();

        log::info!("New run: seed={} class={:?}", seed, class);

        Self {
            seed,
            player: Player::new(spawn, class),
            terrain,
            platforms,
            generator,
            style: StyleMeter::new(&tuning.style),
            spawner: SpawnDirector::new(&tuning.spawning, &mut rng),
            enemies: Vec::new(),
            items: Vec::new(),
            rng,
            highest_y: spawn.y,
            highest_pos: spawn,
            biome,
            kills: 0,
            time_ticks: 0,
            game_over: false,
            events: EventQueue::new(),
            reported_altitude: 0,
            tuning,
        }
    }

    /// Run without a renderer
    pub fn headless(seed: u64, tuning: Tuning) -> Self {
        Self::new(seed, tuning, ClassType::default(), Box::new(HeadlessCanvas::new()))
    }

    /// Current altitude of the player
    pub fn altitude(&self) -> f32 {
        self.tuning.world.altitude_at(self.player.body.pos.y)
    }

    /// Highest altitude reached this run
    pub fn max_altitude(&self) -> f32 {
        self.tuning.world.altitude_at(self.highest_y)
    }

    /// Camera view as (top, bottom), centered on the player
    pub fn view(&self) -> (f32, f32) {
        let half = self.tuning.world.height / 2.0;
        let y = self.player.body.pos.y;
        (y - half, y + half)
    }

    pub fn item_bounds(item: &ItemDrop) -> Aabb {
        Aabb::new(item.pos, Vec2::splat(ITEM_SIZE))
    }

    /// Minimal stand-in for the host physics engine: integrate the player
    /// body, land it on platform tops and stop it at the side walls.
    /// Returns the contacts for the next tick.
    pub fn integrate_body(&mut self, dt: f32) -> Contacts {
        let mut contacts = Contacts::default();
        let on_slope = self.player.on_slope();
        let world = &self.tuning.world;
        let body = &mut self.player.body;

        let prev_bottom = body.bottom();
        body.integrate(dt, self.tuning.physics.gravity);

        if body.vel.y >= 0.0 && !on_slope {
            let x = body.pos.x;
            let bottom = body.bottom();
            let landed = self.platforms.iter().find(|p| {
                p.is_solid()
                    && x >= p.left()
                    && x <= p.right()
                    && prev_bottom <= p.top() + LANDING_SLOP
                    && bottom >= p.top()
            });
            if let Some(platform) = landed {
                body.pos.y = platform.top() - body.size.y / 2.0;
                body.pos.x += platform.velocity_x * dt;
                body.vel.y = 0.0;
                contacts.down = true;
                contacts.platform = Some(platform.id);
            }
        }

        let half_w = body.size.x / 2.0;
        let left_limit = world.wall_width + half_w;
        let right_limit = world.width - world.wall_width - half_w;
        if body.pos.x <= left_limit {
            body.pos.x = left_limit;
            body.vel.x = body.vel.x.max(0.0);
            contacts.left = true;
        } else if body.pos.x >= right_limit {
            body.pos.x = right_limit;
            body.vel.x = body.vel.x.min(0.0);
            contacts.right = true;
        }

        contacts
    }

    /// Track the highest point and report altitude and biome changes
    pub(crate) fn update_altitude(&mut self) {
        let pos = self.player.body.pos;
        if pos.y < self.highest_y {
            self.highest_y = pos.y;
            self.highest_pos = pos;
        }

        let altitude = self.altitude();
        let whole = altitude.floor() as i64;
        if whole != self.reported_altitude {
            self.reported_altitude = whole;
            self.events.emit(GameEvent::AltitudeChange { altitude });
        }

        let Some(biome) = biome_for_altitude(&self.tuning.biomes, self.max_altitude()) else {
            return;
        };
        if biome.kind != self.biome {
            log::info!("Entered {} at altitude {:.0}", biome.name, self.max_altitude());
            self.biome = biome.kind;
            self.events.emit(GameEvent::BiomeChange {
                biome: biome.kind,
                name: biome.name.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    #[test]
    fn test_new_world_has_start_layout() {
        let world = World::headless(7, Tuning::default());
        assert!(world.platforms.len() >= 5);
        assert_eq!(world.generator.frontier(), Vec2::new(1000.0, 300.0));
        assert_eq!(world.biome, BiomeKind::Depths);
        assert_eq!(world.player.health(), ClassType::Monk.stats().health);
        assert!(!world.game_over);
    }

    #[test]
    fn test_body_lands_on_base_platform() {
        let mut world = World::headless(7, Tuning::default());
        let mut contacts = Contacts::default();
        for _ in 0..120 {
            contacts = world.integrate_body(SIM_DT);
        }
        assert!(contacts.down);
        let base_top = world.tuning.world.base_platform_y - crate::consts::PLATFORM_HEIGHT / 2.0;
        assert!((world.player.body.bottom() - base_top).abs() < 1e-3);
        assert_eq!(world.player.body.vel.y, 0.0);
    }

    #[test]
    fn test_walls_stop_the_body() {
        let mut world = World::headless(7, Tuning::default());
        world.player.body.pos.x = 60.0;
        world.player.body.vel.x = -300.0;
        let contacts = world.integrate_body(SIM_DT);
        assert!(contacts.left);
        assert_eq!(world.player.body.vel.x, 0.0);
        assert_eq!(world.player.body.pos.x, world.tuning.world.wall_width + 16.0);
    }

    #[test]
    fn test_altitude_and_biome_events() {
        let mut world = World::headless(7, Tuning::default());
        world.player.body.pos.y = world.tuning.world.base_platform_y - 10_000.0 * 10.0;
        world.update_altitude();
        let events = world.events.drain();
        assert!(events.iter().any(|e| matches!(e, GameEvent::AltitudeChange { .. })));
        assert!(events.iter().any(|e| matches!(e, GameEvent::BiomeChange { biome: BiomeKind::Summit, .. })));
        assert_eq!(world.highest_y, world.player.body.pos.y);

        // No change, no events
        world.update_altitude();
        assert!(world.events.is_empty());
    }
}
