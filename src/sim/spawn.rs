//! Enemy spawning and item drops
//!
//! The director only decides when, where and what to spawn. Enemy movement
//! belongs to the host; the simulation tracks health and knockback.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::combat::Aabb;
use super::items::ItemId;
use super::platform::PlatformSet;
use super::{between, float_between};
use crate::consts::{PLAYER_HEIGHT, PLAYER_WIDTH};
use crate::tuning::{SpawnTier, SpawnTuning};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(pub u32);

/// Enemy archetypes by composition tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Basic ground walker
    Crawler,
    /// Intermediate flyer
    Bat,
    /// Advanced charger
    Hound,
    /// Elite stationary shooter
    Turret,
}

impl EnemyKind {
    /// (health, contact damage, speed)
    pub fn stats(self) -> (i32, i32, f32) {
        match self {
            EnemyKind::Crawler => (3, 1, 100.0),
            EnemyKind::Bat => (2, 1, 100.0),
            EnemyKind::Hound => (4, 1, 250.0),
            EnemyKind::Turret => (5, 1, 0.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub health: i32,
    pub contact_damage: i32,
    pub speed: f32,
    pub alive: bool,
}

impl Enemy {
    pub fn new(id: EnemyId, kind: EnemyKind, pos: Vec2) -> Self {
        let (health, contact_damage, speed) = kind.stats();
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            health,
            contact_damage,
            speed,
            alive: true,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT))
    }

    /// Apply damage; returns true if this killed the enemy
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if !self.alive {
            return false;
        }
        self.health -= amount;
        if self.health <= 0 {
            self.alive = false;
            return true;
        }
        false
    }
}

/// Chance that a killed enemy leaves a silver item behind
pub const ITEM_DROP_CHANCE: f64 = 0.25;

/// An item lying in the world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemDrop {
    pub item: ItemId,
    pub pos: Vec2,
}

/// Decides spawn timing, placement and composition from altitude
#[derive(Debug, Clone)]
pub struct SpawnDirector {
    tuning: SpawnTuning,
    timer: f32,
    next_interval: f32,
    next_id: u32,
}

impl SpawnDirector {
    pub fn new(tuning: &SpawnTuning, rng: &mut Pcg32) -> Self {
        let mut director = Self {
            tuning: tuning.clone(),
            timer: 0.0,
            next_interval: 0.0,
            next_id: 0,
        };
        director.next_interval = director.spawn_interval(0.0, rng);
        director
    }

    pub fn next_interval(&self) -> f32 {
        self.next_interval
    }

    /// Interval lerps from max to min over the difficulty ramp, ±20% jitter
    pub fn spawn_interval(&self, altitude: f32, rng: &mut Pcg32) -> f32 {
        let progress = (altitude / self.tuning.full_difficulty_altitude).clamp(0.0, 1.0);
        let base = self.tuning.max_interval + (self.tuning.min_interval - self.tuning.max_interval) * progress;
        base * float_between(rng, 0.8, 1.2)
    }

    /// Composition tier for an altitude, the last tier past the end
    pub fn composition(&self, altitude: f32) -> Option<&SpawnTier> {
        self.tuning
            .composition
            .iter()
            .find(|t| altitude < t.max_altitude)
            .or_else(|| self.tuning.composition.last())
    }

    pub fn select_kind(&self, altitude: f32, rng: &mut Pcg32) -> EnemyKind {
        let Some(tier) = self.composition(altitude) else {
            return EnemyKind::Crawler;
        };
        let roll: f32 = rng.random();
        if roll < tier.basic {
            EnemyKind::Crawler
        } else if roll < tier.basic + tier.intermediate {
            EnemyKind::Bat
        } else if roll < tier.basic + tier.intermediate + tier.advanced {
            EnemyKind::Hound
        } else {
            EnemyKind::Turret
        }
    }

    /// First visible platform far enough from the player, else a screen-edge
    /// point inside the view
    pub fn spawn_point(
        &self,
        player: Vec2,
        view_top: f32,
        view_bottom: f32,
        platforms: &PlatformSet,
        rng: &mut Pcg32,
    ) -> Vec2 {
        let found = platforms.iter().find(|p| {
            p.is_solid()
                && p.pos.y >= view_top
                && p.pos.y <= view_bottom
                && p.pos.distance(player) >= self.tuning.min_distance_from_player
        });
        if let Some(platform) = found {
            return Vec2::new(platform.pos.x + between(rng, -50, 50) as f32, platform.pos.y - 40.0);
        }

        let x = if rng.random_bool(0.5) {
            between(rng, 100, 400)
        } else {
            between(rng, 1500, 1800)
        };
        Vec2::new(x as f32, view_top + between(rng, 100, 400) as f32)
    }

    /// Advance the spawn timer; spawns at most one enemy per call
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        dt: f32,
        altitude: f32,
        player: Vec2,
        view: (f32, f32),
        platforms: &PlatformSet,
        enemies: &mut Vec<Enemy>,
        rng: &mut Pcg32,
    ) -> Option<EnemyId> {
        self.timer += dt;
        let mut spawned = None;

        if self.timer >= self.next_interval {
            self.timer = 0.0;
            self.next_interval = self.spawn_interval(altitude, rng);

            let active = enemies.iter().filter(|e| e.alive).count();
            if active < self.tuning.max_enemies_on_screen {
                let pos = self.spawn_point(player, view.0, view.1, platforms, rng);
                let kind = self.select_kind(altitude, rng);
                self.next_id += 1;
                let id = EnemyId(self.next_id);
                log::debug!("Spawned {:?} {:?} at ({:.0}, {:.0})", kind, id, pos.x, pos.y);
                enemies.push(Enemy::new(id, kind, pos));
                spawned = Some(id);
            }
        }

        spawned
    }

    /// Random silver item at `pos`, rolled against [`ITEM_DROP_CHANCE`]
    pub fn roll_drop(&self, pos: Vec2, rng: &mut Pcg32) -> Option<ItemDrop> {
        if !rng.random_bool(ITEM_DROP_CHANCE) {
            return None;
        }
        let item = ItemId::random_silver(rng);
        log::debug!("Dropped {:?} at ({:.0}, {:.0})", item, pos.x, pos.y);
        Some(ItemDrop { item, pos })
    }

    /// Drop dead enemies and anything that fell far below the player
    pub fn cleanup(&self, player_y: f32, enemies: &mut Vec<Enemy>, items: &mut Vec<ItemDrop>) {
        let limit = player_y + self.tuning.cleanup_buffer;
        enemies.retain(|e| e.alive && e.pos.y <= limit);
        items.retain(|i| i.pos.y <= limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::platform::PlatformKind;
    use rand::SeedableRng;

    fn director(rng: &mut Pcg32) -> SpawnDirector {
        SpawnDirector::new(&SpawnTuning::default(), rng)
    }

    #[test]
    fn test_interval_shrinks_with_altitude() {
        let mut rng = Pcg32::seed_from_u64(1);
        let d = director(&mut rng);
        for _ in 0..100 {
            let low = d.spawn_interval(0.0, &mut rng);
            assert!((12.0..=18.0).contains(&low));
            let high = d.spawn_interval(50_000.0, &mut rng);
            assert!((4.0..=6.0).contains(&high));
        }
    }

    #[test]
    fn test_composition_tiers() {
        let mut rng = Pcg32::seed_from_u64(2);
        let d = director(&mut rng);
        // Tier 1 never rolls advanced or elite
        for _ in 0..1000 {
            let kind = d.select_kind(10.0, &mut rng);
            assert!(matches!(kind, EnemyKind::Crawler | EnemyKind::Bat));
        }
        // Top tier is all advanced/elite
        for _ in 0..1000 {
            let kind = d.select_kind(1.0e6, &mut rng);
            assert!(matches!(kind, EnemyKind::Hound | EnemyKind::Turret));
        }
    }

    #[test]
    fn test_spawn_respects_cap() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut d = director(&mut rng);
        let platforms = PlatformSet::new();
        let mut enemies: Vec<Enemy> = (0..8)
            .map(|i| Enemy::new(EnemyId(100 + i), EnemyKind::Bat, Vec2::ZERO))
            .collect();
        let interval = d.next_interval();
        let spawned = d.update(interval + 0.1, 0.0, Vec2::ZERO, (-540.0, 540.0), &platforms, &mut enemies, &mut rng);
        assert!(spawned.is_none());

        enemies[0].alive = false;
        let interval = d.next_interval();
        let spawned = d.update(interval + 0.1, 0.0, Vec2::ZERO, (-540.0, 540.0), &platforms, &mut enemies, &mut rng);
        assert!(spawned.is_some());
        assert_eq!(enemies.len(), 9);
    }

    #[test]
    fn test_spawn_point_prefers_distant_visible_platform() {
        let mut rng = Pcg32::seed_from_u64(4);
        let d = director(&mut rng);
        let mut platforms = PlatformSet::new();
        platforms.spawn(500.0, 0.0, 1.0, PlatformKind::Standard, 0);
        platforms.spawn(1400.0, 100.0, 1.0, PlatformKind::Standard, 0);

        let pos = d.spawn_point(Vec2::new(500.0, 0.0), -540.0, 540.0, &platforms, &mut rng);
        assert!((pos.x - 1400.0).abs() <= 50.0);
        assert_eq!(pos.y, 60.0);

        // Nothing visible: screen edge fallback
        let pos = d.spawn_point(Vec2::ZERO, 5000.0, 6000.0, &platforms, &mut rng);
        assert!(pos.x <= 400.0 || pos.x >= 1500.0);
        assert!(pos.y >= 5100.0 && pos.y <= 5400.0);
    }

    #[test]
    fn test_drops_are_silver_and_occasional() {
        let mut rng = Pcg32::seed_from_u64(6);
        let d = director(&mut rng);
        let drops: Vec<ItemDrop> = (0..1000)
            .filter_map(|_| d.roll_drop(Vec2::new(5.0, 6.0), &mut rng))
            .collect();
        assert!(drops.len() > 150 && drops.len() < 350);
        assert!(drops.iter().all(|d| d.item.data().tier == crate::sim::items::ItemTier::Silver));
        assert!(drops.iter().all(|d| d.pos == Vec2::new(5.0, 6.0)));
    }

    #[test]
    fn test_enemy_damage_and_cleanup() {
        let mut rng = Pcg32::seed_from_u64(5);
        let d = director(&mut rng);
        let mut enemy = Enemy::new(EnemyId(1), EnemyKind::Crawler, Vec2::ZERO);
        assert!(!enemy.take_damage(2));
        assert!(enemy.take_damage(1));
        assert!(!enemy.take_damage(1));

        let mut enemies = vec![enemy, Enemy::new(EnemyId(2), EnemyKind::Bat, Vec2::new(0.0, 5000.0))];
        let mut items = vec![ItemDrop { item: ItemId::MoonStone, pos: Vec2::new(0.0, 100.0) }];
        d.cleanup(0.0, &mut enemies, &mut items);
        assert!(enemies.is_empty());
        assert_eq!(items.len(), 1);
    }
}
