//! Combat: classes, attack data, the attack state machine and hit resolution
//!
//! Attack timing runs IDLE → STARTUP → ACTIVE → RECOVERY → IDLE against the
//! current attack's `startup`, hitbox `duration` and `recovery`. A stuck-attack
//! timeout forces IDLE no matter what, so the machine cannot deadlock.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::events::{EventSink, GameEvent};
use super::items::StatType;
use super::player::Player;
use super::spawn::{Enemy, EnemyId};
use crate::tuning::CombatTuning;

/// Playable classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ClassType {
    Paladin,
    #[default]
    Monk,
    Priest,
}

/// Per-class multipliers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassStats {
    pub name: &'static str,
    pub health: i32,
    pub move_speed: f32,
    pub jump_height: f32,
    pub attack_damage: f32,
    /// Lower is faster
    pub attack_speed: f32,
    pub color: u32,
}

impl ClassType {
    pub fn stats(self) -> ClassStats {
        match self {
            ClassType::Paladin => ClassStats {
                name: "Paladin",
                health: 4,
                move_speed: 0.85,
                jump_height: 0.9,
                attack_damage: 1.3,
                attack_speed: 1.2,
                color: 0x3333ff,
            },
            ClassType::Monk => ClassStats {
                name: "Monk",
                health: 3,
                move_speed: 1.25,
                jump_height: 1.2,
                attack_damage: 0.7,
                attack_speed: 0.6,
                color: 0xffaa00,
            },
            ClassType::Priest => ClassStats {
                name: "Priest",
                health: 3,
                move_speed: 1.0,
                jump_height: 1.0,
                attack_damage: 0.9,
                attack_speed: 1.0,
                color: 0xffffff,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackType {
    Light,
    Heavy,
    Special,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AttackDirection {
    #[default]
    Neutral,
    Up,
    Down,
}

impl AttackType {
    fn index(self) -> usize {
        match self {
            AttackType::Light => 0,
            AttackType::Heavy => 1,
            AttackType::Special => 2,
        }
    }
}

impl AttackDirection {
    fn index(self) -> usize {
        match self {
            AttackDirection::Neutral => 0,
            AttackDirection::Up => 1,
            AttackDirection::Down => 2,
        }
    }
}

/// Hitbox relative to the player center, facing right. Times in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitboxConfig {
    pub size: Vec2,
    pub offset: Vec2,
    pub duration: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackDefinition {
    pub id: &'static str,
    pub damage_multiplier: f32,
    pub knockback: Vec2,
    pub hitstun: f32,
    pub startup: f32,
    pub recovery: f32,
    pub hitbox: HitboxConfig,
    pub color: u32,
}

impl AttackDefinition {
    /// Startup + active + recovery
    pub fn total_time(&self) -> f32 {
        self.startup + self.hitbox.duration + self.recovery
    }
}

const fn attack(
    id: &'static str,
    damage_multiplier: f32,
    knockback: (f32, f32),
    hitstun: f32,
    startup: f32,
    recovery: f32,
    hitbox: (f32, f32, f32, f32, f32),
    color: u32,
) -> AttackDefinition {
    let (w, h, ox, oy, duration) = hitbox;
    AttackDefinition {
        id,
        damage_multiplier,
        knockback: Vec2::new(knockback.0, knockback.1),
        hitstun,
        startup,
        recovery,
        hitbox: HitboxConfig {
            size: Vec2::new(w, h),
            offset: Vec2::new(ox, oy),
            duration,
        },
        color,
    }
}

/// Filler moves share one shape
const fn basic(id: &'static str, offset_y: f32) -> AttackDefinition {
    attack(id, 1.0, (100.0, -100.0), 0.2, 0.1, 0.2, (40.0, 40.0, 30.0, offset_y, 0.1), 0xcccccc)
}

static MOVE_LIST: [AttackDefinition; 20] = [
    attack("jab_1", 0.8, (100.0, -50.0), 0.2, 0.05, 0.1, (40.0, 30.0, 30.0, 0.0, 0.1), 0xffff00),
    attack("jab_2", 0.9, (150.0, -50.0), 0.25, 0.05, 0.1, (40.0, 30.0, 30.0, 0.0, 0.1), 0xffaa00),
    attack("jab_3", 1.2, (400.0, -200.0), 0.4, 0.1, 0.3, (50.0, 40.0, 40.0, 0.0, 0.15), 0xff0000),
    attack("uppercut", 1.0, (50.0, -500.0), 0.4, 0.1, 0.2, (30.0, 60.0, 20.0, -30.0, 0.15), 0x00ff00),
    attack("low_kick", 0.8, (100.0, 0.0), 0.2, 0.05, 0.1, (40.0, 20.0, 30.0, 20.0, 0.1), 0x0000ff),
    attack("dash_punch", 1.1, (300.0, -100.0), 0.3, 0.15, 0.25, (60.0, 30.0, 40.0, 0.0, 0.2), 0xff00ff),
    basic("high_kick", -20.0),
    basic("sweep", 20.0),
    basic("blast", 0.0),
    basic("rising_blast", -20.0),
    basic("ground_slam", 20.0),
    basic("air_kick", 0.0),
    basic("air_up_kick", -20.0),
    basic("dive_kick", 20.0),
    basic("air_heavy", 0.0),
    basic("air_up_heavy", -20.0),
    basic("dive_bomb", 20.0),
    basic("air_blast", 0.0),
    basic("air_rising", -20.0),
    basic("meteor", 20.0),
];

/// Move set: input maps plus combo continuations
#[derive(Debug)]
pub struct MoveSet {
    /// `[type][direction]` → attack id
    pub ground: [[&'static str; 3]; 3],
    pub air: [[&'static str; 3]; 3],
    pub attacks: &'static [AttackDefinition],
    /// (from, input, to)
    pub combos: &'static [(&'static str, AttackType, &'static str)],
}

static MARTIAL: MoveSet = MoveSet {
    ground: [
        ["jab_1", "uppercut", "low_kick"],
        ["dash_punch", "high_kick", "sweep"],
        ["blast", "rising_blast", "ground_slam"],
    ],
    air: [
        ["air_kick", "air_up_kick", "dive_kick"],
        ["air_heavy", "air_up_heavy", "dive_bomb"],
        ["air_blast", "air_rising", "meteor"],
    ],
    attacks: &MOVE_LIST,
    combos: &[
        ("jab_1", AttackType::Light, "jab_2"),
        ("jab_2", AttackType::Light, "jab_3"),
    ],
};

impl MoveSet {
    /// Every class currently shares one move set; stats differ per class
    pub fn for_class(_class: ClassType) -> &'static MoveSet {
        &MARTIAL
    }

    pub fn attack(&self, id: &str) -> Option<&'static AttackDefinition> {
        self.attacks.iter().find(|a| a.id == id)
    }

    pub fn combo_next(&self, from: &str, input: AttackType) -> Option<&'static str> {
        self.combos
            .iter()
            .find(|(f, i, _)| *f == from && *i == input)
            .map(|(_, _, to)| *to)
    }

    pub fn lookup(&self, on_ground: bool, ty: AttackType, dir: AttackDirection) -> &'static str {
        let map = if on_ground { &self.ground } else { &self.air };
        map[ty.index()][dir.index()]
    }
}

/// Axis-aligned box by center and half extents
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec2,
    pub half_size: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half_size: size / 2.0,
        }
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        let d = (self.center - other.center).abs();
        d.x <= self.half_size.x + other.half_size.x && d.y <= self.half_size.y + other.half_size.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AttackPhase {
    #[default]
    Idle,
    Startup,
    Active,
    Recovery,
}

/// Attack timing and combo state, owned by the player
#[derive(Debug, Clone, Default)]
pub struct AttackMachine {
    phase: AttackPhase,
    current: Option<&'static str>,
    /// Seconds since the attack started
    timer: f32,
    combo_timer: f32,
    hit_enemies: BTreeSet<EnemyId>,
}

impl AttackMachine {
    pub fn phase(&self) -> AttackPhase {
        self.phase
    }

    pub fn is_attacking(&self) -> bool {
        self.phase != AttackPhase::Idle
    }

    pub fn current(&self) -> Option<&'static str> {
        self.current
    }

    /// Idle, or cancelling out of recovery
    pub fn can_attack(&self) -> bool {
        matches!(self.phase, AttackPhase::Idle | AttackPhase::Recovery)
    }

    /// Begin `id` from STARTUP. Unknown ids are caught on the next tick.
    pub fn start(&mut self, id: &'static str) {
        self.phase = AttackPhase::Startup;
        self.current = Some(id);
        self.timer = 0.0;
        self.hit_enemies.clear();
    }

    /// Pick the next attack for an input: combo continuation inside the
    /// combo window, else the ground/air map. Returns the started id.
    pub fn try_attack(
        &mut self,
        moves: &MoveSet,
        ty: AttackType,
        dir: AttackDirection,
        on_ground: bool,
    ) -> Option<&'static str> {
        if !self.can_attack() {
            return None;
        }
        let combo = self
            .current
            .filter(|_| self.combo_timer > 0.0)
            .and_then(|from| moves.combo_next(from, ty));
        let next = combo.unwrap_or_else(|| moves.lookup(on_ground, ty, dir));
        self.start(next);
        Some(next)
    }

    /// Advance timers. `time_scale` stretches every phase (attack speed stat).
    pub fn tick(&mut self, dt: f32, moves: &MoveSet, tuning: &CombatTuning, time_scale: f32) {
        if self.combo_timer > 0.0 {
            self.combo_timer -= dt;
            if self.combo_timer <= 0.0 && !self.is_attacking() {
                self.current = None;
            }
        }

        if !self.is_attacking() {
            return;
        }

        self.timer += dt;
        if self.timer > tuning.attack_stuck_timeout {
            log::warn!(
                "Attack {:?} stuck in {:?} for {:.2}s; forcing idle",
                self.current,
                self.phase,
                self.timer
            );
            self.end(tuning);
            return;
        }

        let Some(def) = self.current.and_then(|id| moves.attack(id)) else {
            log::warn!("Unknown attack id {:?}; resetting", self.current);
            self.reset();
            return;
        };

        let scale = time_scale.max(0.0);
        let startup = def.startup * scale;
        let active_end = startup + def.hitbox.duration * scale;
        let recovery_end = active_end + def.recovery * scale;

        // Fall through so a long frame can cross several phases at once
        if self.phase == AttackPhase::Startup && self.timer >= startup {
            self.phase = AttackPhase::Active;
        }
        if self.phase == AttackPhase::Active && self.timer >= active_end {
            self.phase = AttackPhase::Recovery;
        }
        if self.phase == AttackPhase::Recovery && self.timer >= recovery_end {
            self.end(tuning);
        }
    }

    /// Finished normally or by timeout: the combo window opens
    fn end(&mut self, tuning: &CombatTuning) {
        self.phase = AttackPhase::Idle;
        self.timer = 0.0;
        self.combo_timer = tuning.combo_window;
    }

    /// Desync recovery: back to a clean idle state
    pub fn reset(&mut self) {
        self.phase = AttackPhase::Idle;
        self.current = None;
        self.timer = 0.0;
        self.combo_timer = 0.0;
        self.hit_enemies.clear();
    }

    /// World-space hitbox while ACTIVE
    pub fn hitbox(&self, moves: &MoveSet, center: Vec2, facing_right: bool) -> Option<Aabb> {
        if self.phase != AttackPhase::Active {
            return None;
        }
        let def = moves.attack(self.current?)?;
        let offset = Vec2::new(
            if facing_right { def.hitbox.offset.x } else { -def.hitbox.offset.x },
            def.hitbox.offset.y,
        );
        Some(Aabb::new(center + offset, def.hitbox.size))
    }

    /// Mark `enemy` as hit by this swing; false if it already was
    pub fn register_hit(&mut self, enemy: EnemyId) -> bool {
        self.hit_enemies.insert(enemy)
    }
}

/// `round(base × attack mult × class mult × (1 + item modifier))`
pub fn attack_damage(player: &Player, damage_multiplier: f32, tuning: &CombatTuning) -> i32 {
    let value = player.modifiers().apply(
        StatType::AttackDamage,
        tuning.base_damage * damage_multiplier,
        player.class_stats().attack_damage,
    );
    value.round() as i32
}

/// Resolve the player's active hitbox against enemies. Each enemy is hit at
/// most once per swing. Returns the number of kills.
pub fn resolve_hits(
    player: &mut Player,
    enemies: &mut [Enemy],
    tuning: &CombatTuning,
    events: &mut dyn EventSink,
) -> u32 {
    let Some(hitbox) = player.attack_hitbox() else {
        return 0;
    };
    let moves = MoveSet::for_class(player.class());
    let def = player.attack().current().and_then(|id| moves.attack(id));
    let damage = attack_damage(player, def.map_or(1.0, |d| d.damage_multiplier), tuning);
    let knockback = def.map_or(tuning.knockback_enemy, |d| d.knockback);
    let airborne = !player.on_ground();
    let player_x = player.body.pos.x;

    let mut kills = 0;
    for enemy in enemies.iter_mut().filter(|e| e.alive) {
        if !hitbox.overlaps(&enemy.bounds()) {
            continue;
        }
        if !player.register_hit(enemy.id) {
            continue;
        }
        if enemy.take_damage(damage) {
            kills += 1;
            events.emit(GameEvent::EnemyKilled {
                kind: enemy.kind,
                pos: enemy.pos,
                airborne,
            });
            continue;
        }
        let direction = if enemy.pos.x > player_x { 1.0 } else { -1.0 };
        enemy.vel = Vec2::new(knockback.x * direction, knockback.y);
    }
    kills
}

/// Enemy touched the player: one damage and a knockback away from the enemy.
/// Returns whether damage was dealt.
pub fn contact_damage(
    player: &mut Player,
    enemy: &Enemy,
    tuning: &CombatTuning,
    events: &mut dyn EventSink,
) -> bool {
    if !enemy.alive || player.is_invincible() {
        return false;
    }
    if !player.take_damage(enemy.contact_damage, tuning, events) {
        return false;
    }
    let direction = if player.body.pos.x > enemy.pos.x { 1.0 } else { -1.0 };
    player.body.vel = Vec2::new(tuning.knockback_player.x * direction, tuning.knockback_player.y);
    true
}
