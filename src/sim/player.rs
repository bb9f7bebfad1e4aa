//! Player movement, slope integration and combat state
//!
//! The player owns every one of its timers and flags. Other systems talk to it
//! through narrow commands: [`Player::handle_slope_physics`],
//! [`Player::clear_slope_state`], [`Player::take_damage`] and
//! [`Player::collect_item`].
//!
//! Body integration against axis-aligned platforms belongs to the host. The
//! player only writes velocity, acceleration, drag and the gravity flag, and
//! reads back the host's contacts each frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::combat::{Aabb, AttackDirection, AttackMachine, AttackType, ClassStats, ClassType, MoveSet};
use super::events::{EventSink, GameEvent};
use super::items::{Ability, ItemId, StatModifiers, StatType};
use super::platform::{PlatformId, PlatformKind};
use super::spawn::EnemyId;
use super::terrain::{SlopeCollisionResult, SlopeProbe};
use crate::consts::{PLAYER_HEIGHT, PLAYER_WIDTH};
use crate::sign;
use crate::tuning::{CombatTuning, Tuning};

/// Buttons for one frame
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Jump went down this frame
    pub jump_pressed: bool,
    pub jump_held: bool,
    /// Attack button that went down this frame
    pub attack: Option<AttackType>,
}

/// What the host physics engine reports touching
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Contacts {
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Platform under the player, when standing on one
    pub platform: Option<PlatformId>,
}

/// Kinematic body state shared with the host integrator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Center
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub accel_x: f32,
    pub drag_x: f32,
    pub allow_gravity: bool,
}

impl Body {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            accel_x: 0.0,
            drag_x: 0.0,
            allow_gravity: true,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y / 2.0
    }

    /// Semi-implicit Euler step. Drag only acts while not accelerating.
    pub fn integrate(&mut self, dt: f32, gravity: f32) {
        if self.allow_gravity {
            self.vel.y += gravity * dt;
        }
        if self.accel_x != 0.0 {
            self.vel.x += self.accel_x * dt;
        } else {
            let slow = self.drag_x * dt;
            self.vel.x = if self.vel.x.abs() <= slow {
                0.0
            } else {
                self.vel.x - slow * sign(self.vel.x)
            };
        }
        self.pos += self.vel * dt;
    }
}

/// Notable things that happened during [`Player::update`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerStep {
    pub jumped: bool,
    pub double_jumped: bool,
    /// Push direction of a wall jump
    pub wall_jump: Option<f32>,
    pub attack: Option<&'static str>,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub body: Body,
    facing_right: bool,
    class: ClassType,
    stats: ClassStats,
    health: i32,
    max_health: i32,
    inventory: Vec<ItemId>,
    abilities: Vec<Ability>,
    modifiers: StatModifiers,

    /// Host reported ground contact this frame
    grounded: bool,
    /// Platform type under the player (Standard in the air)
    platform: PlatformKind,
    wall_sliding: bool,

    coyote_timer: f32,
    jump_buffer_timer: f32,
    jump_timer: f32,
    is_jumping: bool,
    can_double_jump: bool,
    has_double_jumped: bool,

    invincibility_timer: f32,
    flash_timer: f32,
    flash_visible: bool,

    on_slope: bool,
    slope_speed_mod: f32,
    pending_launch: Option<Vec2>,

    attack: AttackMachine,
}

impl Player {
    pub fn new(spawn: Vec2, class: ClassType) -> Self {
        let stats = class.stats();
        Self {
            body: Body::new(spawn),
            facing_right: true,
            class,
            stats,
            health: stats.health,
            max_health: stats.health,
            inventory: Vec::new(),
            abilities: Vec::new(),
            modifiers: StatModifiers::default(),
            grounded: false,
            platform: PlatformKind::Standard,
            wall_sliding: false,
            coyote_timer: 0.0,
            jump_buffer_timer: 0.0,
            jump_timer: 0.0,
            is_jumping: false,
            can_double_jump: false,
            has_double_jumped: false,
            invincibility_timer: 0.0,
            flash_timer: 0.0,
            flash_visible: true,
            on_slope: false,
            slope_speed_mod: 1.0,
            pending_launch: None,
            attack: AttackMachine::default(),
        }
    }

    pub fn class(&self) -> ClassType {
        self.class
    }

    pub fn class_stats(&self) -> ClassStats {
        self.stats
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    pub fn inventory(&self) -> &[ItemId] {
        &self.inventory
    }

    pub fn has_ability(&self, ability: Ability) -> bool {
        self.abilities.contains(&ability)
    }

    pub fn modifiers(&self) -> &StatModifiers {
        &self.modifiers
    }

    pub fn attack(&self) -> &AttackMachine {
        &self.attack
    }

    pub fn facing_right(&self) -> bool {
        self.facing_right
    }

    /// On a platform or riding a slope
    pub fn on_ground(&self) -> bool {
        self.grounded || self.on_slope
    }

    pub fn on_slope(&self) -> bool {
        self.on_slope
    }

    pub fn is_wall_sliding(&self) -> bool {
        self.wall_sliding
    }

    pub fn current_platform(&self) -> PlatformKind {
        self.platform
    }

    pub fn pending_launch(&self) -> Option<Vec2> {
        self.pending_launch
    }

    pub fn is_invincible(&self) -> bool {
        self.invincibility_timer > 0.0
    }

    /// Alpha toggle while invincible
    pub fn is_visible(&self) -> bool {
        self.flash_visible
    }

    pub fn speed(&self) -> f32 {
        self.body.vel.length()
    }

    /// Collision query shape for the terrain registry
    pub fn probe(&self) -> SlopeProbe {
        SlopeProbe {
            center: self.body.pos,
            half_size: self.body.size / 2.0,
            velocity: self.body.vel,
        }
    }

    fn stat(&self, stat: StatType, base: f32, class_mult: f32) -> f32 {
        self.modifiers.apply(stat, base, class_mult)
    }

    /// Snap onto the surface, stop falling, modulate speed and hold on to
    /// any launch until the player leaves
    pub fn handle_slope_physics(&mut self, result: &SlopeCollisionResult) {
        self.body.pos.y = result.surface_y - self.body.size.y / 2.0;
        if self.body.vel.y > 0.0 {
            self.body.vel.y = 0.0;
        }
        // Rescale relative to the previous frame so the modifier never compounds
        if self.slope_speed_mod > 0.0 {
            self.body.vel.x *= result.speed_mod / self.slope_speed_mod;
        }
        self.slope_speed_mod = result.speed_mod;
        self.body.allow_gravity = false;
        self.on_slope = true;
        self.pending_launch = result.launch_vector;
    }

    /// Called once per frame before the slope query. After a frame without
    /// slope contact, applies the stored launch exactly once and returns its
    /// speed; otherwise returns 0.
    pub fn clear_slope_state(&mut self) -> f32 {
        let was_on = self.on_slope;
        self.on_slope = false;
        self.body.allow_gravity = true;

        if was_on {
            return 0.0;
        }
        match self.pending_launch.take() {
            Some(launch) => {
                self.body.vel += launch;
                launch.length()
            }
            None => 0.0,
        }
    }

    /// Per-frame movement, jump, wall and attack logic
    pub fn update(
        &mut self,
        controls: &Controls,
        contacts: &Contacts,
        platform: PlatformKind,
        dt: f32,
        tuning: &Tuning,
        events: &mut dyn EventSink,
    ) -> PlayerStep {
        let mut step = PlayerStep::default();
        self.grounded = contacts.down;
        self.platform = if self.grounded { platform } else { PlatformKind::Standard };
        if !self.on_slope {
            self.slope_speed_mod = 1.0;
        }

        self.update_timers(controls, dt, tuning);
        self.handle_movement(controls, tuning);
        self.handle_jumping(controls, dt, tuning, &mut step);
        self.handle_wall(controls, contacts, tuning, events, &mut step);
        self.handle_combat(controls, dt, &tuning.combat, &mut step);
        self.update_invincibility(dt, &tuning.combat);
        step
    }

    fn update_timers(&mut self, controls: &Controls, dt: f32, tuning: &Tuning) {
        if self.on_ground() {
            self.coyote_timer = tuning.physics.coyote_time;
        } else {
            self.coyote_timer -= dt;
        }

        if controls.jump_pressed {
            self.jump_buffer_timer = tuning.physics.jump_buffer;
        } else {
            self.jump_buffer_timer -= dt;
        }
    }

    fn handle_movement(&mut self, controls: &Controls, tuning: &Tuning) {
        let physics = &tuning.physics;
        let on_ground = self.on_ground();

        // Grounded attacks root the player until recovery
        if self.attack.is_attacking() && on_ground && !self.attack.can_attack() {
            self.body.accel_x = 0.0;
            self.body.vel.x = 0.0;
            return;
        }

        let def = self.platform.def();
        let on_ice = self.grounded && def.friction.is_some();

        self.body.drag_x = if on_ground {
            physics.ground_drag * def.friction.unwrap_or(1.0)
        } else {
            physics.air_drag
        };

        let mut accel = physics.acceleration;
        if on_ice {
            accel *= physics.ice_acceleration_mult;
        }

        let move_speed = self.stat(StatType::MoveSpeed, physics.move_speed, self.stats.move_speed)
            * def.speed_mult.unwrap_or(1.0)
            * self.slope_speed_mod;

        if controls.left {
            self.body.accel_x = -accel;
            self.facing_right = false;
        } else if controls.right {
            self.body.accel_x = accel;
            self.facing_right = true;
        } else {
            self.body.accel_x = 0.0;
        }

        // Ice keeps whatever speed the player builds up
        if !on_ice {
            self.body.vel.x = self.body.vel.x.clamp(-move_speed, move_speed);
        }
    }

    fn handle_jumping(&mut self, controls: &Controls, dt: f32, tuning: &Tuning, step: &mut PlayerStep) {
        let physics = &tuning.physics;
        let can_jump = self.coyote_timer > 0.0 || self.on_slope;
        let wants_to_jump = self.jump_buffer_timer > 0.0;
        let jump_force = self.stat(StatType::JumpHeight, physics.jump_force, self.stats.jump_height)
            * self.platform.def().jump_mult.unwrap_or(1.0);

        if self.on_ground() {
            self.can_double_jump = true;
            self.has_double_jumped = false;
        }

        if wants_to_jump && can_jump {
            self.body.vel.y = jump_force;
            self.body.allow_gravity = true;
            self.is_jumping = true;
            self.jump_timer = 0.0;
            self.coyote_timer = 0.0;
            self.jump_buffer_timer = 0.0;
            step.jumped = true;
        } else if controls.jump_pressed
            && !can_jump
            && self.can_double_jump
            && !self.has_double_jumped
            && self.has_ability(Ability::DoubleJump)
        {
            self.body.vel.y = jump_force * physics.double_jump_multiplier;
            self.has_double_jumped = true;
            self.is_jumping = true;
            self.jump_timer = 0.0;
            step.double_jumped = true;
        }

        // Holding jump stretches the arc
        if self.is_jumping && controls.jump_held {
            self.jump_timer += dt;
            if self.jump_timer < physics.jump_hold_duration {
                self.body.vel.y += physics.jump_hold_force;
            }
        }
        if !controls.jump_held || self.jump_timer >= physics.jump_hold_duration {
            self.is_jumping = false;
        }
    }

    fn handle_wall(
        &mut self,
        controls: &Controls,
        contacts: &Contacts,
        tuning: &Tuning,
        events: &mut dyn EventSink,
        step: &mut PlayerStep,
    ) {
        let physics = &tuning.physics;
        let on_wall = contacts.left || contacts.right;

        if !on_wall || self.on_ground() {
            self.wall_sliding = false;
            return;
        }

        self.wall_sliding = true;
        if self.body.vel.y > 0.0 {
            self.body.vel.y = physics.wall_slide_speed;
        }

        if controls.jump_pressed {
            let direction = if contacts.left { 1.0 } else { -1.0 };
            let jump_y = self.stat(StatType::JumpHeight, physics.wall_jump.y, self.stats.jump_height);
            self.body.vel = Vec2::new(physics.wall_jump.x * direction, jump_y);

            self.wall_sliding = false;
            self.is_jumping = true;
            self.jump_timer = 0.0;
            self.has_double_jumped = false;
            self.can_double_jump = true;

            events.emit(GameEvent::WallJump { direction });
            step.wall_jump = Some(direction);
        }
    }

    fn handle_combat(&mut self, controls: &Controls, dt: f32, tuning: &CombatTuning, step: &mut PlayerStep) {
        let moves = MoveSet::for_class(self.class);
        // Attack speed stat stretches every phase (lower is faster)
        let time_scale = self.stat(StatType::AttackSpeed, 1.0, self.stats.attack_speed);
        self.attack.tick(dt, moves, tuning, time_scale);

        let Some(ty) = controls.attack else {
            return;
        };
        if self.wall_sliding {
            return;
        }

        let direction = if controls.up {
            AttackDirection::Up
        } else if controls.down {
            AttackDirection::Down
        } else {
            AttackDirection::Neutral
        };

        let on_ground = self.on_ground();
        if let Some(id) = self.attack.try_attack(moves, ty, direction, on_ground) {
            if on_ground {
                self.body.vel.x = 0.0;
            }
            log::debug!("Attack {} ({:?} {:?})", id, ty, direction);
            step.attack = Some(id);
        }
    }

    fn update_invincibility(&mut self, dt: f32, tuning: &CombatTuning) {
        if self.invincibility_timer <= 0.0 {
            return;
        }

        self.invincibility_timer -= dt;
        self.flash_timer += dt;
        if self.flash_timer >= tuning.invincibility_flash_rate {
            self.flash_timer = 0.0;
            self.flash_visible = !self.flash_visible;
        }

        if self.invincibility_timer <= 0.0 {
            self.invincibility_timer = 0.0;
            self.flash_visible = true;
        }
    }

    /// World-space hitbox of the current attack while ACTIVE
    pub fn attack_hitbox(&self) -> Option<Aabb> {
        self.attack
            .hitbox(MoveSet::for_class(self.class), self.body.pos, self.facing_right)
    }

    pub fn register_hit(&mut self, enemy: EnemyId) -> bool {
        self.attack.register_hit(enemy)
    }

    /// Lose health unless invincible; starts the invincibility window.
    /// Returns whether damage was taken.
    pub fn take_damage(&mut self, amount: i32, tuning: &CombatTuning, events: &mut dyn EventSink) -> bool {
        if self.is_invincible() {
            return false;
        }

        self.health -= amount;
        self.invincibility_timer = tuning.invincibility_duration;
        self.flash_timer = 0.0;

        events.emit(GameEvent::HealthChange {
            health: self.health,
            max_health: self.max_health,
        });
        true
    }

    /// Add to the inventory and apply the item's effects and ability
    pub fn collect_item(&mut self, item: ItemId, events: &mut dyn EventSink) {
        let data = item.data();
        self.inventory.push(item);

        for effect in data.effects {
            if effect.stat == StatType::Health {
                let amount = effect.value.round() as i32;
                self.max_health += amount;
                self.health += amount;
                events.emit(GameEvent::HealthChange {
                    health: self.health,
                    max_health: self.max_health,
                });
            } else {
                self.modifiers.add(effect.stat, effect.value);
            }
        }

        if let Some(ability) = data.ability
            && !self.abilities.contains(&ability)
        {
            self.abilities.push(ability);
        }

        log::info!("Collected {}", data.name);
        events.emit(GameEvent::InventoryChange {
            items: self.inventory.clone(),
        });
    }

    /// Back to full health at `pos` with a clean movement state
    pub fn respawn(&mut self, pos: Vec2) {
        self.body = Body::new(pos);
        self.on_slope = false;
        self.slope_speed_mod = 1.0;
        self.pending_launch = None;
        self.is_jumping = false;
        self.wall_sliding = false;
        self.attack.reset();
    }
}
