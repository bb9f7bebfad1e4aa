//! Fixed timestep simulation tick
//!
//! Frame order matters. The slope state is cleared before the new slope query,
//! the query result is applied before the player moves, and generation and
//! cleanup read the player's updated position. Changing the order gives a
//! one-frame-stale snap or a missed launch.

use super::combat::{Aabb, contact_damage, resolve_hits};
use super::events::{EventSink, GameEvent};
use super::player::{Contacts, Controls};
use super::state::World;

/// Input for a single tick: buttons plus the host's contacts from its last
/// physics step
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub controls: Controls,
    pub contacts: Contacts,
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, input: &TickInput, dt: f32) {
    if world.game_over {
        return;
    }
    world.time_ticks += 1;

    // Leaving a slope last frame launches now
    let launch = world.player.clear_slope_state();
    if launch > 0.0 {
        let vel = world.player.body.vel;
        let angle = vel.y.atan2(vel.x);
        log::debug!("Slope launch: speed={:.0} angle={:.2}", launch, angle);
        world.events.emit(GameEvent::SlopeLaunch { speed: launch, angle });
        world.style.on_slope_launch(launch, &mut world.events);
    }

    if let Some(result) = world.terrain.update(&world.player.probe()) {
        world.player.handle_slope_physics(&result);
    }

    let contacts = input.contacts;
    if contacts.down
        && let Some(id) = contacts.platform
        && world.platforms.on_landed(id)
    {
        log::debug!("Platform {:?} breaking", id);
    }
    let surface = world.platforms.kind_of(contacts.platform);
    let step = world.player.update(
        &input.controls,
        &contacts,
        surface,
        dt,
        &world.tuning,
        &mut world.events,
    );
    if step.wall_jump.is_some() {
        world.style.on_wall_jump(&mut world.events);
    }

    world.platforms.tick(dt, &mut world.events);
    world.style.update(dt, world.player.speed(), &mut world.events);

    update_enemies(world, dt);

    let player_y = world.player.body.pos.y;
    world
        .generator
        .update(player_y, &mut world.terrain, &mut world.platforms);
    world
        .spawner
        .cleanup(player_y, &mut world.enemies, &mut world.items);

    world.update_altitude();
    check_death_plane(world);
}

/// Spawning, hit resolution, contact damage and item pickups
fn update_enemies(world: &mut World, dt: f32) {
    let altitude = world.altitude();
    let view = world.view();
    world.spawner.update(
        dt,
        altitude,
        world.player.body.pos,
        view,
        &world.platforms,
        &mut world.enemies,
        &mut world.rng,
    );

    let airborne = !world.player.on_ground();
    let kills = resolve_hits(
        &mut world.player,
        &mut world.enemies,
        &world.tuning.combat,
        &mut world.events,
    );
    if kills > 0 {
        world.kills += kills;
        if airborne {
            for _ in 0..kills {
                world.style.on_airborne_kill(&mut world.events);
            }
        }
        if kills >= 2 {
            world.style.on_multi_kill(kills, &mut world.events);
        }
        // Dead enemies from earlier frames are already cleaned up
        for enemy in world.enemies.iter().filter(|e| !e.alive) {
            if let Some(drop) = world.spawner.roll_drop(enemy.pos, &mut world.rng) {
                world.items.push(drop);
            }
        }
    }

    let bounds = Aabb::new(world.player.body.pos, world.player.body.size);
    for enemy in world.enemies.iter().filter(|e| e.alive) {
        if bounds.overlaps(&enemy.bounds())
            && contact_damage(&mut world.player, enemy, &world.tuning.combat, &mut world.events)
        {
            break;
        }
    }

    let (picked, kept): (Vec<_>, Vec<_>) = world
        .items
        .drain(..)
        .partition(|item| bounds.overlaps(&World::item_bounds(item)));
    world.items = kept;
    for item in picked {
        world.player.collect_item(item.item, &mut world.events);
    }
}

/// Falling too far below the best height costs health and returns the player
/// to the highest point; running out of health ends the run
fn check_death_plane(world: &mut World) {
    let limit = world.highest_y + world.tuning.world.death_plane_offset;
    if world.player.body.pos.y > limit {
        log::info!("Fell below the death plane at y={:.0}", world.player.body.pos.y);
        world
            .player
            .take_damage(1, &world.tuning.combat, &mut world.events);
        world.player.respawn(world.highest_pos);
    }

    if world.player.is_dead() {
        world.game_over = true;
        let altitude = world.max_altitude();
        log::info!("Run over: altitude {:.0}, {} kills", altitude, world.kills);
        world.events.emit(GameEvent::PlayerDied {
            altitude,
            kills: world.kills,
        });
    }
}
