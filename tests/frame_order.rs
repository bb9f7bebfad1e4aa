//! Multi-frame runs through the public API: tick followed by the host step.

use std::cell::RefCell;
use std::rc::Rc;

use ascent::Tuning;
use ascent::consts::SIM_DT;
use ascent::renderer::MeshCanvas;
use ascent::sim::combat::ClassType;
use ascent::sim::player::{Contacts, Controls};
use ascent::sim::{GameEvent, SlopeDirection, TickInput, World, tick};
use glam::Vec2;

fn frame(world: &mut World, controls: Controls, contacts: &mut Contacts) {
    let input = TickInput {
        controls,
        contacts: *contacts,
    };
    tick(world, &input, SIM_DT);
    *contacts = world.integrate_body(SIM_DT);
}

#[test]
fn test_climb_keeps_level_reachable_and_releases_meshes() {
    let canvas = Rc::new(RefCell::new(MeshCanvas::new()));
    let mut world = World::new(2024, Tuning::default(), ClassType::Paladin, Box::new(canvas.clone()));
    let reach = world.tuning.reach;
    let lookahead = world.tuning.world.generation_lookahead;
    let buffer = world.tuning.world.platform_cleanup_buffer;

    let mut y = world.player.body.pos.y;
    for _ in 0..300 {
        y -= 40.0;
        world.player.body.pos = Vec2::new(world.tuning.world.center_x(), y);
        world.player.body.vel = Vec2::ZERO;
        tick(&mut world, &TickInput::default(), SIM_DT);

        assert!(world.generator.frontier().y <= world.player.body.pos.y - lookahead);
        assert_eq!(canvas.borrow().meshes().len(), world.terrain.len());
    }

    let stats = world.generator.stats();
    assert!(stats.total_chunks() > 0);
    assert!(stats.max_step_x <= reach.max_step_x + 1e-3);
    assert!(stats.max_step_y <= reach.max_step_y + 1e-3);

    let player_y = world.player.body.pos.y;
    assert!(world.platforms.iter().all(|p| p.pos.y <= player_y + buffer));
    assert!(world.max_altitude() > 1000.0);
}

#[test]
fn test_slope_launch_fires_once_with_host_step() {
    let mut world = World::headless(99, Tuning::default());
    world
        .terrain
        .create_slope(300.0, 900.0, 200.0, 100.0, SlopeDirection::Left, 0xffffff);
    world.player.body.pos = Vec2::new(400.0, 850.0 - 24.0);
    world.player.body.vel = Vec2::new(400.0, 0.0);

    tick(&mut world, &TickInput::default(), SIM_DT);
    assert!(world.player.on_slope());
    assert!(world.player.pending_launch().is_some());
    world.events.drain();

    world.player.body.pos = Vec2::new(700.0, 600.0);
    let mut contacts = Contacts::default();
    let mut launches = Vec::new();
    for _ in 0..30 {
        frame(&mut world, Controls::default(), &mut contacts);
        launches.extend(
            world
                .events
                .drain()
                .into_iter()
                .filter(|e| matches!(e, GameEvent::SlopeLaunch { .. })),
        );
    }

    assert_eq!(launches.len(), 1);
    assert!(matches!(launches[0], GameEvent::SlopeLaunch { speed, .. } if speed > 0.0));
    assert!(world.player.pending_launch().is_none());
}

#[test]
fn test_same_seed_same_run() {
    let run = |seed: u64| {
        let mut world = World::headless(seed, Tuning::default());
        let mut contacts = Contacts::default();
        let mut events = Vec::new();
        for i in 0..900 {
            let controls = Controls {
                right: (i / 90) % 2 == 0,
                left: (i / 90) % 2 == 1,
                jump_pressed: i % 30 == 0,
                jump_held: i % 30 < 12,
                ..Default::default()
            };
            frame(&mut world, controls, &mut contacts);
            events.extend(world.events.drain());
        }
        (world.player.body.pos, world.generator.stats().clone(), events)
    };

    let (pos_a, stats_a, events_a) = run(31337);
    let (pos_b, stats_b, events_b) = run(31337);
    assert_eq!(pos_a, pos_b);
    assert_eq!(stats_a.chunks, stats_b.chunks);
    assert_eq!(events_a, events_b);
}
