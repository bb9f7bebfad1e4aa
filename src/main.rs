//! Ascent headless driver
//!
//! Builds a world from a seed and optional tuning file, lets a simple bot climb
//! on a fixed-timestep loop and prints a JSON summary of the run.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::rc::Rc;

use clap::{Parser, ValueEnum};
use serde::Serialize;

use ascent::Tuning;
use ascent::consts::{MAX_SUBSTEPS, SIM_DT};
use ascent::renderer::{MeshCanvas, vertex};
use ascent::sim::combat::{AttackType, ClassType};
use ascent::sim::player::{Contacts, Controls};
use ascent::sim::{GameEvent, Pattern, TickInput, World, tick};

/// Render frame lengths the loop cycles through, to exercise the accumulator
const FRAME_TIMES: [f32; 3] = [1.0 / 60.0, 1.0 / 45.0, 1.0 / 90.0];
/// Highest platform top (above the feet) the bot will try to jump to
const BOT_JUMP_REACH: f32 = 220.0;

#[derive(Clone, Copy, ValueEnum)]
enum ClassArg {
    Paladin,
    Monk,
    Priest,
}

impl From<ClassArg> for ClassType {
    fn from(arg: ClassArg) -> Self {
        match arg {
            ClassArg::Paladin => ClassType::Paladin,
            ClassArg::Monk => ClassType::Monk,
            ClassArg::Priest => ClassType::Priest,
        }
    }
}

#[derive(Parser)]
#[command(name = "ascent")]
#[command(about = "Run a headless climb and print a JSON summary", long_about = None)]
struct Cli {
    /// Run seed
    #[arg(short, long, default_value = "12345")]
    seed: u64,
    /// JSON file with tuning overrides
    #[arg(short, long)]
    tuning: Option<PathBuf>,
    /// Simulation ticks to run
    #[arg(long, default_value = "3600")]
    ticks: u64,
    #[arg(long, value_enum, default_value = "monk")]
    class: ClassArg,
}

#[derive(Serialize)]
struct Summary {
    seed: u64,
    ticks: u64,
    altitude: f32,
    max_altitude: f32,
    biome: String,
    health: i32,
    kills: u32,
    style_tier: String,
    chunks: BTreeMap<Pattern, u32>,
    platforms_generated: u32,
    slopes_generated: u32,
    max_step_x: f32,
    max_step_y: f32,
    live_platforms: usize,
    live_terrain: usize,
    live_meshes: usize,
    mesh_vertices: usize,
    /// Bytes a renderer would upload for this frame's terrain and platforms
    upload_bytes: usize,
    events: BTreeMap<&'static str, u32>,
    game_over: bool,
}

/// Fixed-timestep loop plus the stand-in host physics
struct Driver {
    world: World,
    canvas: Rc<RefCell<MeshCanvas>>,
    accumulator: f32,
    contacts: Contacts,
    events: BTreeMap<&'static str, u32>,
}

impl Driver {
    fn new(seed: u64, tuning: Tuning, class: ClassType) -> Self {
        let canvas = Rc::new(RefCell::new(MeshCanvas::new()));
        let world = World::new(seed, tuning, class, Box::new(canvas.clone()));
        Self {
            world,
            canvas,
            accumulator: 0.0,
            contacts: Contacts::default(),
            events: BTreeMap::new(),
        }
    }

    /// One render frame: as many fixed ticks as the accumulator allows
    fn frame(&mut self, dt: f32) {
        self.accumulator += dt.min(0.1);

        let mut controls = plan(&self.world, &self.contacts);
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = TickInput {
                controls,
                contacts: self.contacts,
            };
            tick(&mut self.world, &input, SIM_DT);
            self.contacts = self.world.integrate_body(SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // One-shot inputs fire once per frame
            controls.jump_pressed = false;
            controls.attack = None;
        }

        for event in self.world.events.drain() {
            *self.events.entry(event_name(&event)).or_default() += 1;
        }
    }

    fn summary(&self) -> Summary {
        let world = &self.world;
        let stats = world.generator.stats();
        let canvas = self.canvas.borrow();
        let terrain_bytes: usize = canvas
            .meshes()
            .iter()
            .map(|(_, mesh)| vertex::as_bytes(mesh).len())
            .sum();
        let platform_bytes: usize = world
            .platforms
            .iter()
            .map(|p| vertex::as_bytes(&p.mesh()).len())
            .sum();
        Summary {
            seed: world.seed,
            ticks: world.time_ticks,
            altitude: world.altitude(),
            max_altitude: world.max_altitude(),
            biome: format!("{:?}", world.biome),
            health: world.player.health(),
            kills: world.kills,
            style_tier: world.style.tier().to_string(),
            chunks: stats.chunks.clone(),
            platforms_generated: stats.platforms,
            slopes_generated: stats.slopes,
            max_step_x: stats.max_step_x,
            max_step_y: stats.max_step_y,
            live_platforms: world.platforms.len(),
            live_terrain: world.terrain.len(),
            live_meshes: canvas.meshes().len(),
            mesh_vertices: canvas.vertex_count(),
            upload_bytes: terrain_bytes + platform_bytes,
            events: self.events.clone(),
            game_over: world.game_over,
        }
    }
}

/// Bot: head for the nearest platform above within a jump, jump when close,
/// swing at anything in reach
fn plan(world: &World, contacts: &Contacts) -> Controls {
    let body = &world.player.body;
    let bottom = body.bottom();
    let grounded = contacts.down || world.player.on_slope();
    let mut controls = Controls::default();

    let target = world
        .platforms
        .iter()
        .filter(|p| p.is_solid() && p.top() < bottom - 10.0 && p.top() > bottom - BOT_JUMP_REACH)
        .min_by(|a, b| {
            (a.pos.x - body.pos.x)
                .abs()
                .total_cmp(&(b.pos.x - body.pos.x).abs())
        });

    let goal_x = target.map_or(world.tuning.world.center_x(), |p| p.pos.x);
    let dx = goal_x - body.pos.x;
    controls.right = dx > 20.0;
    controls.left = dx < -20.0;

    if let Some(platform) = target {
        if grounded && dx.abs() < platform.size.x / 2.0 + 150.0 {
            controls.jump_pressed = true;
            controls.jump_held = true;
        }
    } else if contacts.left || contacts.right {
        // Climb walls when nothing is in reach
        controls.jump_pressed = true;
    }
    if !grounded && body.vel.y < 0.0 {
        controls.jump_held = true;
    }

    if world
        .enemies
        .iter()
        .any(|e| e.alive && e.pos.distance(body.pos) < 70.0)
    {
        controls.attack = Some(AttackType::Light);
    }

    controls
}

fn event_name(event: &GameEvent) -> &'static str {
    match event {
        GameEvent::SlopeLaunch { .. } => "slope_launch",
        GameEvent::AltitudeChange { .. } => "altitude_change",
        GameEvent::BiomeChange { .. } => "biome_change",
        GameEvent::HealthChange { .. } => "health_change",
        GameEvent::StyleChange { .. } => "style_change",
        GameEvent::WallJump { .. } => "wall_jump",
        GameEvent::EnemyKilled { .. } => "enemy_killed",
        GameEvent::PlayerDied { .. } => "player_died",
        GameEvent::InventoryChange { .. } => "inventory_change",
        GameEvent::PlatformBroken { .. } => "platform_broken",
    }
}

fn load_tuning(path: Option<&PathBuf>) -> Tuning {
    let Some(path) = path else {
        return Tuning::load_or_default(None);
    };
    match std::fs::read_to_string(path) {
        Ok(json) => Tuning::load_or_default(Some(&json)),
        Err(err) => {
            log::warn!("Could not read {}: {}", path.display(), err);
            Tuning::default()
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    log::info!("Ascent (headless) starting, seed {}", cli.seed);

    let tuning = load_tuning(cli.tuning.as_ref());
    let mut driver = Driver::new(cli.seed, tuning, cli.class.into());

    let mut frame = 0;
    while driver.world.time_ticks < cli.ticks && !driver.world.game_over {
        driver.frame(FRAME_TIMES[frame % FRAME_TIMES.len()]);
        frame += 1;
    }

    match serde_json::to_string_pretty(&driver.summary()) {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("Failed to serialize summary: {}", err),
    }
}
