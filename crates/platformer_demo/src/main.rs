//! Headless platformer demo
//!
//! Drops a handful of walkers into a text level full of one-way platforms,
//! crumbling floors and a trigger door, runs the simulation for a fixed
//! number of ticks and logs what happened.
//!
//! Usage: `platformer_demo [config.toml|config.ron]`

mod config;
mod layout;
mod walker;

use std::collections::HashSet;

use platformer_core::actors::{ActorBody, ActorState};
use platformer_core::config::Config;
use platformer_core::foundation::{logging, Vec2};
use platformer_core::level::{ActorId, Level};
use platformer_core::tiles::{TileEvent, TILE_SIZE};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use config::DemoConfig;
use layout::{parse_layout, DEFAULT_LAYOUT, DOOR_TRIGGER};
use walker::Walker;

/// Counters collected over a run
#[derive(Debug, Default)]
struct RunStats {
    contacts: usize,
    tiles_advanced: usize,
    tiles_destroyed: usize,
    peak_debris: usize,
    fallen: usize,
}

fn spawn_walkers(level: &mut Level, config: &DemoConfig, rng: &mut StdRng) -> Vec<Walker> {
    let width = level.tiles().level_bounds().x as f32;
    let state = ActorState::standard() | ActorState::COLLIDE_WITH_SOLID_OBJECTS;

    (0..config.scenario.walkers)
        .map(|i| {
            let x = rng.gen_range(TILE_SIZE as f32 * 1.5..width - TILE_SIZE as f32 * 1.5);
            let body = ActorBody::with_config(Vec2::new(x, TILE_SIZE as f32 * 2.0), state, &config.simulation.movement)
                .with_hitbox(16, 24);
            let id = level.spawn_actor(body);
            Walker::new(id, if i % 2 == 0 { 1.0 } else { -1.0 })
        })
        .collect()
}

fn record_events(events: &[TileEvent], stats: &mut RunStats) {
    for event in events {
        match *event {
            TileEvent::Advanced { .. } => stats.tiles_advanced += 1,
            TileEvent::Destroyed { x, y, sound, .. } => {
                stats.tiles_destroyed += 1;
                log::info!("Tile ({x}, {y}) destroyed, play {sound:?}");
            }
            TileEvent::TriggerChanged { trigger_id, state } => {
                log::info!("Trigger {trigger_id} is now {}", if state { "on" } else { "off" });
            }
            TileEvent::FreezeRequested { .. } => {}
        }
    }
}

fn run(config: &DemoConfig) -> Result<RunStats, Box<dyn std::error::Error>> {
    let scenario = &config.scenario;
    let tiles = parse_layout(DEFAULT_LAYOUT, config.simulation.level.pit_type)?;
    let mut level = Level::new(tiles, config.simulation.clone())?.with_rng_seed(scenario.seed);
    let mut rng = StdRng::seed_from_u64(scenario.seed);

    let mut walkers = spawn_walkers(&mut level, config, &mut rng);
    let mut stats = RunStats::default();
    let bottom = level.tiles().level_bounds().y as f32;
    let mut touching: HashSet<(ActorId, ActorId)> = HashSet::new();

    for tick in 0..scenario.ticks {
        if tick == scenario.ticks / 2 {
            level.set_trigger(DOOR_TRIGGER, true);
        }

        for walker in &mut walkers {
            walker.tick(&mut level, scenario, &mut rng)?;
            if level.actor(walker.id).is_some_and(|body| body.pos.y > bottom + TILE_SIZE as f32) {
                log::info!("Walker {:?} fell out of the level", walker.id);
                level.despawn_actor(walker.id)?;
                stats.fallen += 1;
            }
        }

        level.resolve_collisions(scenario.time_mult, |a, b| {
            let key = if a < b { (a, b) } else { (b, a) };
            if touching.insert(key) {
                stats.contacts += 1;
                log::debug!("Contact between {a:?} and {b:?}");
            }
        });
        walkers.retain(|walker| level.actor(walker.id).is_some());

        let events = level.update(scenario.time_mult);
        record_events(&events, &mut stats);
        stats.peak_debris = stats.peak_debris.max(level.debris().len());

        if scenario.report_interval > 0 && tick % scenario.report_interval == 0 {
            log::info!(
                "Tick {tick}: {} walkers, {} debris, tree height {}",
                walkers.len(),
                level.debris().len(),
                level.broad_phase().tree_height()
            );
        }
    }

    for walker in &walkers {
        log::info!("Walker {:?}: {} jumps, {} ticks on spikes", walker.id, walker.jumps, walker.hurt_ticks);
    }
    Ok(stats)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading config from {path}");
            DemoConfig::load_from_file(&path)?
        }
        None => DemoConfig::default(),
    };
    config.validate()?;

    let stats = run(&config)?;
    log::info!(
        "Done: {} contacts, {} tile stages advanced, {} tiles destroyed, peak {} debris, {} fell",
        stats.contacts,
        stats.tiles_advanced,
        stats.tiles_destroyed,
        stats.peak_debris,
        stats.fallen
    );
    Ok(())
}
