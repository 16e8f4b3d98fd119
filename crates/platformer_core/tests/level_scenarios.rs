//! Whole-level scenarios driven through the public API
//!
//! Each test builds a small level, runs a few seconds of ticks and checks
//! where actors and tiles end up.

use std::sync::Arc;

use platformer_core::prelude::*;
use platformer_core::tiles::{DestructSound, EMPTY_MASK, FILLED_MASK};

const EMPTY: u32 = 0;
const FILLED: u32 = 1;

fn level(width: i32, height: i32) -> Level {
    let mut tiles = TileMap::empty(width, height, PitType::StandOnPlatform).unwrap();
    tiles
        .add_tile_set(Arc::new(TileSet::new(vec![EMPTY_MASK, FILLED_MASK])), 0, 2)
        .unwrap();
    for x in 0..width {
        tiles.set_tile(x, height - 2, LayerTile::new(FILLED)).unwrap();
    }
    Level::new(tiles, SimulationConfig::default()).unwrap().with_rng_seed(5)
}

fn run(level: &mut Level, player: ActorId, ticks: usize) -> Vec<TileEvent> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        let mut params = level.actor(player).unwrap().player_collision_params(false);
        level.step_actor(player, 1.0, &mut params).unwrap();
        level.resolve_collisions(1.0, |_, _| {});
        events.extend(level.update(1.0));
    }
    events
}

#[test]
fn test_collapsing_platform_drops_player() {
    let mut level = level(8, 10);
    let tiles = level.tiles_mut();
    let crumbling = tiles
        .add_animated_tile(AnimatedTile::still(&[FILLED, FILLED, EMPTY, FILLED]))
        .unwrap();
    tiles.set_tile(3, 4, LayerTile::animated(crumbling)).unwrap();
    tiles.set_tile_event_flags(3, 4, TileModifier::Collapse, [0, 0]).unwrap();

    let player = level.spawn_actor(
        ActorBody::new(Vec2::new(112.0, 127.0), ActorState::standard()).with_hitbox(20, 20),
    );

    // Landing on the platform starts the collapse and advances it one stage
    let mut ticks = 0;
    let events = loop {
        let events = run(&mut level, player, 1);
        if !events.is_empty() || ticks == 30 {
            break events;
        }
        ticks += 1;
    };
    assert_eq!(events, vec![TileEvent::Advanced { x: 3, y: 4, frame: 1, amount: 1 }]);
    assert_eq!(level.tiles().active_collapsing_tiles(), &[Vec2i::new(3, 4)]);
    assert!(level.actor(player).unwrap().aabb.bottom < 128.0);

    let events = run(&mut level, player, 120);
    assert!(events.iter().any(|event| matches!(
        event,
        TileEvent::Destroyed { x: 3, y: 4, sound: DestructSound::SceneryCollapse, .. }
    )));
    assert!(level.tiles().active_collapsing_tiles().is_empty());

    // Landed on the floor row
    let body = level.actor(player).unwrap();
    assert!(body.aabb.bottom > 250.0 && body.aabb.bottom <= 256.0);
    assert!(body.is(ActorState::CAN_JUMP));
}

#[test]
fn test_trigger_opens_door() {
    let mut level = level(8, 10);
    let tiles = level.tiles_mut();
    let door = tiles.add_animated_tile(AnimatedTile::still(&[FILLED, EMPTY])).unwrap();
    for y in 5..8 {
        tiles.set_tile(4, y, LayerTile::animated(door)).unwrap();
        tiles.set_tile_event_flags(4, y, TileModifier::Trigger, [7, 0]).unwrap();
    }

    let player = level.spawn_actor(
        ActorBody::new(Vec2::new(100.0, 250.0), ActorState::standard()).with_hitbox(20, 30),
    );
    let doorway = Aabb::new(130.0, 220.0, 150.0, 250.0);

    let mut params = TileCollisionParams::new(TileDestructType::empty(), false);
    assert!(!level.is_position_empty(player, &doorway, &mut params).unwrap());

    level.set_trigger(7, true);
    assert!(level.is_position_empty(player, &doorway, &mut params).unwrap());
    assert_eq!(level.update(1.0), vec![TileEvent::TriggerChanged { trigger_id: 7, state: true }]);

    level.set_trigger(7, false);
    assert!(!level.is_position_empty(player, &doorway, &mut params).unwrap());
}

#[test]
fn test_actors_meet_in_the_middle() {
    let mut level = level(16, 10);
    let left = level.spawn_actor(
        ActorBody::new(Vec2::new(100.0, 250.0), ActorState::standard())
            .with_hitbox(20, 20)
            .with_speed(Vec2::new(2.0, 0.0)),
    );
    let right = level.spawn_actor(
        ActorBody::new(Vec2::new(300.0, 250.0), ActorState::standard())
            .with_hitbox(20, 20)
            .with_speed(Vec2::new(-2.0, 0.0)),
    );

    let mut met_at = None;
    for tick in 0..120 {
        for id in [left, right] {
            let mut params = level.actor(id).unwrap().default_collision_params();
            level.step_actor(id, 1.0, &mut params).unwrap();
        }
        let mut pairs = Vec::new();
        level.resolve_collisions(1.0, |a, b| pairs.push((a, b)));
        if !pairs.is_empty() {
            assert_eq!(pairs.len(), 1);
            met_at = Some(tick);
            break;
        }
    }

    let tick = met_at.expect("actors never met");
    assert!(tick > 40 && tick < 55, "met at tick {tick}");
    let distance = level.actor(right).unwrap().pos.x - level.actor(left).unwrap().pos.x;
    assert!(distance <= 20.0);
}

#[test]
fn test_despawned_actor_leaves_queries() {
    let mut level = level(8, 10);
    let crate_body = ActorBody::new(Vec2::new(100.0, 250.0), ActorState::COLLIDE_WITH_OTHER_ACTORS | ActorState::IS_SOLID_OBJECT)
        .with_hitbox(20, 20);
    let solid = level.spawn_actor(crate_body);
    let walker = level.spawn_actor(
        ActorBody::new(Vec2::new(60.0, 250.0), ActorState::standard() | ActorState::COLLIDE_WITH_SOLID_OBJECTS)
            .with_hitbox(20, 20),
    );

    let target = Aabb::new(85.0, 230.0, 105.0, 250.0);
    let mut params = TileCollisionParams::new(TileDestructType::empty(), true);
    assert!(!level.is_position_empty(walker, &target, &mut params).unwrap());

    level.despawn_actor(solid).unwrap();
    level.resolve_collisions(1.0, |_, _| {});
    assert!(level.actor(solid).is_none());
    assert!(level.is_position_empty(walker, &target, &mut params).unwrap());

    let mut found = 0;
    level.find_actors_in_radius(100.0, 240.0, 50.0, |_, _| {
        found += 1;
        true
    });
    assert_eq!(found, 1);
}
