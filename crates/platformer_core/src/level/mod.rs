//! Level: tile map, broad phase and actors tied together
//!
//! The level owns every actor body and its broad phase proxy. Moving an
//! actor only marks it dirty; proxies catch up in
//! [`Level::resolve_collisions`], which also reports overlapping actor pairs
//! to the gameplay layer.

use rand::rngs::StdRng;
use rand::SeedableRng;
use slotmap::SlotMap;

use crate::actors::{ActorBody, ActorState, BlockedAxes, CollisionEnvironment, MoveType};
use crate::config::{ConfigError, SimulationConfig};
use crate::foundation::{Aabb, Vec2};
use crate::physics::BroadPhase;
use crate::tiles::{TileCollisionParams, TileDebrisField, TileEvent, TileMap, TileMapError};

mod environment;

use environment::{visit_actors_in_aabb, LevelEnvironment};

slotmap::new_key_type! {
    /// Handle to an actor of a [`Level`]
    pub struct ActorId;
}

/// Level errors
#[derive(thiserror::Error, Debug)]
pub enum LevelError {
    /// The actor was never spawned or has been removed
    #[error("Unknown actor {0:?}")]
    UnknownActor(ActorId),

    /// Tile map rejected an operation
    #[error("Tile map error: {0}")]
    TileMap(#[from] TileMapError),

    /// Settings failed validation
    #[error("Invalid simulation config: {0}")]
    Config(#[from] ConfigError),
}

/// A running level
pub struct Level {
    tiles: TileMap,
    debris: TileDebrisField,
    broad_phase: BroadPhase<ActorId>,
    actors: SlotMap<ActorId, ActorBody>,
    config: SimulationConfig,
    rng: StdRng,
}

impl Level {
    /// Create a level around a tile map
    pub fn new(mut tiles: TileMap, config: SimulationConfig) -> Result<Self, LevelError> {
        config.validate()?;
        tiles.configure(&config.level);

        let size = tiles.size();
        log::info!("Level created: {}x{} tiles, gravity {}", size.x, size.y, config.level.gravity);

        Ok(Self {
            tiles,
            debris: TileDebrisField::new(),
            broad_phase: BroadPhase::new(),
            actors: SlotMap::with_key(),
            config,
            rng: StdRng::from_entropy(),
        })
    }

    /// Use a fixed seed for debris scatter
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Sprite layer
    pub fn tiles(&self) -> &TileMap {
        &self.tiles
    }

    /// Sprite layer, mutable
    pub fn tiles_mut(&mut self) -> &mut TileMap {
        &mut self.tiles
    }

    /// Debris flying around
    pub fn debris(&self) -> &TileDebrisField {
        &self.debris
    }

    /// Active settings
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Broad phase, for diagnostics
    pub fn broad_phase(&self) -> &BroadPhase<ActorId> {
        &self.broad_phase
    }

    /// Add an actor and register its hitbox with the broad phase
    pub fn spawn_actor(&mut self, body: ActorBody) -> ActorId {
        let aabb = body.aabb;
        let broad_phase = &mut self.broad_phase;
        let id = self.actors.insert_with_key(|id| ActorBody {
            proxy: Some(broad_phase.create_proxy(aabb, id)),
            ..body
        });
        log::trace!("Spawned actor {id:?}");
        id
    }

    /// Mark an actor for removal at the next [`Self::resolve_collisions`]
    pub fn despawn_actor(&mut self, id: ActorId) -> Result<(), LevelError> {
        let body = self.actors.get_mut(id).ok_or(LevelError::UnknownActor(id))?;
        body.state.insert(ActorState::IS_DESTROYED);
        Ok(())
    }

    /// Actor body
    pub fn actor(&self, id: ActorId) -> Option<&ActorBody> {
        self.actors.get(id)
    }

    /// Actor body, mutable
    ///
    /// Moving the body directly skips collision tests; set
    /// [`ActorState::IS_DIRTY`] so its proxy follows.
    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut ActorBody> {
        self.actors.get_mut(id)
    }

    /// Number of actors, including ones awaiting removal
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// All actors
    pub fn actors(&self) -> impl Iterator<Item = (ActorId, &ActorBody)> {
        self.actors.iter()
    }

    fn environment(&mut self, mover: Option<ActorId>) -> LevelEnvironment<'_> {
        LevelEnvironment {
            tiles: &mut self.tiles,
            broad_phase: &self.broad_phase,
            actors: &self.actors,
            config: &self.config,
            mover,
        }
    }

    /// Could actor `id` occupy `aabb`
    pub fn is_position_empty(&mut self, id: ActorId, aabb: &Aabb, params: &mut TileCollisionParams) -> Result<bool, LevelError> {
        let body = self.actors.get(id).cloned().ok_or(LevelError::UnknownActor(id))?;
        Ok(self.environment(Some(id)).is_position_empty(&body, aabb, params))
    }

    /// Run the movement stepper for one actor
    pub fn step_actor(&mut self, id: ActorId, time_mult: f32, params: &mut TileCollisionParams) -> Result<BlockedAxes, LevelError> {
        let mut body = self.actors.get(id).cloned().ok_or(LevelError::UnknownActor(id))?;
        let blocked = body.step(time_mult, params, &mut self.environment(Some(id)));
        self.store(id, body);
        Ok(blocked)
    }

    /// Move one actor instantly, see [`ActorBody::move_instantly`]
    pub fn move_actor(
        &mut self,
        id: ActorId,
        target: Vec2,
        move_type: MoveType,
        params: &mut TileCollisionParams,
    ) -> Result<bool, LevelError> {
        let mut body = self.actors.get(id).cloned().ok_or(LevelError::UnknownActor(id))?;
        let moved = body.move_instantly(target, move_type, params, &mut self.environment(Some(id)));
        self.store(id, body);
        Ok(moved)
    }

    fn store(&mut self, id: ActorId, body: ActorBody) {
        if let Some(slot) = self.actors.get_mut(id) {
            *slot = body;
        }
    }

    /// Remove destroyed actors, sync dirty proxies and report overlapping pairs
    ///
    /// `callback` receives each pair of actors whose hitboxes overlap and
    /// where at least one moved since the last call.
    pub fn resolve_collisions<F>(&mut self, time_mult: f32, mut callback: F)
    where
        F: FnMut(ActorId, ActorId),
    {
        let broad_phase = &mut self.broad_phase;
        self.actors.retain(|id, body| {
            if !body.is_destroyed() {
                return true;
            }
            if let Some(proxy) = body.proxy.take() {
                broad_phase.destroy_proxy(proxy);
            }
            log::trace!("Removed actor {id:?}");
            false
        });

        for body in self.actors.values_mut().filter(|body| body.is(ActorState::IS_DIRTY)) {
            if let Some(proxy) = body.proxy {
                broad_phase.move_proxy(proxy, body.aabb, body.speed * time_mult);
            }
            body.state.remove(ActorState::IS_DIRTY);
        }

        let actors = &self.actors;
        broad_phase.update_pairs(|&a, &b| {
            let (Some(body_a), Some(body_b)) = (actors.get(a), actors.get(b)) else {
                return;
            };
            if (body_a.state | body_b.state) & (ActorState::COLLIDE_WITH_OTHER_ACTORS | ActorState::IS_DESTROYED)
                != ActorState::COLLIDE_WITH_OTHER_ACTORS
            {
                return;
            }
            if body_a.aabb.overlaps(&body_b.aabb) {
                callback(a, b);
            }
        });
    }

    /// Visit actors whose hitbox overlaps `aabb`; return `false` to stop
    pub fn find_actors_in_aabb<F>(&self, exclude: Option<ActorId>, aabb: &Aabb, callback: F)
    where
        F: FnMut(ActorId, &ActorBody) -> bool,
    {
        visit_actors_in_aabb(&self.broad_phase, &self.actors, exclude, aabb, callback);
    }

    /// Visit actors whose hitbox comes closer than `radius` to `(x, y)`
    pub fn find_actors_in_radius<F>(&self, x: f32, y: f32, radius: f32, mut callback: F)
    where
        F: FnMut(ActorId, &ActorBody) -> bool,
    {
        let query = Aabb::new(x - radius, y - radius, x + radius, y + radius);
        let radius_squared = radius * radius;
        let actors = &self.actors;

        self.broad_phase.query(&query, |proxy| {
            let id = *self.broad_phase.user_data(proxy);
            let Some(actor) = actors.get(id) else {
                return true;
            };
            if actor.state & (ActorState::COLLIDE_WITH_OTHER_ACTORS | ActorState::IS_DESTROYED)
                != ActorState::COLLIDE_WITH_OTHER_ACTORS
            {
                return true;
            }

            // Closest point of the hitbox to the center
            let closest_x = x.clamp(actor.aabb.left, actor.aabb.right);
            let closest_y = y.clamp(actor.aabb.top, actor.aabb.bottom);
            let (dx, dy) = (x - closest_x, y - closest_y);
            if dx * dx + dy * dy < radius_squared {
                return callback(id, actor);
            }
            true
        });
    }

    /// Switch a trigger of the tile map
    pub fn set_trigger(&mut self, trigger_id: u8, state: bool) {
        self.tiles.set_trigger(trigger_id, state);
    }

    /// Advance tiles and debris by one tick
    ///
    /// Returns the tile events raised since the last update, including those
    /// caused by actor movement. Destroyed tiles have already spawned their
    /// debris.
    pub fn update(&mut self, time_mult: f32) -> Vec<TileEvent> {
        self.tiles.update(time_mult);

        let events = self.tiles.drain_events();
        self.debris.spawn_from_events(&self.tiles, &events, &mut self.rng);
        self.debris.update(&mut self.tiles, time_mult);
        events
    }
}
