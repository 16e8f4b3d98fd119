//! Level-wide collision environment: tiles plus solid actors

use slotmap::SlotMap;

use crate::actors::{is_tile_area_empty, ActorBody, ActorState, CollisionEnvironment};
use crate::config::{MovementConfig, SimulationConfig};
use crate::foundation::Aabb;
use crate::physics::BroadPhase;
use crate::tiles::{TileCollisionParams, TileMap};

use super::ActorId;

/// Visit live actors that collide with other actors and overlap `aabb`
///
/// `exclude` skips the querying actor. The callback returns `false` to stop.
pub(super) fn visit_actors_in_aabb<F>(
    broad_phase: &BroadPhase<ActorId>,
    actors: &SlotMap<ActorId, ActorBody>,
    exclude: Option<ActorId>,
    aabb: &Aabb,
    mut callback: F,
) where
    F: FnMut(ActorId, &ActorBody) -> bool,
{
    broad_phase.query(aabb, |proxy| {
        let id = *broad_phase.user_data(proxy);
        if exclude == Some(id) {
            return true;
        }
        let Some(actor) = actors.get(id) else {
            return true;
        };
        if actor.state & (ActorState::COLLIDE_WITH_OTHER_ACTORS | ActorState::IS_DESTROYED)
            != ActorState::COLLIDE_WITH_OTHER_ACTORS
        {
            return true;
        }
        if actor.aabb.overlaps(aabb) {
            return callback(id, actor);
        }
        true
    });
}

/// Borrowed view of a level used while one actor moves
///
/// The moving actor's body is taken out of the actor storage for the
/// duration of the step; `mover` keeps it from colliding with its own stale
/// copy.
pub(super) struct LevelEnvironment<'a> {
    pub tiles: &'a mut TileMap,
    pub broad_phase: &'a BroadPhase<ActorId>,
    pub actors: &'a SlotMap<ActorId, ActorBody>,
    pub config: &'a SimulationConfig,
    pub mover: Option<ActorId>,
}

impl LevelEnvironment<'_> {
    fn is_blocked_by_solid(&self, body: &ActorBody, aabb: &Aabb, params: &TileCollisionParams) -> bool {
        let mut blocked = false;
        visit_actors_in_aabb(self.broad_phase, self.actors, self.mover, aabb, |_, other| {
            if other.state & (ActorState::IS_SOLID_OBJECT | ActorState::IS_DESTROYED) != ActorState::IS_SOLID_OBJECT {
                return true;
            }
            if body.is(ActorState::EXCLUDE_SIMILAR) && other.is(ActorState::EXCLUDE_SIMILAR) {
                return true;
            }
            // Only solids whose center is below the mover's feet count
            if body.is(ActorState::COLLIDE_WITH_SOLID_OBJECTS_BELOW)
                && body.aabb.bottom > (other.aabb.top + other.aabb.bottom) * 0.5
            {
                return true;
            }
            if !other.is(ActorState::IS_ONE_WAY_SOLID) || params.downwards {
                blocked = true;
                return false;
            }
            true
        });
        blocked
    }
}

impl CollisionEnvironment for LevelEnvironment<'_> {
    fn gravity(&self) -> f32 {
        self.config.level.gravity
    }

    fn water_level(&self) -> f32 {
        self.config.level.water_level
    }

    fn movement_config(&self) -> &MovementConfig {
        &self.config.movement
    }

    fn is_position_empty(&mut self, body: &ActorBody, aabb: &Aabb, params: &mut TileCollisionParams) -> bool {
        if !is_tile_area_empty(self.tiles, body, aabb, params) {
            return false;
        }

        !(body.is(ActorState::COLLIDE_WITH_SOLID_OBJECTS) && self.is_blocked_by_solid(body, aabb, params))
    }
}
