//! Walker: a tiny gameplay controller driving one actor

use platformer_core::actors::{ActorState, BlockedAxes};
use platformer_core::level::{ActorId, Level, LevelError};
use rand::Rng;

use crate::config::ScenarioConfig;

/// Upward speed of a jump
const JUMP_SPEED: f32 = -5.0;

/// Walks until it hits a wall, then turns around; jumps now and then
#[derive(Debug, Clone)]
pub struct Walker {
    /// Driven actor
    pub id: ActorId,
    /// +1 walks right, -1 walks left
    pub direction: f32,
    /// Jumps performed
    pub jumps: u32,
    /// Ticks spent touching hurting tiles
    pub hurt_ticks: u32,
}

impl Walker {
    /// Create a walker for an already spawned actor
    pub fn new(id: ActorId, direction: f32) -> Self {
        Self {
            id,
            direction: direction.signum(),
            jumps: 0,
            hurt_ticks: 0,
        }
    }

    /// Decide the next move and run the stepper for one tick
    pub fn tick<R: Rng>(&mut self, level: &mut Level, config: &ScenarioConfig, rng: &mut R) -> Result<BlockedAxes, LevelError> {
        let body = level.actor_mut(self.id).ok_or(LevelError::UnknownActor(self.id))?;
        body.speed.x = self.direction * config.walk_speed;

        if body.is(ActorState::CAN_JUMP) && rng.gen_bool(config.jump_chance) {
            body.speed.y = JUMP_SPEED;
            body.state.remove(ActorState::CAN_JUMP);
            self.jumps += 1;
        }

        let mut params = body.player_collision_params(false);
        let blocked = level.step_actor(self.id, config.time_mult, &mut params)?;

        if blocked.contains(BlockedAxes::WALL) {
            self.direction = -self.direction;
            log::trace!("Walker {:?} turned around", self.id);
        }

        if let Some(body) = level.actor(self.id) {
            let feet = body.pos;
            if level.tiles().is_tile_hurting(feet.x, feet.y + 1.0) {
                self.hurt_ticks += 1;
            }
        }
        Ok(blocked)
    }
}
