//! Actor body: the part of an actor the collision core moves

use crate::config::MovementConfig;
use crate::foundation::{Aabb, Vec2};
use crate::spatial::ProxyId;

use super::state::ActorState;

/// Kinematic state of one actor
///
/// `pos` is the hotspot (bottom center of the hitbox after
/// [`ActorBody::update_hitbox`]); `aabb` is the tight hitbox tested against
/// tiles and solid actors.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorBody {
    /// Position in pixels
    pub pos: Vec2,
    /// Speed in pixels per tick
    pub speed: Vec2,
    /// Force from the environment (springs, pushes), decays by friction
    pub external_force: Vec2,
    /// Upward force of jumps, decays by gravity
    pub internal_force_y: f32,
    /// Fraction of speed kept when bouncing off tiles
    pub elasticity: f32,
    /// Horizontal external force decay per tick
    pub friction: f32,
    /// Ticks until the next unstuck nudge is allowed
    pub unstuck_cooldown: f32,
    /// Collision and movement flags
    pub state: ActorState,
    /// Tight hitbox
    pub aabb: Aabb,
    pub(crate) proxy: Option<ProxyId>,
}

impl ActorBody {
    /// Create a body at rest with a zero-sized hitbox at `pos`
    pub fn new(pos: Vec2, state: ActorState) -> Self {
        Self::with_config(pos, state, &MovementConfig::default())
    }

    /// Create a body at rest using the configured friction
    pub fn with_config(pos: Vec2, state: ActorState, config: &MovementConfig) -> Self {
        Self {
            pos,
            speed: Vec2::zeros(),
            external_force: Vec2::zeros(),
            internal_force_y: 0.0,
            elasticity: 0.0,
            friction: config.default_friction,
            unstuck_cooldown: 0.0,
            state,
            aabb: Aabb::new(pos.x, pos.y, pos.x, pos.y),
            proxy: None,
        }
    }

    /// Set the hitbox size, builder style
    pub fn with_hitbox(mut self, width: u32, height: u32) -> Self {
        self.update_hitbox(width, height);
        self
    }

    /// Set the initial speed
    pub fn with_speed(mut self, speed: Vec2) -> Self {
        self.speed = speed;
        self
    }

    /// Set the elasticity
    pub fn with_elasticity(mut self, elasticity: f32) -> Self {
        self.elasticity = elasticity;
        self
    }

    /// Recompute the hitbox: `width × height`, centered horizontally on
    /// `pos` and resting on it
    pub fn update_hitbox(&mut self, width: u32, height: u32) {
        let half = (width / 2) as f32;
        self.aabb = Aabb::new(self.pos.x - half, self.pos.y - height as f32, self.pos.x + half, self.pos.y);
    }

    /// All of `flags` are set
    pub fn is(&self, flags: ActorState) -> bool {
        self.state.contains(flags)
    }

    /// Set or clear `flags`
    pub fn set_state(&mut self, flags: ActorState, value: bool) {
        self.state.set(flags, value);
    }

    /// Push the body
    pub fn add_external_force(&mut self, x: f32, y: f32) {
        self.external_force += Vec2::new(x, y);
    }

    /// Broad phase proxy, while the body is registered with a level
    pub fn proxy(&self) -> Option<ProxyId> {
        self.proxy
    }

    /// Marked for removal
    pub fn is_destroyed(&self) -> bool {
        self.is(ActorState::IS_DESTROYED)
    }
}

/// Gameplay queries the collision core leaves to the actor implementation
///
/// Pair handlers use these to decide how two overlapping actors interact;
/// the core itself never calls them.
pub trait ActorCapabilities {
    /// Projectiles can hit this actor
    fn can_collide_with_ammo(&self) -> bool {
        true
    }

    /// Damage is ignored
    fn is_invulnerable(&self) -> bool;

    /// Current speed in pixels per tick
    fn speed(&self) -> Vec2;
}

impl ActorCapabilities for ActorBody {
    fn is_invulnerable(&self) -> bool {
        self.is(ActorState::IS_INVULNERABLE)
    }

    fn speed(&self) -> Vec2 {
        self.speed
    }
}
