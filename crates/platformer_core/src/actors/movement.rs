//! Movement stepper
//!
//! Moves an [`ActorBody`] through the world one tick at a time. Every
//! candidate position is validated through a [`CollisionEnvironment`]; when
//! the full move is blocked the stepper scans shorter offsets in
//! `collision_check_step` slices and keeps the furthest legal one.
//!
//! Grounded bodies probe a band of vertical offsets so they follow slopes;
//! airborne bodies resolve each axis separately. The axes that stopped the
//! body are returned as [`BlockedAxes`] for the gameplay layer's hit hooks.

use crate::config::{MovementConfig, SimulationConfig};
use crate::foundation::math::scan_sign;
use crate::foundation::{Aabb, Vec2};
use crate::tiles::{TileCollisionParams, TileDestructType, TileMap};

use super::body::ActorBody;
use super::state::{ActorState, BlockedAxes, MoveType};

/// Hitbox height from which reduced tile collision splits the test
const REDUCED_MIN_HEIGHT: f32 = 20.0;
/// Part of a reduced hitbox tested as feet
const REDUCED_BOTTOM_HEIGHT: f32 = 14.0;
/// Part of a reduced hitbox tested as head
const REDUCED_TOP_HEIGHT: f32 = 6.0;

/// Height of the feet probe deciding whether a grounded body is stuck
const UNSTUCK_PROBE_HEIGHT: f32 = 14.0;
const UNSTUCK_STEP: f32 = 2.0;
const UNSTUCK_MAX_UP: f32 = 12.0;
const UNSTUCK_MAX_DOWN: f32 = 14.0;

/// Extra vertical range probed per pixel of horizontal speed on slopes
const SLOPE_SPEED_MARGIN: f32 = 2.5;

/// World a body moves through
pub trait CollisionEnvironment {
    /// Gravity added to airborne bodies every tick
    fn gravity(&self) -> f32;

    /// Y coordinate of the water surface
    fn water_level(&self) -> f32 {
        f32::MAX
    }

    /// Stepper tunables
    fn movement_config(&self) -> &MovementConfig;

    /// `body` may occupy `aabb`
    ///
    /// Tile queries may advance destructible tiles according to `params`.
    fn is_position_empty(&mut self, body: &ActorBody, aabb: &Aabb, params: &mut TileCollisionParams) -> bool;
}

/// Tile part of the emptiness test, honoring the body's tile collision flags
pub fn is_tile_area_empty(tiles: &mut TileMap, body: &ActorBody, aabb: &Aabb, params: &mut TileCollisionParams) -> bool {
    if !body.is(ActorState::COLLIDE_WITH_TILESET) {
        return true;
    }

    if body.is(ActorState::COLLIDE_WITH_TILESET_REDUCED) && aabb.height() >= REDUCED_MIN_HEIGHT {
        // Tall bodies test their feet, and their head only when rising
        let mut feet = *aabb;
        feet.top = feet.bottom - REDUCED_BOTTOM_HEIGHT;
        if !tiles.is_tile_empty(&feet, params) {
            return false;
        }

        if !params.downwards {
            let mut head = *aabb;
            head.bottom = head.top + REDUCED_TOP_HEIGHT;
            return tiles.is_tile_empty(&head, params);
        }
        return true;
    }

    tiles.is_tile_empty(aabb, params)
}

/// Environment made of a tile map alone
pub struct TileEnvironment<'a> {
    tiles: &'a mut TileMap,
    config: &'a SimulationConfig,
}

impl<'a> TileEnvironment<'a> {
    /// Wrap a tile map and the settings to move with
    pub fn new(tiles: &'a mut TileMap, config: &'a SimulationConfig) -> Self {
        Self { tiles, config }
    }
}

impl CollisionEnvironment for TileEnvironment<'_> {
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
        is_tile_area_empty(self.tiles, body, aabb, params)
    }
}

impl ActorBody {
    /// Tile params of a plain actor: no destruction, downwards while falling
    pub fn default_collision_params(&self) -> TileCollisionParams {
        TileCollisionParams::new(TileDestructType::empty(), self.speed.y >= 0.0)
    }

    /// Tile params of a player: collapses tiles, breaks speed tiles while
    /// moving and special tiles during a special move
    pub fn player_collision_params(&self, special_move: bool) -> TileCollisionParams {
        let mut destruct_type = TileDestructType::COLLAPSE;
        if special_move {
            destruct_type |= TileDestructType::SPECIAL;
        }

        let params = TileCollisionParams::new(destruct_type, self.speed.y >= 0.0);
        if self.speed.x.abs() > f32::EPSILON || self.speed.y.abs() > f32::EPSILON {
            params.with_speed(self.speed.x.abs().max(self.speed.y.abs()))
        } else {
            params
        }
    }

    /// Move to `target` if the environment allows it
    ///
    /// `target` is an offset for [`MoveType::RELATIVE`] and a position
    /// otherwise. [`MoveType::FORCE`] skips the test. A committed move marks
    /// the body dirty so the level moves its proxy.
    pub fn move_instantly<E>(&mut self, target: Vec2, move_type: MoveType, params: &mut TileCollisionParams, env: &mut E) -> bool
    where
        E: CollisionEnvironment + ?Sized,
    {
        let (new_pos, aabb) = if move_type.contains(MoveType::RELATIVE) {
            if target == Vec2::zeros() {
                return true;
            }
            (self.pos + target, self.aabb + target)
        } else {
            (target, self.aabb + (target - self.pos))
        };

        let free = move_type.contains(MoveType::FORCE) || env.is_position_empty(self, &aabb, params);
        if free {
            self.aabb = aabb;
            self.pos = new_pos;
            if !self.is(ActorState::FORCE_DISABLE_COLLISIONS) {
                self.state.insert(ActorState::IS_DIRTY);
            }
        }
        free
    }

    /// Advance the body by one tick, halving the tick when it moves fast
    pub fn step<E>(&mut self, time_mult: f32, params: &mut TileCollisionParams, env: &mut E) -> BlockedAxes
    where
        E: CollisionEnvironment + ?Sized,
    {
        let threshold = env.movement_config().substep_threshold;
        let motion = (self.speed.x + self.external_force.x).abs() + (self.speed.y + self.external_force.y).abs();

        if time_mult * motion > threshold {
            let half = time_mult * 0.5;
            self.try_standard_movement(half, params, env) | self.try_standard_movement(half, params, env)
        } else {
            self.try_standard_movement(time_mult, params, env)
        }
    }

    /// Integrate forces and move as far as the environment allows
    pub fn try_standard_movement<E>(&mut self, time_mult: f32, params: &mut TileCollisionParams, env: &mut E) -> BlockedAxes
    where
        E: CollisionEnvironment + ?Sized,
    {
        let config = *env.movement_config();

        if self.unstuck_cooldown > 0.0 {
            self.unstuck_cooldown -= time_mult;
        }

        let mut gravity = 0.0;
        let mut elasticity = self.elasticity;
        if self.is(ActorState::APPLY_GRAVITATION) {
            gravity = env.gravity();
            if self.pos.y >= env.water_level() {
                gravity *= config.water_gravity_scale;
                elasticity *= config.water_elasticity_scale;
            }
        }

        let accel_y = (self.internal_force_y + self.external_force.y) * time_mult;
        self.speed.x = self.speed.x.clamp(-config.max_speed, config.max_speed);
        self.speed.y = (self.speed.y + accel_y).clamp(-config.max_speed, config.max_speed);

        let effective = Vec2::new(
            (self.speed.x + self.external_force.x * time_mult) * time_mult,
            (self.speed.y + 0.5 * accel_y) * time_mult,
        );

        let mut blocked = BlockedAxes::empty();
        if effective.x.abs() > 0.0 || effective.y.abs() > 0.0 {
            blocked = if self.is(ActorState::CAN_JUMP | ActorState::APPLY_GRAVITATION) {
                self.move_grounded(effective, elasticity, &config, params, env)
            } else {
                self.move_airborne(effective, elasticity, time_mult, &config, params, env)
            };
        }

        if self.external_force.x > 0.0 {
            self.external_force.x = (self.external_force.x - self.friction * time_mult).max(0.0);
        } else if self.external_force.x < 0.0 {
            self.external_force.x = (self.external_force.x + self.friction * time_mult).min(0.0);
        }

        if gravity > 0.0 {
            let mut below = self.aabb;
            below.bottom += config.collision_check_step;
            if env.is_position_empty(self, &below, params) {
                self.speed.y += gravity * time_mult;
                self.state.remove(ActorState::CAN_JUMP);
            } else if effective.y.abs() <= f32::EPSILON {
                self.state.insert(ActorState::CAN_JUMP);
            }

            let decay = gravity * config.gravity_decay * time_mult;
            self.external_force.y = (self.external_force.y + decay).min(0.0);
            self.internal_force_y = (self.internal_force_y + decay).min(0.0);
        }

        blocked
    }

    /// Ground movement: follow slopes, then slide as far as possible
    fn move_grounded<E>(
        &mut self,
        effective: Vec2,
        elasticity: f32,
        config: &MovementConfig,
        params: &mut TileCollisionParams,
        env: &mut E,
    ) -> BlockedAxes
    where
        E: CollisionEnvironment + ?Sized,
    {
        let step = config.collision_check_step;

        // Probe a bit over 45° both ways; sub-pixel positions may need a full pixel
        let max_y_diff = config.max_slope_y_diff.max(effective.x.abs() + SLOPE_SPEED_MARGIN);
        let mut y_diff = max_y_diff + effective.y;
        while y_diff >= -max_y_diff + effective.y {
            if self.move_instantly(Vec2::new(effective.x, y_diff), MoveType::RELATIVE, params, env) {
                return BlockedAxes::FLOOR;
            }
            y_diff -= step;
        }

        let sign = scan_sign(effective.x);
        let mut x_diff = effective.x.abs();
        let min_x_diff = -x_diff;
        let mut slid = false;
        while x_diff >= min_x_diff {
            if self.move_instantly(Vec2::new(x_diff * sign, 0.0), MoveType::RELATIVE, params, env) {
                slid = true;
                break;
            }
            x_diff -= step;
        }

        let unstuck = !slid && self.unstuck_cooldown <= 0.0 && self.try_unstuck(config, params, env);
        if unstuck {
            return BlockedAxes::FLOOR;
        }

        if x_diff > step || (x_diff > 0.0 && elasticity > 0.0) {
            self.speed.x = -(elasticity * self.speed.x);
        }
        BlockedAxes::FLOOR | BlockedAxes::WALL
    }

    /// Nudge a body whose feet are inside solid ground up, or failing that down
    fn try_unstuck<E>(&mut self, config: &MovementConfig, params: &mut TileCollisionParams, env: &mut E) -> bool
    where
        E: CollisionEnvironment + ?Sized,
    {
        let mut feet = self.aabb;
        feet.top = feet.top.max(feet.bottom - UNSTUCK_PROBE_HEIGHT);
        let mut probe_params = TileCollisionParams::new(TileDestructType::empty(), true);
        if env.is_position_empty(self, &feet, &mut probe_params) {
            return false;
        }

        let up = (1..).map(|i| -UNSTUCK_STEP * i as f32).take_while(|y| *y >= -UNSTUCK_MAX_UP);
        let down = (1..).map(|i| UNSTUCK_STEP * i as f32).take_while(|y| *y <= UNSTUCK_MAX_DOWN);
        for y_diff in up.chain(down) {
            if self.move_instantly(Vec2::new(0.0, y_diff), MoveType::RELATIVE, params, env) {
                log::debug!("Unstuck body at ({:.1}, {:.1}) by {y_diff}px", self.pos.x, self.pos.y);
                self.unstuck_cooldown = config.unstuck_cooldown;
                return true;
            }
        }
        false
    }

    /// Air movement: full move, else each axis on its own
    fn move_airborne<E>(
        &mut self,
        effective: Vec2,
        elasticity: f32,
        time_mult: f32,
        config: &MovementConfig,
        params: &mut TileCollisionParams,
        env: &mut E,
    ) -> BlockedAxes
    where
        E: CollisionEnvironment + ?Sized,
    {
        if self.move_instantly(effective, MoveType::RELATIVE, params, env) {
            return BlockedAxes::empty();
        }

        let step = config.collision_check_step;
        let full_x = effective.x.abs();
        let full_y = effective.y.abs();

        let sign_x = scan_sign(effective.x);
        let mut x_diff = full_x;
        while x_diff > f32::EPSILON {
            if self.move_instantly(Vec2::new(x_diff * sign_x, 0.0), MoveType::RELATIVE, params, env) {
                break;
            }
            x_diff -= step;
        }

        let sign_y = scan_sign(effective.y);
        let mut y_diff = full_y;
        while y_diff > f32::EPSILON {
            let signed = y_diff * sign_y;
            // Slight horizontal tolerance lets bodies slip past corners
            if self.move_instantly(Vec2::new(0.0, signed), MoveType::RELATIVE, params, env)
                || self.move_instantly(Vec2::new(y_diff * 0.2, signed), MoveType::RELATIVE, params, env)
                || self.move_instantly(Vec2::new(y_diff * -0.2, signed), MoveType::RELATIVE, params, env)
            {
                break;
            }
            y_diff -= step;
        }

        let mut blocked = BlockedAxes::empty();
        if y_diff < full_y {
            if effective.y > 0.0 {
                self.speed.y = -(elasticity * effective.y / time_mult);
                blocked |= BlockedAxes::FLOOR;
                if self.speed.y > -step {
                    self.speed.y = 0.0;
                    self.state.insert(ActorState::CAN_JUMP);
                }
            } else {
                self.speed.y = 0.0;
                blocked |= BlockedAxes::CEILING;
            }
        }

        if x_diff < full_x * config.wall_hit_ratio {
            if x_diff > 0.0 && elasticity > 0.0 {
                self.speed.x = -(elasticity * self.speed.x);
            }
            // A floor or ceiling hit this step takes precedence
            if y_diff >= full_y {
                blocked |= BlockedAxes::WALL;
            }
        }

        blocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::testing::{fill_column, fill_row, masks, room};
    use crate::tiles::{LayerTile, TileMap};
    use approx::assert_relative_eq;

    fn body_at(x: f32, y: f32, state: ActorState) -> ActorBody {
        ActorBody::new(Vec2::new(x, y), state).with_hitbox(20, 20)
    }

    fn settle(body: &mut ActorBody, map: &mut TileMap, config: &SimulationConfig, ticks: usize, time_mult: f32) -> BlockedAxes {
        let mut env = TileEnvironment::new(map, config);
        let mut seen = BlockedAxes::empty();
        for _ in 0..ticks {
            let mut params = body.default_collision_params();
            seen |= body.step(time_mult, &mut params, &mut env);
        }
        seen
    }

    #[test]
    fn test_move_instantly_relative() {
        let mut map = room(20, 20);
        let config = SimulationConfig::default();
        let mut env = TileEnvironment::new(&mut map, &config);
        let mut body = ActorBody::new(Vec2::new(320.0, 0.0), ActorState::COLLIDE_WITH_TILESET).with_hitbox(10, 10);
        let mut params = body.default_collision_params();

        assert!(body.move_instantly(Vec2::new(0.0, 100.0), MoveType::RELATIVE, &mut params, &mut env));
        assert_relative_eq!(body.pos.y, 100.0);
        assert_relative_eq!(body.aabb.bottom, 100.0);
        assert!(body.is(ActorState::IS_DIRTY));
    }

    #[test]
    fn test_zero_relative_move_always_succeeds() {
        let mut map = room(4, 4);
        map.set_tile(1, 1, LayerTile::new(masks::FILLED)).unwrap();
        let config = SimulationConfig::default();
        let mut env = TileEnvironment::new(&mut map, &config);
        let mut body = body_at(48.0, 60.0, ActorState::COLLIDE_WITH_TILESET);
        let mut params = body.default_collision_params();

        assert!(body.move_instantly(Vec2::zeros(), MoveType::RELATIVE, &mut params, &mut env));
        assert!(!body.is(ActorState::IS_DIRTY));
    }

    #[test]
    fn test_blocked_move_keeps_position() {
        let mut map = room(4, 4);
        map.set_tile(2, 1, LayerTile::new(masks::FILLED)).unwrap();
        let config = SimulationConfig::default();
        let mut env = TileEnvironment::new(&mut map, &config);
        let mut body = body_at(40.0, 60.0, ActorState::COLLIDE_WITH_TILESET);
        let before = body.clone();
        let mut params = body.default_collision_params();

        assert!(!body.move_instantly(Vec2::new(80.0, 60.0), MoveType::ABSOLUTE, &mut params, &mut env));
        assert_eq!(body, before);

        assert!(body.move_instantly(Vec2::new(80.0, 60.0), MoveType::FORCE, &mut params, &mut env));
        assert_relative_eq!(body.aabb.left, 70.0);
    }

    #[test]
    fn test_force_disable_collisions_never_dirty() {
        let mut map = room(4, 4);
        let config = SimulationConfig::default();
        let mut env = TileEnvironment::new(&mut map, &config);
        let mut body = body_at(40.0, 60.0, ActorState::FORCE_DISABLE_COLLISIONS);
        let mut params = body.default_collision_params();

        assert!(body.move_instantly(Vec2::new(5.0, 0.0), MoveType::RELATIVE, &mut params, &mut env));
        assert!(!body.is(ActorState::IS_DIRTY));
    }

    #[test]
    fn test_reduced_tile_collision() {
        let mut map = room(4, 8);
        map.set_tile(1, 3, LayerTile::new(masks::TOP_HALF)).unwrap();
        let body = ActorBody::new(Vec2::new(48.0, 134.0), ActorState::COLLIDE_WITH_TILESET).with_hitbox(20, 50);
        let reduced = ActorBody {
            state: ActorState::COLLIDE_WITH_TILESET | ActorState::COLLIDE_WITH_TILESET_REDUCED,
            ..body.clone()
        };

        let mut params = TileCollisionParams::new(TileDestructType::empty(), false);
        assert!(!is_tile_area_empty(&mut map, &body, &body.aabb, &mut params));
        assert!(is_tile_area_empty(&mut map, &reduced, &reduced.aabb, &mut params));

        // Ignored entirely without tile collision
        let ghost = ActorBody { state: ActorState::empty(), ..body };
        assert!(is_tile_area_empty(&mut map, &ghost, &ghost.aabb, &mut params));
    }

    #[test]
    fn test_falling_body_lands_on_floor() {
        let mut map = room(10, 10);
        fill_row(&mut map, 8);
        let config = SimulationConfig::default();
        let mut body = body_at(160.0, 100.0, ActorState::standard());

        let seen = settle(&mut body, &mut map, &config, 200, 1.0);

        assert!(seen.contains(BlockedAxes::FLOOR));
        assert!(body.aabb.bottom <= 255.0 && body.aabb.bottom > 254.0);
        assert!(body.is(ActorState::CAN_JUMP));
        assert_relative_eq!(body.speed.y, 0.0);
    }

    #[test]
    fn test_substepped_fall_matches_single_steps() {
        let config = SimulationConfig::default();

        let mut fast_map = room(10, 10);
        fill_row(&mut fast_map, 8);
        let mut fast = body_at(160.0, 100.0, ActorState::standard()).with_speed(Vec2::new(0.0, 16.0));
        settle(&mut fast, &mut fast_map, &config, 100, 2.0);

        let mut slow_map = room(10, 10);
        fill_row(&mut slow_map, 8);
        let mut slow = body_at(160.0, 100.0, ActorState::standard()).with_speed(Vec2::new(0.0, 16.0));
        settle(&mut slow, &mut slow_map, &config, 200, 1.0);

        assert_relative_eq!(fast.aabb.bottom, slow.aabb.bottom, epsilon = 0.5);
        assert!(fast.is(ActorState::CAN_JUMP) && slow.is(ActorState::CAN_JUMP));
    }

    #[test]
    fn test_grounded_body_stops_at_wall() {
        let mut map = room(10, 10);
        fill_row(&mut map, 8);
        fill_column(&mut map, 7);
        let config = SimulationConfig::default();
        let mut body = body_at(150.0, 255.0, ActorState::standard() | ActorState::CAN_JUMP)
            .with_speed(Vec2::new(4.0, 0.0));

        let seen = settle(&mut body, &mut map, &config, 40, 1.0);

        assert!(seen.contains(BlockedAxes::WALL));
        assert!(body.aabb.right <= 223.0 && body.aabb.right > 219.0);
        assert_relative_eq!(body.aabb.bottom, 255.0);
        assert_relative_eq!(body.speed.x, 0.0);
    }

    #[test]
    fn test_walking_follows_step_up() {
        let mut map = room(10, 10);
        fill_row(&mut map, 8);
        // Two pixel ledge on the next tile
        let mut ledge = crate::tiles::EMPTY_MASK;
        ledge[30] = u32::MAX;
        ledge[31] = u32::MAX;
        let ledge_set = std::sync::Arc::new(crate::tiles::TileSet::new(vec![ledge]));
        map.add_tile_set(ledge_set, 0, 1).unwrap();
        let ledge_id = crate::tiles::testing::FIXTURE_TILE_COUNT;
        for x in 5..10 {
            map.set_tile(x, 7, LayerTile::new(ledge_id)).unwrap();
        }

        let config = SimulationConfig::default();
        let mut body = body_at(130.0, 255.0, ActorState::standard() | ActorState::CAN_JUMP)
            .with_speed(Vec2::new(2.0, 0.0));
        let seen = settle(&mut body, &mut map, &config, 25, 1.0);

        assert!(!seen.contains(BlockedAxes::WALL));
        assert!(body.aabb.left > 160.0);
        assert!(body.aabb.bottom <= 253.0);
    }

    #[test]
    fn test_airborne_ceiling_hit() {
        let mut map = room(10, 10);
        fill_row(&mut map, 2);
        let config = SimulationConfig::default();
        let mut env = TileEnvironment::new(&mut map, &config);
        let mut body = body_at(160.0, 120.0, ActorState::COLLIDE_WITH_TILESET).with_speed(Vec2::new(0.0, -10.0));
        let mut params = body.default_collision_params();

        let blocked = body.try_standard_movement(1.0, &mut params, &mut env);

        assert_eq!(blocked, BlockedAxes::CEILING);
        assert_relative_eq!(body.pos.y, 116.0);
        assert_relative_eq!(body.speed.y, 0.0);
    }

    #[test]
    fn test_airborne_wall_hit_bounces() {
        let mut map = room(10, 10);
        fill_column(&mut map, 7);
        let config = SimulationConfig::default();
        let mut env = TileEnvironment::new(&mut map, &config);
        let mut body = body_at(212.0, 100.0, ActorState::COLLIDE_WITH_TILESET)
            .with_speed(Vec2::new(8.0, 0.0))
            .with_elasticity(0.5);
        let mut params = body.default_collision_params();

        let blocked = body.try_standard_movement(1.0, &mut params, &mut env);

        assert_eq!(blocked, BlockedAxes::WALL);
        assert_relative_eq!(body.speed.x, -4.0);
        assert!(body.aabb.right <= 223.0);
    }

    #[test]
    fn test_unstuck_lifts_embedded_body() {
        let mut map = room(10, 10);
        fill_row(&mut map, 8);
        let config = SimulationConfig::default();
        let mut env = TileEnvironment::new(&mut map, &config);
        // Slow enough that the horizontal scan never lands on a zero offset
        let mut body = body_at(160.0, 262.0, ActorState::standard() | ActorState::CAN_JUMP)
            .with_speed(Vec2::new(0.3, 0.0));
        let mut params = body.default_collision_params();

        let blocked = body.try_standard_movement(1.0, &mut params, &mut env);

        assert_eq!(blocked, BlockedAxes::FLOOR);
        assert_relative_eq!(body.aabb.bottom, 254.0);
        assert_relative_eq!(body.unstuck_cooldown, 60.0);

        // Cooldown prevents another nudge right away
        body.pos.y = 262.0;
        body.update_hitbox(20, 20);
        body.state.insert(ActorState::CAN_JUMP);
        body.speed = Vec2::new(0.3, 0.0);
        let blocked = body.try_standard_movement(1.0, &mut params, &mut env);
        assert_eq!(blocked, BlockedAxes::FLOOR | BlockedAxes::WALL);
        assert_relative_eq!(body.aabb.bottom, 262.0);
    }

    #[test]
    fn test_water_halves_gravity() {
        let mut map = room(10, 10);
        let config = SimulationConfig {
            level: crate::config::LevelConfig {
                water_level: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut env = TileEnvironment::new(&mut map, &config);
        let mut body = body_at(160.0, 100.0, ActorState::standard());
        let mut params = body.default_collision_params();

        body.try_standard_movement(1.0, &mut params, &mut env);
        assert_relative_eq!(body.speed.y, 0.15);
    }

    #[test]
    fn test_friction_decays_external_force() {
        let mut map = room(10, 10);
        let config = SimulationConfig::default();
        let mut env = TileEnvironment::new(&mut map, &config);
        let mut body = body_at(160.0, 100.0, ActorState::COLLIDE_WITH_TILESET);
        body.add_external_force(2.0, 0.0);
        let mut params = body.default_collision_params();

        body.try_standard_movement(1.0, &mut params, &mut env);
        assert_relative_eq!(body.external_force.x, 0.5);
        assert_relative_eq!(body.pos.x, 162.0);
        body.try_standard_movement(1.0, &mut params, &mut env);
        assert_relative_eq!(body.external_force.x, 0.0);
    }

    #[test]
    fn test_player_params() {
        let body = body_at(0.0, 0.0, ActorState::standard()).with_speed(Vec2::new(-3.0, 1.0));
        let params = body.player_collision_params(true);

        assert!(params.destruct_type.contains(
            TileDestructType::COLLAPSE | TileDestructType::SPECIAL | TileDestructType::SPEED
        ));
        assert_relative_eq!(params.speed, 3.0);
        assert!(params.downwards);

        let resting = body_at(0.0, 0.0, ActorState::standard()).player_collision_params(false);
        assert_eq!(resting.destruct_type, TileDestructType::COLLAPSE);
    }
}
