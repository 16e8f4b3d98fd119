//! Tile debris
//!
//! Destroyed tiles burst into four quarter pieces that fly off, fall and fade.
//! Pieces can optionally collide with the tile map: bouncing ones reflect off
//! solid pixels, disappearing ones shrink away on contact.

use bitflags::bitflags;
use rand::Rng;

use crate::foundation::{Aabb, Vec2};

use super::events::TileEvent;
use super::tile_map::TileMap;
use super::{TileCollisionParams, TileDestructType, TILE_SIZE};

const QUARTER_SIZE: i32 = TILE_SIZE / 2;
const SPEED_MULTIPLIER: [f32; 4] = [-2.0, 2.0, -1.0, 1.0];
const ELASTICITY: f32 = 0.8;
const MAX_FALL_SPEED: f32 = 10.0;

bitflags! {
    /// Debris behavior flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DebrisFlags: u8 {
        /// Shrink and fade on contact with solid tiles
        const DISAPPEAR = 0x01;
        /// Reflect off solid tiles
        const BOUNCE = 0x02;
    }
}

/// One flying piece
#[derive(Debug, Clone, PartialEq)]
pub struct DebrisParticle {
    /// Top-left corner in pixels
    pub pos: Vec2,
    /// Size in pixels
    pub size: Vec2,
    /// Pixels per tick
    pub speed: Vec2,
    /// Pixels per tick²
    pub acceleration: Vec2,
    /// Draw scale; the piece is removed at zero
    pub scale: f32,
    /// Scale change per tick
    pub scale_speed: f32,
    /// Rotation in radians
    pub angle: f32,
    /// Rotation change per tick
    pub angle_speed: f32,
    /// Opacity; the piece is removed at zero
    pub alpha: f32,
    /// Opacity change per tick
    pub alpha_speed: f32,
    /// Ticks until the piece starts fading out
    pub time: f32,
    /// Tile graphic the piece is cut from
    pub tile_id: u32,
    /// Quarter of the graphic: 0 top-left, 1 top-right, 2 bottom-left, 3 bottom-right
    pub quarter: u8,
    /// Collision behavior
    pub flags: DebrisFlags,
}

impl DebrisParticle {
    fn is_alive(&self) -> bool {
        self.scale > 0.0 && self.alpha > 0.0
    }

    fn collide(&mut self, map: &mut TileMap, time_mult: f32) {
        let next = self.pos + self.speed * time_mult;
        let mut params = TileCollisionParams::new(TileDestructType::empty(), true);
        if map.is_tile_empty(&probe(next.x, next.y), &mut params) {
            return;
        }

        if self.flags.contains(DebrisFlags::DISAPPEAR) {
            self.scale_speed = -0.02;
            self.alpha_speed = -0.006;
            self.speed = Vec2::zeros();
            self.acceleration = Vec2::zeros();
            return;
        }

        // Horizontal move alone is free: the piece hit a floor or ceiling
        if map.is_tile_empty(&probe(next.x, self.pos.y), &mut params) {
            self.speed.y = if self.speed.y > 0.0 {
                -(ELASTICITY * self.speed.y)
            } else {
                0.0
            };
        }

        // Vertical move alone is free: the piece hit a wall
        if map.is_tile_empty(&probe(self.pos.x, next.y), &mut params) {
            self.speed.x = -(ELASTICITY * self.speed.x);
            self.angle_speed = -(ELASTICITY * self.angle_speed);
        }
    }

    fn integrate(&mut self, time_mult: f32) {
        self.pos += self.speed * time_mult + self.acceleration * (0.5 * time_mult * time_mult);

        if self.acceleration.x != 0.0 {
            self.speed.x = (self.speed.x + self.acceleration.x * time_mult).min(MAX_FALL_SPEED);
        }
        if self.acceleration.y != 0.0 {
            self.speed.y = (self.speed.y + self.acceleration.y * time_mult).min(MAX_FALL_SPEED);
        }

        self.scale += self.scale_speed * time_mult;
        self.angle += self.angle_speed * time_mult;
        self.alpha += self.alpha_speed * time_mult;
    }
}

fn probe(x: f32, y: f32) -> Aabb {
    Aabb::new(x - 1.0, y - 1.0, x + 1.0, y + 1.0)
}

/// All debris pieces of a level
#[derive(Debug, Clone, Default)]
pub struct TileDebrisField {
    particles: Vec<DebrisParticle>,
}

impl TileDebrisField {
    /// Create an empty field
    pub fn new() -> Self {
        Self::default()
    }

    /// Burst the tile graphic `tile_id` at tile `(x, y)` into four pieces
    ///
    /// Tile `0` is always empty and spawns nothing, as do ids no tile set knows.
    pub fn spawn_tile_debris<R: Rng>(&mut self, map: &TileMap, x: i32, y: i32, tile_id: u32, rng: &mut R) {
        if tile_id == 0 || map.tile_mask(tile_id).is_none() {
            return;
        }

        for (i, &multiplier) in SPEED_MULTIPLIER.iter().enumerate() {
            let column = (i % 2) as i32;
            let row = (i / 2) as i32;
            self.particles.push(DebrisParticle {
                pos: Vec2::new(
                    (x * TILE_SIZE + column * QUARTER_SIZE) as f32,
                    (y * TILE_SIZE + row * QUARTER_SIZE) as f32,
                ),
                size: Vec2::new(QUARTER_SIZE as f32, QUARTER_SIZE as f32),
                speed: Vec2::new(multiplier * rng.gen_range(0.8..1.2), -4.0 * rng.gen_range(0.8..1.2)),
                acceleration: Vec2::new(0.0, 0.3),
                scale: 1.0,
                scale_speed: rng.gen_range(-0.01..-0.002),
                angle: 0.0,
                angle_speed: multiplier * rng.gen_range(0.0..0.014),
                alpha: 1.0,
                alpha_speed: -0.01,
                time: 120.0,
                tile_id,
                quarter: i as u8,
                flags: DebrisFlags::empty(),
            });
        }
    }

    /// Spawn debris for every [`TileEvent::Destroyed`] in `events`
    pub fn spawn_from_events<R: Rng>(&mut self, map: &TileMap, events: &[TileEvent], rng: &mut R) {
        for event in events {
            if let TileEvent::Destroyed { x, y, debris_tile_id, .. } = *event {
                self.spawn_tile_debris(map, x, y, debris_tile_id, rng);
            }
        }
    }

    /// Add a custom piece
    ///
    /// Disappearing pieces are dropped when they start outside the grid or
    /// inside a fully solid tile.
    pub fn spawn(&mut self, map: &TileMap, particle: DebrisParticle) {
        if particle.flags.contains(DebrisFlags::DISAPPEAR) {
            if particle.pos.x < 0.0 || particle.pos.y < 0.0 {
                return;
            }
            let Some(tile) = map.tile(particle.pos.x as i32 / TILE_SIZE, particle.pos.y as i32 / TILE_SIZE) else {
                return;
            };
            if map.is_tile_filled(map.resolve_tile_id(tile)) {
                return;
            }
        }

        self.particles.push(particle);
    }

    /// Advance every piece by one tick, removing faded ones
    pub fn update(&mut self, map: &mut TileMap, time_mult: f32) {
        self.particles.retain(DebrisParticle::is_alive);

        for particle in &mut self.particles {
            particle.time -= time_mult;
            if particle.time <= 0.0 {
                particle.alpha_speed = -particle.alpha.min(0.02);
            }

            if particle.flags.intersects(DebrisFlags::DISAPPEAR | DebrisFlags::BOUNCE) {
                particle.collide(map, time_mult);
            }

            particle.integrate(time_mult);
        }
    }

    /// Live pieces
    pub fn particles(&self) -> &[DebrisParticle] {
        &self.particles
    }

    /// Number of live pieces
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// No live pieces
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Remove every piece
    pub fn clear(&mut self) {
        self.particles.clear();
    }
}
