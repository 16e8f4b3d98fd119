//! Tile world and pixel-exact narrow phase
//!
//! The tile map answers "is this box free of solid tile pixels" and, when
//! the caller allows it, advances destructible tiles the box touches. The
//! grid is sized once when the level is created and mutated in place.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

mod animated;
mod debris;
mod destructible;
mod events;
mod layer;
mod tile_map;
mod tile_set;

pub use animated::{AnimatedTile, AnimatedTileFrame};
pub use debris::{DebrisFlags, DebrisParticle, TileDebrisField};
pub use events::{DestructSound, TileEvent};
pub use layer::{LayerTile, LayerTileFlags, TileModifier};
pub use tile_map::{TileMap, TileMapError};
pub use tile_set::{TileMask, TileSet, EMPTY_MASK, FILLED_MASK};

/// Edge length of a tile in pixels
pub const TILE_SIZE: i32 = 32;

/// Number of trigger switches a tile map owns
pub const TRIGGER_COUNT: usize = 32;

/// What lies below the bottom row of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PitType {
    /// The bottom edge is solid ground
    #[default]
    StandOnPlatform,
    /// Bodies fall out of the level
    FallForever,
    /// Bodies fall into a pit that kills them
    InstantDeathPit,
}

impl PitType {
    /// Space below the grid is open
    pub fn is_open(self) -> bool {
        self != Self::StandOnPlatform
    }
}

/// How a body can hang from a tile instead of colliding with it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuspendType {
    /// Regular tile
    #[default]
    None,
    /// Vine: hang and move sideways
    Vine,
    /// Hook: hang in place
    Hook,
}

bitflags! {
    /// Destructible tile categories
    ///
    /// A destructible tile carries exactly one category; collision params
    /// carry the set of categories the mover is allowed to consume.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TileDestructType: u16 {
        /// Destroyed by matching weapon shots
        const WEAPON = 0x01;
        /// Destroyed by bodies moving fast enough
        const SPEED = 0x02;
        /// Starts crumbling after being stepped on
        const COLLAPSE = 0x04;
        /// Destroyed by special moves (buttstomp)
        const SPECIAL = 0x08;
        /// Switched between two frames by a trigger, never destroyed
        const TRIGGER = 0x10;
        /// Query only destroys tiles and ignores solidity
        const IGNORE_SOLID_TILES = 0x20;
    }
}

/// Per-query parameters of the tile narrow phase
///
/// Filled in by the mover; `tiles_destroyed` and `weapon_strength` are
/// updated by the query.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TileCollisionParams {
    /// Destructible categories this query may consume
    pub destruct_type: TileDestructType,
    /// Motion is downwards; one-way tiles only block such motion
    pub downwards: bool,
    /// Weapon type tested against the tile's weapon filter bits
    pub weapon_type: u8,
    /// Frames the shot can still destroy
    pub weapon_strength: i32,
    /// The shot freezes destructible tiles instead of breaking them
    pub freezes: bool,
    /// Speed of the mover for speed-destructible tiles
    pub speed: f32,
    /// Number of destructible tiles advanced by this query
    pub tiles_destroyed: u32,
}

impl TileCollisionParams {
    /// Plain solidity query
    pub fn new(destruct_type: TileDestructType, downwards: bool) -> Self {
        Self {
            destruct_type,
            downwards,
            ..Self::default()
        }
    }

    /// Query on behalf of a weapon shot
    pub fn weapon(weapon_type: u8, strength: i32, downwards: bool) -> Self {
        Self {
            destruct_type: TileDestructType::WEAPON,
            downwards,
            weapon_type,
            weapon_strength: strength,
            ..Self::default()
        }
    }

    /// Set the mover speed and allow speed-destructible tiles
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.destruct_type |= TileDestructType::SPEED;
        self.speed = speed;
        self
    }
}
