//! Notifications emitted by the tile map
//!
//! The tile map never plays sounds or spawns actors itself. Side effects of
//! destructible tiles are queued as [`TileEvent`]s and drained once per tick
//! by the gameplay layer.

use crate::foundation::math::Vec2;

use super::TILE_SIZE;

/// Sound the gameplay layer should play for a destroyed tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestructSound {
    /// Tile broken by a weapon, special move or speed
    SceneryDestruct,
    /// Collapsing tile fell apart
    SceneryCollapse,
}

/// Change of tile state the gameplay layer may react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileEvent {
    /// A destructible tile advanced by `amount` frames to `frame`
    Advanced {
        /// Tile column
        x: i32,
        /// Tile row
        y: i32,
        /// Destruction stage now shown
        frame: usize,
        /// Frames consumed by this advance
        amount: i32,
    },
    /// A destructible tile reached its final stage; spawn debris from `debris_tile_id`
    Destroyed {
        /// Tile column
        x: i32,
        /// Tile row
        y: i32,
        /// Tile graphic the debris pieces are cut from
        debris_tile_id: u32,
        /// Sound to play at the tile center
        sound: DestructSound,
    },
    /// A freezing shot hit a destructible tile; place an ice block there
    FreezeRequested {
        /// Tile column
        x: i32,
        /// Tile row
        y: i32,
    },
    /// A trigger switched state
    TriggerChanged {
        /// Trigger id
        trigger_id: u8,
        /// New state
        state: bool,
    },
}

impl TileEvent {
    /// Pixel center of the tile the event refers to
    pub fn tile_center(&self) -> Option<Vec2> {
        match *self {
            Self::Advanced { x, y, .. } | Self::Destroyed { x, y, .. } | Self::FreezeRequested { x, y } => {
                let half = TILE_SIZE / 2;
                Some(Vec2::new((x * TILE_SIZE + half) as f32, (y * TILE_SIZE + half) as f32))
            }
            Self::TriggerChanged { .. } => None,
        }
    }
}
