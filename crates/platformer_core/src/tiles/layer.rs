//! Grid cell records

use bitflags::bitflags;

use super::{SuspendType, TileDestructType};

bitflags! {
    /// Orientation and behavior flags of a grid cell
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LayerTileFlags: u8 {
        /// Mirrored horizontally
        const FLIP_X = 0x01;
        /// Mirrored vertically
        const FLIP_Y = 0x02;
        /// `tile_id` indexes the animated tile list
        const ANIMATED = 0x04;
        /// Solid only for downward motion
        const ONE_WAY = 0x10;
        /// Touching the tile hurts
        const HURT = 0x20;
    }
}

/// One cell of the sprite layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayerTile {
    /// Tile graphic, or animated tile index when [`LayerTileFlags::ANIMATED`] is set
    pub tile_id: u32,
    /// Orientation and behavior flags
    pub flags: LayerTileFlags,
    /// Vine/hook behavior
    pub suspend_type: SuspendType,
    /// Destructible category, empty for regular tiles
    pub destruct_type: TileDestructType,
    /// Animated tile whose frames are the destruction stages
    pub destruct_animation: usize,
    /// Destruction stage currently shown
    pub destruct_frame_index: usize,
    /// Category parameter: weapon filter bits, minimum speed, trigger id or
    /// collapse countdown
    pub tile_params: u16,
}

impl LayerTile {
    /// Static tile showing `tile_id`
    pub fn new(tile_id: u32) -> Self {
        Self {
            tile_id,
            ..Self::default()
        }
    }

    /// Tile playing the animated tile `index`
    pub fn animated(index: usize) -> Self {
        Self {
            tile_id: index as u32,
            flags: LayerTileFlags::ANIMATED,
            ..Self::default()
        }
    }

    /// Add flags to the tile
    pub fn with_flags(mut self, flags: LayerTileFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Tile is one-way
    pub fn is_one_way(&self) -> bool {
        self.flags.contains(LayerTileFlags::ONE_WAY)
    }
}

/// Tile modifier events placed by the level's event map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileModifier {
    /// Make the tile one-way
    OneWay,
    /// Let bodies hang from the tile like a vine
    Vine,
    /// Let bodies hang from the tile like a hook
    Hook,
    /// Make the tile hurt
    Hurt,
    /// Destroyed by weapons; params are the low and high byte of the weapon filter
    DestructWeapon,
    /// Destroyed by special moves
    DestructSpecial,
    /// Destroyed by fast movement; param is the minimum speed
    DestructSpeed,
    /// Crumbles after being stepped on; param is the initial countdown
    Collapse,
    /// Switched by a trigger; param is the trigger id
    Trigger,
}
