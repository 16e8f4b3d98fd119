//! Tile map and pixel-exact narrow phase
//!
//! The sprite layer is a fixed-size grid of [`LayerTile`]s. Collision tests
//! map the query box to the covered pixel range, visit every covered cell in
//! row-major order and bit-test the cell's solidity mask over the covered
//! sub-rectangle. The first solid pixel ends the query.

use std::sync::Arc;

use crate::config::LevelConfig;
use crate::foundation::{Aabb, Vec2i};

use super::animated::AnimatedTile;
use super::destructible::DestructOutcome;
use super::events::TileEvent;
use super::layer::{LayerTile, LayerTileFlags};
use super::tile_set::{column_span, TileMask, TileSet};
use super::{PitType, SuspendType, TileCollisionParams, TileDestructType, TILE_SIZE, TRIGGER_COUNT};

/// Rows above and below a point searched by [`TileMap::tile_suspend_state`]
const SUSPEND_TOLERANCE: i32 = 4;

/// Tile map construction and mutation errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TileMapError {
    /// Layout dimensions must be positive
    #[error("Invalid layout size {width}x{height}")]
    InvalidLayoutSize {
        /// Requested width in tiles
        width: i32,
        /// Requested height in tiles
        height: i32,
    },

    /// Tile list does not match the layout dimensions
    #[error("Layout needs {expected} tiles, got {actual}")]
    TileCountMismatch {
        /// Tiles required by the dimensions
        expected: usize,
        /// Tiles supplied
        actual: usize,
    },

    /// Tile set part points past the end of the tile set
    #[error("Tile set range {offset}..{end} exceeds its {available} tiles", end = offset + count)]
    InvalidTileSetRange {
        /// First tile of the part
        offset: u32,
        /// Tiles in the part
        count: u32,
        /// Tiles in the tile set
        available: usize,
    },

    /// Animated tile without frames
    #[error("Animated tile {0} has no frames")]
    InvalidAnimatedTile(usize),

    /// Coordinates outside of the grid
    #[error("Tile ({x}, {y}) is outside of the layout")]
    OutOfBounds {
        /// Tile column
        x: i32,
        /// Tile row
        y: i32,
    },

    /// Only animated cells can become destructible
    #[error("Tile ({x}, {y}) is not animated and cannot become destructible")]
    NotAnimated {
        /// Tile column
        x: i32,
        /// Tile row
        y: i32,
    },
}

/// Consecutive tiles of a tile set mapped into the level's tile id space
#[derive(Debug, Clone)]
struct TileSetPart {
    tile_set: Arc<TileSet>,
    offset: u32,
    count: u32,
}

/// Pixel range covered by a query, clamped to the level
#[derive(Debug, Clone, Copy)]
pub(super) struct PixelSpan {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl PixelSpan {
    fn tile_columns(&self) -> std::ops::RangeInclusive<i32> {
        (self.left / TILE_SIZE)..=(self.right / TILE_SIZE)
    }

    fn tile_rows(&self) -> std::ops::RangeInclusive<i32> {
        (self.top / TILE_SIZE)..=(self.bottom / TILE_SIZE)
    }
}

pub(super) enum Coverage {
    /// The query leaves the level; the answer is decided by the bounds alone
    Outside(bool),
    Inside(PixelSpan),
}

/// Sprite layer of a level with its tile sets, animations and destructible state
#[derive(Debug, Clone)]
pub struct TileMap {
    layout_size: Vec2i,
    pub(super) layout: Vec<LayerTile>,
    tile_sets: Vec<TileSetPart>,
    pub(super) animated_tiles: Vec<AnimatedTile>,
    pit_type: PitType,
    pub(super) trigger_state: [bool; TRIGGER_COUNT],
    pub(super) active_collapsing_tiles: Vec<Vec2i>,
    pub(super) collapsing_timer: f32,
    pub(super) collapse_delay: u16,
    pub(super) collapse_period: f32,
    pub(super) events: Vec<TileEvent>,
}

impl TileMap {
    /// Create a tile map from a row-major tile list
    pub fn new(width: i32, height: i32, layout: Vec<LayerTile>, pit_type: PitType) -> Result<Self, TileMapError> {
        if width <= 0 || height <= 0 {
            return Err(TileMapError::InvalidLayoutSize { width, height });
        }

        let expected = (width as usize) * (height as usize);
        if layout.len() != expected {
            return Err(TileMapError::TileCountMismatch { expected, actual: layout.len() });
        }

        let defaults = LevelConfig::default();
        log::debug!("Created {width}x{height} tile map ({pit_type:?})");

        Ok(Self {
            layout_size: Vec2i::new(width, height),
            layout,
            tile_sets: Vec::new(),
            animated_tiles: Vec::new(),
            pit_type,
            trigger_state: [false; TRIGGER_COUNT],
            active_collapsing_tiles: Vec::new(),
            collapsing_timer: 0.0,
            collapse_delay: defaults.collapse_delay,
            collapse_period: defaults.collapse_period,
            events: Vec::new(),
        })
    }

    /// Create a tile map filled with tile `0`
    pub fn empty(width: i32, height: i32, pit_type: PitType) -> Result<Self, TileMapError> {
        let count = (width.max(0) as usize) * (height.max(0) as usize);
        Self::new(width, height, vec![LayerTile::default(); count], pit_type)
    }

    /// Apply level settings (pit type and collapse timing)
    pub fn configure(&mut self, config: &LevelConfig) {
        self.pit_type = config.pit_type;
        self.collapse_delay = config.collapse_delay;
        self.collapse_period = config.collapse_period;
    }

    /// Append `count` tiles of `tile_set`, starting at its tile `offset`, to the tile id space
    pub fn add_tile_set(&mut self, tile_set: Arc<TileSet>, offset: u32, count: u32) -> Result<(), TileMapError> {
        let available = tile_set.tile_count();
        if (offset as usize) + (count as usize) > available {
            return Err(TileMapError::InvalidTileSetRange { offset, count, available });
        }

        log::debug!("Added tile set part: {count} tiles from offset {offset}");
        self.tile_sets.push(TileSetPart { tile_set, offset, count });
        Ok(())
    }

    /// Register an animated tile and return its index
    pub fn add_animated_tile(&mut self, animated_tile: AnimatedTile) -> Result<usize, TileMapError> {
        let index = self.animated_tiles.len();
        if animated_tile.frames.is_empty() {
            return Err(TileMapError::InvalidAnimatedTile(index));
        }
        self.animated_tiles.push(animated_tile);
        Ok(index)
    }

    /// Animated tile by index
    pub fn animated_tile(&self, index: usize) -> Option<&AnimatedTile> {
        self.animated_tiles.get(index)
    }

    /// Grid size in tiles
    pub fn size(&self) -> Vec2i {
        self.layout_size
    }

    /// Grid size in pixels
    pub fn level_bounds(&self) -> Vec2i {
        self.layout_size * TILE_SIZE
    }

    /// What lies below the bottom row
    pub fn pit_type(&self) -> PitType {
        self.pit_type
    }

    /// Change what lies below the bottom row
    pub fn set_pit_type(&mut self, pit_type: PitType) {
        self.pit_type = pit_type;
    }

    pub(super) fn cell_index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.layout_size.x || y >= self.layout_size.y {
            return None;
        }
        Some((y * self.layout_size.x + x) as usize)
    }

    /// Cell at tile coordinates
    pub fn tile(&self, x: i32, y: i32) -> Option<&LayerTile> {
        self.cell_index(x, y).map(|index| &self.layout[index])
    }

    /// Replace the cell at tile coordinates
    pub fn set_tile(&mut self, x: i32, y: i32, tile: LayerTile) -> Result<(), TileMapError> {
        let index = self.cell_index(x, y).ok_or(TileMapError::OutOfBounds { x, y })?;
        self.layout[index] = tile;
        Ok(())
    }

    /// Tile graphic a cell currently shows
    pub fn resolve_tile_id(&self, tile: &LayerTile) -> u32 {
        if tile.flags.contains(LayerTileFlags::ANIMATED) {
            self.animated_tiles
                .get(tile.tile_id as usize)
                .map_or(0, AnimatedTile::current_tile_id)
        } else {
            tile.tile_id
        }
    }

    fn resolve_tile_set(&self, tile_id: u32) -> Option<(&TileSet, u32)> {
        let mut remaining = tile_id;
        for part in &self.tile_sets {
            if remaining < part.count {
                return Some((&part.tile_set, remaining + part.offset));
            }
            remaining -= part.count;
        }
        None
    }

    /// Tile graphic has no solid pixel (unknown ids count as empty)
    pub fn is_tile_mask_empty(&self, tile_id: u32) -> bool {
        self.resolve_tile_set(tile_id)
            .map_or(true, |(tile_set, local_id)| tile_set.is_tile_mask_empty(local_id))
    }

    /// Every pixel of the tile graphic is solid
    pub fn is_tile_filled(&self, tile_id: u32) -> bool {
        self.resolve_tile_set(tile_id)
            .is_some_and(|(tile_set, local_id)| tile_set.is_tile_filled(local_id))
    }

    /// Solidity mask of a tile graphic
    pub fn tile_mask(&self, tile_id: u32) -> Option<&TileMask> {
        self.resolve_tile_set(tile_id)
            .map(|(tile_set, local_id)| tile_set.tile_mask(local_id))
    }

    pub(super) fn coverage(&self, aabb: &Aabb) -> Coverage {
        let bounds = self.level_bounds();

        // Out-of-level coordinates count as solid walls
        if aabb.left < 0.0 || aabb.right >= bounds.x as f32 {
            return Coverage::Outside(false);
        }
        if aabb.bottom >= bounds.y as f32 {
            return Coverage::Outside(self.pit_type.is_open());
        }

        let mut span = PixelSpan {
            left: (aabb.left as i32).max(0),
            right: (aabb.right.ceil() as i32).min(bounds.x - 1),
            top: (aabb.top as i32).max(0),
            bottom: (aabb.bottom.ceil() as i32).min(bounds.y - 1),
        };
        if span.bottom <= 0 {
            span.top = 0;
            span.bottom = 1;
        }

        Coverage::Inside(span)
    }

    /// Test a box against solid tile pixels
    ///
    /// Destructible tiles matching `params.destruct_type` are advanced before
    /// their solidity is tested, so this query mutates the map. Returns `true`
    /// when no covered pixel is solid.
    pub fn is_tile_empty(&mut self, aabb: &Aabb, params: &mut TileCollisionParams) -> bool {
        let span = match self.coverage(aabb) {
            Coverage::Outside(empty) => return empty,
            Coverage::Inside(span) => span,
        };

        for y in span.tile_rows() {
            for x in span.tile_columns() {
                // A destroyed stage exposes the next one, so the cell is tested again
                loop {
                    match self.apply_destruct(x, y, params) {
                        DestructOutcome::Recheck => {}
                        DestructOutcome::Blocked => return false,
                        DestructOutcome::Settled => break,
                    }
                }

                if let Some(index) = self.cell_index(x, y) {
                    let tile = self.layout[index];
                    if self.blocks_query(&tile, x, y, &span, params) {
                        return false;
                    }
                }
            }
        }

        true
    }

    /// Would [`Self::is_tile_empty`] destroy anything for this box and params
    ///
    /// Does not modify the map. Stops at the first solid cell that cannot be
    /// destroyed.
    pub fn can_be_destroyed(&self, aabb: &Aabb, params: &TileCollisionParams) -> bool {
        let span = match self.coverage(aabb) {
            Coverage::Outside(empty) => return empty,
            Coverage::Inside(span) => span,
        };

        for y in span.tile_rows() {
            for x in span.tile_columns() {
                let Some(index) = self.cell_index(x, y) else {
                    continue;
                };
                let tile = self.layout[index];
                if self.would_destruct(&tile, x, y, params) {
                    return true;
                }
                if self.blocks_query(&tile, x, y, &span, params) {
                    return false;
                }
            }
        }

        false
    }

    /// Cell takes part in this query and has a solid pixel in the covered range
    fn blocks_query(&self, tile: &LayerTile, x: i32, y: i32, span: &PixelSpan, params: &TileCollisionParams) -> bool {
        if params.destruct_type.contains(TileDestructType::IGNORE_SOLID_TILES)
            || tile.suspend_type != SuspendType::None
            || (tile.is_one_way() && !params.downwards)
        {
            return false;
        }

        let tile_id = self.resolve_tile_id(tile);
        let Some((tile_set, local_id)) = self.resolve_tile_set(tile_id) else {
            return false;
        };
        if tile_set.is_tile_mask_empty(local_id) {
            return false;
        }

        let tx = x * TILE_SIZE;
        let ty = y * TILE_SIZE;
        let mut left = (span.left - tx).max(0);
        let mut right = (span.right - tx).min(TILE_SIZE - 1);
        let mut top = (span.top - ty).max(0);
        let mut bottom = (span.bottom - ty).min(TILE_SIZE - 1);
        if left > right || top > bottom {
            return false;
        }

        if tile.flags.contains(LayerTileFlags::FLIP_X) {
            (left, right) = (TILE_SIZE - 1 - right, TILE_SIZE - 1 - left);
        }
        if tile.flags.contains(LayerTileFlags::FLIP_Y) {
            (top, bottom) = (TILE_SIZE - 1 - bottom, TILE_SIZE - 1 - top);
        }

        let columns = column_span(left, right);
        tile_set.tile_mask(local_id)[top as usize..=bottom as usize]
            .iter()
            .any(|row| row & columns != 0)
    }

    /// Integer tile test: is the cell's current graphic free of solid pixels
    ///
    /// Columns outside the grid are solid, rows below it follow the pit type
    /// and rows above it are clamped to the top row.
    pub fn is_tile_empty_at(&self, tx: i32, ty: i32) -> bool {
        if tx < 0 || tx >= self.layout_size.x {
            return false;
        }
        if ty >= self.layout_size.y {
            return self.pit_type.is_open();
        }

        let index = (ty.max(0) * self.layout_size.x + tx) as usize;
        let tile_id = self.resolve_tile_id(&self.layout[index]);
        self.is_tile_mask_empty(tile_id)
    }

    /// Cell under the pixel carries the hurt flag
    pub fn is_tile_hurting(&self, x: f32, y: f32) -> bool {
        if x < 0.0 || y < 0.0 {
            return false;
        }

        self.tile(x as i32 / TILE_SIZE, y as i32 / TILE_SIZE)
            .is_some_and(|tile| tile.flags.contains(LayerTileFlags::HURT))
    }

    /// Vine/hook under the pixel, if the tile's mask is solid near it
    ///
    /// Searches the mask column at the pixel's x within a few rows of its y.
    pub fn tile_suspend_state(&self, x: f32, y: f32) -> SuspendType {
        if x < 0.0 || y < 0.0 {
            return SuspendType::None;
        }

        let Some(tile) = self.tile(x as i32 / TILE_SIZE, y as i32 / TILE_SIZE) else {
            return SuspendType::None;
        };
        if tile.suspend_type == SuspendType::None {
            return SuspendType::None;
        }

        let Some(mask) = self.tile_mask(self.resolve_tile_id(tile)) else {
            return SuspendType::None;
        };

        let mut rx = x as i32 & (TILE_SIZE - 1);
        let mut ry = y as i32 & (TILE_SIZE - 1);
        if tile.flags.contains(LayerTileFlags::FLIP_X) {
            rx = TILE_SIZE - 1 - rx;
        }
        if tile.flags.contains(LayerTileFlags::FLIP_Y) {
            ry = TILE_SIZE - 1 - ry;
        }

        let top = (ry - SUSPEND_TOLERANCE).max(0) as usize;
        let bottom = (ry + SUSPEND_TOLERANCE).min(TILE_SIZE - 1) as usize;
        if mask[top..=bottom].iter().any(|row| row & (1 << rx) != 0) {
            tile.suspend_type
        } else {
            SuspendType::None
        }
    }

    /// Advance animated tiles and collapse timers by one tick
    pub fn update(&mut self, time_mult: f32) {
        for animated_tile in &mut self.animated_tiles {
            animated_tile.update(time_mult);
        }
        self.advance_collapsing_tile_timers(time_mult);
    }

    /// Take all events queued since the last call
    pub fn drain_events(&mut self) -> Vec<TileEvent> {
        std::mem::take(&mut self.events)
    }

    /// Events queued since the last drain
    pub fn pending_events(&self) -> &[TileEvent] {
        &self.events
    }
}
