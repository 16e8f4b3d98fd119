//! Tile graphics solidity masks
//!
//! Every tile graphic has a 32×32 bit mask computed once by the asset loader.
//! Row `y` is a `u32` whose bit `x` is set when pixel `(x, y)` is solid. Masks
//! are immutable after construction and shared by every grid cell that shows
//! the tile.

use super::TILE_SIZE;

/// Solidity mask of one tile graphic
pub type TileMask = [u32; TILE_SIZE as usize];

/// Mask with no solid pixel
pub const EMPTY_MASK: TileMask = [0; TILE_SIZE as usize];

/// Mask with every pixel solid
pub const FILLED_MASK: TileMask = [u32::MAX; TILE_SIZE as usize];

/// Bits `left..=right` of a mask row
#[inline]
pub(crate) fn column_span(left: i32, right: i32) -> u32 {
    debug_assert!((0..TILE_SIZE).contains(&left) && (left..TILE_SIZE).contains(&right));
    let upper = (1u64 << (right + 1)) - 1;
    let lower = (1u64 << left) - 1;
    (upper & !lower) as u32
}

/// Collection of tile masks with cached "empty" and "filled" classification
#[derive(Debug, Clone, Default)]
pub struct TileSet {
    masks: Vec<TileMask>,
    mask_empty: Vec<bool>,
    mask_filled: Vec<bool>,
}

impl TileSet {
    /// Build a tile set from precomputed masks
    pub fn new(masks: Vec<TileMask>) -> Self {
        let mask_empty = masks.iter().map(|mask| mask.iter().all(|row| *row == 0)).collect();
        let mask_filled = masks.iter().map(|mask| mask.iter().all(|row| *row == u32::MAX)).collect();
        Self { masks, mask_empty, mask_filled }
    }

    /// Build one mask from per-pixel solidity, row-major, `TILE_SIZE²` entries
    ///
    /// Missing pixels are treated as empty.
    pub fn mask_from_pixels(pixels: &[bool]) -> TileMask {
        let mut mask = EMPTY_MASK;
        for (i, _) in pixels.iter().enumerate().filter(|(_, solid)| **solid) {
            let (x, y) = (i % TILE_SIZE as usize, i / TILE_SIZE as usize);
            if y < mask.len() {
                mask[y] |= 1 << x;
            }
        }
        mask
    }

    /// Number of tiles in this set
    pub fn tile_count(&self) -> usize {
        self.masks.len()
    }

    /// Tile has no solid pixel; unknown tiles count as empty
    pub fn is_tile_mask_empty(&self, tile_id: u32) -> bool {
        self.mask_empty.get(tile_id as usize).copied().unwrap_or(true)
    }

    /// Every pixel of the tile is solid
    pub fn is_tile_filled(&self, tile_id: u32) -> bool {
        self.mask_filled.get(tile_id as usize).copied().unwrap_or(false)
    }

    /// Solidity mask of a tile; unknown tiles get the empty mask
    pub fn tile_mask(&self, tile_id: u32) -> &TileMask {
        self.masks.get(tile_id as usize).unwrap_or(&EMPTY_MASK)
    }
}
