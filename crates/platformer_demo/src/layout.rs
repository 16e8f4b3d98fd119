//! Text level layouts
//!
//! One character per tile:
//!
//! | char | tile |
//! |------|------|
//! | `.`  | empty |
//! | `#`  | solid |
//! | `=`  | one-way platform |
//! | `C`  | collapses after being stepped on |
//! | `X`  | breaks when hit fast enough |
//! | `T`  | door switched by trigger 0 |
//! | `~`  | hurts |

use std::sync::Arc;

use platformer_core::tiles::{
    AnimatedTile, LayerTile, LayerTileFlags, PitType, TileMap, TileMapError, TileModifier, TileSet, EMPTY_MASK,
    FILLED_MASK,
};

const EMPTY: u32 = 0;
const FILLED: u32 = 1;
const LEDGE: u32 = 2;

/// Trigger that opens every `T` tile
pub const DOOR_TRIGGER: u8 = 0;

/// Built-in layout used when no file is given
pub const DEFAULT_LAYOUT: &str = "\
#..............................#
#..............................#
#..............................#
#.....====........====.........#
#..............................#
#...........CCCC.........X.....#
#..............................#
#.......###..........T.........#
#....................T....###..#
#.........~~.........T.........#
################################
";

/// Layout parse errors
#[derive(thiserror::Error, Debug)]
pub enum LayoutError {
    /// Unknown tile character
    #[error("Unknown tile '{ch}' at ({x}, {y})")]
    UnknownTile {
        /// Offending character
        ch: char,
        /// Column
        x: usize,
        /// Row
        y: usize,
    },

    /// Rows differ in length
    #[error("Row {row} has {actual} tiles, expected {expected}")]
    RaggedRow {
        /// Row index
        row: usize,
        /// Tiles in the first row
        expected: usize,
        /// Tiles in this row
        actual: usize,
    },

    /// Tile map rejected the layout
    #[error(transparent)]
    TileMap(#[from] TileMapError),
}

fn tile_set() -> Arc<TileSet> {
    let mut ledge = EMPTY_MASK;
    for row in ledge.iter_mut().take(8) {
        *row = u32::MAX;
    }
    Arc::new(TileSet::new(vec![EMPTY_MASK, FILLED_MASK, ledge]))
}

/// Build a tile map from a text layout
pub fn parse_layout(text: &str, pit_type: PitType) -> Result<TileMap, LayoutError> {
    let rows: Vec<&str> = text.lines().map(str::trim_end).filter(|row| !row.is_empty()).collect();
    let width = rows.first().map_or(0, |row| row.chars().count());
    for (row, line) in rows.iter().enumerate() {
        let actual = line.chars().count();
        if actual != width {
            return Err(LayoutError::RaggedRow { row, expected: width, actual });
        }
    }

    let mut map = TileMap::empty(width as i32, rows.len() as i32, pit_type)?;
    map.add_tile_set(tile_set(), 0, 3)?;
    let crumbling = map.add_animated_tile(AnimatedTile::still(&[FILLED, FILLED, FILLED, EMPTY, FILLED]))?;
    let breakable = map.add_animated_tile(AnimatedTile::still(&[FILLED, EMPTY, FILLED]))?;
    let door = map.add_animated_tile(AnimatedTile::still(&[FILLED, EMPTY]))?;

    for (y, line) in rows.iter().enumerate() {
        for (x, ch) in line.chars().enumerate() {
            let (tx, ty) = (x as i32, y as i32);
            match ch {
                '.' => {}
                '#' => map.set_tile(tx, ty, LayerTile::new(FILLED))?,
                '=' => map.set_tile(tx, ty, LayerTile::new(LEDGE).with_flags(LayerTileFlags::ONE_WAY))?,
                '~' => {
                    map.set_tile(tx, ty, LayerTile::new(LEDGE))?;
                    map.set_tile_event_flags(tx, ty, TileModifier::Hurt, [0, 0])?;
                }
                'C' => {
                    map.set_tile(tx, ty, LayerTile::animated(crumbling))?;
                    map.set_tile_event_flags(tx, ty, TileModifier::Collapse, [10, 0])?;
                }
                'X' => {
                    map.set_tile(tx, ty, LayerTile::animated(breakable))?;
                    map.set_tile_event_flags(tx, ty, TileModifier::DestructSpeed, [2, 0])?;
                }
                'T' => {
                    map.set_tile(tx, ty, LayerTile::animated(door))?;
                    map.set_tile_event_flags(tx, ty, TileModifier::Trigger, [DOOR_TRIGGER, 0])?;
                }
                _ => return Err(LayoutError::UnknownTile { ch, x, y }),
            }
        }
    }

    log::info!("Parsed {}x{} layout", width, rows.len());
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_parses() {
        let map = parse_layout(DEFAULT_LAYOUT, PitType::StandOnPlatform).unwrap();

        assert_eq!(map.size().x, 32);
        assert_eq!(map.size().y, 11);
        assert!(map.is_tile_empty_at(1, 1));
        assert!(!map.is_tile_empty_at(0, 10));
        assert!(map.is_tile_hurting(10.0 * 32.0 + 4.0, 9.0 * 32.0 + 4.0));
    }

    #[test]
    fn test_rejects_unknown_tile() {
        let result = parse_layout("#?#\n###\n", PitType::StandOnPlatform);
        assert!(matches!(result, Err(LayoutError::UnknownTile { ch: '?', x: 1, y: 0 })));
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let result = parse_layout("###\n##\n", PitType::StandOnPlatform);
        assert!(matches!(result, Err(LayoutError::RaggedRow { row: 1, expected: 3, actual: 2 })));
    }
}
