//! Destructible, collapsing and trigger-switched tiles
//!
//! A destructible cell stores the index of an animated tile whose frames are
//! its destruction stages. Frame `len - 2` is the destroyed look (usually an
//! empty graphic) and the last frame is the graphic debris is cut from.

use crate::foundation::Vec2i;

use super::events::{DestructSound, TileEvent};
use super::layer::{LayerTile, LayerTileFlags, TileModifier};
use super::tile_map::{TileMap, TileMapError};
use super::{SuspendType, TileCollisionParams, TileDestructType, TRIGGER_COUNT};

/// Result of applying a query's destruct params to one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum DestructOutcome {
    /// The cell changed and must be tested again
    Recheck,
    /// The query ends as blocked
    Blocked,
    /// Continue with the solidity test
    Settled,
}

impl TileMap {
    /// Index of the destroyed stage of a destructible cell
    fn last_destruct_stage(&self, tile: &LayerTile) -> usize {
        self.animated_tiles
            .get(tile.destruct_animation)
            .map_or(0, |anim| anim.frames.len().saturating_sub(2))
    }

    pub(super) fn apply_destruct(&mut self, x: i32, y: i32, params: &mut TileCollisionParams) -> DestructOutcome {
        let Some(index) = self.cell_index(x, y) else {
            return DestructOutcome::Settled;
        };
        let tile = self.layout[index];
        if tile.destruct_type.is_empty() || !params.destruct_type.contains(tile.destruct_type) {
            return DestructOutcome::Settled;
        }

        if tile.destruct_type == TileDestructType::WEAPON {
            let matches_filter = 1u32
                .checked_shl(u32::from(params.weapon_type))
                .is_some_and(|bit| u32::from(tile.tile_params) & bit != 0);

            if matches_filter {
                let mut strength = params.weapon_strength;
                let advanced = self.advance_destructible_tile(x, y, &mut strength, DestructSound::SceneryDestruct);
                params.weapon_strength = strength;
                if advanced {
                    params.tiles_destroyed += 1;
                    return if params.weapon_strength <= 0 {
                        DestructOutcome::Blocked
                    } else {
                        DestructOutcome::Recheck
                    };
                }
            } else if params.freezes && tile.destruct_frame_index < self.last_destruct_stage(&tile) {
                log::trace!("Freezing shot hit destructible tile ({x}, {y})");
                self.events.push(TileEvent::FreezeRequested { x, y });
                return DestructOutcome::Blocked;
            }
        } else if tile.destruct_type == TileDestructType::SPECIAL {
            let mut amount = 1;
            if self.advance_destructible_tile(x, y, &mut amount, DestructSound::SceneryDestruct) {
                params.tiles_destroyed += 1;
                return DestructOutcome::Recheck;
            }
        } else if tile.destruct_type == TileDestructType::SPEED {
            let mut amount = 1;
            if f32::from(tile.tile_params) <= params.speed
                && self.advance_destructible_tile(x, y, &mut amount, DestructSound::SceneryDestruct)
            {
                params.tiles_destroyed += 1;
                return DestructOutcome::Recheck;
            }
        } else if tile.destruct_type == TileDestructType::COLLAPSE {
            let pos = Vec2i::new(x, y);
            if !self.active_collapsing_tiles.contains(&pos) {
                log::trace!("Tile ({x}, {y}) starts collapsing");
                self.active_collapsing_tiles.push(pos);
                params.tiles_destroyed += 1;
            }
        }

        DestructOutcome::Settled
    }

    /// Read-only counterpart of [`Self::apply_destruct`]
    pub(super) fn would_destruct(&self, tile: &LayerTile, x: i32, y: i32, params: &TileCollisionParams) -> bool {
        if tile.destruct_type.is_empty() || !params.destruct_type.contains(tile.destruct_type) {
            return false;
        }

        let not_destroyed = tile.destruct_frame_index < self.last_destruct_stage(tile);
        if tile.destruct_type == TileDestructType::WEAPON {
            let matches_filter = 1u32
                .checked_shl(u32::from(params.weapon_type))
                .is_some_and(|bit| u32::from(tile.tile_params) & bit != 0);
            not_destroyed && (matches_filter || params.freezes)
        } else if tile.destruct_type == TileDestructType::SPECIAL {
            not_destroyed
        } else if tile.destruct_type == TileDestructType::SPEED {
            not_destroyed && f32::from(tile.tile_params) <= params.speed
        } else if tile.destruct_type == TileDestructType::COLLAPSE {
            !self.active_collapsing_tiles.contains(&Vec2i::new(x, y))
        } else {
            false
        }
    }

    /// Advance a destructible cell by up to `amount` stages
    ///
    /// Consumes the advanced stages from `amount`. Returns `false` when
    /// nothing was advanced (no budget left or the cell is already destroyed).
    pub(super) fn advance_destructible_tile(&mut self, x: i32, y: i32, amount: &mut i32, sound: DestructSound) -> bool {
        let Some(index) = self.cell_index(x, y) else {
            return false;
        };
        let tile = &mut self.layout[index];
        let Some(anim) = self.animated_tiles.get(tile.destruct_animation) else {
            return false;
        };

        let max = anim.frames.len().saturating_sub(2);
        if *amount <= 0 || tile.destruct_frame_index >= max {
            return false;
        }

        let current = (*amount as usize).min(max - tile.destruct_frame_index);
        tile.destruct_frame_index += current;
        tile.tile_id = anim.frames[tile.destruct_frame_index].tile_id;

        self.events.push(TileEvent::Advanced {
            x,
            y,
            frame: tile.destruct_frame_index,
            amount: current as i32,
        });

        if tile.destruct_frame_index >= max {
            let debris_tile_id = anim.frames.last().map_or(0, |frame| frame.tile_id);
            log::debug!("Tile ({x}, {y}) destroyed");
            self.events.push(TileEvent::Destroyed { x, y, debris_tile_id, sound });
        }

        *amount -= current as i32;
        true
    }

    /// Step every collapsing tile once per collapse period
    ///
    /// A tile waits for its countdown, advances one stage, then waits the
    /// collapse delay before the next stage. Fully collapsed tiles stop being
    /// destructible and leave the active list.
    pub(super) fn advance_collapsing_tile_timers(&mut self, time_mult: f32) {
        self.collapsing_timer -= time_mult;
        if self.collapsing_timer > 0.0 {
            return;
        }
        self.collapsing_timer = self.collapse_period;

        let mut i = 0;
        while i < self.active_collapsing_tiles.len() {
            let pos = self.active_collapsing_tiles[i];
            let Some(index) = self.cell_index(pos.x, pos.y) else {
                self.active_collapsing_tiles.remove(i);
                continue;
            };

            if self.layout[index].tile_params == 0 {
                let mut amount = 1;
                if self.advance_destructible_tile(pos.x, pos.y, &mut amount, DestructSound::SceneryCollapse) {
                    self.layout[index].tile_params = self.collapse_delay;
                } else {
                    self.layout[index].destruct_type = TileDestructType::empty();
                    self.active_collapsing_tiles.remove(i);
                    continue;
                }
            } else {
                self.layout[index].tile_params -= 1;
            }
            i += 1;
        }
    }

    /// Tiles currently collapsing
    pub fn active_collapsing_tiles(&self) -> &[Vec2i] {
        &self.active_collapsing_tiles
    }

    /// Current state of a trigger; unknown ids are off
    pub fn trigger(&self, trigger_id: u8) -> bool {
        self.trigger_state.get(trigger_id as usize).copied().unwrap_or(false)
    }

    /// Switch a trigger and every tile bound to it
    ///
    /// Bound tiles show stage 1 while the trigger is on and stage 0 while it
    /// is off. Setting the current state again does nothing.
    pub fn set_trigger(&mut self, trigger_id: u8, state: bool) {
        let Some(current) = self.trigger_state.get_mut(trigger_id as usize) else {
            log::warn!("Trigger {trigger_id} out of range (max {TRIGGER_COUNT})");
            return;
        };
        if *current == state {
            return;
        }
        *current = state;

        let frame = usize::from(state);
        let animated_tiles = &self.animated_tiles;
        let mut switched = 0;
        for tile in self
            .layout
            .iter_mut()
            .filter(|tile| tile.destruct_type == TileDestructType::TRIGGER && tile.tile_params == u16::from(trigger_id))
        {
            if let Some(anim) = animated_tiles.get(tile.destruct_animation).filter(|anim| anim.frames.len() > 1) {
                tile.destruct_frame_index = frame;
                tile.tile_id = anim.frames[frame].tile_id;
                switched += 1;
            }
        }

        log::debug!("Trigger {trigger_id} set to {state}, {switched} tiles switched");
        self.events.push(TileEvent::TriggerChanged { trigger_id, state });
    }

    /// Apply a tile modifier from the level's event map
    ///
    /// Destructible modifiers only take effect on animated cells; other cells
    /// yield [`TileMapError::NotAnimated`].
    pub fn set_tile_event_flags(&mut self, x: i32, y: i32, modifier: TileModifier, params: [u8; 2]) -> Result<(), TileMapError> {
        let index = self.cell_index(x, y).ok_or(TileMapError::OutOfBounds { x, y })?;
        let tile = &mut self.layout[index];

        let (destruct_type, tile_params) = match modifier {
            TileModifier::OneWay => {
                tile.flags |= LayerTileFlags::ONE_WAY;
                return Ok(());
            }
            TileModifier::Hurt => {
                tile.flags |= LayerTileFlags::HURT;
                return Ok(());
            }
            TileModifier::Vine => {
                tile.suspend_type = SuspendType::Vine;
                return Ok(());
            }
            TileModifier::Hook => {
                tile.suspend_type = SuspendType::Hook;
                return Ok(());
            }
            TileModifier::DestructWeapon => (TileDestructType::WEAPON, u16::from_le_bytes(params)),
            TileModifier::DestructSpecial => (TileDestructType::SPECIAL, u16::from(params[0])),
            TileModifier::DestructSpeed => (TileDestructType::SPEED, u16::from(params[0])),
            TileModifier::Collapse => (TileDestructType::COLLAPSE, u16::from(params[0])),
            TileModifier::Trigger => (TileDestructType::TRIGGER, u16::from(params[0])),
        };

        self.set_tile_destructible_params(x, y, destruct_type, tile_params)
    }

    /// Turn an animated cell into a destructible cell of the given category
    pub fn set_tile_destructible_params(
        &mut self,
        x: i32,
        y: i32,
        destruct_type: TileDestructType,
        tile_params: u16,
    ) -> Result<(), TileMapError> {
        let index = self.cell_index(x, y).ok_or(TileMapError::OutOfBounds { x, y })?;
        let tile = &mut self.layout[index];
        if !tile.flags.contains(LayerTileFlags::ANIMATED) {
            return Err(TileMapError::NotAnimated { x, y });
        }

        let animation = tile.tile_id as usize;
        let first_tile_id = self
            .animated_tiles
            .get(animation)
            .and_then(|anim| anim.frames.first())
            .map(|frame| frame.tile_id)
            .ok_or(TileMapError::InvalidAnimatedTile(animation))?;

        tile.destruct_type = destruct_type;
        tile.flags.remove(LayerTileFlags::ANIMATED);
        tile.destruct_animation = animation;
        tile.tile_id = first_tile_id;
        tile.tile_params = tile_params;
        tile.destruct_frame_index = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::Aabb;
    use crate::tiles::testing::{masks, room};
    use crate::tiles::AnimatedTile;

    /// Three solid stages, the empty destroyed stage and the debris graphic
    const STAGES: [u32; 5] = [masks::FILLED, masks::FILLED, masks::FILLED, masks::EMPTY, masks::TOP_HALF];

    const CELL: Aabb = Aabb::new(36.0, 36.0, 60.0, 60.0);

    fn destructible_map(modifier: TileModifier, params: [u8; 2]) -> TileMap {
        let mut map = room(4, 4);
        let index = map.add_animated_tile(AnimatedTile::still(&STAGES)).unwrap();
        map.set_tile(1, 1, LayerTile::animated(index)).unwrap();
        map.set_tile_event_flags(1, 1, modifier, params).unwrap();
        map
    }

    fn plain_query(map: &mut TileMap) -> bool {
        let mut params = TileCollisionParams::new(TileDestructType::empty(), false);
        map.is_tile_empty(&CELL, &mut params)
    }

    #[test]
    fn test_destructible_params_need_animated_cell() {
        let mut map = room(4, 4);
        assert_eq!(
            map.set_tile_event_flags(1, 1, TileModifier::DestructSpecial, [0, 0]),
            Err(TileMapError::NotAnimated { x: 1, y: 1 })
        );
        assert_eq!(
            map.set_tile_event_flags(9, 1, TileModifier::OneWay, [0, 0]),
            Err(TileMapError::OutOfBounds { x: 9, y: 1 })
        );
    }

    #[test]
    fn test_destructible_setup() {
        let map = destructible_map(TileModifier::DestructWeapon, [0x04, 0x01]);
        let tile = map.tile(1, 1).unwrap();

        assert_eq!(tile.destruct_type, TileDestructType::WEAPON);
        assert_eq!(tile.tile_params, 0x0104);
        assert_eq!(tile.tile_id, masks::FILLED);
        assert!(!tile.flags.contains(LayerTileFlags::ANIMATED));
    }

    #[test]
    fn test_weapon_destroys_tile_in_one_hit() {
        let mut map = destructible_map(TileModifier::DestructWeapon, [1 << 2, 0]);

        let mut params = TileCollisionParams::weapon(2, 3, false);
        // The shot is spent on the tile
        assert!(!map.is_tile_empty(&CELL, &mut params));
        assert_eq!(params.weapon_strength, 0);
        assert_eq!(params.tiles_destroyed, 1);
        assert!(plain_query(&mut map));

        let events = map.drain_events();
        assert_eq!(events.len(), 2);
        assert!(events.contains(&TileEvent::Destroyed {
            x: 1,
            y: 1,
            debris_tile_id: masks::TOP_HALF,
            sound: DestructSound::SceneryDestruct,
        }));
    }

    #[test]
    fn test_strong_weapon_passes_through() {
        let mut map = destructible_map(TileModifier::DestructWeapon, [1 << 2, 0]);

        let mut params = TileCollisionParams::weapon(2, 5, false);
        assert!(map.is_tile_empty(&CELL, &mut params));
        assert_eq!(params.weapon_strength, 2);
    }

    #[test]
    fn test_weak_weapon_advances_partially() {
        let mut map = destructible_map(TileModifier::DestructWeapon, [1 << 2, 0]);

        let mut params = TileCollisionParams::weapon(2, 1, false);
        assert!(!map.is_tile_empty(&CELL, &mut params));
        assert_eq!(map.tile(1, 1).unwrap().destruct_frame_index, 1);
        assert!(!plain_query(&mut map));
        assert_eq!(
            map.drain_events(),
            vec![TileEvent::Advanced { x: 1, y: 1, frame: 1, amount: 1 }]
        );
    }

    #[test]
    fn test_weapon_filter_mismatch() {
        let mut map = destructible_map(TileModifier::DestructWeapon, [1 << 2, 0]);

        let mut params = TileCollisionParams::weapon(3, 5, false);
        assert!(!map.is_tile_empty(&CELL, &mut params));
        assert_eq!(params.tiles_destroyed, 0);
        assert!(map.pending_events().is_empty());

        // Out of range weapon types never match
        let mut params = TileCollisionParams::weapon(40, 5, false);
        assert!(!map.is_tile_empty(&CELL, &mut params));
    }

    #[test]
    fn test_freezing_shot_requests_ice_block() {
        let mut map = destructible_map(TileModifier::DestructWeapon, [1 << 2, 0]);

        let mut params = TileCollisionParams::weapon(7, 1, false);
        params.freezes = true;
        assert!(map.can_be_destroyed(&CELL, &params));
        assert!(!map.is_tile_empty(&CELL, &mut params));
        assert_eq!(map.drain_events(), vec![TileEvent::FreezeRequested { x: 1, y: 1 }]);
        assert_eq!(map.tile(1, 1).unwrap().destruct_frame_index, 0);
    }

    #[test]
    fn test_special_move_destroys_every_stage() {
        let mut map = destructible_map(TileModifier::DestructSpecial, [0, 0]);

        let mut params = TileCollisionParams::new(TileDestructType::SPECIAL, true);
        assert!(map.is_tile_empty(&CELL, &mut params));
        assert_eq!(params.tiles_destroyed, 3);
    }

    #[test]
    fn test_speed_threshold() {
        let mut map = destructible_map(TileModifier::DestructSpeed, [8, 0]);

        let mut slow = TileCollisionParams::new(TileDestructType::empty(), false).with_speed(4.0);
        assert!(!map.can_be_destroyed(&CELL, &slow));
        assert!(!map.is_tile_empty(&CELL, &mut slow));

        let mut fast = TileCollisionParams::new(TileDestructType::empty(), false).with_speed(10.0);
        assert!(map.can_be_destroyed(&CELL, &fast));
        assert!(map.is_tile_empty(&CELL, &mut fast));
        assert!(!map.can_be_destroyed(&CELL, &fast));
    }

    #[test]
    fn test_collapse_registers_once_and_crumbles() {
        let mut map = destructible_map(TileModifier::Collapse, [0, 0]);

        let mut params = TileCollisionParams::new(TileDestructType::COLLAPSE, true);
        assert!(!map.is_tile_empty(&CELL, &mut params));
        assert!(!map.is_tile_empty(&CELL, &mut params));
        assert_eq!(params.tiles_destroyed, 1);
        assert_eq!(map.active_collapsing_tiles(), &[Vec2i::new(1, 1)]);

        // Stage, then collapse delay, for every stage; then one period to retire
        for _ in 0..20 {
            map.update(1.0);
        }

        assert!(plain_query(&mut map));
        assert!(map.active_collapsing_tiles().is_empty());
        assert!(map.tile(1, 1).unwrap().destruct_type.is_empty());
        assert!(map.drain_events().iter().any(|event| matches!(
            event,
            TileEvent::Destroyed { sound: DestructSound::SceneryCollapse, .. }
        )));
    }

    #[test]
    fn test_collapse_timing() {
        let mut map = destructible_map(TileModifier::Collapse, [0, 0]);
        let mut params = TileCollisionParams::new(TileDestructType::COLLAPSE, true);
        map.is_tile_empty(&CELL, &mut params);

        map.update(1.0);
        assert_eq!(map.tile(1, 1).unwrap().destruct_frame_index, 1);
        assert_eq!(map.tile(1, 1).unwrap().tile_params, 4);

        // Four periods of countdown before the next stage
        for _ in 0..4 {
            map.update(1.0);
        }
        assert_eq!(map.tile(1, 1).unwrap().destruct_frame_index, 1);
        map.update(1.0);
        assert_eq!(map.tile(1, 1).unwrap().destruct_frame_index, 2);
    }

    #[test]
    fn test_trigger_switches_bound_tiles() {
        let mut map = room(4, 4);
        let index = map
            .add_animated_tile(AnimatedTile::still(&[masks::FILLED, masks::EMPTY]))
            .unwrap();
        map.set_tile(1, 1, LayerTile::animated(index)).unwrap();
        map.set_tile_event_flags(1, 1, TileModifier::Trigger, [3, 0]).unwrap();

        assert!(!plain_query(&mut map));
        map.set_trigger(3, true);
        assert!(map.trigger(3));
        assert!(plain_query(&mut map));

        // Same state again is ignored
        map.set_trigger(3, true);
        map.set_trigger(3, false);
        assert!(!plain_query(&mut map));

        assert_eq!(
            map.drain_events(),
            vec![
                TileEvent::TriggerChanged { trigger_id: 3, state: true },
                TileEvent::TriggerChanged { trigger_id: 3, state: false },
            ]
        );
    }

    #[test]
    fn test_unknown_trigger_is_ignored() {
        let mut map = room(2, 2);
        map.set_trigger(200, true);
        assert!(!map.trigger(200));
        assert!(map.pending_events().is_empty());
    }
}
