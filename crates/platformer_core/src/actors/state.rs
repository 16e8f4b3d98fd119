//! Actor state and movement flags

use bitflags::bitflags;

bitflags! {
    /// Collision and movement state of an actor
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ActorState: u32 {
        /// Standing on the ground; grounded movement probes slopes
        const CAN_JUMP = 1 << 0;
        /// Solid tile pixels block the actor
        const COLLIDE_WITH_TILESET = 1 << 1;
        /// Reported in broad phase pairs
        const COLLIDE_WITH_OTHER_ACTORS = 1 << 2;
        /// Solid actors block the actor
        const COLLIDE_WITH_SOLID_OBJECTS = 1 << 3;
        /// Moves never mark the proxy dirty
        const FORCE_DISABLE_COLLISIONS = 1 << 4;
        /// Position changed since the proxy was last moved
        const IS_DIRTY = 1 << 5;
        /// Removed at the next collision resolution
        const IS_DESTROYED = 1 << 6;
        /// Level gravity pulls the actor down
        const APPLY_GRAVITATION = 1 << 7;
        /// Blocks actors that collide with solid objects
        const IS_SOLID_OBJECT = 1 << 8;
        /// Solid only for actors moving downwards
        const IS_ONE_WAY_SOLID = 1 << 9;
        /// Pair handlers should skip sprite-accurate tests
        const SKIP_PER_PIXEL_COLLISIONS = 1 << 10;
        /// Tall actors only test their feet and head against tiles
        const COLLIDE_WITH_TILESET_REDUCED = 1 << 11;
        /// Only solid actors below the mover's center block it
        const COLLIDE_WITH_SOLID_OBJECTS_BELOW = 1 << 12;
        /// Two actors with this flag ignore each other as solids
        const EXCLUDE_SIMILAR = 1 << 13;
        /// Ignores damage
        const IS_INVULNERABLE = 1 << 14;
        /// Sprite faces left
        const IS_FACING_LEFT = 1 << 15;
    }
}

impl ActorState {
    /// Flags of an actor that falls, collides with tiles and with other actors
    pub fn standard() -> Self {
        Self::APPLY_GRAVITATION | Self::COLLIDE_WITH_TILESET | Self::COLLIDE_WITH_OTHER_ACTORS
    }
}

bitflags! {
    /// How [`ActorBody::move_instantly`](super::ActorBody::move_instantly) interprets its target
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MoveType: u8 {
        /// Target is an absolute position
        const ABSOLUTE = 0;
        /// Target is an offset from the current position
        const RELATIVE = 0x01;
        /// Skip the emptiness test
        const FORCE = 0x02;
    }
}

bitflags! {
    /// Axes that stopped a movement step
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BlockedAxes: u8 {
        /// Landed on or walked along the ground
        const FLOOR = 0x01;
        /// Bumped into a ceiling
        const CEILING = 0x02;
        /// Ran into a wall
        const WALL = 0x04;
    }
}
