//! # Platformer Core
//!
//! Collision and movement core for a 2D tile-based platformer.
//!
//! ## Features
//!
//! - **Dynamic AABB tree**: Broad phase for actor-vs-actor pairs and area queries
//! - **Pixel-exact tiles**: Per-pixel tile masks with one-way, flipped and animated tiles
//! - **Destructible tiles**: Weapon, speed, special, collapsing and trigger tiles
//! - **Actor movement**: Sub-stepped stepper with slopes, step-ups and unstuck nudges
//!
//! ## Quick Start
//!
//! ```rust
//! use platformer_core::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tiles = TileMap::empty(16, 16, PitType::StandOnPlatform)?;
//!     let mut level = Level::new(tiles, SimulationConfig::default())?;
//!
//!     let player = level.spawn_actor(
//!         ActorBody::new(Vec2::new(64.0, 64.0), ActorState::standard()).with_hitbox(20, 30),
//!     );
//!
//!     let mut params = level.actor(player).ok_or("missing actor")?.default_collision_params();
//!     level.step_actor(player, 1.0, &mut params)?;
//!     level.resolve_collisions(1.0, |_a, _b| {});
//!     level.update(1.0);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod spatial;
pub mod physics;
pub mod tiles;
pub mod actors;
pub mod level;

/// Common imports for users of the core
pub mod prelude {
    pub use crate::{
        actors::{ActorBody, ActorCapabilities, ActorState, BlockedAxes, CollisionEnvironment, MoveType, TileEnvironment},
        config::{Config, ConfigError, LevelConfig, MovementConfig, SimulationConfig},
        foundation::{Aabb, Vec2, Vec2i},
        level::{ActorId, Level, LevelError},
        physics::BroadPhase,
        spatial::{DynamicTree, ProxyId},
        tiles::{
            AnimatedTile, LayerTile, PitType, TileCollisionParams, TileDestructType, TileEvent, TileMap,
            TileMapError, TileModifier, TileSet,
        },
    };
}
