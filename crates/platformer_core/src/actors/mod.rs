//! Actors as seen by the collision core
//!
//! An actor is reduced to its [`ActorBody`]: position, speed, forces, flags
//! and hitbox. Gameplay behavior lives outside the core and reacts to the
//! [`BlockedAxes`] returned by the movement stepper.

mod body;
mod movement;
mod state;

pub use body::{ActorBody, ActorCapabilities};
pub use movement::{is_tile_area_empty, CollisionEnvironment, TileEnvironment};
pub use state::{ActorState, BlockedAxes, MoveType};
