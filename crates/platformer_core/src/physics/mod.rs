//! Physics module for actor-vs-actor collision detection
//!
//! Provides the broad phase that turns "proxies that moved this tick" into
//! candidate collision pairs. Exact tests against the tile world live in
//! [`crate::tiles`].

pub mod broad_phase;

pub use broad_phase::{BroadPhase, ProxyPair};
