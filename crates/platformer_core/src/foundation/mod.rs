//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the core:
//! - Math types and operations
//! - The axis-aligned bounding box primitive
//! - Logging utilities

pub mod aabb;
pub mod math;
pub mod logging;

pub use aabb::Aabb;
pub use math::{Vec2, Vec2i};
