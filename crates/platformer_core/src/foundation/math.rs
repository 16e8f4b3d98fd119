//! Math utilities and types
//!
//! Provides the fundamental 2D math types used by the collision core.

pub use nalgebra::Vector2;

/// 2D vector type (positions, speeds, displacements)
pub type Vec2 = Vector2<f32>;

/// 2D integer vector type (tile coordinates, layout sizes)
pub type Vec2i = Vector2<i32>;

/// Signed unit step in the direction of `value` (`-1.0` for zero and below)
///
/// Matches how movement probes pick a scan direction: a zero speed scans
/// towards negative coordinates.
#[inline]
pub fn scan_sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else {
        -1.0
    }
}
