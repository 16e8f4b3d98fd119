//! Axis-aligned bounding box in screen space
//!
//! Boxes are stored as left/top/right/bottom edges with Y growing downwards,
//! the same orientation the tile grid uses. A box whose edges are all zero
//! (`Aabb::default()`) is the conventional "empty" result of a failed
//! intersection.

use std::ops::{Add, AddAssign, Sub, SubAssign};

use crate::foundation::math::Vec2;

/// 2D axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aabb {
    /// Left edge
    pub left: f32,
    /// Top edge
    pub top: f32,
    /// Right edge
    pub right: f32,
    /// Bottom edge
    pub bottom: f32,
}

impl Aabb {
    /// Create a box from its four edges
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Create a box from a center point and half extents
    pub fn from_center_extents(center: Vec2, half_extents: Vec2) -> Self {
        Self::new(
            center.x - half_extents.x,
            center.y - half_extents.y,
            center.x + half_extents.x,
            center.y + half_extents.y,
        )
    }

    /// Width of the box
    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Height of the box
    #[inline]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Center point
    pub fn center(&self) -> Vec2 {
        Vec2::new((self.left + self.right) * 0.5, (self.top + self.bottom) * 0.5)
    }

    /// Half extents
    pub fn extents(&self) -> Vec2 {
        Vec2::new(self.width() * 0.5, self.height() * 0.5)
    }

    /// Perimeter, used as the surface-area heuristic cost in 2D
    #[inline]
    pub fn perimeter(&self) -> f32 {
        2.0 * (self.width() + self.height())
    }

    /// Edges are ordered (`left <= right`, `top <= bottom`) and finite
    pub fn is_valid(&self) -> bool {
        self.left <= self.right
            && self.top <= self.bottom
            && self.left.is_finite()
            && self.top.is_finite()
            && self.right.is_finite()
            && self.bottom.is_finite()
    }

    /// Strict point containment with an epsilon guard against rounding
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x > self.left + f32::EPSILON
            && point.x < self.right - f32::EPSILON
            && point.y > self.top + f32::EPSILON
            && point.y < self.bottom - f32::EPSILON
    }

    /// `other` lies completely inside this box; touching edges count as inside
    #[inline]
    pub fn contains(&self, other: &Self) -> bool {
        self.left <= other.left
            && self.top <= other.top
            && other.right <= self.right
            && other.bottom <= self.bottom
    }

    /// Boxes share at least one point; touching edges count as overlapping
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.left <= other.right
            && self.top <= other.bottom
            && self.right >= other.left
            && self.bottom >= other.top
    }

    /// Smallest box enclosing both boxes
    #[inline]
    pub fn combine(&self, other: &Self) -> Self {
        Self::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// Shared region of both boxes, or the empty default when they are disjoint
    pub fn intersection(&self, other: &Self) -> Self {
        if !self.overlaps(other) {
            return Self::default();
        }

        Self::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        )
    }

    /// Grow every edge outwards by `margin`
    pub fn inflated(&self, margin: f32) -> Self {
        Self::new(
            self.left - margin,
            self.top - margin,
            self.right + margin,
            self.bottom + margin,
        )
    }

    /// Stretch the box along `displacement`, keeping the opposite edges fixed
    pub fn swept(&self, displacement: Vec2) -> Self {
        let mut result = *self;
        if displacement.x < 0.0 {
            result.left += displacement.x;
        } else {
            result.right += displacement.x;
        }
        if displacement.y < 0.0 {
            result.top += displacement.y;
        } else {
            result.bottom += displacement.y;
        }
        result
    }
}

impl Add<Vec2> for Aabb {
    type Output = Self;

    fn add(self, offset: Vec2) -> Self {
        Self::new(
            self.left + offset.x,
            self.top + offset.y,
            self.right + offset.x,
            self.bottom + offset.y,
        )
    }
}

impl AddAssign<Vec2> for Aabb {
    fn add_assign(&mut self, offset: Vec2) {
        *self = *self + offset;
    }
}

impl Sub<Vec2> for Aabb {
    type Output = Self;

    fn sub(self, offset: Vec2) -> Self {
        self + (-offset)
    }
}

impl SubAssign<Vec2> for Aabb {
    fn sub_assign(&mut self, offset: Vec2) {
        *self = *self - offset;
    }
}
