//! Integer cell geometry.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// A position or dimension on the terminal grid, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// Column (x) component.
    pub x: i32,
    /// Row (y) component.
    pub y: i32,
}

impl Vec2 {
    /// The origin / zero extent.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a new vector.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Inclusive containment on both axes: `lo <= self <= hi`.
    #[must_use]
    pub fn within(self, lo: Self, hi: Self) -> bool {
        self.x >= lo.x && self.x <= hi.x && self.y >= lo.y && self.y <= hi.y
    }
}

/// An axis-aligned rectangle: origin plus extent, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner.
    pub pos: Vec2,
    /// Width and height.
    pub size: Vec2,
}

impl Rect {
    /// Create a rectangle from origin and extent.
    #[must_use]
    pub const fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    /// Whether the rectangle covers no cells.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.size.x <= 0 || self.size.y <= 0
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_arithmetic() {
        let a = Vec2::new(3, 4);
        let b = Vec2::new(1, -2);
        assert_eq!(a + b, Vec2::new(4, 2));
        assert_eq!(a - b, Vec2::new(2, 6));
    }

    #[test]
    fn test_within_is_inclusive() {
        let lo = Vec2::ZERO;
        let hi = Vec2::new(4, 4);
        assert!(Vec2::new(0, 0).within(lo, hi));
        assert!(Vec2::new(4, 4).within(lo, hi));
        assert!(!Vec2::new(5, 0).within(lo, hi));
        assert!(!Vec2::new(0, 5).within(lo, hi));
    }
}
