//! Axis-aligned 2D extents

use crate::foundation::math::Vec2;

/// Axis-aligned rectangle with `+Y` up, so `top >= bottom` when non-empty
///
/// The frustum uses it for the view-space extents of the near plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Minimum X
    pub left: f32,
    /// Maximum Y
    pub top: f32,
    /// Maximum X
    pub right: f32,
    /// Minimum Y
    pub bottom: f32,
}

impl Rect {
    /// Create a rectangle from its four edges
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Overwrite all four edges
    pub fn reset(&mut self, left: f32, top: f32, right: f32, bottom: f32) {
        *self = Self::new(left, top, right, bottom);
    }

    /// Lower-left corner
    pub fn min_bound(&self) -> Vec2 {
        Vec2::new(self.left, self.bottom)
    }

    /// Upper-right corner
    pub fn max_bound(&self) -> Vec2 {
        Vec2::new(self.right, self.top)
    }

    /// Horizontal size
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Vertical size
    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    /// Midpoint
    pub fn center(&self) -> Vec2 {
        (self.min_bound() + self.max_bound()) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_and_size() {
        let mut rect = Rect::new(-2.0, 1.0, 4.0, -1.0);
        assert_eq!(rect.min_bound(), Vec2::new(-2.0, -1.0));
        assert_eq!(rect.max_bound(), Vec2::new(4.0, 1.0));
        assert_eq!(rect.width(), 6.0);
        assert_eq!(rect.height(), 2.0);
        assert_eq!(rect.center(), Vec2::new(1.0, 0.0));

        rect.reset(0.0, 0.0, 0.0, 0.0);
        assert_eq!(rect, Rect::default());
    }
}
