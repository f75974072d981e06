//! World dimensions and toroidal coordinate wrapping.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// The wraparound extent of the global simulation space.
///
/// All world coordinates are taken modulo the world's sides. Plates float
/// inside this torus and may cross either seam, so every coordinate that
/// leaves the `[0, W) × [0, H)` window must be normalized back into it
/// before indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldDimension {
    width: u32,
    height: u32,
}

impl WorldDimension {
    /// Creates a world of `width × height` cells.
    ///
    /// # Panics
    /// Panics if either side is zero.
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "world sides must be positive");
        Self { width, height }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells in the world.
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Wraps an x coordinate into `[0, width)`.
    pub fn x_mod(&self, x: u32) -> u32 {
        x % self.width
    }

    /// Wraps a y coordinate into `[0, height)`.
    pub fn y_mod(&self, y: u32) -> u32 {
        y % self.height
    }

    /// Wraps a world coordinate pair onto the torus.
    pub fn normalize(&self, x: u32, y: u32) -> (u32, u32) {
        (x % self.width, y % self.height)
    }

    /// Wraps a fractional position into `[0, width) × [0, height)`,
    /// preserving the sub-cell fraction.
    pub fn normalize_f(&self, pos: Vec2) -> Vec2 {
        Vec2::new(
            pos.x.rem_euclid(self.width as f32),
            pos.y.rem_euclid(self.height as f32),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_wraps_both_axes() {
        let world = WorldDimension::new(8, 4);
        assert_eq!(world.normalize(7, 3), (7, 3));
        assert_eq!(world.normalize(8, 4), (0, 0));
        assert_eq!(world.normalize(19, 9), (3, 1));
    }

    #[test]
    fn test_normalize_f_preserves_fraction() {
        let world = WorldDimension::new(8, 4);
        let p = world.normalize_f(Vec2::new(9.25, -0.5));
        assert!((p.x - 1.25).abs() < 1e-6);
        assert!((p.y - 3.5).abs() < 1e-6);
    }

    #[test]
    #[should_panic]
    fn test_zero_side_rejected() {
        WorldDimension::new(0, 4);
    }
}
