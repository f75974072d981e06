//! Running crust mass and center-of-mass bookkeeping.

use glam::DVec2;

/// Total crust mass of a plate and its center of mass in local map
/// coordinates.
///
/// Incrementally maintained through [`inc`](Self::inc) whenever a single
/// cell changes; rebuilt from scratch with a [`MassBuilder`] after
/// operations that touch many cells at once.
#[derive(Debug, Clone, Copy)]
pub struct Mass {
    total: f64,
    center: DVec2,
}

impl Mass {
    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn center(&self) -> DVec2 {
        self.center
    }

    /// True when the plate holds no crust at all. A null plate is
    /// eligible for removal by the driver.
    pub fn is_null(&self) -> bool {
        self.total <= 0.0
    }

    /// Adjusts the running total after a single cell's height change.
    pub fn inc(&mut self, dm: f32) {
        self.total += dm as f64;
        if self.total < 0.0 {
            self.total = 0.0;
        }
    }
}

/// Accumulates cells into a fresh [`Mass`].
#[derive(Debug, Default)]
pub struct MassBuilder {
    total: f64,
    weighted: DVec2,
}

impl MassBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_point(&mut self, x: u32, y: u32, m: f32) {
        debug_assert!(m >= 0.0, "crust mass cannot be negative");
        let m = m as f64;
        self.total += m;
        self.weighted += DVec2::new(x as f64, y as f64) * m;
    }

    pub fn build(self) -> Mass {
        if self.total <= 0.0 {
            return Mass {
                total: 0.0,
                center: DVec2::ZERO,
            };
        }
        Mass {
            total: self.total,
            center: self.weighted / self.total,
        }
    }
}
