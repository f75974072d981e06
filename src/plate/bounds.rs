//! The plate's bounding rectangle inside the toroidal world.

use glam::Vec2;

use crate::world::WorldDimension;

/// A plate's current rectangle: fractional top-left world position plus
/// integer extents.
///
/// Kinematic integration moves the position by sub-cell amounts; indexing
/// floors it. The rectangle may cross either world seam, in which case
/// `right()`/`bottom()` run past the world side without wrapping — the
/// mapping back into `[0, W) × [0, H)` happens per lookup.
#[derive(Debug, Clone)]
pub struct Bounds {
    world: WorldDimension,
    pos: Vec2,
    width: u32,
    height: u32,
}

impl Bounds {
    /// # Panics
    /// Panics if either extent is zero or exceeds the world's.
    pub fn new(world: WorldDimension, pos: Vec2, width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "plate extents must be positive");
        assert!(
            width <= world.width() && height <= world.height(),
            "plate cannot be larger than its world"
        );
        Self {
            world,
            pos: world.normalize_f(pos),
            width,
            height,
        }
    }

    pub fn world(&self) -> WorldDimension {
        self.world
    }

    /// Top-left world position, fractional.
    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// World column of the leftmost plate cell.
    pub fn left(&self) -> u32 {
        self.pos.x as u32
    }

    /// World row of the topmost plate cell.
    pub fn top(&self) -> u32 {
        self.pos.y as u32
    }

    /// World column of the rightmost plate cell. Not wrapped: a plate
    /// crossing the seam reports a column past the world side.
    pub fn right(&self) -> u32 {
        self.left() + self.width - 1
    }

    /// World row of the bottommost plate cell, not wrapped.
    pub fn bottom(&self) -> u32 {
        self.top() + self.height - 1
    }

    /// Moves the rectangle, wrapping the position back onto the torus.
    /// Sub-cell fractions are preserved.
    pub fn shift(&mut self, dx: f32, dy: f32) {
        self.pos = self.world.normalize_f(self.pos + Vec2::new(dx, dy));
    }

    /// Expands the extents. Copying the map contents into the enlarged
    /// buffers is the owner's job.
    pub fn grow(&mut self, dw: u32, dh: u32) {
        self.width += dw;
        self.height += dh;
        assert!(
            self.width <= self.world.width() && self.height <= self.world.height(),
            "plate cannot outgrow its world"
        );
    }

    /// True when fractional local coordinates land inside the rectangle.
    pub fn is_in_limits(&self, fx: f32, fy: f32) -> bool {
        fx >= 0.0 && fy >= 0.0 && (fx as u32) < self.width && (fy as u32) < self.height
    }

    /// Local index for fractional local coordinates; floors both axes.
    /// The caller has already checked [`is_in_limits`](Self::is_in_limits).
    pub fn index_f(&self, fx: f32, fy: f32) -> usize {
        debug_assert!(self.is_in_limits(fx, fy));
        fy as usize * self.width as usize + fx as usize
    }

    /// Local index for integer local coordinates.
    pub fn index_of(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y as usize * self.width as usize + x as usize
    }

    /// Maps world coordinates to local ones, wrapping across whichever
    /// world seams the rectangle crosses. Returns `(x, y, index)` when
    /// the point lies on the plate.
    pub fn world_to_local(&self, wx: u32, wy: u32) -> Option<(u32, u32, usize)> {
        let (wx, wy) = self.world.normalize(wx, wy);
        let lx = (wx + self.world.width() - self.left()) % self.world.width();
        let ly = (wy + self.world.height() - self.top()) % self.world.height();
        (lx < self.width && ly < self.height).then(|| (lx, ly, self.index_of(lx, ly)))
    }

    /// Like [`world_to_local`](Self::world_to_local) for points
    /// guaranteed to be on the plate.
    ///
    /// # Panics
    /// Panics when the point is outside the plate; that is an engine bug,
    /// not a user error.
    pub fn world_to_local_unchecked(&self, wx: u32, wy: u32) -> (u32, u32, usize) {
        self.world_to_local(wx, wy)
            .unwrap_or_else(|| panic!("world point ({wx}, {wy}) is not on the plate"))
    }
}
