//! Plate core: a moving, deformable patch of crust and the geophysical
//! operations the world driver runs on it every simulation step.
//!
//! A plate owns its bounds, height and age maps, mass tracker, movement
//! state, continent table, and random stream exclusively. Cross-plate
//! operations ([`Plate::collide`], [`Plate::aggregate_crust`]) receive
//! the peer by exclusive reference and briefly mutate both sides.
//!
//! Map indices are invalidated by any operation that can grow the plate;
//! every operation here re-derives indices after a potential growth.

mod bounds;
mod erosion;
mod flood_fill;
mod mass;
mod movement;
mod neighbors;
mod segments;

pub use bounds::Bounds;
pub use mass::{Mass, MassBuilder};
pub use movement::Movement;
pub use segments::{ContinentId, SegmentData, Segments, UNASSIGNED};

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::config::PlateParams;
use crate::grid::{AgeMap, HeightMap};
use crate::world::WorldDimension;

/// Crust extension happens in tiles of this many cells per axis.
const GROWTH_STRIDE: u32 = 8;

/// Reach of the subduction drop point along the impactor's velocity.
const SUBDUCTION_REACH: f32 = 10.0;

/// Amplitude of the cubed random jitter added to the drop point.
const SUBDUCTION_JITTER: f32 = 3.0;

/// Contract violations when constructing a plate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlateError {
    #[error("plate dimensions must be positive, got {width}x{height}")]
    EmptyPlate { width: u32, height: u32 },
    #[error("heightmap holds {actual} cells but the plate needs {expected}")]
    HeightmapSizeMismatch { expected: usize, actual: usize },
    #[error("a {width}x{height} plate does not fit a {world_width}x{world_height} world")]
    PlateLargerThanWorld {
        width: u32,
        height: u32,
        world_width: u32,
        world_height: u32,
    },
}

/// A rectangular patch of crust with velocity and rotation, floating in a
/// toroidal world.
#[derive(Debug, Clone)]
pub struct Plate {
    rng: ChaCha8Rng,
    params: PlateParams,
    bounds: Bounds,
    map: HeightMap,
    age_map: AgeMap,
    mass: Mass,
    movement: Movement,
    segments: Segments,
}

impl Plate {
    /// Builds a plate from a source heightmap.
    ///
    /// Every cell of `heightmap` is copied; cells with crust get
    /// `plate_age` as their age, bare cells get 0. `(x, y)` is the
    /// plate's initial top-left world position.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        seed: u64,
        heightmap: &[f32],
        width: u32,
        height: u32,
        x: u32,
        y: u32,
        plate_age: u32,
        world: WorldDimension,
        params: PlateParams,
    ) -> Result<Self, PlateError> {
        if width == 0 || height == 0 {
            return Err(PlateError::EmptyPlate { width, height });
        }
        if width > world.width() || height > world.height() {
            return Err(PlateError::PlateLargerThanWorld {
                width,
                height,
                world_width: world.width(),
                world_height: world.height(),
            });
        }
        let area = width as usize * height as usize;
        if heightmap.len() != area {
            return Err(PlateError::HeightmapSizeMismatch {
                expected: area,
                actual: heightmap.len(),
            });
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let movement = Movement::new(&mut rng, world, params.initial_speed);
        let bounds = Bounds::new(world, Vec2::new(x as f32, y as f32), width, height);

        let map = HeightMap::from_slice(width, height, heightmap);
        let mut age_map = AgeMap::new(width, height);
        let mut builder = MassBuilder::new();
        for ly in 0..height {
            for lx in 0..width {
                let i = bounds.index_of(lx, ly);
                builder.add_point(lx, ly, map[i]);
                if map[i] > 0.0 {
                    age_map[i] = plate_age;
                }
            }
        }

        Ok(Self {
            rng,
            params,
            bounds,
            map,
            age_map,
            mass: builder.build(),
            movement,
            segments: Segments::new(area),
        })
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Total crust mass. Zero means the plate is null and the driver may
    /// drop it.
    pub fn mass(&self) -> f64 {
        self.mass.total()
    }

    pub fn is_empty(&self) -> bool {
        self.mass.is_null()
    }

    pub fn velocity(&self) -> Vec2 {
        self.movement.velocity()
    }

    /// Crust thickness at a world point; 0 for points off the plate.
    pub fn crust(&self, x: u32, y: u32) -> f32 {
        match self.bounds.world_to_local(x, y) {
            Some((_, _, i)) => self.map[i],
            None => 0.0,
        }
    }

    /// Crust age at a world point; 0 for points off the plate.
    pub fn crust_timestamp(&self, x: u32, y: u32) -> u32 {
        match self.bounds.world_to_local(x, y) {
            Some((_, _, i)) => self.age_map[i],
            None => 0,
        }
    }

    /// Read-only views of the height and age maps, row-major, both of
    /// length `width * height`. Invalidated by any growing operation.
    pub fn maps(&self) -> (&[f32], &[u32]) {
        (self.map.as_slice(), self.age_map.as_slice())
    }

    /// Sets the crust at world point `(x, y)` to `z` (clamped at 0) with
    /// timestamp `t`, extending the plate when the point lies outside it.
    ///
    /// Merging into existing crust averages the two ages weighted by
    /// mass; setting `z = 0` leaves the old age untouched.
    pub fn set_crust(&mut self, x: u32, y: u32, z: f32, t: u32) {
        let z = z.max(0.0);
        let index = match self.bounds.world_to_local(x, y) {
            Some((_, _, i)) => i,
            None => self.extend_to_contain(x, y, z),
        };

        let old = self.map[index];
        let mut t = t;
        if old > 0.0 && z > 0.0 {
            t = ((old * self.age_map[index] as f32 + z * t as f32) / (old + z)) as u32;
        }
        if z > 0.0 {
            self.age_map[index] = t;
        }

        self.mass.inc(-old);
        self.mass.inc(z);
        self.map[index] = z;
    }

    /// Deposits colliding crust at a world point and records the cell as
    /// part of `continent`. Extends the plate when necessary.
    pub fn add_crust_by_collision(
        &mut self,
        x: u32,
        y: u32,
        z: f32,
        time: u32,
        continent: ContinentId,
    ) {
        self.set_crust(x, y, self.crust(x, y) + z, time);

        let (lx, ly, index) = self.bounds.world_to_local_unchecked(x, y);
        self.segments.set_id(index, continent);
        let data = self.segments.get_mut(continent);
        data.inc_area();
        data.enlarge_to_contain(lx, ly);
    }

    /// Deposits subducting crust "inland" from the entry point `(x, y)`.
    ///
    /// `(dx, dy)` is the impacting plate's velocity. Only the component
    /// not shared with this plate's own motion steers the drop point,
    /// which is then jittered by a cubed uniform draw. Nothing happens
    /// when the drop point leaves the plate or lands on bare ocean floor.
    pub fn add_crust_by_subduction(&mut self, x: u32, y: u32, z: f32, t: u32, dx: f32, dy: f32) {
        let (lx, ly, _) = self.bounds.world_to_local_unchecked(x, y);

        let shared = self.movement.dot(dx, dy) > 0.0;
        let dx = dx - self.movement.velocity_on_x(shared);
        let dy = dy - self.movement.velocity_on_y(shared);

        let offset = self.rng.random::<f32>();
        let offset_sign = if self.rng.random::<u32>() & 1 == 1 { 1.0 } else { -1.0 };
        let offset = offset_sign * offset * offset * offset;

        let fx = lx as f32 + SUBDUCTION_REACH * dx + SUBDUCTION_JITTER * offset;
        let fy = ly as f32 + SUBDUCTION_REACH * dy + SUBDUCTION_JITTER * offset;

        if z > 0.0 && self.bounds.is_in_limits(fx, fy) {
            let index = self.bounds.index_f(fx, fy);
            if self.map[index] > 0.0 {
                let age = (self.map[index] * self.age_map[index] as f32 + z * t as f32)
                    / (self.map[index] + z);
                self.age_map[index] = age as u32;
                self.map[index] += z;
                self.mass.inc(z);
            }
        }
    }

    /// Records a collision at a world point and returns the area of the
    /// continent that was hit.
    pub fn add_collision(&mut self, wx: u32, wy: u32) -> u32 {
        let id = self.continent_at(wx, wy);
        let data = self.segments.get_mut(id);
        data.inc_coll_count();
        data.area()
    }

    /// Collision count of the continent at a world point, plus the count
    /// normalized by the continent's area.
    pub fn collision_info(&mut self, wx: u32, wy: u32) -> (u32, f32) {
        let id = self.continent_at(wx, wy);
        let data = self.segments.get(id);
        let count = data.coll_count();
        (count, count as f32 / (1 + data.area()) as f32)
    }

    /// Area of the continent at a world point. The continent must have
    /// been discovered already.
    pub fn continent_area(&self, wx: u32, wy: u32) -> u32 {
        let (_, _, index) = self.bounds.world_to_local_unchecked(wx, wy);
        let id = self.segments.id(index);
        assert!(
            (id as usize) < self.segments.len(),
            "continent area queried before discovery"
        );
        self.segments.get(id).area()
    }

    /// Continent id receiving crust from an aggregation at `(wx, wy)`.
    pub fn select_collision_segment(&mut self, wx: u32, wy: u32) -> ContinentId {
        self.continent_at(wx, wy)
    }

    /// Moves the whole continent under `(wx, wy)` onto `other`, returning
    /// the mass transferred.
    ///
    /// Continents collide at several points during one step; once the
    /// first hit has emptied the segment, later hits must see it gone and
    /// transfer nothing. The id bookkeeping is left intact for exactly
    /// that reason.
    pub fn aggregate_crust(&mut self, other: &mut Plate, wx: u32, wy: u32) -> f32 {
        let (lx, ly, _) = self.bounds.world_to_local_unchecked(wx, wy);
        let seg_id = self.continent_at(wx, wy);

        if !self.segments.get(seg_id).exists() {
            return 0.0;
        }

        let active = other.select_collision_segment(wx, wy);

        // Offset by a world period so the subtractions below stay
        // non-negative when the bbox wraps past the collision point.
        let wx = wx + self.bounds.world().width();
        let wy = wy + self.bounds.world().height();

        let old_mass = self.mass.total();
        let (left, right, top, bottom) = {
            let data = self.segments.get(seg_id);
            (data.left(), data.right(), data.top(), data.bottom())
        };

        let width = self.bounds.width();
        for y in top..=bottom {
            for x in left..=right {
                let i = (y * width + x) as usize;
                if self.segments.id(i) == seg_id && self.map[i] > 0.0 {
                    other.add_crust_by_collision(
                        wx + x - lx,
                        wy + y - ly,
                        self.map[i],
                        self.age_map[i],
                        active,
                    );
                    self.mass.inc(-self.map[i]);
                    self.map[i] = 0.0;
                }
            }
        }

        self.segments.get_mut(seg_id).mark_non_existent();
        (old_mass - self.mass.total()) as f32
    }

    /// Momentum exchange with another plate colliding at `(wx, wy)` with
    /// `coll_mass` worth of crust.
    pub fn collide(&mut self, other: &mut Plate, wx: u32, wy: u32, coll_mass: f32) {
        let (ax, ay, _) = self.bounds.world_to_local_unchecked(wx, wy);
        let (bx, by, _) = other.bounds.world_to_local_unchecked(wx, wy);
        let ap = Vec2::new(ax as f32, ay as f32) - self.mass.center().as_vec2();
        let bp = Vec2::new(bx as f32, by as f32) - other.mass.center().as_vec2();
        self.movement.collide(
            &mut other.movement,
            self.mass.total(),
            other.mass.total(),
            ap,
            bp,
            coll_mass,
            self.params.restitution,
        );
    }

    /// Slows the plate by the kinetic energy its deformation consumed.
    pub fn apply_friction(&mut self, deformed_mass: f32) {
        if !self.mass.is_null() {
            self.movement
                .apply_friction(deformed_mass, self.mass.total() as f32);
        }
    }

    /// Advances the plate one time step: kinematics first, then the
    /// bounds follow the velocity.
    pub fn step(&mut self) {
        self.movement.step();
        self.bounds
            .shift(self.movement.velocity_x(), self.movement.velocity_y());
    }

    /// Forgets all continent assignments; ids are re-derived lazily from
    /// the current heightmap.
    pub fn reset_segments(&mut self) {
        assert_eq!(
            self.bounds.area(),
            self.segments.area(),
            "segment table fell out of lockstep with the bounds"
        );
        self.segments.reset();
    }

    /// Continent id at a world point, flood-filling it on first touch.
    fn continent_at(&mut self, wx: u32, wy: u32) -> ContinentId {
        let (lx, ly, index) = self.bounds.world_to_local_unchecked(wx, wy);
        let id = self.segments.id(index);
        if (id as usize) < self.segments.len() {
            return id;
        }
        flood_fill::create_segment(
            &self.bounds,
            &self.map,
            &mut self.segments,
            lx,
            ly,
            self.params.continent_base,
        )
    }

    /// Grows the plate so world point `(x, y)` gains a cell, and returns
    /// that cell's index. Growth is quantized to whole
    /// [`GROWTH_STRIDE`]-cell tiles and clamped to the world's extents.
    fn extend_to_contain(&mut self, x: u32, y: u32, z: f32) -> usize {
        assert!(z > 0.0, "plate extension for zero crust");

        let world = self.bounds.world();
        let ww = world.width();
        let wh = world.height();
        let (x, y) = world.normalize(x, y);

        let ilft = self.bounds.left();
        let itop = self.bounds.top();
        let irgt = self.bounds.right();
        let ibtm = self.bounds.bottom();

        // Distance from the point to each plate edge, measured through a
        // seam where the geometry wraps. An underflowed candidate is at
        // least the world side and loses the comparisons below.
        let lft = ilft.wrapping_sub(x);
        let top = itop.wrapping_sub(y);
        let rgt = if x < ilft { x + ww } else { x }.wrapping_sub(irgt);
        let btm = if y < itop { y + wh } else { y }.wrapping_sub(ibtm);

        // The plate extends along at most one edge per axis.
        let d_lft = if lft < rgt && lft < ww { quantize(lft) } else { 0 };
        let d_rgt = if rgt <= lft && rgt < ww { quantize(rgt) } else { 0 };
        let d_top = if top < btm && top < wh { quantize(top) } else { 0 };
        let d_btm = if btm <= top && btm < wh { quantize(btm) } else { 0 };

        // Never outgrow the world; when clamped, all remaining room goes
        // to the trailing edge.
        let (d_lft, d_rgt) = if self.bounds.width() + d_lft + d_rgt > ww {
            (0, ww - self.bounds.width())
        } else {
            (d_lft, d_rgt)
        };
        let (d_top, d_btm) = if self.bounds.height() + d_top + d_btm > wh {
            (0, wh - self.bounds.height())
        } else {
            (d_top, d_btm)
        };

        assert!(
            d_lft + d_rgt + d_top + d_btm > 0,
            "extension requested but nowhere to grow"
        );

        let old_width = self.bounds.width();
        let old_height = self.bounds.height();

        self.bounds.shift(-(d_lft as f32), -(d_top as f32));
        self.bounds.grow(d_lft + d_rgt, d_top + d_btm);

        let new_width = self.bounds.width();
        let new_height = self.bounds.height();
        let mut map = HeightMap::new(new_width, new_height);
        let mut ages = AgeMap::new(new_width, new_height);
        let mut ids = vec![UNASSIGNED; self.bounds.area()];

        for j in 0..old_height {
            let dst = ((d_top + j) * new_width + d_lft) as usize;
            let src = (j * old_width) as usize;
            let n = old_width as usize;
            map.as_mut_slice()[dst..dst + n].copy_from_slice(&self.map.as_slice()[src..src + n]);
            ages.as_mut_slice()[dst..dst + n]
                .copy_from_slice(&self.age_map.as_slice()[src..src + n]);
            ids[dst..dst + n].copy_from_slice(&self.segments.ids()[src..src + n]);
        }

        self.map = map;
        self.age_map = ages;
        self.segments.reassign(ids);
        self.segments.shift(d_lft, d_top);

        let (_, _, index) = self.bounds.world_to_local_unchecked(x, y);
        index
    }
}

/// Rounds a growth delta up to whole tiles; any non-zero delta becomes a
/// positive multiple of [`GROWTH_STRIDE`].
fn quantize(d: u32) -> u32 {
    ((d > 0) as u32 + d / GROWTH_STRIDE) * GROWTH_STRIDE
}
