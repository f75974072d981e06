//! Neighbor-crust sampling for the erosion passes.

use crate::grid::HeightMap;

use super::bounds::Bounds;

/// Heights and indices of a cell's four cardinal neighbors.
///
/// A neighbor's crust is reported only when the neighbor lies inside the
/// plate — wrapping across the world seam only when the plate spans the
/// whole world on that axis — and is strictly lower than the center cell.
/// Otherwise the crust is 0 and, for neighbors off the plate entirely,
/// the index points back at the center cell. Plate-edge cells therefore
/// never qualify as river sources.
#[derive(Debug, Clone, Copy)]
pub struct NeighborCrust {
    pub west: f32,
    pub east: f32,
    pub north: f32,
    pub south: f32,
    pub west_i: usize,
    pub east_i: usize,
    pub north_i: usize,
    pub south_i: usize,
}

impl NeighborCrust {
    /// True when all four neighbors are inside the plate and strictly
    /// lower than the center: the cell is a summit, a river source.
    pub fn all_lower(&self) -> bool {
        self.west * self.east * self.north * self.south != 0.0
    }

    /// True when no neighbor qualifies: the cell is the lowest spot of
    /// its neighborhood (or sits at a plate edge).
    pub fn none_lower(&self) -> bool {
        self.west + self.east + self.north + self.south == 0.0
    }
}

/// Samples the four neighbors of local cell `(x, y)` at `index`.
pub fn neighbor_crust(x: u32, y: u32, index: usize, map: &HeightMap, bounds: &Bounds) -> NeighborCrust {
    let width = bounds.width();
    let height = bounds.height();
    let world = bounds.world();
    let wraps_x = width == world.width();
    let wraps_y = height == world.height();
    let row = width as usize;

    let west_ok = x > 0 || wraps_x;
    let east_ok = x + 1 < width || wraps_x;
    let north_ok = y > 0 || wraps_y;
    let south_ok = y + 1 < height || wraps_y;

    let west_i = if west_ok {
        y as usize * row + ((x + width - 1) % width) as usize
    } else {
        index
    };
    let east_i = if east_ok {
        y as usize * row + ((x + 1) % width) as usize
    } else {
        index
    };
    let north_i = if north_ok {
        ((y + height - 1) % height) as usize * row + x as usize
    } else {
        index
    };
    let south_i = if south_ok {
        ((y + 1) % height) as usize * row + x as usize
    } else {
        index
    };

    let center = map[index];
    let pick = |ok: bool, i: usize| {
        if ok && map[i] < center {
            map[i]
        } else {
            0.0
        }
    };

    NeighborCrust {
        west: pick(west_ok, west_i),
        east: pick(east_ok, east_i),
        north: pick(north_ok, north_i),
        south: pick(south_ok, south_i),
        west_i,
        east_i,
        north_i,
        south_i,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::WorldDimension;
    use glam::Vec2;

    fn bounds(world_w: u32, world_h: u32, w: u32, h: u32) -> Bounds {
        Bounds::new(WorldDimension::new(world_w, world_h), Vec2::ZERO, w, h)
    }

    #[test]
    fn test_summit_sees_all_lower_neighbors() {
        // 3x3 island inside a larger world; center cell is the summit.
        let b = bounds(8, 8, 3, 3);
        let map = HeightMap::from_slice(3, 3, &[1.0, 1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0]);
        let nb = neighbor_crust(1, 1, 4, &map, &b);
        assert!(nb.all_lower());
        assert_eq!((nb.west, nb.east, nb.north, nb.south), (1.0, 1.0, 1.0, 1.0));
        assert_eq!((nb.west_i, nb.east_i, nb.north_i, nb.south_i), (3, 5, 1, 7));
    }

    #[test]
    fn test_edge_cell_is_never_a_source() {
        let b = bounds(8, 8, 3, 3);
        let map = HeightMap::from_slice(3, 3, &[9.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        // (0, 0) is taller than everything but sits on the plate edge.
        let nb = neighbor_crust(0, 0, 0, &map, &b);
        assert!(!nb.all_lower());
        assert_eq!(nb.west, 0.0);
        assert_eq!(nb.west_i, 0);
    }

    #[test]
    fn test_world_spanning_plate_wraps() {
        // Plate is the whole 3x3 world, so every edge wraps.
        let b = bounds(3, 3, 3, 3);
        let map = HeightMap::from_slice(3, 3, &[9.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        let nb = neighbor_crust(0, 0, 0, &map, &b);
        assert!(nb.all_lower());
        assert_eq!(nb.west_i, 2);
        assert_eq!(nb.north_i, 6);
    }

    #[test]
    fn test_higher_neighbors_report_zero_crust() {
        let b = bounds(8, 8, 3, 1);
        let map = HeightMap::from_slice(3, 1, &[4.0, 2.0, 4.0]);
        let nb = neighbor_crust(1, 0, 1, &map, &b);
        // Both x neighbors are higher; y neighbors are off the plate.
        assert!(nb.none_lower());
        assert_eq!(nb.west_i, 0);
        assert_eq!(nb.north_i, 1);
    }
}
