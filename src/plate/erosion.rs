//! Hydraulic erosion: river tracing plus flow-based crust redistribution.

use rand::Rng;

use crate::grid::HeightMap;

use super::mass::MassBuilder;
use super::neighbors::neighbor_crust;
use super::Plate;

impl Plate {
    /// Runs one erosion step over the whole plate.
    ///
    /// Three phases work on a scratch copy of the heightmap:
    /// 1. rivers flow downhill from every summit at or above
    ///    `lower_bound`, eroding each visited cell by a fraction of its
    ///    excess;
    /// 2. a light multiplicative noise pass perturbs every cell;
    /// 3. a flow pass moves crust from each tall cell to its lower
    ///    neighbors, weighted by slope, conserving mass.
    ///
    /// The mass tracker is rebuilt from scratch during the flow pass.
    pub fn erode(&mut self, lower_bound: f32) {
        let mut tmp = self.map.clone();
        let sources = self.find_river_sources(lower_bound);
        self.flow_rivers(lower_bound, sources, &mut tmp);

        // Add random noise (10 %) to the heightmap.
        for i in 0..tmp.len() {
            let alpha = self.params.noise_jitter * self.rng.random::<f32>();
            tmp[i] += self.params.noise_gain * tmp[i] - alpha * tmp[i];
        }

        std::mem::swap(&mut self.map, &mut tmp);
        tmp.set_all(0.0);

        let mut builder = MassBuilder::new();
        let width = self.bounds.width();
        let height = self.bounds.height();

        for y in 0..height {
            for x in 0..width {
                let index = self.bounds.index_of(x, y);
                let h = self.map[index];
                builder.add_point(x, y, h);
                // Accumulate: neighbors may already have deposited here.
                tmp[index] += h;

                if h < lower_bound {
                    continue;
                }

                let nb = neighbor_crust(x, y, index, &self.map, &self.bounds);
                if nb.none_lower() {
                    continue;
                }

                let nbrs = [
                    (nb.west, nb.west_i),
                    (nb.east, nb.east_i),
                    (nb.north, nb.north_i),
                    (nb.south, nb.south_i),
                ];
                // Off-plate and higher neighbors carry crust 0, so their
                // diff is the full cell height and never the minimum.
                let diffs = nbrs.map(|(crust, _)| h - crust);
                let min_diff = diffs.iter().copied().fold(f32::MAX, f32::min);
                let diff_sum: f32 = nbrs
                    .iter()
                    .zip(&diffs)
                    .filter(|((crust, _), _)| *crust > 0.0)
                    .map(|(_, d)| d - min_diff)
                    .sum();
                assert!(diff_sum >= 0.0, "erosion difference sum went negative");

                if diff_sum < min_diff {
                    // Not enough room below: level this cell with its
                    // lower neighbors, then share the remainder equally.
                    let mut receivers = 1u32;
                    for ((crust, i), d) in nbrs.iter().zip(&diffs) {
                        if *crust > 0.0 {
                            tmp[*i] += d - min_diff;
                            receivers += 1;
                        }
                    }
                    tmp[index] -= min_diff;

                    let share = (min_diff - diff_sum) / receivers as f32;
                    tmp[index] += share;
                    for (crust, i) in &nbrs {
                        if *crust > 0.0 {
                            tmp[*i] += share;
                        }
                    }
                } else {
                    // Drop to the tallest lower neighbor and spread the
                    // removed crust by relative slope.
                    let unit = min_diff / diff_sum;
                    tmp[index] -= min_diff;
                    for ((crust, i), d) in nbrs.iter().zip(&diffs) {
                        if *crust > 0.0 {
                            tmp[*i] += unit * (d - min_diff);
                        }
                    }
                }
            }
        }

        self.map = tmp;
        self.mass = builder.build();
    }

    /// Collects every summit: a cell at or above `lower_bound` whose four
    /// neighbors are all inside the plate and strictly lower. Plate-edge
    /// cells never qualify.
    fn find_river_sources(&self, lower_bound: f32) -> Vec<usize> {
        let mut sources = Vec::new();
        for y in 0..self.bounds.height() {
            for x in 0..self.bounds.width() {
                let index = self.bounds.index_of(x, y);
                if self.map[index] < lower_bound {
                    continue;
                }
                if neighbor_crust(x, y, index, &self.map, &self.bounds).all_lower() {
                    sources.push(index);
                }
            }
        }
        sources
    }

    /// Follows the steepest descent from every source, eroding each
    /// visited cell in `tmp` by a fraction of its excess and queuing the
    /// destination as the next generation of sinks. Every cell becomes a
    /// sink at most once per call.
    fn flow_rivers(&self, lower_bound: f32, mut sources: Vec<usize>, tmp: &mut HeightMap) {
        let width = self.bounds.width() as usize;
        let mut sinks: Vec<usize> = Vec::new();
        let mut enqueued = vec![false; self.bounds.area()];

        while !sources.is_empty() {
            while let Some(index) = sources.pop() {
                if self.map[index] < lower_bound {
                    continue;
                }

                let x = (index % width) as u32;
                let y = (index / width) as u32;
                let nb = neighbor_crust(x, y, index, &self.map, &self.bounds);

                // The lowest spot of its neighborhood: the river ends.
                if nb.none_lower() {
                    continue;
                }

                // Neighbors that do not qualify pretend to be as tall as
                // this cell so they lose the descent comparison.
                let h = self.map[index];
                let west = if nb.west > 0.0 { nb.west } else { h };
                let east = if nb.east > 0.0 { nb.east } else { h };
                let north = if nb.north > 0.0 { nb.north } else { h };
                let south = if nb.south > 0.0 { nb.south } else { h };

                let mut lowest = west;
                let mut dest = nb.west_i;
                if east < lowest {
                    lowest = east;
                    dest = nb.east_i;
                }
                if north < lowest {
                    lowest = north;
                    dest = nb.north_i;
                }
                if south < lowest {
                    dest = nb.south_i;
                }

                if !enqueued[dest] {
                    enqueued[dest] = true;
                    sinks.push(dest);
                }

                tmp[index] -= (tmp[index] - lower_bound) * self.params.river_erosion;
            }

            std::mem::swap(&mut sources, &mut sinks);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlateParams;
    use crate::world::WorldDimension;

    fn plate_3x3_peak() -> Plate {
        // A 9-unit peak in a field of ones, spanning its whole world so
        // every neighbor wraps.
        let heights = [9.0f32, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        Plate::new(
            7,
            &heights,
            3,
            3,
            0,
            0,
            1,
            WorldDimension::new(3, 3),
            PlateParams::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_erode_lowers_the_peak() {
        let mut plate = plate_3x3_peak();
        plate.erode(0.0);
        let (heights, _) = plate.maps();
        assert!(heights[0] < 9.0, "peak must lose crust, got {}", heights[0]);
    }

    #[test]
    fn test_erode_rebuilds_mass_from_cells() {
        let mut plate = plate_3x3_peak();
        let before = plate.mass();
        plate.erode(0.0);

        let sum: f64 = plate.maps().0.iter().map(|&h| h as f64).sum();
        assert!((plate.mass() - sum).abs() < 1e-4 * sum.max(1.0));
        // The noise pass scales by at most 1.1 per cell; rivers only
        // remove crust.
        assert!(plate.mass() <= before * 1.1 + 1e-4);
    }

    #[test]
    fn test_erode_keeps_heights_non_negative() {
        let mut plate = plate_3x3_peak();
        for _ in 0..8 {
            plate.erode(0.5);
            assert!(plate.maps().0.iter().all(|&h| h >= 0.0));
        }
    }

    #[test]
    fn test_local_maxima_do_not_rise() {
        // Interior peak inside a larger world (no wrap involved).
        let mut heights = vec![1.0f32; 25];
        heights[2 * 5 + 2] = 6.0;
        let mut plate = Plate::new(
            11,
            &heights,
            5,
            5,
            0,
            0,
            1,
            WorldDimension::new(16, 16),
            PlateParams {
                // Disable the noise pass so the comparison is exact.
                noise_gain: 0.0,
                noise_jitter: 0.0,
                ..Default::default()
            },
        )
        .unwrap();

        plate.erode(1.0);
        let (post, _) = plate.maps();
        assert!(post[2 * 5 + 2] <= 6.0);
    }

    #[test]
    fn test_flow_pass_conserves_mass_without_noise() {
        let mut heights = vec![1.0f32; 25];
        heights[2 * 5 + 2] = 6.0;
        heights[1 * 5 + 1] = 4.0;
        let mut plate = Plate::new(
            13,
            &heights,
            5,
            5,
            0,
            0,
            1,
            WorldDimension::new(16, 16),
            PlateParams {
                river_erosion: 0.0,
                noise_gain: 0.0,
                noise_jitter: 0.0,
                ..Default::default()
            },
        )
        .unwrap();

        let before = plate.mass();
        plate.erode(1.0);
        assert!(
            (plate.mass() - before).abs() < 1e-3,
            "flow redistribution must conserve mass: {} vs {}",
            plate.mass(),
            before
        );
    }

    #[test]
    fn test_river_sources_exclude_plate_edges() {
        // Tallest cell sits on the edge of a plate smaller than its
        // world, so it has off-plate neighbors and cannot seed a river.
        let heights = [9.0f32, 1.0, 1.0, 1.0];
        let plate = Plate::new(
            3,
            &heights,
            2,
            2,
            0,
            0,
            1,
            WorldDimension::new(8, 8),
            PlateParams::default(),
        )
        .unwrap();

        assert!(plate.find_river_sources(0.5).is_empty());
    }
}
