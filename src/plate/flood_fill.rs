//! On-demand continent discovery via 4-connected flood fill.

use crate::grid::HeightMap;

use super::bounds::Bounds;
use super::segments::{ContinentId, SegmentData, Segments};

/// Claims the 4-connected continental region around local cell `(x, y)`
/// and records it in the segment table, returning its id.
///
/// The origin cell always joins the segment, even when its crust lies
/// below `continent_base`; expansion only crosses cells at or above it.
/// When an immediate neighbor already belongs to a continent, the origin
/// joins that continent instead of founding a new one. Fill wraps across
/// a plate edge only when the plate spans the full world on that axis.
pub(crate) fn create_segment(
    bounds: &Bounds,
    map: &HeightMap,
    segments: &mut Segments,
    x: u32,
    y: u32,
    continent_base: f32,
) -> ContinentId {
    let origin = bounds.index_of(x, y);
    let next_id = segments.len() as ContinentId;

    if segments.id(origin) < next_id {
        return segments.id(origin);
    }

    if let Some(id) = adjacent_segment(bounds, map, segments, x, y, continent_base) {
        segments.set_id(origin, id);
        let data = segments.get_mut(id);
        data.inc_area();
        data.enlarge_to_contain(x, y);
        return id;
    }

    let width = bounds.width();
    let height = bounds.height();
    let world = bounds.world();
    let wraps_x = width == world.width();
    let wraps_y = height == world.height();

    let mut data = SegmentData::point(x, y);
    data.inc_area();
    segments.set_id(origin, next_id);

    let mut stack = vec![(x, y)];
    while let Some((cx, cy)) = stack.pop() {
        let mut visit = |nx: u32, ny: u32, segments: &mut Segments, data: &mut SegmentData| {
            let ni = bounds.index_of(nx, ny);
            if segments.id(ni) > next_id && map[ni] >= continent_base {
                segments.set_id(ni, next_id);
                data.inc_area();
                data.enlarge_to_contain(nx, ny);
                stack.push((nx, ny));
            }
        };

        if cx > 0 {
            visit(cx - 1, cy, segments, &mut data);
        } else if wraps_x {
            visit(width - 1, cy, segments, &mut data);
        }
        if cx + 1 < width {
            visit(cx + 1, cy, segments, &mut data);
        } else if wraps_x {
            visit(0, cy, segments, &mut data);
        }
        if cy > 0 {
            visit(cx, cy - 1, segments, &mut data);
        } else if wraps_y {
            visit(cx, height - 1, segments, &mut data);
        }
        if cy + 1 < height {
            visit(cx, cy + 1, segments, &mut data);
        } else if wraps_y {
            visit(cx, 0, segments, &mut data);
        }
    }

    segments.push(data)
}

/// Looks for an already-claimed continental cell right next to `(x, y)`.
/// No wrap here: a segment reachable only across a seam will be merged by
/// the fill itself.
fn adjacent_segment(
    bounds: &Bounds,
    map: &HeightMap,
    segments: &Segments,
    x: u32,
    y: u32,
    continent_base: f32,
) -> Option<ContinentId> {
    let next_id = segments.len() as ContinentId;
    let check = |nx: u32, ny: u32| {
        let ni = bounds.index_of(nx, ny);
        (map[ni] >= continent_base && segments.id(ni) < next_id).then(|| segments.id(ni))
    };

    if x > 0 {
        if let Some(id) = check(x - 1, y) {
            return Some(id);
        }
    }
    if x + 1 < bounds.width() {
        if let Some(id) = check(x + 1, y) {
            return Some(id);
        }
    }
    if y > 0 {
        if let Some(id) = check(x, y - 1) {
            return Some(id);
        }
    }
    if y + 1 < bounds.height() {
        if let Some(id) = check(x, y + 1) {
            return Some(id);
        }
    }
    None
}
