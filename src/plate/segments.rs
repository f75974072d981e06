//! Continent bookkeeping: per-cell ids plus per-continent metadata.

/// Index into a plate's continent table. Only meaningful within the plate
/// that issued it.
pub type ContinentId = u32;

/// Id of cells no flood fill has claimed yet.
pub const UNASSIGNED: ContinentId = ContinentId::MAX;

/// Metadata of one 4-connected continental region: an inclusive local
/// bounding box, its cell count, and collision statistics.
#[derive(Debug, Clone)]
pub struct SegmentData {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
    area: u32,
    coll_count: u32,
    exists: bool,
}

impl SegmentData {
    /// A zero-area segment whose bbox is the single point `(x, y)`.
    pub fn point(x: u32, y: u32) -> Self {
        Self {
            x0: x,
            y0: y,
            x1: x,
            y1: y,
            area: 0,
            coll_count: 0,
            exists: true,
        }
    }

    pub fn left(&self) -> u32 {
        self.x0
    }

    pub fn right(&self) -> u32 {
        self.x1
    }

    pub fn top(&self) -> u32 {
        self.y0
    }

    pub fn bottom(&self) -> u32 {
        self.y1
    }

    pub fn area(&self) -> u32 {
        self.area
    }

    pub fn coll_count(&self) -> u32 {
        self.coll_count
    }

    /// False once the continent's crust has been moved to another plate.
    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn inc_area(&mut self) {
        self.area += 1;
    }

    pub fn inc_coll_count(&mut self) {
        self.coll_count += 1;
    }

    /// Widens the bbox just enough to cover `(x, y)`.
    pub fn enlarge_to_contain(&mut self, x: u32, y: u32) {
        self.x0 = self.x0.min(x);
        self.x1 = self.x1.max(x);
        self.y0 = self.y0.min(y);
        self.y1 = self.y1.max(y);
    }

    /// Moves the bbox after the plate grew at its top-left corner.
    pub fn shift(&mut self, dx: u32, dy: u32) {
        self.x0 += dx;
        self.x1 += dx;
        self.y0 += dy;
        self.y1 += dy;
    }

    pub fn mark_non_existent(&mut self) {
        self.exists = false;
    }
}

/// The per-plate continent table.
///
/// Cell ids stay [`UNASSIGNED`] until flood fill claims them; the driver
/// resets the table at the start of each tectonic step so continents are
/// re-derived lazily from the post-move heightmap. Ids are never reused
/// within a step.
#[derive(Debug, Clone)]
pub struct Segments {
    ids: Vec<ContinentId>,
    data: Vec<SegmentData>,
}

impl Segments {
    pub fn new(area: usize) -> Self {
        Self {
            ids: vec![UNASSIGNED; area],
            data: Vec::new(),
        }
    }

    /// Number of cells covered by the id array.
    pub fn area(&self) -> usize {
        self.ids.len()
    }

    /// Number of continents discovered so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn id(&self, index: usize) -> ContinentId {
        self.ids[index]
    }

    pub fn set_id(&mut self, index: usize, id: ContinentId) {
        self.ids[index] = id;
    }

    pub fn ids(&self) -> &[ContinentId] {
        &self.ids
    }

    pub fn get(&self, id: ContinentId) -> &SegmentData {
        &self.data[id as usize]
    }

    pub fn get_mut(&mut self, id: ContinentId) -> &mut SegmentData {
        &mut self.data[id as usize]
    }

    pub fn push(&mut self, data: SegmentData) -> ContinentId {
        self.data.push(data);
        (self.data.len() - 1) as ContinentId
    }

    /// Forgets every assignment; ids are re-derived lazily afterwards.
    pub fn reset(&mut self) {
        self.ids.fill(UNASSIGNED);
        self.data.clear();
    }

    /// Moves every continent's bbox after the plate grew at the top-left.
    pub fn shift(&mut self, dx: u32, dy: u32) {
        for segment in &mut self.data {
            segment.shift(dx, dy);
        }
    }

    /// Replaces the id array after plate growth.
    pub fn reassign(&mut self, ids: Vec<ContinentId>) {
        self.ids = ids;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_table_is_unassigned() {
        let s = Segments::new(9);
        assert!((0..9).all(|i| s.id(i) == UNASSIGNED));
        assert_eq!(s.len(), 0);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut s = Segments::new(4);
        let idx = s.push(SegmentData::point(0, 1));
        s.set_id(2, idx);

        s.reset();
        let once: Vec<_> = s.ids().to_vec();
        s.reset();
        assert_eq!(s.ids(), &once[..]);
        assert!(s.ids().iter().all(|&id| id == UNASSIGNED));
        assert_eq!(s.len(), 0);
    }

    #[test]
    fn test_enlarge_to_contain() {
        let mut d = SegmentData::point(3, 3);
        d.enlarge_to_contain(1, 5);
        d.enlarge_to_contain(4, 2);
        assert_eq!((d.left(), d.right(), d.top(), d.bottom()), (1, 4, 2, 5));
    }

    #[test]
    fn test_shift_moves_all_bboxes() {
        let mut s = Segments::new(4);
        let a = s.push(SegmentData::point(0, 0));
        let b = s.push(SegmentData::point(1, 1));
        s.shift(8, 2);
        assert_eq!((s.get(a).left(), s.get(a).top()), (8, 2));
        assert_eq!((s.get(b).left(), s.get(b).top()), (9, 3));
    }

    #[test]
    fn test_mark_non_existent() {
        let mut d = SegmentData::point(0, 0);
        assert!(d.exists());
        d.mark_non_existent();
        assert!(!d.exists());
    }
}
