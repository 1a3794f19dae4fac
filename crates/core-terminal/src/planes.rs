//! Backend-side plane store.
//!
//! Planes are rectangles of optional cells. A cell that was never written (or
//! was erased) is transparent and lets whatever is below show through. Every
//! plane except the root has a parent; positions are stored relative to the
//! parent so moving a parent carries its children along. Stacking is a single
//! global list ordered bottom to top, the root always at index 0.
//!
//! Invariants:
//! * Planes are never smaller than 1x1; requests for 0 are clamped.
//! * Ids of destroyed planes are recycled, so the slot table never grows
//!   past the peak number of live planes.
//! * `z` contains exactly the live planes.

use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaneId(pub u32);

/// Rectangle in cell units. `x`/`y` are relative to the parent plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrder {
    Top,
    Bottom,
    Above(PlaneId),
    Below(PlaneId),
}

#[derive(Debug, Clone)]
struct Plane {
    parent: Option<PlaneId>,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    cells: Vec<Option<char>>,
}

impl Plane {
    fn new(parent: Option<PlaneId>, geom: Geometry) -> Self {
        let width = geom.width.max(1);
        let height = geom.height.max(1);
        Self {
            parent,
            x: geom.x,
            y: geom.y,
            width,
            height,
            cells: vec![None; (width * height) as usize],
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        let width = width.max(1);
        let height = height.max(1);
        let mut cells = vec![None; (width * height) as usize];
        for row in 0..self.height.min(height) {
            for col in 0..self.width.min(width) {
                cells[(row * width + col) as usize] = self.cells[(row * self.width + col) as usize];
            }
        }
        self.width = width;
        self.height = height;
        self.cells = cells;
    }
}

#[derive(Debug, Clone)]
pub struct PlaneStore {
    planes: Vec<Option<Plane>>,
    free: Vec<PlaneId>,
    z: Vec<PlaneId>,
}

impl PlaneStore {
    pub fn new(width: u32, height: u32) -> Self {
        let root = Plane::new(None, Geometry::new(0, 0, width, height));
        Self {
            planes: vec![Some(root)],
            free: Vec::new(),
            z: vec![PlaneId(0)],
        }
    }

    pub fn root(&self) -> PlaneId {
        PlaneId(0)
    }

    pub fn len(&self) -> usize {
        self.z.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }

    pub fn contains(&self, id: PlaneId) -> bool {
        self.get(id).is_some()
    }

    fn get(&self, id: PlaneId) -> Option<&Plane> {
        self.planes.get(id.0 as usize).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, id: PlaneId) -> Option<&mut Plane> {
        self.planes.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    /// Screen size as held by the root plane.
    pub fn screen_size(&self) -> (u32, u32) {
        self.get(self.root())
            .map(|p| (p.width, p.height))
            .unwrap_or((1, 1))
    }

    pub fn resize_root(&mut self, width: u32, height: u32) {
        let root = self.root();
        if let Some(plane) = self.get_mut(root) {
            plane.resize(width, height);
        }
        debug!(target: "surface", width, height, "root_resized");
    }

    /// Create a child of `parent`, stacked on top. `None` when the parent is gone.
    pub fn create(&mut self, parent: PlaneId, geom: Geometry) -> Option<PlaneId> {
        if !self.contains(parent) {
            return None;
        }
        let plane = Some(Plane::new(Some(parent), geom));
        let id = match self.free.pop() {
            Some(id) => {
                self.planes[id.0 as usize] = plane;
                id
            }
            None => {
                self.planes.push(plane);
                PlaneId(self.planes.len() as u32 - 1)
            }
        };
        self.z.push(id);
        trace!(target: "surface", id = id.0, parent = parent.0, "plane_created");
        Some(id)
    }

    /// Remove a plane. Its children move under the root, keeping their
    /// on-screen position. The root cannot be destroyed.
    pub fn destroy(&mut self, id: PlaneId) -> bool {
        if id == self.root() || !self.contains(id) {
            return false;
        }
        let orphans: Vec<PlaneId> = self.children(id);
        for child in orphans {
            self.reparent(child, self.root());
        }
        self.planes[id.0 as usize] = None;
        self.free.push(id);
        self.z.retain(|p| *p != id);
        trace!(target: "surface", id = id.0, "plane_destroyed");
        true
    }

    pub fn parent(&self, id: PlaneId) -> Option<PlaneId> {
        self.get(id)?.parent
    }

    pub fn children(&self, id: PlaneId) -> Vec<PlaneId> {
        self.z
            .iter()
            .copied()
            .filter(|p| self.parent(*p) == Some(id))
            .collect()
    }

    fn is_ancestor(&self, ancestor: PlaneId, mut id: PlaneId) -> bool {
        while let Some(parent) = self.parent(id) {
            if parent == ancestor {
                return true;
            }
            id = parent;
        }
        false
    }

    /// Bind `id` to a new parent, keeping its absolute position. Refuses to
    /// create cycles.
    fn reparent(&mut self, id: PlaneId, parent: PlaneId) -> bool {
        if id == self.root()
            || id == parent
            || !self.contains(parent)
            || self.is_ancestor(id, parent)
        {
            return false;
        }
        let (Some((ax, ay)), Some((px, py))) =
            (self.absolute_origin(id), self.absolute_origin(parent))
        else {
            return false;
        };
        if let Some(plane) = self.get_mut(id) {
            plane.parent = Some(parent);
            plane.x = ax - px;
            plane.y = ay - py;
        }
        true
    }

    /// Position relative to the parent. The root never moves.
    pub fn move_to(&mut self, id: PlaneId, x: i32, y: i32) -> bool {
        if id == self.root() {
            return false;
        }
        match self.get_mut(id) {
            Some(plane) => {
                plane.x = x;
                plane.y = y;
                true
            }
            None => false,
        }
    }

    pub fn resize(&mut self, id: PlaneId, width: u32, height: u32) -> bool {
        match self.get_mut(id) {
            Some(plane) => {
                plane.resize(width, height);
                true
            }
            None => false,
        }
    }

    pub fn geometry(&self, id: PlaneId) -> Option<Geometry> {
        self.get(id)
            .map(|p| Geometry::new(p.x, p.y, p.width, p.height))
    }

    pub fn absolute_origin(&self, id: PlaneId) -> Option<(i32, i32)> {
        let mut plane = self.get(id)?;
        let (mut x, mut y) = (plane.x, plane.y);
        while let Some(parent) = plane.parent {
            plane = self.get(parent)?;
            x += plane.x;
            y += plane.y;
        }
        Some((x, y))
    }

    pub fn z_index(&self, id: PlaneId) -> Option<usize> {
        self.z.iter().position(|p| *p == id)
    }

    pub fn stacking(&self) -> &[PlaneId] {
        &self.z
    }

    /// Restack `id`. The root stays at the bottom; "bottom" for any other
    /// plane means directly above the root.
    pub fn set_z(&mut self, id: PlaneId, order: ZOrder) -> bool {
        if id == self.root() || !self.contains(id) {
            return false;
        }
        if let ZOrder::Above(other) | ZOrder::Below(other) = order
            && (other == id || !self.contains(other))
        {
            return false;
        }
        self.z.retain(|p| *p != id);
        let index = match order {
            ZOrder::Top => self.z.len(),
            ZOrder::Bottom => 1,
            ZOrder::Above(other) => self.z_index(other).map_or(self.z.len(), |i| i + 1),
            ZOrder::Below(other) => self.z_index(other).map_or(1, |i| i.max(1)),
        };
        self.z.insert(index.min(self.z.len()), id);
        true
    }

    pub fn erase(&mut self, id: PlaneId) {
        if let Some(plane) = self.get_mut(id) {
            plane.cells.fill(None);
        }
    }

    /// Write `text` starting at cell `(x, y)`, one cell per char, clipped at
    /// the plane's right edge. Returns the number of cells written.
    pub fn put_text(&mut self, id: PlaneId, x: u32, y: u32, text: &str) -> u32 {
        let Some(plane) = self.get_mut(id) else {
            return 0;
        };
        if y >= plane.height {
            return 0;
        }
        let mut written = 0;
        for (col, ch) in (x..plane.width).zip(text.chars()) {
            let ch = if ch.is_control() { ' ' } else { ch };
            plane.cells[(y * plane.width + col) as usize] = Some(ch);
            written += 1;
        }
        written
    }

    /// Cell content at a plane-local coordinate; `None` when transparent.
    pub fn cell(&self, id: PlaneId, x: u32, y: u32) -> Option<char> {
        let plane = self.get(id)?;
        if x >= plane.width || y >= plane.height {
            return None;
        }
        plane.cells[(y * plane.width + x) as usize]
    }

    /// Composite every plane back to front into screen rows.
    pub fn compose(&self) -> Vec<String> {
        let (width, height) = self.screen_size();
        let mut frame = vec![' '; (width * height) as usize];
        for id in &self.z {
            let (Some(plane), Some((ox, oy))) = (self.get(*id), self.absolute_origin(*id)) else {
                continue;
            };
            for row in 0..plane.height {
                let sy = oy + row as i32;
                if sy < 0 || sy >= height as i32 {
                    continue;
                }
                for col in 0..plane.width {
                    let sx = ox + col as i32;
                    if sx < 0 || sx >= width as i32 {
                        continue;
                    }
                    if let Some(ch) = plane.cells[(row * plane.width + col) as usize] {
                        frame[(sy as u32 * width + sx as u32) as usize] = ch;
                    }
                }
            }
        }
        frame
            .chunks(width as usize)
            .map(|row| row.iter().collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_is_clamped() {
        let mut store = PlaneStore::new(10, 5);
        let id = store.create(store.root(), Geometry::new(1, 1, 0, 0)).unwrap();
        assert_eq!(store.geometry(id).unwrap(), Geometry::new(1, 1, 1, 1));
        store.resize(id, 0, 3);
        assert_eq!(store.geometry(id).unwrap().width, 1);
    }

    #[test]
    fn children_follow_parent_moves() {
        let mut store = PlaneStore::new(20, 10);
        let parent = store.create(store.root(), Geometry::new(2, 2, 8, 4)).unwrap();
        let child = store.create(parent, Geometry::new(1, 1, 2, 2)).unwrap();
        assert_eq!(store.absolute_origin(child), Some((3, 3)));
        store.move_to(parent, 5, 0);
        assert_eq!(store.absolute_origin(child), Some((6, 1)));
    }

    #[test]
    fn destroy_reparents_children_to_root_in_place() {
        let mut store = PlaneStore::new(20, 10);
        let parent = store.create(store.root(), Geometry::new(4, 3, 8, 4)).unwrap();
        let child = store.create(parent, Geometry::new(1, 1, 2, 2)).unwrap();
        assert!(store.destroy(parent));
        assert_eq!(store.parent(child), Some(store.root()));
        assert_eq!(store.absolute_origin(child), Some((5, 4)));
        assert!(!store.destroy(store.root()));
    }

    #[test]
    fn destroyed_slots_are_recycled() {
        let mut store = PlaneStore::new(20, 10);
        let root = store.root();
        let keep = store.create(root, Geometry::new(0, 0, 2, 2)).unwrap();
        let first = store.create(root, Geometry::new(0, 0, 2, 2)).unwrap();
        store.put_text(first, 0, 0, "xy");
        assert!(store.destroy(first));
        for _ in 0..10 {
            let again = store.create(root, Geometry::new(3, 3, 4, 1)).unwrap();
            assert_eq!(again, first);
            assert_eq!(store.geometry(again), Some(Geometry::new(3, 3, 4, 1)));
            assert!(store.destroy(again));
        }
        assert_eq!(store.stacking(), &[root, keep]);
        assert_eq!(store.planes.len(), 3);
    }

    #[test]
    fn reparent_refuses_cycles() {
        let mut store = PlaneStore::new(20, 10);
        let a = store.create(store.root(), Geometry::new(0, 0, 4, 4)).unwrap();
        let b = store.create(a, Geometry::new(0, 0, 2, 2)).unwrap();
        assert!(!store.reparent(a, b));
        assert!(!store.reparent(a, a));
    }

    #[test]
    fn z_order_moves_keep_root_at_bottom() {
        let mut store = PlaneStore::new(10, 10);
        let root = store.root();
        let a = store.create(root, Geometry::new(0, 0, 1, 1)).unwrap();
        let b = store.create(root, Geometry::new(0, 0, 1, 1)).unwrap();
        let c = store.create(root, Geometry::new(0, 0, 1, 1)).unwrap();
        assert_eq!(store.stacking(), &[root, a, b, c]);
        store.set_z(c, ZOrder::Bottom);
        assert_eq!(store.stacking(), &[root, c, a, b]);
        store.set_z(c, ZOrder::Above(a));
        assert_eq!(store.stacking(), &[root, a, c, b]);
        store.set_z(b, ZOrder::Below(a));
        assert_eq!(store.stacking(), &[root, b, a, c]);
        store.set_z(a, ZOrder::Top);
        assert_eq!(store.stacking(), &[root, b, c, a]);
        assert!(!store.set_z(root, ZOrder::Top));
    }

    #[test]
    fn compose_respects_stacking_and_transparency() {
        let mut store = PlaneStore::new(6, 2);
        let root = store.root();
        let low = store.create(root, Geometry::new(0, 0, 6, 1)).unwrap();
        let high = store.create(root, Geometry::new(2, 0, 3, 1)).unwrap();
        store.put_text(low, 0, 0, "abcdef");
        store.put_text(high, 0, 0, "X");
        assert_eq!(store.compose(), vec!["abXdef".to_string(), "      ".to_string()]);
        store.set_z(high, ZOrder::Bottom);
        assert_eq!(store.compose()[0], "abcdef");
    }

    #[test]
    fn put_text_clips_at_right_edge_and_off_screen_is_skipped() {
        let mut store = PlaneStore::new(4, 1);
        let p = store.create(store.root(), Geometry::new(2, 0, 3, 1)).unwrap();
        assert_eq!(store.put_text(p, 1, 0, "hello"), 2);
        assert_eq!(store.compose(), vec!["   h".to_string()]);
    }

    #[test]
    fn resize_keeps_overlapping_cells() {
        let mut store = PlaneStore::new(10, 10);
        let p = store.create(store.root(), Geometry::new(0, 0, 3, 2)).unwrap();
        store.put_text(p, 0, 0, "abc");
        store.put_text(p, 0, 1, "def");
        store.resize(p, 2, 3);
        assert_eq!(store.cell(p, 1, 1), Some('e'));
        assert_eq!(store.cell(p, 0, 2), None);
    }
}
