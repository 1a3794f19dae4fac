//! In-memory backend for tests and non-tty runs.
//!
//! Keeps the last rendered frame as plain rows and counts render/refresh
//! calls. Plane allocation can be made to fail after a number of successful
//! creations to exercise page construction failures.

use crate::planes::{Geometry, PlaneId, PlaneStore};
use crate::TerminalBackend;
use anyhow::Result;

#[derive(Debug, Clone)]
pub struct HeadlessBackend {
    store: PlaneStore,
    frame: Vec<String>,
    entered: bool,
    title: Option<String>,
    renders: u64,
    refreshes: u64,
    allocations_left: Option<usize>,
}

impl HeadlessBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            store: PlaneStore::new(width, height),
            frame: Vec::new(),
            entered: false,
            title: None,
            renders: 0,
            refreshes: 0,
            allocations_left: None,
        }
    }

    /// Let the next `n` plane creations succeed and fail every one after.
    pub fn fail_allocations_after(&mut self, n: usize) {
        self.allocations_left = Some(n);
    }

    pub fn allow_allocations(&mut self) {
        self.allocations_left = None;
    }

    /// Rows produced by the most recent render or refresh.
    pub fn frame(&self) -> &[String] {
        &self.frame
    }

    /// Whether any row of the last frame contains `needle`.
    pub fn frame_contains(&self, needle: &str) -> bool {
        self.frame.iter().any(|row| row.contains(needle))
    }

    pub fn renders(&self) -> u64 {
        self.renders
    }

    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }

    pub fn is_entered(&self) -> bool {
        self.entered
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

impl TerminalBackend for HeadlessBackend {
    fn enter(&mut self) -> Result<()> {
        self.entered = true;
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        self.entered = false;
        Ok(())
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        self.title = Some(title.to_string());
        Ok(())
    }

    fn planes(&self) -> &PlaneStore {
        &self.store
    }

    fn planes_mut(&mut self) -> &mut PlaneStore {
        &mut self.store
    }

    fn render(&mut self) -> Result<()> {
        self.frame = self.store.compose();
        self.renders += 1;
        Ok(())
    }

    fn refresh(&mut self) -> Result<()> {
        self.frame = self.store.compose();
        self.refreshes += 1;
        Ok(())
    }

    fn create_plane(&mut self, parent: PlaneId, geometry: Geometry) -> Option<PlaneId> {
        if let Some(left) = self.allocations_left.as_mut() {
            if *left == 0 {
                return None;
            }
            *left -= 1;
        }
        self.store.create(parent, geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn injected_allocation_failure() {
        let mut backend = HeadlessBackend::new(10, 4);
        let root = backend.root();
        backend.fail_allocations_after(1);
        assert!(backend.create_plane(root, Geometry::new(0, 0, 2, 2)).is_some());
        assert!(backend.create_plane(root, Geometry::new(0, 0, 2, 2)).is_none());
        backend.allow_allocations();
        assert!(backend.create_plane(root, Geometry::new(0, 0, 2, 2)).is_some());
    }

    #[test]
    fn render_captures_frame_and_counts() {
        let mut backend = HeadlessBackend::new(5, 2);
        let root = backend.root();
        let p = backend.create_plane(root, Geometry::new(1, 1, 3, 1)).unwrap();
        backend.put_text(p, 0, 0, "hey");
        backend.render().unwrap();
        backend.refresh().unwrap();
        assert_eq!(backend.frame(), &["     ".to_string(), " hey ".to_string()]);
        assert!(backend.frame_contains("hey"));
        assert_eq!((backend.renders(), backend.refreshes()), (1, 1));
    }

    #[test]
    fn move_then_query_reflects_clamped_size() {
        let mut backend = HeadlessBackend::new(10, 10);
        let root = backend.root();
        let p = backend.create_plane(root, Geometry::new(0, 0, 4, 4)).unwrap();
        backend.move_plane(p, 3, 2);
        backend.resize_plane(p, 0, 5);
        assert_eq!(backend.geometry(p), Some(Geometry::new(3, 2, 1, 5)));
    }
}
