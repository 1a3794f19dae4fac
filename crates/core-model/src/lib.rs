//! core-model: geometry values, the surface arena and layout math.
//!
//! Nothing here draws. [`SurfaceTree`] mirrors the backend's planes with the
//! compositor's own ids, parent links and cached authoritative geometry;
//! [`layout`] holds the pure partitioning functions the grid is built on.

pub mod layout;
pub mod surface;

pub use layout::{
    COMMAND_STRIP_ROWS, MinSize, aggregate_min_size, centered, column_rects, command_strip,
    split_evenly, too_small, working_height,
};
pub use surface::{SurfaceId, SurfaceTree};

/// Requested or observed geometry of a surface in absolute screen cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct PageState {
    pub abs_x: i32,
    pub abs_y: i32,
    pub width: u32,
    pub height: u32,
}

impl PageState {
    pub const fn new(abs_x: i32, abs_y: i32, width: u32, height: u32) -> Self {
        Self {
            abs_x,
            abs_y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i64 {
        i64::from(self.abs_x) + i64::from(self.width)
    }

    pub fn bottom(&self) -> i64 {
        i64::from(self.abs_y) + i64::from(self.height)
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn intersects(&self, other: &PageState) -> bool {
        i64::from(self.abs_x) < other.right()
            && i64::from(other.abs_x) < self.right()
            && i64::from(self.abs_y) < other.bottom()
            && i64::from(other.abs_y) < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_rects_do_not_intersect() {
        let a = PageState::new(0, 0, 50, 14);
        let b = PageState::new(50, 0, 50, 14);
        let c = PageState::new(0, 14, 50, 14);
        assert!(!a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.intersects(&PageState::new(49, 13, 2, 2)));
    }
}
