//! Grid partitioning.
//!
//! The screen is split into `cols` columns of near-equal width and each
//! column into as many rows as it holds pages. The bottom
//! [`COMMAND_STRIP_ROWS`] rows are reserved for the command bar and never
//! given to grid pages. Whenever a length does not divide evenly the leading
//! parts (leftmost columns, topmost rows) absorb the remainder one unit each,
//! so results are deterministic for a given size.

use crate::PageState;

/// Rows reserved at the bottom of the screen for the command bar.
pub const COMMAND_STRIP_ROWS: u32 = 2;

/// Split `total` into `parts` lengths summing to `total`; the first
/// `total % parts` lengths are one larger. Zero parts yields an empty list.
pub fn split_evenly(total: u32, parts: u32) -> Vec<u32> {
    if parts == 0 {
        return Vec::new();
    }
    let base = total / parts;
    let extra = total % parts;
    (0..parts).map(|i| base + u32::from(i < extra)).collect()
}

/// Height available to grid pages.
pub fn working_height(height: u32) -> u32 {
    height.saturating_sub(COMMAND_STRIP_ROWS)
}

/// Target rectangles for every grid cell, column-major. `column_lengths[i]`
/// is the number of pages stacked in column `i`; the number of columns is
/// `column_lengths.len()`.
pub fn column_rects(width: u32, height: u32, column_lengths: &[usize]) -> Vec<Vec<PageState>> {
    let widths = split_evenly(width, column_lengths.len() as u32);
    let work = working_height(height);
    let mut x = 0i32;
    let mut out = Vec::with_capacity(column_lengths.len());
    for (col_width, rows) in widths.into_iter().zip(column_lengths) {
        let mut y = 0i32;
        let mut column = Vec::with_capacity(*rows);
        for row_height in split_evenly(work, *rows as u32) {
            column.push(PageState::new(x, y, col_width, row_height));
            y += row_height as i32;
        }
        out.push(column);
        x += col_width as i32;
    }
    out
}

/// Full-width strip at the bottom of the screen.
pub fn command_strip(width: u32, height: u32) -> PageState {
    let y = working_height(height);
    PageState::new(0, y as i32, width, height.min(COMMAND_STRIP_ROWS))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MinSize {
    pub width: u32,
    pub height: u32,
}

/// Aggregate per-page minimums laid out as `columns[col][row] = (w, h)`.
///
/// Width: each column needs the widest minimum among its pages; the columns
/// are summed. Height: each row index needs the tallest minimum among the
/// pages at that index in any column; the row indices are summed.
pub fn aggregate_min_size(columns: &[Vec<(u32, u32)>]) -> MinSize {
    let width = columns
        .iter()
        .map(|col| col.iter().map(|(w, _)| *w).max().unwrap_or(0))
        .sum();
    let rows = columns.iter().map(Vec::len).max().unwrap_or(0);
    let height = (0..rows)
        .map(|row| {
            columns
                .iter()
                .filter_map(|col| col.get(row).map(|(_, h)| *h))
                .max()
                .unwrap_or(0)
        })
        .sum();
    MinSize { width, height }
}

/// The too-small gate: width below the minimum, or working height (screen
/// height minus the command strip) below the minimum height.
pub fn too_small(width: u32, height: u32, min: MinSize) -> bool {
    width < min.width || i64::from(height) - i64::from(COMMAND_STRIP_ROWS) < i64::from(min.height)
}

/// Rectangle of `want` size (shrunk to fit) centered in `area`.
pub fn centered(area: PageState, want: (u32, u32)) -> PageState {
    let width = want.0.min(area.width);
    let height = want.1.min(area.height);
    PageState::new(
        area.abs_x + ((area.width - width) / 2) as i32,
        area.abs_y + ((area.height - height) / 2) as i32,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remainder_goes_to_leading_parts() {
        assert_eq!(split_evenly(10, 3), vec![4, 3, 3]);
        assert_eq!(split_evenly(11, 3), vec![4, 4, 3]);
        assert_eq!(split_evenly(2, 4), vec![1, 1, 0, 0]);
        assert!(split_evenly(5, 0).is_empty());
    }

    #[test]
    fn two_by_two_at_100x30() {
        let rects = column_rects(100, 30, &[2, 2]);
        assert_eq!(
            rects,
            vec![
                vec![PageState::new(0, 0, 50, 14), PageState::new(0, 14, 50, 14)],
                vec![PageState::new(50, 0, 50, 14), PageState::new(50, 14, 50, 14)],
            ]
        );
        assert_eq!(command_strip(100, 30), PageState::new(0, 28, 100, 2));
    }

    #[test]
    fn ragged_columns_split_their_own_height() {
        let rects = column_rects(81, 25, &[2, 1]);
        assert_eq!(rects[0][0], PageState::new(0, 0, 41, 12));
        assert_eq!(rects[0][1], PageState::new(0, 12, 41, 11));
        assert_eq!(rects[1][0], PageState::new(41, 0, 40, 23));
    }

    #[test]
    fn empty_column_still_takes_width() {
        let rects = column_rects(9, 10, &[1, 0]);
        assert_eq!(rects[0][0].width, 5);
        assert!(rects[1].is_empty());
    }

    #[test]
    fn min_size_aggregates_by_column_and_row_index() {
        let columns = vec![
            vec![(20, 5), (30, 8)],
            vec![(25, 10)],
        ];
        assert_eq!(aggregate_min_size(&columns), MinSize { width: 55, height: 18 });
        assert_eq!(aggregate_min_size(&[]), MinSize::default());
    }

    #[test]
    fn too_small_gate_examples() {
        let min = MinSize { width: 60, height: 30 };
        assert!(too_small(58, 40, min));
        assert!(!too_small(61, 33, min));
        assert!(too_small(61, 31, min));
        assert!(too_small(100, 1, MinSize { width: 0, height: 0 }));
    }

    #[test]
    fn centered_shrinks_to_area() {
        let area = PageState::new(0, 0, 100, 28);
        assert_eq!(centered(area, (60, 20)), PageState::new(20, 4, 60, 20));
        assert_eq!(centered(area, (200, 50)), area);
    }
}
