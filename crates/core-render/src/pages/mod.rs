//! Page protocol and the page variants.
//!
//! A page owns its surfaces and is otherwise opaque to the grid: the grid
//! only hands out rectangles, asks for renders and reads size hints. Each
//! variant keeps its own layout math local.

use crate::screen::Screen;
use core_actions::Mode;
use core_model::{PageState, SurfaceId};
use core_state::MusicService;

mod command_bar;
mod detail;
mod now_playing;
mod queue;
mod search;
mod too_small;

pub use command_bar::CommandBarPage;
pub use detail::DetailPage;
pub use now_playing::NowPlayingPage;
pub use queue::QueuePage;
pub use search::SearchPage;
pub use too_small::TooSmallPage;

/// Everything a page may read while rendering. Domain data is a snapshot
/// taken from the service during the pass.
pub struct RenderContext<'a> {
    pub service: &'a dyn MusicService,
    pub mode: Mode,
    pub command_line: &'a str,
    pub cursor: usize,
    pub status: Option<&'a str>,
}

pub trait Page {
    /// Short name for logs and errors.
    fn kind(&self) -> &'static str;
    fn render(&mut self, screen: &mut Screen<'_>, ctx: &RenderContext<'_>);
    fn on_resize(&mut self, screen: &mut Screen<'_>, state: PageState);
    fn page_state(&self, screen: &Screen<'_>) -> PageState;
    fn min_dimensions(&self) -> (u32, u32);
    fn max_dimensions(&self) -> Option<(u32, u32)> {
        None
    }
    /// Erase and release every surface the page owns.
    fn destroy(&mut self, screen: &mut Screen<'_>);
}

/// Truncate to `width` chars, padding with spaces so stale cells are
/// overwritten.
pub(crate) fn fit(text: &str, width: u32) -> String {
    let width = width as usize;
    let mut out: String = text.chars().take(width).collect();
    let len = out.chars().count();
    out.extend(std::iter::repeat_n(' ', width - len));
    out
}

/// Outer surface with a box border and title, plus an inner content
/// surface bound to it one cell in from each edge.
#[derive(Debug)]
pub(crate) struct Bordered {
    pub outer: SurfaceId,
    pub inner: SurfaceId,
}

impl Bordered {
    pub(crate) fn create(screen: &mut Screen<'_>) -> Option<Self> {
        let root = screen.root();
        let outer = screen.create(root, PageState::new(0, 0, 3, 3))?;
        let Some(inner) = screen.create(outer, PageState::new(1, 1, 1, 1)) else {
            screen.destroy(outer);
            return None;
        };
        Some(Self { outer, inner })
    }

    pub(crate) fn resize(&self, screen: &mut Screen<'_>, state: PageState) {
        screen.resize(self.outer, state);
        let inner = PageState::new(
            state.abs_x + 1,
            state.abs_y + 1,
            state.width.saturating_sub(2),
            state.height.saturating_sub(2),
        );
        screen.resize(self.inner, inner);
    }

    pub(crate) fn state(&self, screen: &Screen<'_>) -> PageState {
        screen.state(self.outer)
    }

    /// Inner width/height available for content.
    pub(crate) fn content_size(&self, screen: &Screen<'_>) -> (u32, u32) {
        let outer = screen.state(self.outer);
        (outer.width.saturating_sub(2), outer.height.saturating_sub(2))
    }

    /// Clear both surfaces and draw the frame.
    pub(crate) fn draw_frame(&self, screen: &mut Screen<'_>, title: &str) {
        screen.erase(self.outer);
        screen.erase(self.inner);
        let PageState { width, height, .. } = screen.state(self.outer);
        if width < 2 || height < 2 {
            return;
        }
        let horizontal = "─".repeat((width - 2) as usize);
        screen.put(self.outer, 0, 0, &format!("┌{horizontal}┐"));
        for y in 1..height - 1 {
            screen.put(self.outer, 0, y, "│");
            screen.put(self.outer, width - 1, y, "│");
        }
        screen.put(self.outer, 0, height - 1, &format!("└{horizontal}┘"));
        if width > 4 {
            let title: String = title.chars().take((width - 4) as usize).collect();
            screen.put(self.outer, 2, 0, &title);
        }
    }

    /// Write content rows into the inner surface, padded to its width.
    pub(crate) fn write_lines<I, S>(&self, screen: &mut Screen<'_>, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (width, height) = self.content_size(screen);
        if width == 0 {
            return;
        }
        let mut rows = 0;
        for (y, line) in lines.into_iter().take(height as usize).enumerate() {
            screen.put(self.inner, 0, y as u32, &fit(line.as_ref(), width));
            rows += 1;
        }
        for y in rows..height {
            screen.put(self.inner, 0, y, &fit("", width));
        }
    }

    pub(crate) fn destroy(&self, screen: &mut Screen<'_>) {
        screen.erase(self.inner);
        screen.erase(self.outer);
        screen.destroy(self.inner);
        screen.destroy(self.outer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_pads_and_truncates() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 3), "abc");
        assert_eq!(fit("", 0), "");
    }
}
