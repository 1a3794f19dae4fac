//! Upcoming tracks with the current one marked.

use super::{Bordered, Page, RenderContext};
use crate::screen::Screen;
use core_model::PageState;
use core_state::{QueueSnapshot, format_time};

pub struct QueuePage {
    frame: Bordered,
}

impl QueuePage {
    pub fn create(screen: &mut Screen<'_>) -> Option<Self> {
        Some(Self {
            frame: Bordered::create(screen)?,
        })
    }
}

/// First entry to show so the current track stays in a window of `rows`.
pub(crate) fn first_visible(current: Option<usize>, len: usize, rows: usize) -> usize {
    match current {
        Some(cur) if rows > 0 && cur >= rows => (cur + 1 - rows).min(len.saturating_sub(rows)),
        _ => 0,
    }
}

fn queue_lines(snap: &QueueSnapshot, rows: usize) -> Vec<String> {
    if snap.entries.is_empty() {
        return vec!["Queue is empty".to_string()];
    }
    let first = first_visible(snap.current, snap.entries.len(), rows);
    snap.entries
        .iter()
        .enumerate()
        .skip(first)
        .take(rows)
        .map(|(i, t)| {
            let marker = if snap.current == Some(i) { '>' } else { ' ' };
            format!(
                "{marker}{:>3}. {} - {} ({})",
                i + 1,
                t.title,
                t.artist,
                format_time(t.duration)
            )
        })
        .collect()
}

impl Page for QueuePage {
    fn kind(&self) -> &'static str {
        "queue"
    }

    fn render(&mut self, screen: &mut Screen<'_>, ctx: &RenderContext<'_>) {
        let snap = ctx.service.queue();
        self.frame
            .draw_frame(screen, &format!(" Queue ({}) ", snap.entries.len()));
        let (_, rows) = self.frame.content_size(screen);
        self.frame.write_lines(screen, queue_lines(&snap, rows as usize));
    }

    fn on_resize(&mut self, screen: &mut Screen<'_>, state: PageState) {
        self.frame.resize(screen, state);
    }

    fn page_state(&self, screen: &Screen<'_>) -> PageState {
        self.frame.state(screen)
    }

    fn min_dimensions(&self) -> (u32, u32) {
        (24, 5)
    }

    fn destroy(&mut self, screen: &mut Screen<'_>) {
        self.frame.destroy(screen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_state::Track;

    #[test]
    fn window_follows_current() {
        assert_eq!(first_visible(None, 10, 3), 0);
        assert_eq!(first_visible(Some(2), 10, 3), 0);
        assert_eq!(first_visible(Some(5), 10, 3), 3);
        assert_eq!(first_visible(Some(9), 10, 3), 7);
        assert_eq!(first_visible(Some(4), 10, 0), 0);
    }

    #[test]
    fn marks_current_entry() {
        let snap = QueueSnapshot {
            entries: vec![Track::new("a", "x", "y", 60), Track::new("b", "x", "y", 61)],
            current: Some(1),
        };
        let lines = queue_lines(&snap, 5);
        assert_eq!(lines[0], "   1. a - x (1:00)");
        assert_eq!(lines[1], ">  2. b - x (1:01)");
    }
}
