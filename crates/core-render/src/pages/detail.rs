//! Modal detail view for a song, album, artist, playlist, recommendation or
//! station. Content is re-read from the service on every render, so a stale
//! index renders the service's error instead of old data.

use super::{Bordered, Page, RenderContext};
use crate::screen::Screen;
use core_model::PageState;
use core_state::DetailKind;

pub struct DetailPage {
    frame: Bordered,
    kind: DetailKind,
    index: usize,
}

impl DetailPage {
    pub fn create(screen: &mut Screen<'_>, kind: DetailKind, index: usize) -> Option<Self> {
        Some(Self {
            frame: Bordered::create(screen)?,
            kind,
            index,
        })
    }

    pub fn target(&self) -> (DetailKind, usize) {
        (self.kind, self.index)
    }

    pub fn surfaces(&self) -> [core_model::SurfaceId; 2] {
        [self.frame.outer, self.frame.inner]
    }
}

impl Page for DetailPage {
    fn kind(&self) -> &'static str {
        "detail"
    }

    fn render(&mut self, screen: &mut Screen<'_>, ctx: &RenderContext<'_>) {
        match ctx.service.detail(self.kind, self.index) {
            Ok(detail) => {
                self.frame
                    .draw_frame(screen, &format!(" {}: {} ", detail.kind, detail.title));
                let lines = std::iter::once(detail.subtitle)
                    .chain(std::iter::once(String::new()))
                    .chain(detail.lines);
                self.frame.write_lines(screen, lines);
            }
            Err(e) => {
                self.frame.draw_frame(screen, &format!(" {} ", self.kind));
                self.frame.write_lines(screen, [e.to_string()]);
            }
        }
    }

    fn on_resize(&mut self, screen: &mut Screen<'_>, state: PageState) {
        self.frame.resize(screen, state);
    }

    fn page_state(&self, screen: &Screen<'_>) -> PageState {
        self.frame.state(screen)
    }

    fn min_dimensions(&self) -> (u32, u32) {
        (20, 5)
    }

    fn max_dimensions(&self) -> Option<(u32, u32)> {
        Some(match self.kind {
            DetailKind::Song => (48, 8),
            DetailKind::Station | DetailKind::Recommendation => (56, 14),
            DetailKind::Album | DetailKind::Artist | DetailKind::Playlist => (60, 20),
        })
    }

    fn destroy(&mut self, screen: &mut Screen<'_>) {
        self.frame.destroy(screen);
    }
}
