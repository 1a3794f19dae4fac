//! Full-screen notice shown instead of the grid when the terminal cannot
//! fit the aggregated page minimums.

use super::{Page, RenderContext, fit};
use crate::screen::Screen;
use core_model::{MinSize, PageState, SurfaceId};

pub struct TooSmallPage {
    surface: SurfaceId,
    required: MinSize,
}

impl TooSmallPage {
    pub fn create(screen: &mut Screen<'_>) -> Option<Self> {
        let root = screen.root();
        let surface = screen.create(root, PageState::new(0, 0, 1, 1))?;
        Some(Self {
            surface,
            required: MinSize::default(),
        })
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    pub fn set_required(&mut self, required: MinSize) {
        self.required = required;
    }

    /// Hide without releasing: erase so nothing bleeds through from below.
    pub fn hide(&mut self, screen: &mut Screen<'_>) {
        screen.erase(self.surface);
        screen.to_bottom(self.surface);
    }
}

impl Page for TooSmallPage {
    fn kind(&self) -> &'static str {
        "too_small"
    }

    fn render(&mut self, screen: &mut Screen<'_>, _ctx: &RenderContext<'_>) {
        let PageState { width, height, .. } = screen.state(self.surface);
        let (have_w, have_h) = screen.size();
        let message = [
            "Terminal too small".to_string(),
            format!(
                "need {}x{}, have {}x{}",
                self.required.width,
                self.required.height + core_model::COMMAND_STRIP_ROWS,
                have_w,
                have_h
            ),
        ];
        let top = height.saturating_sub(message.len() as u32) / 2;
        for y in 0..height {
            let text = y
                .checked_sub(top)
                .and_then(|i| message.get(i as usize))
                .map(|m| {
                    let pad = width.saturating_sub(m.chars().count() as u32) / 2;
                    format!("{}{m}", " ".repeat(pad as usize))
                })
                .unwrap_or_default();
            // Every cell is written so the notice is opaque.
            screen.put(self.surface, 0, y, &fit(&text, width));
        }
    }

    fn on_resize(&mut self, screen: &mut Screen<'_>, state: PageState) {
        screen.resize(self.surface, state);
    }

    fn page_state(&self, screen: &Screen<'_>) -> PageState {
        screen.state(self.surface)
    }

    fn min_dimensions(&self) -> (u32, u32) {
        (1, 1)
    }

    fn destroy(&mut self, screen: &mut Screen<'_>) {
        screen.erase(self.surface);
        screen.destroy(self.surface);
    }
}
