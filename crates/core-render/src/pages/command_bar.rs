//! Two-row strip at the bottom: a mode/hint line and the command line.
//!
//! In Command mode the second row shows `:` and the buffer with the cursor
//! drawn as `_` when it sits past the last char; in Normal mode it shows the
//! last command's status text.

use super::{Page, RenderContext, fit};
use crate::screen::Screen;
use core_actions::Mode;
use core_model::{COMMAND_STRIP_ROWS, PageState, SurfaceId};

pub struct CommandBarPage {
    surface: SurfaceId,
}

impl CommandBarPage {
    pub fn create(screen: &mut Screen<'_>) -> Option<Self> {
        let root = screen.root();
        let surface = screen.create(root, PageState::new(0, 0, 1, COMMAND_STRIP_ROWS))?;
        Some(Self { surface })
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }
}

pub(crate) fn command_row(ctx: &RenderContext<'_>) -> String {
    match ctx.mode {
        Mode::Command => {
            let mut line = format!(":{}", ctx.command_line);
            if ctx.cursor >= ctx.command_line.chars().count() {
                line.push('_');
            }
            line
        }
        Mode::Normal => ctx.status.unwrap_or_default().to_string(),
    }
}

fn hint_row(ctx: &RenderContext<'_>) -> String {
    match ctx.mode {
        Mode::Command => "-- COMMAND --  enter: run  esc: cancel".to_string(),
        Mode::Normal => {
            let playback = ctx.service.playback();
            format!("-- NORMAL --  [{}]  :  command", playback.status.as_str())
        }
    }
}

impl Page for CommandBarPage {
    fn kind(&self) -> &'static str {
        "command_bar"
    }

    fn render(&mut self, screen: &mut Screen<'_>, ctx: &RenderContext<'_>) {
        let width = screen.state(self.surface).width;
        screen.put(self.surface, 0, 0, &fit(&hint_row(ctx), width));
        screen.put(self.surface, 0, 1, &fit(&command_row(ctx), width));
    }

    fn on_resize(&mut self, screen: &mut Screen<'_>, state: PageState) {
        screen.resize(self.surface, state);
    }

    fn page_state(&self, screen: &Screen<'_>) -> PageState {
        screen.state(self.surface)
    }

    fn min_dimensions(&self) -> (u32, u32) {
        (1, COMMAND_STRIP_ROWS)
    }

    fn destroy(&mut self, screen: &mut Screen<'_>) {
        screen.erase(self.surface);
        screen.destroy(self.surface);
    }
}
