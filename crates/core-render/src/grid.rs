//! Layout grid: columns of pages, the command bar and the too-small notice.
//!
//! Construction walks the configured page slots column-major into
//! `rows x cols` cells; slots past the configured list stay empty, and
//! configured pages past the last cell are ignored. A page that cannot
//! allocate its surfaces aborts the whole build; there is no partial grid.
//!
//! On resize every page gets an exact rectangle (see
//! [`core_model::layout`]) and renders immediately. Below the aggregated
//! minimum size only the too-small notice is shown, stacked on top of
//! everything; otherwise it sits erased at the bottom of the stack.

use crate::pages::{
    CommandBarPage, DetailPage, NowPlayingPage, Page, QueuePage, RenderContext, SearchPage,
    TooSmallPage,
};
use crate::screen::Screen;
use core_config::{LayoutConfig, PageKind};
use core_model::{
    MinSize, PageState, aggregate_min_size, centered, column_rects, command_strip, too_small,
    working_height,
};
use core_state::DetailKind;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("could not allocate surfaces for the {kind} page")]
    PageAllocation { kind: &'static str },
}

fn page_name(kind: PageKind) -> &'static str {
    match kind {
        PageKind::NowPlaying => "now_playing",
        PageKind::Queue => "queue",
        PageKind::Search => "search",
    }
}

fn make_page(kind: PageKind, screen: &mut Screen<'_>) -> Option<Box<dyn Page>> {
    Some(match kind {
        PageKind::NowPlaying => Box::new(NowPlayingPage::create(screen)?),
        PageKind::Queue => Box::new(QueuePage::create(screen)?),
        PageKind::Search => Box::new(SearchPage::create(screen)?),
    })
}

fn destroy_all(screen: &mut Screen<'_>, layout: &mut [Vec<Box<dyn Page>>]) {
    for page in layout.iter_mut().flatten() {
        page.destroy(screen);
    }
}

pub struct LayoutGrid {
    rows: u32,
    cols: u32,
    layout: Vec<Vec<Box<dyn Page>>>,
    command: CommandBarPage,
    too_small: TooSmallPage,
    detail: Option<DetailPage>,
    showing_too_small: bool,
}

impl LayoutGrid {
    pub fn build(config: &LayoutConfig, screen: &mut Screen<'_>) -> Result<Self, LayoutError> {
        let LayoutConfig { rows, cols, .. } = config.clone().normalized();
        let mut layout: Vec<Vec<Box<dyn Page>>> = (0..cols).map(|_| Vec::new()).collect();
        let cells = rows.saturating_mul(cols) as usize;
        if config.pages.len() > cells {
            warn!(target: "layout.build", pages = config.pages.len(), cells, "extra_pages_ignored");
        }
        for (slot, kind) in config.pages.iter().take(cells).enumerate() {
            let column = slot / rows as usize;
            match make_page(*kind, screen) {
                Some(page) => layout[column].push(page),
                None => {
                    destroy_all(screen, &mut layout);
                    return Err(LayoutError::PageAllocation {
                        kind: page_name(*kind),
                    });
                }
            }
        }
        Self::with_pages(rows, cols, layout, screen)
    }

    /// Assemble a grid from already constructed pages (`layout[col][row]`)
    /// and create the fixed overlays. On failure every given page is
    /// destroyed.
    pub fn with_pages(
        rows: u32,
        cols: u32,
        mut layout: Vec<Vec<Box<dyn Page>>>,
        screen: &mut Screen<'_>,
    ) -> Result<Self, LayoutError> {
        let Some(command) = CommandBarPage::create(screen) else {
            destroy_all(screen, &mut layout);
            return Err(LayoutError::PageAllocation {
                kind: "command_bar",
            });
        };
        let Some(too_small) = TooSmallPage::create(screen) else {
            let mut command = command;
            command.destroy(screen);
            destroy_all(screen, &mut layout);
            return Err(LayoutError::PageAllocation { kind: "too_small" });
        };
        screen.to_bottom(too_small.surface());
        let pages: usize = layout.iter().map(Vec::len).sum();
        info!(target: "layout.build", rows, cols, pages, "grid_built");
        Ok(Self {
            rows,
            cols,
            layout,
            command,
            too_small,
            detail: None,
            showing_too_small: false,
        })
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn column_lengths(&self) -> Vec<usize> {
        self.layout.iter().map(Vec::len).collect()
    }

    pub fn is_showing_too_small(&self) -> bool {
        self.showing_too_small
    }

    pub fn detail_target(&self) -> Option<(DetailKind, usize)> {
        self.detail.as_ref().map(DetailPage::target)
    }

    /// Aggregated minimum of the grid pages (command strip excluded).
    pub fn min_size(&self) -> MinSize {
        let columns: Vec<Vec<(u32, u32)>> = self
            .layout
            .iter()
            .map(|col| col.iter().map(|p| p.min_dimensions()).collect())
            .collect();
        aggregate_min_size(&columns)
    }

    pub fn page_states(&self, screen: &Screen<'_>) -> Vec<Vec<PageState>> {
        self.layout
            .iter()
            .map(|col| col.iter().map(|p| p.page_state(screen)).collect())
            .collect()
    }

    pub fn command_state(&self, screen: &Screen<'_>) -> PageState {
        self.command.page_state(screen)
    }

    pub fn detail_state(&self, screen: &Screen<'_>) -> Option<PageState> {
        self.detail.as_ref().map(|d| d.page_state(screen))
    }

    /// Re-flow for a new terminal size and render every visible page.
    pub fn resize(
        &mut self,
        screen: &mut Screen<'_>,
        width: u32,
        height: u32,
        ctx: &RenderContext<'_>,
    ) {
        screen.resize_root(width, height);
        let min = self.min_size();
        self.too_small.set_required(min);
        if too_small(width, height, min) {
            if !self.showing_too_small {
                info!(target: "layout.resize", width, height, min_w = min.width, min_h = min.height, "too_small_shown");
            }
            self.showing_too_small = true;
            self.too_small
                .on_resize(screen, PageState::new(0, 0, width, height));
            screen.to_top(self.too_small.surface());
            self.too_small.render(screen, ctx);
            return;
        }
        if self.showing_too_small {
            self.too_small.hide(screen);
            info!(target: "layout.resize", width, height, "too_small_hidden");
        }
        self.showing_too_small = false;

        let rects = column_rects(width, height, &self.column_lengths());
        for (column, rects) in self.layout.iter_mut().zip(rects) {
            for (page, rect) in column.iter_mut().zip(rects) {
                page.on_resize(screen, rect);
                page.render(screen, ctx);
            }
        }
        self.command.on_resize(screen, command_strip(width, height));
        self.command.render(screen, ctx);
        if let Some(detail) = self.detail.as_mut() {
            place_detail(detail, screen, width, height);
            detail.render(screen, ctx);
        }
        debug!(target: "layout.resize", width, height, "grid_resized");
    }

    /// Render all visible pages at their current geometry.
    pub fn render_all(&mut self, screen: &mut Screen<'_>, ctx: &RenderContext<'_>) {
        if self.showing_too_small {
            self.too_small.render(screen, ctx);
            return;
        }
        for page in self.layout.iter_mut().flatten() {
            page.render(screen, ctx);
        }
        self.command.render(screen, ctx);
        if let Some(detail) = self.detail.as_mut() {
            detail.render(screen, ctx);
        }
    }

    /// Replace any open detail view with a new one. The caller re-renders.
    pub fn open_detail(
        &mut self,
        screen: &mut Screen<'_>,
        kind: DetailKind,
        index: usize,
    ) -> Result<(), LayoutError> {
        self.close_detail(screen);
        let mut detail = DetailPage::create(screen, kind, index)
            .ok_or(LayoutError::PageAllocation { kind: "detail" })?;
        let (width, height) = screen.size();
        place_detail(&mut detail, screen, width, height);
        if self.showing_too_small {
            screen.to_top(self.too_small.surface());
        }
        info!(target: "layout.detail", kind = kind.as_str(), index, "detail_opened");
        self.detail = Some(detail);
        Ok(())
    }

    pub fn close_detail(&mut self, screen: &mut Screen<'_>) -> bool {
        match self.detail.take() {
            Some(mut detail) => {
                detail.destroy(screen);
                info!(target: "layout.detail", "detail_closed");
                true
            }
            None => false,
        }
    }

    /// Release every page and overlay.
    pub fn destroy(mut self, screen: &mut Screen<'_>) {
        self.close_detail(screen);
        destroy_all(screen, &mut self.layout);
        self.command.destroy(screen);
        self.too_small.destroy(screen);
    }
}

/// Center the detail view over the grid area, sized to its maximum but no
/// larger than the area, and stack it above the grid pages.
fn place_detail(detail: &mut DetailPage, screen: &mut Screen<'_>, width: u32, height: u32) {
    let area = PageState::new(0, 0, width, working_height(height));
    let want = detail.max_dimensions().unwrap_or(detail.min_dimensions());
    detail.on_resize(screen, centered(area, want));
    let [outer, inner] = detail.surfaces();
    screen.to_top(outer);
    screen.above(inner, outer);
}
