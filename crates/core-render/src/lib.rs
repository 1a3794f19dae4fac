//! Page compositor: the page variants, the layout grid that places them and
//! the [`Screen`] view pages draw through.
//!
//! Pages never touch the terminal directly. They own surfaces in a
//! [`core_model::SurfaceTree`] and write text through a [`Screen`], which
//! forwards to whatever [`core_terminal::TerminalBackend`] is active. The
//! backend composes the plane stack into a frame when the runtime asks it to
//! render.

pub mod grid;
pub mod pages;
pub mod screen;

pub use grid::{LayoutError, LayoutGrid};
pub use pages::{
    CommandBarPage, DetailPage, NowPlayingPage, Page, QueuePage, RenderContext, SearchPage,
    TooSmallPage,
};
pub use screen::Screen;
