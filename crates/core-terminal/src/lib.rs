//! Terminal backend abstraction and crossterm implementation.
//!
//! The backend owns the plane store (see [`planes`]) and turns its composited
//! frame into terminal output. Everything above this crate talks to planes
//! only through [`TerminalBackend`], so the compositor can run against the
//! in-memory [`HeadlessBackend`] in tests.

use anyhow::Result;
use crossterm::{
    cursor::Hide,
    cursor::Show,
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode,
    },
};
use std::io::stdout;
use std::ops::{Deref, DerefMut};
use tracing::{debug, trace};

pub mod headless;
pub mod planes;
mod writer;

pub use headless::HeadlessBackend;
pub use planes::{Geometry, PlaneId, PlaneStore, ZOrder};
use writer::Writer;

/// Capability set the compositor consumes. Geometry-mutating calls apply
/// synchronously; a following [`geometry`](TerminalBackend::geometry) call
/// observes the (possibly clamped) result.
pub trait TerminalBackend {
    fn enter(&mut self) -> Result<()>;
    fn leave(&mut self) -> Result<()>;
    fn set_title(&mut self, title: &str) -> Result<()>;

    fn planes(&self) -> &PlaneStore;
    fn planes_mut(&mut self) -> &mut PlaneStore;

    /// Write the current composition, touching only what changed.
    fn render(&mut self) -> Result<()>;
    /// Repaint the whole screen regardless of what was written before.
    fn refresh(&mut self) -> Result<()>;

    fn root(&self) -> PlaneId {
        self.planes().root()
    }

    fn screen_size(&self) -> (u32, u32) {
        self.planes().screen_size()
    }

    fn resize_root(&mut self, width: u32, height: u32) {
        self.planes_mut().resize_root(width, height);
    }

    fn create_plane(&mut self, parent: PlaneId, geometry: Geometry) -> Option<PlaneId> {
        self.planes_mut().create(parent, geometry)
    }

    fn destroy_plane(&mut self, id: PlaneId) -> bool {
        self.planes_mut().destroy(id)
    }

    fn move_plane(&mut self, id: PlaneId, x: i32, y: i32) -> bool {
        self.planes_mut().move_to(id, x, y)
    }

    fn resize_plane(&mut self, id: PlaneId, width: u32, height: u32) -> bool {
        self.planes_mut().resize(id, width, height)
    }

    fn geometry(&self, id: PlaneId) -> Option<Geometry> {
        self.planes().geometry(id)
    }

    fn absolute_origin(&self, id: PlaneId) -> Option<(i32, i32)> {
        self.planes().absolute_origin(id)
    }

    fn set_z_order(&mut self, id: PlaneId, order: ZOrder) -> bool {
        self.planes_mut().set_z(id, order)
    }

    fn erase(&mut self, id: PlaneId) {
        self.planes_mut().erase(id);
    }

    fn put_text(&mut self, id: PlaneId, x: u32, y: u32, text: &str) -> u32 {
        self.planes_mut().put_text(id, x, y, text)
    }
}

pub struct CrosstermBackend {
    entered: bool,
    store: PlaneStore,
    last_frame: Vec<String>,
}

/// RAII guard ensuring terminal state restoration even if caller early-returns or panics.
pub struct TerminalGuard<'a> {
    backend: &'a mut CrosstermBackend,
    active: bool,
}

impl CrosstermBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            entered: false,
            store: PlaneStore::new(width, height),
            last_frame: Vec::new(),
        }
    }

    /// Size the root plane from the live terminal.
    pub fn from_terminal_size() -> Result<Self> {
        let (w, h) = crossterm::terminal::size()?;
        Ok(Self::new(u32::from(w), u32::from(h)))
    }

    /// Enter and return a guard that will leave on drop.
    pub fn enter_guard(&mut self) -> Result<TerminalGuard<'_>> {
        self.enter()?;
        Ok(TerminalGuard {
            backend: self,
            active: true,
        })
    }

    fn write_rows(&mut self, frame: Vec<String>, full: bool) -> Result<usize> {
        let mut writer = Writer::new();
        if full {
            writer.clear_all();
        }
        let mut changed = 0;
        for (y, row) in frame.iter().enumerate() {
            if !full && self.last_frame.get(y) == Some(row) {
                continue;
            }
            writer.move_to(0, y as u16);
            writer.print(row.as_str());
            changed += 1;
        }
        writer.flush()?;
        self.last_frame = frame;
        Ok(changed)
    }
}

impl TerminalBackend for CrosstermBackend {
    fn enter(&mut self) -> Result<()> {
        if !self.entered {
            enable_raw_mode()?;
            execute!(stdout(), EnterAlternateScreen, Hide)?;
            self.entered = true;
        }
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        if self.entered {
            execute!(stdout(), LeaveAlternateScreen, Show)?;
            disable_raw_mode()?;
            self.entered = false;
        }
        Ok(())
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        execute!(stdout(), SetTitle(title))?;
        Ok(())
    }

    fn planes(&self) -> &PlaneStore {
        &self.store
    }

    fn planes_mut(&mut self) -> &mut PlaneStore {
        &mut self.store
    }

    fn render(&mut self) -> Result<()> {
        let frame = self.store.compose();
        let changed = self.write_rows(frame, false)?;
        trace!(target: "render.backend", rows = changed, "render");
        Ok(())
    }

    fn refresh(&mut self) -> Result<()> {
        let frame = self.store.compose();
        let rows = self.write_rows(frame, true)?;
        debug!(target: "render.backend", rows, "refresh");
        Ok(())
    }

    fn resize_root(&mut self, width: u32, height: u32) {
        self.store.resize_root(width, height);
        // Terminal contents are undefined after a resize; force the next
        // render to repaint every row.
        self.last_frame.clear();
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

impl Deref for TerminalGuard<'_> {
    type Target = CrosstermBackend;

    fn deref(&self) -> &Self::Target {
        self.backend
    }
}

impl DerefMut for TerminalGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.backend
    }
}

impl<'a> Drop for TerminalGuard<'a> {
    fn drop(&mut self) {
        if self.active {
            let _ = self.backend.leave();
        }
    }
}
