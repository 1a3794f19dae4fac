//! Borrowed view of the surface tree together with the backend that owns
//! the planes. Every page operation goes through one of these so tree and
//! backend never disagree.

use core_model::{PageState, SurfaceId, SurfaceTree};
use core_terminal::TerminalBackend;

pub struct Screen<'a> {
    pub tree: &'a mut SurfaceTree,
    pub backend: &'a mut dyn TerminalBackend,
}

impl<'a> Screen<'a> {
    pub fn new(tree: &'a mut SurfaceTree, backend: &'a mut dyn TerminalBackend) -> Self {
        Self { tree, backend }
    }

    pub fn root(&self) -> SurfaceId {
        self.tree.root()
    }

    pub fn size(&self) -> (u32, u32) {
        self.backend.screen_size()
    }

    pub fn create(&mut self, parent: SurfaceId, state: PageState) -> Option<SurfaceId> {
        self.tree.create(self.backend, parent, state)
    }

    pub fn resize(&mut self, id: SurfaceId, state: PageState) -> Option<PageState> {
        self.tree.resize(self.backend, id, state)
    }

    pub fn resize_root(&mut self, width: u32, height: u32) {
        self.tree.resize_root(self.backend, width, height);
    }

    pub fn state(&self, id: SurfaceId) -> PageState {
        self.tree.page_state(id).unwrap_or_default()
    }

    pub fn erase(&mut self, id: SurfaceId) {
        self.tree.erase(self.backend, id);
    }

    pub fn put(&mut self, id: SurfaceId, x: u32, y: u32, text: &str) -> u32 {
        self.tree.put_text(self.backend, id, x, y, text)
    }

    pub fn destroy(&mut self, id: SurfaceId) -> bool {
        self.tree.destroy(self.backend, id)
    }

    pub fn to_top(&mut self, id: SurfaceId) -> bool {
        self.tree.move_to_top(self.backend, id)
    }

    pub fn to_bottom(&mut self, id: SurfaceId) -> bool {
        self.tree.move_to_bottom(self.backend, id)
    }

    pub fn above(&mut self, id: SurfaceId, other: SurfaceId) -> bool {
        self.tree.move_above(self.backend, id, other)
    }

    pub fn z_index(&self, id: SurfaceId) -> Option<usize> {
        self.tree.z_index(&*self.backend, id)
    }
}
