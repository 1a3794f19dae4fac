//! Surface arena.
//!
//! Each surface wraps one backend plane. The tree keeps parent ids and
//! ordered child lists for lookup only: the page that created a surface is
//! the one that destroys it. Destroying a surface moves its children under
//! the root rather than destroying them.
//!
//! Slots of destroyed surfaces are reused by later creates, so a stale
//! [`SurfaceId`] may name a different surface. Owners drop their ids on
//! destroy.
//!
//! Geometry is never trusted from the request. After every mutation the
//! backend is queried and the cached [`PageState`] is replaced with what it
//! reports, since clamping is the backend's call.

use crate::PageState;
use core_terminal::{Geometry, PlaneId, TerminalBackend, ZOrder};
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u32);

impl SurfaceId {
    pub fn index(&self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Node {
    plane: PlaneId,
    parent: Option<SurfaceId>,
    children: Vec<SurfaceId>,
    state: PageState,
}

#[derive(Debug, Clone)]
pub struct SurfaceTree {
    nodes: Vec<Option<Node>>,
    free: Vec<SurfaceId>,
}

const ROOT: SurfaceId = SurfaceId(0);

impl SurfaceTree {
    /// Bind the root surface to the backend's root plane.
    pub fn new(backend: &dyn TerminalBackend) -> Self {
        let plane = backend.root();
        let (width, height) = backend.screen_size();
        let root = Node {
            plane,
            parent: None,
            children: Vec::new(),
            state: PageState::new(0, 0, width, height),
        };
        Self {
            nodes: vec![Some(root)],
            free: Vec::new(),
        }
    }

    pub fn root(&self) -> SurfaceId {
        ROOT
    }

    /// Live surfaces, root included.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.node(id).is_some()
    }

    fn node(&self, id: SurfaceId) -> Option<&Node> {
        self.nodes.get(id.0 as usize).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: SurfaceId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    pub fn plane(&self, id: SurfaceId) -> Option<PlaneId> {
        self.node(id).map(|n| n.plane)
    }

    pub fn parent(&self, id: SurfaceId) -> Option<SurfaceId> {
        self.node(id)?.parent
    }

    pub fn children(&self, id: SurfaceId) -> &[SurfaceId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Last geometry reported by the backend.
    pub fn page_state(&self, id: SurfaceId) -> Option<PageState> {
        self.node(id).map(|n| n.state)
    }

    fn parent_origin(&self, backend: &dyn TerminalBackend, id: SurfaceId) -> (i32, i32) {
        self.parent(id)
            .and_then(|p| self.plane(p))
            .and_then(|plane| backend.absolute_origin(plane))
            .unwrap_or((0, 0))
    }

    /// Create a surface under `parent` at the absolute geometry `state`.
    /// `None` when the backend cannot allocate a plane.
    pub fn create(
        &mut self,
        backend: &mut dyn TerminalBackend,
        parent: SurfaceId,
        state: PageState,
    ) -> Option<SurfaceId> {
        let parent_plane = self.plane(parent)?;
        let (px, py) = backend.absolute_origin(parent_plane)?;
        let geometry = Geometry::new(state.abs_x - px, state.abs_y - py, state.width, state.height);
        let Some(plane) = backend.create_plane(parent_plane, geometry) else {
            warn!(target: "surface", parent = parent.0, "plane_allocation_failed");
            return None;
        };
        let node = Some(Node {
            plane,
            parent: Some(parent),
            children: Vec::new(),
            state,
        });
        let id = match self.free.pop() {
            Some(id) => {
                self.nodes[id.0 as usize] = node;
                id
            }
            None => {
                self.nodes.push(node);
                SurfaceId(self.nodes.len() as u32 - 1)
            }
        };
        if let Some(p) = self.node_mut(parent) {
            p.children.push(id);
        }
        self.refresh_geometry(backend, id);
        trace!(target: "surface", id = id.0, parent = parent.0, "surface_created");
        Some(id)
    }

    /// Re-read authoritative geometry from the backend. Idempotent; this is
    /// also the handler for backend-driven resizes.
    pub fn refresh_geometry(
        &mut self,
        backend: &dyn TerminalBackend,
        id: SurfaceId,
    ) -> Option<PageState> {
        let plane = self.plane(id)?;
        let geometry = backend.geometry(plane)?;
        let (ax, ay) = backend.absolute_origin(plane)?;
        let state = PageState::new(ax, ay, geometry.width, geometry.height);
        if let Some(node) = self.node_mut(id) {
            node.state = state;
        }
        Some(state)
    }

    /// Terminal size changed: resize the root plane and re-read it.
    pub fn resize_root(&mut self, backend: &mut dyn TerminalBackend, width: u32, height: u32) {
        backend.resize_root(width, height);
        self.refresh_geometry(backend, ROOT);
        debug!(target: "surface", width, height, "root_synced");
    }

    pub fn move_to(
        &mut self,
        backend: &mut dyn TerminalBackend,
        id: SurfaceId,
        abs_x: i32,
        abs_y: i32,
    ) -> Option<PageState> {
        let plane = self.plane(id)?;
        let (px, py) = self.parent_origin(backend, id);
        backend.move_plane(plane, abs_x - px, abs_y - py);
        self.refresh_geometry(backend, id)
    }

    /// Apply position and size together, then re-query.
    pub fn resize(
        &mut self,
        backend: &mut dyn TerminalBackend,
        id: SurfaceId,
        state: PageState,
    ) -> Option<PageState> {
        let plane = self.plane(id)?;
        let (px, py) = self.parent_origin(backend, id);
        backend.move_plane(plane, state.abs_x - px, state.abs_y - py);
        backend.resize_plane(plane, state.width, state.height);
        self.refresh_geometry(backend, id)
    }

    pub fn erase(&self, backend: &mut dyn TerminalBackend, id: SurfaceId) {
        if let Some(plane) = self.plane(id) {
            backend.erase(plane);
        }
    }

    pub fn put_text(
        &self,
        backend: &mut dyn TerminalBackend,
        id: SurfaceId,
        x: u32,
        y: u32,
        text: &str,
    ) -> u32 {
        match self.plane(id) {
            Some(plane) => backend.put_text(plane, x, y, text),
            None => 0,
        }
    }

    /// Release a surface. Children are re-bound to the root; their owners
    /// still hold and later destroy them.
    pub fn destroy(&mut self, backend: &mut dyn TerminalBackend, id: SurfaceId) -> bool {
        if id == ROOT {
            return false;
        }
        let Some(node) = self.nodes.get_mut(id.0 as usize).and_then(Option::take) else {
            return false;
        };
        if let Some(parent) = node.parent.and_then(|p| self.node_mut(p)) {
            parent.children.retain(|c| *c != id);
        }
        backend.destroy_plane(node.plane);
        self.free.push(id);
        for child in node.children {
            if let Some(c) = self.node_mut(child) {
                c.parent = Some(ROOT);
            }
            if let Some(root) = self.node_mut(ROOT) {
                root.children.push(child);
            }
            // The backend already re-bound the plane; only our cache is stale.
            self.refresh_geometry(backend, child);
        }
        trace!(target: "surface", id = id.0, "surface_destroyed");
        true
    }

    fn restack(&self, backend: &mut dyn TerminalBackend, id: SurfaceId, order: ZOrder) -> bool {
        match self.plane(id) {
            Some(plane) => backend.set_z_order(plane, order),
            None => false,
        }
    }

    pub fn move_to_top(&self, backend: &mut dyn TerminalBackend, id: SurfaceId) -> bool {
        self.restack(backend, id, ZOrder::Top)
    }

    pub fn move_to_bottom(&self, backend: &mut dyn TerminalBackend, id: SurfaceId) -> bool {
        self.restack(backend, id, ZOrder::Bottom)
    }

    pub fn move_above(
        &self,
        backend: &mut dyn TerminalBackend,
        id: SurfaceId,
        other: SurfaceId,
    ) -> bool {
        match self.plane(other) {
            Some(target) => self.restack(backend, id, ZOrder::Above(target)),
            None => false,
        }
    }

    pub fn move_below(
        &self,
        backend: &mut dyn TerminalBackend,
        id: SurfaceId,
        other: SurfaceId,
    ) -> bool {
        match self.plane(other) {
            Some(target) => self.restack(backend, id, ZOrder::Below(target)),
            None => false,
        }
    }

    /// Stacking position as reported by the backend (0 is the root).
    pub fn z_index(&self, backend: &dyn TerminalBackend, id: SurfaceId) -> Option<usize> {
        backend.planes().z_index(self.plane(id)?)
    }
}
