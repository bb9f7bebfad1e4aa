//! Terrain rendering interface
//!
//! The simulation never draws. It builds triangle meshes for terrain and hands
//! them to a [`TerrainCanvas`], receiving an opaque [`DrawHandle`] back. When
//! terrain is pruned the handle is released exactly once.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub mod shapes;
pub mod vertex;

pub use vertex::{Vertex, colors};

/// Opaque handle to a drawable owned by the host renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawHandle(pub u32);

/// Host-side drawable store
pub trait TerrainCanvas: std::fmt::Debug {
    /// Register a mesh and return its handle
    fn create(&mut self, mesh: Vec<Vertex>) -> DrawHandle;
    /// Release a drawable. Called once per handle.
    fn release(&mut self, handle: DrawHandle);
}

/// Shared canvas: the host keeps one clone to read meshes, the registry owns the other
impl<T: TerrainCanvas> TerrainCanvas for Rc<RefCell<T>> {
    fn create(&mut self, mesh: Vec<Vertex>) -> DrawHandle {
        self.borrow_mut().create(mesh)
    }

    fn release(&mut self, handle: DrawHandle) {
        self.borrow_mut().release(handle)
    }
}

/// Canvas that discards meshes and only tracks live handles
#[derive(Debug, Default)]
pub struct HeadlessCanvas {
    next: u32,
    live: usize,
}

impl HeadlessCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drawables created and not yet released
    pub fn live(&self) -> usize {
        self.live
    }
}

impl TerrainCanvas for HeadlessCanvas {
    fn create(&mut self, _mesh: Vec<Vertex>) -> DrawHandle {
        self.next += 1;
        self.live += 1;
        DrawHandle(self.next)
    }

    fn release(&mut self, _handle: DrawHandle) {
        self.live = self.live.saturating_sub(1);
    }
}

/// Canvas that keeps meshes around for a host renderer to upload
#[derive(Debug, Default)]
pub struct MeshCanvas {
    next: u32,
    meshes: HashMap<DrawHandle, Vec<Vertex>>,
}

impl MeshCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mesh(&self, handle: DrawHandle) -> Option<&[Vertex]> {
        self.meshes.get(&handle).map(Vec::as_slice)
    }

    /// All live meshes in handle order (stable for deterministic uploads)
    pub fn meshes(&self) -> Vec<(DrawHandle, &[Vertex])> {
        let mut all: Vec<_> = self
            .meshes
            .iter()
            .map(|(h, m)| (*h, m.as_slice()))
            .collect();
        all.sort_by_key(|(h, _)| h.0);
        all
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.values().map(Vec::len).sum()
    }
}

impl TerrainCanvas for MeshCanvas {
    fn create(&mut self, mesh: Vec<Vertex>) -> DrawHandle {
        self.next += 1;
        let handle = DrawHandle(self.next);
        self.meshes.insert(handle, mesh);
        handle
    }

    fn release(&mut self, handle: DrawHandle) {
        if self.meshes.remove(&handle).is_none() {
            log::warn!("Released unknown terrain drawable {:?}", handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_canvas_lifecycle() {
        let mut canvas = MeshCanvas::new();
        let a = canvas.create(vec![Vertex::new(0.0, 0.0, [1.0; 4]); 3]);
        let b = canvas.create(vec![Vertex::new(1.0, 1.0, [1.0; 4]); 6]);
        assert_ne!(a, b);
        assert_eq!(canvas.vertex_count(), 9);
        canvas.release(a);
        assert!(canvas.mesh(a).is_none());
        assert_eq!(canvas.meshes().len(), 1);
    }

    #[test]
    fn test_headless_canvas_counts() {
        let mut canvas = HeadlessCanvas::new();
        let h = canvas.create(Vec::new());
        assert_eq!(canvas.live(), 1);
        canvas.release(h);
        assert_eq!(canvas.live(), 0);
    }
}
