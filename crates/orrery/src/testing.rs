//! Counting stand-ins for the GPU backend.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use engine_core::{
    DrawItem, Frame, Geometry, GeometryId, GraphicsDevice, GraphicsError, Material, MaterialId, Mount,
    SurfaceId, Viewport,
};

#[derive(Debug, Clone, Default)]
pub struct TestMount(Rc<Cell<bool>>);

impl Mount for TestMount {
    fn is_attached(&self) -> bool {
        !self.0.get()
    }
}

#[derive(Default)]
pub struct CountingDevice {
    next: u64,
    /// Every allocation fails while set.
    pub failing: bool,
    pub surfaces: HashSet<u64>,
    pub geometries: HashSet<u64>,
    pub materials: HashMap<u64, Material>,
    pub renders: usize,
    pub last_overlay: Vec<DrawItem>,
}

impl CountingDevice {
    fn id(&mut self) -> Result<u64, GraphicsError> {
        if self.failing {
            return Err(GraphicsError::Allocation("test resource"));
        }
        self.next += 1;
        Ok(self.next)
    }

    pub fn live(&self) -> usize {
        self.surfaces.len() + self.geometries.len() + self.materials.len()
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(&id.0)
    }
}

impl GraphicsDevice for CountingDevice {
    type Mount = TestMount;

    fn create_surface(&mut self, _: &TestMount, _: Viewport, _: [f32; 4]) -> Result<SurfaceId, GraphicsError> {
        let id = self.id()?;
        self.surfaces.insert(id);
        Ok(SurfaceId(id))
    }

    fn resize_surface(&mut self, _: SurfaceId, _: Viewport) {}

    fn detach_surface(&mut self, _: SurfaceId, _: &TestMount) {}

    fn release_surface(&mut self, surface: SurfaceId) {
        assert!(self.surfaces.remove(&surface.0));
    }

    fn create_geometry(&mut self, _: &Geometry) -> Result<GeometryId, GraphicsError> {
        let id = self.id()?;
        self.geometries.insert(id);
        Ok(GeometryId(id))
    }

    fn release_geometry(&mut self, geometry: GeometryId) {
        assert!(self.geometries.remove(&geometry.0));
    }

    fn create_material(&mut self, material: &Material) -> Result<MaterialId, GraphicsError> {
        let id = self.id()?;
        self.materials.insert(id, *material);
        Ok(MaterialId(id))
    }

    fn release_material(&mut self, material: MaterialId) {
        assert!(self.materials.remove(&material.0).is_some());
    }

    fn render(&mut self, _: SurfaceId, frame: &Frame<'_>) -> Result<(), GraphicsError> {
        self.renders += 1;
        self.last_overlay = frame.overlay.to_vec();
        Ok(())
    }
}
