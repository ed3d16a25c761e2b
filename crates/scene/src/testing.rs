//! Recording stand-ins for the GPU backend.

use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

use engine_core::{
    Frame, Geometry, GeometryId, GraphicsDevice, GraphicsError, Material, MaterialId, Mount,
    SurfaceId, Viewport,
};

/// Mount whose attachment can be flipped from the test.
#[derive(Debug, Clone)]
pub struct FakeMount {
    attached: Rc<Cell<bool>>,
}

impl FakeMount {
    pub fn attached() -> Self {
        Self { attached: Rc::new(Cell::new(true)) }
    }

    pub fn detach(&self) {
        self.attached.set(false);
    }
}

impl Mount for FakeMount {
    fn is_attached(&self) -> bool {
        self.attached.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    CreateSurface,
    ResizeSurface,
    DetachSurface,
    ReleaseSurface,
    ReleaseGeometry,
    ReleaseMaterial,
    Render,
}

/// Device that hands out ids and records what was done with them.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    next_id: u64,
    /// Allocations (geometries + materials) allowed before the next one fails.
    pub fail_after: Option<usize>,
    pub fail_surface: bool,
    pub geometries_created: usize,
    pub materials_created: usize,
    pub surfaces: HashSet<SurfaceId>,
    pub geometries: HashSet<GeometryId>,
    pub materials: HashSet<MaterialId>,
    pub renders: usize,
    pub last_draws: usize,
    pub last_overlay: usize,
    pub last_surface_size: Option<(u32, u32)>,
    pub last_time: Option<f32>,
    /// Every material description handed to `create_material`.
    pub material_log: Vec<Material>,
    pub calls: Vec<Call>,
}

impl RecordingDevice {
    /// Device whose `n + 1`th geometry or material allocation fails.
    pub fn failing_after(n: usize) -> Self {
        Self { fail_after: Some(n), ..Self::default() }
    }

    /// Device that cannot create surfaces.
    pub fn failing_surface() -> Self {
        Self { fail_surface: true, ..Self::default() }
    }

    pub fn live_resources(&self) -> usize {
        self.surfaces.len() + self.geometries.len() + self.materials.len()
    }

    fn allocate(&mut self, what: &'static str) -> Result<u64, GraphicsError> {
        if let Some(left) = self.fail_after.as_mut() {
            if *left == 0 {
                return Err(GraphicsError::Allocation(what));
            }
            *left -= 1;
        }
        self.next_id += 1;
        Ok(self.next_id)
    }

    pub fn position(&self, call: Call) -> Option<usize> {
        self.calls.iter().position(|c| *c == call)
    }
}

impl GraphicsDevice for RecordingDevice {
    type Mount = FakeMount;

    fn create_surface(
        &mut self,
        _mount: &FakeMount,
        viewport: Viewport,
        _clear: [f32; 4],
    ) -> Result<SurfaceId, GraphicsError> {
        if self.fail_surface {
            return Err(GraphicsError::Surface("no adapter".into()));
        }
        self.next_id += 1;
        let id = SurfaceId(self.next_id);
        self.surfaces.insert(id);
        self.last_surface_size = Some(viewport.surface_size());
        self.calls.push(Call::CreateSurface);
        Ok(id)
    }

    fn resize_surface(&mut self, _surface: SurfaceId, viewport: Viewport) {
        self.last_surface_size = Some(viewport.surface_size());
        self.calls.push(Call::ResizeSurface);
    }

    fn detach_surface(&mut self, _surface: SurfaceId, _mount: &FakeMount) {
        self.calls.push(Call::DetachSurface);
    }

    fn release_surface(&mut self, surface: SurfaceId) {
        assert!(self.surfaces.remove(&surface), "surface released twice");
        self.calls.push(Call::ReleaseSurface);
    }

    fn create_geometry(&mut self, _geometry: &Geometry) -> Result<GeometryId, GraphicsError> {
        let id = GeometryId(self.allocate("geometry")?);
        self.geometries.insert(id);
        self.geometries_created += 1;
        Ok(id)
    }

    fn release_geometry(&mut self, geometry: GeometryId) {
        assert!(self.geometries.remove(&geometry), "geometry released twice");
        self.calls.push(Call::ReleaseGeometry);
    }

    fn create_material(&mut self, material: &Material) -> Result<MaterialId, GraphicsError> {
        let id = MaterialId(self.allocate("material")?);
        self.material_log.push(*material);
        self.materials.insert(id);
        self.materials_created += 1;
        Ok(id)
    }

    fn release_material(&mut self, material: MaterialId) {
        assert!(self.materials.remove(&material), "material released twice");
        self.calls.push(Call::ReleaseMaterial);
    }

    fn render(&mut self, surface: SurfaceId, frame: &Frame<'_>) -> Result<(), GraphicsError> {
        if !self.surfaces.contains(&surface) {
            return Err(GraphicsError::UnknownSurface(surface));
        }
        for item in frame.draws {
            assert!(self.geometries.contains(&item.geometry), "drew a released geometry");
            assert!(self.materials.contains(&item.material), "drew a released material");
        }
        self.renders += 1;
        self.last_draws = frame.draws.len();
        self.last_overlay = frame.overlay.len();
        self.last_time = Some(frame.time);
        self.calls.push(Call::Render);
        Ok(())
    }
}
