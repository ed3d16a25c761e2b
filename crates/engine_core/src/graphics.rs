//! The seam between scene management and a concrete GPU backend.
//!
//! Scene code describes geometry, materials and lights with the plain data
//! types below and hands them to a [`GraphicsDevice`], which returns opaque ids.
//! Every id handed out must be released exactly once by whoever allocated it.

use crate::Camera;
use glam::{Mat4, Vec3};
use thiserror::Error;

/// Highest device pixel ratio the surface is rendered at.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Errors raised by a graphics backend.
#[derive(Debug, Error)]
pub enum GraphicsError {
    #[error("rendering surface could not be created: {0}")]
    Surface(String),
    #[error("graphics device could not allocate {0}")]
    Allocation(&'static str),
    #[error("unknown surface {0:?}")]
    UnknownSurface(SurfaceId),
    #[error("frame could not be presented: {0}")]
    Present(String),
}

/// Linear RGB color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Color from a packed `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::rgb(channel(16), channel(8), channel(0))
    }

    pub fn with_alpha(self, alpha: f32) -> [f32; 4] {
        [self.r, self.g, self.b, alpha]
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self::rgb(self.r * factor, self.g * factor, self.b * factor)
    }
}

/// Viewport size in logical pixels plus the display's pixel density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, pixel_ratio: f32) -> Self {
        Self { width, height, pixel_ratio }
    }

    /// True when either dimension is zero (minimized window, hidden mount).
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height.max(1.0)
    }

    /// Surface size in physical pixels, with the pixel ratio capped at [`MAX_PIXEL_RATIO`].
    pub fn surface_size(&self) -> (u32, u32) {
        let ratio = self.pixel_ratio.clamp(1.0, MAX_PIXEL_RATIO);
        let w = (self.width * ratio).round().max(1.0) as u32;
        let h = (self.height * ratio).round().max(1.0) as u32;
        (w, h)
    }
}

/// Id of an allocated rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// Id of an allocated geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryId(pub u64);

/// Id of an allocated material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u64);

/// Shape descriptions the backend turns into GPU buffers.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// UV sphere centred on the origin.
    Sphere { radius: f32, segments: u32, rings: u32 },
    /// Flat annulus in the XY plane.
    Ring { inner_radius: f32, outer_radius: f32, segments: u32 },
    /// Flat quad in the XY plane centred on the origin.
    Quad { width: f32, height: f32 },
    /// Unconnected points.
    Points(Vec<Vec3>),
    /// Line segments joining consecutive points.
    Polyline(Vec<Vec3>),
}

/// How a material is shaded and which primitive it draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shading {
    /// Diffuse lighting from the scene lights.
    Lit,
    /// Flat color, ignores lights.
    Unlit,
    /// Triangle edges only, flat color.
    Wireframe,
    /// One pixel per vertex.
    Points,
    /// Line segments, flat color.
    Lines,
    /// Noise-driven light beams flowing over a unit quad, added onto what is
    /// behind. Animated by the frame time; see [`BeamFlow`].
    Beam,
}

/// Animation settings of a [`Shading::Beam`] material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamFlow {
    /// Multiplier on the frame time.
    pub speed: f32,
    /// Shifts the noise field sideways.
    pub horizontal_offset: f32,
    /// Shifts the noise field along the beams.
    pub vertical_offset: f32,
}

impl Default for BeamFlow {
    fn default() -> Self {
        Self { speed: 1.0, horizontal_offset: 0.0, vertical_offset: 0.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Color,
    pub opacity: f32,
    pub shading: Shading,
    /// Only read for [`Shading::Beam`].
    pub flow: BeamFlow,
}

impl Material {
    pub fn new(color: Color, opacity: f32, shading: Shading) -> Self {
        Self { color, opacity, shading, flow: BeamFlow::default() }
    }

    pub fn beam(color: Color, flow: BeamFlow) -> Self {
        Self { color, opacity: 1.0, shading: Shading::Beam, flow }
    }

    pub fn is_translucent(&self) -> bool {
        self.opacity < 1.0
    }
}

/// Light sources. Lights are plain values on scene entities, not GPU allocations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Ambient { color: Color, intensity: f32 },
    Directional { color: Color, intensity: f32, position: Vec3 },
    Point { color: Color, intensity: f32, position: Vec3 },
    Spot { color: Color, intensity: f32, position: Vec3, angle: f32, penumbra: f32 },
}

/// One object to draw this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub geometry: GeometryId,
    pub material: MaterialId,
    pub model: Mat4,
}

/// Everything a backend needs to produce one frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub camera: &'a Camera,
    pub lights: &'a [Light],
    pub draws: &'a [DrawItem],
    /// Screen-space items in logical pixels, origin top-left, drawn last.
    pub overlay: &'a [DrawItem],
    /// Seconds since the scene's loop started.
    pub time: f32,
}

/// The attachment target a rendering surface lives in (a window, a page element).
pub trait Mount {
    /// False once the target has gone away; detaching from it is then skipped.
    fn is_attached(&self) -> bool;
}

/// A GPU backend.
pub trait GraphicsDevice {
    type Mount: Mount;

    /// Create a rendering surface and attach it to `mount`.
    fn create_surface(
        &mut self,
        mount: &Self::Mount,
        viewport: Viewport,
        clear: [f32; 4],
    ) -> Result<SurfaceId, GraphicsError>;

    /// Reconfigure a surface for a new viewport size.
    fn resize_surface(&mut self, surface: SurfaceId, viewport: Viewport);

    /// Remove the surface from its mount. Only called while the mount is attached.
    fn detach_surface(&mut self, surface: SurfaceId, mount: &Self::Mount);

    /// Free whatever the surface still holds after detaching.
    fn release_surface(&mut self, surface: SurfaceId);

    fn create_geometry(&mut self, geometry: &Geometry) -> Result<GeometryId, GraphicsError>;

    fn release_geometry(&mut self, geometry: GeometryId);

    fn create_material(&mut self, material: &Material) -> Result<MaterialId, GraphicsError>;

    fn release_material(&mut self, material: MaterialId);

    fn render(&mut self, surface: SurfaceId, frame: &Frame<'_>) -> Result<(), GraphicsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_unpack() {
        let c = Color::from_hex(0x404040);
        assert!((c.r - 64.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.r, c.g);
        assert_eq!(Color::from_hex(0xffffff), Color::WHITE);
    }

    #[test]
    fn surface_size_caps_pixel_ratio() {
        let vp = Viewport::new(800.0, 600.0, 3.0);
        assert_eq!(vp.surface_size(), (1600, 1200));
        let vp = Viewport::new(800.0, 600.0, 1.5);
        assert_eq!(vp.surface_size(), (1200, 900));
    }

    #[test]
    fn zero_dimension_viewport_is_empty() {
        assert!(Viewport::new(0.0, 600.0, 1.0).is_empty());
        assert!(Viewport::new(800.0, 0.0, 1.0).is_empty());
        assert!(!Viewport::new(1.0, 1.0, 1.0).is_empty());
    }
}
