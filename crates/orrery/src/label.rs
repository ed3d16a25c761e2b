//! Label boxes on the overlay: a tag above the hovered globe node.

use engine_core::{Color, DrawItem, Geometry, GeometryId, GraphicsDevice, GraphicsError, Material, MaterialId, Shading};
use glam::{Mat4, Vec2, Vec3};
use scene::{Allocations, HoveredNode};

/// Advance of one label character, in logical pixels.
pub const GLYPH_WIDTH: f32 = 8.0;
/// Space on each side of the label text.
pub const LABEL_PADDING: f32 = 8.0;
pub const MARKER_HEIGHT: f32 = 22.0;
/// Space between the node centre and the bottom of its tag.
pub const MARKER_GAP: f32 = 10.0;
const MARKER_OPACITY: f32 = 0.8;

/// Width of a box that fits `label`.
pub fn label_width(label: &str) -> f32 {
    label.chars().count() as f32 * GLYPH_WIDTH + 2.0 * LABEL_PADDING
}

/// Axis-aligned box on the overlay, centred at `center`.
pub fn box_model(center: Vec2, size: Vec2) -> Mat4 {
    Mat4::from_translation(center.extend(0.0)) * Mat4::from_scale(Vec3::new(size.x, size.y, 1.0))
}

/// The tag drawn over whichever globe node the pointer is on.
#[derive(Debug, Default)]
pub struct LabelMarker {
    quad: Option<GeometryId>,
    material: Option<MaterialId>,
    allocations: Allocations,
}

impl LabelMarker {
    /// On error nothing stays allocated.
    pub fn new<D: GraphicsDevice>(device: &mut D) -> Result<Self, GraphicsError> {
        let mut marker = Self::default();
        if let Err(err) = marker.allocate(device) {
            marker.release(device);
            return Err(err);
        }
        Ok(marker)
    }

    fn allocate<D: GraphicsDevice>(&mut self, device: &mut D) -> Result<(), GraphicsError> {
        self.quad = Some(self.allocations.geometry(device, &Geometry::Quad { width: 1.0, height: 1.0 })?);
        self.material = Some(
            self.allocations
                .material(device, &Material::new(Color::BLACK, MARKER_OPACITY, Shading::Unlit))?,
        );
        Ok(())
    }

    pub fn draws(&self, hovered: Option<&HoveredNode>) -> Vec<DrawItem> {
        let (Some(quad), Some(material), Some(node)) = (self.quad, self.material, hovered) else {
            return Vec::new();
        };
        let size = Vec2::new(label_width(&node.label), MARKER_HEIGHT);
        let center = node.anchor - Vec2::new(0.0, MARKER_GAP + MARKER_HEIGHT / 2.0);
        vec![DrawItem { geometry: quad, material, model: box_model(center, size) }]
    }

    pub fn release<D: GraphicsDevice>(&mut self, device: &mut D) {
        self.allocations.release(device);
        self.quad = None;
        self.material = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CountingDevice;
    use engine_core::World;

    fn node(label: &str, anchor: Vec2) -> HoveredNode {
        let entity = World::new().spawn(());
        HoveredNode { entity, label: label.to_string(), anchor }
    }

    #[test]
    fn width_follows_label_length() {
        assert_eq!(label_width(""), 16.0);
        assert_eq!(label_width("Rust"), 48.0);
        assert!(label_width("TypeScript") > label_width("Go"));
    }

    #[test]
    fn tag_sits_above_the_node() {
        let mut device = CountingDevice::default();
        let marker = LabelMarker::new(&mut device).unwrap();
        assert!(marker.draws(None).is_empty());

        let draws = marker.draws(Some(&node("Rust", Vec2::new(400.0, 300.0))));
        assert_eq!(draws.len(), 1);
        let center = draws[0].model.transform_point3(Vec3::ZERO);
        assert_eq!(center.truncate(), Vec2::new(400.0, 300.0 - 10.0 - 11.0));
        assert_eq!(draws[0].model.x_axis.x, 48.0);
        assert_eq!(device.material(draws[0].material).map(|m| m.opacity), Some(0.8));
    }

    #[test]
    fn failed_allocation_leaves_nothing_behind() {
        let mut device = CountingDevice::default();
        device.failing = true;
        assert!(LabelMarker::new(&mut device).is_err());
        assert_eq!(device.live(), 0);

        device.failing = false;
        let mut marker = LabelMarker::new(&mut device).unwrap();
        assert_eq!(device.live(), 2);
        marker.release(&mut device);
        assert_eq!(device.live(), 0);
        assert!(marker.draws(Some(&node("Go", Vec2::ZERO))).is_empty());
    }
}
