//! Components stored on scene-graph entities.

use crate::graphics::{GeometryId, MaterialId};
use glam::Vec3;
use hecs::Entity;

/// Links an entity to the group it belongs to; its transform is relative to the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parent(pub Entity);

/// A drawable object: which geometry to draw with which material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renderable {
    pub geometry: GeometryId,
    pub material: MaterialId,
}

/// Fixed per-frame self rotation about the local Y axis.
///
/// Ticks once per rendered frame regardless of frame duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    pub radians_per_frame: f32,
}

/// Self rotation about the local Y axis scaled by frame delta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedSpin {
    pub radians_per_second: f32,
}

/// Circular orbit in the parent's XZ plane, driven by elapsed loop time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub radius: f32,
    /// Angular speed in radians per second.
    pub angular_speed: f32,
}

impl Orbit {
    /// Position on the orbit after `elapsed` seconds.
    pub fn position_at(&self, elapsed: f32) -> Vec3 {
        let angle = elapsed * self.angular_speed;
        Vec3::new(angle.cos() * self.radius, 0.0, angle.sin() * self.radius)
    }
}

/// A labeled node the pointer can hover. While hovered it is drawn at
/// `hover_scale` with `hover_material`.
#[derive(Debug, Clone, PartialEq)]
pub struct Hoverable {
    pub label: String,
    /// Pick radius in local units.
    pub radius: f32,
    pub material: MaterialId,
    pub hover_material: MaterialId,
    pub hover_scale: f32,
}

/// Rotation set directly from the pointer position every frame.
///
/// Pointer offsets live in [-0.5, 0.5], so the largest yaw is `yaw_gain / 2`
/// and the largest pitch is `pitch_gain / 2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerTilt {
    pub yaw_gain: f32,
    pub pitch_gain: f32,
}

impl PointerTilt {
    /// (pitch, yaw) for a normalized pointer offset.
    pub fn angles(&self, x: f32, y: f32) -> (f32, f32) {
        let x = x.clamp(-0.5, 0.5);
        let y = y.clamp(-0.5, 0.5);
        (y * self.pitch_gain, x * self.yaw_gain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orbit_starts_on_positive_x() {
        let orbit = Orbit { radius: 6.0, angular_speed: 0.4 };
        assert!(orbit.position_at(0.0).distance(Vec3::new(6.0, 0.0, 0.0)) < 1e-6);
    }

    #[test]
    fn orbit_stays_on_circle() {
        let orbit = Orbit { radius: 6.0, angular_speed: 0.4 };
        for t in [0.5_f32, 3.0, 17.25, 120.0] {
            let p = orbit.position_at(t);
            assert!((p.length() - 6.0).abs() < 1e-4);
            assert_eq!(p.y, 0.0);
        }
    }

    #[test]
    fn pointer_tilt_is_capped() {
        let tilt = PointerTilt { yaw_gain: 0.3, pitch_gain: 0.1 };
        let (pitch, yaw) = tilt.angles(4.0, -4.0);
        assert!((yaw - 0.15).abs() < 1e-6);
        assert!((pitch + 0.05).abs() < 1e-6);
    }
}
