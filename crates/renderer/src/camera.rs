//! Camera and lighting uniforms.

use bytemuck::{Pod, Zeroable};
use engine_core::{Camera, Light};
use glam::{Mat4, Vec3};

/// Directional lights the shader evaluates per fragment.
pub const MAX_LIGHTS: usize = 4;

/// Scene uniform (must match `SceneUniform` in scene.wgsl).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    /// rgb = summed ambient light, w unused
    pub ambient: [f32; 4],
    /// xyz = unit direction towards the light
    pub light_directions: [[f32; 4]; MAX_LIGHTS],
    /// rgb = color * intensity
    pub light_colors: [[f32; 4]; MAX_LIGHTS],
    /// x = number of lights in use, y = seconds since the scene started
    pub light_count: [f32; 4],
}

impl SceneUniform {
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            camera_position: [0.0; 4],
            ambient: [1.0, 1.0, 1.0, 0.0],
            light_directions: [[0.0; 4]; MAX_LIGHTS],
            light_colors: [[0.0; 4]; MAX_LIGHTS],
            light_count: [0.0; 4],
        }
    }

    /// Perspective view with the given lights. Point and spot lights are
    /// treated as directional lights shining from their position at the origin.
    pub fn update(&mut self, camera: &Camera, lights: &[Light]) {
        self.view_proj = camera.view_projection_matrix().to_cols_array_2d();
        let pos = camera.position();
        self.camera_position = [pos.x, pos.y, pos.z, 1.0];

        let mut ambient = Vec3::ZERO;
        let mut count = 0;
        for light in lights {
            let (color, intensity, position) = match *light {
                Light::Ambient { color, intensity } => {
                    ambient += Vec3::new(color.r, color.g, color.b) * intensity;
                    continue;
                }
                Light::Directional { color, intensity, position }
                | Light::Point { color, intensity, position }
                | Light::Spot { color, intensity, position, .. } => (color, intensity, position),
            };
            if count == MAX_LIGHTS {
                log::debug!("More than {} lights, ignoring the rest", MAX_LIGHTS);
                break;
            }
            let dir = position.normalize_or_zero();
            let tint = color.scaled(intensity);
            self.light_directions[count] = [dir.x, dir.y, dir.z, 0.0];
            self.light_colors[count] = [tint.r, tint.g, tint.b, 1.0];
            count += 1;
        }
        self.ambient = [ambient.x, ambient.y, ambient.z, 0.0];
        self.light_count[0] = count as f32;
    }

    /// Clock the beam shading animates from.
    pub fn set_time(&mut self, seconds: f32) {
        self.light_count[1] = seconds;
    }

    /// Screen-space projection in logical pixels, origin top-left, unlit.
    pub fn overlay(width: f32, height: f32) -> Self {
        Self {
            view_proj: Mat4::orthographic_rh(0.0, width.max(1.0), height.max(1.0), 0.0, -1.0, 1.0)
                .to_cols_array_2d(),
            ..Self::new()
        }
    }
}

impl Default for SceneUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::Color;

    #[test]
    fn ambient_lights_sum() {
        let mut u = SceneUniform::new();
        let lights = [
            Light::Ambient { color: Color::WHITE, intensity: 0.5 },
            Light::Ambient { color: Color::rgb(1.0, 0.0, 0.0), intensity: 0.25 },
        ];
        u.update(&Camera::default(), &lights);
        assert_eq!(u.ambient, [0.75, 0.5, 0.5, 0.0]);
        assert_eq!(u.light_count[0], 0.0);
    }

    #[test]
    fn point_light_aims_at_origin() {
        let mut u = SceneUniform::new();
        let lights = [Light::Point { color: Color::WHITE, intensity: 2.0, position: Vec3::new(0.0, 10.0, 0.0) }];
        u.update(&Camera::default(), &lights);
        assert_eq!(u.light_directions[0], [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(u.light_colors[0], [2.0, 2.0, 2.0, 1.0]);
        assert_eq!(u.light_count[0], 1.0);
    }

    #[test]
    fn extra_lights_are_dropped() {
        let mut u = SceneUniform::new();
        let light = Light::Directional { color: Color::WHITE, intensity: 1.0, position: Vec3::X };
        u.update(&Camera::default(), &[light; 6]);
        assert_eq!(u.light_count[0], MAX_LIGHTS as f32);
    }

    #[test]
    fn time_survives_light_updates() {
        let mut u = SceneUniform::new();
        u.set_time(3.25);
        u.update(&Camera::default(), &[]);
        assert_eq!(u.light_count, [0.0, 3.25, 0.0, 0.0]);
    }

    #[test]
    fn overlay_maps_top_left_to_ndc_corner() {
        let u = SceneUniform::overlay(800.0, 600.0);
        let m = Mat4::from_cols_array_2d(&u.view_proj);
        let p = m.project_point3(Vec3::ZERO);
        assert!((p.x + 1.0).abs() < 1e-6 && (p.y - 1.0).abs() < 1e-6);
    }
}
