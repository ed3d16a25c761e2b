//! Seeded background star field.

use glam::Vec3;
use rand::prelude::*;

/// Shell the star field is scattered through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarShell {
    pub inner_radius: f32,
    pub outer_radius: f32,
}

impl Default for StarShell {
    fn default() -> Self {
        Self {
            inner_radius: 100.0,
            outer_radius: 1000.0,
        }
    }
}

/// `count` stars spread uniformly in direction and uniformly in radius across `shell`.
pub fn star_field(count: usize, seed: u64, shell: StarShell) -> Vec<Vec3> {
    let mut rng = StdRng::seed_from_u64(seed);
    let depth = shell.outer_radius - shell.inner_radius;
    (0..count)
        .map(|_| {
            let radius = shell.inner_radius + rng.gen::<f32>() * depth;
            let theta = rng.gen::<f32>() * std::f32::consts::TAU;
            // acos of a uniform value in [-1, 1] avoids clustering at the poles
            let phi = (rng.gen::<f32>() * 2.0 - 1.0).clamp(-1.0, 1.0).acos();
            Vec3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
            )
        })
        .collect()
}
