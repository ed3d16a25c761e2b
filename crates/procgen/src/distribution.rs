//! Golden-angle (Fibonacci) distribution of points over a sphere.
//!
//! Each point steps down the Y axis by an equal amount and turns by the golden
//! angle around it, which keeps neighbouring points from lining up into
//! visible spirals or seams.

use glam::Vec3;

/// π·(3 − √5) radians, about 137.5°.
pub const GOLDEN_ANGLE: f32 = 2.399_963_2;

/// `count` points spread evenly over a sphere of `radius`.
///
/// The first point sits on the +Y pole and the last on the −Y pole. A single
/// point is placed on the equator. The sequence depends only on the inputs.
pub fn positions(count: usize, radius: f32) -> Vec<Vec3> {
    (0..count).map(|i| point(i, count) * radius).collect()
}

/// Unit-sphere point `index` of `count`.
fn point(index: usize, count: usize) -> Vec3 {
    let y = if count > 1 {
        1.0 - (2.0 * index as f32) / (count - 1) as f32
    } else {
        0.0
    };
    let ring = (1.0 - y * y).max(0.0).sqrt();
    let theta = index as f32 * GOLDEN_ANGLE;
    Vec3::new(theta.cos() * ring, y, theta.sin() * ring)
}
