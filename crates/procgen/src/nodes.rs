//! Labeled nodes placed on a globe.

use crate::distribution::positions;
use engine_core::Color;
use glam::Vec3;

/// How far along the way to the globe centre a node's spoke reaches.
pub const SPOKE_REACH: f32 = 0.9;

/// A labeled point on the globe surface. Built once per globe and never moved.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillNode {
    pub position: Vec3,
    pub label: String,
    pub color: Color,
}

impl SkillNode {
    /// End of the spoke in node-local space (the node itself is the start).
    pub fn spoke_end(&self) -> Vec3 {
        -self.position * SPOKE_REACH
    }
}

/// Place one node per entry, in entry order, over a sphere of `radius`.
pub fn skill_nodes<I, S>(entries: I, radius: f32) -> Vec<SkillNode>
where
    I: IntoIterator<Item = (S, Color)>,
    S: Into<String>,
{
    let entries: Vec<(String, Color)> = entries
        .into_iter()
        .map(|(label, color)| (label.into(), color))
        .collect();
    let points = positions(entries.len(), radius);
    log::debug!("Placed {} globe nodes at radius {}", points.len(), radius);
    entries
        .into_iter()
        .zip(points)
        .map(|((label, color), position)| SkillNode { position, label, color })
        .collect()
}
