//! Camera placement from scroll state.

use glam::Vec3;
use input::InputSnapshot;

/// Dolly factor gained per scrolled logical pixel.
pub const DOLLY_RATE: f32 = 0.0008;

/// Pulls the camera back and up as the page scrolls.
///
/// Driven by the raw scroll offset in pixels, not by the normalized
/// [`input::ScrollProgress`]; the two are separate consumers of the same value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DollyRig {
    pub rate: f32,
}

impl Default for DollyRig {
    fn default() -> Self {
        Self { rate: DOLLY_RATE }
    }
}

impl DollyRig {
    /// Dolly factor in [0, 1] for a raw scroll offset.
    pub fn factor(&self, scroll_px: f32) -> f32 {
        (scroll_px.max(0.0) * self.rate).clamp(0.0, 1.0)
    }

    /// Scroll offset at which the factor reaches 1.
    pub fn threshold_px(&self) -> f32 {
        if self.rate > 0.0 {
            1.0 / self.rate
        } else {
            f32::INFINITY
        }
    }

    /// (camera position, look target) for a raw scroll offset.
    pub fn pose(&self, scroll_px: f32) -> (Vec3, Vec3) {
        let f = self.factor(scroll_px);
        let position = Vec3::new(5.0 * f, 2.0 + 8.0 * f, 12.0 - 18.0 * f);
        let target = Vec3::new(0.0, 3.0 * f, 0.0);
        (position, target)
    }
}

/// How the camera moves each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraRig {
    Dolly(DollyRig),
    Fixed { position: Vec3, target: Vec3 },
}

impl CameraRig {
    pub fn pose(&self, input: &InputSnapshot) -> (Vec3, Vec3) {
        match self {
            CameraRig::Dolly(rig) => rig.pose(input.scroll_offset),
            CameraRig::Fixed { position, target } => (*position, *target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factor_is_monotone_and_saturates() {
        let rig = DollyRig::default();
        let threshold = rig.threshold_px();
        let mut last = 0.0;
        for step in 0..=400 {
            let px = step as f32 * 10.0;
            let f = rig.factor(px);
            assert!(f >= last, "factor dropped at {px}px");
            last = f;
            if px >= threshold {
                assert_eq!(f, 1.0);
            }
        }
        assert_eq!(rig.factor(threshold), 1.0);
        assert_eq!(rig.factor(threshold * 3.0), 1.0);
    }

    #[test]
    fn rest_pose_matches_initial_camera() {
        let (position, target) = DollyRig::default().pose(0.0);
        assert_eq!(position, Vec3::new(0.0, 2.0, 12.0));
        assert_eq!(target, Vec3::ZERO);
    }

    #[test]
    fn full_dolly_pose() {
        let (position, target) = DollyRig::default().pose(5000.0);
        assert_eq!(position, Vec3::new(5.0, 10.0, -6.0));
        assert_eq!(target, Vec3::new(0.0, 3.0, 0.0));
    }

    #[test]
    fn negative_scroll_reads_as_top() {
        assert_eq!(DollyRig::default().factor(-300.0), 0.0);
    }

    #[test]
    fn fixed_rig_ignores_scroll() {
        let rig = CameraRig::Fixed { position: Vec3::new(0.0, 0.0, 4.5), target: Vec3::ZERO };
        let input = InputSnapshot { scroll_offset: 900.0, ..Default::default() };
        assert_eq!(rig.pose(&input).0, Vec3::new(0.0, 0.0, 4.5));
    }
}
