//! Animated moves between card stack orders.
//!
//! Cards that stay visible glide from wherever they were drawn to their new
//! slot. Cards that become visible enter from above, faded out; cards that
//! drop out of view sink and fade. Everything is a function of the instant
//! passed in, so the host just asks for poses every frame.

use std::time::{Duration, Instant};

use crate::layout::{CardLayout, CardPose};
use crate::queue::VISIBLE_ITEMS;

/// Time a card takes to reach its new slot.
pub const MOVE_DURATION: Duration = Duration::from_millis(500);
/// Time a card takes to leave the stack.
pub const EXIT_DURATION: Duration = Duration::from_millis(300);

/// CSS `ease-in-out`, the cubic Bézier (0.42, 0, 0.58, 1).
pub fn ease_in_out(t: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let bezier = |s: f32, p1: f32, p2: f32| {
        let u = 1.0 - s;
        3.0 * u * u * s * p1 + 3.0 * u * s * s * p2 + s * s * s
    };
    // x(s) is monotonic, so bisect for the curve parameter
    let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
    for _ in 0..24 {
        let mid = (lo + hi) / 2.0;
        if bezier(mid, 0.42, 0.58) < t {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    bezier((lo + hi) / 2.0, 0.0, 1.0)
}

impl CardPose {
    /// Blend towards `to`. Offset, scale and opacity are interpolated; slot,
    /// stacking and blur are taken from `to`.
    pub fn lerp(&self, to: &CardPose, t: f32) -> CardPose {
        if t >= 1.0 {
            return *to;
        }
        let mix = |a: f32, b: f32| a + (b - a) * t;
        CardPose {
            offset_y: mix(self.offset_y, to.offset_y),
            scale: mix(self.scale, to.scale),
            opacity: mix(self.opacity, to.opacity),
            ..*to
        }
    }
}

impl CardLayout {
    /// Where a newly visible card starts: above the stack, shrunk and transparent.
    pub fn enter_pose(&self, to: &CardPose) -> CardPose {
        CardPose { offset_y: -self.vertical_distance, scale: 0.9, opacity: 0.0, ..*to }
    }

    /// Where a card that drops out of view ends up: below the stack, behind everything.
    pub fn exit_pose(&self, from: &CardPose) -> CardPose {
        CardPose {
            offset_y: self.vertical_distance,
            scale: 0.8,
            opacity: 0.0,
            stack_order: 0,
            ..*from
        }
    }
}

#[derive(Debug, Clone)]
struct Track<T> {
    key: T,
    from: CardPose,
    to: CardPose,
}

/// Drawn poses of the visible cards while the stack reorders.
#[derive(Debug, Clone)]
pub struct CardMotion<T> {
    layout: CardLayout,
    moving: Vec<Track<T>>,
    leaving: Vec<Track<T>>,
    started: Option<Instant>,
}

impl<T: Clone + PartialEq> CardMotion<T> {
    /// Cards already resting in their slots for `order` (head first).
    pub fn settled(layout: CardLayout, order: impl IntoIterator<Item = T>) -> Self {
        let order: Vec<T> = order.into_iter().collect();
        let moving = order
            .iter()
            .cloned()
            .zip(layout.poses(order.len()))
            .map(|(key, pose)| Track { key, from: pose, to: pose })
            .collect();
        Self { layout, moving, leaving: Vec::new(), started: None }
    }

    /// The stack now has `order`. Cards move from where they are drawn at `now`.
    pub fn retarget(&mut self, order: impl IntoIterator<Item = T>, now: Instant) {
        let order: Vec<T> = order.into_iter().collect();
        let current = self.poses(now);
        let drawn_at = |key: &T| current.iter().find(|(k, _)| k == key).map(|(_, pose)| *pose);

        let moving: Vec<Track<T>> = order
            .iter()
            .take(VISIBLE_ITEMS)
            .cloned()
            .zip(self.layout.poses(order.len()))
            .map(|(key, to)| {
                let from = drawn_at(&key).unwrap_or_else(|| self.layout.enter_pose(&to));
                Track { key, from, to }
            })
            .collect();
        let leaving = current
            .into_iter()
            .filter(|(key, _)| !moving.iter().any(|track| &track.key == key))
            .map(|(key, from)| Track { to: self.layout.exit_pose(&from), key, from })
            .collect();

        self.moving = moving;
        self.leaving = leaving;
        self.started = Some(now);
    }

    /// Poses to draw at `now`, back to front.
    pub fn poses(&self, now: Instant) -> Vec<(T, CardPose)> {
        let elapsed = self
            .started
            .map_or(MOVE_DURATION, |started| now.saturating_duration_since(started));
        let move_t = ease_in_out(progress(elapsed, MOVE_DURATION));
        let exit_t = ease_in_out(progress(elapsed, EXIT_DURATION));

        let mut poses: Vec<(T, CardPose)> = Vec::with_capacity(self.moving.len() + self.leaving.len());
        if exit_t < 1.0 {
            poses.extend(self.leaving.iter().map(|track| (track.key.clone(), track.from.lerp(&track.to, exit_t))));
        }
        poses.extend(self.moving.iter().map(|track| (track.key.clone(), track.from.lerp(&track.to, move_t))));
        poses.sort_by_key(|(_, pose)| pose.stack_order);
        poses
    }

    /// True once every card has reached its slot.
    pub fn is_settled(&self, now: Instant) -> bool {
        self.started
            .map_or(true, |started| now.saturating_duration_since(started) >= MOVE_DURATION)
    }
}

fn progress(elapsed: Duration, duration: Duration) -> f32 {
    (elapsed.as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
}
