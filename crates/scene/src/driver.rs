//! The per-frame animation loop.
//!
//! The driver is `Running` exactly while it holds a pending [`FrameHandle`].
//! Each fired frame runs [`animate`], collects draw items and lights, and the
//! caller renders and schedules the next frame through [`AnimationDriver::reschedule`].

use std::collections::HashMap;
use std::time::Instant;

use engine_core::{
    Camera, DrawItem, Light, Mat4, Orbit, Parent, PointerTilt, Renderable, Spin, Time,
    TimedSpin, Transform,
};
use hecs::{Entity, World};
use input::InputSnapshot;

use crate::dolly::CameraRig;
use crate::scheduler::{FrameHandle, FrameId, FrameScheduler};

/// Parent chains deeper than this are cut off.
const MAX_DEPTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Stopped,
    Running,
}

#[derive(Debug)]
pub struct AnimationDriver {
    pending: Option<FrameHandle>,
    clock: Time,
    frames: u64,
}

impl AnimationDriver {
    /// Start the loop at `now` by requesting the first frame.
    pub fn start<S: FrameScheduler>(scheduler: &mut S, now: Instant) -> Self {
        Self {
            pending: Some(scheduler.request_frame()),
            clock: Time::starting_at(now),
            frames: 0,
        }
    }

    pub fn state(&self) -> DriverState {
        if self.pending.is_some() {
            DriverState::Running
        } else {
            DriverState::Stopped
        }
    }

    /// Frames stepped since start.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn clock(&self) -> &Time {
        &self.clock
    }

    /// Cancel the pending frame. Returns false if the driver was already stopped.
    pub fn stop<S: FrameScheduler>(&mut self, scheduler: &mut S) -> bool {
        match self.pending.take() {
            Some(handle) => {
                scheduler.cancel_frame(handle);
                true
            }
            None => false,
        }
    }

    /// Claim a fired frame. True if it was this driver's pending request.
    pub fn claim(&mut self, fired: FrameId) -> bool {
        match &self.pending {
            Some(handle) if handle.id() == fired => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Advance the clock and the scene for a claimed frame.
    pub fn step(
        &mut self,
        world: &mut World,
        camera: &mut Camera,
        rig: &CameraRig,
        input: &InputSnapshot,
        now: Instant,
    ) {
        self.clock.update(now);
        self.frames += 1;
        animate(world, camera, rig, input, &self.clock);
    }

    /// Request the next frame after a step.
    pub fn reschedule<S: FrameScheduler>(&mut self, scheduler: &mut S) {
        if self.pending.is_none() {
            self.pending = Some(scheduler.request_frame());
        }
    }
}

/// One frame of scene motion.
pub fn animate(
    world: &mut World,
    camera: &mut Camera,
    rig: &CameraRig,
    input: &InputSnapshot,
    clock: &Time,
) {
    // Pointer tilt is set fresh each frame, never accumulated
    for (_, (transform, tilt)) in world.query_mut::<(&mut Transform, &PointerTilt)>() {
        let (pitch, yaw) = tilt.angles(input.pointer.x, input.pointer.y);
        transform.set_euler(pitch, yaw, 0.0);
    }

    for (_, (transform, spin)) in world.query_mut::<(&mut Transform, &Spin)>() {
        transform.rotate_y(spin.radians_per_frame);
    }

    let dt = clock.delta_seconds();
    for (_, (transform, spin)) in world.query_mut::<(&mut Transform, &TimedSpin)>() {
        transform.rotate_y(spin.radians_per_second * dt);
    }

    let elapsed = clock.elapsed_seconds();
    for (_, (transform, orbit)) in world.query_mut::<(&mut Transform, &Orbit)>() {
        transform.position = orbit.position_at(elapsed);
    }

    let (position, target) = rig.pose(input);
    camera.set_pose(position, target);
}

/// Lights and world-space draw items for the current scene state.
pub fn collect(world: &World) -> (Vec<Light>, Vec<DrawItem>) {
    let lights = world.query::<&Light>().iter().map(|(_, light)| *light).collect();

    let mut cache = HashMap::new();
    let draws = world
        .query::<&Renderable>()
        .iter()
        .map(|(entity, renderable)| DrawItem {
            geometry: renderable.geometry,
            material: renderable.material,
            model: world_matrix(world, entity, &mut cache, 0),
        })
        .collect();
    (lights, draws)
}

pub(crate) fn world_matrix(
    world: &World,
    entity: Entity,
    cache: &mut HashMap<Entity, Mat4>,
    depth: usize,
) -> Mat4 {
    if let Some(m) = cache.get(&entity) {
        return *m;
    }
    let local = world
        .get::<&Transform>(entity)
        .map(|t| t.to_matrix())
        .unwrap_or(Mat4::IDENTITY);
    let parent = world.get::<&Parent>(entity).ok().map(|p| p.0);
    let matrix = match parent {
        Some(parent) if depth < MAX_DEPTH => world_matrix(world, parent, cache, depth + 1) * local,
        _ => local,
    };
    cache.insert(entity, matrix);
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dolly::DollyRig;
    use crate::scheduler::ManualScheduler;
    use engine_core::{GeometryId, MaterialId, Vec3};
    use input::PointerPosition;
    use std::time::Duration;

    fn renderable() -> Renderable {
        Renderable { geometry: GeometryId(1), material: MaterialId(2) }
    }

    #[test]
    fn driver_runs_while_a_frame_is_pending() {
        let mut scheduler = ManualScheduler::new();
        let mut driver = AnimationDriver::start(&mut scheduler, Instant::now());
        assert_eq!(driver.state(), DriverState::Running);
        let fired = scheduler.fire().unwrap();
        assert!(driver.claim(fired));
        assert_eq!(driver.state(), DriverState::Stopped);
        driver.reschedule(&mut scheduler);
        assert!(driver.stop(&mut scheduler));
        assert!(!scheduler.is_pending());
        assert!(!driver.stop(&mut scheduler));
    }

    #[test]
    fn stale_frame_is_not_claimed() {
        let mut scheduler = ManualScheduler::new();
        let mut first = AnimationDriver::start(&mut scheduler, Instant::now());
        let stale = scheduler.fire().unwrap();
        first.stop(&mut scheduler);
        let mut second = AnimationDriver::start(&mut scheduler, Instant::now());
        assert!(!second.claim(stale));
        assert_eq!(second.state(), DriverState::Running);
    }

    #[test]
    fn pointer_tilt_does_not_accumulate() {
        let mut world = World::new();
        let group = world.spawn((
            Transform::default(),
            PointerTilt { yaw_gain: 0.3, pitch_gain: 0.1 },
        ));
        let mut camera = Camera::default();
        let rig = CameraRig::Dolly(DollyRig::default());
        let clock = Time::starting_at(Instant::now());
        let input = InputSnapshot {
            pointer: PointerPosition { x: 0.5, y: 0.5 },
            ..Default::default()
        };

        animate(&mut world, &mut camera, &rig, &input, &clock);
        let once = world.get::<&Transform>(group).unwrap().rotation;
        for _ in 0..50 {
            animate(&mut world, &mut camera, &rig, &input, &clock);
        }
        let many = world.get::<&Transform>(group).unwrap().rotation;
        assert!(once.abs_diff_eq(many, 1e-6));
        let (_, yaw, _) = many.to_euler(engine_core::EulerRot::XYZ);
        assert!((yaw - 0.15).abs() < 1e-4);
    }

    #[test]
    fn spin_ticks_per_frame_regardless_of_delta() {
        let t0 = Instant::now();
        let mut world = World::new();
        let body = world.spawn((Transform::default(), Spin { radians_per_frame: 0.003 }));
        let mut camera = Camera::default();
        let rig = CameraRig::Dolly(DollyRig::default());
        let mut clock = Time::starting_at(t0);
        let input = InputSnapshot::default();
        for i in 1..=10u64 {
            // wildly uneven frame times
            clock.update(t0 + Duration::from_millis(i * i * 37));
            animate(&mut world, &mut camera, &rig, &input, &clock);
        }
        let rotation = world.get::<&Transform>(body).unwrap().rotation;
        assert!(rotation.abs_diff_eq(engine_core::Quat::from_rotation_y(0.03), 1e-5));
    }

    #[test]
    fn orbit_follows_elapsed_time() {
        let t0 = Instant::now();
        let mut world = World::new();
        let orbit = Orbit { radius: 6.0, angular_speed: 0.4 };
        let moon = world.spawn((Transform::default(), orbit));
        let mut camera = Camera::default();
        let rig = CameraRig::Dolly(DollyRig::default());
        let mut clock = Time::starting_at(t0);
        clock.update(t0 + Duration::from_secs(5));
        animate(&mut world, &mut camera, &rig, &InputSnapshot::default(), &clock);
        let p = world.get::<&Transform>(moon).unwrap().position;
        assert!(p.distance(Vec3::new(6.0 * 2f32.cos(), 0.0, 6.0 * 2f32.sin())) < 1e-4);
    }

    #[test]
    fn camera_follows_scroll() {
        let mut world = World::new();
        let mut camera = Camera::default();
        let rig = CameraRig::Dolly(DollyRig::default());
        let clock = Time::starting_at(Instant::now());
        let input = InputSnapshot { scroll_offset: 625.0, ..Default::default() };
        animate(&mut world, &mut camera, &rig, &input, &clock);
        assert!(camera.position().distance(Vec3::new(2.5, 6.0, 3.0)) < 1e-5);
    }

    #[test]
    fn child_matrices_include_parent() {
        let mut world = World::new();
        let group = world.spawn((Transform::from_position(Vec3::new(1.0, 0.0, 0.0)),));
        world.spawn((
            Transform::from_position(Vec3::new(0.0, 2.0, 0.0)),
            renderable(),
            Parent(group),
        ));
        world.spawn((Light::Ambient { color: engine_core::Color::WHITE, intensity: 0.5 },));

        let (lights, draws) = collect(&world);
        assert_eq!(lights.len(), 1);
        assert_eq!(draws.len(), 1);
        let origin = draws[0].model.transform_point3(Vec3::ZERO);
        assert!(origin.distance(Vec3::new(1.0, 2.0, 0.0)) < 1e-6);
    }
}
