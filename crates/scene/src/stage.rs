//! Scene Resource Manager.
//!
//! [`Stage::create`] acquires a surface, builds the scene, registers input and
//! starts the animation loop. [`Stage::destroy`] undoes all of it in a fixed
//! order: cancel the pending frame, remove the input listeners, detach the
//! surface (skipped when the mount is gone), release the surface, then release
//! every geometry and material.

use std::time::Instant;

use engine_core::{Camera, DrawItem, Frame, GraphicsDevice, Mount, SurfaceId, Viewport};
use hecs::World;
use input::{InputSubscription, InputTracker};

use crate::build::{build_scene, Allocations};
use crate::config::{SceneConfig, CLEAR_ALPHA};
use crate::dolly::CameraRig;
use crate::driver::{collect, AnimationDriver, DriverState};
use crate::error::SceneError;
use crate::pick::{update_hover, HoveredNode};
use crate::scheduler::FrameScheduler;

/// Names one created scene. Stays valid to pass to [`Stage::destroy`] after
/// the scene is gone; destroying it again does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneHandle(u64);

struct LiveScene<M> {
    handle: SceneHandle,
    config: SceneConfig,
    mount: M,
    surface: SurfaceId,
    allocations: Allocations,
    world: World,
    camera: Camera,
    rig: CameraRig,
    driver: AnimationDriver,
    subscription: InputSubscription,
    hovered: Option<HoveredNode>,
}

/// Owns the device, the frame scheduler and the input tracker, and at most one live scene.
pub struct Stage<D: GraphicsDevice, S: FrameScheduler> {
    device: D,
    scheduler: S,
    input: InputTracker,
    live: Option<LiveScene<D::Mount>>,
    /// Mount of the last scene once it is gone, for [`Stage::recreate`].
    last_mount: Option<D::Mount>,
    next_handle: u64,
}

impl<D: GraphicsDevice, S: FrameScheduler> Stage<D, S> {
    pub fn new(device: D, scheduler: S, viewport: Viewport) -> Self {
        Self {
            device,
            scheduler,
            input: InputTracker::new(viewport),
            live: None,
            last_mount: None,
            next_handle: 1,
        }
    }

    /// Build a scene for `config` on `mount`. Any live scene is destroyed first.
    ///
    /// On error nothing stays allocated.
    pub fn create(
        &mut self,
        config: SceneConfig,
        mount: D::Mount,
        viewport: Viewport,
        now: Instant,
    ) -> Result<SceneHandle, SceneError> {
        if let Some(handle) = self.live_handle() {
            self.destroy(handle);
        }
        if !mount.is_attached() {
            return Err(SceneError::MountDetached);
        }
        if viewport.is_empty() {
            self.last_mount = Some(mount);
            return Err(SceneError::EmptyViewport { width: viewport.width, height: viewport.height });
        }

        let clear = config.palette().clear.with_alpha(CLEAR_ALPHA);
        let surface = match self.device.create_surface(&mount, viewport, clear) {
            Ok(surface) => surface,
            Err(err) => {
                self.last_mount = Some(mount);
                return Err(err.into());
            }
        };

        let mut allocations = Allocations::default();
        let built = match build_scene(&mut self.device, &config, &mut allocations) {
            Ok(built) => built,
            Err(err) => {
                self.rollback(&mount, surface, &mut allocations);
                self.last_mount = Some(mount);
                return Err(err.into());
            }
        };
        let subscription = match self.input.subscribe(viewport) {
            Ok(sub) => sub,
            Err(err) => {
                self.rollback(&mount, surface, &mut allocations);
                self.last_mount = Some(mount);
                return Err(err.into());
            }
        };

        let mut camera = built.camera;
        camera.set_aspect(viewport.width, viewport.height);
        let driver = AnimationDriver::start(&mut self.scheduler, now);

        let handle = SceneHandle(self.next_handle);
        self.next_handle += 1;
        log::info!(
            "Scene {:?} created ({:?}, {:?} theme, {} allocations)",
            handle,
            config.kind,
            config.theme,
            allocations.len()
        );
        self.last_mount = None;
        self.live = Some(LiveScene {
            handle,
            config,
            mount,
            surface,
            allocations,
            world: built.world,
            camera,
            rig: built.rig,
            driver,
            subscription,
            hovered: None,
        });
        Ok(handle)
    }

    /// Tear the scene down. Returns false (and does nothing) if `handle` is not live.
    pub fn destroy(&mut self, handle: SceneHandle) -> bool {
        let Some(mut scene) = self.live.take_if(|scene| scene.handle == handle) else {
            return false;
        };

        scene.driver.stop(&mut self.scheduler);
        self.input.unsubscribe(scene.subscription);
        if scene.mount.is_attached() {
            self.device.detach_surface(scene.surface, &scene.mount);
        } else {
            log::debug!("Mount already gone, skipping surface detach");
        }
        self.device.release_surface(scene.surface);
        scene.allocations.release(&mut self.device);
        scene.world.clear();

        log::info!("Scene {:?} destroyed after {} frames", handle, scene.driver.frames());
        self.last_mount = Some(scene.mount);
        true
    }

    /// Destroy the live scene and build `config` on the same mount. Without a
    /// live scene, builds on the mount of the last one (even if it failed to
    /// build). Returns `Ok(None)` if no scene was ever created.
    pub fn recreate(
        &mut self,
        config: SceneConfig,
        viewport: Viewport,
        now: Instant,
    ) -> Result<Option<SceneHandle>, SceneError>
    where
        D::Mount: Clone,
    {
        let mount = match &self.live {
            Some(scene) => scene.mount.clone(),
            None => match self.last_mount.clone() {
                Some(mount) => mount,
                None => return Ok(None),
            },
        };
        self.create(config, mount, viewport, now).map(Some)
    }

    /// Viewport size changed: camera aspect, surface size and pointer normalization follow.
    pub fn resize(&mut self, viewport: Viewport) {
        self.input.on_resize(viewport);
        let Some(scene) = self.live.as_mut() else {
            return;
        };
        scene.camera.set_aspect(viewport.width, viewport.height);
        if !viewport.is_empty() {
            self.device.resize_surface(scene.surface, viewport);
        }
    }

    /// The display refreshed. Steps and renders the live scene if its frame
    /// request is the one that fired. Returns whether a frame was rendered.
    pub fn on_refresh(&mut self, now: Instant, overlay: &[DrawItem]) -> Result<bool, SceneError> {
        let Some(fired) = self.scheduler.fire() else {
            return Ok(false);
        };
        let Some(scene) = self.live.as_mut() else {
            return Ok(false);
        };
        if !scene.driver.claim(fired) {
            return Ok(false);
        }

        let input = self.input.snapshot();
        scene.driver.step(&mut scene.world, &mut scene.camera, &scene.rig, &input, now);
        scene.hovered = update_hover(
            &mut scene.world,
            &scene.camera,
            input.pointer,
            &self.input.viewport(),
            scene.hovered.as_ref(),
        );
        let (lights, draws) = collect(&scene.world);
        let frame = Frame {
            camera: &scene.camera,
            lights: &lights,
            draws: &draws,
            overlay,
            time: scene.driver.clock().elapsed_seconds(),
        };
        let rendered = self.device.render(scene.surface, &frame);
        scene.driver.reschedule(&mut self.scheduler);
        rendered?;
        Ok(true)
    }

    pub fn live_handle(&self) -> Option<SceneHandle> {
        self.live.as_ref().map(|scene| scene.handle)
    }

    pub fn live_config(&self) -> Option<&SceneConfig> {
        self.live.as_ref().map(|scene| &scene.config)
    }

    /// The node under the pointer as of the last rendered frame.
    pub fn hovered_node(&self) -> Option<&HoveredNode> {
        self.live.as_ref().and_then(|scene| scene.hovered.as_ref())
    }

    pub fn driver_state(&self) -> DriverState {
        self.live.as_ref().map_or(DriverState::Stopped, |scene| scene.driver.state())
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.live.as_ref().map(|scene| &scene.camera)
    }

    pub fn input(&self) -> &InputTracker {
        &self.input
    }

    /// Event handlers write here.
    pub fn input_mut(&mut self) -> &mut InputTracker {
        &mut self.input
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    fn rollback(&mut self, mount: &D::Mount, surface: SurfaceId, allocations: &mut Allocations) {
        log::warn!("Scene creation failed, releasing {} allocations", allocations.len());
        allocations.release(&mut self.device);
        if mount.is_attached() {
            self.device.detach_surface(surface, mount);
        }
        self.device.release_surface(surface);
    }
}

impl<D: GraphicsDevice, S: FrameScheduler> Drop for Stage<D, S> {
    fn drop(&mut self) {
        if let Some(handle) = self.live_handle() {
            self.destroy(handle);
        }
    }
}
