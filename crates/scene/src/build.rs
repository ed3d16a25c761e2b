//! Scene builders: turn a [`SceneConfig`] into entities and GPU allocations.

use std::f32::consts::FRAC_PI_2;

use engine_core::{
    Camera, Color, Geometry, GeometryId, GraphicsDevice, GraphicsError, Hoverable, Light,
    Material, MaterialId, Orbit, Parent, PointerTilt, Quat, Renderable, Shading, Spin,
    TimedSpin, Transform,
};
use glam::Vec3;
use hecs::World;
use procgen::{skill_nodes, star_field, StarShell};

use crate::config::{SceneConfig, SceneKind};
use crate::dolly::{CameraRig, DollyRig};

/// Globe node radius.
const NODE_RADIUS: f32 = 0.08;
/// Hovered globe nodes grow by this much and turn this colour.
const NODE_HOVER_SCALE: f32 = 1.5;
const NODE_HOVER_COLOR: u32 = 0x4ade80;
/// Side of the square the laser beams flow over.
const LASER_PLANE_SIZE: f32 = 10.0;

/// Every geometry and material a scene allocated, in allocation order.
///
/// Each id is recorded once, so shared resources are released once.
#[derive(Debug, Default)]
pub struct Allocations {
    geometries: Vec<GeometryId>,
    materials: Vec<MaterialId>,
}

impl Allocations {
    pub fn geometry<D: GraphicsDevice>(
        &mut self,
        device: &mut D,
        geometry: &Geometry,
    ) -> Result<GeometryId, GraphicsError> {
        let id = device.create_geometry(geometry)?;
        self.geometries.push(id);
        Ok(id)
    }

    pub fn material<D: GraphicsDevice>(
        &mut self,
        device: &mut D,
        material: &Material,
    ) -> Result<MaterialId, GraphicsError> {
        let id = device.create_material(material)?;
        self.materials.push(id);
        Ok(id)
    }

    /// Release everything recorded so far, newest first.
    pub fn release<D: GraphicsDevice>(&mut self, device: &mut D) {
        for id in self.materials.drain(..).rev() {
            device.release_material(id);
        }
        for id in self.geometries.drain(..).rev() {
            device.release_geometry(id);
        }
    }

    pub fn len(&self) -> usize {
        self.geometries.len() + self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty() && self.materials.is_empty()
    }
}

/// A built scene, not yet bound to a surface or a loop.
pub struct BuiltScene {
    pub world: World,
    pub camera: Camera,
    pub rig: CameraRig,
}

/// Build the scene `config` describes. Whatever is allocated is recorded in
/// `allocations` even when this fails part way, so the caller can roll back.
pub fn build_scene<D: GraphicsDevice>(
    device: &mut D,
    config: &SceneConfig,
    allocations: &mut Allocations,
) -> Result<BuiltScene, GraphicsError> {
    let mut world = World::new();
    let (camera, rig) = match config.kind {
        SceneKind::Hero => build_hero(device, config, allocations, &mut world)?,
        SceneKind::Globe => build_globe(device, config, allocations, &mut world)?,
        SceneKind::Laser => build_laser(device, config, allocations, &mut world)?,
    };
    log::debug!(
        "Built {:?} scene: {} entities, {} allocations",
        config.kind,
        world.len(),
        allocations.len()
    );
    Ok(BuiltScene { world, camera, rig })
}

fn build_hero<D: GraphicsDevice>(
    device: &mut D,
    config: &SceneConfig,
    allocs: &mut Allocations,
    world: &mut World,
) -> Result<(Camera, CameraRig), GraphicsError> {
    let palette = config.palette();

    // Background field
    let stars = star_field(config.star_count, config.star_seed, StarShell::default());
    let geometry = allocs.geometry(device, &Geometry::Points(stars))?;
    let material =
        allocs.material(device, &Material::new(palette.foreground, 0.6, Shading::Points))?;
    world.spawn((Transform::default(), Renderable { geometry, material }));

    // Sun
    let geometry = allocs.geometry(device, &sphere(6.0, 32, 32))?;
    let material =
        allocs.material(device, &Material::new(palette.foreground, 0.8, Shading::Unlit))?;
    world.spawn((
        Transform::from_position(Vec3::new(60.0, 15.0, 60.0)),
        Renderable { geometry, material },
    ));

    // Earth group, tilted by the pointer
    let group = world.spawn((
        Transform::default(),
        PointerTilt { yaw_gain: 0.3, pitch_gain: 0.1 },
    ));

    let earth = allocs.geometry(device, &sphere(2.5, 32, 32))?;
    let material =
        allocs.material(device, &Material::new(palette.foreground, 0.9, Shading::Lit))?;
    world.spawn((
        Transform::default(),
        Renderable { geometry: earth, material },
        Parent(group),
        Spin { radians_per_frame: 0.003 },
    ));

    // Wireframe overlay shares the earth geometry
    let material =
        allocs.material(device, &Material::new(palette.wireframe, 0.2, Shading::Wireframe))?;
    world.spawn((
        Transform::default(),
        Renderable { geometry: earth, material },
        Parent(group),
        Spin { radians_per_frame: 0.0025 },
    ));

    let orbit = Orbit { radius: 6.0, angular_speed: 0.4 };
    let geometry = allocs.geometry(device, &sphere(0.4, 16, 16))?;
    let material = allocs.material(device, &Material::new(palette.satellite, 0.8, Shading::Lit))?;
    world.spawn((
        Transform::from_position(orbit.position_at(0.0)),
        Renderable { geometry, material },
        Parent(group),
        Spin { radians_per_frame: 0.002 },
        orbit,
    ));

    let geometry = allocs.geometry(
        device,
        &Geometry::Ring { inner_radius: 5.8, outer_radius: 6.2, segments: 64 },
    )?;
    let material =
        allocs.material(device, &Material::new(palette.foreground, 0.1, Shading::Unlit))?;
    world.spawn((
        Transform::from_position_rotation(Vec3::ZERO, Quat::from_rotation_x(FRAC_PI_2)),
        Renderable { geometry, material },
        Parent(group),
    ));

    world.spawn((Light::Ambient { color: palette.ambient, intensity: 0.6 },));
    world.spawn((Light::Directional {
        color: palette.directional,
        intensity: 0.8,
        position: Vec3::new(50.0, 50.0, 50.0),
    },));

    let rig = DollyRig::default();
    let (position, target) = rig.pose(0.0);
    let mut camera = Camera::new(position, 60.0);
    camera.set_pose(position, target);
    Ok((camera, CameraRig::Dolly(rig)))
}

fn build_globe<D: GraphicsDevice>(
    device: &mut D,
    config: &SceneConfig,
    allocs: &mut Allocations,
    world: &mut World,
) -> Result<(Camera, CameraRig), GraphicsError> {
    let group = world.spawn((Transform::default(), TimedSpin { radians_per_second: 0.1 }));

    let geometry = allocs.geometry(device, &sphere(1.31, 24, 24))?;
    let material = allocs.material(
        device,
        &Material::new(Color::from_hex(0x38bdf8), 0.05, Shading::Wireframe),
    )?;
    world.spawn((Transform::default(), Renderable { geometry, material }, Parent(group)));

    let nodes = skill_nodes(
        config.skills.iter().map(|s| (s.label.clone(), s.color)),
        config.globe_radius,
    );
    let node_sphere = allocs.geometry(device, &sphere(NODE_RADIUS, 16, 16))?;
    let hover_material = allocs.material(
        device,
        &Material::new(Color::from_hex(NODE_HOVER_COLOR), 1.0, Shading::Unlit),
    )?;
    for node in &nodes {
        let material = allocs.material(device, &Material::new(node.color, 1.0, Shading::Lit))?;
        // The anchor carries the position so hover scaling leaves the spoke alone
        let anchor = world.spawn((Transform::from_position(node.position), Parent(group)));
        world.spawn((
            Transform::default(),
            Renderable { geometry: node_sphere, material },
            Hoverable {
                label: node.label.clone(),
                radius: NODE_RADIUS,
                material,
                hover_material,
                hover_scale: NODE_HOVER_SCALE,
            },
            Parent(anchor),
        ));

        let geometry =
            allocs.geometry(device, &Geometry::Polyline(vec![Vec3::ZERO, node.spoke_end()]))?;
        let material = allocs.material(device, &Material::new(node.color, 0.1, Shading::Lines))?;
        world.spawn((Transform::default(), Renderable { geometry, material }, Parent(anchor)));
    }

    world.spawn((Light::Ambient { color: Color::WHITE, intensity: 0.5 },));
    world.spawn((Light::Point {
        color: Color::WHITE,
        intensity: 1.0,
        position: Vec3::splat(10.0),
    },));
    world.spawn((Light::Point {
        color: Color::from_hex(0x4ade80),
        intensity: 0.5,
        position: Vec3::splat(-10.0),
    },));
    world.spawn((Light::Spot {
        color: Color::from_hex(0x06b6d4),
        intensity: 1.5,
        position: Vec3::new(0.0, 5.0, 0.0),
        angle: 0.5,
        penumbra: 1.0,
    },));

    let position = Vec3::new(0.0, 0.0, 4.5);
    let mut camera = Camera::new(position, 45.0);
    camera.set_pose(position, Vec3::ZERO);
    Ok((camera, CameraRig::Fixed { position, target: Vec3::ZERO }))
}

fn build_laser<D: GraphicsDevice>(
    device: &mut D,
    config: &SceneConfig,
    allocs: &mut Allocations,
    world: &mut World,
) -> Result<(Camera, CameraRig), GraphicsError> {
    let laser = config.laser;
    // Unit quad scaled up, so the shader can read UVs off local positions
    let geometry = allocs.geometry(device, &Geometry::Quad { width: 1.0, height: 1.0 })?;
    let material = allocs.material(device, &Material::beam(laser.color, laser.flow))?;
    let mut transform = Transform::default();
    transform.scale = Vec3::new(LASER_PLANE_SIZE, LASER_PLANE_SIZE, 1.0);
    world.spawn((transform, Renderable { geometry, material }));

    let position = Vec3::new(0.0, 0.0, 2.0);
    let mut camera = Camera::new(position, 50.0);
    camera.set_pose(position, Vec3::ZERO);
    Ok((camera, CameraRig::Fixed { position, target: Vec3::ZERO }))
}

fn sphere(radius: f32, segments: u32, rings: u32) -> Geometry {
    Geometry::Sphere { radius, segments, rings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;
    use crate::testing::RecordingDevice;

    #[test]
    fn hero_shares_earth_geometry() {
        let mut device = RecordingDevice::default();
        let mut allocs = Allocations::default();
        let scene = build_scene(&mut device, &SceneConfig::default(), &mut allocs).unwrap();

        // stars, sun, earth, moon, ring
        assert_eq!(device.geometries_created, 5);
        // earth and wireframe draw the same geometry
        let mut geometries: Vec<GeometryId> =
            scene.world.query::<&Renderable>().iter().map(|(_, r)| r.geometry).collect();
        let drawn = geometries.len();
        geometries.sort_by_key(|g| g.0);
        geometries.dedup();
        assert_eq!(drawn, 6);
        assert_eq!(geometries.len(), 5);
    }

    #[test]
    fn hero_lights_follow_theme() {
        let mut device = RecordingDevice::default();
        let mut allocs = Allocations::default();
        let config = SceneConfig::default().with_theme(Theme::Light);
        let scene = build_scene(&mut device, &config, &mut allocs).unwrap();
        let ambient = scene
            .world
            .query::<&Light>()
            .iter()
            .find_map(|(_, light)| match light {
                Light::Ambient { color, .. } => Some(*color),
                _ => None,
            });
        assert_eq!(ambient, Some(Color::from_hex(0x808080)));
    }

    #[test]
    fn globe_has_one_anchor_and_spoke_per_skill() {
        let mut device = RecordingDevice::default();
        let mut allocs = Allocations::default();
        let config = SceneConfig::default().with_kind(SceneKind::Globe);
        let scene = build_scene(&mut device, &config, &mut allocs).unwrap();
        let skills = config.skills.len();
        // shell + one node + one spoke per skill
        assert_eq!(scene.world.query::<&Renderable>().iter().count(), 1 + 2 * skills);
        // shell, shared node sphere, one spoke each
        assert_eq!(device.geometries_created, 2 + skills);
        assert_eq!(scene.world.query::<&Light>().iter().count(), 4);
        assert_eq!(scene.camera.fov_degrees, 45.0);
        // one material per renderable plus the shared hover material
        assert_eq!(device.materials_created, 2 + 2 * skills);
    }

    #[test]
    fn globe_nodes_carry_their_labels() {
        let mut device = RecordingDevice::default();
        let mut allocs = Allocations::default();
        let config = SceneConfig::default().with_kind(SceneKind::Globe);
        let scene = build_scene(&mut device, &config, &mut allocs).unwrap();
        let mut labels: Vec<String> =
            scene.world.query::<&Hoverable>().iter().map(|(_, h)| h.label.clone()).collect();
        labels.sort();
        let mut expected: Vec<String> = config.skills.iter().map(|s| s.label.clone()).collect();
        expected.sort();
        assert_eq!(labels, expected);

        let hover = device
            .material_log
            .iter()
            .find(|m| m.color == Color::from_hex(NODE_HOVER_COLOR))
            .copied();
        assert_eq!(hover.map(|m| m.shading), Some(Shading::Unlit));
    }

    #[test]
    fn laser_is_one_beam_plane() {
        let mut device = RecordingDevice::default();
        let mut allocs = Allocations::default();
        let mut config = SceneConfig::default().with_kind(SceneKind::Laser);
        config.laser.flow.speed = 2.5;
        config.laser.flow.vertical_offset = -0.5;
        let scene = build_scene(&mut device, &config, &mut allocs).unwrap();

        assert_eq!(allocs.len(), 2);
        assert_eq!(scene.world.query::<&Renderable>().iter().count(), 1);
        assert_eq!(scene.world.query::<&Light>().iter().count(), 0);
        let beam = device.material_log[0];
        assert_eq!(beam.shading, Shading::Beam);
        assert_eq!(beam.color, Color::from_hex(crate::config::DEFAULT_LASER_COLOR));
        assert_eq!(beam.flow.speed, 2.5);
        assert_eq!(beam.flow.vertical_offset, -0.5);
        assert_eq!(scene.camera.position(), Vec3::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn failed_build_keeps_partial_record() {
        let mut device = RecordingDevice::failing_after(3);
        let mut allocs = Allocations::default();
        assert!(build_scene(&mut device, &SceneConfig::default(), &mut allocs).is_err());
        assert_eq!(allocs.len(), 3);
        allocs.release(&mut device);
        assert!(allocs.is_empty());
        assert_eq!(device.live_resources(), 0);
    }
}
