//! Pointer picking of hoverable scene nodes.

use std::collections::HashMap;

use engine_core::{Camera, Hoverable, Renderable, Transform, Viewport};
use glam::{Vec2, Vec3};
use hecs::{Entity, World};
use input::PointerPosition;

use crate::driver::world_matrix;

/// World-space ray through the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    /// Ray from the camera through a normalized pointer offset.
    pub fn from_pointer(camera: &Camera, pointer: PointerPosition) -> Self {
        let inverse = camera.view_projection_matrix().inverse();
        // Pointer y grows downwards, clip space y grows upwards
        let ndc = Vec2::new(pointer.x * 2.0, -pointer.y * 2.0);
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        Self { origin: near, direction: (far - near).normalize_or_zero() }
    }

    /// Distance along the ray to the first hit on the sphere, if any.
    pub fn hit_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let m = self.origin - center;
        let m_dot_d = m.dot(self.direction);
        let disc = m_dot_d * m_dot_d - m.length_squared() + radius * radius;
        if disc < 0.0 {
            return None;
        }
        let sqrt_d = disc.sqrt();
        let t1 = -m_dot_d - sqrt_d;
        let t2 = -m_dot_d + sqrt_d;
        if t1 > 0.0 {
            Some(t1)
        } else if t2 > 0.0 {
            Some(t2)
        } else {
            None
        }
    }
}

/// World point to logical pixels (origin top-left). `None` behind the camera.
pub fn project(camera: &Camera, point: Vec3, viewport: &Viewport) -> Option<Vec2> {
    let clip = camera.view_projection_matrix() * point.extend(1.0);
    if clip.w <= 0.0 {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    Some(Vec2::new(
        (ndc.x + 1.0) / 2.0 * viewport.width,
        (1.0 - ndc.y) / 2.0 * viewport.height,
    ))
}

/// The closest hoverable node under the pointer, with its world centre.
pub fn pick(world: &World, camera: &Camera, pointer: PointerPosition) -> Option<(Entity, Vec3)> {
    let ray = Ray::from_pointer(camera, pointer);
    let mut cache = HashMap::new();
    let mut closest: Option<(Entity, f32, Vec3)> = None;
    for (entity, hoverable) in world.query::<&Hoverable>().iter() {
        let matrix = world_matrix(world, entity, &mut cache, 0);
        let center = matrix.transform_point3(Vec3::ZERO);
        let radius = hoverable.radius * matrix.x_axis.truncate().length();
        let Some(t) = ray.hit_sphere(center, radius) else {
            continue;
        };
        if closest.map_or(true, |(_, d, _)| t < d) {
            closest = Some((entity, t, center));
        }
    }
    closest.map(|(entity, _, center)| (entity, center))
}

/// Grow the hovered node and swap in its hover material; every other
/// hoverable goes back to its resting look.
pub fn apply_hover(world: &mut World, hovered: Option<Entity>) {
    for (entity, (transform, renderable, hoverable)) in
        world.query_mut::<(&mut Transform, &mut Renderable, &Hoverable)>()
    {
        if hovered == Some(entity) {
            transform.scale = Vec3::splat(hoverable.hover_scale);
            renderable.material = hoverable.hover_material;
        } else {
            transform.scale = Vec3::ONE;
            renderable.material = hoverable.material;
        }
    }
}

/// The node currently under the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct HoveredNode {
    pub entity: Entity,
    pub label: String,
    /// Screen position of the node centre in logical pixels.
    pub anchor: Vec2,
}

/// Pick under `pointer`, apply the hover look and report the hovered node.
pub fn update_hover(
    world: &mut World,
    camera: &Camera,
    pointer: PointerPosition,
    viewport: &Viewport,
    previous: Option<&HoveredNode>,
) -> Option<HoveredNode> {
    let picked = pick(world, camera, pointer);
    apply_hover(world, picked.map(|(entity, _)| entity));
    let (entity, center) = picked?;
    let label = world.get::<&Hoverable>(entity).ok()?.label.clone();
    if previous.map(|node| node.entity) != Some(entity) {
        log::debug!("Hovering node {:?}", label);
    }
    let anchor = project(camera, center, viewport)?;
    Some(HoveredNode { entity, label, anchor })
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::{GeometryId, MaterialId, Parent};

    fn camera() -> Camera {
        let mut camera = Camera::new(Vec3::new(0.0, 0.0, 4.5), 45.0);
        camera.set_aspect(800.0, 600.0);
        camera.set_pose(Vec3::new(0.0, 0.0, 4.5), Vec3::ZERO);
        camera
    }

    fn node(world: &mut World, position: Vec3, label: &str) -> Entity {
        world.spawn((
            Transform::from_position(position),
            Renderable { geometry: GeometryId(1), material: MaterialId(10) },
            Hoverable {
                label: label.to_string(),
                radius: 0.08,
                material: MaterialId(10),
                hover_material: MaterialId(11),
                hover_scale: 1.5,
            },
        ))
    }

    fn pointer_at(point: Vec3) -> PointerPosition {
        let viewport = Viewport::new(800.0, 600.0, 1.0);
        let screen = project(&camera(), point, &viewport).unwrap();
        PointerPosition::from_client(screen, &viewport)
    }

    #[test]
    fn centre_ray_looks_down_the_view_axis() {
        let ray = Ray::from_pointer(&camera(), PointerPosition::default());
        assert!(ray.direction.distance(Vec3::NEG_Z) < 1e-4);
        assert_eq!(ray.hit_sphere(Vec3::ZERO, 1.0).map(|t| (t * 100.0).round()), Some(340.0));
    }

    #[test]
    fn ray_misses_sphere_off_axis() {
        let ray = Ray { origin: Vec3::ZERO, direction: Vec3::X };
        assert!(ray.hit_sphere(Vec3::new(0.0, 2.0, 0.0), 0.5).is_none());
        // Sphere behind the origin
        assert!(ray.hit_sphere(Vec3::new(-3.0, 0.0, 0.0), 0.5).is_none());
    }

    #[test]
    fn pointer_over_node_picks_it() {
        let mut world = World::new();
        let target = node(&mut world, Vec3::new(0.5, 0.4, 0.0), "Rust");
        node(&mut world, Vec3::new(-0.5, -0.4, 0.0), "Go");
        let (picked, center) = pick(&world, &camera(), pointer_at(Vec3::new(0.5, 0.4, 0.0))).unwrap();
        assert_eq!(picked, target);
        assert!(center.distance(Vec3::new(0.5, 0.4, 0.0)) < 1e-5);
        assert!(pick(&world, &camera(), PointerPosition { x: -0.45, y: 0.45 }).is_none());
    }

    #[test]
    fn nearest_of_overlapping_nodes_wins() {
        let mut world = World::new();
        node(&mut world, Vec3::new(0.0, 0.0, -1.0), "far");
        let near = node(&mut world, Vec3::new(0.0, 0.0, 1.0), "near");
        let (picked, _) = pick(&world, &camera(), PointerPosition::default()).unwrap();
        assert_eq!(picked, near);
    }

    #[test]
    fn pick_follows_parent_transforms() {
        let mut world = World::new();
        let group = world.spawn((Transform::from_position(Vec3::new(0.5, 0.0, 0.0)),));
        let child = node(&mut world, Vec3::ZERO, "child");
        world.insert_one(child, Parent(group)).unwrap();
        let (picked, _) = pick(&world, &camera(), pointer_at(Vec3::new(0.5, 0.0, 0.0))).unwrap();
        assert_eq!(picked, child);
    }

    #[test]
    fn hover_swaps_material_and_scale_back_and_forth() {
        let mut world = World::new();
        let a = node(&mut world, Vec3::ZERO, "a");
        let b = node(&mut world, Vec3::X, "b");
        apply_hover(&mut world, Some(a));
        assert_eq!(world.get::<&Renderable>(a).unwrap().material, MaterialId(11));
        assert_eq!(world.get::<&Transform>(a).unwrap().scale, Vec3::splat(1.5));
        assert_eq!(world.get::<&Renderable>(b).unwrap().material, MaterialId(10));

        apply_hover(&mut world, None);
        assert_eq!(world.get::<&Renderable>(a).unwrap().material, MaterialId(10));
        assert_eq!(world.get::<&Transform>(a).unwrap().scale, Vec3::ONE);
    }
}
