//! Turns a frame's draw items into ordered per-pipeline draws.

use std::collections::HashMap;

use engine_core::{DrawItem, GeometryId, Material, MaterialId, Shading};
use glam::Vec3;

use crate::pipeline::PipelineKind;
use crate::vertex::InstanceData;

/// One instance to draw with one pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedDraw {
    pub kind: PipelineKind,
    pub geometry: GeometryId,
    pub instance: InstanceData,
}

/// Order scene draws: opaque, translucent far-to-near, beams, lines, points.
/// Items whose material is unknown are skipped.
pub fn plan_scene(
    items: &[DrawItem],
    materials: &HashMap<MaterialId, Material>,
    eye: Vec3,
) -> Vec<PlannedDraw> {
    let mut planned: Vec<(f32, PlannedDraw)> = items
        .iter()
        .filter_map(|item| {
            let material = materials.get(&item.material)?;
            let kind = match material.shading {
                Shading::Lit | Shading::Unlit if material.is_translucent() => PipelineKind::Translucent,
                Shading::Lit | Shading::Unlit => PipelineKind::Opaque,
                Shading::Wireframe | Shading::Lines => PipelineKind::Lines,
                Shading::Points => PipelineKind::Points,
                Shading::Beam => PipelineKind::Additive,
            };
            let color = material.color.with_alpha(material.opacity);
            let instance = match material.shading {
                Shading::Beam => InstanceData::beam(item.model, color, &material.flow),
                shading => InstanceData::new(item.model, color, shading == Shading::Lit),
            };
            let distance = item.model.w_axis.truncate().distance_squared(eye);
            Some((distance, PlannedDraw { kind, geometry: item.geometry, instance }))
        })
        .collect();

    planned.sort_by(|(da, a), (db, b)| {
        a.kind.cmp(&b.kind).then_with(|| {
            if a.kind == PipelineKind::Translucent {
                db.total_cmp(da)
            } else {
                std::cmp::Ordering::Equal
            }
        })
    });
    planned.into_iter().map(|(_, draw)| draw).collect()
}

/// Overlay draws in submission order. Only filled shapes are drawn on the overlay.
pub fn plan_overlay(items: &[DrawItem], materials: &HashMap<MaterialId, Material>) -> Vec<PlannedDraw> {
    items
        .iter()
        .filter_map(|item| {
            let material = materials.get(&item.material)?;
            match material.shading {
                Shading::Lit | Shading::Unlit => Some(PlannedDraw {
                    kind: PipelineKind::Overlay,
                    geometry: item.geometry,
                    instance: InstanceData::new(
                        item.model,
                        material.color.with_alpha(material.opacity),
                        false,
                    ),
                }),
                _ => {
                    log::debug!("Skipping non-filled overlay item {:?}", item.material);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertex::MODE_BEAM;
    use engine_core::{BeamFlow, Color};
    use glam::Mat4;

    fn materials() -> HashMap<MaterialId, Material> {
        HashMap::from([
            (MaterialId(1), Material::new(Color::WHITE, 1.0, Shading::Lit)),
            (MaterialId(2), Material::new(Color::WHITE, 0.2, Shading::Unlit)),
            (MaterialId(3), Material::new(Color::WHITE, 0.6, Shading::Points)),
            (MaterialId(4), Material::new(Color::WHITE, 0.2, Shading::Wireframe)),
            (
                MaterialId(5),
                Material::beam(
                    Color::from_hex(0xff79c6),
                    BeamFlow { speed: 2.0, horizontal_offset: 0.25, vertical_offset: -0.5 },
                ),
            ),
        ])
    }

    fn item(material: u64, at: Vec3) -> DrawItem {
        DrawItem {
            geometry: GeometryId(material * 10),
            material: MaterialId(material),
            model: Mat4::from_translation(at),
        }
    }

    #[test]
    fn draws_are_grouped_by_pipeline() {
        let items = [
            item(3, Vec3::ZERO),
            item(2, Vec3::ZERO),
            item(4, Vec3::ZERO),
            item(1, Vec3::ZERO),
        ];
        let kinds: Vec<PipelineKind> =
            plan_scene(&items, &materials(), Vec3::Z).iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            [PipelineKind::Opaque, PipelineKind::Translucent, PipelineKind::Lines, PipelineKind::Points]
        );
    }

    #[test]
    fn beams_are_additive_and_carry_their_flow() {
        let items = [item(5, Vec3::ZERO), item(2, Vec3::ZERO), item(4, Vec3::ZERO)];
        let plan = plan_scene(&items, &materials(), Vec3::Z);
        let kinds: Vec<PipelineKind> = plan.iter().map(|d| d.kind).collect();
        assert_eq!(kinds, [PipelineKind::Translucent, PipelineKind::Additive, PipelineKind::Lines]);
        assert_eq!(plan[1].instance.params, [MODE_BEAM, 2.0, 0.25, -0.5]);
        assert_eq!(plan[1].instance.color[3], 1.0);
    }

    #[test]
    fn beams_stay_off_the_overlay() {
        assert!(plan_overlay(&[item(5, Vec3::ZERO)], &materials()).is_empty());
    }

    #[test]
    fn translucent_draws_far_to_near() {
        let items = [item(2, Vec3::new(0.0, 0.0, 5.0)), item(2, Vec3::new(0.0, 0.0, -5.0))];
        let plan = plan_scene(&items, &materials(), Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(plan[0].instance.model[3][2], -5.0);
    }

    #[test]
    fn unknown_material_is_skipped() {
        let plan = plan_scene(&[item(9, Vec3::ZERO)], &materials(), Vec3::ZERO);
        assert!(plan.is_empty());
    }

    #[test]
    fn overlay_keeps_order_and_drops_lines() {
        let items = [item(2, Vec3::X), item(4, Vec3::ZERO), item(1, Vec3::Y)];
        let plan = plan_overlay(&items, &materials());
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].instance.model[3][0], 1.0);
        assert_eq!(plan[1].instance.params[0], 0.0);
    }
}
