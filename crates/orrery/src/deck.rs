//! The carousel drawn as a stack of flat cards on the screen-space overlay.

use carousel::{CardLayout, CardPose};
use engine_core::{Color, DrawItem, Geometry, GeometryId, GraphicsDevice, GraphicsError, Material, MaterialId, Shading, Viewport};
use glam::Vec2;
use scene::Allocations;

use crate::label::{box_model, label_width};

pub const CARD_SIZE: Vec2 = Vec2::new(320.0, 200.0);
/// Gap between the front card and the bottom-right corner of the window.
pub const DECK_MARGIN: f32 = 48.0;
/// Blurred cards get a faint halo this much larger than the card.
const HALO_SCALE: f32 = 1.06;
const HALO_OPACITY: f32 = 0.35;

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub label: String,
    pub color: Color,
}

/// Screen rectangle of one visible card, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardRect {
    /// Position in the queue, 0 is the front card.
    pub slot: usize,
    pub center: Vec2,
    pub size: Vec2,
    pub blurred: bool,
}

impl CardRect {
    pub fn contains(&self, point: Vec2) -> bool {
        let half = self.size / 2.0;
        (point - self.center).abs().cmple(half).all()
    }
}

/// Centre of the front card for a viewport.
fn anchor(viewport: &Viewport) -> Vec2 {
    Vec2::new(viewport.width, viewport.height) - Vec2::splat(DECK_MARGIN) - CARD_SIZE / 2.0
}

/// Rectangles of the visible cards, back to front.
pub fn card_rects(layout: &CardLayout, len: usize, viewport: &Viewport) -> Vec<CardRect> {
    let anchor = anchor(viewport);
    let mut poses = layout.poses(len);
    poses.sort_by_key(|pose| pose.stack_order);
    poses
        .into_iter()
        .map(|pose| CardRect {
            slot: pose.index,
            center: anchor + Vec2::new(0.0, pose.offset_y),
            size: CARD_SIZE * pose.scale,
            blurred: pose.blurred,
        })
        .collect()
}

/// Number of drawable opacity steps; a pose is drawn with the nearest one.
pub const OPACITY_LEVELS: usize = 10;
/// Height of the label strip along the top of a card.
pub const STRIP_HEIGHT: f32 = 28.0;
/// Space between the strip and the card's top edge.
const STRIP_INSET: f32 = 12.0;
const STRIP_OPACITY: f32 = 0.35;

/// Nearest opacity step, 0 meaning invisible.
fn opacity_level(opacity: f32) -> usize {
    (opacity.clamp(0.0, 1.0) * OPACITY_LEVELS as f32).round() as usize
}

/// GPU resources for the card stack. Opacity is fixed per material, so each
/// card gets one material per opacity step.
#[derive(Debug, Default)]
pub struct CardDeck {
    layout: CardLayout,
    quad: Option<GeometryId>,
    /// `bodies[card][level - 1]`
    bodies: Vec<Vec<MaterialId>>,
    halos: Vec<Vec<MaterialId>>,
    strips: Vec<MaterialId>,
    label_widths: Vec<f32>,
    allocations: Allocations,
}

impl CardDeck {
    /// Allocate the deck. On error nothing stays allocated.
    pub fn new<D: GraphicsDevice>(
        device: &mut D,
        cards: &[Card],
        layout: CardLayout,
    ) -> Result<Self, GraphicsError> {
        let mut deck = Self { layout, ..Self::default() };
        if let Err(err) = deck.allocate(device, cards) {
            deck.release(device);
            return Err(err);
        }
        Ok(deck)
    }

    fn allocate<D: GraphicsDevice>(&mut self, device: &mut D, cards: &[Card]) -> Result<(), GraphicsError> {
        if cards.is_empty() {
            return Ok(());
        }
        self.quad = Some(self.allocations.geometry(device, &Geometry::Quad { width: 1.0, height: 1.0 })?);
        let levels = (1..=OPACITY_LEVELS).map(|level| level as f32 / OPACITY_LEVELS as f32);
        for opacity in levels.clone() {
            let strip = Material::new(Color::BLACK, opacity * STRIP_OPACITY, Shading::Unlit);
            self.strips.push(self.allocations.material(device, &strip)?);
        }
        for card in cards {
            let mut body = Vec::with_capacity(OPACITY_LEVELS);
            let mut halo = Vec::with_capacity(OPACITY_LEVELS);
            for opacity in levels.clone() {
                body.push(
                    self.allocations
                        .material(device, &Material::new(card.color, opacity, Shading::Unlit))?,
                );
                halo.push(self.allocations.material(
                    device,
                    &Material::new(card.color, opacity * HALO_OPACITY, Shading::Unlit),
                )?);
            }
            self.bodies.push(body);
            self.halos.push(halo);
            self.label_widths.push(label_width(&card.label).min(CARD_SIZE.x - 2.0 * STRIP_INSET));
        }
        Ok(())
    }

    /// Overlay draws for `(card index, pose)` pairs, back to front.
    pub fn overlay(&self, poses: &[(usize, CardPose)], viewport: &Viewport) -> Vec<DrawItem> {
        let Some(quad) = self.quad else {
            return Vec::new();
        };
        let anchor = anchor(viewport);
        let mut draws = Vec::new();
        for &(card, pose) in poses {
            let level = opacity_level(pose.opacity);
            if level == 0 {
                continue;
            }
            let (Some(body), Some(halo), Some(&strip_width)) =
                (self.bodies.get(card), self.halos.get(card), self.label_widths.get(card))
            else {
                continue;
            };
            let center = anchor + Vec2::new(0.0, pose.offset_y);
            let size = CARD_SIZE * pose.scale;
            if pose.blurred {
                draws.push(DrawItem {
                    geometry: quad,
                    material: halo[level - 1],
                    model: box_model(center, size * HALO_SCALE),
                });
            }
            draws.push(DrawItem { geometry: quad, material: body[level - 1], model: box_model(center, size) });

            let strip_size = Vec2::new(strip_width, STRIP_HEIGHT) * pose.scale;
            let strip_center =
                center - Vec2::new(0.0, size.y / 2.0 - (STRIP_INSET + STRIP_HEIGHT / 2.0) * pose.scale);
            draws.push(DrawItem {
                geometry: quad,
                material: self.strips[level - 1],
                model: box_model(strip_center, strip_size),
            });
        }
        draws
    }

    /// Whether `point` lies on any visible card at rest.
    pub fn hit(&self, point: Vec2, len: usize, viewport: &Viewport) -> bool {
        card_rects(&self.layout, len, viewport).iter().any(|rect| rect.contains(point))
    }

    pub fn release<D: GraphicsDevice>(&mut self, device: &mut D) {
        self.allocations.release(device);
        self.quad = None;
        self.bodies.clear();
        self.halos.clear();
        self.strips.clear();
        self.label_widths.clear();
    }
}
