//! Stacked-card placement for the visible head of a rotation queue.

use crate::queue::VISIBLE_ITEMS;

/// Spacing of the card stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardLayout {
    /// Vertical step between stacked cards, in logical pixels.
    pub vertical_distance: f32,
}

impl Default for CardLayout {
    fn default() -> Self {
        Self { vertical_distance: 70.0 }
    }
}

/// Where and how one visible card is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardPose {
    /// Position in the queue, 0 is the front card.
    pub index: usize,
    /// Vertical offset from the front card; negative is up.
    pub offset_y: f32,
    pub scale: f32,
    pub opacity: f32,
    /// Higher draws on top.
    pub stack_order: usize,
    pub blurred: bool,
}

impl CardLayout {
    pub fn new(vertical_distance: f32) -> Self {
        Self { vertical_distance }
    }

    /// Poses for the first `min(len, 3)` cards, front card first.
    pub fn poses(&self, len: usize) -> Vec<CardPose> {
        let shown = len.min(VISIBLE_ITEMS);
        (0..shown)
            .map(|index| {
                let i = index as f32;
                CardPose {
                    index,
                    offset_y: -i * self.vertical_distance / 3.0,
                    scale: 1.0 - 0.05 * i,
                    opacity: if index == 0 { 1.0 } else { 1.0 - 0.3 * i },
                    stack_order: len - index,
                    blurred: index > 0,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn front_card_is_plain() {
        let poses = CardLayout::default().poses(4);
        let front = poses[0];
        assert_eq!(front.offset_y, 0.0);
        assert_eq!(front.scale, 1.0);
        assert_eq!(front.opacity, 1.0);
        assert!(!front.blurred);
        assert_eq!(front.stack_order, 4);
    }

    #[test]
    fn back_cards_recede() {
        let poses = CardLayout::new(90.0).poses(3);
        assert_eq!(poses.len(), 3);
        assert!((poses[1].offset_y + 30.0).abs() < 1e-5);
        assert!((poses[2].offset_y + 60.0).abs() < 1e-5);
        assert!((poses[2].scale - 0.9).abs() < 1e-6);
        assert!((poses[2].opacity - 0.4).abs() < 1e-6);
        assert!(poses[1].blurred && poses[2].blurred);
        assert!(poses[0].stack_order > poses[1].stack_order);
    }

    #[test]
    fn at_most_three_poses() {
        assert_eq!(CardLayout::default().poses(9).len(), 3);
        assert_eq!(CardLayout::default().poses(2).len(), 2);
        assert!(CardLayout::default().poses(0).is_empty());
    }
}
