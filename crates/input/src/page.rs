//! Virtual page scrolling for hosts without a native scroll container.

use winit::event::MouseScrollDelta;

/// A page of fixed content height scrolled by the mouse wheel.
#[derive(Debug, Clone, PartialEq)]
pub struct PageScroll {
    document_height: f32,
    /// Logical pixels per wheel line.
    line_height: f32,
    offset: f32,
}

impl PageScroll {
    pub fn new(document_height: f32, line_height: f32) -> Self {
        Self {
            document_height: document_height.max(0.0),
            line_height,
            offset: 0.0,
        }
    }

    pub fn document_height(&self) -> f32 {
        self.document_height
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Largest offset for a viewport of `viewport_height`.
    pub fn max_offset(&self, viewport_height: f32) -> f32 {
        (self.document_height - viewport_height).max(0.0)
    }

    /// Scroll by `delta` logical pixels (positive = down) and return the new offset.
    pub fn scroll_by(&mut self, delta: f32, viewport_height: f32) -> f32 {
        self.offset = (self.offset + delta).clamp(0.0, self.max_offset(viewport_height));
        self.offset
    }

    /// Apply a wheel event. Wheel-up deltas are positive and scroll toward the top.
    pub fn wheel(&mut self, delta: MouseScrollDelta, pixel_ratio: f32, viewport_height: f32) -> f32 {
        let pixels = match delta {
            MouseScrollDelta::LineDelta(_, y) => y * self.line_height,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / pixel_ratio.max(f32::EPSILON),
        };
        self.scroll_by(-pixels, viewport_height)
    }
}
