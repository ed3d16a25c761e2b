//! Scroll and pointer state read by the animation loop.
//!
//! Event handlers overwrite the latest values and the frame step reads them;
//! nothing is queued. Handlers only take effect while a subscription is live,
//! and there is at most one subscription at a time.

use engine_core::Viewport;
use glam::Vec2;
use thiserror::Error;

pub mod page;

pub use page::PageScroll;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("input listeners are already registered (subscription {0})")]
    AlreadySubscribed(u64),
}

/// Overall scroll depth in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct ScrollProgress(f32);

impl ScrollProgress {
    /// `offset / max_offset`, clamped; 0 when there is nothing to scroll.
    pub fn from_offset(offset: f32, max_offset: f32) -> Self {
        if max_offset > 0.0 {
            Self((offset / max_offset).clamp(0.0, 1.0))
        } else {
            Self(0.0)
        }
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

/// Pointer position relative to the viewport centre, each axis in [-0.5, 0.5].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerPosition {
    pub x: f32,
    pub y: f32,
}

impl PointerPosition {
    /// Normalize client coordinates (logical pixels, origin top-left).
    pub fn from_client(client: Vec2, viewport: &Viewport) -> Self {
        if viewport.is_empty() {
            return Self::default();
        }
        Self {
            x: (client.x / viewport.width - 0.5).clamp(-0.5, 0.5),
            y: (client.y / viewport.height - 0.5).clamp(-0.5, 0.5),
        }
    }
}

/// Values the frame step reads once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    /// Raw scroll offset in logical pixels.
    pub scroll_offset: f32,
    pub scroll_progress: ScrollProgress,
    pub pointer: PointerPosition,
    /// Last pointer position in logical pixels.
    pub cursor: Vec2,
}

/// Proof that the scroll, pointer and resize listeners are registered.
///
/// Consumed by [`InputTracker::unsubscribe`], so each registration is removed once.
#[derive(Debug, PartialEq, Eq)]
pub struct InputSubscription {
    id: u64,
}

impl InputSubscription {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Latest scroll and pointer state.
#[derive(Debug)]
pub struct InputTracker {
    viewport: Viewport,
    scroll_offset: f32,
    scroll_progress: ScrollProgress,
    pointer: PointerPosition,
    cursor: Vec2,
    /// Id of the live subscription, if any.
    active: Option<u64>,
    next_id: u64,
}

impl InputTracker {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            scroll_offset: 0.0,
            scroll_progress: ScrollProgress::default(),
            pointer: PointerPosition::default(),
            cursor: Vec2::ZERO,
            active: None,
            next_id: 1,
        }
    }

    /// Register the scroll, pointer and resize listeners.
    pub fn subscribe(&mut self, viewport: Viewport) -> Result<InputSubscription, InputError> {
        if let Some(id) = self.active {
            return Err(InputError::AlreadySubscribed(id));
        }
        let id = self.next_id;
        self.next_id += 1;
        self.active = Some(id);
        self.viewport = viewport;
        log::debug!("Input listeners registered (subscription {})", id);
        Ok(InputSubscription { id })
    }

    /// Remove the listeners. Returns false for a subscription that is no longer live.
    pub fn unsubscribe(&mut self, subscription: InputSubscription) -> bool {
        if self.active == Some(subscription.id) {
            self.active = None;
            log::debug!("Input listeners removed (subscription {})", subscription.id);
            true
        } else {
            false
        }
    }

    pub fn is_listening(&self) -> bool {
        self.active.is_some()
    }

    /// Scroll listener. `document_height` is the total content height at the
    /// time of the event; the scrollable range is recomputed from it every call.
    pub fn on_scroll(&mut self, offset: f32, document_height: f32) -> bool {
        if !self.is_listening() {
            return false;
        }
        let max_offset = document_height - self.viewport.height;
        self.scroll_offset = offset.max(0.0);
        self.scroll_progress = ScrollProgress::from_offset(self.scroll_offset, max_offset);
        true
    }

    /// Pointer-move listener, client coordinates in logical pixels.
    pub fn on_pointer_move(&mut self, client: Vec2) -> bool {
        if !self.is_listening() {
            return false;
        }
        self.cursor = client;
        self.pointer = PointerPosition::from_client(client, &self.viewport);
        true
    }

    /// Resize listener.
    pub fn on_resize(&mut self, viewport: Viewport) -> bool {
        if !self.is_listening() {
            return false;
        }
        self.viewport = viewport;
        true
    }

    /// Translate a winit window event into the listeners above. Returns true when
    /// the event changed input state.
    pub fn process_window_event(
        &mut self,
        page: &mut PageScroll,
        event: &winit::event::WindowEvent,
    ) -> bool {
        use winit::event::WindowEvent;

        let scale = f64::from(self.viewport.pixel_ratio.max(f32::EPSILON));
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f32>(scale);
                self.on_pointer_move(Vec2::new(logical.x, logical.y))
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let offset = page.wheel(*delta, self.viewport.pixel_ratio, self.viewport.height);
                self.on_scroll(offset, page.document_height())
            }
            _ => false,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scroll_progress(&self) -> ScrollProgress {
        self.scroll_progress
    }

    pub fn pointer(&self) -> PointerPosition {
        self.pointer
    }

    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            scroll_offset: self.scroll_offset,
            scroll_progress: self.scroll_progress,
            pointer: self.pointer,
            cursor: self.cursor,
        }
    }
}
