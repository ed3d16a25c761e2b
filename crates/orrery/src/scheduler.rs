use std::sync::Arc;

use scene::{FrameHandle, FrameId, FrameScheduler, FrameSlot};
use winit::window::Window;

/// Frame requests backed by the window's redraw requests.
///
/// A cancelled request may still produce a `RedrawRequested` event; `fire`
/// then returns `None` and the refresh is ignored.
pub struct RedrawScheduler {
    window: Arc<Window>,
    slot: FrameSlot,
}

impl RedrawScheduler {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window, slot: FrameSlot::default() }
    }
}

impl FrameScheduler for RedrawScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.window.request_redraw();
        self.slot.request()
    }

    fn cancel_frame(&mut self, handle: FrameHandle) -> bool {
        self.slot.cancel(handle)
    }

    fn fire(&mut self) -> Option<FrameId> {
        self.slot.fire()
    }

    fn is_pending(&self) -> bool {
        self.slot.is_pending()
    }
}
