//! Display-refresh frame requests.
//!
//! A scheduler holds at most one pending request. The host calls
//! [`FrameScheduler::fire`] when the display refreshes; that consumes the
//! pending request, if any, and reports which one it was.

/// Single-owner token for a pending frame request. Not `Clone`: the owner
/// either lets it fire or hands it back to [`FrameScheduler::cancel_frame`].
#[derive(Debug, PartialEq, Eq)]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub fn id(&self) -> FrameId {
        FrameId(self.0)
    }
}

/// Which request fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameId(u64);

pub trait FrameScheduler {
    /// Ask for a callback at the next display refresh. Replaces any pending request.
    fn request_frame(&mut self) -> FrameHandle;

    /// Withdraw a request. Returns false if it already fired or was replaced.
    fn cancel_frame(&mut self, handle: FrameHandle) -> bool;

    /// The display refreshed: consume the pending request.
    fn fire(&mut self) -> Option<FrameId>;

    fn is_pending(&self) -> bool;
}

/// Request bookkeeping shared by scheduler implementations.
#[derive(Debug, Default)]
pub struct FrameSlot {
    next_id: u64,
    pending: Option<u64>,
}

impl FrameSlot {
    pub fn request(&mut self) -> FrameHandle {
        self.next_id += 1;
        self.pending = Some(self.next_id);
        FrameHandle(self.next_id)
    }

    pub fn cancel(&mut self, handle: FrameHandle) -> bool {
        if self.pending == Some(handle.0) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn fire(&mut self) -> Option<FrameId> {
        self.pending.take().map(FrameId)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Scheduler whose refreshes are triggered by hand. Used headless and in tests.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    slot: FrameSlot,
    requests: u64,
    cancels: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total frames requested so far.
    pub fn requests(&self) -> u64 {
        self.requests
    }

    /// Total successful cancellations so far.
    pub fn cancels(&self) -> u64 {
        self.cancels
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.requests += 1;
        self.slot.request()
    }

    fn cancel_frame(&mut self, handle: FrameHandle) -> bool {
        let cancelled = self.slot.cancel(handle);
        if cancelled {
            self.cancels += 1;
        }
        cancelled
    }

    fn fire(&mut self) -> Option<FrameId> {
        self.slot.fire()
    }

    fn is_pending(&self) -> bool {
        self.slot.is_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fire_consumes_request() {
        let mut s = ManualScheduler::new();
        let handle = s.request_frame();
        assert_eq!(s.fire(), Some(handle.id()));
        assert_eq!(s.fire(), None);
        assert!(!s.cancel_frame(handle));
    }

    #[test]
    fn cancelled_request_never_fires() {
        let mut s = ManualScheduler::new();
        let handle = s.request_frame();
        assert!(s.cancel_frame(handle));
        assert!(!s.is_pending());
        assert_eq!(s.fire(), None);
    }

    #[test]
    fn newer_request_replaces_older() {
        let mut s = ManualScheduler::new();
        let old = s.request_frame();
        let new = s.request_frame();
        let new_id = new.id();
        assert!(!s.cancel_frame(old));
        assert_eq!(s.fire(), Some(new_id));
    }
}
