//! Timed rotation queue.
//!
//! The queue never sleeps or spawns anything: the host asks for
//! [`RotationQueue::next_deadline`], wakes up around then and calls
//! [`RotationQueue::poll`] with the current instant.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How many items from the head of the queue are shown.
pub const VISIBLE_ITEMS: usize = 3;

/// Default time between automatic rotations.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    /// Zero or one item: nothing to rotate, no timer.
    Idle,
    /// Timer armed.
    Running,
    /// Timer suspended, order unchanged.
    Paused,
    /// Torn down with its view; the timer never fires again.
    Stopped,
}

/// Ordered items whose head moves to the tail on a timer.
#[derive(Debug, Clone)]
pub struct RotationQueue<T> {
    items: VecDeque<T>,
    interval: Duration,
    pause_on_hover: bool,
    paused: bool,
    stopped: bool,
    deadline: Option<Instant>,
}

impl<T> RotationQueue<T> {
    /// Build a queue in insertion order and arm its timer at `now`.
    pub fn new(items: impl IntoIterator<Item = T>, interval: Duration, now: Instant) -> Self {
        let mut queue = Self {
            items: items.into_iter().collect(),
            interval,
            pause_on_hover: true,
            paused: false,
            stopped: false,
            deadline: None,
        };
        queue.arm(now);
        queue
    }

    /// Whether hovering pauses the rotation (default true).
    pub fn with_pause_on_hover(mut self, pause_on_hover: bool) -> Self {
        self.pause_on_hover = pause_on_hover;
        self
    }

    pub fn state(&self) -> QueueState {
        if self.stopped {
            QueueState::Stopped
        } else if self.items.len() <= 1 {
            QueueState::Idle
        } else if self.paused {
            QueueState::Paused
        } else {
            QueueState::Running
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Move the head to the tail and return the new order. No-op for fewer than two items.
    ///
    /// Does not touch the timer.
    pub fn advance(&mut self) -> &[T] {
        if self.items.len() > 1 {
            self.items.rotate_left(1);
            log::debug!("Rotation queue advanced ({} items)", self.items.len());
        }
        self.items.make_contiguous()
    }

    /// Suspend or resume the timer. Resuming arms a fresh full interval.
    pub fn set_paused(&mut self, paused: bool, now: Instant) {
        if self.stopped || self.paused == paused {
            return;
        }
        self.paused = paused;
        if paused {
            self.deadline = None;
        } else {
            self.arm(now);
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pointer entered the card stack.
    pub fn hover_enter(&mut self, now: Instant) {
        if self.pause_on_hover {
            self.set_paused(true, now);
        }
    }

    /// Pointer left the card stack.
    pub fn hover_leave(&mut self, now: Instant) {
        if self.pause_on_hover {
            self.set_paused(false, now);
        }
    }

    /// Fire the timer if it is due. Returns true when the queue advanced.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.advance();
                let next = deadline + self.interval;
                self.deadline = Some(if next > now { next } else { now + self.interval });
                true
            }
            _ => false,
        }
    }

    /// When the armed timer fires next, if it is armed.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Replace the items (new content) and restart the timer.
    pub fn replace(&mut self, items: impl IntoIterator<Item = T>, now: Instant) {
        self.items = items.into_iter().collect();
        self.arm(now);
    }

    /// Cancel the timer for good. Manual advances still work.
    pub fn stop(&mut self) {
        self.stopped = true;
        self.deadline = None;
    }

    /// Current order, head first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// The first [`VISIBLE_ITEMS`] items of the current order.
    pub fn visible(&self) -> impl Iterator<Item = &T> {
        self.items.iter().take(VISIBLE_ITEMS)
    }

    fn arm(&mut self, now: Instant) {
        self.deadline = if self.stopped || self.paused || self.items.len() <= 1 {
            None
        } else {
            Some(now + self.interval)
        };
    }
}
