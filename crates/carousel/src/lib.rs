//! Self-advancing, pausable rotation of a small stack of cards.

pub mod layout;
pub mod motion;
pub mod queue;

pub use layout::*;
pub use motion::*;
pub use queue::*;
