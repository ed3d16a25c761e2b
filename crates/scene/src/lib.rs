//! Scene lifecycle and the per-frame animation loop.
//!
//! A [`Stage`] owns the graphics device, the frame scheduler and the input
//! tracker, and holds at most one live scene. Scenes are built from an
//! immutable [`SceneConfig`]; any configuration change destroys the live
//! scene and builds a new one.

pub mod build;
pub mod config;
pub mod dolly;
pub mod driver;
pub mod error;
pub mod pick;
pub mod scheduler;
pub mod stage;

#[cfg(test)]
pub(crate) mod testing;

pub use build::{Allocations, BuiltScene};
pub use config::*;
pub use dolly::*;
pub use driver::{AnimationDriver, DriverState};
pub use error::SceneError;
pub use pick::HoveredNode;
pub use scheduler::*;
pub use stage::{SceneHandle, Stage};
