//! Core types shared by every Orrery crate.
//!
//! This crate provides the foundational pieces the other systems build on:
//! - Transform, camera and frame timing
//! - Motion components stored in the scene graph
//! - The graphics seam (`GraphicsDevice`) that renderers implement

pub mod camera;
pub mod components;
pub mod graphics;
pub mod time;
pub mod transform;

pub use camera::*;
pub use components::*;
pub use graphics::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{EulerRot, Mat4, Quat, Vec2, Vec3, Vec4};
pub use hecs::{Entity, World};
