//! Procedural placement: even sphere distributions, globe nodes and star fields.

pub mod distribution;
pub mod nodes;
pub mod starfield;

pub use distribution::*;
pub use nodes::*;
pub use starfield::*;
