//! World module - scene files and animation
//!
//! - RON scene descriptions with babylon-style mesh arrays
//! - Orbit animation and the built-in demo scene

mod geometry;
mod level;
mod orbit;

pub use geometry::*;
pub use level::*;
pub use orbit::*;
