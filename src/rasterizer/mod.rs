//! Software rasterizer
//!
//! Features:
//! - Look-at view and perspective projection in homogeneous coordinates
//! - Scan-line triangle filling with a depth buffer
//! - Gouraud (per-vertex) and Phong (per-pixel) shading
//! - Phong and Blinn-Phong specular terms, point and spot lights
//! - Faces rasterized in parallel into a lock-free framebuffer

mod math;
mod transform;
mod types;
mod light;
mod illumination;
mod shader;
mod scene;
mod render;

pub use math::*;
pub use transform::*;
pub use types::*;
pub use light::*;
pub use illumination::*;
pub use shader::*;
pub use scene::*;
pub use render::*;

/// Default frame size
pub const WIDTH: usize = 640;
pub const HEIGHT: usize = 480;
