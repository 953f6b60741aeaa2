//! Solar Raster: a software 3D rendering pipeline
//!
//! - `rasterizer`: transform stage, scan-line rasterizer, depth buffer,
//!   illumination and shading
//! - `world`: RON scene files, orbit animation and the demo scene

pub mod rasterizer;
pub mod world;

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
