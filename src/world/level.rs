//! Scene loading and saving
//!
//! Scenes are stored as RON so they stay hand-editable.

use std::fs;
use std::path::Path;
use crate::rasterizer::{MathError, RenderError};
use super::SceneDesc;

/// Error type for scene loading
#[derive(Debug)]
pub enum SceneError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
    Math(MathError),
    Render(RenderError),
    /// Index list length is not a multiple of three
    IncompleteFace { mesh: String, index_count: usize },
    NormalCountMismatch { mesh: String, positions: usize, normals: usize },
}

impl From<std::io::Error> for SceneError {
    fn from(e: std::io::Error) -> Self {
        SceneError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for SceneError {
    fn from(e: ron::error::SpannedError) -> Self {
        SceneError::ParseError(e)
    }
}

impl From<ron::Error> for SceneError {
    fn from(e: ron::Error) -> Self {
        SceneError::SerializeError(e)
    }
}

impl From<MathError> for SceneError {
    fn from(e: MathError) -> Self {
        SceneError::Math(e)
    }
}

impl From<RenderError> for SceneError {
    fn from(e: RenderError) -> Self {
        SceneError::Render(e)
    }
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::IoError(e) => write!(f, "IO error: {}", e),
            SceneError::ParseError(e) => write!(f, "Parse error: {}", e),
            SceneError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            SceneError::Math(e) => write!(f, "Math error: {}", e),
            SceneError::Render(e) => write!(f, "Mesh error: {}", e),
            SceneError::IncompleteFace { mesh, index_count } => {
                write!(f, "mesh '{}': {} indices do not form whole triangles", mesh, index_count)
            }
            SceneError::NormalCountMismatch { mesh, positions, normals } => {
                write!(f, "mesh '{}': {} normals for {} positions", mesh, normals, positions)
            }
        }
    }
}

impl std::error::Error for SceneError {}

/// Load a scene description from a RON file
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<SceneDesc, SceneError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let desc = load_scene_from_str(&contents)?;
    log::info!(
        "loaded scene {}: {} meshes, {} lights",
        path.display(),
        desc.meshes.len(),
        desc.lights.len()
    );
    Ok(desc)
}

/// Load a scene description from a RON string (for embedded scenes or testing)
pub fn load_scene_from_str(s: &str) -> Result<SceneDesc, SceneError> {
    let desc: SceneDesc = ron::from_str(s)?;
    Ok(desc)
}

/// Save a scene description to a RON file
pub fn save_scene<P: AsRef<Path>>(desc: &SceneDesc, path: P) -> Result<(), SceneError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(desc, config)?;
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::{Light, ShadingMode, SpecularModel, Vec3};

    const SAMPLE: &str = include_str!("../../assets/scenes/solar.ron");

    #[test]
    fn test_sample_scene_parses_and_builds() {
        let desc = load_scene_from_str(SAMPLE).unwrap();
        assert_eq!(desc.meshes.len(), 2);
        assert_eq!(desc.settings.shading, ShadingMode::Phong);
        assert_eq!(desc.settings.specular, SpecularModel::Blinn);
        assert!(matches!(desc.lights[1], Light::Spot(_)));

        let mut scene = desc.build().unwrap();
        scene.prepare().unwrap();
        assert!(scene.mesh_mut("earth").is_some());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let desc = load_scene_from_str("(camera: (position: (x: 0.0, y: 0.0, z: 5.0), target: (x: 0.0, y: 0.0, z: 0.0)))")
            .unwrap();
        assert_eq!(desc.up, Vec3::UP);
        assert!(desc.meshes.is_empty());
        assert_eq!(desc.settings.workers, 0);
        assert_eq!(desc.projection.fov_degrees, 45.0);
    }

    #[test]
    fn test_parse_error_is_reported() {
        assert!(matches!(load_scene_from_str("(camera: oops)"), Err(SceneError::ParseError(_))));
    }

    #[test]
    fn test_save_then_load_file() {
        let desc = load_scene_from_str(SAMPLE).unwrap();
        let path = std::env::temp_dir().join(format!("solar_raster_scene_{}.ron", std::process::id()));
        save_scene(&desc, &path).unwrap();
        let loaded = load_scene(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, desc);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(load_scene("/nonexistent/scene.ron"), Err(SceneError::IoError(_))));
    }
}
