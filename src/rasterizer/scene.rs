//! Per-frame scene snapshot handed to the renderer

use super::light::Light;
use super::math::{Mat4, MathError, Vec3};
use super::transform::ProjectionConfig;
use super::types::{Camera, Mesh};

/// Camera, lens, lights and meshes for one frame.
///
/// The scene driver mutates poses between frames and calls [`Scene::prepare`]
/// so that light positions and mesh matrices match the current camera.
#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: Camera,
    /// World up direction for the look-at basis
    pub up: Vec3,
    pub projection: ProjectionConfig,
    pub lights: Vec<Light>,
    pub meshes: Vec<Mesh>,
}

impl Scene {
    pub fn new(camera: Camera, projection: ProjectionConfig) -> Self {
        Self {
            camera,
            up: Vec3::UP,
            projection,
            lights: Vec::new(),
            meshes: Vec::new(),
        }
    }

    /// Recompute the view matrix, move lights into view space and refresh
    /// every mesh's cached matrices. Returns the view matrix.
    pub fn prepare(&mut self) -> Result<Mat4, MathError> {
        let view = self.camera.view_matrix(self.up)?;
        let projection = self.projection.projection_matrix();

        for light in &mut self.lights {
            light.update_world(&view);
        }
        for mesh in &mut self.meshes {
            mesh.update_transforms(&view, &projection)?;
        }

        Ok(view)
    }

    pub fn mesh_mut(&mut self, name: &str) -> Option<&mut Mesh> {
        self.meshes.iter_mut().find(|m| m.name == name)
    }
}
