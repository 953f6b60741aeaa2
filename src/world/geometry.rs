//! Scene description types
//!
//! Pure data mirroring the scene file layout. Meshes use flat babylon-style
//! arrays: `positions` and `normals` hold x, y, z triples and `indices` holds
//! one triangle per three entries.

use serde::{Serialize, Deserialize};
use crate::rasterizer::{
    Camera, Face, Light, Mat4, Material, Mesh, ProjectionConfig, RenderSettings, Scene, Vec3, Vec4, Vertex,
};
use super::SceneError;

fn default_up() -> Vec3 {
    Vec3::UP
}

/// A whole scene file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDesc {
    pub camera: Camera,
    #[serde(default = "default_up")]
    pub up: Vec3,
    #[serde(default)]
    pub projection: ProjectionConfig,
    #[serde(default)]
    pub settings: RenderSettings,
    #[serde(default)]
    pub lights: Vec<Light>,
    #[serde(default)]
    pub meshes: Vec<MeshDesc>,
}

impl SceneDesc {
    /// Build the runtime scene. Matrices are not computed yet; call
    /// [`Scene::prepare`] before rendering.
    pub fn build(&self) -> Result<Scene, SceneError> {
        let mut scene = Scene::new(self.camera, self.projection);
        scene.up = self.up;
        scene.lights = self.lights.clone();
        scene.meshes = self.meshes.iter().map(MeshDesc::build).collect::<Result<_, _>>()?;
        Ok(scene)
    }
}

/// One mesh with its material and pose
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshDesc {
    pub name: String,
    pub positions: Vec<f32>,
    /// Empty means smooth normals are generated from the faces
    #[serde(default)]
    pub normals: Vec<f32>,
    pub indices: Vec<usize>,
    #[serde(default)]
    pub material: Material,
    /// World-space translation
    #[serde(default)]
    pub position: Vec3,
    /// Euler angles in radians, applied x then y then z
    #[serde(default)]
    pub rotation: Vec3,
}

impl MeshDesc {
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::translation(self.position)
            * Mat4::rotation_z(self.rotation.z)
            * Mat4::rotation_y(self.rotation.y)
            * Mat4::rotation_x(self.rotation.x)
    }

    pub fn build(&self) -> Result<Mesh, SceneError> {
        let positions = triples(&self.positions)?;

        if self.indices.len() % 3 != 0 {
            return Err(SceneError::IncompleteFace {
                mesh: self.name.clone(),
                index_count: self.indices.len(),
            });
        }
        let faces: Vec<Face> = self
            .indices
            .chunks_exact(3)
            .map(|c| Face::new(c[0], c[1], c[2]))
            .collect();

        let normals = if self.normals.is_empty() {
            None
        } else {
            let normals = triples(&self.normals)?;
            if normals.len() != positions.len() {
                return Err(SceneError::NormalCountMismatch {
                    mesh: self.name.clone(),
                    positions: positions.len(),
                    normals: normals.len(),
                });
            }
            Some(normals)
        };

        let vertices: Vec<Vertex> = positions
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let n = normals.as_ref().map_or(Vec3::ZERO, |n| n[i]);
                Vertex::new(*p, n)
            })
            .collect();

        let mut mesh = Mesh::new(self.name.clone(), vertices, faces, self.material)?;
        if normals.is_none() {
            mesh = with_smooth_normals(mesh)?;
        }
        mesh.model = self.model_matrix();
        Ok(mesh)
    }
}

/// Split a flat array into points; a trailing partial triple is an error
fn triples(values: &[f32]) -> Result<Vec<Vec3>, SceneError> {
    values
        .chunks(3)
        .map(|c| Vec4::from_slice(c).map(Vec4::xyz).map_err(SceneError::from))
        .collect()
}

/// Average the (area-weighted) normals of the faces around each vertex
fn with_smooth_normals(mesh: Mesh) -> Result<Mesh, SceneError> {
    let mut sums = vec![Vec3::ZERO; mesh.vertices().len()];
    for face in mesh.faces() {
        let [a, b, c] = face.indices();
        let p = |i: usize| mesh.vertices()[i].coordinates.xyz();
        let n = (p(b) - p(a)).cross(p(c) - p(a));
        for i in [a, b, c] {
            sums[i] = sums[i] + n;
        }
    }

    let vertices = mesh
        .vertices()
        .iter()
        .zip(&sums)
        .map(|(v, n)| Vertex::new(v.coordinates.xyz(), n.normalize()))
        .collect();

    let mut smoothed = Mesh::new(mesh.name.clone(), vertices, mesh.faces().to_vec(), mesh.material)?;
    smoothed.model = mesh.model;
    Ok(smoothed)
}
