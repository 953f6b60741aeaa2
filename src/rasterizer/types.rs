//! Core types for the rasterizer

use serde::{Serialize, Deserialize};
use super::illumination::SpecularModel;
use super::math::{Mat4, MathError, Vec3, Vec4};
use super::render::RenderError;
use super::shader::ShadingMode;
use super::transform::ViewConfig;

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Convert an intensity vector (1.0 = full channel) to a color,
    /// clamping each channel to [0, 255]
    pub fn from_intensity(i: Vec3) -> Self {
        let channel = |v: f32| (v * 255.0).clamp(0.0, 255.0) as u8;
        Self::new(channel(i.x), channel(i.y), channel(i.z))
    }

    /// Channel-wise interpolation, rounded to the nearest value
    pub fn lerp(self, other: Color, gradient: f32) -> Self {
        let channel = |a: u8, b: u8| super::math::interpolate(a as f32, b as f32, gradient).round() as u8;
        Self {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
            a: channel(self.a, other.a),
        }
    }

    /// Convert to u32 (RGBA, red in the high byte)
    pub fn to_u32(self) -> u32 {
        ((self.r as u32) << 24) | ((self.g as u32) << 16) | ((self.b as u32) << 8) | (self.a as u32)
    }

    pub fn from_u32(v: u32) -> Self {
        Self {
            r: (v >> 24) as u8,
            g: (v >> 16) as u8,
            b: (v >> 8) as u8,
            a: v as u8,
        }
    }

    /// Convert to [u8; 4] for framebuffer
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// A vertex. In a mesh, `coordinates` and `normal` are in model space.
/// After the transform stage, `coordinates` are in screen space (pixels, NDC
/// depth), `world_coordinates` in view space and `normal` is the view-space normal.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vertex {
    pub coordinates: Vec4,
    pub normal: Vec4,
    pub world_coordinates: Vec4,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            coordinates: position.to_point(),
            normal: normal.to_direction(),
            world_coordinates: position.to_point(),
        }
    }
}

/// A triangle face (indices into vertex array)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    pub a: usize,
    pub b: usize,
    pub c: usize,
}

impl Face {
    pub fn new(a: usize, b: usize, c: usize) -> Self {
        Self { a, b, c }
    }

    pub fn indices(&self) -> [usize; 3] {
        [self.a, self.b, self.c]
    }
}

/// Surface reflectance coefficients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// kAmbient, added as-is to every pixel
    pub ambient: Vec3,
    /// kDiffuse
    pub diffuse: Vec3,
    /// kSpecular
    pub specular: Vec3,
    /// Specular exponent
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Vec3::ZERO,
            diffuse: Vec3::splat(0.5),
            specular: Vec3::splat(0.5),
            shininess: 1.0,
        }
    }
}

/// Matrices derived from the model matrix and the current camera
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeshTransforms {
    pub view_model: Mat4,
    pub projection_view_model: Mat4,
    /// Inverse-transpose of `view_model`
    pub normal: Mat4,
}

/// Triangle mesh with its material and cached per-frame matrices
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    vertices: Vec<Vertex>,
    faces: Vec<Face>,
    pub material: Material,
    pub model: Mat4,
    transforms: MeshTransforms,
}

impl Mesh {
    /// Build a mesh, rejecting faces that reference missing vertices
    pub fn new(
        name: impl Into<String>,
        vertices: Vec<Vertex>,
        faces: Vec<Face>,
        material: Material,
    ) -> Result<Self, RenderError> {
        let name = name.into();
        for (face_idx, face) in faces.iter().enumerate() {
            if let Some(&index) = face.indices().iter().find(|&&i| i >= vertices.len()) {
                return Err(RenderError::FaceIndexOutOfRange {
                    mesh: name,
                    face: face_idx,
                    index,
                    vertex_count: vertices.len(),
                });
            }
        }

        Ok(Self {
            name,
            vertices,
            faces,
            material,
            model: Mat4::IDENTITY,
            transforms: MeshTransforms::default(),
        })
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn transforms(&self) -> &MeshTransforms {
        &self.transforms
    }

    /// Recompute all cached matrices from the model matrix and the camera
    pub fn update_transforms(&mut self, view: &Mat4, projection: &Mat4) -> Result<(), MathError> {
        let view_model = *view * self.model;
        self.transforms = MeshTransforms {
            view_model,
            projection_view_model: *projection * view_model,
            normal: view_model.normal_matrix()?,
        };
        Ok(())
    }

    /// Latitude/longitude sphere centered on the origin. Normals point outwards.
    pub fn uv_sphere(name: impl Into<String>, rings: usize, segments: usize, radius: f32, material: Material) -> Self {
        use std::f32::consts::PI;

        let rings = rings.max(2);
        let segments = segments.max(3);
        let mut vertices = Vec::with_capacity((rings + 1) * (segments + 1));

        for ring in 0..=rings {
            let theta = PI * ring as f32 / rings as f32;
            for seg in 0..=segments {
                let phi = 2.0 * PI * seg as f32 / segments as f32;
                let n = Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
                vertices.push(Vertex::new(n * radius, n));
            }
        }

        let stride = segments + 1;
        let mut faces = Vec::with_capacity(rings * segments * 2);
        for ring in 0..rings {
            for seg in 0..segments {
                let a = ring * stride + seg;
                let b = a + stride;
                faces.push(Face::new(a, b, a + 1));
                faces.push(Face::new(a + 1, b, b + 1));
            }
        }

        Self {
            name: name.into(),
            vertices,
            faces,
            material,
            model: Mat4::IDENTITY,
            transforms: MeshTransforms::default(),
        }
    }
}

/// Camera snapshot: position and look-at target, both in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }

    pub fn view_matrix(&self, up: Vec3) -> Result<Mat4, MathError> {
        ViewConfig::new(self.position, self.target, up).view_matrix()
    }
}

/// Per-frame render configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Gouraud (per-vertex) or Phong (per-pixel) shading
    pub shading: ShadingMode,
    /// Specular term used by the illumination model
    pub specular: SpecularModel,
    /// Viewer position in view space (the camera sits at the origin)
    pub viewer_position: Vec3,
    /// Rasterizer threads, 0 = use available parallelism
    pub workers: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            shading: ShadingMode::Gouraud,
            specular: SpecularModel::Phong,
            viewer_position: Vec3::ZERO,
            workers: 0,
        }
    }
}
