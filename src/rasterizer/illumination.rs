//! Local illumination: ambient + per-light diffuse + per-light specular

use serde::{Serialize, Deserialize};
use super::light::Light;
use super::math::{clamp01, Vec3};
use super::types::{Color, Material};

/// Specular reflection model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecularModel {
    /// Reflected light vector against the view vector
    Phong,
    /// Half-vector against the normal
    Blinn,
}

impl SpecularModel {
    pub fn label(&self) -> &'static str {
        match self {
            SpecularModel::Phong => "Phong",
            SpecularModel::Blinn => "Blinn-Phong",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SpecularModel::Phong => SpecularModel::Blinn,
            SpecularModel::Blinn => SpecularModel::Phong,
        }
    }

    /// Specular cosine term before the material and light weights, in [0, 1]
    pub fn cosine(&self, to_light: Vec3, to_viewer: Vec3, normal: Vec3, exponent: f32) -> f32 {
        let cos = match self {
            SpecularModel::Phong => {
                let reflected = normal * (2.0 * normal.dot(to_light)) - to_light;
                to_viewer.dot(reflected)
            }
            SpecularModel::Blinn => {
                let half = (to_light + to_viewer).normalize();
                normal.dot(half)
            }
        };
        clamp01(cos).powf(exponent)
    }
}

/// Diffuse cosine term, in [0, 1]
pub fn diffuse_cosine(to_light: Vec3, normal: Vec3) -> f32 {
    clamp01(normal.dot(to_light))
}

/// Illumination model bound to one mesh's material and the frame's lights
#[derive(Debug, Clone, Copy)]
pub struct Illumination<'a> {
    pub material: Material,
    pub lights: &'a [Light],
    pub specular: SpecularModel,
}

impl<'a> Illumination<'a> {
    pub fn new(material: Material, lights: &'a [Light], specular: SpecularModel) -> Self {
        Self { material, lights, specular }
    }

    /// Color of a surface point. All positions are in view space.
    pub fn shade(&self, normal: Vec3, viewer: Vec3, position: Vec3) -> Color {
        Color::from_intensity(self.intensity(normal, viewer, position))
    }

    /// Accumulated intensity before conversion to a color
    pub fn intensity(&self, normal: Vec3, viewer: Vec3, position: Vec3) -> Vec3 {
        let m = &self.material;
        let normal = normal.normalize();
        let to_viewer = (viewer - position).normalize();

        let mut intensity = m.ambient;
        for light in self.lights {
            let to_light = (light.world_position() - position).normalize();
            let diffuse = m.diffuse * diffuse_cosine(to_light, normal);
            let specular = m.specular * self.specular.cosine(to_light, to_viewer, normal, m.shininess);
            intensity = intensity + light.intensity_at(position).mul_elem(diffuse + specular);
        }
        intensity
    }
}
