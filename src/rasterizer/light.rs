//! Point and spot light sources
//!
//! Lights are placed in world space and moved into view space with
//! [`Light::update_world`] whenever the camera changes.

use serde::{Serialize, Deserialize};
use super::math::{Mat4, Vec3};
use super::types::Color;

/// A light shining equally in every direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Color,
    #[serde(skip)]
    world_position: Vec3,
}

/// A light restricted to a cone aimed at `direction`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpotLight {
    pub position: Vec3,
    pub color: Color,
    /// Point the cone is aimed at
    pub direction: Vec3,
    /// Cosine of the half-aperture angle; points with a smaller cosine are unlit
    pub cos_aperture: f32,
    /// Falloff exponent across the cone
    pub falloff: f32,
    #[serde(skip)]
    world_position: Vec3,
    #[serde(skip)]
    world_direction: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Light {
    Point(PointLight),
    Spot(SpotLight),
}

impl Light {
    pub fn point(position: Vec3, color: Color) -> Self {
        Light::Point(PointLight {
            position,
            color,
            world_position: position,
        })
    }

    pub fn spot(position: Vec3, color: Color, direction: Vec3, cos_aperture: f32, falloff: f32) -> Self {
        Light::Spot(SpotLight {
            position,
            color,
            direction,
            cos_aperture,
            falloff,
            world_position: position,
            world_direction: direction,
        })
    }

    /// Re-apply the current view matrix to the local position (and aim point)
    pub fn update_world(&mut self, view: &Mat4) {
        let apply = |p: Vec3| -> Vec3 { (*view * p.to_point()).xyz() };
        match self {
            Light::Point(l) => l.world_position = apply(l.position),
            Light::Spot(l) => {
                l.world_position = apply(l.position);
                l.world_direction = apply(l.direction);
            }
        }
    }

    pub fn world_position(&self) -> Vec3 {
        match self {
            Light::Point(l) => l.world_position,
            Light::Spot(l) => l.world_position,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Light::Point(l) => l.color,
            Light::Spot(l) => l.color,
        }
    }

    /// Base intensity, 1.0 per fully saturated channel
    pub fn intensity(&self) -> Vec3 {
        let c = self.color();
        Vec3::new(c.r as f32, c.g as f32, c.b as f32) * (1.0 / 255.0)
    }

    /// Intensity reaching `point` (view space)
    pub fn intensity_at(&self, point: Vec3) -> Vec3 {
        match self {
            Light::Point(_) => self.intensity(),
            Light::Spot(l) => {
                let to_light = (l.world_position - point).normalize();
                let reversed_axis = (l.world_position - l.world_direction).normalize();
                let cos = reversed_axis.dot(to_light);
                if cos < l.cos_aperture {
                    return Vec3::ZERO;
                }
                self.intensity() * cos.max(0.0).powf(l.falloff)
            }
        }
    }
}
