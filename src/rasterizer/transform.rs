//! View (look-at) and projection (perspective) matrix construction

use serde::{Serialize, Deserialize};
use super::math::{Mat4, MathError, Vec3};

/// Camera pose used to build the view matrix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl ViewConfig {
    pub fn new(position: Vec3, target: Vec3, up: Vec3) -> Self {
        Self { position, target, up }
    }

    /// Right-handed look-at: the camera sits at `position` looking down its -Z
    /// axis towards `target`. Built as the inverse of the camera-to-world basis.
    pub fn view_matrix(&self) -> Result<Mat4, MathError> {
        let z_axis = (self.position - self.target).normalize();
        let x_axis = self.up.cross(z_axis).normalize();
        let y_axis = z_axis.cross(x_axis).normalize();

        let p = self.position;
        let camera_to_world = Mat4::from_rows([
            [x_axis.x, y_axis.x, z_axis.x, p.x],
            [x_axis.y, y_axis.y, z_axis.y, p.y],
            [x_axis.z, y_axis.z, z_axis.z, p.z],
            [0.0, 0.0, 0.0, 1.0],
        ]);

        camera_to_world.inverse().ok_or(MathError::SingularMatrix)
    }
}

/// Lens parameters for the perspective projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    pub near: f32,
    pub far: f32,
    /// Vertical field of view
    pub fov_degrees: f32,
    /// Width / height
    pub aspect: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            near: 1.0,
            far: 100.0,
            fov_degrees: 45.0,
            aspect: 1.0,
        }
    }
}

impl ProjectionConfig {
    pub fn new(near: f32, far: f32, fov_degrees: f32, aspect: f32) -> Self {
        Self { near, far, fov_degrees, aspect }
    }

    /// OpenGL-style perspective: the near plane maps to NDC z = -1, far to +1
    pub fn projection_matrix(&self) -> Mat4 {
        let f = 1.0 / (self.fov_degrees.to_radians() / 2.0).tan();
        let (n, fa) = (self.near, self.far);
        Mat4::from_rows([
            [f / self.aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, -(fa + n) / (fa - n), -2.0 * fa * n / (fa - n)],
            [0.0, 0.0, -1.0, 0.0],
        ])
    }
}
