//! Orbit animation and the built-in demo scene

use crate::rasterizer::{Camera, Color, Light, Mat4, Material, Mesh, ProjectionConfig, Scene, Vec3, HEIGHT, WIDTH};

/// Orbit radius of the demo planet
pub const ORBIT_RADIUS: f32 = 4.0;

/// Angular speed of the demo planet in radians per second
pub const ORBIT_SPEED: f32 = 0.6;

/// Model matrix for a body at angle `phi` on a circle of `radius` in the
/// xy-plane, spinning about z as it goes
pub fn orbit_model_matrix(phi: f32, radius: f32) -> Mat4 {
    Mat4::translation(Vec3::new(radius * phi.sin(), radius * phi.cos(), 0.0)) * Mat4::rotation_z(phi)
}

/// Drives one named mesh around the origin
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitAnimation {
    pub mesh: String,
    pub radius: f32,
    /// Radians per second
    pub speed: f32,
    pub phi: f32,
}

impl OrbitAnimation {
    pub fn new(mesh: impl Into<String>, radius: f32, speed: f32) -> Self {
        Self {
            mesh: mesh.into(),
            radius,
            speed,
            phi: 0.0,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.phi = (self.phi + self.speed * dt) % std::f32::consts::TAU;
    }

    /// Write the current pose into the scene. Returns false if the mesh is missing.
    pub fn apply(&self, scene: &mut Scene) -> bool {
        match scene.mesh_mut(&self.mesh) {
            Some(mesh) => {
                mesh.model = orbit_model_matrix(self.phi, self.radius);
                true
            }
            None => false,
        }
    }
}

/// Sun and planet, z up, seen from above and behind the orbit
pub fn demo_scene() -> Scene {
    let camera = Camera::new(Vec3::new(0.0, -15.0, 6.0), Vec3::ZERO);
    let projection = ProjectionConfig::new(1.0, 100.0, 45.0, WIDTH as f32 / HEIGHT as f32);
    let mut scene = Scene::new(camera, projection);
    scene.up = Vec3::new(0.0, 0.0, 1.0);

    let sun = Material {
        ambient: Vec3::new(0.9, 0.7, 0.2),
        diffuse: Vec3::splat(0.1),
        specular: Vec3::ZERO,
        shininess: 1.0,
    };
    let earth = Material {
        ambient: Vec3::new(0.02, 0.02, 0.05),
        diffuse: Vec3::new(0.2, 0.4, 0.9),
        specular: Vec3::splat(0.6),
        shininess: 32.0,
    };

    scene.meshes.push(Mesh::uv_sphere("sun", 16, 24, 1.5, sun));
    let mut planet = Mesh::uv_sphere("earth", 24, 32, 0.8, earth);
    planet.model = orbit_model_matrix(0.0, ORBIT_RADIUS);
    scene.meshes.push(planet);

    scene.lights.push(Light::point(Vec3::ZERO, Color::new(255, 240, 200)));
    scene.lights.push(Light::spot(
        Vec3::new(0.0, -8.0, 8.0),
        Color::new(120, 160, 255),
        Vec3::ZERO,
        0.9,
        8.0,
    ));

    scene
}
