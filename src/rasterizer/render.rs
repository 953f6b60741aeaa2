//! Frame target and the per-frame render pass
//!
//! The [`Framebuffer`] stores color and depth together in one 64-bit word per
//! pixel, so the depth test and the write are a single compare-and-swap and
//! triangles can be rasterized from many threads at once.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use super::illumination::Illumination;
use super::math::{MathError, Vec4};
use super::scene::Scene;
use super::shader::{PixelTarget, Shader};
use super::types::{Color, Mesh, MeshTransforms, RenderSettings, Vertex};

/// Clip-space w below this is treated as degenerate (on or behind the eye)
const W_EPSILON: f32 = 1e-5;

/// Slack below NDC z = -1 before a vertex counts as in front of the near plane
const NEAR_TOLERANCE: f32 = 1e-3;

/// Meshes with fewer faces are rasterized on the calling thread
const MIN_PARALLEL_FACES: usize = 64;

/// Error raised while rendering a frame
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    FaceIndexOutOfRange {
        mesh: String,
        face: usize,
        index: usize,
        vertex_count: usize,
    },
    Math(MathError),
    WorkerPanicked,
}

impl From<MathError> for RenderError {
    fn from(e: MathError) -> Self {
        RenderError::Math(e)
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::FaceIndexOutOfRange { mesh, face, index, vertex_count } => write!(
                f,
                "Mesh '{}': face {} references vertex {} but only {} vertices exist",
                mesh, face, index, vertex_count
            ),
            RenderError::Math(e) => write!(f, "Math error: {}", e),
            RenderError::WorkerPanicked => write!(f, "A rasterizer thread panicked"),
        }
    }
}

impl std::error::Error for RenderError {}

/// Counters for one render pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub triangles_drawn: usize,
    /// Triangles with a vertex on or behind the eye plane
    pub triangles_skipped: usize,
}

impl std::ops::AddAssign for RenderStats {
    fn add_assign(&mut self, other: RenderStats) {
        self.triangles_drawn += other.triangles_drawn;
        self.triangles_skipped += other.triangles_skipped;
    }
}

fn pack(depth: f32, color: Color) -> u64 {
    ((depth.to_bits() as u64) << 32) | color.to_u32() as u64
}

fn unpack(cell: u64) -> (f32, Color) {
    (f32::from_bits((cell >> 32) as u32), Color::from_u32(cell as u32))
}

/// Color + depth buffer for software rendering
pub struct Framebuffer {
    cells: Vec<AtomicU64>,
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let empty = pack(f32::INFINITY, Color::BLACK);
        Self {
            cells: (0..width * height).map(|_| AtomicU64::new(empty)).collect(),
            width,
            height,
        }
    }

    /// Reallocate only when the resolution changes
    pub fn resize(&mut self, width: usize, height: usize) {
        if self.width != width || self.height != height {
            *self = Self::new(width, height);
        }
    }

    /// Fill with `color` and reset depth to +infinity
    pub fn clear(&mut self, color: Color) {
        let cleared = pack(f32::INFINITY, color);
        for cell in &mut self.cells {
            *cell.get_mut() = cleared;
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    fn cell(&self, x: i32, y: i32) -> Option<(f32, Color)> {
        self.index(x, y).map(|i| unpack(self.cells[i].load(Ordering::Acquire)))
    }

    pub fn color_at(&self, x: i32, y: i32) -> Option<Color> {
        self.cell(x, y).map(|(_, c)| c)
    }

    pub fn depth_at(&self, x: i32, y: i32) -> Option<f32> {
        self.cell(x, y).map(|(d, _)| d)
    }

    /// Snapshot of the color buffer as RGBA bytes
    pub fn present(&self) -> Frame {
        let mut pixels = Vec::with_capacity(self.cells.len() * 4);
        for cell in &self.cells {
            let (_, color) = unpack(cell.load(Ordering::Acquire));
            pixels.extend_from_slice(&color.to_bytes());
        }
        Frame {
            width: self.width,
            height: self.height,
            pixels,
        }
    }
}

impl PixelTarget for Framebuffer {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Closer wins. An equal depth replaces what is stored.
    fn put_pixel(&self, x: i32, y: i32, z: f32, color: Color) {
        if z.is_nan() {
            return;
        }
        let Some(idx) = self.index(x, y) else {
            return;
        };

        let cell = &self.cells[idx];
        let new = pack(z, color);
        let mut current = cell.load(Ordering::Acquire);
        loop {
            let (stored, _) = unpack(current);
            if stored < z {
                return;
            }
            match cell.compare_exchange_weak(current, new, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }
}

/// A finished frame, RGBA8 row-major
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl Frame {
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), image::ImageError> {
        image::save_buffer(
            path,
            &self.pixels,
            self.width as u32,
            self.height as u32,
            image::ExtendedColorType::Rgba8,
        )
    }
}

/// Render device: owns the frame target and runs the transform + rasterize pass
pub struct Device {
    fb: Framebuffer,
}

impl Device {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            fb: Framebuffer::new(width, height),
        }
    }

    pub fn width(&self) -> usize {
        self.fb.width
    }

    pub fn height(&self) -> usize {
        self.fb.height
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.fb.resize(width, height);
    }

    pub fn clear(&mut self, color: Color) {
        self.fb.clear(color);
    }

    pub fn present(&self) -> Frame {
        self.fb.present()
    }

    /// Model space to screen space. `None` when the clip-space w is on or
    /// behind the eye plane, or the vertex lies between the eye and the near
    /// plane, where the divide blows screen coordinates up.
    fn project_vertex(&self, v: &Vertex, t: &MeshTransforms) -> Option<Vertex> {
        let clip = t.projection_view_model * v.coordinates;
        if clip.w <= W_EPSILON {
            return None;
        }

        let ndc = clip.xyz() * (1.0 / clip.w);
        if !(ndc.z >= -1.0 - NEAR_TOLERANCE) {
            return None;
        }
        let screen_x = (ndc.x + 1.0) / 2.0 * self.fb.width as f32;
        let screen_y = (ndc.y + 1.0) / 2.0 * self.fb.height as f32;

        Some(Vertex {
            coordinates: Vec4::new(screen_x, screen_y, ndc.z, 1.0),
            normal: t.normal * v.normal,
            world_coordinates: t.view_model * v.coordinates,
        })
    }

    /// Draw every mesh of `scene` into the framebuffer. The scene must have
    /// been prepared for the current camera.
    pub fn render(&self, scene: &Scene, settings: &RenderSettings) -> Result<RenderStats, RenderError> {
        let workers = match settings.workers {
            0 => thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            n => n,
        };

        let mut stats = RenderStats::default();
        for mesh in &scene.meshes {
            let illumination = Illumination::new(mesh.material, &scene.lights, settings.specular);
            let shader = Shader::new(settings.shading, illumination, settings.viewer_position);
            stats += self.render_mesh(mesh, &shader, workers)?;
        }

        log::debug!(
            "Rendered {} triangles ({} skipped) with {} shading, {} specular",
            stats.triangles_drawn,
            stats.triangles_skipped,
            settings.shading.label(),
            settings.specular.label()
        );
        Ok(stats)
    }

    fn render_mesh(&self, mesh: &Mesh, shader: &Shader<'_>, workers: usize) -> Result<RenderStats, RenderError> {
        let transforms = mesh.transforms();
        let projected: Vec<Option<Vertex>> = mesh
            .vertices()
            .iter()
            .map(|v| self.project_vertex(v, transforms))
            .collect();

        rasterize_mesh(&self.fb, mesh, &projected, shader, workers)
    }
}

/// Rasterize every face of `mesh` into `target`. A panic while drawing
/// becomes [`RenderError::WorkerPanicked`] on both the inline and the
/// threaded path.
fn rasterize_mesh<T: PixelTarget + ?Sized>(
    target: &T,
    mesh: &Mesh,
    projected: &[Option<Vertex>],
    shader: &Shader<'_>,
    workers: usize,
) -> Result<RenderStats, RenderError> {
    let faces = mesh.faces();
    if workers <= 1 || faces.len() < MIN_PARALLEL_FACES {
        let draw = || rasterize_faces(target, mesh, 0, faces.len(), projected, shader);
        return panic::catch_unwind(AssertUnwindSafe(draw)).map_err(|_| RenderError::WorkerPanicked)?;
    }

    let chunk = faces.len().div_ceil(workers);
    thread::scope(|s| -> Result<RenderStats, RenderError> {
        let handles: Vec<_> = (0..faces.len())
            .step_by(chunk)
            .map(|start| {
                let end = (start + chunk).min(faces.len());
                s.spawn(move || rasterize_faces(target, mesh, start, end, projected, shader))
            })
            .collect();

        // Join everything first: an unjoined panicked thread would panic the scope
        let results: Vec<_> = handles.into_iter().map(|h| h.join()).collect();

        let mut stats = RenderStats::default();
        for result in results {
            stats += result.map_err(|_| RenderError::WorkerPanicked)??;
        }
        Ok(stats)
    })
}

fn rasterize_faces<T: PixelTarget + ?Sized>(
    target: &T,
    mesh: &Mesh,
    start: usize,
    end: usize,
    projected: &[Option<Vertex>],
    shader: &Shader<'_>,
) -> Result<RenderStats, RenderError> {
    let mut stats = RenderStats::default();
    for (face_idx, face) in mesh.faces()[start..end].iter().enumerate() {
        let mut corners = [None; 3];
        for (slot, &index) in corners.iter_mut().zip(face.indices().iter()) {
            *slot = *projected.get(index).ok_or_else(|| RenderError::FaceIndexOutOfRange {
                mesh: mesh.name.clone(),
                face: start + face_idx,
                index,
                vertex_count: projected.len(),
            })?;
        }

        match corners {
            [Some(a), Some(b), Some(c)] => {
                shader.draw_triangle(target, &a, &b, &c);
                stats.triangles_drawn += 1;
            }
            _ => stats.triangles_skipped += 1,
        }
    }

    if stats.triangles_skipped > 0 {
        log::trace!("Mesh '{}': skipped {} triangles in front of the near plane", mesh.name, stats.triangles_skipped);
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::illumination::SpecularModel;
    use crate::rasterizer::light::Light;
    use crate::rasterizer::math::{Mat4, Vec3, Vec4};
    use crate::rasterizer::shader::ShadingMode;
    use crate::rasterizer::transform::ProjectionConfig;
    use crate::rasterizer::types::{Camera, Face, Material};
    use approx::assert_relative_eq;

    /// Maps pixel coordinates of a `size` x `size` buffer straight to NDC
    fn pixel_space(size: f32) -> Mat4 {
        let s = 2.0 / size;
        Mat4::from_rows([
            [s, 0.0, 0.0, -1.0],
            [0.0, s, 0.0, -1.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    fn flat_triangle(points: [(f32, f32, f32); 3], material: Material, size: f32) -> Mesh {
        let vertices = points
            .iter()
            .map(|&(x, y, z)| Vertex::new(Vec3::new(x, y, z), Vec3::new(0.0, 0.0, 1.0)))
            .collect();
        let mut mesh = Mesh::new("triangle", vertices, vec![Face::new(0, 1, 2)], material).unwrap();
        mesh.update_transforms(&Mat4::IDENTITY, &pixel_space(size)).unwrap();
        mesh
    }

    fn ambient_only(color: Vec3) -> Material {
        Material {
            ambient: color,
            diffuse: Vec3::ZERO,
            specular: Vec3::ZERO,
            shininess: 1.0,
        }
    }

    fn scene_with(meshes: Vec<Mesh>) -> Scene {
        let mut scene = Scene::new(Camera::new(Vec3::new(0.0, 0.0, 1.0), Vec3::ZERO), ProjectionConfig::default());
        scene.meshes = meshes;
        scene
    }

    #[test]
    fn test_clear_resets_color_and_depth() {
        let mut fb = Framebuffer::new(4, 3);
        fb.put_pixel(1, 1, 0.5, Color::RED);
        fb.clear(Color::BLUE);
        assert_eq!(fb.color_at(1, 1), Some(Color::BLUE));
        assert_eq!(fb.depth_at(1, 1), Some(f32::INFINITY));
    }

    #[test]
    fn test_out_of_bounds_writes_are_ignored() {
        let mut fb = Framebuffer::new(4, 4);
        fb.clear(Color::BLACK);
        for (x, y) in [(-1, 0), (0, -1), (4, 0), (0, 4)] {
            fb.put_pixel(x, y, 0.0, Color::RED);
            assert_eq!(fb.color_at(x, y), None);
        }
        assert!(fb.present().pixels.chunks(4).all(|p| p == Color::BLACK.to_bytes()));
    }

    #[test]
    fn test_closer_write_wins_in_either_order() {
        for order in [[0.2, 0.6], [0.6, 0.2]] {
            let mut fb = Framebuffer::new(2, 2);
            fb.clear(Color::BLACK);
            for z in order {
                let color = if z < 0.5 { Color::GREEN } else { Color::RED };
                fb.put_pixel(0, 0, z, color);
            }
            assert_eq!(fb.color_at(0, 0), Some(Color::GREEN));
            assert_eq!(fb.depth_at(0, 0), Some(0.2));
        }
    }

    #[test]
    fn test_equal_depth_replaces_stored_pixel() {
        let fb = Framebuffer::new(1, 1);
        fb.put_pixel(0, 0, 0.5, Color::RED);
        fb.put_pixel(0, 0, 0.5, Color::GREEN);
        assert_eq!(fb.color_at(0, 0), Some(Color::GREEN));
    }

    #[test]
    fn test_concurrent_writes_keep_the_closest() {
        let fb = Framebuffer::new(8, 8);
        thread::scope(|s| {
            for t in 0..8 {
                let fb = &fb;
                s.spawn(move || {
                    for i in 0..1000 {
                        let z = ((i * 7 + t * 13) % 997) as f32 / 997.0 + 0.001;
                        fb.put_pixel(3, 3, z, Color::new(t as u8, 0, 0));
                    }
                });
            }
        });
        fb.put_pixel(3, 3, 0.0005, Color::WHITE);
        assert_eq!(fb.color_at(3, 3), Some(Color::WHITE));
        assert_eq!(fb.depth_at(3, 3), Some(0.0005));
    }

    #[test]
    fn test_optical_axis_projects_to_center() {
        for (w, h) in [(300, 300), (640, 480), (17, 9)] {
            let device = Device::new(w, h);
            let projection = ProjectionConfig::new(1.0, 100.0, 45.0, w as f32 / h as f32);
            let camera = Camera::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
            let view = camera.view_matrix(Vec3::UP).unwrap();

            let mut mesh = Mesh::new(
                "probe",
                vec![Vertex::new(Vec3::new(0.0, 0.0, 9.0), Vec3::new(0.0, 0.0, 1.0))],
                Vec::new(),
                Material::default(),
            )
            .unwrap();
            mesh.update_transforms(&view, &projection.projection_matrix()).unwrap();

            let v = device.project_vertex(&mesh.vertices()[0], mesh.transforms()).unwrap();
            assert_relative_eq!(v.coordinates.x, w as f32 / 2.0, epsilon = 1e-3);
            assert_relative_eq!(v.coordinates.y, h as f32 / 2.0, epsilon = 1e-3);
            assert_relative_eq!(v.coordinates.z, -1.0, epsilon = 1e-4);
            assert_relative_eq!(v.world_coordinates.z, -1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_vertex_behind_camera_is_skipped() {
        let device = Device::new(100, 100);
        let projection = ProjectionConfig::default().projection_matrix();
        let t = MeshTransforms {
            view_model: Mat4::IDENTITY,
            projection_view_model: projection,
            normal: Mat4::IDENTITY,
        };
        // View space +z is behind the camera
        let behind = Vertex::new(Vec3::new(0.0, 0.0, 5.0), Vec3::UP);
        assert!(device.project_vertex(&behind, &t).is_none());
        // On the eye plane w = 0
        let on_plane = Vertex::new(Vec3::new(1.0, 1.0, 0.0), Vec3::UP);
        assert!(device.project_vertex(&on_plane, &t).is_none());
    }

    #[test]
    fn test_normals_use_inverse_transpose() {
        let device = Device::new(10, 10);
        let mut mesh = Mesh::new(
            "stretched",
            vec![Vertex::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0))],
            Vec::new(),
            Material::default(),
        )
        .unwrap();
        mesh.model = Mat4::scaling(Vec3::new(2.0, 1.0, 1.0));
        // Squash depth so the vertex stays inside the clip volume
        let projection = Mat4::scaling(Vec3::new(1.0, 1.0, 0.1));
        mesh.update_transforms(&Mat4::translation(Vec3::new(0.0, 0.0, -5.0)), &projection)
            .unwrap();

        let v = device.project_vertex(&mesh.vertices()[0], mesh.transforms()).unwrap();
        // Stretching x by 2 tilts the normal towards y
        assert_relative_eq!(v.normal.x, 0.5, epsilon = 1e-5);
        assert_relative_eq!(v.normal.y, 1.0, epsilon = 1e-5);
        assert_eq!(v.normal.w, 0.0);
        assert_eq!(v.world_coordinates, Vec4::new(0.0, 0.0, -5.0, 1.0));
    }

    /// Signed distance of `p` from each edge, positive towards the interior
    fn edge_distances(tri: [(f32, f32); 3], p: (f32, f32)) -> [f32; 3] {
        let mut out = [0.0; 3];
        for (i, d) in out.iter_mut().enumerate() {
            let (a, b, c) = (tri[i], tri[(i + 1) % 3], tri[(i + 2) % 3]);
            let (ex, ey) = (b.0 - a.0, b.1 - a.1);
            let side = |q: (f32, f32)| ex * (q.1 - a.1) - ey * (q.0 - a.0);
            *d = side(p) * side(c).signum() / (ex * ex + ey * ey).sqrt();
        }
        out
    }

    #[test]
    fn test_ambient_triangle_end_to_end() {
        let corners = [(100.0, 100.0), (200.0, 100.0), (150.0, 50.0)];
        let mesh = flat_triangle(
            [(100.0, 100.0, 0.5), (200.0, 100.0, 0.5), (150.0, 50.0, 0.5)],
            ambient_only(Vec3::ONE),
            300.0,
        );
        let scene = scene_with(vec![mesh]);

        let mut device = Device::new(300, 300);
        let clear = Color::new(10, 20, 30);
        device.clear(clear);
        let stats = device.render(&scene, &RenderSettings::default()).unwrap();
        assert_eq!(stats, RenderStats { triangles_drawn: 1, triangles_skipped: 0 });

        // Pixel centers well inside are lit, well outside keep the clear color
        let margin = 1.5;
        let fb = device.framebuffer();
        let (mut inside, mut outside) = (0, 0);
        for y in 0..300 {
            for x in 0..300 {
                let d = edge_distances(corners, (x as f32 + 0.5, y as f32 + 0.5));
                let color = fb.color_at(x, y);
                if d.iter().all(|&e| e > margin) {
                    assert_eq!(color, Some(Color::WHITE), "inside ({}, {})", x, y);
                    inside += 1;
                } else if d.iter().any(|&e| e < -margin) {
                    assert_eq!(color, Some(clear), "outside ({}, {})", x, y);
                    outside += 1;
                }
            }
        }
        assert!(inside > 1500);
        assert!(outside > 80_000);

        let frame = device.present();
        assert_eq!(frame.pixels.len(), 300 * 300 * 4);
        let idx = (55 * 300 + 150) * 4;
        assert_eq!(&frame.pixels[idx..idx + 4], &Color::WHITE.to_bytes());
    }

    #[test]
    fn test_vertex_inside_near_plane_skips_triangle() {
        // One corner sits just beyond the eye-plane epsilon, far off to the side
        let camera = Camera::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut scene = Scene::new(camera, ProjectionConfig::default());
        let vertices = [(-1000.0, 0.0, -2e-5), (1.0, -1.0, -2.0), (1.0, 1.0, -2.0)]
            .iter()
            .map(|&(x, y, z)| Vertex::new(Vec3::new(x, y, z), Vec3::new(0.0, 0.0, 1.0)))
            .collect();
        let mesh = Mesh::new("sliver", vertices, vec![Face::new(0, 1, 2)], ambient_only(Vec3::ONE)).unwrap();
        scene.meshes.push(mesh);
        scene.prepare().unwrap();

        let mut device = Device::new(100, 100);
        device.clear(Color::BLACK);
        let stats = device.render(&scene, &RenderSettings::default()).unwrap();
        assert_eq!(stats, RenderStats { triangles_drawn: 0, triangles_skipped: 1 });
        assert!(device.present().pixels.chunks(4).all(|p| p == Color::BLACK.to_bytes()));
    }

    struct Exploding;

    impl PixelTarget for Exploding {
        fn size(&self) -> (usize, usize) {
            (100, 100)
        }

        fn put_pixel(&self, _x: i32, _y: i32, _z: f32, _color: Color) {
            panic!("pixel sink failed");
        }
    }

    #[test]
    fn test_panic_while_drawing_is_an_error_on_both_paths() {
        let small = flat_triangle(
            [(10.0, 10.0, 0.5), (90.0, 10.0, 0.5), (50.0, 90.0, 0.5)],
            ambient_only(Vec3::ONE),
            100.0,
        );
        let faces = vec![Face::new(0, 1, 2); MIN_PARALLEL_FACES * 2];
        let mut large = Mesh::new("many", small.vertices().to_vec(), faces, ambient_only(Vec3::ONE)).unwrap();
        large.update_transforms(&Mat4::IDENTITY, &pixel_space(100.0)).unwrap();

        let device = Device::new(100, 100);
        let lights: [Light; 0] = [];
        let shader = Shader::new(
            ShadingMode::Gouraud,
            Illumination::new(ambient_only(Vec3::ONE), &lights, SpecularModel::Phong),
            Vec3::ZERO,
        );

        for (mesh, workers) in [(&small, 1), (&small, 4), (&large, 1), (&large, 4)] {
            let projected: Vec<_> = mesh
                .vertices()
                .iter()
                .map(|v| device.project_vertex(v, mesh.transforms()))
                .collect();
            let result = rasterize_mesh(&Exploding, mesh, &projected, &shader, workers);
            assert_eq!(result, Err(RenderError::WorkerPanicked), "workers = {}", workers);
        }
    }

    #[test]
    fn test_nearer_triangle_wins_regardless_of_order() {
        let near = flat_triangle(
            [(10.0, 10.0, 0.2), (90.0, 10.0, 0.2), (50.0, 90.0, 0.2)],
            ambient_only(Vec3::new(0.0, 1.0, 0.0)),
            100.0,
        );
        let far = flat_triangle(
            [(10.0, 10.0, 0.6), (90.0, 10.0, 0.6), (50.0, 90.0, 0.6)],
            ambient_only(Vec3::new(1.0, 0.0, 0.0)),
            100.0,
        );

        for meshes in [vec![near.clone(), far.clone()], vec![far, near]] {
            let scene = scene_with(meshes);
            let mut device = Device::new(100, 100);
            device.clear(Color::BLACK);
            device.render(&scene, &RenderSettings::default()).unwrap();
            assert_eq!(device.framebuffer().color_at(50, 40), Some(Color::GREEN));
        }
    }

    #[test]
    fn test_parallel_render_matches_single_thread() {
        let camera = Camera::new(Vec3::new(0.0, 0.5, 6.0), Vec3::ZERO);
        let mut scene = Scene::new(camera, ProjectionConfig::default());
        scene.lights.push(Light::point(Vec3::new(3.0, 3.0, 5.0), Color::WHITE));
        scene.meshes.push(Mesh::uv_sphere("sphere", 16, 24, 1.5, Material::default()));
        scene.prepare().unwrap();

        let mut devices = Vec::new();
        for workers in [1, 4] {
            let settings = RenderSettings {
                shading: ShadingMode::Phong,
                specular: SpecularModel::Blinn,
                workers,
                ..RenderSettings::default()
            };
            let mut device = Device::new(64, 64);
            device.clear(Color::BLACK);
            let stats = device.render(&scene, &settings).unwrap();
            assert_eq!(stats.triangles_drawn, 16 * 24 * 2);
            devices.push(device);
        }

        // The depth buffer holds the minimum over all writes, whatever their order
        let mut covered = 0;
        for y in 0..64 {
            for x in 0..64 {
                let single = devices[0].framebuffer().depth_at(x, y);
                assert_eq!(single, devices[1].framebuffer().depth_at(x, y));
                if single.map_or(false, f32::is_finite) {
                    covered += 1;
                }
            }
        }
        assert!(covered > 0);
    }

    #[test]
    fn test_save_png_writes_file() {
        let mut device = Device::new(8, 4);
        device.clear(Color::RED);
        let path = std::env::temp_dir().join(format!("solar_raster_frame_{}.png", std::process::id()));
        device.present().save_png(&path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (8, 4));
        assert_eq!(img.get_pixel(3, 2).0, Color::RED.to_bytes());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_resize_keeps_buffer_when_unchanged() {
        let mut device = Device::new(4, 4);
        device.clear(Color::RED);
        device.resize(4, 4);
        assert_eq!(device.framebuffer().color_at(0, 0), Some(Color::RED));
        device.resize(6, 2);
        assert_eq!((device.width(), device.height()), (6, 2));
    }
}
