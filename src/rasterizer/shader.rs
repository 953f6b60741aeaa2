//! Scan-line triangle rasterizer with Gouraud and Phong shading
//!
//! Triangles arrive already transformed (screen-space `coordinates`, view-space
//! `world_coordinates` and `normal`). The rasterizer sorts the vertices top to
//! bottom, walks both bounding edges one row at a time and fills each row from
//! left to right. Every covered pixel is handed to a [`PixelTarget`].

use serde::{Serialize, Deserialize};
use super::illumination::Illumination;
use super::math::{Vec3, Vec4};
use super::types::{Color, Vertex};

/// Receives rasterized pixels. Implementations must tolerate concurrent calls.
pub trait PixelTarget: Sync {
    /// (width, height) in pixels
    fn size(&self) -> (usize, usize);

    /// Depth-tested write. Out-of-bounds coordinates are ignored.
    fn put_pixel(&self, x: i32, y: i32, z: f32, color: Color);
}

/// Where lighting is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShadingMode {
    /// Light each vertex, interpolate colors across the triangle
    Gouraud,
    /// Interpolate normals and positions, light every pixel
    Phong,
}

impl ShadingMode {
    pub fn label(&self) -> &'static str {
        match self {
            ShadingMode::Gouraud => "Gouraud",
            ShadingMode::Phong => "Phong",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ShadingMode::Gouraud => ShadingMode::Phong,
            ShadingMode::Phong => ShadingMode::Gouraud,
        }
    }
}

/// Everything interpolated across a triangle
#[derive(Debug, Clone, Copy)]
struct Fragment {
    screen: Vec4,
    normal: Vec3,
    world: Vec3,
    color: Color,
}

impl Fragment {
    fn lerp(&self, other: &Fragment, gradient: f32) -> Fragment {
        Fragment {
            screen: self.screen.lerp(other.screen, gradient),
            normal: self.normal.lerp(other.normal, gradient),
            world: self.world.lerp(other.world, gradient),
            color: self.color.lerp(other.color, gradient),
        }
    }
}

/// Triangle shader: shading mode plus the illumination model of the mesh being drawn
#[derive(Debug, Clone, Copy)]
pub struct Shader<'a> {
    pub mode: ShadingMode,
    pub illumination: Illumination<'a>,
    /// Viewer position in view space
    pub viewer: Vec3,
}

impl<'a> Shader<'a> {
    pub fn new(mode: ShadingMode, illumination: Illumination<'a>, viewer: Vec3) -> Self {
        Self { mode, illumination, viewer }
    }

    fn fragment(&self, v: &Vertex) -> Fragment {
        let normal = v.normal.xyz();
        let world = v.world_coordinates.xyz();
        let color = match self.mode {
            ShadingMode::Gouraud => self.illumination.shade(normal, self.viewer, world),
            ShadingMode::Phong => Color::BLACK,
        };
        Fragment {
            screen: v.coordinates,
            normal,
            world,
            color,
        }
    }

    /// Rasterize one triangle into `target`
    pub fn draw_triangle<T: PixelTarget + ?Sized>(&self, target: &T, v1: &Vertex, v2: &Vertex, v3: &Vertex) {
        let [v1, v2, v3] = sort_by_y([v1, v2, v3]);
        let f1 = self.fragment(v1);
        let f2 = self.fragment(v2);
        let f3 = self.fragment(v3);

        let (p1, p2, p3) = (f1.screen, f2.screen, f3.screen);
        let (_, height) = target.size();
        let height = height as i32;

        let y1 = p1.y.floor() as i32;
        let y2 = p2.y.floor() as i32;
        let y3 = p3.y.floor() as i32;
        let top = y1.max(0)..y2.min(height);
        let bottom = y2.max(0)..y3.saturating_add(1).min(height);

        if v2_on_right(p1, p2, p3) {
            for y in top {
                self.scan_line(target, y, (&f1, &f3), (&f1, &f2));
            }
            for y in bottom {
                self.scan_line(target, y, (&f1, &f3), (&f2, &f3));
            }
        } else {
            for y in top {
                self.scan_line(target, y, (&f1, &f2), (&f1, &f3));
            }
            for y in bottom {
                self.scan_line(target, y, (&f2, &f3), (&f1, &f3));
            }
        }
    }

    /// Fill row `y` between the left edge (a, b) and the right edge (c, d)
    fn scan_line<T: PixelTarget + ?Sized>(
        &self,
        target: &T,
        y: i32,
        left: (&Fragment, &Fragment),
        right: (&Fragment, &Fragment),
    ) {
        let start = left.0.lerp(left.1, edge_gradient(y as f32, left.0.screen, left.1.screen));
        let end = right.0.lerp(right.1, edge_gradient(y as f32, right.0.screen, right.1.screen));

        // Kept in f32: far off-screen edges do not fit in an i32 span
        let sx = start.screen.x.floor();
        let ex = end.screen.x.floor();
        if !(ex > sx) {
            return;
        }

        let (width, _) = target.size();
        let span = ex - sx;
        let first = sx.max(0.0) as i32;
        let last = ex.min(width as f32) as i32;
        for x in first..last {
            let gradient = (x as f32 - sx) / span;
            let z = super::math::interpolate(start.screen.z, end.screen.z, gradient);
            let color = match self.mode {
                ShadingMode::Gouraud => start.color.lerp(end.color, gradient),
                ShadingMode::Phong => {
                    let normal = start.normal.lerp(end.normal, gradient);
                    let world = start.world.lerp(end.world, gradient);
                    self.illumination.shade(normal, self.viewer, world)
                }
            };
            target.put_pixel(x, y, z, color);
        }
    }
}

/// Order three vertices so screen y is non-decreasing (stable)
fn sort_by_y<'v>(mut v: [&'v Vertex; 3]) -> [&'v Vertex; 3] {
    if v[0].coordinates.y > v[1].coordinates.y {
        v.swap(0, 1);
    }
    if v[1].coordinates.y > v[2].coordinates.y {
        v.swap(1, 2);
    }
    if v[0].coordinates.y > v[1].coordinates.y {
        v.swap(0, 1);
    }
    v
}

/// Whether the middle vertex lies right of the long edge p1 -> p3
fn v2_on_right(p1: Vec4, p2: Vec4, p3: Vec4) -> bool {
    if p2.y > p1.y {
        inverse_slope(p1, p2) > inverse_slope(p1, p3)
    } else {
        // Flat top: both inverse slopes from p1 are meaningless
        p2.x > p1.x
    }
}

fn inverse_slope(a: Vec4, b: Vec4) -> f32 {
    if b.y - a.y > 0.0 {
        (b.x - a.x) / (b.y - a.y)
    } else {
        0.0
    }
}

/// Position of row `y` along edge a -> b; 1 for horizontal edges
fn edge_gradient(y: f32, a: Vec4, b: Vec4) -> f32 {
    if a.y != b.y {
        (y - a.y) / (b.y - a.y)
    } else {
        1.0
    }
}
