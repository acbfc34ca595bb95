//! Base geometry sampling.
//!
//! A field is seeded from the vertices of one of five primitives. Each
//! primitive is built as a temporary position buffer with fixed tessellation,
//! transformed into world space and turned into a list of anchor points. The
//! buffer is dropped as soon as the anchors are extracted.
//!
//! Vertex order matches the usual indexed-mesh layout for each primitive, so
//! seams and poles contribute duplicate points:
//!
//! | kind       | tessellation                        | vertices |
//! |------------|-------------------------------------|----------|
//! | plane      | 20 × 20, 40 × 40 segments           | 1681     |
//! | sphere     | r = 12, 40 × 40 segments            | 1681     |
//! | box        | 16³, 16 segments per axis           | 1734     |
//! | torus      | R = 12, r = 3, 16 × 96 segments     | 1649     |
//! | torus-knot | R = 12, r = 3, 96 × 16, p = 2, q = 3 | 1649    |

use std::f32::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The primitives a field can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeometryKind {
    Plane,
    Sphere,
    Box,
    Torus,
    TorusKnot,
}

impl GeometryKind {
    /// Every kind, in menu order.
    pub const ALL: [GeometryKind; 5] = [
        GeometryKind::Plane,
        GeometryKind::Sphere,
        GeometryKind::Box,
        GeometryKind::Torus,
        GeometryKind::TorusKnot,
    ];

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            GeometryKind::Plane => "plane",
            GeometryKind::Sphere => "sphere",
            GeometryKind::Box => "box",
            GeometryKind::Torus => "torus",
            GeometryKind::TorusKnot => "torus-knot",
        }
    }

    /// Number of anchors `sample` produces for this kind.
    pub fn vertex_count(self) -> usize {
        match self {
            GeometryKind::Plane => 41 * 41,
            GeometryKind::Sphere => 41 * 41,
            GeometryKind::Box => 6 * 17 * 17,
            GeometryKind::Torus => 17 * 97,
            GeometryKind::TorusKnot => 97 * 17,
        }
    }

    /// Sample the vertex positions of this primitive in its own space.
    pub fn sample(self) -> Vec<Vec3> {
        self.sample_transformed(Mat4::IDENTITY)
    }

    /// Sample the vertex positions, transformed by `world` (the mesh's world matrix).
    pub fn sample_transformed(self, world: Mat4) -> Vec<Vec3> {
        let geometry = self.tessellate();
        geometry.world_positions(world)
    }

    fn tessellate(self) -> Geometry {
        match self {
            GeometryKind::Plane => Geometry::plane(20.0, 20.0, 40, 40),
            GeometryKind::Sphere => Geometry::sphere(12.0, 40, 40),
            GeometryKind::Box => Geometry::cuboid(16.0, 16.0, 16.0, 16, 16, 16),
            GeometryKind::Torus => Geometry::torus(12.0, 3.0, 16, 96),
            GeometryKind::TorusKnot => Geometry::torus_knot(12.0, 3.0, 96, 16, 2, 3),
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GeometryKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '_'], "-");
        match normalized.as_str() {
            "plane" => Ok(GeometryKind::Plane),
            "sphere" => Ok(GeometryKind::Sphere),
            "box" => Ok(GeometryKind::Box),
            "torus" => Ok(GeometryKind::Torus),
            "torus-knot" | "torusknot" => Ok(GeometryKind::TorusKnot),
            _ => Err(ConfigError::UnknownGeometry(s.to_string())),
        }
    }
}

/// Temporary vertex buffer for one primitive. Positions only.
struct Geometry {
    positions: Vec<Vec3>,
}

impl Geometry {
    fn world_positions(&self, world: Mat4) -> Vec<Vec3> {
        self.positions
            .iter()
            .map(|&p| world.transform_point3(p))
            .collect()
    }

    /// Flat rectangle in the XY plane, facing +Z.
    fn plane(width: f32, height: f32, width_segments: u32, height_segments: u32) -> Self {
        let half_width = width / 2.0;
        let half_height = height / 2.0;
        let segment_width = width / width_segments as f32;
        let segment_height = height / height_segments as f32;

        let mut positions =
            Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
        for iy in 0..=height_segments {
            let y = iy as f32 * segment_height - half_height;
            for ix in 0..=width_segments {
                let x = ix as f32 * segment_width - half_width;
                positions.push(Vec3::new(x, -y, 0.0));
            }
        }
        Self { positions }
    }

    /// UV sphere with its poles on the Y axis.
    fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);

        let mut positions =
            Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
        for iy in 0..=height_segments {
            let theta = iy as f32 / height_segments as f32 * PI;
            for ix in 0..=width_segments {
                let phi = ix as f32 / width_segments as f32 * TAU;
                positions.push(Vec3::new(
                    -radius * phi.cos() * theta.sin(),
                    radius * theta.cos(),
                    radius * phi.sin() * theta.sin(),
                ));
            }
        }
        Self { positions }
    }

    /// Axis-aligned box centred on the origin, six independent faces.
    fn cuboid(
        width: f32,
        height: f32,
        depth: f32,
        width_segments: u32,
        height_segments: u32,
        depth_segments: u32,
    ) -> Self {
        let mut positions = Vec::new();

        // (u, v, w) axes, u/v directions, face extents, segments
        let faces: [(usize, usize, usize, f32, f32, f32, f32, f32, u32, u32); 6] = [
            (2, 1, 0, -1.0, -1.0, depth, height, width, depth_segments, height_segments),
            (2, 1, 0, 1.0, -1.0, depth, height, -width, depth_segments, height_segments),
            (0, 2, 1, 1.0, 1.0, width, depth, height, width_segments, depth_segments),
            (0, 2, 1, 1.0, -1.0, width, depth, -height, width_segments, depth_segments),
            (0, 1, 2, 1.0, -1.0, width, height, depth, width_segments, height_segments),
            (0, 1, 2, -1.0, -1.0, width, height, -depth, width_segments, height_segments),
        ];

        for (u, v, w, u_dir, v_dir, face_width, face_height, face_depth, grid_x, grid_y) in faces {
            let grid_x = grid_x.max(1);
            let grid_y = grid_y.max(1);
            let segment_width = face_width / grid_x as f32;
            let segment_height = face_height / grid_y as f32;
            let half_width = face_width / 2.0;
            let half_height = face_height / 2.0;
            let half_depth = face_depth / 2.0;

            for iy in 0..=grid_y {
                let y = iy as f32 * segment_height - half_height;
                for ix in 0..=grid_x {
                    let x = ix as f32 * segment_width - half_width;
                    let mut vertex = [0.0f32; 3];
                    vertex[u] = x * u_dir;
                    vertex[v] = y * v_dir;
                    vertex[w] = half_depth;
                    positions.push(Vec3::from_array(vertex));
                }
            }
        }
        Self { positions }
    }

    /// Ring torus around the Z axis.
    fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        let radial_segments = radial_segments.max(3);
        let tubular_segments = tubular_segments.max(3);

        let mut positions =
            Vec::with_capacity(((radial_segments + 1) * (tubular_segments + 1)) as usize);
        for j in 0..=radial_segments {
            let v = j as f32 / radial_segments as f32 * TAU;
            for i in 0..=tubular_segments {
                let u = i as f32 / tubular_segments as f32 * TAU;
                positions.push(Vec3::new(
                    (radius + tube * v.cos()) * u.cos(),
                    (radius + tube * v.cos()) * u.sin(),
                    tube * v.sin(),
                ));
            }
        }
        Self { positions }
    }

    /// (p, q) torus knot swept by a circular tube.
    fn torus_knot(
        radius: f32,
        tube: f32,
        tubular_segments: u32,
        radial_segments: u32,
        p: u32,
        q: u32,
    ) -> Self {
        let tubular_segments = tubular_segments.max(3);
        let radial_segments = radial_segments.max(3);
        let (p, q) = (p as f32, q as f32);

        let knot_point = |u: f32| {
            let quo_p = q / p * u;
            let cs = quo_p.cos();
            Vec3::new(
                radius * (2.0 + cs) * 0.5 * u.cos(),
                radius * (2.0 + cs) * u.sin() * 0.5,
                radius * quo_p.sin() * 0.5,
            )
        };

        let mut positions =
            Vec::with_capacity(((tubular_segments + 1) * (radial_segments + 1)) as usize);
        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * p * TAU;
            let p1 = knot_point(u);
            let p2 = knot_point(u + 0.01);

            // Tube frame from the curve tangent.
            let tangent = p2 - p1;
            let mut normal = p2 + p1;
            let binormal = tangent.cross(normal);
            normal = binormal.cross(tangent);
            let binormal = binormal.normalize();
            let normal = normal.normalize();

            for j in 0..=radial_segments {
                let v = j as f32 / radial_segments as f32 * TAU;
                let cx = -tube * v.cos();
                let cy = tube * v.sin();
                positions.push(p1 + normal * cx + binormal * cy);
            }
        }
        Self { positions }
    }
}
