//! Perspective orbit camera.

use glam::{DVec3, Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Perspective camera positioned on a sphere around a target point.
///
/// With the default `yaw = 0, pitch = 0` the camera sits on +Z and looks down
/// -Z at the target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    /// Viewport width / height.
    pub aspect: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
}

impl Camera {
    /// 60° camera, 60 units out on +Z, looking at the origin.
    pub fn new() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            distance: 60.0,
            target: Vec3::ZERO,
            fov_y: 60.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }

    pub fn with_distance(mut self, distance: f32) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_fov(mut self, fov_y: f32) -> Self {
        self.fov_y = fov_y;
        self
    }

    /// Set the aspect ratio from a viewport size. Zero-height viewports are ignored.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Map a point from normalized device coordinates back into world space.
    pub fn unproject(&self, ndc: Vec3) -> Vec3 {
        self.unproject_f64(ndc.as_dvec3()).as_vec3()
    }

    /// Unit direction of the view ray through `ndc`, starting at [`position`](Self::position).
    ///
    /// The unprojected point sits on the near plane, a tiny distance from the
    /// camera, so the subtraction is done in double precision.
    pub fn ray_direction(&self, ndc: Vec2) -> Vec3 {
        let through = self.unproject_f64(ndc.extend(0.0).as_dvec3());
        (through - self.position().as_dvec3())
            .normalize_or_zero()
            .as_vec3()
    }

    fn unproject_f64(&self, ndc: DVec3) -> DVec3 {
        self.view_projection()
            .as_dmat4()
            .inverse()
            .project_point3(ndc)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
