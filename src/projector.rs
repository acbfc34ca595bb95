//! Pointer to world-space cursor projection.
//!
//! A pointer position in window pixels is turned into normalized device
//! coordinates, unprojected through the camera into a ray, and the ray is
//! intersected with the working depth plane `z = plane_z`. The hit point is
//! the cursor the particles avoid.

use glam::{Vec2, Vec3};

use crate::camera::Camera;

/// Rays flatter than this against the working plane are treated as parallel.
const PARALLEL_EPSILON: f32 = 1e-6;

/// Projects pointer positions onto the working depth plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorProjector {
    /// World z of the working plane.
    pub plane_z: f32,
}

impl CursorProjector {
    pub fn new(plane_z: f32) -> Self {
        Self { plane_z }
    }

    /// Convert a pixel position into normalized device coordinates.
    ///
    /// X increases to the right, Y increases upward. Returns `None` for an
    /// empty viewport.
    pub fn to_ndc(pointer: Vec2, viewport: Vec2) -> Option<Vec2> {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return None;
        }
        Some(Vec2::new(
            (pointer.x / viewport.x) * 2.0 - 1.0,
            -(pointer.y / viewport.y) * 2.0 + 1.0,
        ))
    }

    /// Project a pointer position onto the working plane.
    ///
    /// Returns `None` when the viewport is empty, when the view ray runs
    /// parallel to the plane, or when the hit point is not finite. Callers
    /// store `None` as "no cursor", which displaces nothing.
    pub fn project(&self, pointer: Vec2, viewport: Vec2, camera: &Camera) -> Option<Vec3> {
        let ndc = Self::to_ndc(pointer, viewport)?;
        let origin = camera.position();
        let direction = camera.ray_direction(ndc);

        if direction.z.abs() < PARALLEL_EPSILON {
            log::debug!("cursor ray parallel to working plane, dropping cursor");
            return None;
        }

        let distance = (self.plane_z - origin.z) / direction.z;
        let hit = origin + direction * distance;
        hit.is_finite().then_some(hit)
    }
}

impl Default for CursorProjector {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

    fn camera() -> Camera {
        let mut camera = Camera::new();
        camera.set_viewport(VIEWPORT.x, VIEWPORT.y);
        camera
    }

    #[test]
    fn test_ndc_flips_vertical_axis() {
        let ndc = CursorProjector::to_ndc(Vec2::ZERO, VIEWPORT).unwrap();
        assert_eq!(ndc, Vec2::new(-1.0, 1.0));
        let ndc = CursorProjector::to_ndc(VIEWPORT, VIEWPORT).unwrap();
        assert_eq!(ndc, Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_center_projects_to_origin() {
        let hit = CursorProjector::default()
            .project(VIEWPORT / 2.0, VIEWPORT, &camera())
            .unwrap();
        assert!(hit.length() < 1e-3, "{:?}", hit);
    }

    #[test]
    fn test_hit_lies_on_plane() {
        let projector = CursorProjector::new(-5.0);
        let hit = projector
            .project(Vec2::new(100.0, 650.0), VIEWPORT, &camera())
            .unwrap();
        assert!((hit.z + 5.0).abs() < 1e-3);
        // Lower-left of the screen maps to negative x and y.
        assert!(hit.x < 0.0 && hit.y < 0.0);
    }

    #[test]
    fn test_screen_edge_matches_frustum() {
        // Top edge at the origin plane: y = d * tan(fov / 2).
        let hit = CursorProjector::default()
            .project(Vec2::new(VIEWPORT.x / 2.0, 0.0), VIEWPORT, &camera())
            .unwrap();
        let expected = 60.0 * (30.0f32).to_radians().tan();
        assert!((hit.y - expected).abs() < 1e-2, "{} vs {}", hit.y, expected);
    }

    #[test]
    fn test_parallel_ray_yields_none() {
        // Camera on +X looking back at the origin: the center ray runs along the plane.
        let mut camera = camera();
        camera.yaw = std::f32::consts::FRAC_PI_2;
        let hit = CursorProjector::default().project(VIEWPORT / 2.0, VIEWPORT, &camera);
        assert!(hit.is_none());
    }

    #[test]
    fn test_empty_viewport_yields_none() {
        let hit = CursorProjector::default().project(Vec2::ZERO, Vec2::ZERO, &camera());
        assert!(hit.is_none());
    }
}
