//! Damped orbit controls for the scene camera.
//!
//! Input methods ([`rotate_by_pixels`](OrbitControls::rotate_by_pixels),
//! [`pan_by_pixels`](OrbitControls::pan_by_pixels),
//! [`zoom_by_wheel`](OrbitControls::zoom_by_wheel)) only accumulate deltas.
//! [`update`](OrbitControls::update) is called once per tick and moves the
//! camera. With damping enabled each update applies `damping_factor` of the
//! remaining rotation and pan, so motion eases out over several frames.
//!
//! Rotation is off by default: the field spins on its own and the camera only
//! pans and zooms.

use std::f32::consts::FRAC_PI_2;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::camera::Camera;

/// Radians of orbit per dragged pixel.
const ROTATE_PER_PIXEL: f32 = 0.004;
/// Fraction of the visible half-height panned per dragged pixel.
const PAN_PER_PIXEL: f32 = 0.002;
/// Pitch stays this far from the poles.
const POLE_MARGIN: f32 = 0.1;
/// Pending motion below this is dropped.
const SETTLE_EPSILON: f32 = 1e-5;

/// Orbit controls moving a [`Camera`] around its target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitControls {
    pub enable_rotate: bool,
    pub enable_pan: bool,
    pub enable_zoom: bool,
    /// Enable damping (smooth movement).
    pub enable_damping: bool,
    /// Share of the pending motion applied per update, in (0, 1].
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
    /// Closest the camera may get to its target.
    pub min_distance: f32,
    /// Farthest the camera may get from its target.
    pub max_distance: f32,

    #[serde(skip)]
    rotate_delta: Vec2,
    #[serde(skip)]
    pan_offset: Vec3,
    #[serde(skip)]
    scale: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            enable_rotate: false,
            enable_pan: true,
            enable_zoom: true,
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            pan_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 1.0,
            max_distance: 500.0,
            rotate_delta: Vec2::ZERO,
            pan_offset: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

impl OrbitControls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rotate(mut self, enabled: bool) -> Self {
        self.enable_rotate = enabled;
        self
    }

    /// Set the damping factor. Zero or less disables damping and keeps the
    /// previous factor.
    pub fn with_damping(mut self, factor: f32) -> Self {
        self.enable_damping = factor > 0.0;
        if self.enable_damping {
            self.damping_factor = factor.min(1.0);
        }
        self
    }

    /// Limit the camera distance. Inverted limits are swapped.
    pub fn with_distance_limits(mut self, min: f32, max: f32) -> Self {
        self.min_distance = min.min(max);
        self.max_distance = min.max(max);
        self
    }

    /// Queue an orbit by yaw/pitch angles in radians.
    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        if self.enable_rotate {
            // Inverted for grab-and-drag
            self.rotate_delta.x -= delta_yaw * self.rotate_speed;
            self.rotate_delta.y += delta_pitch * self.rotate_speed;
        }
    }

    /// Queue an orbit from a mouse drag in pixels.
    pub fn rotate_by_pixels(&mut self, delta: Vec2) {
        self.rotate(delta.x * ROTATE_PER_PIXEL, delta.y * ROTATE_PER_PIXEL);
    }

    /// Queue a pan from a mouse drag in pixels.
    ///
    /// The pan is scaled by the visible height at the target, so a drag moves
    /// the scene by a similar screen distance at any zoom level.
    pub fn pan_by_pixels(&mut self, delta: Vec2, camera: &Camera) {
        if !self.enable_pan {
            return;
        }

        let position = camera.position();
        let distance = (position - camera.target).length();
        let half_height = distance * (camera.fov_y.to_radians() / 2.0).tan();
        let pan = delta * half_height * self.pan_speed * PAN_PER_PIXEL;

        let forward = (camera.target - position).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);

        self.pan_offset += right * -pan.x + up * pan.y;
    }

    /// Zoom in (positive) or out (negative).
    pub fn zoom(&mut self, delta: f32) {
        if !self.enable_zoom {
            return;
        }
        if delta > 0.0 {
            self.scale /= 1.0 + delta * self.zoom_speed * 0.1;
        } else {
            self.scale *= 1.0 - delta * self.zoom_speed * 0.1;
        }
    }

    /// Zoom from a scroll wheel delta. Scrolling up zooms in.
    pub fn zoom_by_wheel(&mut self, delta: f32) {
        self.zoom(delta);
    }

    /// Whether any rotation or pan is still being eased in.
    pub fn is_settled(&self) -> bool {
        self.rotate_delta.length() < SETTLE_EPSILON
            && self.pan_offset.length() < SETTLE_EPSILON
            && self.scale == 1.0
    }

    /// Apply accumulated input to the camera.
    pub fn update(&mut self, camera: &mut Camera) {
        let share = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        camera.yaw += self.rotate_delta.x * share;
        camera.pitch = (camera.pitch + self.rotate_delta.y * share)
            .clamp(-FRAC_PI_2 + POLE_MARGIN, FRAC_PI_2 - POLE_MARGIN);
        camera.target += self.pan_offset * share;

        // Zoom is applied in one step.
        let (near, far) = (
            self.min_distance.min(self.max_distance),
            self.min_distance.max(self.max_distance),
        );
        camera.distance = (camera.distance * self.scale).max(near).min(far);
        self.scale = 1.0;

        self.rotate_delta *= 1.0 - share;
        self.pan_offset *= 1.0 - share;
        if self.rotate_delta.length() < SETTLE_EPSILON {
            self.rotate_delta = Vec2::ZERO;
        }
        if self.pan_offset.length() < SETTLE_EPSILON {
            self.pan_offset = Vec3::ZERO;
        }
    }

    /// Drop all pending motion.
    pub fn reset(&mut self) {
        self.rotate_delta = Vec2::ZERO;
        self.pan_offset = Vec3::ZERO;
        self.scale = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_disabled_by_default() {
        let mut controls = OrbitControls::new();
        let mut camera = Camera::new();
        controls.rotate_by_pixels(Vec2::new(200.0, 50.0));
        controls.update(&mut camera);
        assert_eq!(camera.yaw, 0.0);
        assert_eq!(camera.pitch, 0.0);
        assert!(controls.is_settled());
    }

    #[test]
    fn test_undamped_pan_applies_at_once() {
        let mut controls = OrbitControls::new().with_damping(0.0);
        let mut camera = Camera::new();
        controls.pan_by_pixels(Vec2::new(100.0, 0.0), &camera);
        controls.update(&mut camera);
        // Dragging right moves the target left.
        assert!(camera.target.x < 0.0);
        assert!(camera.target.y.abs() < 1e-5);
        assert!(controls.is_settled());
    }

    #[test]
    fn test_damped_pan_eases_to_same_target() {
        let mut undamped = OrbitControls::new().with_damping(0.0);
        let mut expected = Camera::new();
        undamped.pan_by_pixels(Vec2::new(40.0, -30.0), &expected);
        undamped.update(&mut expected);

        let mut damped = OrbitControls::new();
        let mut camera = Camera::new();
        damped.pan_by_pixels(Vec2::new(40.0, -30.0), &camera);
        damped.update(&mut camera);
        let first_step = camera.target;
        assert!(first_step.length() < expected.target.length());

        for _ in 0..500 {
            damped.update(&mut camera);
        }
        assert!((camera.target - expected.target).length() < 1e-3);
        assert!(damped.is_settled());
    }

    #[test]
    fn test_zoom_clamps_distance() {
        let mut controls = OrbitControls::new().with_distance_limits(10.0, 80.0);
        let mut camera = Camera::new();
        for _ in 0..100 {
            controls.zoom_by_wheel(5.0);
            controls.update(&mut camera);
        }
        assert_eq!(camera.distance, 10.0);
        for _ in 0..100 {
            controls.zoom_by_wheel(-5.0);
            controls.update(&mut camera);
        }
        assert_eq!(camera.distance, 80.0);
    }

    #[test]
    fn test_inverted_distance_limits_are_swapped() {
        let controls = OrbitControls::new().with_distance_limits(100.0, 10.0);
        assert_eq!(controls.min_distance, 10.0);
        assert_eq!(controls.max_distance, 100.0);

        // Limits set directly are still ordered when zooming.
        let mut controls = OrbitControls::new();
        controls.min_distance = 100.0;
        controls.max_distance = 10.0;
        let mut camera = Camera::new();
        for _ in 0..10 {
            controls.zoom_by_wheel(-5.0);
            controls.update(&mut camera);
        }
        assert_eq!(camera.distance, 100.0);
    }

    #[test]
    fn test_disabling_damping_keeps_factor() {
        let controls = OrbitControls::new().with_damping(0.0);
        assert!(!controls.enable_damping);
        assert_eq!(controls.damping_factor, 0.05);

        let controls = OrbitControls::new().with_damping(3.0);
        assert!(controls.enable_damping);
        assert_eq!(controls.damping_factor, 1.0);
    }

    #[test]
    fn test_reset_drops_pending_motion() {
        let mut controls = OrbitControls::new().with_rotate(true);
        let mut camera = Camera::new();
        controls.rotate_by_pixels(Vec2::new(120.0, 40.0));
        controls.pan_by_pixels(Vec2::new(50.0, 0.0), &camera);
        controls.zoom_by_wheel(2.0);
        assert!(!controls.is_settled());

        controls.reset();
        assert!(controls.is_settled());
        controls.update(&mut camera);
        assert_eq!(camera, Camera::new());
    }

    #[test]
    fn test_pitch_stays_off_poles() {
        let mut controls = OrbitControls::new().with_rotate(true).with_damping(0.0);
        let mut camera = Camera::new();
        controls.rotate(0.0, 10.0);
        controls.update(&mut camera);
        assert!(camera.pitch < FRAC_PI_2);
    }
}
