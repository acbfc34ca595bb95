//! App driver: ties the field, the camera and a render host together.
//!
//! [`FieldApp`] is generic over [`RenderHost`] so the whole frame cycle can
//! run against a recording host in tests and against
//! [`GpuHost`](crate::GpuHost) in the window.
//!
//! ```ignore
//! let mut app = FieldApp::initialize(host, AppConfig::default());
//! app.build_field(GeometryKind::Sphere, Settings::default())?;
//!
//! // Pointer events
//! app.pointer_moved(Some(pointer), viewport);
//!
//! // Redraw
//! match app.frame()? {
//!     FrameStatus::Continue => window.request_redraw(),
//!     FrameStatus::Stopped => event_loop.exit(),
//! }
//! ```

use std::path::Path;

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::controls::OrbitControls;
use crate::error::{ConfigError, FieldError, HostError};
use crate::field::{ParticleField, ParticleInstance};
use crate::geometry::GeometryKind;
use crate::input::{Command, Input, MouseButton};
use crate::projector::CursorProjector;
use crate::settings::Settings;
use crate::visuals::{BloomSettings, Lighting, VariantPicker};

/// Everything a host needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneFrame {
    pub instances: Vec<ParticleInstance>,
    pub view_proj: Mat4,
    pub camera_position: Vec3,
    pub lighting: Lighting,
    pub bloom: BloomSettings,
}

/// The renderer side of the app.
///
/// A host owns the surface and the post-processing chain. It never sees the
/// field itself, only the [`SceneFrame`] built from it.
pub trait RenderHost {
    /// Replace the scene drawn by the next `render_frame`.
    fn submit_scene(&mut self, scene: &SceneFrame);

    /// Draw and present the last submitted scene.
    fn render_frame(&mut self) -> Result<(), HostError>;

    /// The presentation surface changed size.
    fn resize(&mut self, width: u32, height: u32);
}

/// Subscription to the per-frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameLoop {
    /// Acquired by `initialize`.
    Running,
    /// Released by `shutdown`. A stopped loop is never restarted.
    Stopped,
}

impl FrameLoop {
    pub fn is_running(self) -> bool {
        self == FrameLoop::Running
    }
}

/// Result of one [`FieldApp::frame`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// Schedule another frame.
    Continue,
    /// The loop was released; stop scheduling frames.
    Stopped,
}

/// Scene configuration outside of particle behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub camera: Camera,
    pub controls: OrbitControls,
    /// World z of the plane pointer input is projected onto.
    pub plane_z: f32,
    pub lighting: Lighting,
    pub bloom: BloomSettings,
    pub picker: VariantPicker,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            camera: Camera::default(),
            controls: OrbitControls::default(),
            plane_z: 0.0,
            lighting: Lighting::default(),
            bloom: BloomSettings::default(),
            picker: VariantPicker::default(),
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Check the camera and bloom values a renderer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("camera.distance", self.camera.distance, self.camera.distance > 0.0),
            ("camera.fov_y", self.camera.fov_y, self.camera.fov_y > 0.0 && self.camera.fov_y < 180.0),
            ("camera.near", self.camera.near, self.camera.near > 0.0),
            ("camera.far", self.camera.far, self.camera.far > self.camera.near),
            ("controls.damping_factor", self.controls.damping_factor, self.controls.damping_factor > 0.0 && self.controls.damping_factor <= 1.0),
            ("controls.min_distance", self.controls.min_distance, self.controls.min_distance > 0.0),
            ("controls.max_distance", self.controls.max_distance, self.controls.max_distance >= self.controls.min_distance),
            ("plane_z", self.plane_z, self.plane_z.is_finite()),
            ("bloom.strength", self.bloom.strength, self.bloom.strength >= 0.0),
            ("bloom.radius", self.bloom.radius, (0.0..=1.0).contains(&self.bloom.radius)),
            ("bloom.threshold", self.bloom.threshold, self.bloom.threshold >= 0.0),
        ];
        for (name, value, ok) in checks {
            if !ok {
                return Err(ConfigError::InvalidSetting { name, value });
            }
        }
        Ok(())
    }
}

/// Owns the field, the camera and the host, and runs the frame cycle.
pub struct FieldApp<H: RenderHost> {
    host: H,
    field: ParticleField,
    camera: Camera,
    controls: OrbitControls,
    projector: CursorProjector,
    lighting: Lighting,
    bloom: BloomSettings,
    frame_loop: FrameLoop,
    viewport: Vec2,
    frames: u64,
}

impl<H: RenderHost> FieldApp<H> {
    /// Set up the scene around `host` and start the frame loop.
    ///
    /// The field starts empty; call [`build_field`](Self::build_field).
    pub fn initialize(host: H, config: AppConfig) -> Self {
        log::info!(
            "initializing field app (camera distance {}, fov {})",
            config.camera.distance,
            config.camera.fov_y
        );
        Self {
            host,
            field: ParticleField::new().with_picker(config.picker),
            camera: config.camera,
            controls: config.controls,
            projector: CursorProjector::new(config.plane_z),
            lighting: config.lighting,
            bloom: config.bloom,
            frame_loop: FrameLoop::Running,
            viewport: Vec2::ZERO,
            frames: 0,
        }
    }

    /// Populate the field from `kind`. The field must be empty.
    pub fn build_field(&mut self, kind: GeometryKind, settings: Settings) -> Result<usize, FieldError> {
        self.field.build(kind, settings)
    }

    /// Remove every particle. The frame loop keeps running.
    pub fn clear_field(&mut self) {
        self.field.clear();
    }

    /// Clear the field and build it again from `kind` with the current settings.
    pub fn select_geometry(&mut self, kind: GeometryKind) -> Result<usize, FieldError> {
        let settings = *self.field.settings();
        self.field.clear();
        self.field.build(kind, settings)
    }

    /// Release the frame loop. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.frame_loop != FrameLoop::Stopped {
            log::info!("shutting down after {} frames", self.frames);
            self.frame_loop = FrameLoop::Stopped;
        }
    }

    /// Recompute the world cursor from a pointer position in pixels.
    ///
    /// `None` (pointer outside the window) clears the cursor.
    pub fn pointer_moved(&mut self, pointer: Option<Vec2>, viewport: Vec2) {
        let cursor = pointer.and_then(|p| self.projector.project(p, viewport, &self.camera));
        self.field.set_cursor(cursor);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = Vec2::new(width as f32, height as f32);
        self.camera.set_viewport(self.viewport.x, self.viewport.y);
        self.host.resize(width, height);
    }

    /// Apply one frame's worth of window input.
    ///
    /// Returns `false` once a quit command has been handled.
    pub fn handle_input(&mut self, input: &Input) -> bool {
        let drag = input.drag_delta();
        if drag != Vec2::ZERO {
            if input.mouse_held(MouseButton::Left) {
                self.controls.rotate_by_pixels(drag);
            } else {
                self.controls.pan_by_pixels(drag, &self.camera);
            }
        }
        if input.scroll_delta() != 0.0 {
            self.controls.zoom_by_wheel(input.scroll_delta());
        }
        if input.pointer_moved() {
            self.pointer_moved(input.pointer(), input.viewport());
        }

        for command in input.commands() {
            self.apply(command);
        }
        self.frame_loop.is_running()
    }

    /// Carry out a key command.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Select(kind) => {
                if let Err(e) = self.select_geometry(kind) {
                    log::error!("could not build {}: {}", kind, e);
                }
            }
            Command::Clear => self.clear_field(),
            Command::Quit => self.shutdown(),
        }
    }

    /// Run one animation tick and render it.
    ///
    /// Controls update first, then the field ticks, then the host draws.
    /// After `shutdown` this does nothing and reports `Stopped`.
    pub fn frame(&mut self) -> Result<FrameStatus, HostError> {
        if !self.frame_loop.is_running() {
            return Ok(FrameStatus::Stopped);
        }

        self.controls.update(&mut self.camera);
        self.field.tick();

        let scene = self.scene();
        self.host.submit_scene(&scene);
        self.host.render_frame()?;
        self.frames += 1;
        Ok(FrameStatus::Continue)
    }

    /// Snapshot of the current scene for the host.
    pub fn scene(&self) -> SceneFrame {
        SceneFrame {
            instances: self.field.instances().collect(),
            view_proj: self.camera.view_projection(),
            camera_position: self.camera.position(),
            lighting: self.lighting,
            bloom: self.bloom,
        }
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn frame_loop(&self) -> FrameLoop {
        self.frame_loop
    }

    /// Frames rendered since `initialize`.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingHost {
        submitted: usize,
        rendered: usize,
        last_instances: usize,
        size: (u32, u32),
        fail: bool,
    }

    impl RenderHost for CountingHost {
        fn submit_scene(&mut self, scene: &SceneFrame) {
            self.submitted += 1;
            self.last_instances = scene.instances.len();
        }

        fn render_frame(&mut self) -> Result<(), HostError> {
            if self.fail {
                return Err(HostError::NotReady);
            }
            self.rendered += 1;
            Ok(())
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.size = (width, height);
        }
    }

    fn app() -> FieldApp<CountingHost> {
        FieldApp::initialize(CountingHost::default(), AppConfig::default())
    }

    #[test]
    fn test_initialize_starts_loop_with_empty_field() {
        let app = app();
        assert_eq!(app.frame_loop(), FrameLoop::Running);
        assert!(app.field().is_empty());
    }

    #[test]
    fn test_frame_submits_then_renders() {
        let mut app = app();
        app.build_field(GeometryKind::Torus, Settings::default()).unwrap();
        assert_eq!(app.frame().unwrap(), FrameStatus::Continue);
        assert_eq!(app.host().submitted, 1);
        assert_eq!(app.host().rendered, 1);
        assert_eq!(app.host().last_instances, 1649);
        assert!(app.field().rotation() != Vec3::ZERO);
    }

    #[test]
    fn test_shutdown_stops_field_work() {
        let mut app = app();
        app.build_field(GeometryKind::Plane, Settings::default()).unwrap();
        app.frame().unwrap();
        app.shutdown();
        app.shutdown();

        let rotation = app.field().rotation();
        assert_eq!(app.frame().unwrap(), FrameStatus::Stopped);
        assert_eq!(app.field().rotation(), rotation);
        assert_eq!(app.host().rendered, 1);
        assert_eq!(app.frame_count(), 1);
    }

    #[test]
    fn test_clear_keeps_loop_running() {
        let mut app = app();
        app.build_field(GeometryKind::Box, Settings::default()).unwrap();
        app.clear_field();
        assert!(app.frame_loop().is_running());
        assert_eq!(app.frame().unwrap(), FrameStatus::Continue);
        assert_eq!(app.host().last_instances, 0);
    }

    #[test]
    fn test_host_errors_propagate() {
        let mut app = app();
        app.host_mut().fail = true;
        assert!(matches!(app.frame(), Err(HostError::NotReady)));
    }

    #[test]
    fn test_select_command_rebuilds() {
        let mut app = app();
        app.build_field(GeometryKind::Plane, Settings::default()).unwrap();
        app.apply(Command::Select(GeometryKind::Box));
        assert_eq!(app.field().geometry(), Some(GeometryKind::Box));
        assert_eq!(app.field().len(), 1734);

        app.apply(Command::Clear);
        assert!(app.field().is_empty());
        app.apply(Command::Quit);
        assert_eq!(app.frame_loop(), FrameLoop::Stopped);
    }

    #[test]
    fn test_pointer_moves_cursor() {
        let mut app = app();
        app.resize(1280, 720);
        assert_eq!(app.host().size, (1280, 720));

        app.pointer_moved(Some(Vec2::new(640.0, 360.0)), Vec2::new(1280.0, 720.0));
        let cursor = app.field().cursor().unwrap();
        assert!(cursor.length() < 1e-3);

        app.pointer_moved(None, Vec2::new(1280.0, 720.0));
        assert!(app.field().cursor().is_none());
    }

    #[test]
    fn test_config_json_partial() {
        let config = AppConfig::from_json(r#"{ "plane_z": -2.0, "bloom": { "strength": 1.5 } }"#).unwrap();
        assert_eq!(config.plane_z, -2.0);
        assert_eq!(config.bloom.strength, 1.5);
        assert_eq!(config.bloom.radius, 0.5);
        assert_eq!(config.camera.distance, 60.0);

        assert!(AppConfig::from_json(r#"{ "camera": { "fov_y": 0.0 } }"#).is_err());
    }

    #[test]
    fn test_config_rejects_unusable_controls() {
        let inverted = AppConfig::from_json(r#"{ "controls": { "min_distance": 100.0, "max_distance": 10.0 } }"#);
        assert!(matches!(
            inverted,
            Err(ConfigError::InvalidSetting { name: "controls.max_distance", .. })
        ));

        let frozen = AppConfig::from_json(r#"{ "controls": { "damping_factor": 0.0 } }"#);
        assert!(matches!(
            frozen,
            Err(ConfigError::InvalidSetting { name: "controls.damping_factor", .. })
        ));

        let zero_min = AppConfig::from_json(r#"{ "controls": { "min_distance": 0.0 } }"#);
        assert!(zero_min.is_err());
    }

    #[test]
    fn test_controls_mut_drives_camera_on_frame() {
        let mut app = app();
        *app.controls_mut() = OrbitControls::new().with_damping(0.0);
        let camera = *app.camera();
        app.controls_mut().pan_by_pixels(Vec2::new(200.0, 0.0), &camera);
        app.frame().unwrap();
        assert!(app.camera().target.x < 0.0);
    }
}
