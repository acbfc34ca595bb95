//! The particle field controller.
//!
//! [`ParticleField`] owns every particle, the aggregate rotation of the
//! group they live in, and the current cursor position. It is the only
//! mutable state the per-frame update touches.
//!
//! # Lifecycle
//!
//! ```ignore
//! let mut field = ParticleField::new();
//! field.build(GeometryKind::Sphere, Settings::default())?;
//!
//! // On pointer move:
//! field.set_cursor(projector.project(pointer, viewport, &camera));
//!
//! // Once per frame:
//! field.tick();
//! for instance in field.instances() { /* draw */ }
//!
//! // Switching geometry:
//! field.clear();
//! field.build(GeometryKind::Torus, settings)?;
//! ```
//!
//! The particle set is only ever replaced whole: `build` refuses to run on a
//! field that still holds particles.

use std::f32::consts::TAU;

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::error::FieldError;
use crate::geometry::GeometryKind;
use crate::particle::{Anchor, Particle};
use crate::settings::Settings;
use crate::visuals::{VariantPicker, PARTICLE_HALF_EXTENTS};

/// Per-particle draw data handed to the render host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleInstance {
    /// Maps the unit cube [-1, 1]³ onto the particle box in world space.
    pub model: Mat4,
    /// Linear RGB colour.
    pub color: Vec3,
}

/// All particles of the scene plus the rotation of the group holding them.
#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
    settings: Settings,
    geometry: Option<GeometryKind>,
    /// XYZ Euler angles of the whole field, in radians.
    rotation: Vec3,
    cursor: Option<Vec3>,
    picker: VariantPicker,
    geometry_transform: Mat4,
}

impl ParticleField {
    /// An empty field.
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            settings: Settings::default(),
            geometry: None,
            rotation: Vec3::ZERO,
            cursor: None,
            picker: VariantPicker::default(),
            geometry_transform: Mat4::IDENTITY,
        }
    }

    /// Choose how particle colours are assigned on the next build.
    pub fn with_picker(mut self, picker: VariantPicker) -> Self {
        self.picker = picker;
        self
    }

    /// World transform applied to sampled geometry before it becomes anchors.
    pub fn with_geometry_transform(mut self, transform: Mat4) -> Self {
        self.geometry_transform = transform;
        self
    }

    /// Sample `kind` and create one resting particle per vertex.
    ///
    /// Returns the number of particles created. Fails if the settings are
    /// invalid or the field has not been cleared since the last build.
    pub fn build(&mut self, kind: GeometryKind, settings: Settings) -> Result<usize, FieldError> {
        self.ensure_empty()?;
        settings.validate()?;
        let anchors = kind.sample_transformed(self.geometry_transform);
        let count = self.populate(anchors, settings);
        self.geometry = Some(kind);
        log::info!("built {} field with {} particles", kind, count);
        Ok(count)
    }

    /// Create one resting particle per point, without a base geometry.
    pub fn build_from_points<I>(&mut self, points: I, settings: Settings) -> Result<usize, FieldError>
    where
        I: IntoIterator<Item = Vec3>,
    {
        self.ensure_empty()?;
        settings.validate()?;
        let count = self.populate(points.into_iter().collect(), settings);
        self.geometry = None;
        log::info!("built point field with {} particles", count);
        Ok(count)
    }

    fn ensure_empty(&self) -> Result<(), FieldError> {
        if self.particles.is_empty() {
            Ok(())
        } else {
            Err(FieldError::NotCleared {
                live: self.particles.len(),
            })
        }
    }

    fn populate(&mut self, anchors: Vec<Vec3>, settings: Settings) -> usize {
        let swatches = self.picker.assign(anchors.len());
        self.particles = anchors
            .into_iter()
            .zip(swatches)
            .map(|(position, swatch)| Particle::new(Anchor::new(position), swatch))
            .collect();
        self.settings = settings;
        self.rotation = Vec3::ZERO;
        self.particles.len()
    }

    /// Advance one frame: rotate the field, then update every particle.
    pub fn tick(&mut self) {
        let angles = self.rotation + self.settings.rotation.step(self.settings.rotation_speed);
        // Kept in [0, TAU) so long sessions do not lose precision.
        self.rotation = Vec3::new(
            angles.x.rem_euclid(TAU),
            angles.y.rem_euclid(TAU),
            angles.z.rem_euclid(TAU),
        );

        let rotation = self.rotation_quat();
        let cursor = self.cursor;
        let settings = self.settings;
        for particle in &mut self.particles {
            particle.avoid_cursor(cursor, rotation, &settings);
            particle.update_position(&settings);
        }
    }

    /// Drop every particle and reset the rotation. The cursor is kept.
    pub fn clear(&mut self) {
        if !self.particles.is_empty() {
            log::debug!("clearing field of {} particles", self.particles.len());
        }
        self.particles.clear();
        self.geometry = None;
        self.rotation = Vec3::ZERO;
    }

    /// Replace the cursor position. `None` means nothing is displaced.
    pub fn set_cursor(&mut self, cursor: Option<Vec3>) {
        self.cursor = cursor;
    }

    #[inline]
    pub fn cursor(&self) -> Option<Vec3> {
        self.cursor
    }

    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Geometry of the current build, if it came from one.
    pub fn geometry(&self) -> Option<GeometryKind> {
        self.geometry
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// XYZ Euler angles of the field, in radians, each in [0, TAU).
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn rotation_quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    pub fn rotation_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.rotation_quat())
    }

    /// World position of particle `index`.
    pub fn world_position(&self, index: usize) -> Option<Vec3> {
        let rotation = self.rotation_quat();
        self.particles
            .get(index)
            .map(|p| p.world_position(rotation))
    }

    /// Draw data for every particle. Particles take the field's orientation.
    pub fn instances(&self) -> impl Iterator<Item = ParticleInstance> + '_ {
        let rotation = self.rotation_quat();
        self.particles.iter().map(move |p| ParticleInstance {
            model: Mat4::from_scale_rotation_translation(
                PARTICLE_HALF_EXTENTS,
                rotation,
                p.world_position(rotation),
            ),
            color: p.swatch().linear(),
        })
    }
}

impl Default for ParticleField {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::RotationMode;

    fn still() -> Settings {
        Settings::new()
            .with_affecting_distance(5.0)
            .with_avoidance_factor(2.0)
            .with_lerp_speed(0.5)
            .with_rotation_speed(1e-9)
    }

    #[test]
    fn test_build_creates_resting_particles() {
        let mut field = ParticleField::new();
        let count = field.build(GeometryKind::Plane, Settings::default()).unwrap();
        assert_eq!(count, GeometryKind::Plane.vertex_count());
        assert_eq!(field.geometry(), Some(GeometryKind::Plane));
        assert!(field
            .particles()
            .iter()
            .all(|p| p.blend() == 0.0 && !p.is_avoiding()));
    }

    #[test]
    fn test_build_on_live_field_is_rejected() {
        let mut field = ParticleField::new();
        field.build(GeometryKind::Torus, Settings::default()).unwrap();
        let err = field.build(GeometryKind::Sphere, Settings::default());
        assert!(matches!(err, Err(FieldError::NotCleared { live }) if live == 1649));
        assert_eq!(field.geometry(), Some(GeometryKind::Torus));
    }

    #[test]
    fn test_build_rejects_invalid_settings() {
        let mut field = ParticleField::new();
        let err = field.build(GeometryKind::Box, Settings::new().with_lerp_speed(0.0));
        assert!(matches!(err, Err(FieldError::Config(_))));
        assert!(field.is_empty());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut field = ParticleField::new();
        field.build(GeometryKind::Box, Settings::default()).unwrap();
        field.tick();
        field.clear();
        assert!(field.is_empty());
        assert_eq!(field.rotation(), Vec3::ZERO);
        field.clear();
        assert!(field.is_empty());
        assert!(field.build(GeometryKind::Box, Settings::default()).is_ok());
    }

    #[test]
    fn test_tick_rotation_modes() {
        let mut field = ParticleField::new();
        field
            .build_from_points([Vec3::X], Settings::new().with_rotation_speed(0.01))
            .unwrap();
        field.tick();
        assert!((field.rotation() - Vec3::new(0.03, 0.02, 0.01)).length() < 1e-7);

        field.clear();
        let uniform = Settings::new()
            .with_rotation_speed(0.01)
            .with_rotation(RotationMode::Uniform);
        field.build_from_points([Vec3::X], uniform).unwrap();
        field.tick();
        field.tick();
        assert!((field.rotation() - Vec3::splat(0.02)).length() < 1e-7);
    }

    #[test]
    fn test_tick_without_cursor_keeps_particles_home() {
        let mut field = ParticleField::new();
        field.build(GeometryKind::Sphere, still()).unwrap();
        for _ in 0..5 {
            field.tick();
        }
        assert!(field
            .particles()
            .iter()
            .all(|p| p.offset() == Vec3::ZERO && !p.is_avoiding()));
    }

    #[test]
    fn test_cursor_pushes_only_nearby_particles() {
        let mut field = ParticleField::new();
        field
            .build_from_points([Vec3::new(1.0, 0.0, 0.0), Vec3::new(50.0, 0.0, 0.0)], still())
            .unwrap();
        field.set_cursor(Some(Vec3::ZERO));
        field.tick();

        let near = &field.particles()[0];
        let far = &field.particles()[1];
        assert!(near.is_avoiding());
        assert!(near.offset().x > 0.0);
        assert!(!far.is_avoiding());
        assert_eq!(far.offset(), Vec3::ZERO);
    }

    #[test]
    fn test_cursor_survives_clear() {
        let mut field = ParticleField::new();
        field.set_cursor(Some(Vec3::ONE));
        field.clear();
        assert_eq!(field.cursor(), Some(Vec3::ONE));
    }

    #[test]
    fn test_instances_follow_particles() {
        let mut field = ParticleField::new().with_picker(VariantPicker::Cycle);
        field
            .build_from_points([Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 3.0, 0.0)], still())
            .unwrap();
        let instances: Vec<_> = field.instances().collect();
        assert_eq!(instances.len(), 2);
        let center = instances[1].model.transform_point3(Vec3::ZERO);
        assert!((center - Vec3::new(0.0, 3.0, 0.0)).length() < 1e-5);
        assert_eq!(instances[0].color, crate::visuals::Swatch::Blue.linear());
    }

    #[test]
    fn test_rotation_wraps_within_full_turn() {
        let mut field = ParticleField::new();
        let fast = Settings::new()
            .with_rotation_speed(0.5)
            .with_rotation(RotationMode::Uniform);
        field.build_from_points([Vec3::X], fast).unwrap();
        for _ in 0..1000 {
            field.tick();
            let r = field.rotation();
            assert!(r.min_element() >= 0.0 && r.max_element() < TAU, "{:?}", r);
        }
        let expected = (1000.0_f64 * 0.5).rem_euclid(std::f64::consts::TAU) as f32;
        assert!((field.rotation().x - expected).abs() < 1e-3);
    }

    #[test]
    fn test_rotation_matrix_matches_world_position() {
        let mut field = ParticleField::new();
        field
            .build_from_points([Vec3::new(4.0, 1.0, -2.0)], Settings::new().with_rotation_speed(0.2))
            .unwrap();
        field.tick();
        let via_matrix = field.rotation_matrix().transform_point3(Vec3::new(4.0, 1.0, -2.0));
        let via_field = field.world_position(0).unwrap();
        assert!((via_matrix - via_field).length() < 1e-5);
    }

    #[test]
    fn test_geometry_transform_moves_anchors() {
        let shift = Vec3::new(0.0, 0.0, -5.0);
        let mut plain = ParticleField::new();
        plain.build(GeometryKind::Sphere, Settings::default()).unwrap();
        let mut moved = ParticleField::new().with_geometry_transform(Mat4::from_translation(shift));
        moved.build(GeometryKind::Sphere, Settings::default()).unwrap();

        assert_eq!(plain.len(), moved.len());
        for (a, b) in plain.particles().iter().zip(moved.particles()) {
            assert!((b.anchor().position() - (a.anchor().position() + shift)).length() < 1e-5);
        }
        // The transform survives a clear and applies to the next build.
        moved.clear();
        moved.build(GeometryKind::Plane, Settings::default()).unwrap();
        assert!(moved.particles().iter().all(|p| (p.anchor().position().z + 5.0).abs() < 1e-5));
    }

    #[test]
    fn test_world_position_out_of_range() {
        let field = ParticleField::new();
        assert!(field.world_position(0).is_none());
    }
}
