//! A single field particle and its avoidance state machine.
//!
//! Each particle rests at an [`Anchor`] and carries a local offset from it.
//! Every tick the field first calls [`Particle::avoid_cursor`], which picks a
//! target offset (away from the cursor, or back to zero), then
//! [`Particle::update_position`], which ramps a blend weight toward 1 and
//! interpolates the offset toward the target by that weight.
//!
//! The blend weight resets to 0 whenever the particle switches between
//! resting and avoiding, so each transition restarts the ease from wherever
//! the particle currently is.

use glam::{Quat, Vec3};

use crate::settings::{ReferencePoint, Settings};
use crate::visuals::Swatch;

/// Blend values this close to 1 are snapped to exactly 1.
const BLEND_SNAP: f32 = 1e-6;

/// Rest position of a particle in field-local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    position: Vec3,
}

impl Anchor {
    pub fn new(position: Vec3) -> Self {
        Self { position }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Anchor position after the field rotation.
    #[inline]
    pub fn world_position(&self, rotation: Quat) -> Vec3 {
        rotation * self.position
    }
}

/// Whether a particle is currently pushed away by the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleState {
    Resting,
    Avoiding,
}

/// One particle of the field.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    swatch: Swatch,
    anchor: Anchor,
    /// Current displacement from the anchor, field-local.
    offset: Vec3,
    /// Displacement the particle is easing toward.
    target: Vec3,
    /// Interpolation weight in [0, 1].
    blend: f32,
    avoiding: bool,
}

impl Particle {
    /// A resting particle sitting exactly on its anchor.
    pub fn new(anchor: Anchor, swatch: Swatch) -> Self {
        Self {
            swatch,
            anchor,
            offset: Vec3::ZERO,
            target: Vec3::ZERO,
            blend: 0.0,
            avoiding: false,
        }
    }

    #[inline]
    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    #[inline]
    pub fn swatch(&self) -> Swatch {
        self.swatch
    }

    #[inline]
    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    #[inline]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    #[inline]
    pub fn blend(&self) -> f32 {
        self.blend
    }

    #[inline]
    pub fn is_avoiding(&self) -> bool {
        self.avoiding
    }

    pub fn state(&self) -> ParticleState {
        if self.avoiding {
            ParticleState::Avoiding
        } else {
            ParticleState::Resting
        }
    }

    /// Anchor plus offset, before the field rotation.
    #[inline]
    pub fn local_position(&self) -> Vec3 {
        self.anchor.position + self.offset
    }

    /// Current position after the field rotation.
    #[inline]
    pub fn world_position(&self, rotation: Quat) -> Vec3 {
        rotation * self.local_position()
    }

    /// Choose this tick's target offset from the cursor position.
    ///
    /// A particle avoids when its reference point is strictly closer to the
    /// cursor than `affecting_distance`. A missing cursor never displaces.
    pub fn avoid_cursor(&mut self, cursor: Option<Vec3>, rotation: Quat, settings: &Settings) {
        let anchor_world = self.anchor.world_position(rotation);
        let live_world = self.world_position(rotation);
        let reference = match settings.reference {
            ReferencePoint::Anchor => anchor_world,
            ReferencePoint::Live => live_world,
        };

        let in_range = cursor
            .filter(|&c| settings.metric.distance(c, reference) < settings.affecting_distance);

        match in_range {
            Some(cursor) => {
                let away = settings.displacement.direction(
                    live_world,
                    anchor_world,
                    settings.metric.cursor_component(cursor),
                );
                self.target = away.normalize_or_zero() * settings.avoidance_factor;
                if !self.avoiding {
                    self.avoiding = true;
                    self.blend = 0.0;
                }
            }
            None => {
                self.target = Vec3::ZERO;
                if self.avoiding {
                    self.avoiding = false;
                    self.blend = 0.0;
                }
            }
        }
    }

    /// Advance the blend weight and move the offset toward the target.
    pub fn update_position(&mut self, settings: &Settings) {
        self.blend = (self.blend + settings.lerp_speed).min(1.0);
        if 1.0 - self.blend < BLEND_SNAP {
            self.blend = 1.0;
        }

        if self.blend >= 1.0 {
            self.offset = self.target;
        } else {
            self.offset = self.offset.lerp(self.target, self.blend);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Displacement, DistanceMetric};

    fn settings() -> Settings {
        Settings::new()
            .with_affecting_distance(5.0)
            .with_avoidance_factor(2.0)
            .with_lerp_speed(0.25)
    }

    fn particle_at(position: Vec3) -> Particle {
        Particle::new(Anchor::new(position), Swatch::Blue)
    }

    #[test]
    fn test_new_particle_rests_on_anchor() {
        let p = particle_at(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(p.state(), ParticleState::Resting);
        assert_eq!(p.blend(), 0.0);
        assert_eq!(p.local_position(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_enters_avoiding_inside_radius() {
        let mut p = particle_at(Vec3::new(1.0, 0.0, 0.0));
        p.avoid_cursor(Some(Vec3::ZERO), Quat::IDENTITY, &settings());
        assert!(p.is_avoiding());
        assert_eq!(p.blend(), 0.0);
        // live + anchor - cursor = (2, 0, 0), scaled to length 2.
        assert!((p.target() - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut p = particle_at(Vec3::new(5.0, 0.0, 0.0));
        p.avoid_cursor(Some(Vec3::ZERO), Quat::IDENTITY, &settings());
        assert!(!p.is_avoiding());
        assert_eq!(p.target(), Vec3::ZERO);
    }

    #[test]
    fn test_missing_cursor_never_displaces() {
        let mut p = particle_at(Vec3::ZERO);
        p.avoid_cursor(None, Quat::IDENTITY, &settings());
        assert!(!p.is_avoiding());
    }

    #[test]
    fn test_planar_metric_ignores_depth() {
        let mut p = particle_at(Vec3::new(0.0, 1.0, 40.0));
        p.avoid_cursor(Some(Vec3::ZERO), Quat::IDENTITY, &settings());
        assert!(p.is_avoiding());

        let mut p = particle_at(Vec3::new(0.0, 1.0, 40.0));
        let euclidean = settings().with_metric(DistanceMetric::Euclidean);
        p.avoid_cursor(Some(Vec3::ZERO), Quat::IDENTITY, &euclidean);
        assert!(!p.is_avoiding());
    }

    #[test]
    fn test_live_reference_uses_displaced_position() {
        let s = settings().with_reference(ReferencePoint::Live);
        let mut p = particle_at(Vec3::new(4.0, 0.0, 0.0));
        p.avoid_cursor(Some(Vec3::ZERO), Quat::IDENTITY, &s);
        for _ in 0..4 {
            p.update_position(&s);
        }
        // Pushed out to x = 6, now beyond the radius measured from the live point.
        assert!((p.local_position().x - 6.0).abs() < 1e-5);
        p.avoid_cursor(Some(Vec3::ZERO), Quat::IDENTITY, &s);
        assert!(!p.is_avoiding());
    }

    #[test]
    fn test_direct_displacement_pushes_away_from_cursor() {
        let s = Settings::new()
            .with_affecting_distance(5.0)
            .with_avoidance_factor(2.0)
            .with_lerp_speed(1.0)
            .with_metric(DistanceMetric::Euclidean)
            .with_reference(ReferencePoint::Live)
            .with_displacement(Displacement::Direct);

        // The cursor sits just past the anchor; the push must not cross it.
        let mut p = particle_at(Vec3::new(1.0, 0.0, 0.0));
        let cursor = Vec3::new(1.5, 0.0, 0.0);
        p.avoid_cursor(Some(cursor), Quat::IDENTITY, &s);
        p.update_position(&s);
        assert!((p.target() - Vec3::new(-2.0, 0.0, 0.0)).length() < 1e-6);
        assert!((p.local_position() - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-6);

        // From any side, the target points away from the cursor.
        for anchor in [Vec3::new(3.0, 1.0, 0.0), Vec3::new(-2.0, 2.0, 1.0), Vec3::new(0.5, -3.0, -1.0)] {
            let mut p = particle_at(anchor);
            p.avoid_cursor(Some(Vec3::ZERO), Quat::IDENTITY, &s);
            assert!(p.is_avoiding());
            assert!(p.target().dot(anchor) > 0.0);
        }
    }

    #[test]
    fn test_blend_ramps_and_clamps() {
        let s = settings();
        let mut p = particle_at(Vec3::new(1.0, 0.0, 0.0));
        p.avoid_cursor(Some(Vec3::ZERO), Quat::IDENTITY, &s);

        let mut last = p.blend();
        for _ in 0..10 {
            p.update_position(&s);
            assert!(p.blend() >= last);
            assert!(p.blend() <= 1.0);
            last = p.blend();
        }
        assert_eq!(p.blend(), 1.0);
        assert_eq!(p.offset(), p.target());
    }

    #[test]
    fn test_transition_resets_blend() {
        let s = settings();
        let mut p = particle_at(Vec3::new(1.0, 0.0, 0.0));
        p.avoid_cursor(Some(Vec3::ZERO), Quat::IDENTITY, &s);
        p.update_position(&s);
        p.update_position(&s);
        assert_eq!(p.blend(), 0.5);

        p.avoid_cursor(Some(Vec3::new(100.0, 0.0, 0.0)), Quat::IDENTITY, &s);
        assert_eq!(p.state(), ParticleState::Resting);
        assert_eq!(p.blend(), 0.0);
    }

    #[test]
    fn test_staying_in_range_keeps_blend_and_reaims() {
        let s = settings();
        let mut p = particle_at(Vec3::new(1.0, 0.0, 0.0));
        p.avoid_cursor(Some(Vec3::ZERO), Quat::IDENTITY, &s);
        p.update_position(&s);
        let first_target = p.target();

        p.avoid_cursor(Some(Vec3::new(1.0, -1.0, 0.0)), Quat::IDENTITY, &s);
        assert_eq!(p.blend(), 0.25);
        assert!(p.target() != first_target);
        assert!((p.target().length() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_rotation_moves_reference_point() {
        let s = settings();
        let mut p = particle_at(Vec3::new(10.0, 0.0, 0.0));
        // A quarter turn about Z brings the anchor to (0, 10, 0).
        let quarter = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
        p.avoid_cursor(Some(Vec3::new(0.0, 10.0, 0.0)), quarter, &s);
        assert!(p.is_avoiding());
    }
}
