//! Field settings.
//!
//! [`Settings`] is read by every particle on every tick. Build it with the
//! `with_*` methods or load it from a JSON preset:
//!
//! ```ignore
//! let settings = Settings::new()
//!     .with_affecting_distance(5.0)
//!     .with_avoidance_factor(2.0)
//!     .with_lerp_speed(0.05)
//!     .with_metric(DistanceMetric::Euclidean);
//!
//! let calm = Settings::from_json_file("presets/calm.json")?;
//! ```

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the distance between the cursor and a particle is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Only x and y count; the cursor is treated as lying on every z.
    #[default]
    Planar,
    /// Full 3D distance to the cursor point on the working plane.
    Euclidean,
}

impl DistanceMetric {
    /// Distance between `cursor` and `point` under this metric.
    #[inline]
    pub fn distance(self, cursor: Vec3, point: Vec3) -> f32 {
        match self {
            DistanceMetric::Planar => cursor.truncate().distance(point.truncate()),
            DistanceMetric::Euclidean => cursor.distance(point),
        }
    }

    /// The part of the cursor position that participates in displacement.
    #[inline]
    pub fn cursor_component(self, cursor: Vec3) -> Vec3 {
        match self {
            DistanceMetric::Planar => Vec3::new(cursor.x, cursor.y, 0.0),
            DistanceMetric::Euclidean => cursor,
        }
    }
}

/// Which point of a particle is tested against the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferencePoint {
    /// The fixed rest position.
    #[default]
    Anchor,
    /// The current, animated position.
    Live,
}

/// Which vector an avoiding particle is pushed along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Displacement {
    /// Live position plus anchor, minus the cursor.
    #[default]
    AnchorSum,
    /// Live position minus the cursor; always points away from it.
    Direct,
}

impl Displacement {
    /// Unnormalised push direction for a particle at `live`, resting at
    /// `anchor`, with `cursor` already reduced by the distance metric.
    #[inline]
    pub fn direction(self, live: Vec3, anchor: Vec3, cursor: Vec3) -> Vec3 {
        match self {
            Displacement::AnchorSum => live + anchor - cursor,
            Displacement::Direct => live - cursor,
        }
    }
}

/// How `rotation_speed` is spread over the three Euler axes each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationMode {
    /// Every axis advances by `rotation_speed`.
    Uniform,
    /// Axis `i` advances by `rotation_speed * multipliers[i]`.
    PerAxis(Vec3),
}

impl Default for RotationMode {
    fn default() -> Self {
        RotationMode::PerAxis(Vec3::new(3.0, 2.0, 1.0))
    }
}

impl RotationMode {
    /// Euler angle increment for one tick.
    pub fn step(self, rotation_speed: f32) -> Vec3 {
        match self {
            RotationMode::Uniform => Vec3::splat(rotation_speed),
            RotationMode::PerAxis(multipliers) => multipliers * rotation_speed,
        }
    }
}

/// Behaviour shared by every particle in a field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Radius inside which a particle starts avoiding the cursor.
    pub affecting_distance: f32,
    /// Length of the displacement applied while avoiding.
    pub avoidance_factor: f32,
    /// Radians per tick applied to the whole field.
    pub rotation_speed: f32,
    /// Blend increment per tick, in (0, 1].
    pub lerp_speed: f32,
    /// Distance metric used by the avoidance test.
    pub metric: DistanceMetric,
    /// Point tested against the cursor.
    pub reference: ReferencePoint,
    /// Direction of the avoidance push.
    pub displacement: Displacement,
    /// Per-axis split of the field rotation.
    pub rotation: RotationMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            affecting_distance: 3.0,
            avoidance_factor: 2.0,
            rotation_speed: 0.001,
            lerp_speed: 0.05,
            metric: DistanceMetric::default(),
            reference: ReferencePoint::default(),
            displacement: Displacement::default(),
            rotation: RotationMode::default(),
        }
    }
}

impl Settings {
    /// Default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_affecting_distance(mut self, distance: f32) -> Self {
        self.affecting_distance = distance;
        self
    }

    pub fn with_avoidance_factor(mut self, factor: f32) -> Self {
        self.avoidance_factor = factor;
        self
    }

    pub fn with_rotation_speed(mut self, speed: f32) -> Self {
        self.rotation_speed = speed;
        self
    }

    pub fn with_lerp_speed(mut self, speed: f32) -> Self {
        self.lerp_speed = speed;
        self
    }

    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_reference(mut self, reference: ReferencePoint) -> Self {
        self.reference = reference;
        self
    }

    pub fn with_displacement(mut self, displacement: Displacement) -> Self {
        self.displacement = displacement;
        self
    }

    pub fn with_rotation(mut self, rotation: RotationMode) -> Self {
        self.rotation = rotation;
        self
    }

    /// Check every numeric field.
    ///
    /// `affecting_distance`, `avoidance_factor` and `rotation_speed` must be
    /// positive and finite. `lerp_speed` must lie in (0, 1]. Per-axis rotation
    /// multipliers must be finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("affecting_distance", self.affecting_distance)?;
        positive("avoidance_factor", self.avoidance_factor)?;
        positive("rotation_speed", self.rotation_speed)?;
        positive("lerp_speed", self.lerp_speed)?;
        if self.lerp_speed > 1.0 {
            return Err(ConfigError::InvalidSetting {
                name: "lerp_speed",
                value: self.lerp_speed,
            });
        }
        if let RotationMode::PerAxis(m) = self.rotation {
            if !m.is_finite() {
                let value = [m.x, m.y, m.z]
                    .into_iter()
                    .find(|v| !v.is_finite())
                    .unwrap_or(f32::NAN);
                return Err(ConfigError::InvalidSetting {
                    name: "rotation",
                    value,
                });
            }
        }
        Ok(())
    }

    /// Parse settings from a JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Number of ticks a particle needs to settle on a new target.
    pub fn settle_ticks(&self) -> u32 {
        (1.0 / self.lerp_speed).ceil() as u32
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidSetting { name, value })
    }
}
