//! # particle-field
//!
//! An interactive 3D particle field. A primitive mesh (plane, sphere, box,
//! torus or torus knot) is sampled at its vertices and every vertex becomes
//! a small glowing box. Boxes near the cursor move out of its way, then ease
//! back to rest once it leaves. The whole field slowly spins.
//!
//! ## Quick Start
//!
//! ```ignore
//! use particle_field::prelude::*;
//!
//! fn main() -> Result<(), AppError> {
//!     FieldWindow::run(Launch {
//!         geometry: GeometryKind::TorusKnot,
//!         settings: Settings::new().with_affecting_distance(4.0),
//!         config: AppConfig::default(),
//!     })
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### The field
//!
//! [`ParticleField`] owns every [`Particle`]. Each tick it advances the field
//! rotation, then every particle picks a target offset from the cursor and
//! eases toward it:
//!
//! ```ignore
//! let mut field = ParticleField::new();
//! field.build(GeometryKind::Sphere, Settings::default())?;
//! field.set_cursor(Some(Vec3::new(2.0, 1.0, 0.0)));
//! field.tick();
//! ```
//!
//! ### Behaviour knobs
//!
//! | Setting | Meaning |
//! |---------|---------|
//! | `affecting_distance` | Radius inside which particles avoid the cursor |
//! | `avoidance_factor` | Length of the avoidance offset |
//! | `rotation_speed` | Radians per tick applied to the whole field |
//! | `lerp_speed` | Blend increment per tick |
//! | [`DistanceMetric`] | Planar (x, y only) or full 3D distance |
//! | [`ReferencePoint`] | Test the rest anchor or the live position |
//! | [`Displacement`] | Push along live + anchor − cursor, or straight away from the cursor |
//! | [`RotationMode`] | Uniform or per-axis rotation |
//!
//! ### Rendering
//!
//! [`FieldApp`] runs the frame cycle against any [`RenderHost`]. The bundled
//! [`GpuHost`] draws instanced boxes with wgpu and adds a bloom pass.

pub mod app;
pub mod camera;
pub mod controls;
pub mod error;
pub mod field;
pub mod geometry;
mod gpu;
pub mod input;
pub mod particle;
pub mod projector;
pub mod settings;
pub mod visuals;
mod window;

pub use app::{AppConfig, FieldApp, FrameLoop, FrameStatus, RenderHost, SceneFrame};
pub use camera::Camera;
pub use controls::OrbitControls;
pub use error::{AppError, ConfigError, FieldError, GpuError, HostError};
pub use field::{ParticleField, ParticleInstance};
pub use geometry::GeometryKind;
pub use glam::{Mat4, Quat, Vec2, Vec3};
pub use gpu::GpuHost;
pub use particle::{Anchor, Particle, ParticleState};
pub use projector::CursorProjector;
pub use settings::{Displacement, DistanceMetric, ReferencePoint, RotationMode, Settings};
pub use visuals::{BloomSettings, Lighting, Swatch, VariantPicker};
pub use window::{FieldWindow, Launch};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use particle_field::prelude::*;
/// ```
pub mod prelude {
    pub use crate::app::{AppConfig, FieldApp, FrameStatus, RenderHost, SceneFrame};
    pub use crate::camera::Camera;
    pub use crate::error::{AppError, ConfigError, FieldError, HostError};
    pub use crate::field::ParticleField;
    pub use crate::geometry::GeometryKind;
    pub use crate::input::{Command, Input, KeyCode, MouseButton};
    pub use crate::projector::CursorProjector;
    pub use crate::settings::{Displacement, DistanceMetric, ReferencePoint, RotationMode, Settings};
    pub use crate::visuals::{Swatch, VariantPicker};
    pub use crate::window::{FieldWindow, Launch};
    pub use crate::{Vec2, Vec3};
}
