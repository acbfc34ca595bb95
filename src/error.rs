//! Error types for particle-field.
//!
//! Configuration problems, field lifecycle misuse, GPU initialization and
//! per-frame surface failures each get their own enum so callers can match
//! on exactly the failures a call can produce.

use std::fmt;

/// Errors raised while reading or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// A geometry name that does not map to any [`GeometryKind`](crate::GeometryKind).
    UnknownGeometry(String),
    /// A numeric setting outside its allowed range.
    InvalidSetting {
        /// Field name as it appears in the settings file.
        name: &'static str,
        /// The rejected value.
        value: f32,
    },
    /// Failed to read a configuration file.
    Io(std::io::Error),
    /// Failed to parse a configuration file.
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownGeometry(name) => write!(
                f,
                "Unknown geometry '{}'. Expected one of: plane, sphere, box, torus, torus-knot.",
                name
            ),
            ConfigError::InvalidSetting { name, value } => {
                write!(f, "Invalid value {} for setting '{}'", value, name)
            }
            ConfigError::Io(e) => write!(f, "Failed to read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config file: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Errors raised by [`ParticleField`](crate::ParticleField) operations.
#[derive(Debug)]
pub enum FieldError {
    /// The settings handed to `build` failed validation.
    Config(ConfigError),
    /// `build` was called while particles from a previous build are still live.
    NotCleared {
        /// Number of particles still in the field.
        live: usize,
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::Config(e) => write!(f, "Invalid field configuration: {}", e),
            FieldError::NotCleared { live } => write!(
                f,
                "Field still holds {} particles. Call clear() before building again.",
                live
            ),
        }
    }
}

impl std::error::Error for FieldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FieldError::Config(e) => Some(e),
            FieldError::NotCleared { .. } => None,
        }
    }
}

impl From<ConfigError> for FieldError {
    fn from(e: ConfigError) -> Self {
        FieldError::Config(e)
    }
}

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// The surface offers no texture format the adapter can present.
    UnsupportedSurface,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::UnsupportedSurface => write!(f, "The window surface reports no presentable texture formats for this adapter."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::NoAdapter | GpuError::UnsupportedSurface => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors reported by a [`RenderHost`](crate::RenderHost) while producing a frame.
#[derive(Debug)]
pub enum HostError {
    /// The presentation surface could not provide a texture.
    Surface(wgpu::SurfaceError),
    /// The host has no GPU state to render with.
    NotReady,
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::Surface(e) => write!(f, "Surface error: {}", e),
            HostError::NotReady => write!(f, "Render host is not ready"),
        }
    }
}

impl std::error::Error for HostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HostError::Surface(e) => Some(e),
            HostError::NotReady => None,
        }
    }
}

impl From<wgpu::SurfaceError> for HostError {
    fn from(e: wgpu::SurfaceError) -> Self {
        HostError::Surface(e)
    }
}

/// Errors that can occur when running the windowed application.
#[derive(Debug)]
pub enum AppError {
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// Configuration could not be loaded.
    Config(ConfigError),
    /// The initial field could not be built.
    Field(FieldError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            AppError::Window(e) => write!(f, "Failed to create window: {}", e),
            AppError::Gpu(e) => write!(f, "GPU error: {}", e),
            AppError::Config(e) => write!(f, "Configuration error: {}", e),
            AppError::Field(e) => write!(f, "Field error: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::EventLoop(e) => Some(e),
            AppError::Window(e) => Some(e),
            AppError::Gpu(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::Field(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for AppError {
    fn from(e: winit::error::EventLoopError) -> Self {
        AppError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for AppError {
    fn from(e: winit::error::OsError) -> Self {
        AppError::Window(e)
    }
}

impl From<GpuError> for AppError {
    fn from(e: GpuError) -> Self {
        AppError::Gpu(e)
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e)
    }
}

impl From<FieldError> for AppError {
    fn from(e: FieldError) -> Self {
        AppError::Field(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_geometry_message_lists_kinds() {
        let msg = ConfigError::UnknownGeometry("cone".into()).to_string();
        assert!(msg.contains("cone"));
        assert!(msg.contains("torus-knot"));
    }

    #[test]
    fn test_field_error_wraps_config_source() {
        let err: FieldError = ConfigError::InvalidSetting {
            name: "lerp_speed",
            value: 0.0,
        }
        .into();
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_surface_format_error_is_not_reported_as_missing_gpu() {
        let msg = GpuError::UnsupportedSurface.to_string();
        assert!(msg.contains("surface"));
        assert!(!msg.contains("No compatible GPU adapter"));
        let app: AppError = GpuError::UnsupportedSurface.into();
        assert!(matches!(app, AppError::Gpu(GpuError::UnsupportedSurface)));
    }
}
