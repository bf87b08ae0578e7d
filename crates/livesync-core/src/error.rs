//! Application error types with rich context

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Message reported by iOS tooling when a physical device has no developer
/// disk image mounted. Matched verbatim.
pub const DEVELOPER_DISK_IMAGE_MISSING: &str = "Could not find developer disk image";

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Device Errors
    // ─────────────────────────────────────────────────────────────
    /// Raw failure reported by a device transport. The message is kept
    /// verbatim so callers can recognize well-known device errors.
    #[error("{message}")]
    Device { message: String },

    #[error("No devices found for platform {platform}. Connect a {platform} device or start an emulator and try again.")]
    NoDevicesForPlatform { platform: String },

    #[error("Unable to find applicable devices to execute the operation and unable to start an emulator. Connect a device or pass a platform to start an emulator for.")]
    NoDevicesFound,

    #[error("Device descriptor is missing; cannot continue with the debug operation")]
    MissingDeviceDescriptor,

    #[error("Device discovery error: {message}")]
    Discovery { message: String },

    // ─────────────────────────────────────────────────────────────
    // Build/Sync Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Build failed: {message}")]
    Build { message: String },

    #[error("{message}")]
    Refresh { message: String },

    #[error("{message}")]
    Debug { message: String },

    // ─────────────────────────────────────────────────────────────
    // Validation Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Platform {platform} is not supported: {message}")]
    PlatformValidation { platform: String, message: String },

    #[error("Hot module replacement requires bundler version {required} or later, found {found}")]
    BundlerVersion { required: String, found: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn device(message: impl Into<String>) -> Self {
        Self::Device {
            message: message.into(),
        }
    }

    pub fn no_devices_for_platform(platform: impl Into<String>) -> Self {
        Self::NoDevicesForPlatform {
            platform: platform.into(),
        }
    }

    pub fn discovery(message: impl Into<String>) -> Self {
        Self::Discovery {
            message: message.into(),
        }
    }

    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }

    pub fn refresh(message: impl Into<String>) -> Self {
        Self::Refresh {
            message: message.into(),
        }
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self::Debug {
            message: message.into(),
        }
    }

    pub fn platform_validation(platform: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PlatformValidation {
            platform: platform.into(),
            message: message.into(),
        }
    }

    pub fn bundler_version(required: impl Into<String>, found: impl Into<String>) -> Self {
        Self::BundlerVersion {
            required: required.into(),
            found: found.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True when the error message is exactly the developer disk image
    /// failure, which needs the user to mount the image before retrying.
    pub fn is_developer_disk_image_missing(&self) -> bool {
        self.to_string() == DEVELOPER_DISK_IMAGE_MISSING
    }

    /// Check if this is a recoverable error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Device { .. } | Error::Refresh { .. } | Error::Debug { .. } | Error::Build { .. }
        )
    }

    /// Check if this error should abort the whole operation
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::MissingDeviceDescriptor
                | Error::Discovery { .. }
                | Error::NoDevicesForPlatform { .. }
                | Error::NoDevicesFound
                | Error::PlatformValidation { .. }
                | Error::BundlerVersion { .. }
        )
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}
