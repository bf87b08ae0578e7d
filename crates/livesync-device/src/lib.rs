//! # livesync-device - Device Abstraction
//!
//! The device-facing seams of the livesync orchestration layer: what the
//! coordinators need from a connected device, how devices are discovered,
//! and the device-side path conventions.
//!
//! Depends on [`livesync_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### Devices
//! - [`Device`] - Install, file push/read and hash manifest operations on one device
//! - [`DeviceInfo`] - Identifier, platform and emulator flag
//! - [`filter_by_platform()`] - Case-insensitive platform filter
//!
//! ### Discovery
//! - [`DeviceDiscovery`] - Initialize discovery and list attached devices
//! - [`DiscoveryOptions`] - Platform / device / emulator hints
//!
//! ### Paths
//! - [`build_info_path()`] - Device location of the build fingerprint

pub mod devices;
pub mod discovery;
pub mod paths;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;

pub use devices::{
    filter_by_platform, find_device, has_ios_devices, Device, DeviceInfo, FileHashes, LocalDevice,
};
pub use discovery::{DeviceDiscovery, DiscoveryOptions, LocalDeviceDiscovery};
pub use paths::{build_info_path, to_device_path, BUILD_INFO_FILE_NAME};
