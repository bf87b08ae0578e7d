//! Connected devices and the operations the orchestrator needs from them

use std::collections::BTreeMap;
use std::path::Path;

use livesync_core::prelude::*;
use livesync_core::Platform;
use serde::{Deserialize, Serialize};

/// Device-path → content hash manifest used by incremental sync
pub type FileHashes = BTreeMap<String, String>;

/// Static facts about a connected device or emulator
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Unique device identifier (serial, UDID, ...)
    pub identifier: String,

    /// Human-readable device name
    pub name: String,

    pub platform: Platform,

    /// Whether this is an emulator/simulator
    #[serde(default)]
    pub emulator: bool,

    /// OS version reported by the device, if known
    #[serde(default)]
    pub version: Option<String>,
}

impl DeviceInfo {
    /// Get a display string for the device
    pub fn display_name(&self) -> String {
        if self.emulator {
            format!("{} ({})", self.name, self.emulator_type())
        } else {
            self.name.clone()
        }
    }

    /// Get emulator type string
    pub fn emulator_type(&self) -> &'static str {
        match self.platform {
            Platform::IOS => "simulator",
            Platform::Android => "emulator",
        }
    }
}

/// A connected device the orchestrator can install to and sync with.
///
/// The transport behind it (USB multiplexing, platform bridge) lives outside
/// this crate; every I/O method suspends only the caller's pipeline.
#[trait_variant::make(Device: Send)]
pub trait LocalDevice {
    fn info(&self) -> &DeviceInfo;

    fn is_emulator(&self) -> bool;

    /// Root directory of the synced project on the device, for `app_id`
    fn project_root(&self, app_id: &str) -> String;

    async fn is_application_installed(&self, app_id: &str) -> Result<bool>;

    /// Uninstall any previous version and install `package_file`
    async fn reinstall_application(&self, app_id: &str, package_file: &Path) -> Result<()>;

    async fn put_file(&self, local_path: &Path, device_path: &str, app_id: &str) -> Result<()>;

    async fn update_hashes_on_device(&self, hashes: &FileHashes, app_id: &str) -> Result<()>;

    /// Read a file from the device; `Ok(None)` when it does not exist
    async fn read_file(&self, device_path: &str, app_id: &str) -> Result<Option<String>>;
}

/// Filter devices by platform (case-insensitive)
pub fn filter_by_platform<D: Device>(devices: Vec<D>, platform: &str) -> Vec<D> {
    devices
        .into_iter()
        .filter(|d| d.info().platform.matches(platform))
        .collect()
}

/// Find a device by exact identifier
pub fn find_device<'a, D: Device>(devices: &'a [D], identifier: &str) -> Option<&'a D> {
    devices.iter().find(|d| d.info().identifier == identifier)
}

/// True when any device in the list runs iOS
pub fn has_ios_devices<D: Device>(devices: &[D]) -> bool {
    devices.iter().any(|d| d.info().platform == Platform::IOS)
}
