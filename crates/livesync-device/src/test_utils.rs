//! Test utilities for device types
//!
//! Provides an in-memory [`FakeDevice`] that records every call made to it,
//! and a [`FakeDiscovery`] that hands out a fixed device list.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use livesync_core::prelude::*;
use livesync_core::Platform;

use crate::devices::{Device, DeviceInfo, FileHashes};
use crate::discovery::{DeviceDiscovery, DiscoveryOptions};

/// Creates device info with basic defaults.
pub fn test_device_info(id: &str, platform: Platform, emulator: bool) -> DeviceInfo {
    DeviceInfo {
        identifier: id.to_string(),
        name: format!("Device {}", id),
        platform,
        emulator,
        version: None,
    }
}

/// A call recorded by [`FakeDevice`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCall {
    IsApplicationInstalled { app_id: String },
    ReinstallApplication { app_id: String, package_file: PathBuf },
    PutFile { device_path: String, app_id: String },
    UpdateHashes { count: usize, app_id: String },
    ReadFile { device_path: String },
}

#[derive(Debug, Default)]
struct FakeDeviceState {
    installed: bool,
    files: HashMap<String, String>,
    calls: Vec<DeviceCall>,
    reinstall_error: Option<String>,
}

/// In-memory device. Clones share state, so a test can keep a handle while
/// the coordinator under test owns another.
#[derive(Debug, Clone)]
pub struct FakeDevice {
    info: DeviceInfo,
    state: Arc<Mutex<FakeDeviceState>>,
}

impl FakeDevice {
    pub fn new(id: &str, platform: Platform) -> Self {
        Self {
            info: test_device_info(id, platform, false),
            state: Arc::default(),
        }
    }

    pub fn emulator(mut self) -> Self {
        self.info.emulator = true;
        self
    }

    /// Mark the application as already installed
    pub fn installed(self) -> Self {
        self.state.lock().unwrap().installed = true;
        self
    }

    /// Seed a file on the device
    pub fn with_file(self, device_path: &str, content: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(device_path.to_string(), content.to_string());
        self
    }

    /// Make `reinstall_application` fail with `message`
    pub fn failing_reinstall(self, message: &str) -> Self {
        self.state.lock().unwrap().reinstall_error = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn file(&self, device_path: &str) -> Option<String> {
        self.state.lock().unwrap().files.get(device_path).cloned()
    }

    pub fn reinstall_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, DeviceCall::ReinstallApplication { .. }))
            .count()
    }

    pub fn put_file_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, DeviceCall::PutFile { .. }))
            .count()
    }

    fn record(&self, call: DeviceCall) {
        self.state.lock().unwrap().calls.push(call);
    }
}

impl Device for FakeDevice {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn is_emulator(&self) -> bool {
        self.info.emulator
    }

    fn project_root(&self, app_id: &str) -> String {
        format!("/data/local/tmp/{}", app_id)
    }

    async fn is_application_installed(&self, app_id: &str) -> Result<bool> {
        self.record(DeviceCall::IsApplicationInstalled {
            app_id: app_id.to_string(),
        });
        Ok(self.state.lock().unwrap().installed)
    }

    async fn reinstall_application(&self, app_id: &str, package_file: &Path) -> Result<()> {
        self.record(DeviceCall::ReinstallApplication {
            app_id: app_id.to_string(),
            package_file: package_file.to_path_buf(),
        });
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.reinstall_error {
            return Err(Error::device(message.clone()));
        }
        state.installed = true;
        Ok(())
    }

    async fn put_file(&self, local_path: &Path, device_path: &str, app_id: &str) -> Result<()> {
        self.record(DeviceCall::PutFile {
            device_path: device_path.to_string(),
            app_id: app_id.to_string(),
        });
        let content = std::fs::read_to_string(local_path)?;
        self.state
            .lock()
            .unwrap()
            .files
            .insert(device_path.to_string(), content);
        Ok(())
    }

    async fn update_hashes_on_device(&self, hashes: &FileHashes, app_id: &str) -> Result<()> {
        self.record(DeviceCall::UpdateHashes {
            count: hashes.len(),
            app_id: app_id.to_string(),
        });
        Ok(())
    }

    async fn read_file(&self, device_path: &str, _app_id: &str) -> Result<Option<String>> {
        self.record(DeviceCall::ReadFile {
            device_path: device_path.to_string(),
        });
        Ok(self.file(device_path))
    }
}

/// Discovery over a fixed device list
#[derive(Debug, Clone, Default)]
pub struct FakeDiscovery {
    devices: Vec<FakeDevice>,
    initialized_with: Arc<Mutex<Vec<DiscoveryOptions>>>,
    initialize_error: Option<String>,
}

impl FakeDiscovery {
    pub fn new(devices: Vec<FakeDevice>) -> Self {
        Self {
            devices,
            ..Default::default()
        }
    }

    /// Make `initialize` fail with a device error carrying `message`
    pub fn failing_initialize(mut self, message: &str) -> Self {
        self.initialize_error = Some(message.to_string());
        self
    }

    /// Options of every `initialize` call so far
    pub fn initializations(&self) -> Vec<DiscoveryOptions> {
        self.initialized_with.lock().unwrap().clone()
    }
}

impl DeviceDiscovery for FakeDiscovery {
    type Handle = FakeDevice;

    async fn initialize(&self, options: &DiscoveryOptions) -> Result<()> {
        self.initialized_with.lock().unwrap().push(options.clone());
        match &self.initialize_error {
            Some(message) => Err(Error::device(message.clone())),
            None => Ok(()),
        }
    }

    fn devices(&self) -> Vec<FakeDevice> {
        self.devices.clone()
    }
}
