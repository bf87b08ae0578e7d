//! Per-device descriptors handed to the run loop

use std::path::PathBuf;

use livesync_core::prelude::*;
use livesync_core::{AttachRequest, BuildConfig, DebugOptions, DeviceAppData, Platform, ProjectData};
use livesync_device::Device;

use crate::services::BuildService;

/// Which build routine a [`BuildAction`] runs
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BuildKind {
    /// Native prepare followed by a platform build
    #[default]
    PrepareAndBuild,
    /// A caller-registered build routine, looked up by name by the build service
    Custom(String),
}

/// A build to run for one device, described as data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildAction {
    pub kind: BuildKind,
    pub platform: Platform,
    pub build_config: BuildConfig,
    pub project: ProjectData,
}

impl BuildAction {
    pub async fn execute<B: BuildService>(&self, build_service: &B) -> Result<PathBuf> {
        debug!(
            "Building {} for {} (kind: {:?}, for device: {})",
            self.project.project_name,
            self.platform,
            self.kind,
            self.build_config.build_for_device
        );
        build_service.prepare_and_build(self).await
    }
}

/// Everything the run loop tracks about one device for the session.
///
/// Each descriptor is driven by exactly one pipeline at a time.
#[derive(Debug, Clone)]
pub struct DeviceDescriptor<D> {
    pub device: D,
    pub identifier: String,
    pub platform: Platform,
    pub is_emulator: bool,
    pub debugging_enabled: bool,
    pub debug_options: DebugOptions,
    pub output_path: Option<PathBuf>,
    pub build_action: BuildAction,
    pub skip_native_prepare: bool,
}

impl<D: Device> DeviceDescriptor<D> {
    pub fn new(device: D, build_action: BuildAction) -> Self {
        let info = device.info();
        Self {
            identifier: info.identifier.clone(),
            platform: info.platform,
            is_emulator: device.is_emulator(),
            debugging_enabled: false,
            debug_options: DebugOptions::default(),
            output_path: None,
            build_action,
            skip_native_prepare: false,
            device,
        }
    }

    pub fn app_identifier<'a>(&self, project: &'a ProjectData) -> &'a str {
        project.app_identifier(self.platform)
    }

    pub fn device_app_data(&self, project: &ProjectData) -> DeviceAppData {
        DeviceAppData {
            device_identifier: self.identifier.clone(),
            platform: self.platform,
            app_identifier: self.app_identifier(project).to_string(),
            project_dir: project.project_dir.clone(),
        }
    }

    /// Attach request for the current debug options
    pub fn attach_request(&self, project: &ProjectData) -> AttachRequest {
        AttachRequest {
            device_identifier: self.identifier.clone(),
            is_emulator: self.is_emulator,
            output_path: self.output_path.clone(),
            platform: self.platform,
            project_dir: project.project_dir.clone(),
            debug_options: self.debug_options,
        }
    }
}

/// Find the descriptor for `identifier` in a batch
pub fn find_descriptor<'a, D>(
    batch: &'a mut [DeviceDescriptor<D>],
    identifier: &str,
) -> Option<&'a mut DeviceDescriptor<D>> {
    batch.iter_mut().find(|d| d.identifier == identifier)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use livesync_device::test_utils::FakeDevice;

    pub fn project() -> ProjectData {
        ProjectData::new("/work/app", "app", "org.example.app")
    }

    pub fn descriptor(device: FakeDevice) -> DeviceDescriptor<FakeDevice> {
        let platform = device.info().platform;
        let is_emulator = device.is_emulator();
        DeviceDescriptor::new(
            device,
            BuildAction {
                kind: BuildKind::PrepareAndBuild,
                platform,
                build_config: BuildConfig::for_device(false, is_emulator),
                project: project(),
            },
        )
    }
}
