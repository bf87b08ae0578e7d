//! External collaborators of the orchestration layer
//!
//! Native builds, the platform sync engines, the debugger transports and usage
//! analytics all live outside this crate. The coordinators talk to them
//! through the traits below; the command layer supplies the implementations.

use std::path::{Path, PathBuf};

use livesync_core::prelude::*;
use livesync_core::{
    AttachRequest, BuildConfig, BuildFingerprint, DebugInformation, DeviceAppData,
    LiveSyncResultInfo, Platform, ProjectData,
};
use livesync_device::FileHashes;

use crate::descriptor::BuildAction;

/// Per-platform sync engine: applies changes to a running app.
///
/// A single implementation serves every platform and dispatches on
/// `device_app_data.platform`.
#[trait_variant::make(PlatformLiveSyncService: Send)]
pub trait LocalPlatformLiveSyncService {
    /// Whether the changes in `info` can only be applied by restarting
    async fn should_restart(&self, project: &ProjectData, info: &LiveSyncResultInfo)
        -> Result<bool>;

    /// Hot-apply the changes; `Ok(false)` means the app must be restarted
    async fn try_refresh_application(
        &self,
        project: &ProjectData,
        info: &LiveSyncResultInfo,
    ) -> Result<bool>;

    async fn restart_application(&self, project: &ProjectData, info: &LiveSyncResultInfo)
        -> Result<()>;

    /// Push every project file to the device
    async fn full_sync(
        &self,
        project: &ProjectData,
        app: &DeviceAppData,
    ) -> Result<LiveSyncResultInfo>;
}

/// Debugger transport for all platforms
#[trait_variant::make(DebugService: Send)]
pub trait LocalDebugService {
    /// Launch or attach (per `request.debug_options.start`) a debugger
    async fn debug(&self, request: &AttachRequest) -> Result<DebugInformation>;

    async fn debug_stop(&self, device_identifier: &str) -> Result<()>;
}

/// Platform project queries needed around installation
#[trait_variant::make(PlatformProjectService: Send)]
pub trait LocalPlatformProjectService {
    /// Remove leftovers of previous syncs from the device temp folder
    async fn clean_device_temp_folder(
        &self,
        device_identifier: &str,
        project: &ProjectData,
    ) -> Result<()>;

    /// Most recently built application package for the platform
    fn latest_package(
        &self,
        platform: Platform,
        build_config: &BuildConfig,
        output_path: Option<&Path>,
    ) -> Result<PathBuf>;

    /// Build record written next to the latest local build, if any
    fn local_build_info(
        &self,
        platform: Platform,
        build_config: &BuildConfig,
        output_path: Option<&Path>,
    ) -> Option<BuildFingerprint>;

    /// Hashes of the files shipped with the latest build
    fn local_file_hashes(&self, platform: Platform, project: &ProjectData) -> FileHashes;
}

/// Native prepare + build invocation
#[trait_variant::make(BuildService: Send)]
pub trait LocalBuildService {
    /// Run the build described by `action` and return the built package
    async fn prepare_and_build(&self, action: &BuildAction) -> Result<PathBuf>;
}

/// Anonymous usage reporting
#[trait_variant::make(AnalyticsService: Send)]
pub trait LocalAnalyticsService {
    async fn track_install(&self, platform: Platform, is_emulator: bool, release: bool)
        -> Result<()>;
}

/// Platform environment checks
#[trait_variant::make(PlatformValidator: Send)]
pub trait LocalPlatformValidator {
    /// Fail when the host cannot build or deploy for `platform`
    async fn validate(&self, platform: Platform, project: &ProjectData) -> Result<()>;

    /// Installed bundler version, e.g. `"0.18.2"`
    async fn bundler_version(&self, project: &ProjectData) -> Result<Option<String>>;
}

/// A process-wide service that is normally disposed when the command ends.
///
/// Long-running sessions keep these alive by turning disposal off.
pub trait Disposable: Send + Sync {
    fn set_should_dispose(&self, should_dispose: bool);
}
