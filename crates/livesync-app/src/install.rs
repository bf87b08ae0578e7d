//! Install-if-needed logic driven by the on-device build fingerprint

use std::io::Write;
use std::path::Path;

use livesync_core::prelude::*;
use livesync_core::{BuildConfig, BuildFingerprint, ProjectData};
use livesync_device::{build_info_path, Device};

use crate::services::{AnalyticsService, PlatformProjectService};

/// What `install_on_device_if_needed` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The device already runs the current build
    Skipped,
    Installed,
}

/// Installs application packages on devices, skipping devices that already
/// carry the current build.
pub struct InstallationCoordinator<P, A> {
    project_service: P,
    analytics: A,
    track_usage: bool,
}

impl<P: PlatformProjectService, A: AnalyticsService> InstallationCoordinator<P, A> {
    pub fn new(project_service: P, analytics: A) -> Self {
        Self {
            project_service,
            analytics,
            track_usage: true,
        }
    }

    /// Enable or disable the usage event sent after each install
    pub fn with_usage_tracking(mut self, track_usage: bool) -> Self {
        self.track_usage = track_usage;
        self
    }

    pub fn project_service(&self) -> &P {
        &self.project_service
    }

    pub async fn install_on_device_if_needed<D: Device>(
        &self,
        device: &D,
        project: &ProjectData,
        build_config: &BuildConfig,
        package_file: Option<&Path>,
        output_path: Option<&Path>,
    ) -> Result<InstallOutcome> {
        if !self
            .should_install(device, project, build_config, output_path)
            .await?
        {
            debug!(
                "Device {} already has the latest build, skipping install",
                device.info().identifier
            );
            return Ok(InstallOutcome::Skipped);
        }

        self.install_on_device(device, project, build_config, package_file, output_path)
            .await?;
        Ok(InstallOutcome::Installed)
    }

    /// True when the app is missing or its on-device build differs from the
    /// local one. An unreadable fingerprint on either side counts as a
    /// difference.
    pub async fn should_install<D: Device>(
        &self,
        device: &D,
        project: &ProjectData,
        build_config: &BuildConfig,
        output_path: Option<&Path>,
    ) -> Result<bool> {
        let platform = device.info().platform;
        let app_id = project.app_identifier(platform);

        if !device.is_application_installed(app_id).await? {
            return Ok(true);
        }

        let on_device = self.device_build_info(device, app_id).await;
        let local = self
            .project_service
            .local_build_info(platform, build_config, output_path);

        Ok(match (on_device, local) {
            (Some(on_device), Some(local)) => on_device.build_time != local.build_time,
            _ => true,
        })
    }

    pub async fn install_on_device<D: Device>(
        &self,
        device: &D,
        project: &ProjectData,
        build_config: &BuildConfig,
        package_file: Option<&Path>,
        output_path: Option<&Path>,
    ) -> Result<()> {
        let info = device.info();
        let app_id = project.app_identifier(info.platform);

        let package = match package_file {
            Some(path) => path.to_path_buf(),
            None => self
                .project_service
                .latest_package(info.platform, build_config, output_path)?,
        };

        info!(
            "Installing {} on device {}",
            package.display(),
            info.identifier
        );

        self.project_service
            .clean_device_temp_folder(&info.identifier, project)
            .await?;
        device.reinstall_application(app_id, &package).await?;

        // Only a confirmed install may update the sync state kept on the device.
        let hashes = self
            .project_service
            .local_file_hashes(info.platform, project);
        device.update_hashes_on_device(&hashes, app_id).await?;

        if !build_config.release {
            self.update_device_build_info(device, app_id, build_config, output_path)
                .await?;
        }

        if self.track_usage {
            if let Err(e) = self
                .analytics
                .track_install(info.platform, device.is_emulator(), build_config.release)
                .await
            {
                warn!("Failed to track install on {}: {}", info.identifier, e);
            }
        }

        info!(
            "Successfully installed {} on device {}",
            app_id, info.identifier
        );
        Ok(())
    }

    async fn device_build_info<D: Device>(
        &self,
        device: &D,
        app_id: &str,
    ) -> Option<BuildFingerprint> {
        let path = build_info_path(&device.project_root(app_id));
        match device.read_file(&path, app_id).await {
            Ok(Some(content)) => BuildFingerprint::parse(&content),
            Ok(None) => None,
            Err(e) => {
                debug!("Could not read build info from {}: {}", path, e);
                None
            }
        }
    }

    async fn update_device_build_info<D: Device>(
        &self,
        device: &D,
        app_id: &str,
        build_config: &BuildConfig,
        output_path: Option<&Path>,
    ) -> Result<()> {
        let platform = device.info().platform;
        let Some(local) = self
            .project_service
            .local_build_info(platform, build_config, output_path)
        else {
            warn!(
                "No local build info for {}, device {} will be reinstalled next time",
                platform,
                device.info().identifier
            );
            return Ok(());
        };

        let mut file =
            tempfile::NamedTempFile::new().context("Failed to create build info file")?;
        file.write_all(local.to_json()?.as_bytes())
            .and_then(|_| file.flush())
            .with_context(|| format!("Failed to write build info for {}", app_id))?;

        let device_path = build_info_path(&device.project_root(app_id));
        device.put_file(file.path(), &device_path, app_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FakeAnalytics, FakeProjectService};
    use livesync_core::Platform;
    use livesync_device::test_utils::{DeviceCall, FakeDevice};

    const BUILD_INFO: &str = "/data/local/tmp/org.example.app/.buildinfo";

    fn project() -> ProjectData {
        ProjectData::new("/work/app", "app", "org.example.app")
    }

    fn debug_config() -> BuildConfig {
        BuildConfig {
            release: false,
            build_for_device: true,
            clean: false,
        }
    }

    fn fingerprint_json(build_time: &str) -> String {
        format!(
            r#"{{"buildTime":"{}","buildForDevice":true,"release":false}}"#,
            build_time
        )
    }

    fn coordinator(
        local_build_time: Option<&str>,
    ) -> InstallationCoordinator<FakeProjectService, FakeAnalytics> {
        InstallationCoordinator::new(
            FakeProjectService::with_build_time(local_build_time),
            FakeAnalytics::default(),
        )
    }

    #[tokio::test]
    async fn test_fresh_device_without_fingerprint_installs() {
        let device = FakeDevice::new("A", Platform::Android);
        let coordinator = coordinator(Some("T1"));

        assert!(coordinator
            .should_install(&device, &project(), &debug_config(), None)
            .await
            .unwrap());

        let outcome = coordinator
            .install_on_device_if_needed(&device, &project(), &debug_config(), None, None)
            .await
            .unwrap();
        assert_eq!(outcome, InstallOutcome::Installed);
        assert_eq!(device.reinstall_count(), 1);
    }

    #[tokio::test]
    async fn test_matching_build_time_skips_install() {
        let device = FakeDevice::new("A", Platform::Android)
            .installed()
            .with_file(BUILD_INFO, &fingerprint_json("T1"));
        let coordinator = coordinator(Some("T1"));

        let outcome = coordinator
            .install_on_device_if_needed(&device, &project(), &debug_config(), None, None)
            .await
            .unwrap();

        assert_eq!(outcome, InstallOutcome::Skipped);
        assert_eq!(device.reinstall_count(), 0);
        assert_eq!(device.put_file_count(), 0);
    }

    #[tokio::test]
    async fn test_different_build_time_reinstalls() {
        let device = FakeDevice::new("A", Platform::Android)
            .installed()
            .with_file(BUILD_INFO, &fingerprint_json("T0"));
        let coordinator = coordinator(Some("T1"));

        let outcome = coordinator
            .install_on_device_if_needed(&device, &project(), &debug_config(), None, None)
            .await
            .unwrap();

        assert_eq!(outcome, InstallOutcome::Installed);
        assert_eq!(device.reinstall_count(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_fingerprint_counts_as_absent() {
        let device = FakeDevice::new("A", Platform::Android)
            .installed()
            .with_file(BUILD_INFO, "{ definitely not json");
        let coordinator = coordinator(Some("T1"));

        assert!(coordinator
            .should_install(&device, &project(), &debug_config(), None)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_missing_local_build_info_installs() {
        let device = FakeDevice::new("A", Platform::Android)
            .installed()
            .with_file(BUILD_INFO, &fingerprint_json("T1"));
        let coordinator = coordinator(None);

        assert!(coordinator
            .should_install(&device, &project(), &debug_config(), None)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_installed_fingerprint_round_trips() {
        let device = FakeDevice::new("A", Platform::Android);
        let coordinator = coordinator(Some("T42"));

        coordinator
            .install_on_device(&device, &project(), &debug_config(), None, None)
            .await
            .unwrap();

        let written = BuildFingerprint::parse(&device.file(BUILD_INFO).unwrap()).unwrap();
        assert_eq!(written.build_time, "T42");

        // A second pass sees the device as up to date
        assert!(!coordinator
            .should_install(&device, &project(), &debug_config(), None)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_release_build_writes_no_fingerprint() {
        let device = FakeDevice::new("A", Platform::Android);
        let coordinator = coordinator(Some("T1"));
        let release = BuildConfig {
            release: true,
            ..debug_config()
        };

        coordinator
            .install_on_device(&device, &project(), &release, None, None)
            .await
            .unwrap();

        assert_eq!(device.reinstall_count(), 1);
        assert_eq!(device.put_file_count(), 0);
        assert!(device.file(BUILD_INFO).is_none());
    }

    #[tokio::test]
    async fn test_install_order_and_explicit_package() {
        let device = FakeDevice::new("A", Platform::Android);
        let coordinator = coordinator(Some("T1"));

        coordinator
            .install_on_device(
                &device,
                &project(),
                &debug_config(),
                Some(Path::new("/builds/custom.apk")),
                None,
            )
            .await
            .unwrap();

        let calls = device.calls();
        assert_eq!(
            calls[0],
            DeviceCall::ReinstallApplication {
                app_id: "org.example.app".to_string(),
                package_file: "/builds/custom.apk".into(),
            }
        );
        assert!(matches!(calls[1], DeviceCall::UpdateHashes { count: 2, .. }));
        assert!(matches!(calls[2], DeviceCall::PutFile { .. }));
        assert_eq!(coordinator.project_service().cleaned(), vec!["A".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_reinstall_leaves_fingerprint_untouched() {
        let device = FakeDevice::new("A", Platform::Android)
            .installed()
            .with_file(BUILD_INFO, &fingerprint_json("T0"))
            .failing_reinstall("INSTALL_FAILED_INSUFFICIENT_STORAGE");
        let coordinator = coordinator(Some("T1"));

        let err = coordinator
            .install_on_device_if_needed(&device, &project(), &debug_config(), None, None)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "INSTALL_FAILED_INSUFFICIENT_STORAGE");
        assert_eq!(device.put_file_count(), 0);
        assert_eq!(
            BuildFingerprint::parse(&device.file(BUILD_INFO).unwrap())
                .unwrap()
                .build_time,
            "T0"
        );
    }

    #[tokio::test]
    async fn test_analytics_failure_does_not_abort_install() {
        let device = FakeDevice::new("A", Platform::Android);
        let coordinator = InstallationCoordinator::new(
            FakeProjectService::with_build_time(Some("T1")),
            FakeAnalytics::failing(),
        );

        coordinator
            .install_on_device(&device, &project(), &debug_config(), None, None)
            .await
            .unwrap();
        assert_eq!(device.reinstall_count(), 1);
    }

    #[tokio::test]
    async fn test_usage_tracking_can_be_disabled() {
        let device = FakeDevice::new("A", Platform::Android);
        let analytics = FakeAnalytics::default();
        let coordinator = InstallationCoordinator::new(
            FakeProjectService::with_build_time(Some("T1")),
            analytics.clone(),
        )
        .with_usage_tracking(false);

        coordinator
            .install_on_device(&device, &project(), &debug_config(), None, None)
            .await
            .unwrap();
        assert_eq!(analytics.tracked(), 0);
    }
}
