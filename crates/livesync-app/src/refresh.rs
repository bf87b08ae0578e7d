//! Refresh-or-restart decision for one sync cycle on one device

use livesync_core::prelude::*;
use livesync_core::{LiveSyncEvent, LiveSyncResultInfo, ProjectData, RestartApplicationInfo};
use livesync_device::Device;

use crate::descriptor::DeviceDescriptor;
use crate::notifier::EventNotifier;
use crate::services::PlatformLiveSyncService;

/// Switches for [`RefreshDecisionEngine::refresh_application_without_debug`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshSettings {
    /// Do not emit `LiveSyncNotification` on failure; the caller reports it
    pub should_skip_emit_live_sync_notification: bool,

    /// Emit `UserInteractionNeeded` when the failure is a missing developer
    /// disk image
    pub should_check_developer_disc_image: bool,
}

/// What one refresh cycle did, for callers that report further failures
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RefreshReport {
    pub restart_info: RestartApplicationInfo,
    /// `UserInteractionNeeded` was already emitted for the device
    pub user_interaction_requested: bool,
}

/// Applies a sync result by hot refresh when possible, restart otherwise.
///
/// Failures never escape: they are logged, reported as events and turned
/// into `did_restart: false`, so sibling devices are unaffected.
#[derive(Debug, Clone)]
pub struct RefreshDecisionEngine {
    notifier: EventNotifier,
}

impl RefreshDecisionEngine {
    pub fn new(notifier: EventNotifier) -> Self {
        Self { notifier }
    }

    pub fn notifier(&self) -> &EventNotifier {
        &self.notifier
    }

    pub async fn refresh_application_without_debug<D: Device, S: PlatformLiveSyncService>(
        &self,
        project: &ProjectData,
        info: &LiveSyncResultInfo,
        descriptor: &DeviceDescriptor<D>,
        sync_service: &S,
        settings: Option<RefreshSettings>,
    ) -> RestartApplicationInfo {
        self.refresh_and_report(project, info, descriptor, sync_service, settings)
            .await
            .restart_info
    }

    pub(crate) async fn refresh_and_report<D: Device, S: PlatformLiveSyncService>(
        &self,
        project: &ProjectData,
        info: &LiveSyncResultInfo,
        descriptor: &DeviceDescriptor<D>,
        sync_service: &S,
        settings: Option<RefreshSettings>,
    ) -> RefreshReport {
        let settings = settings.unwrap_or_default();
        let app_id = descriptor.app_identifier(project);
        let mut user_interaction_requested = false;

        let restart_info = match self.refresh_or_restart(project, info, sync_service).await {
            Ok(did_restart) => RestartApplicationInfo { did_restart },
            Err(e) => {
                error!(
                    "Error while refreshing {} on device {}: {}",
                    app_id, descriptor.identifier, e
                );

                let message = format!(
                    "Unable to apply changes for {} on device: {}. Error is: {}.",
                    app_id, descriptor.identifier, e
                );
                if !settings.should_skip_emit_live_sync_notification {
                    self.notifier.emit(LiveSyncEvent::LiveSyncNotification {
                        project_dir: project.project_dir.clone(),
                        app_identifier: app_id.to_string(),
                        device_identifier: descriptor.identifier.clone(),
                        message,
                    });
                }

                if settings.should_check_developer_disc_image
                    && e.is_developer_disk_image_missing()
                {
                    self.notifier.emit(LiveSyncEvent::UserInteractionNeeded(
                        descriptor.attach_request(project),
                    ));
                    user_interaction_requested = true;
                }

                RestartApplicationInfo::default()
            }
        };

        self.notifier.emit(LiveSyncEvent::LiveSyncExecuted {
            project_dir: project.project_dir.clone(),
            app_identifier: app_id.to_string(),
            synced_files: info.modified_files_data.clone(),
            device_identifier: descriptor.identifier.clone(),
            is_full_sync: info.is_full_sync,
        });

        RefreshReport {
            restart_info,
            user_interaction_requested,
        }
    }

    /// Returns whether the app was restarted
    async fn refresh_or_restart<S: PlatformLiveSyncService>(
        &self,
        project: &ProjectData,
        info: &LiveSyncResultInfo,
        sync_service: &S,
    ) -> Result<bool> {
        let device_id = info.device_identifier();

        let should_restart = if sync_service.should_restart(project, info).await? {
            true
        } else {
            let refreshed = sync_service.try_refresh_application(project, info).await?;
            if !refreshed {
                debug!("Refresh on {} was not possible, falling back to restart", device_id);
            }
            !refreshed
        };

        if !should_restart {
            debug!("Refreshed application on {}", device_id);
            return Ok(false);
        }

        // Listeners must drop their debugger session before the process dies.
        self.notifier.emit(LiveSyncEvent::DebuggerDetached {
            device_identifier: device_id.to_string(),
        });
        sync_service.restart_application(project, info).await?;
        info!("Restarted application on {}", device_id);
        Ok(true)
    }
}
