//! Refresh cycle for devices with debugging enabled

use livesync_core::prelude::*;
use livesync_core::{LiveSyncEvent, LiveSyncResultInfo, ProjectData, RestartApplicationInfo};
use livesync_device::Device;

use crate::debug::DebugAttachCoordinator;
use crate::descriptor::DeviceDescriptor;
use crate::notifier::EventNotifier;
use crate::refresh::{RefreshDecisionEngine, RefreshSettings};
use crate::services::{DebugService, PlatformLiveSyncService};

/// Runs a refresh and then re-establishes the debugger session.
///
/// A failed attach is reported for its device only; the refresh result is
/// returned either way.
pub struct RestartCoordinator<G> {
    refresh: RefreshDecisionEngine,
    debug: DebugAttachCoordinator<G>,
}

impl<G: DebugService> RestartCoordinator<G> {
    pub fn new(debug_service: G, notifier: EventNotifier) -> Self {
        Self {
            refresh: RefreshDecisionEngine::new(notifier.clone()),
            debug: DebugAttachCoordinator::new(debug_service, notifier),
        }
    }

    pub fn refresh_engine(&self) -> &RefreshDecisionEngine {
        &self.refresh
    }

    pub fn debug_coordinator(&self) -> &DebugAttachCoordinator<G> {
        &self.debug
    }

    pub async fn refresh_application_with_debug<D: Device, S: PlatformLiveSyncService>(
        &self,
        project: &ProjectData,
        info: &mut LiveSyncResultInfo,
        descriptor: &mut DeviceDescriptor<D>,
        sync_service: &S,
    ) -> RestartApplicationInfo {
        let mut debug_options = descriptor.debug_options;
        if debug_options.debug_brk {
            info.wait_for_debugger = true;
        }

        // The attach below reports its own failures.
        let settings = RefreshSettings {
            should_skip_emit_live_sync_notification: true,
            should_check_developer_disc_image: true,
        };
        let report = self
            .refresh
            .refresh_and_report(project, info, descriptor, sync_service, Some(settings))
            .await;
        let refresh_info = report.restart_info;

        // An app that was not stopped at startup must be attached to, not launched.
        debug_options.start = Some(!debug_options.debug_brk);
        debug_options.force_debugger_attached_event = refresh_info.did_restart;

        if let Err(e) = self
            .debug
            .enable_debugging(Some(&mut *descriptor), project, debug_options)
            .await
        {
            self.report_attach_failure(project, descriptor, &e, report.user_interaction_requested);
        }

        refresh_info
    }

    fn report_attach_failure<D: Device>(
        &self,
        project: &ProjectData,
        descriptor: &DeviceDescriptor<D>,
        e: &Error,
        user_interaction_requested: bool,
    ) {
        warn!(
            "Unable to attach debugger on device {}: {}",
            descriptor.identifier, e
        );

        let notifier = self.refresh.notifier();
        if e.is_developer_disk_image_missing() {
            // At most one prompt per device and cycle.
            if !user_interaction_requested {
                notifier.emit(LiveSyncEvent::UserInteractionNeeded(
                    descriptor.attach_request(project),
                ));
            }
            return;
        }

        notifier.emit(LiveSyncEvent::LiveSyncNotification {
            project_dir: project.project_dir.clone(),
            app_identifier: descriptor.app_identifier(project).to_string(),
            device_identifier: descriptor.identifier.clone(),
            message: format!(
                "Unable to start debugger on device {}. Error is: {}.",
                descriptor.identifier, e
            ),
        });
    }
}
