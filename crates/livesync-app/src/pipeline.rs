//! Per-device live sync pipelines
//!
//! Every device in a batch runs its own pipeline (build, install, full sync,
//! refresh or restart with debugger). Pipelines are polled together on the
//! calling task with `join_all`; a device waiting on I/O never holds up the
//! others, and a failing device only produces its own outcome and event.

use futures_util::future::join_all;

use livesync_core::prelude::*;
use livesync_core::{
    DebugInformation, DebugOptions, LiveSyncEvent, LiveSyncResultInfo, ProjectData,
    RestartApplicationInfo,
};
use livesync_device::Device;

use crate::descriptor::{find_descriptor, DeviceDescriptor};
use crate::install::InstallationCoordinator;
use crate::notifier::EventNotifier;
use crate::options::LiveSyncOptions;
use crate::restart::RestartCoordinator;
use crate::services::{
    AnalyticsService, BuildService, DebugService, PlatformLiveSyncService, PlatformProjectService,
};

/// Result of one pipeline step for one device
#[derive(Debug)]
pub struct DeviceSyncOutcome {
    pub device_identifier: String,
    pub result: Result<RestartApplicationInfo>,
}

impl DeviceSyncOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Drives a batch of device descriptors through live sync.
#[trait_variant::make(RunLoop: Send)]
pub trait LocalRunLoop {
    /// Deploy to every device in `batch` and start the app.
    ///
    /// Returns one outcome per descriptor, in batch order.
    async fn initial_sync<D: Device>(
        &self,
        batch: &mut [DeviceDescriptor<D>],
    ) -> Vec<DeviceSyncOutcome>;

    /// Apply watcher results to the devices they were synced to
    async fn apply_changes<D: Device>(
        &self,
        batch: &mut [DeviceDescriptor<D>],
        results: Vec<LiveSyncResultInfo>,
    ) -> Vec<DeviceSyncOutcome>;
}

/// Collaborators of [`LiveSyncRunLoop`]
pub struct RunLoopServices<P, A, S, G, B> {
    pub project_service: P,
    pub analytics: A,
    pub sync_service: S,
    pub debug_service: G,
    pub build_service: B,
}

pub struct LiveSyncRunLoop<P, A, S, G, B> {
    project: ProjectData,
    installer: InstallationCoordinator<P, A>,
    sync_service: S,
    restart: RestartCoordinator<G>,
    build_service: B,
    notifier: EventNotifier,
}

impl<P, A, S, G, B> LiveSyncRunLoop<P, A, S, G, B>
where
    P: PlatformProjectService,
    A: AnalyticsService,
    S: PlatformLiveSyncService,
    G: DebugService,
    B: BuildService,
{
    pub fn new(
        project: ProjectData,
        services: RunLoopServices<P, A, S, G, B>,
        notifier: EventNotifier,
    ) -> Self {
        Self {
            project,
            installer: InstallationCoordinator::new(services.project_service, services.analytics),
            sync_service: services.sync_service,
            restart: RestartCoordinator::new(services.debug_service, notifier.clone()),
            build_service: services.build_service,
            notifier,
        }
    }

    /// Apply the command options that reach into the per-device pipeline
    pub fn with_options(mut self, options: &LiveSyncOptions) -> Self {
        self.installer = self.installer.with_usage_tracking(options.track_usage);
        self
    }

    pub fn project(&self) -> &ProjectData {
        &self.project
    }

    pub fn notifier(&self) -> &EventNotifier {
        &self.notifier
    }

    /// Attach a debugger to one device of the session on user request
    pub async fn enable_debugging<D: Device>(
        &self,
        batch: &mut [DeviceDescriptor<D>],
        device_identifier: &str,
        mut debug_options: DebugOptions,
    ) -> Result<DebugInformation> {
        // Explicit requests always announce the session.
        debug_options.force_debugger_attached_event = true;
        self.restart
            .debug_coordinator()
            .enable_debugging(
                find_descriptor(batch, device_identifier),
                &self.project,
                debug_options,
            )
            .await
    }

    pub async fn disable_debugging<D: Device>(
        &self,
        batch: &mut [DeviceDescriptor<D>],
        device_identifier: &str,
    ) -> Result<()> {
        self.restart
            .debug_coordinator()
            .disable_debugging(find_descriptor(batch, device_identifier))
            .await
    }

    async fn initial_sync_device<D: Device>(
        &self,
        descriptor: &mut DeviceDescriptor<D>,
    ) -> DeviceSyncOutcome {
        let result = self.deploy(descriptor).await;

        if let Err(e) = &result {
            error!("Live sync failed on device {}: {}", descriptor.identifier, e);
            self.notifier.emit(LiveSyncEvent::LiveSyncError {
                project_dir: self.project.project_dir.clone(),
                app_identifier: descriptor.app_identifier(&self.project).to_string(),
                device_identifier: descriptor.identifier.clone(),
                error: e.to_string(),
            });
        }

        DeviceSyncOutcome {
            device_identifier: descriptor.identifier.clone(),
            result,
        }
    }

    async fn deploy<D: Device>(
        &self,
        descriptor: &mut DeviceDescriptor<D>,
    ) -> Result<RestartApplicationInfo> {
        let project = &self.project;

        let package = if descriptor.skip_native_prepare {
            debug!("Skipping native build for {}", descriptor.identifier);
            None
        } else {
            Some(descriptor.build_action.execute(&self.build_service).await?)
        };

        self.installer
            .install_on_device_if_needed(
                &descriptor.device,
                project,
                &descriptor.build_action.build_config,
                package.as_deref(),
                descriptor.output_path.as_deref(),
            )
            .await?;

        let app = descriptor.device_app_data(project);
        let mut info = self.sync_service.full_sync(project, &app).await?;
        let restart_info = self.refresh(descriptor, &mut info).await;

        info!(
            "Live sync started for {} on {}",
            app.app_identifier,
            descriptor.device.info().display_name()
        );
        self.notifier.emit(LiveSyncEvent::LiveSyncStarted {
            project_dir: project.project_dir.clone(),
            app_identifier: app.app_identifier,
            device_identifier: descriptor.identifier.clone(),
            platform: descriptor.platform,
        });

        Ok(restart_info)
    }

    async fn apply_to_device<D: Device>(
        &self,
        descriptor: &mut DeviceDescriptor<D>,
        pending: Vec<LiveSyncResultInfo>,
    ) -> Vec<DeviceSyncOutcome> {
        let mut outcomes = Vec::with_capacity(pending.len());
        for mut info in pending {
            let restart_info = self.refresh(descriptor, &mut info).await;
            outcomes.push(DeviceSyncOutcome {
                device_identifier: descriptor.identifier.clone(),
                result: Ok(restart_info),
            });
        }
        outcomes
    }

    async fn refresh<D: Device>(
        &self,
        descriptor: &mut DeviceDescriptor<D>,
        info: &mut LiveSyncResultInfo,
    ) -> RestartApplicationInfo {
        if descriptor.debugging_enabled {
            self.restart
                .refresh_application_with_debug(&self.project, info, descriptor, &self.sync_service)
                .await
        } else {
            self.restart
                .refresh_engine()
                .refresh_application_without_debug(
                    &self.project,
                    info,
                    descriptor,
                    &self.sync_service,
                    None,
                )
                .await
        }
    }
}

impl<P, A, S, G, B> LocalRunLoop for LiveSyncRunLoop<P, A, S, G, B>
where
    P: PlatformProjectService,
    A: AnalyticsService,
    S: PlatformLiveSyncService,
    G: DebugService,
    B: BuildService,
{
    async fn initial_sync<D: Device>(
        &self,
        batch: &mut [DeviceDescriptor<D>],
    ) -> Vec<DeviceSyncOutcome> {
        debug!("Starting live sync on {} device(s)", batch.len());
        join_all(batch.iter_mut().map(|d| self.initial_sync_device(d))).await
    }

    async fn apply_changes<D: Device>(
        &self,
        batch: &mut [DeviceDescriptor<D>],
        results: Vec<LiveSyncResultInfo>,
    ) -> Vec<DeviceSyncOutcome> {
        let mut per_device: Vec<_> = batch.iter_mut().map(|d| (d, Vec::new())).collect();
        let mut outcomes = Vec::new();

        for info in results {
            let device_id = info.device_identifier().to_string();
            match per_device.iter_mut().find(|entry| entry.0.identifier == device_id) {
                Some(entry) => entry.1.push(info),
                None => {
                    warn!("Dropping changes for device {} outside the session", device_id);
                    outcomes.push(DeviceSyncOutcome {
                        result: Err(Error::device(format!(
                            "Device {} is not part of the live sync session",
                            device_id
                        ))),
                        device_identifier: device_id,
                    });
                }
            }
        }

        let applied = join_all(
            per_device
                .into_iter()
                .filter(|(_, pending)| !pending.is_empty())
                .map(|(descriptor, pending)| self.apply_to_device(descriptor, pending)),
        )
        .await;

        outcomes.extend(applied.into_iter().flatten());
        outcomes
    }
}
