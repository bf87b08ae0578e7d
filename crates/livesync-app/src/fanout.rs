//! Fan-out of live sync across the attached devices
//!
//! Turns the devices found by discovery into descriptors, configures the
//! session lifetime once and hands the whole batch to a run loop. Platform
//! validation fans out over every implicated platform the same way.

use std::sync::LazyLock;

use futures_util::future::join_all;
use regex::Regex;

use livesync_core::prelude::*;
use livesync_core::{BuildConfig, Platform, ProjectData};
use livesync_device::{filter_by_platform, Device, DeviceDiscovery, DiscoveryOptions};

use crate::descriptor::{BuildAction, DeviceDescriptor};
use crate::lifetime::{LongLivedServices, SessionLifetime};
use crate::options::{AdditionalOptions, LiveSyncOptions};
use crate::pipeline::{DeviceSyncOutcome, LocalRunLoop};
use crate::services::PlatformValidator;

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\.(\d+)\.(\d+)").expect("Invalid version pattern regex")
});

/// A started live sync session
#[derive(Debug)]
pub struct LiveSyncSession<D> {
    /// Descriptors in discovery order; pass them back for later change batches
    pub descriptors: Vec<DeviceDescriptor<D>>,
    /// Initial sync outcome per device, same order as `descriptors`
    pub outcomes: Vec<DeviceSyncOutcome>,
    pub lifetime: SessionLifetime,
}

impl<D> LiveSyncSession<D> {
    pub fn failed_devices(&self) -> impl Iterator<Item = &DeviceSyncOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }
}

pub struct FleetFanOutCoordinator<Disc, V> {
    discovery: Disc,
    validator: V,
    project: ProjectData,
    options: LiveSyncOptions,
    services: LongLivedServices,
}

impl<Disc: DeviceDiscovery, V: PlatformValidator> FleetFanOutCoordinator<Disc, V> {
    pub fn new(
        discovery: Disc,
        validator: V,
        project: ProjectData,
        options: LiveSyncOptions,
        services: LongLivedServices,
    ) -> Self {
        Self {
            discovery,
            validator,
            project,
            options,
            services,
        }
    }

    pub fn with_min_bundler_version(mut self, version: impl Into<String>) -> Self {
        self.options.min_bundler_version = version.into();
        self
    }

    pub fn options(&self) -> &LiveSyncOptions {
        &self.options
    }

    /// Initialize discovery and return the devices to sync to.
    ///
    /// With a platform, only devices of that platform are returned; the name
    /// is matched case-insensitively.
    pub async fn get_device_instances(&self, platform: Option<&str>) -> Result<Vec<Disc::Handle>> {
        let discovery_options = DiscoveryOptions {
            platform: platform.map(str::parse).transpose()?,
            device_id: self.options.device_id.clone(),
            emulator: self.options.emulator,
            skip_infer_platform: platform.is_none(),
        };
        self.discovery
            .initialize(&discovery_options)
            .await
            .map_err(|e| match e {
                Error::Discovery { .. } => e,
                other => Error::discovery(other.to_string()),
            })?;

        let devices = self.discovery.devices();
        debug!("Discovery returned {} device(s)", devices.len());

        Ok(match platform {
            Some(platform) => filter_by_platform(devices, platform),
            None => devices,
        })
    }

    /// Build one descriptor per device.
    ///
    /// Fails when there is nothing to sync to, with a message telling the
    /// user what to connect.
    pub fn create_device_descriptors<D: Device>(
        &self,
        devices: Vec<D>,
        platform: Option<&str>,
        additional: &AdditionalOptions,
    ) -> Result<Vec<DeviceDescriptor<D>>> {
        if devices.is_empty() {
            return Err(match platform {
                Some(platform) => Error::no_devices_for_platform(platform),
                None => Error::NoDevicesFound,
            });
        }

        Ok(devices
            .into_iter()
            .map(|device| self.device_descriptor(device, additional))
            .collect())
    }

    fn device_descriptor<D: Device>(
        &self,
        device: D,
        additional: &AdditionalOptions,
    ) -> DeviceDescriptor<D> {
        let build_action = BuildAction {
            kind: additional.build_kind.clone().unwrap_or_default(),
            platform: device.info().platform,
            build_config: BuildConfig::for_device(self.options.release, device.is_emulator()),
            project: self.project.clone(),
        };
        let output_path = additional
            .output_path
            .as_ref()
            .and_then(|output_path| output_path(device.info()));

        let mut descriptor = DeviceDescriptor::new(device, build_action);
        descriptor.output_path = output_path;
        descriptor.skip_native_prepare = additional.skip_native_prepare;
        if let Some(debug_options) = additional.debug {
            descriptor.debugging_enabled = true;
            descriptor.debug_options = debug_options;
        }
        descriptor
    }

    /// Start live sync on `devices`.
    ///
    /// Disposal of the long-lived services is configured before any device
    /// pipeline starts. A failing device shows up in the session outcomes;
    /// only a missing device list fails the call.
    pub async fn execute_live_sync_operation<R: LocalRunLoop, D: Device>(
        &self,
        run_loop: &R,
        devices: Vec<D>,
        platform: Option<&str>,
        additional: &AdditionalOptions,
    ) -> Result<LiveSyncSession<D>> {
        let mut descriptors = self.create_device_descriptors(devices, platform, additional)?;

        let lifetime = SessionLifetime::from_options(&self.options);
        lifetime.apply(&self.services, platform);

        let outcomes = run_loop.initial_sync(&mut descriptors).await;
        let session = LiveSyncSession {
            descriptors,
            outcomes,
            lifetime,
        };

        let failed = session.failed_devices().count();
        if failed > 0 {
            warn!(
                "Live sync failed on {} of {} device(s)",
                failed,
                session.outcomes.len()
            );
        }
        Ok(session)
    }

    /// Validate the host for every implicated platform (all of them when
    /// none is named), then the bundler version when HMR is requested.
    pub async fn validate_platform(&self, platform: Option<&str>) -> Result<()> {
        let platforms = match platform {
            Some(platform) => vec![platform.parse::<Platform>()?],
            None => Platform::ALL.to_vec(),
        };

        join_all(
            platforms
                .iter()
                .map(|platform| self.validator.validate(*platform, &self.project)),
        )
        .await
        .into_iter()
        .collect::<Result<Vec<()>>>()?;

        if self.options.hmr {
            self.check_bundler_version().await?;
        }
        Ok(())
    }

    async fn check_bundler_version(&self) -> Result<()> {
        let found = self.validator.bundler_version(&self.project).await?;
        let min_version = &self.options.min_bundler_version;
        let required = parse_version(min_version).ok_or_else(|| {
            Error::config(format!("Invalid minimum bundler version: {}", min_version))
        })?;

        let version = found.as_deref().and_then(parse_version);
        match version {
            Some(version) if version >= required => Ok(()),
            _ => Err(Error::bundler_version(
                min_version.clone(),
                found.unwrap_or_else(|| "none".to_string()),
            )),
        }
    }
}

/// `major.minor.patch` of the first version number in `raw`
fn parse_version(raw: &str) -> Option<(u64, u64, u64)> {
    let captures = VERSION_PATTERN.captures(raw)?;
    let part = |i: usize| captures.get(i)?.as_str().parse::<u64>().ok();
    Some((part(1)?, part(2)?, part(3)?))
}
