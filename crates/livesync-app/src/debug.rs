//! Debugger attach with a single launch-to-attach fallback
//!
//! A launch request sent to an app that is already running (not blocked at
//! startup) never gets its port handshake. When the first request fails the
//! coordinator retries once with attach semantics against the live process.

use livesync_core::prelude::*;
use livesync_core::{AttachRequest, DebugInformation, DebugOptions, LiveSyncEvent, ProjectData};
use livesync_device::Device;

use crate::descriptor::DeviceDescriptor;
use crate::notifier::EventNotifier;
use crate::services::DebugService;

pub struct DebugAttachCoordinator<G> {
    debug_service: G,
    notifier: EventNotifier,
}

impl<G: DebugService> DebugAttachCoordinator<G> {
    pub fn new(debug_service: G, notifier: EventNotifier) -> Self {
        Self {
            debug_service,
            notifier,
        }
    }

    pub fn debug_service(&self) -> &G {
        &self.debug_service
    }

    /// Mark the device as debugged and attach a debugger to it.
    ///
    /// `chrome` and `start` default to true when unset. The options stored on
    /// the descriptor reflect the request that finally went out, so a
    /// fallback to attach semantics is visible to the next cycle.
    pub async fn enable_debugging<D: Device>(
        &self,
        descriptor: Option<&mut DeviceDescriptor<D>>,
        project: &ProjectData,
        debug_options: DebugOptions,
    ) -> Result<DebugInformation> {
        let descriptor = descriptor.ok_or(Error::MissingDeviceDescriptor)?;

        descriptor.debugging_enabled = true;
        descriptor.debug_options = debug_options.resolved();

        let mut request = descriptor.attach_request(project);
        let result = self.attach_debugger(&mut request).await;
        descriptor.debug_options = request.debug_options;
        result
    }

    /// Send `request` to the debug service, retrying once with
    /// `start = false` if it fails.
    ///
    /// When both attempts fail the first error is returned.
    pub async fn attach_debugger(&self, request: &mut AttachRequest) -> Result<DebugInformation> {
        let info = match self.debug_service.debug(request).await {
            Ok(info) => info,
            Err(first) => {
                trace!(
                    "Debugger request for {} failed, retrying as attach: {}",
                    request.device_identifier,
                    first
                );
                request.debug_options.start = Some(false);

                match self.debug_service.debug(request).await {
                    Ok(info) => info,
                    Err(retry) => {
                        trace!(
                            "Debugger attach retry for {} failed: {}",
                            request.device_identifier,
                            retry
                        );
                        return Err(first);
                    }
                }
            }
        };

        if !info.url.is_empty() && request.debug_options.force_debugger_attached_event {
            self.notifier.emit(LiveSyncEvent::DebuggerAttached(info.clone()));
        }

        info!(
            "Debugger for device {} available at {}",
            request.device_identifier, info.url
        );
        Ok(info)
    }

    /// Stop the debugger session on the device and clear its debug flag
    pub async fn disable_debugging<D: Device>(
        &self,
        descriptor: Option<&mut DeviceDescriptor<D>>,
    ) -> Result<()> {
        let descriptor = descriptor.ok_or(Error::MissingDeviceDescriptor)?;

        descriptor.debugging_enabled = false;
        self.debug_service.debug_stop(&descriptor.identifier).await?;
        self.notifier.emit(LiveSyncEvent::DebuggerDetached {
            device_identifier: descriptor.identifier.clone(),
        });
        debug!("Debugging disabled on {}", descriptor.identifier);
        Ok(())
    }
}
