//! Disposal of process-wide services for long-running sessions

use std::fmt;
use std::sync::Arc;

use livesync_core::prelude::*;
use livesync_core::Platform;

use crate::options::LiveSyncOptions;
use crate::services::Disposable;

/// Process-wide services that are disposed when a command ends unless the
/// session keeps them alive
#[derive(Clone)]
pub struct LongLivedServices {
    pub analytics: Arc<dyn Disposable>,
    pub cleanup: Arc<dyn Disposable>,
    pub ios_device_operations: Option<Arc<dyn Disposable>>,
    pub ios_log_provider: Option<Arc<dyn Disposable>>,
}

impl fmt::Debug for LongLivedServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LongLivedServices")
            .field("ios_device_operations", &self.ios_device_operations.is_some())
            .field("ios_log_provider", &self.ios_log_provider.is_some())
            .finish_non_exhaustive()
    }
}

/// Whether the services must outlive the initial deploy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLifetime {
    pub keep_alive: bool,
}

impl SessionLifetime {
    pub fn from_options(options: &LiveSyncOptions) -> Self {
        Self {
            keep_alive: options.keeps_session_alive(),
        }
    }

    /// Push the disposal setting to every service the session may touch.
    ///
    /// The iOS services are only touched when iOS devices may be targeted,
    /// so an Android-only session never starts them.
    pub fn apply(&self, services: &LongLivedServices, platform: Option<&str>) {
        let should_dispose = !self.keep_alive;
        debug!(
            "Session lifetime: keep_alive={} platform={:?}",
            self.keep_alive, platform
        );

        services.analytics.set_should_dispose(should_dispose);
        services.cleanup.set_should_dispose(should_dispose);

        if platform.map_or(true, |p| Platform::IOS.matches(p)) {
            for service in [&services.ios_device_operations, &services.ios_log_provider]
                .into_iter()
                .flatten()
            {
                service.set_should_dispose(should_dispose);
            }
        }
    }
}
