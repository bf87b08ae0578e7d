//! livesync-app - Device lifecycle orchestration for livesync
//!
//! Installs builds on devices, decides between hot refresh and restart after
//! each sync, attaches debuggers with a launch-to-attach fallback and fans all
//! of it out across every attached device so one device's failure never stalls
//! the others. Events are broadcast through [`EventNotifier`].

pub mod config;
pub mod debug;
pub mod descriptor;
pub mod fanout;
pub mod install;
pub mod lifetime;
pub mod notifier;
pub mod options;
pub mod pipeline;
pub mod refresh;
pub mod restart;
pub mod services;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export primary types
pub use config::{load_settings, save_settings, Settings};
pub use debug::DebugAttachCoordinator;
pub use descriptor::{BuildAction, BuildKind, DeviceDescriptor};
pub use fanout::{FleetFanOutCoordinator, LiveSyncSession};
pub use install::{InstallOutcome, InstallationCoordinator};
pub use lifetime::{LongLivedServices, SessionLifetime};
pub use notifier::EventNotifier;
pub use options::{AdditionalOptions, LiveSyncOptions, OutputPathFn};
pub use pipeline::{DeviceSyncOutcome, LiveSyncRunLoop, LocalRunLoop, RunLoop, RunLoopServices};
pub use refresh::{RefreshDecisionEngine, RefreshSettings};
pub use restart::RestartCoordinator;
pub use services::{
    AnalyticsService, BuildService, DebugService, Disposable, PlatformLiveSyncService,
    PlatformProjectService, PlatformValidator,
};

// Re-export core event type for subscribers
pub use livesync_core::LiveSyncEvent;
