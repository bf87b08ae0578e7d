//! Per-command live sync options

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use livesync_core::DebugOptions;
use livesync_device::DeviceInfo;

use crate::config::Settings;
use crate::descriptor::BuildKind;

/// Options of one live sync command (run, debug, deploy)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveSyncOptions {
    /// Keep syncing changes after the initial deploy
    pub watch: bool,
    /// Launch the app and exit instead of keeping the session open
    pub just_launch: bool,
    pub release: bool,
    /// Hot module replacement
    pub hmr: bool,
    /// Prefer emulators when picking devices
    pub emulator: bool,
    /// Restrict the session to one device
    pub device_id: Option<String>,
    pub debug_brk: bool,
    pub chrome: bool,
    /// Oldest bundler release accepted when `hmr` is on
    pub min_bundler_version: String,
    /// Report install events to analytics
    pub track_usage: bool,
}

impl Default for LiveSyncOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl LiveSyncOptions {
    /// Options seeded from project settings; command-line flags are applied on top
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            watch: settings.session.watch,
            just_launch: settings.session.just_launch,
            release: false,
            hmr: settings.hmr.enabled,
            emulator: false,
            device_id: None,
            debug_brk: settings.debug.debug_brk,
            chrome: settings.debug.chrome,
            min_bundler_version: settings.hmr.min_bundler_version.clone(),
            track_usage: settings.install.track_usage,
        }
    }

    /// Whether the process outlives the initial deploy
    pub fn keeps_session_alive(&self) -> bool {
        self.watch || !self.just_launch
    }

    /// Debug options for devices that start with a debugger attached
    pub fn debug_options(&self) -> DebugOptions {
        DebugOptions {
            chrome: Some(self.chrome),
            start: None,
            debug_brk: self.debug_brk,
            force_debugger_attached_event: false,
        }
    }
}

/// Computes a per-device build output directory
pub type OutputPathFn = Arc<dyn Fn(&DeviceInfo) -> Option<PathBuf> + Send + Sync>;

/// Caller overrides applied when building device descriptors
#[derive(Clone, Default)]
pub struct AdditionalOptions {
    /// Build routine to run instead of the default prepare and build
    pub build_kind: Option<BuildKind>,
    pub output_path: Option<OutputPathFn>,
    /// Reuse the existing native build
    pub skip_native_prepare: bool,
    /// Start every device with a debugger attached
    pub debug: Option<DebugOptions>,
}

impl fmt::Debug for AdditionalOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdditionalOptions")
            .field("build_kind", &self.build_kind)
            .field("output_path", &self.output_path.as_ref().map(|_| "<fn>"))
            .field("skip_native_prepare", &self.skip_native_prepare)
            .field("debug", &self.debug)
            .finish()
    }
}
