//! Domain type definitions shared by every livesync crate

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Platform
// ─────────────────────────────────────────────────────────────────────────────

/// Mobile platform targeted by a device or a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[serde(alias = "Android")]
    Android,
    #[serde(alias = "iOS", alias = "IOS")]
    IOS,
}

impl Platform {
    /// Every platform the orchestrator can drive
    pub const ALL: [Platform; 2] = [Platform::Android, Platform::IOS];

    /// Lowercase key used in paths and device listings
    pub fn as_key(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::IOS => "ios",
        }
    }

    /// Case-insensitive comparison against a raw platform string.
    ///
    /// Accepts architecture-suffixed names such as `android-arm64` or `ios_x64`.
    pub fn matches(&self, raw: &str) -> bool {
        raw.to_lowercase().starts_with(self.as_key())
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::IOS => write!(f, "iOS"),
            Platform::Android => write!(f, "Android"),
        }
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.matches(s.trim()))
            .ok_or_else(|| Error::platform_validation(s, "unknown platform"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Project / Build
// ─────────────────────────────────────────────────────────────────────────────

/// Build parameters shared by the build and install steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    /// Release build (no build fingerprint is kept on device)
    pub release: bool,

    /// Build for a physical device rather than an emulator/simulator
    pub build_for_device: bool,

    /// Clean native build output before building
    #[serde(default)]
    pub clean: bool,
}

impl BuildConfig {
    pub fn for_device(release: bool, is_emulator: bool) -> Self {
        Self {
            release,
            build_for_device: !is_emulator,
            clean: false,
        }
    }
}

/// Per-platform application identifiers
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct ProjectIdentifiers {
    pub android: String,
    pub ios: String,
}

/// The project being synced to devices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectData {
    pub project_dir: PathBuf,
    pub project_name: String,
    pub identifiers: ProjectIdentifiers,
}

impl ProjectData {
    /// Project whose application id is the same on every platform
    pub fn new(
        project_dir: impl Into<PathBuf>,
        project_name: impl Into<String>,
        app_identifier: impl Into<String>,
    ) -> Self {
        let app_identifier = app_identifier.into();
        Self {
            project_dir: project_dir.into(),
            project_name: project_name.into(),
            identifiers: ProjectIdentifiers {
                android: app_identifier.clone(),
                ios: app_identifier,
            },
        }
    }

    pub fn app_identifier(&self, platform: Platform) -> &str {
        match platform {
            Platform::Android => &self.identifiers.android,
            Platform::IOS => &self.identifiers.ios,
        }
    }
}

/// Build fingerprint kept next to the synced app on the device.
///
/// Identifies the artifact that was last installed; compared against the
/// locally built record to decide whether a reinstall is needed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildFingerprint {
    pub build_time: String,
    pub build_for_device: bool,
    pub release: bool,
}

impl BuildFingerprint {
    /// Fingerprint for a build produced now
    pub fn now(config: &BuildConfig) -> Self {
        Self {
            build_time: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            build_for_device: config.build_for_device,
            release: config.release,
        }
    }

    /// Parse a fingerprint, treating malformed content as absent
    pub fn parse(content: &str) -> Option<Self> {
        match serde_json::from_str(content) {
            Ok(fingerprint) => Some(fingerprint),
            Err(e) => {
                tracing::debug!("Ignoring unreadable build fingerprint: {}", e);
                None
            }
        }
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sync
// ─────────────────────────────────────────────────────────────────────────────

/// The app on one device that a sync cycle targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceAppData {
    pub device_identifier: String,
    pub platform: Platform,
    pub app_identifier: String,
    pub project_dir: PathBuf,
}

/// Result of one sync cycle for one device, produced by the platform sync engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveSyncResultInfo {
    pub device_app_data: DeviceAppData,
    /// Device-side paths of the files that were transferred
    pub modified_files_data: Vec<String>,
    pub is_full_sync: bool,
    /// Ask the app to block at startup until a debugger attaches
    pub wait_for_debugger: bool,
}

impl LiveSyncResultInfo {
    pub fn device_identifier(&self) -> &str {
        &self.device_app_data.device_identifier
    }
}

/// Outcome of a refresh-or-restart decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RestartApplicationInfo {
    pub did_restart: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Debugging
// ─────────────────────────────────────────────────────────────────────────────

/// Options controlling how a debugger session is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugOptions {
    /// Produce a Chrome DevTools URL; defaults to true
    #[serde(default)]
    pub chrome: Option<bool>,

    /// Launch the app under the debugger (true) or attach to the running
    /// process (false); defaults to true
    #[serde(default)]
    pub start: Option<bool>,

    /// Break on the first line of application code
    #[serde(default)]
    pub debug_brk: bool,

    /// Emit the attached event even when a session may already be live
    #[serde(default)]
    pub force_debugger_attached_event: bool,
}

impl DebugOptions {
    /// Copy with `chrome` and `start` defaulted when unset
    pub fn resolved(mut self) -> Self {
        self.chrome.get_or_insert(true);
        self.start.get_or_insert(true);
        self
    }

    pub fn should_start(&self) -> bool {
        self.start.unwrap_or(true)
    }
}

/// Everything the debug service needs to attach to one device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachRequest {
    pub device_identifier: String,
    pub is_emulator: bool,
    pub output_path: Option<PathBuf>,
    pub platform: Platform,
    pub project_dir: PathBuf,
    pub debug_options: DebugOptions,
}

/// Returned by a successful debugger attach
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DebugInformation {
    /// URL the user opens to inspect the app; may be empty
    pub url: String,
    pub device_identifier: String,
    pub port: Option<u16>,
}
