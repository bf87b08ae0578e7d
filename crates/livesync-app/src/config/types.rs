//! Configuration types for livesync
//!
//! Defines:
//! - `Settings` - Project settings read from `.livesync/config.toml`
//! - Related sub-sections with their defaults

use serde::{Deserialize, Serialize};

/// Project settings (.livesync/config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub session: SessionSettings,

    #[serde(default)]
    pub debug: DebugSettings,

    #[serde(default)]
    pub hmr: HmrSettings,

    #[serde(default)]
    pub install: InstallSettings,
}

/// Session behavior settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionSettings {
    /// Keep syncing changes after the initial deploy
    #[serde(default = "default_true")]
    pub watch: bool,

    /// Launch the app and exit instead of keeping the session open
    #[serde(default)]
    pub just_launch: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            watch: true,
            just_launch: false,
        }
    }
}

/// Debugger settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DebugSettings {
    /// Produce a Chrome DevTools URL when attaching
    #[serde(default = "default_true")]
    pub chrome: bool,

    /// Break on the first line of application code
    #[serde(default)]
    pub debug_brk: bool,
}

impl Default for DebugSettings {
    fn default() -> Self {
        Self {
            chrome: true,
            debug_brk: false,
        }
    }
}

/// Hot module replacement settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HmrSettings {
    /// Request hot module replacement from the bundler
    #[serde(default)]
    pub enabled: bool,

    /// Oldest bundler release that supports hot module replacement
    #[serde(default = "default_min_bundler_version")]
    pub min_bundler_version: String,
}

impl Default for HmrSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            min_bundler_version: default_min_bundler_version(),
        }
    }
}

/// Install settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InstallSettings {
    /// Report anonymous install events
    #[serde(default = "default_true")]
    pub track_usage: bool,
}

impl Default for InstallSettings {
    fn default() -> Self {
        Self { track_usage: true }
    }
}

fn default_min_bundler_version() -> String {
    "0.17.0".to_string()
}

fn default_true() -> bool {
    true
}
