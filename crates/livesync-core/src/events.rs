//! Events reported by the livesync coordinators
//!
//! The set is closed: every signal a coordinator can raise is one variant of
//! [`LiveSyncEvent`]. Consumers (UI, IDE bridge, command layer) subscribe to
//! the notifier and match on the variants they care about.

use std::path::PathBuf;

use crate::types::{AttachRequest, DebugInformation, Platform};

/// Domain events emitted while syncing apps to devices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveSyncEvent {
    // ─────────────────────────────────────────────────────────
    // Debugger
    // ─────────────────────────────────────────────────────────
    /// A debugger is attached and reachable at `info.url`
    DebuggerAttached(DebugInformation),

    /// The debugger lost its process (restart or explicit stop)
    DebuggerDetached { device_identifier: String },

    /// The user must act before debugging can work (e.g. mount the developer
    /// disk image); carries the options of the attach that should be retried
    UserInteractionNeeded(AttachRequest),

    // ─────────────────────────────────────────────────────────
    // Sync
    // ─────────────────────────────────────────────────────────
    /// The initial sync for a device finished and the app is running
    LiveSyncStarted {
        project_dir: PathBuf,
        app_identifier: String,
        device_identifier: String,
        platform: Platform,
    },

    /// Non-fatal, user-facing message about one device
    LiveSyncNotification {
        project_dir: PathBuf,
        app_identifier: String,
        device_identifier: String,
        message: String,
    },

    /// A sync cycle completed for a device (successfully or with a handled failure)
    LiveSyncExecuted {
        project_dir: PathBuf,
        app_identifier: String,
        synced_files: Vec<String>,
        device_identifier: String,
        is_full_sync: bool,
    },

    /// A device pipeline failed; sibling devices keep running
    LiveSyncError {
        project_dir: PathBuf,
        app_identifier: String,
        device_identifier: String,
        error: String,
    },
}

impl LiveSyncEvent {
    /// Returns a short string label for this event type (for logging/debugging).
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::DebuggerAttached(_) => "debugger_attached",
            Self::DebuggerDetached { .. } => "debugger_detached",
            Self::UserInteractionNeeded(_) => "user_interaction_needed",
            Self::LiveSyncStarted { .. } => "live_sync_started",
            Self::LiveSyncNotification { .. } => "live_sync_notification",
            Self::LiveSyncExecuted { .. } => "live_sync_executed",
            Self::LiveSyncError { .. } => "live_sync_error",
        }
    }

    /// The device this event concerns
    pub fn device_identifier(&self) -> &str {
        match self {
            Self::DebuggerAttached(info) => &info.device_identifier,
            Self::UserInteractionNeeded(request) => &request.device_identifier,
            Self::DebuggerDetached { device_identifier }
            | Self::LiveSyncStarted {
                device_identifier, ..
            }
            | Self::LiveSyncNotification {
                device_identifier, ..
            }
            | Self::LiveSyncExecuted {
                device_identifier, ..
            }
            | Self::LiveSyncError {
                device_identifier, ..
            } => device_identifier,
        }
    }
}
