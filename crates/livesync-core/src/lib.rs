//! # livesync-core - Core Domain Types
//!
//! Foundation crate for the livesync orchestration layer. Provides domain
//! types, error handling, event definitions and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, chrono, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`Platform`] - Android or iOS
//! - [`BuildConfig`], [`BuildFingerprint`] - Build parameters and the on-device build record
//! - [`LiveSyncResultInfo`] - Result of one sync cycle for one device
//! - [`DebugOptions`], [`AttachRequest`], [`DebugInformation`] - Debugger attach inputs and outputs
//!
//! ### Events (`events`)
//! - [`LiveSyncEvent`] - Closed set of signals raised by the coordinators
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//!
//! ## Prelude
//!
//! ```rust
//! use livesync_core::prelude::*;
//! ```

pub mod error;
pub mod events;
pub mod logging;
pub mod prelude;
pub mod types;

pub use error::{Error, Result, ResultExt, DEVELOPER_DISK_IMAGE_MISSING};
pub use events::LiveSyncEvent;
pub use types::{
    AttachRequest, BuildConfig, BuildFingerprint, DebugInformation, DebugOptions, DeviceAppData,
    LiveSyncResultInfo, Platform, ProjectData, ProjectIdentifiers, RestartApplicationInfo,
};
