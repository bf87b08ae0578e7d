//! Configuration file parsing for livesync
//!
//! Supports `.livesync/config.toml` in the project directory.

pub mod settings;
pub mod types;

pub use settings::{load_settings, save_settings};
pub use types::*;
