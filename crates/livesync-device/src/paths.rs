//! Device-side path helpers

use std::path::Path;

/// Name of the build fingerprint file kept in the device project root
pub const BUILD_INFO_FILE_NAME: &str = ".buildinfo";

/// Convert a host path to the device convention (forward slashes)
pub fn to_device_path(host_path: &Path) -> String {
    host_path.to_string_lossy().replace('\\', "/")
}

/// Location of the build fingerprint under a device project root
pub fn build_info_path(project_root: &str) -> String {
    to_device_path(&Path::new(project_root).join(BUILD_INFO_FILE_NAME))
}
