//! Device discovery seam

use livesync_core::prelude::*;
use livesync_core::Platform;

use crate::devices::Device;

/// Options passed to discovery before devices are listed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Only look for devices of this platform
    pub platform: Option<Platform>,

    /// Only look for this device
    pub device_id: Option<String>,

    /// Prefer emulators and start one when nothing is connected
    pub emulator: bool,

    /// Do not infer the platform from the first device found
    pub skip_infer_platform: bool,
}

/// Discovers the devices currently attached to the host.
///
/// `devices()` reflects the last `initialize` call; devices that disconnected
/// since are dropped from the list on the next initialization.
#[trait_variant::make(DeviceDiscovery: Send)]
pub trait LocalDeviceDiscovery {
    type Handle: Device + Clone;

    async fn initialize(&self, options: &DiscoveryOptions) -> Result<()>;

    fn devices(&self) -> Vec<Self::Handle>;
}
