use core::time::Duration;

use rdif_pcie::{ConfigLookup, Hardware, RootPortConfig};

/// Timing services of the boot environment.
pub trait Osal {
    /// Blocks for at least `duration`.
    fn delay(&self, duration: Duration);
}

/// What bring-up needs from the board it runs on.
pub trait Platform: ConfigLookup + Osal {
    /// Creates the driver instance for `config`. The instance is not opened.
    fn bind(&self, config: &RootPortConfig) -> Hardware;
}
