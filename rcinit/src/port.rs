use core::{
    fmt::Debug,
    ops::{Deref, DerefMut},
};

use pcie_xdma::BusRange;
use rdif_pcie::{ErrorBase, Hardware, Interface, PortIdentifier, RequesterId, local_config};

/// A root port that went through bring-up.
///
/// Owns the controller driver exclusively; only [`crate::Sequencer`] creates
/// it.
pub struct RootPort {
    id: PortIdentifier,
    bus: BusRange,
    requester: RequesterId,
    link_attempts: u32,
    hw: Hardware,
}

impl RootPort {
    pub(crate) fn new(
        id: PortIdentifier,
        bus: BusRange,
        requester: RequesterId,
        link_attempts: u32,
        hw: Hardware,
    ) -> Self {
        Self {
            id,
            bus,
            requester,
            link_attempts,
            hw,
        }
    }

    pub fn id(&self) -> PortIdentifier {
        self.id
    }

    /// Window that was programmed during bring-up.
    pub fn bus_range(&self) -> BusRange {
        self.bus
    }

    pub fn base_address(&self) -> usize {
        self.hw.config().base_address
    }

    pub fn requester_id(&self) -> RequesterId {
        self.requester
    }

    /// Link polls it took until the link was reported up.
    pub fn link_attempts(&self) -> u32 {
        self.link_attempts
    }

    /// Reads the bus number register back from the hardware.
    pub fn programmed_bus_range(&mut self) -> Result<BusRange, ErrorBase> {
        let raw = self.hw.read_local_config(local_config::BUS_NUMBERS)?;
        Ok(BusRange::unpack(raw))
    }
}

impl Deref for RootPort {
    type Target = dyn Interface;

    fn deref(&self) -> &Self::Target {
        self.hw.as_ref()
    }
}

impl DerefMut for RootPort {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.hw.as_mut()
    }
}

impl Debug for RootPort {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RootPort")
            .field("id", &self.id)
            .field("base", &format_args!("{:#x}", self.base_address()))
            .field("bus", &self.bus)
            .field("requester", &self.requester)
            .field("link_attempts", &self.link_attempts)
            .finish()
    }
}
