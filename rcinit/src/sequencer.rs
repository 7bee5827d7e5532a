use log::{debug, info, warn};
use pcie_xdma::{BusRange, enable_root_port, has_root_port_enables};
use rdif_pcie::{Interface, InterruptMask, PortIdentifier, local_config};

use crate::{BringUpError, LinkState, LinkWait, Platform, RootPort};

/// Takes one root port from reset to a programmed bus window.
pub struct Sequencer<'a, P: Platform + ?Sized> {
    platform: &'a P,
    link_wait: LinkWait,
}

impl<'a, P: Platform + ?Sized> Sequencer<'a, P> {
    pub fn new(platform: &'a P) -> Self {
        Self {
            platform,
            link_wait: LinkWait::default(),
        }
    }

    pub fn with_link_wait(mut self, link_wait: LinkWait) -> Self {
        self.link_wait = link_wait;
        self
    }

    /// Brings up the controller behind `id` and gives it the bus window `bus`.
    ///
    /// On error the controller is left as it is; nothing is rolled back.
    pub fn bring_up(&self, id: PortIdentifier, bus: BusRange) -> Result<RootPort, BringUpError> {
        let config = self
            .platform
            .lookup(id)
            .ok_or(BringUpError::ConfigNotFound(id))?;
        let base = config.base_address;
        debug!("{id}: controller #{} at {base:#x}", config.device_id);

        let mut hw = self.platform.bind(&config);
        hw.open()
            .map_err(|source| BringUpError::InitFailed { base, source })?;

        if !hw.config().include_root_complex {
            return Err(BringUpError::NotRootComplex { base });
        }

        quiesce_interrupts(&mut *hw);

        let attempts = match self.link_wait.wait(self.platform, || hw.is_link_up()) {
            LinkState::Up { attempts } => attempts,
            state => {
                return Err(BringUpError::LinkTimeout {
                    attempts: state.attempts(),
                });
            }
        };
        info!("{id}: link is up after {attempts} poll(s)");

        let requester = hw.requester_id();
        info!(
            "{id}: requester id bus {:#04x} device {:#04x} function {:#04x} port {:#04x}",
            requester.bus, requester.device, requester.function, requester.port
        );

        enable_command(&mut *hw, id)?;
        program_bus_numbers(&mut *hw, id, bus)?;
        info!("{id}: root port initialized");

        Ok(RootPort::new(id, bus, requester, attempts, hw))
    }
}

fn quiesce_interrupts(hw: &mut dyn Interface) {
    let enabled = hw.enabled_interrupts();
    debug!("interrupts currently enabled: {enabled}");
    hw.disable_interrupts(InterruptMask::ALL);

    let pending = hw.pending_interrupts();
    debug!("interrupts pending:          {pending}");
    hw.clear_pending_interrupts(InterruptMask::ALL);

    let enabled = hw.enabled_interrupts();
    let pending = hw.pending_interrupts();
    debug!("after quiesce enabled {enabled}, pending {pending}");
}

fn read_local(hw: &mut dyn Interface, offset: u16) -> Result<u32, BringUpError> {
    hw.read_local_config(offset)
        .map_err(|source| BringUpError::ConfigAccess { offset, source })
}

fn write_local(hw: &mut dyn Interface, offset: u16, value: u32) -> Result<(), BringUpError> {
    hw.write_local_config(offset, value)
        .map_err(|source| BringUpError::ConfigAccess { offset, source })
}

fn enable_command(hw: &mut dyn Interface, id: PortIdentifier) -> Result<(), BringUpError> {
    let current = read_local(hw, local_config::COMMAND_STATUS)?;
    write_local(hw, local_config::COMMAND_STATUS, enable_root_port(current))?;

    let readback = read_local(hw, local_config::COMMAND_STATUS)?;
    info!("{id}: local config Command/Status {readback:#010x}");
    if !has_root_port_enables(readback) {
        warn!("{id}: command enables did not latch, read back {readback:#010x}");
    }
    Ok(())
}

fn program_bus_numbers(
    hw: &mut dyn Interface,
    id: PortIdentifier,
    bus: BusRange,
) -> Result<(), BringUpError> {
    write_local(hw, local_config::BUS_NUMBERS, bus.pack())?;

    let readback = read_local(hw, local_config::BUS_NUMBERS)?;
    info!("{id}: local config Prim/Sec/Sub {readback:#010x}");
    if BusRange::unpack(readback) != bus {
        warn!("{id}: bus numbers read back {readback:#010x}, wrote {:#010x}", bus.pack());
    }
    Ok(())
}
