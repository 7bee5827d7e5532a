//! Simulated board with two XDMA bridge instances backed by host memory.

use std::{cell::Cell, time::Duration};

use log::{debug, info};
use pcie_xdma::{Xdma, xdma::REGISTER_WINDOW};
use rcinit::{EnumerateError, Enumerator, Osal, Platform, PortIdentifier, RootPort};
use rdif_pcie::{
    Capabilities, ConfigLookup, ConfigTable, DriverGeneric, ErrorBase, Hardware, Interface,
    InterruptMask, RequesterId, RootPortConfig,
};

const PHY_STATUS: usize = 0x144;
const INTERRUPT_DECODE: usize = 0x138;
const INTERRUPT_MASK: usize = 0x13c;
const PHY_LINK_UP: u32 = 1 << 11;
/// x4 at 5.0 GT/s, LTSSM in L0.
const PHY_TRAINED: u32 = PHY_LINK_UP | (2 << 1) | 1 | (0x10 << 3);

pub struct SimBoard {
    configs: [RootPortConfig; 2],
    windows: [*mut u32; 2],
    train_time: [Option<Duration>; 2],
    elapsed: Cell<Duration>,
}

impl SimBoard {
    /// `train_time` is how long each link needs to come up, `None` never.
    pub fn new(train_time: [Option<Duration>; 2]) -> Self {
        let windows = [0, 1].map(|port: u32| {
            let regs = Box::leak(vec![0u32; REGISTER_WINDOW / 4].into_boxed_slice());
            let regs = regs.as_mut_ptr();
            unsafe {
                regs.add(1).write_volatile(0x0010_0000);
                regs.add(INTERRUPT_MASK / 4).write_volatile(0x3ff3_0fff);
                regs.add(INTERRUPT_DECODE / 4).write_volatile(0x0000_0011);
                regs.add(PHY_STATUS / 4).write_volatile(port << 28);
            }
            regs
        });
        let configs = [0, 1].map(|i| RootPortConfig {
            device_id: i as u16,
            base_address: windows[i] as usize,
            include_root_complex: true,
            capabilities: Capabilities(0x1),
        });
        let board = Self {
            configs,
            windows,
            train_time,
            elapsed: Cell::new(Duration::ZERO),
        };
        board.train_links();
        board
    }

    pub fn identifier(&self, port: usize, by_address: bool) -> PortIdentifier {
        self.configs[port].identifier(by_address)
    }

    fn train_links(&self) {
        for (port, regs) in self.windows.iter().enumerate() {
            if self.train_time[port].is_some_and(|t| t <= self.elapsed.get()) {
                unsafe {
                    let phy = regs.add(PHY_STATUS / 4);
                    phy.write_volatile(phy.read_volatile() | PHY_TRAINED);
                }
            }
        }
    }
}

impl ConfigLookup for SimBoard {
    fn lookup(&self, id: PortIdentifier) -> Option<RootPortConfig> {
        ConfigTable::new(&self.configs).lookup(id)
    }
}

impl Osal for SimBoard {
    fn delay(&self, duration: Duration) {
        std::thread::sleep(duration);
        self.elapsed.set(self.elapsed.get() + duration);
        self.train_links();
    }
}

impl Platform for SimBoard {
    fn bind(&self, config: &RootPortConfig) -> Hardware {
        // SAFETY: configs only come from `self.configs`, whose windows are
        // leaked and never handed to anyone else.
        Box::new(SimBridge {
            xdma: unsafe { Xdma::new(*config) },
            decode: config.base_address + INTERRUPT_DECODE,
        })
    }
}

/// The real driver over a host memory window. Host memory keeps whatever is
/// written, so the write-1-to-clear interrupt decode register is emulated
/// here.
struct SimBridge {
    xdma: Xdma,
    decode: usize,
}

impl SimBridge {
    fn decode(&self) -> *mut u32 {
        self.decode as *mut u32
    }
}

impl DriverGeneric for SimBridge {
    fn open(&mut self) -> Result<(), ErrorBase> {
        self.xdma.open()
    }

    fn close(&mut self) -> Result<(), ErrorBase> {
        self.xdma.close()
    }
}

impl Interface for SimBridge {
    fn config(&self) -> &RootPortConfig {
        self.xdma.config()
    }

    fn enabled_interrupts(&mut self) -> InterruptMask {
        self.xdma.enabled_interrupts()
    }

    fn pending_interrupts(&mut self) -> InterruptMask {
        self.xdma.pending_interrupts()
    }

    fn disable_interrupts(&mut self, mask: InterruptMask) {
        self.xdma.disable_interrupts(mask)
    }

    fn clear_pending_interrupts(&mut self, mask: InterruptMask) {
        // SAFETY: `decode` lies inside the window the driver was created on.
        let pending = unsafe { self.decode().read_volatile() };
        self.xdma.clear_pending_interrupts(mask);
        unsafe { self.decode().write_volatile(pending & !mask.raw()) };
    }

    fn is_link_up(&mut self) -> bool {
        self.xdma.is_link_up()
    }

    fn requester_id(&mut self) -> RequesterId {
        self.xdma.requester_id()
    }

    fn read_local_config(&mut self, offset: u16) -> Result<u32, ErrorBase> {
        self.xdma.read_local_config(offset)
    }

    fn write_local_config(&mut self, offset: u16, value: u32) -> Result<(), ErrorBase> {
        self.xdma.write_local_config(offset, value)
    }
}

/// Stands in for a fabric walk: nothing sits behind a simulated link, so it
/// only checks that the window the port decodes is the planned one.
pub struct WindowCheck;

impl Enumerator for WindowCheck {
    fn enumerate_fabric(&mut self, port: &mut RootPort) -> Result<(), EnumerateError> {
        let expected = port.bus_range();
        let found = port.programmed_bus_range()?;
        if found != expected {
            return Err(EnumerateError::WindowMismatch { expected, found });
        }
        debug!("{}: requester {}", port.id(), port.requester_id());
        info!(
            "{}: buses {:#04x}..={:#04x} empty",
            port.id(),
            expected.secondary,
            expected.subordinate
        );
        Ok(())
    }
}
