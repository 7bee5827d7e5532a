//! Memory mapped driver for XDMA/QDMA PCIe bridges generated in root complex
//! mode.
//!
//! The root port's own type 1 header sits at the start of the register
//! window; the bridge specific registers follow it.

use alloc::format;

use log::debug;
use rdif_pcie::{DriverGeneric, ErrorBase, Interface, InterruptMask, RequesterId, RootPortConfig};

/// Size of the bridge register window.
pub const REGISTER_WINDOW: usize = 0x1000;

const LOCAL_CONFIG_WORDS: u16 = (REGISTER_WINDOW / 4) as u16;

const REG_INTERRUPT_DECODE: usize = 0x138;
const REG_INTERRUPT_MASK: usize = 0x13c;
const REG_PHY_STATUS: usize = 0x144;

/// Interrupt mask bits the bridge implements.
pub const INTERRUPT_MASK_VALID: u32 = 0x3ff3_0fff;

const PHY_LINK_RATE: u32 = 1 << 0;
const PHY_LINK_WIDTH_MASK: u32 = 0x0000_0006;
const PHY_LINK_WIDTH_SHIFT: u32 = 1;
const PHY_LTSSM_MASK: u32 = 0x0000_01f8;
const PHY_LTSSM_SHIFT: u32 = 3;
const PHY_LINK_UP: u32 = 1 << 11;
const PHY_RID_FUNCTION_MASK: u32 = 0x0000_7000;
const PHY_RID_FUNCTION_SHIFT: u32 = 12;
const PHY_RID_DEVICE_MASK: u32 = 0x000f_8000;
const PHY_RID_DEVICE_SHIFT: u32 = 15;
const PHY_RID_BUS_MASK: u32 = 0x0ff0_0000;
const PHY_RID_BUS_SHIFT: u32 = 20;
const PHY_PORT_MASK: u32 = 0xf000_0000;
const PHY_PORT_SHIFT: u32 = 28;

/// Decoded PHY Status/Control register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhyStatus {
    pub link_up: bool,
    /// 5.0 GT/s when set, 2.5 GT/s otherwise.
    pub gen2: bool,
    pub lanes: u8,
    pub ltssm: u8,
}

impl PhyStatus {
    pub const fn from_raw(raw: u32) -> Self {
        Self {
            link_up: raw & PHY_LINK_UP != 0,
            gen2: raw & PHY_LINK_RATE != 0,
            lanes: 1 << ((raw & PHY_LINK_WIDTH_MASK) >> PHY_LINK_WIDTH_SHIFT),
            ltssm: ((raw & PHY_LTSSM_MASK) >> PHY_LTSSM_SHIFT) as u8,
        }
    }
}

pub struct Xdma {
    config: RootPortConfig,
    base: usize,
}

impl Xdma {
    /// Binds a driver to the register window described by `config`.
    ///
    /// # Safety
    /// `config.base_address` must map a bridge register window of at least
    /// [`REGISTER_WINDOW`] bytes for as long as the driver is used, and no
    /// other code may access that window meanwhile.
    pub unsafe fn new(config: RootPortConfig) -> Self {
        Self {
            base: config.base_address,
            config,
        }
    }

    pub fn phy_status(&self) -> PhyStatus {
        PhyStatus::from_raw(self.read_reg(REG_PHY_STATUS))
    }

    fn read_reg(&self, offset: usize) -> u32 {
        unsafe { ((self.base + offset) as *const u32).read_volatile() }
    }

    fn write_reg(&mut self, offset: usize, value: u32) {
        unsafe { ((self.base + offset) as *mut u32).write_volatile(value) }
    }

    fn local_offset(offset: u16) -> Result<usize, ErrorBase> {
        if offset >= LOCAL_CONFIG_WORDS {
            return Err(ErrorBase::InvalidArg {
                name: "offset",
                val: format!("{offset:#x}"),
            });
        }
        Ok((offset as usize) << 2)
    }
}

impl DriverGeneric for Xdma {
    fn open(&mut self) -> Result<(), ErrorBase> {
        if self.base == 0 || self.base % 4 != 0 {
            return Err(ErrorBase::BadAddr(self.base));
        }
        debug!(
            "xdma #{} at {:#x}, capabilities {}",
            self.config.device_id, self.base, self.config.capabilities
        );
        Ok(())
    }

    fn close(&mut self) -> Result<(), ErrorBase> {
        Ok(())
    }
}

impl Interface for Xdma {
    fn config(&self) -> &RootPortConfig {
        &self.config
    }

    fn enabled_interrupts(&mut self) -> InterruptMask {
        InterruptMask(self.read_reg(REG_INTERRUPT_MASK))
    }

    fn pending_interrupts(&mut self) -> InterruptMask {
        InterruptMask(self.read_reg(REG_INTERRUPT_DECODE))
    }

    fn disable_interrupts(&mut self, mask: InterruptMask) {
        let enabled = self.read_reg(REG_INTERRUPT_MASK);
        self.write_reg(
            REG_INTERRUPT_MASK,
            enabled & !(mask.raw() & INTERRUPT_MASK_VALID),
        );
    }

    fn clear_pending_interrupts(&mut self, mask: InterruptMask) {
        // write-1-to-clear
        self.write_reg(REG_INTERRUPT_DECODE, mask.raw());
    }

    fn is_link_up(&mut self) -> bool {
        self.phy_status().link_up
    }

    fn requester_id(&mut self) -> RequesterId {
        let raw = self.read_reg(REG_PHY_STATUS);
        RequesterId {
            bus: ((raw & PHY_RID_BUS_MASK) >> PHY_RID_BUS_SHIFT) as u8,
            device: ((raw & PHY_RID_DEVICE_MASK) >> PHY_RID_DEVICE_SHIFT) as u8,
            function: ((raw & PHY_RID_FUNCTION_MASK) >> PHY_RID_FUNCTION_SHIFT) as u8,
            port: ((raw & PHY_PORT_MASK) >> PHY_PORT_SHIFT) as u8,
        }
    }

    fn read_local_config(&mut self, offset: u16) -> Result<u32, ErrorBase> {
        let offset = Self::local_offset(offset)?;
        Ok(self.read_reg(offset))
    }

    fn write_local_config(&mut self, offset: u16, value: u32) -> Result<(), ErrorBase> {
        let offset = Self::local_offset(offset)?;
        self.write_reg(offset, value);
        Ok(())
    }
}
