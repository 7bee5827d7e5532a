#![no_std]

extern crate alloc;

use alloc::boxed::Box;
use core::fmt::Display;

pub use rdif_base::{DriverGeneric, ErrorBase, custom_type};

mod config;

pub use config::*;

pub type Hardware = Box<dyn Interface>;

custom_type!(
    #[doc = "Interrupt enable or decode bits of a root complex bridge."],
    InterruptMask,
    u32,
    "{:#010x}"
);

impl InterruptMask {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(u32::MAX);

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Word offsets into the root port's own type 1 configuration header.
pub mod local_config {
    /// Command (15:0) and Status (31:16).
    pub const COMMAND_STATUS: u16 = 0x01;
    /// Primary (7:0), Secondary (15:8) and Subordinate (23:16) bus numbers.
    pub const BUS_NUMBERS: u16 = 0x06;
}

/// Identity the root port uses as originator of its own transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequesterId {
    pub bus: u8,
    pub device: u8,
    pub function: u8,
    pub port: u8,
}

impl Display for RequesterId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}.{} port {}",
            self.bus, self.device, self.function, self.port
        )
    }
}

/// A PCIe controller configured as root complex.
///
/// Nothing in this trait may be called before [`DriverGeneric::open`]
/// succeeded, except [`Interface::config`].
pub trait Interface: DriverGeneric {
    /// Configuration the instance was bound to.
    fn config(&self) -> &RootPortConfig;

    fn enabled_interrupts(&mut self) -> InterruptMask;

    fn pending_interrupts(&mut self) -> InterruptMask;

    /// Clears `mask` from the enabled set.
    fn disable_interrupts(&mut self, mask: InterruptMask);

    /// Acknowledges the pending interrupts selected by `mask`.
    fn clear_pending_interrupts(&mut self, mask: InterruptMask);

    /// Samples the physical link state once.
    fn is_link_up(&mut self) -> bool;

    fn requester_id(&mut self) -> RequesterId;

    /// Reads the 32-bit word at `offset` (in words) of the local config space.
    fn read_local_config(&mut self, offset: u16) -> Result<u32, ErrorBase>;

    /// Writes the 32-bit word at `offset` (in words) of the local config space.
    fn write_local_config(&mut self, offset: u16, value: u32) -> Result<(), ErrorBase>;
}
