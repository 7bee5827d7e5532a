//! Recording platform for tests.

use alloc::{boxed::Box, sync::Arc, vec::Vec};
use core::time::Duration;

use rdif_pcie::{
    Capabilities, ConfigLookup, ConfigTable, DriverGeneric, ErrorBase, Hardware, Interface,
    InterruptMask, PortIdentifier, RequesterId, RootPortConfig, local_config,
};
use spin::Mutex;

use crate::{EnumerateError, Enumerator, Osal, Platform, RootPort};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Lookup(PortIdentifier),
    Open(usize),
    EnabledInterrupts(usize),
    DisableInterrupts(usize, InterruptMask),
    PendingInterrupts(usize),
    ClearInterrupts(usize, InterruptMask),
    Poll(usize),
    RequesterId(usize),
    Read(usize, u16),
    Write(usize, u16, u32),
    Delay(Duration),
    Enumerate(usize),
}

impl Event {
    /// Controller the event happened on.
    pub fn base(&self) -> Option<usize> {
        match *self {
            Self::Lookup(_) | Self::Delay(_) => None,
            Self::Open(b)
            | Self::EnabledInterrupts(b)
            | Self::DisableInterrupts(b, _)
            | Self::PendingInterrupts(b)
            | Self::ClearInterrupts(b, _)
            | Self::Poll(b)
            | Self::RequesterId(b)
            | Self::Read(b, _)
            | Self::Write(b, ..)
            | Self::Enumerate(b) => Some(b),
        }
    }

    pub fn touches_registers(&self) -> bool {
        !matches!(
            self,
            Self::Lookup(_) | Self::Open(_) | Self::Delay(_) | Self::Enumerate(_)
        )
    }
}

pub type EventLog = Arc<Mutex<Vec<Event>>>;

#[derive(Debug, Clone, Copy)]
pub struct MockPort {
    pub config: RootPortConfig,
    /// Poll on which the link reports up, `None` keeps it down.
    pub link_up_on: Option<u32>,
    pub open_error: bool,
    pub command_status: u32,
    /// Writes to the command/status register fail.
    pub fault_command_status: bool,
    /// Writes to the bus number register fail.
    pub fault_bus_numbers: bool,
}

impl MockPort {
    pub fn new(device_id: u16, base_address: usize) -> Self {
        Self {
            config: RootPortConfig {
                device_id,
                base_address,
                include_root_complex: true,
                capabilities: Capabilities(0),
            },
            link_up_on: Some(1),
            open_error: false,
            command_status: 0x0010_0000,
            fault_command_status: false,
            fault_bus_numbers: false,
        }
    }
}

pub struct MockBoard {
    ports: Vec<MockPort>,
    log: EventLog,
}

impl MockBoard {
    pub fn new(ports: Vec<MockPort>) -> Self {
        Self {
            ports,
            log: EventLog::default(),
        }
    }

    pub fn log(&self) -> EventLog {
        self.log.clone()
    }

    pub fn events(&self) -> Vec<Event> {
        self.log.lock().clone()
    }

    pub fn count(&self, f: impl Fn(&Event) -> bool) -> usize {
        self.log.lock().iter().filter(|&e| f(e)).count()
    }
}

impl ConfigLookup for MockBoard {
    fn lookup(&self, id: PortIdentifier) -> Option<RootPortConfig> {
        self.log.lock().push(Event::Lookup(id));
        let configs = self.ports.iter().map(|p| p.config).collect::<Vec<_>>();
        ConfigTable::new(&configs).lookup(id)
    }
}

impl Osal for MockBoard {
    fn delay(&self, duration: Duration) {
        self.log.lock().push(Event::Delay(duration));
    }
}

impl Platform for MockBoard {
    fn bind(&self, config: &RootPortConfig) -> Hardware {
        let port = self
            .ports
            .iter()
            .find(|p| p.config == *config)
            .copied()
            .unwrap_or(MockPort {
                config: *config,
                ..MockPort::new(config.device_id, config.base_address)
            });
        let mut local = [0u32; 16];
        local[local_config::COMMAND_STATUS as usize] = port.command_status;
        Box::new(MockHw {
            port,
            log: self.log.clone(),
            polls: 0,
            local,
            interrupt_mask: 0x3ff3_0fff,
            interrupt_decode: 0x0000_0011,
        })
    }
}

struct MockHw {
    port: MockPort,
    log: EventLog,
    polls: u32,
    local: [u32; 16],
    interrupt_mask: u32,
    interrupt_decode: u32,
}

impl MockHw {
    fn record(&self, event: Event) {
        self.log.lock().push(event);
    }

    fn base(&self) -> usize {
        self.port.config.base_address
    }
}

impl DriverGeneric for MockHw {
    fn open(&mut self) -> Result<(), ErrorBase> {
        self.record(Event::Open(self.base()));
        if self.port.open_error {
            return Err(ErrorBase::Io);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), ErrorBase> {
        Ok(())
    }
}

impl Interface for MockHw {
    fn config(&self) -> &RootPortConfig {
        &self.port.config
    }

    fn enabled_interrupts(&mut self) -> InterruptMask {
        self.record(Event::EnabledInterrupts(self.base()));
        InterruptMask(self.interrupt_mask)
    }

    fn pending_interrupts(&mut self) -> InterruptMask {
        self.record(Event::PendingInterrupts(self.base()));
        InterruptMask(self.interrupt_decode)
    }

    fn disable_interrupts(&mut self, mask: InterruptMask) {
        self.record(Event::DisableInterrupts(self.base(), mask));
        self.interrupt_mask &= !mask.raw();
    }

    fn clear_pending_interrupts(&mut self, mask: InterruptMask) {
        self.record(Event::ClearInterrupts(self.base(), mask));
        self.interrupt_decode &= !mask.raw();
    }

    fn is_link_up(&mut self) -> bool {
        self.record(Event::Poll(self.base()));
        self.polls += 1;
        self.port.link_up_on.is_some_and(|k| self.polls >= k)
    }

    fn requester_id(&mut self) -> RequesterId {
        self.record(Event::RequesterId(self.base()));
        RequesterId {
            port: self.port.config.device_id as u8,
            ..Default::default()
        }
    }

    fn read_local_config(&mut self, offset: u16) -> Result<u32, ErrorBase> {
        self.record(Event::Read(self.base(), offset));
        self.local
            .get(offset as usize)
            .copied()
            .ok_or(ErrorBase::Again)
    }

    fn write_local_config(&mut self, offset: u16, value: u32) -> Result<(), ErrorBase> {
        self.record(Event::Write(self.base(), offset, value));
        let faulted = match offset {
            local_config::COMMAND_STATUS => self.port.fault_command_status,
            local_config::BUS_NUMBERS => self.port.fault_bus_numbers,
            _ => false,
        };
        if faulted {
            return Err(ErrorBase::Io);
        }
        let word = self.local.get_mut(offset as usize).ok_or(ErrorBase::Again)?;
        *word = value;
        Ok(())
    }
}

/// Records every call; optionally fails on one controller.
pub struct MockEnumerator {
    pub log: EventLog,
    pub fail_on: Option<usize>,
}

impl MockEnumerator {
    pub fn new(board: &MockBoard) -> Self {
        Self {
            log: board.log(),
            fail_on: None,
        }
    }
}

impl Enumerator for MockEnumerator {
    fn enumerate_fabric(&mut self, port: &mut RootPort) -> Result<(), EnumerateError> {
        let base = port.base_address();
        self.log.lock().push(Event::Enumerate(base));
        if self.fail_on == Some(base) {
            return Err(EnumerateError::Other(Box::new(ErrorBase::Busy)));
        }
        Ok(())
    }
}
