use core::fmt::Display;

use rdif_base::custom_type;

custom_type!(
    #[doc = "Implementation specific capability bits of a controller instance."],
    Capabilities,
    u32,
    "{:#x}"
);

/// How a platform names one controller instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortIdentifier {
    /// Logical instance number assigned by the hardware description.
    DeviceId(u16),
    /// Physical base address of the register window.
    BaseAddress(usize),
}

impl Display for PortIdentifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::DeviceId(id) => write!(f, "device #{id}"),
            Self::BaseAddress(addr) => write!(f, "base {addr:#x}"),
        }
    }
}

/// Static description of one controller instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootPortConfig {
    pub device_id: u16,
    pub base_address: usize,
    /// `false` when the IP was generated in endpoint mode.
    pub include_root_complex: bool,
    pub capabilities: Capabilities,
}

impl RootPortConfig {
    pub fn identifier(&self, by_address: bool) -> PortIdentifier {
        if by_address {
            PortIdentifier::BaseAddress(self.base_address)
        } else {
            PortIdentifier::DeviceId(self.device_id)
        }
    }
}

pub trait ConfigLookup {
    fn lookup(&self, id: PortIdentifier) -> Option<RootPortConfig>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableMode {
    Match,
    Indexed,
}

/// Lookup over a fixed table of instances.
#[derive(Debug, Clone, Copy)]
pub struct ConfigTable<'a> {
    entries: &'a [RootPortConfig],
    mode: TableMode,
}

impl<'a> ConfigTable<'a> {
    /// Matches device ids and base addresses against the entries.
    pub const fn new(entries: &'a [RootPortConfig]) -> Self {
        Self {
            entries,
            mode: TableMode::Match,
        }
    }

    /// Uses a device id as position in `entries`, as fixed bridge tables do.
    /// Base addresses are still matched.
    pub const fn indexed(entries: &'a [RootPortConfig]) -> Self {
        Self {
            entries,
            mode: TableMode::Indexed,
        }
    }
}

impl ConfigLookup for ConfigTable<'_> {
    fn lookup(&self, id: PortIdentifier) -> Option<RootPortConfig> {
        match (id, self.mode) {
            (PortIdentifier::DeviceId(index), TableMode::Indexed) => {
                self.entries.get(index as usize).copied()
            }
            (PortIdentifier::DeviceId(dev), TableMode::Match) => {
                self.entries.iter().find(|c| c.device_id == dev).copied()
            }
            (PortIdentifier::BaseAddress(addr), _) => self
                .entries
                .iter()
                .find(|c| c.base_address == addr)
                .copied(),
        }
    }
}
