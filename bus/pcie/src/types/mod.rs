mod bus;
mod command;

pub use bus::*;
pub use command::*;
pub use pci_types::CommandRegister;
