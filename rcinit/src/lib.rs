//! Bring-up of the two PCIe root ports of a board.
//!
//! Each port is taken through configuration lookup, interrupt quiescing,
//! link training, command enable and bus window programming by the
//! [`Sequencer`]; the [`Orchestrator`] runs the ports one after the other and
//! hands every initialized port to an [`Enumerator`].
#![no_std]

extern crate alloc;

mod error;
mod link;
#[cfg(test)]
mod mock;
mod orchestrator;
mod osal;
pub mod plan;
mod port;
mod sequencer;

pub use error::*;
pub use link::*;
pub use orchestrator::*;
pub use osal::*;
pub use pcie_xdma::BusRange;
pub use plan::{BusPlan, PORT_COUNT, PortPlan};
pub use port::RootPort;
pub use rdif_pcie::{PortIdentifier, RootPortConfig};
pub use sequencer::Sequencer;
