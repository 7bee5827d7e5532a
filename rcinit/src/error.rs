use alloc::boxed::Box;
use core::error::Error;

use pcie_xdma::{BusRange, BusRangeError};
use rdif_pcie::{ErrorBase, PortIdentifier};

/// Why a single root port could not be brought up.
#[derive(thiserror::Error, Debug)]
pub enum BringUpError {
    #[error("no configuration found for {0}")]
    ConfigNotFound(PortIdentifier),
    #[error("failed to initialize controller at {base:#x}: {source}")]
    InitFailed { base: usize, source: ErrorBase },
    #[error("controller at {base:#x} is configured as endpoint, not root complex")]
    NotRootComplex { base: usize },
    #[error("link is not up after {attempts} polls")]
    LinkTimeout { attempts: u32 },
    #[error("access to local config word {offset:#x} failed: {source}")]
    ConfigAccess { offset: u16, source: ErrorBase },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("RP{port}: {source}")]
    InvalidRange { port: usize, source: BusRangeError },
    #[error("bus windows of RP{first} ({first_range}) and RP{second} ({second_range}) overlap")]
    Overlap {
        first: usize,
        second: usize,
        first_range: BusRange,
        second_range: BusRange,
    },
    #[error("RP{first} and RP{second} are both {id}")]
    DuplicateIdentifier {
        first: usize,
        second: usize,
        id: PortIdentifier,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum EnumerateError {
    #[error("bus window reads back as {found}, expected {expected}")]
    WindowMismatch { expected: BusRange, found: BusRange },
    #[error("config access failed: {0}")]
    Access(#[from] ErrorBase),
    #[error("enumeration error: {0}")]
    Other(Box<dyn Error>),
}

#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error("bus plan rejected: {0}")]
    Plan(#[from] PlanError),
    #[error("RP{first} and RP{second} resolve to the same register block {base:#x}")]
    AliasedPorts {
        first: usize,
        second: usize,
        base: usize,
    },
    #[error("RP{port} init failed: {source}")]
    BringUp { port: usize, source: BringUpError },
    #[error("RP{port} enumeration failed: {source}")]
    Enumerate { port: usize, source: EnumerateError },
}
